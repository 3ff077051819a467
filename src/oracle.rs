//! The rank oracle over L (§4.4): the central design choice of the index.
//!
//! Three representations share one interface — `rank`, `lf`, and
//! `lf_with_symbol` — differing only in how much of the oracle is
//! precomputed. Callers pick a variant at build time via [`OracleVariant`];
//! [`RankOracle`] is the built, queryable form.

use crate::occurrence::FirstOccurrenceTable;

/// The default checkpoint step used by the reference CLI and builder.
pub const DEFAULT_CHECKPOINT_STEP: u32 = 50;

/// Build-time choice of rank oracle representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleVariant {
    /// No auxiliary structure; `rank` scans L. O(1) space, O(m) per rank.
    Naive,
    /// A fully materialized LF table. O(m * sigma) space, O(1) per rank.
    Full,
    /// Checkpointed cumulative counts every `step` rows. O((m/step) * sigma)
    /// space, O(step) per rank.
    Checkpointed { step: u32 },
}

impl OracleVariant {
    /// The on-disk tag for this variant (§6).
    pub fn wire_tag(self) -> u8 {
        match self {
            OracleVariant::Naive => 0,
            OracleVariant::Full => 1,
            OracleVariant::Checkpointed { .. } => 2,
        }
    }

    pub fn from_wire_tag(tag: u8, step: u32) -> Option<Self> {
        match tag {
            0 => Some(OracleVariant::Naive),
            1 => Some(OracleVariant::Full),
            2 => Some(OracleVariant::Checkpointed { step }),
            _ => None,
        }
    }
}

impl Default for OracleVariant {
    fn default() -> Self {
        OracleVariant::Checkpointed {
            step: DEFAULT_CHECKPOINT_STEP,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FullOracle {
    /// `fm[i] = LF(i)`, for i in `0..m`.
    fm: Vec<u64>,
    /// `fmc[i * sigma + c_idx] = C[c] + rank(c, i)`, for i in `0..=m`.
    fmc: Vec<u64>,
    sigma: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct CheckpointedOracle {
    step: u32,
    /// `checkpoints[k][c_idx]` = count of `c` in `l[0..k*step)`.
    checkpoints: Vec<Vec<u64>>,
}

/// A built rank oracle, ready to answer queries against L.
#[derive(Debug, Clone)]
pub enum RankOracle {
    Naive,
    Full(FullOracle),
    Checkpointed(CheckpointedOracle),
}

impl RankOracle {
    pub fn build(variant: OracleVariant, l: &[u8], c_table: &FirstOccurrenceTable) -> RankOracle {
        match variant {
            OracleVariant::Naive => RankOracle::Naive,
            OracleVariant::Full => RankOracle::Full(build_full_oracle(l, c_table)),
            OracleVariant::Checkpointed { step } => {
                RankOracle::Checkpointed(build_checkpointed_oracle(l, c_table, step))
            }
        }
    }

    /// Rebuild a full oracle from a deserialized FMc table (§6): `fm[i]` is
    /// recovered as `fmc[i * sigma + c_idx(l[i])]`, since that is exactly
    /// what `LF(i)` means.
    pub(crate) fn from_full_parts(
        l: &[u8],
        c_table: &FirstOccurrenceTable,
        fmc: Vec<u64>,
        sigma: usize,
    ) -> RankOracle {
        let mut fm = vec![0u64; l.len()];
        for (i, slot) in fm.iter_mut().enumerate() {
            let c_idx = c_table
                .alphabet()
                .index_of(l[i])
                .expect("byte in L is in its own alphabet");
            *slot = fmc[i * sigma + c_idx];
        }
        RankOracle::Full(FullOracle { fm, fmc, sigma })
    }

    /// Rebuild a checkpointed oracle from deserialized checkpoint rows.
    pub(crate) fn from_checkpointed_parts(step: u32, checkpoints: Vec<Vec<u64>>) -> RankOracle {
        RankOracle::Checkpointed(CheckpointedOracle { step, checkpoints })
    }

    pub fn variant(&self) -> OracleVariant {
        match self {
            RankOracle::Naive => OracleVariant::Naive,
            RankOracle::Full(_) => OracleVariant::Full,
            RankOracle::Checkpointed(o) => OracleVariant::Checkpointed { step: o.step },
        }
    }

    /// Count of `sym` in `l[0..i)`.
    pub fn rank(&self, l: &[u8], c_table: &FirstOccurrenceTable, sym: u8, i: u64) -> u64 {
        let Some(c_idx) = c_table.alphabet().index_of(sym) else {
            return 0;
        };
        match self {
            RankOracle::Naive => rank_naive(l, sym, i),
            RankOracle::Full(o) => {
                o.fmc[i as usize * o.sigma + c_idx] - c_table.get(sym)
            }
            RankOracle::Checkpointed(o) => o.rank(l, c_idx, sym, i),
        }
    }

    /// `LF(i) = C[L[i]] + rank(L[i], i)`.
    pub fn lf(&self, l: &[u8], c_table: &FirstOccurrenceTable, i: u64) -> u64 {
        match self {
            RankOracle::Full(o) => o.fm[i as usize],
            _ => {
                let sym = l[i as usize];
                c_table.get(sym) + self.rank(l, c_table, sym, i)
            }
        }
    }

    /// `LF_with_symbol(i, c) = C[c] + rank(c, i)`, as used by backward search.
    pub fn lf_with_symbol(
        &self,
        l: &[u8],
        c_table: &FirstOccurrenceTable,
        sym: u8,
        i: u64,
    ) -> u64 {
        if let RankOracle::Full(o) = self {
            if let Some(c_idx) = c_table.alphabet().index_of(sym) {
                return o.fmc[i as usize * o.sigma + c_idx];
            }
            return 0;
        }
        c_table.get(sym) + self.rank(l, c_table, sym, i)
    }

    /// Heap payload for the oracle-specific section of the serialized
    /// format (§6): dense per-row counts for the checkpointed variant, or
    /// the flat FMc table for the full variant.
    pub(crate) fn full_fmc(&self) -> Option<&[u64]> {
        match self {
            RankOracle::Full(o) => Some(&o.fmc),
            _ => None,
        }
    }

    pub(crate) fn checkpoints(&self) -> Option<&[Vec<u64>]> {
        match self {
            RankOracle::Checkpointed(o) => Some(&o.checkpoints),
            _ => None,
        }
    }
}

fn rank_naive(l: &[u8], sym: u8, i: u64) -> u64 {
    l[..i as usize].iter().filter(|&&b| b == sym).count() as u64
}

fn count_range(l: &[u8], sym: u8, lo: usize, hi: usize) -> u64 {
    l[lo..hi].iter().filter(|&&b| b == sym).count() as u64
}

fn build_full_oracle(l: &[u8], c_table: &FirstOccurrenceTable) -> FullOracle {
    let m = l.len();
    let sigma = c_table.alphabet().len();
    let mut fm = vec![0u64; m];
    // running[c_idx] = C[c] + (count of c seen so far), i.e. the value
    // lf_with_symbol(i, c) takes *before* processing row i.
    let mut running = c_table.dense_values().to_vec();
    let mut fmc = vec![0u64; (m + 1) * sigma];

    for i in 0..m {
        fmc[i * sigma..(i + 1) * sigma].copy_from_slice(&running);
        let sym = l[i];
        let c_idx = c_table
            .alphabet()
            .index_of(sym)
            .expect("byte in L is in its own alphabet");
        fm[i] = running[c_idx];
        running[c_idx] += 1;
    }
    // Row m: one past the last row, needed because backward search's `bot`
    // can reach m.
    fmc[m * sigma..(m + 1) * sigma].copy_from_slice(&running);

    FullOracle { fm, fmc, sigma }
}

fn build_checkpointed_oracle(
    l: &[u8],
    c_table: &FirstOccurrenceTable,
    step: u32,
) -> CheckpointedOracle {
    let step = step.max(1);
    let m = l.len();
    let sigma = c_table.alphabet().len();
    let num_checkpoints = (m / step as usize) + 1;
    let mut checkpoints = Vec::with_capacity(num_checkpoints);
    let mut running = vec![0u64; sigma];

    let mut next_checkpoint_pos = 0usize;
    let mut k = 0usize;
    while k < num_checkpoints {
        while next_checkpoint_pos < k * step as usize {
            let c_idx = c_table
                .alphabet()
                .index_of(l[next_checkpoint_pos])
                .expect("byte in L is in its own alphabet");
            running[c_idx] += 1;
            next_checkpoint_pos += 1;
        }
        checkpoints.push(running.clone());
        k += 1;
    }

    CheckpointedOracle { step, checkpoints }
}

/// Index of the checkpoint nearest to row `i`, breaking exact ties toward
/// the lower-indexed (earlier) checkpoint.
pub(crate) fn nearest_checkpoint(i: u64, step: u64, max_k: u64) -> u64 {
    let k_floor = i / step;
    let r = i % step;
    let k = if r * 2 <= step { k_floor } else { k_floor + 1 };
    k.min(max_k)
}

impl CheckpointedOracle {
    fn rank(&self, l: &[u8], c_idx: usize, sym: u8, i: u64) -> u64 {
        let step = self.step as u64;
        let max_k = (self.checkpoints.len() - 1) as u64;
        let k = nearest_checkpoint(i, step, max_k);
        let cp_pos = k * step;
        let base = self.checkpoints[k as usize][c_idx];

        use std::cmp::Ordering;
        match cp_pos.cmp(&i) {
            Ordering::Equal => base,
            Ordering::Less => base + count_range(l, sym, cp_pos as usize, i as usize),
            Ordering::Greater => base - count_range(l, sym, i as usize, cp_pos as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::FirstOccurrenceTable;

    fn check_all_variants_agree(l: &[u8]) {
        let c_table = FirstOccurrenceTable::build(l);
        let naive = RankOracle::build(OracleVariant::Naive, l, &c_table);
        let full = RankOracle::build(OracleVariant::Full, l, &c_table);
        for step in [1u32, 2, 3, 7, 50] {
            let checkpointed =
                RankOracle::build(OracleVariant::Checkpointed { step }, l, &c_table);
            for i in 0..=l.len() as u64 {
                for &sym in c_table.alphabet().bytes() {
                    let expected = naive.rank(l, &c_table, sym, i);
                    assert_eq!(full.rank(l, &c_table, sym, i), expected);
                    assert_eq!(
                        checkpointed.rank(l, &c_table, sym, i),
                        expected,
                        "step={} i={} sym={}",
                        step,
                        i,
                        sym
                    );
                }
            }
        }
    }

    #[test]
    fn oracle_variants_agree_on_small_texts() {
        for l in [
            &b"ard$rcaaaabb"[..],
            &b"annb$aa"[..],
            &b"$"[..],
            &b"ba$a"[..],
        ] {
            check_all_variants_agree(l);
        }
    }

    #[test]
    fn tie_break_prefers_lower_checkpoint() {
        // step=4: row 2 is exactly between checkpoints 0 (pos 0) and 1 (pos 4).
        assert_eq!(nearest_checkpoint(2, 4, 10), 0);
        // row 6 is exactly between checkpoints 1 (pos 4) and 2 (pos 8).
        assert_eq!(nearest_checkpoint(6, 4, 10), 1);
        // no tie: row 3 is closer to checkpoint 1 (pos 4) than checkpoint 0.
        assert_eq!(nearest_checkpoint(3, 4, 10), 1);
        // clamped to the last available checkpoint.
        assert_eq!(nearest_checkpoint(39, 4, 5), 5);
    }

    #[test]
    fn tie_break_still_yields_correct_rank() {
        let l = b"aaaa$aaaa";
        let c_table = FirstOccurrenceTable::build(l);
        let oracle = RankOracle::build(OracleVariant::Checkpointed { step: 4 }, l, &c_table);
        assert_eq!(oracle.rank(l, &c_table, b'a', 2), 2);
    }
}
