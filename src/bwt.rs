//! The Burrows-Wheeler Transform and its inverse (§4.1, §4.2), usable
//! standalone from the FM-index that wraps them.

use crate::alphabet::widened_ranks;
use crate::error::{Error, Result};
use crate::occurrence::FirstOccurrenceTable;
use crate::oracle::{OracleVariant, RankOracle, DEFAULT_CHECKPOINT_STEP};
use crate::suffix_array::sais;

/// The product of the forward transform: the BWT column L, and the suffix
/// array it was derived from (kept around so the caller can sample it
/// without re-sorting).
pub struct Bwt {
    pub l: Vec<u8>,
    pub sa: Vec<usize>,
}

/// Forward BWT: sort the rotations of `text` + `terminator` and emit the
/// last column.
///
/// `text` must not contain `terminator`; callers are expected to have
/// checked this already (see `Index::build`), since rejecting it here would
/// duplicate the check on every call to a primitive meant to be reusable.
pub fn forward(text: &[u8], terminator: u8) -> Bwt {
    let n = text.len();
    let ranks = widened_ranks(terminator);

    let mut t_prime: Vec<usize> = Vec::with_capacity(n + 1);
    t_prime.extend(text.iter().map(|&b| ranks[b as usize] as usize));
    t_prime.push(0); // the terminator always maps to the minimal widened rank.

    let sa = sais::build_suffix_array(&t_prime, 255);
    let m = n + 1;
    let mut l = vec![0u8; m];
    for (i, &sa_i) in sa.iter().enumerate() {
        l[i] = if sa_i == 0 { terminator } else { text[sa_i - 1] };
    }

    Bwt { l, sa }
}

/// Inverse BWT: reconstruct the original text (without the terminator) from
/// L alone, by walking the LF-mapping from the terminator's row.
///
/// Builds its own rank oracle (the checkpointed variant, an unremarkable
/// choice since this primitive runs once and does not benefit from the
/// caller's query-time oracle choice).
pub fn inverse(l: &[u8], terminator: u8) -> Result<Vec<u8>> {
    let m = l.len();
    if m == 0 {
        return Ok(Vec::new());
    }

    let c_table = FirstOccurrenceTable::build(l);
    let oracle = RankOracle::build(
        OracleVariant::Checkpointed {
            step: DEFAULT_CHECKPOINT_STEP,
        },
        l,
        &c_table,
    );

    let r_star = l.iter().position(|&b| b == terminator).ok_or_else(|| {
        Error::MalformedIndex("L does not contain the terminator byte".to_string())
    })?;

    let mut output = vec![0u8; m - 1];
    let mut i = r_star;
    for k in (0..m - 1).rev() {
        // Advance first: LF(i) moves from the row whose suffix starts at
        // SA[i] to the row whose suffix starts at SA[i]-1, i.e. the row
        // whose L-entry is the text byte that precedes it. Reading L[i]
        // before advancing would read the terminator's own row.
        let next = oracle.lf(l, &c_table, i as u64);
        if next as usize >= m {
            return Err(Error::InternalInvariantViolation(format!(
                "LF mapping produced out-of-range row {} (m = {})",
                next, m
            )));
        }
        i = next as usize;
        output[k] = l[i];
    }

    Ok(output)
}

/// Reconstruct the full suffix array from L alone, by the same LF walk
/// `inverse` uses, but recording `SA[row]` for every row visited instead of
/// emitting text bytes. Used on index load, since the sampled offsets are
/// not persisted (§4.6) and must be rebuilt from L.
pub(crate) fn reconstruct_suffix_array(l: &[u8], terminator: u8) -> Result<Vec<usize>> {
    let m = l.len();
    let mut sa = vec![0usize; m];
    if m == 0 {
        return Ok(sa);
    }

    let c_table = FirstOccurrenceTable::build(l);
    let oracle = RankOracle::build(
        OracleVariant::Checkpointed {
            step: DEFAULT_CHECKPOINT_STEP,
        },
        l,
        &c_table,
    );

    let r_star = l.iter().position(|&b| b == terminator).ok_or_else(|| {
        Error::MalformedIndex("L does not contain the terminator byte".to_string())
    })?;

    let mut i = r_star;
    sa[i] = 0;
    for k in 1..m {
        let next = oracle.lf(l, &c_table, i as u64);
        if next as usize >= m {
            return Err(Error::InternalInvariantViolation(format!(
                "LF mapping produced out-of-range row {} (m = {})",
                next, m
            )));
        }
        i = next as usize;
        sa[i] = m - k;
    }

    Ok(sa)
}
