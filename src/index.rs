//! The FM-index (§4.5): backward search (`count`) and suffix-array
//! recovery (`locate`) over a built BWT column.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bwt;
use crate::error::{Error, Result};
use crate::occurrence::FirstOccurrenceTable;
use crate::oracle::{OracleVariant, RankOracle};
use crate::suffix_array::sample::{SampledSuffixArray, DEFAULT_SAMPLE_RATE};

/// Builder for [`Index`], exposing the construction-time choices fixed by
/// the specification: rank oracle variant, checkpoint step, suffix-array
/// sampling rate, and terminator byte.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    variant: OracleVariant,
    sample_rate: u32,
    terminator: u8,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        IndexBuilder {
            variant: OracleVariant::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            terminator: 0,
        }
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the rank oracle representation. Defaults to checkpointed with
    /// step 50.
    pub fn variant(mut self, variant: OracleVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Spacing between sampled suffix-array rows used by `locate`.
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate.max(1);
        self
    }

    /// The sentinel byte appended to the text; inputs containing it are
    /// rejected. Defaults to `0x00`.
    pub fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Build the index over `text`.
    pub fn build(self, text: &[u8]) -> Result<Index> {
        if let Some(&b) = text.iter().find(|&&b| b == self.terminator) {
            return Err(Error::InputContainsTerminator(b));
        }

        let transform = bwt::forward(text, self.terminator);
        let c_table = FirstOccurrenceTable::build(&transform.l);
        let oracle = RankOracle::build(self.variant, &transform.l, &c_table);
        let sampled_sa = SampledSuffixArray::build(&transform.sa, self.sample_rate);

        Ok(Index {
            l: transform.l,
            c_table,
            oracle,
            sampled_sa,
            terminator: self.terminator,
            id: next_index_id(),
        })
    }
}

/// Allocate the next instance id for the `locate` memoization cache (§5).
/// Monotonic and never reused, unlike a freed value's address.
fn next_index_id() -> u64 {
    NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed)
}

/// A built, queryable FM-index.
pub struct Index {
    l: Vec<u8>,
    c_table: FirstOccurrenceTable,
    oracle: RankOracle,
    sampled_sa: SampledSuffixArray,
    terminator: u8,
    id: u64,
}

/// Source of [`Index::id`]: a process-wide counter, never recycled, so two
/// `Index` instances never share an id even if one is dropped and a later
/// one happens to land at the same address (the raw-pointer keying this
/// replaced could not make that guarantee).
static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Memoized row -> text offset, keyed by the owning index's `id`, so
    /// that distinct indexes resident in the same thread don't share cache
    /// entries. This is the thread-local memoization policy for the
    /// `sampled_offset` side-channel: each thread querying an index builds
    /// its own cache.
    static LOCATE_CACHE: RefCell<HashMap<u64, HashMap<u64, u64>>> = RefCell::new(HashMap::new());
}

impl Index {
    pub fn builder() -> IndexBuilder {
        IndexBuilder::new()
    }

    /// Build an index with the default oracle (checkpointed, step 50) and
    /// default sampling rate.
    pub fn build(text: &[u8]) -> Result<Index> {
        IndexBuilder::new().build(text)
    }

    /// The length of L, i.e. `n + 1` where `n` is the length of the
    /// original text.
    pub fn len(&self) -> u64 {
        self.l.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.l.is_empty()
    }

    /// The length of the original text (excluding the terminator).
    pub fn text_len(&self) -> u64 {
        self.len().saturating_sub(1)
    }

    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    pub fn oracle_variant(&self) -> OracleVariant {
        self.oracle.variant()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sampled_sa.rate()
    }

    pub(crate) fn l(&self) -> &[u8] {
        &self.l
    }

    pub(crate) fn c_table(&self) -> &FirstOccurrenceTable {
        &self.c_table
    }

    pub(crate) fn oracle(&self) -> &RankOracle {
        &self.oracle
    }

    pub(crate) fn from_parts(
        l: Vec<u8>,
        c_table: FirstOccurrenceTable,
        oracle: RankOracle,
        sampled_sa: SampledSuffixArray,
        terminator: u8,
    ) -> Index {
        Index {
            l,
            c_table,
            oracle,
            sampled_sa,
            terminator,
            id: next_index_id(),
        }
    }

    /// The number of occurrences of `pattern` in the text.
    ///
    /// An empty pattern returns 0 (the reference policy choice: no pattern
    /// to search for).
    pub fn count(&self, pattern: &[u8]) -> u64 {
        match self.search_range(pattern) {
            Some((top, bot)) => bot - top,
            None => 0,
        }
    }

    /// The starting offsets of every occurrence of `pattern`, ascending.
    pub fn locate(&self, pattern: &[u8]) -> Vec<u64> {
        let Some((top, bot)) = self.search_range(pattern) else {
            return Vec::new();
        };

        let mut offsets: Vec<u64> = (top..bot).map(|row| self.resolve_offset(row)).collect();
        offsets.sort_unstable();
        offsets
    }

    /// Backward search (§4.5): narrow `[top, bot)` one pattern byte at a
    /// time, right to left. Returns `None` once the interval collapses (or
    /// immediately, for an empty pattern).
    fn search_range(&self, pattern: &[u8]) -> Option<(u64, u64)> {
        if pattern.is_empty() {
            return None;
        }

        let mut top = 0u64;
        let mut bot = self.len();
        for &qc in pattern.iter().rev() {
            top = self.oracle.lf_with_symbol(&self.l, &self.c_table, qc, top);
            bot = self.oracle.lf_with_symbol(&self.l, &self.c_table, qc, bot);
            if top >= bot {
                return None;
            }
        }
        Some((top, bot))
    }

    /// Resolve `SA[start_row]` by walking LF until a sampled or
    /// previously-memoized row is reached, then memoize the result at
    /// `start_row` — not at the row the walk happened to stop on, which
    /// would only help a future walk that starts exactly there.
    fn resolve_offset(&self, start_row: u64) -> u64 {
        let id = self.id;
        if let Some(cached) = Self::cache_get(id, start_row) {
            return cached;
        }

        let mut steps = 0u64;
        let mut row = start_row;
        let offset = loop {
            if let Some(pos) = self.sampled_sa.get(row as usize) {
                break pos as u64 + steps;
            }
            if let Some(cached) = Self::cache_get(id, row) {
                break cached + steps;
            }
            steps += 1;
            row = self.oracle.lf(&self.l, &self.c_table, row);
        };

        Self::cache_insert(id, start_row, offset);
        offset
    }

    fn cache_get(id: u64, row: u64) -> Option<u64> {
        LOCATE_CACHE.with(|cache| cache.borrow().get(&id).and_then(|m| m.get(&row).copied()))
    }

    fn cache_insert(id: u64, row: u64, offset: u64) {
        LOCATE_CACHE.with(|cache| {
            cache
                .borrow_mut()
                .entry(id)
                .or_default()
                .insert(row, offset);
        });
    }
}
