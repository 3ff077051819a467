use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Brute-force substring search, used as the reference answer for `count`
/// and `locate` property tests.
pub struct NaiveSearchIndex<'a> {
    text: &'a [u8],
}

impl<'a> NaiveSearchIndex<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        NaiveSearchIndex { text }
    }

    pub fn locate(&self, pattern: &[u8]) -> Vec<u64> {
        if pattern.is_empty() || pattern.len() > self.text.len() {
            return Vec::new();
        }
        (0..=self.text.len() - pattern.len())
            .filter(|&i| &self.text[i..i + pattern.len()] == pattern)
            .map(|i| i as u64)
            .collect()
    }

    pub fn count(&self, pattern: &[u8]) -> u64 {
        self.locate(pattern).len() as u64
    }
}

/// Drive `texts` random texts (over `alphabet`, of `text_size` bytes) through
/// `patterns` random substrings of those texts plus a handful of patterns
/// guaranteed absent. `build_index` runs once per text, and `run_test` runs
/// once per pattern against that one built index — the same shape as the
/// teacher's own `tests/testutil/mod.rs::TestRunner::run`, which builds its
/// `fm_index` once per text and reuses it across the inner pattern loop.
pub struct TestRunner {
    pub texts: usize,
    pub patterns: usize,
    pub text_size: usize,
    pub alphabet: &'static [u8],
}

impl TestRunner {
    pub fn run<I, B, R>(&self, seed: u64, build_index: B, run_test: R)
    where
        B: Fn(&[u8]) -> I,
        R: Fn(&I, &[u8], &[u8]),
    {
        let mut rng: StdRng = SeedableRng::seed_from_u64(seed);

        for _ in 0..self.texts {
            let text: Vec<u8> = (0..self.text_size)
                .map(|_| self.alphabet[rng.gen_range(0, self.alphabet.len())])
                .collect();
            let index = build_index(&text);

            for _ in 0..self.patterns {
                let pattern_len = rng.gen_range(1, self.text_size.min(8) + 1);
                let start = rng.gen_range(0, self.text_size - pattern_len + 1);
                let pattern = &text[start..start + pattern_len];
                run_test(&index, &text, pattern);
            }

            // a pattern guaranteed absent from this text, to exercise the
            // collapsing-interval path.
            run_test(&index, &text, b"\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a");
        }
    }
}
