//! SA-IS implementation based on
//!    Ge Nong, Sen Zhang, & Wai Hong Chan. (2010). Two Efficient Algorithms for Linear Time Suffix Array Construction.
//!    IEEE Transactions on Computers, 60(10), 1471-1484. <https://doi.org/10.1109/tc.2010.188>
//!
//! Specialized to `usize`-valued symbol sequences (the widened byte ranks
//! from [`crate::alphabet::widened_ranks`] for the top-level call, and
//! lexicographic names of LMS substrings for the recursive calls), rather
//! than generic over a `Character`/`Converter` pair: this crate's alphabet
//! is always bytes, so the extra generality has no caller.

pub fn count_symbols(text: &[usize], max_symbol: usize) -> Vec<usize> {
    let mut occs = vec![0; max_symbol + 1];
    for &c in text {
        occs[c] += 1;
    }
    occs
}

pub fn get_bucket_start_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        *b = sum;
        sum += occ;
    }
    buckets
}

pub fn get_bucket_end_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        sum += occ;
        *b = sum;
    }
    buckets
}

fn get_types(text: &[usize]) -> (Vec<bool>, Vec<usize>) {
    // true => S-type, false => L-type
    let n = text.len();
    let mut types = vec![false; n];
    types[n - 1] = true;

    if n == 1 {
        return (types, vec![]);
    }

    let mut lms = vec![n - 1];
    let mut prev_is_s_type = false;
    for i in (0..(n - 1)).rev() {
        // text[i] is S-type if either holds:
        //     - text[i] <  text[i + 1]
        //     - text[i] == text[i + 1] and text[i + 1] is S-type.
        // Otherwise, text[i] is L-type.
        let is_s_type = text[i] < text[i + 1] || (text[i] == text[i + 1] && prev_is_s_type);
        if is_s_type {
            types[i] = true;
        } else if prev_is_s_type {
            // text[i + 1] is LMS-type (leftmost-S) if text[i] is L-type and text[i + 1] is S-type.
            lms.push(i + 1);
        }
        prev_is_s_type = is_s_type;
    }
    (types, lms)
}

fn is_lms(types: &[bool], i: usize) -> bool {
    i > 0 && i < usize::MAX && types[i] && !types[i - 1]
}

fn induced_sort(text: &[usize], types: &[bool], occs: &[usize], sa: &mut [usize]) {
    let n = text.len();
    let mut bucket_start_pos = get_bucket_start_pos(occs);
    for i in 0..n {
        let j = sa[i];
        if 0 < j && j < usize::MAX && !types[j - 1] {
            let c = text[j - 1];
            let p = bucket_start_pos[c];
            sa[p] = j - 1;
            bucket_start_pos[c] += 1;
        }
    }

    let mut bucket_end_pos = get_bucket_end_pos(occs);
    for i in (0..n).rev() {
        let j = sa[i];
        if j != 0 && j != usize::MAX && types[j - 1] {
            let c = text[j - 1];
            let p = bucket_end_pos[c] - 1;
            sa[p] = j - 1;
            bucket_end_pos[c] -= 1;
        }
    }
}

/// Build a suffix array for `text`, a symbol sequence ending in a unique
/// minimal sentinel (symbol value 0, occurring exactly once, at the end).
pub fn build_suffix_array(text: &[usize], max_symbol: usize) -> Vec<usize> {
    let n = text.len();
    match n {
        0 => vec![],
        1 => vec![0],
        _ => {
            debug_assert_eq!(
                text.iter().rposition(|&c| c != 0),
                Some(n - 2),
                "the given text must end with a single minimal sentinel symbol",
            );
            let mut sa = vec![usize::MAX; n];
            sais_sub(text, &mut sa, max_symbol);
            sa
        }
    }
}

fn sais_sub(text: &[usize], sa: &mut [usize], max_symbol: usize) {
    let n = text.len();
    let (types, lms) = get_types(text);
    let lms_len = lms.len();
    let occs = count_symbols(text, max_symbol);

    // Step 1: place LMS suffixes at the end of their buckets, in input order.
    let mut bucket_end_pos = get_bucket_end_pos(&occs);
    for &i in lms.iter().rev() {
        let c = text[i];
        let k = bucket_end_pos[c] - 1;
        sa[k] = i;
        bucket_end_pos[c] = k;
    }

    // Step 2/3: induce L-type then S-type positions.
    induced_sort(text, &types, &occs, sa);

    // Move all sorted LMS substrings into the first items of `sa`.
    let mut k = 0;
    for i in 0..n {
        let p = sa[i];
        if is_lms(&types, p) {
            sa[k] = p;
            k += 1;
            if k == lms_len {
                break;
            }
        }
    }

    let mut name = 1;
    {
        // Put lexicographic names of LMS substrings into `names`
        // in the order of SA.
        let (sa_lms, names) = sa.split_at_mut(lms_len);
        for n in names.iter_mut() {
            *n = usize::MAX;
        }
        names[sa_lms[0] / 2] = 0; // name of the sentinel
        if lms_len <= 1 {
            debug_assert!(lms_len != 0);
        } else {
            names[sa_lms[1] / 2] = 1; // name of the second least LMS substring
            for i in 2..lms_len {
                let p = sa_lms[i - 1];
                let q = sa_lms[i];
                let mut d = 1;
                let mut same = text[p] == text[q] && types[p] == types[q];
                while same {
                    if text[p + d] != text[q + d] || types[p + d] != types[q + d] {
                        same = false;
                        break;
                    } else if is_lms(&types, p + d) && is_lms(&types, q + d) {
                        break;
                    }
                    d += 1;
                }
                if !same {
                    name += 1;
                }
                names[q / 2] = name;
            }
        }
        for s in sa_lms.iter_mut() {
            *s = usize::MAX;
        }
    }
    let mut i = sa.len() - 1;
    let mut j = 0;
    while j < lms_len {
        if sa[i] < usize::MAX {
            sa[sa.len() - 1 - j] = sa[i];
            j += 1;
        }
        i -= 1;
    }

    {
        let (sa1, s1) = sa.split_at_mut(sa.len() - lms_len);
        if name < lms_len {
            // Names of LMS substrings are not unique (or we cannot yet prove
            // they are): recurse on the name sequence.
            sais_sub(s1, sa1, name);
        } else {
            // Names of LMS substrings are unique; the order of LMS
            // substrings is already the suffix array of the names.
            for (i, &s) in s1.iter().enumerate() {
                sa1[s] = i;
            }
        }

        // Populate P1 (`p1`) with the positions of LMS substrings.
        let p1 = s1;
        for (j, i) in lms.into_iter().rev().enumerate() {
            p1[j] = i;
        }

        // Populate `sa1` with the positions of LMS substrings.
        for i in 0..lms_len {
            sa1[i] = p1[sa1[i]];
        }
    }

    for i in &mut sa[lms_len..] {
        *i = usize::MAX;
    }

    let mut bucket_end_pos = get_bucket_end_pos(&occs);
    for i in (0..lms_len).rev() {
        let j = sa[i];
        sa[i] = usize::MAX;
        let c = if j == n { 0 } else { text[j] };
        let k = bucket_end_pos[c] - 1;
        sa[k] = j;
        bucket_end_pos[c] = k;
    }
    induced_sort(text, &types, &occs, sa);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn encode(s: &str) -> Vec<usize> {
        // 0 is the sentinel; bytes are shifted up by one so 0 stays unique.
        s.bytes().map(|b| b as usize + 1).chain([0]).collect()
    }

    fn max_symbol_of(text: &[usize]) -> usize {
        text.iter().copied().max().unwrap_or(0)
    }

    #[test]
    fn test_get_types() {
        let text = encode("mmiissiissiippii");
        let types_expected = "LLSSLLSSLLSSLLLLS";
        let (types, _lms) = get_types(&text);
        let types_actual: String = types
            .iter()
            .map(|&s| if s { 'S' } else { 'L' })
            .collect();
        assert_eq!(types_expected, types_actual);
    }

    #[test]
    fn test_length_1() {
        let text = vec![0usize];
        let sa = build_suffix_array(&text, 0);
        assert_eq!(sa, vec![0]);
    }

    #[test]
    fn test_length_2() {
        let text = vec![3usize, 0];
        let sa = build_suffix_array(&text, max_symbol_of(&text));
        assert_eq!(sa, naive_suffix_array(&text));
    }

    #[test]
    fn test_small() {
        let text = encode("mmiissiissiippii");
        let sa = build_suffix_array(&text, max_symbol_of(&text));
        assert_eq!(sa, naive_suffix_array(&text));
    }

    #[test]
    fn test_rand_small_alphabet() {
        let len = 200;
        let mut rng: StdRng = SeedableRng::from_seed([7; 32]);
        for _ in 0..200 {
            let text = build_text(&mut rng, 4, len);
            let sa = build_suffix_array(&text, max_symbol_of(&text));
            assert_eq!(sa, naive_suffix_array(&text), "text = {:?}", text);
        }
    }

    #[test]
    fn test_rand_large_alphabet() {
        let len = 500;
        let mut rng: StdRng = SeedableRng::from_seed([9; 32]);
        for _ in 0..50 {
            let text = build_text(&mut rng, 250, len);
            let sa = build_suffix_array(&text, max_symbol_of(&text));
            assert_eq!(sa, naive_suffix_array(&text), "text = {:?}", text);
        }
    }

    fn build_text(rng: &mut StdRng, alphabet: usize, len: usize) -> Vec<usize> {
        let mut text = Vec::with_capacity(len);
        for _ in 0..(len - 1) {
            text.push(rng.gen_range(1, alphabet + 1));
        }
        text.push(0);
        text
    }

    fn naive_suffix_array(text: &[usize]) -> Vec<usize> {
        let n = text.len();
        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_by_key(|&i| &text[i..]);
        sa
    }
}
