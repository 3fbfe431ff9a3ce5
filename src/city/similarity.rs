//! Sequence similarity for the fuzzy city fallback.
//!
//! Ratcliff/Obershelp ratio: find the longest common contiguous block,
//! recurse into the unmatched pieces on either side, and score
//! `2 * matched / (len_a + len_b)`.

/// Similarity ratio between two strings, in `[0, 1]`.
///
/// Two empty strings are identical by convention (ratio 1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total characters covered by matching blocks: the longest common block,
/// plus whatever matches in the slices before and after it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Longest common contiguous block of `a` and `b` as (start_a, start_b, len).
/// Length ties resolve to the earliest start in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let len = curr[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}
