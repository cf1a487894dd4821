//! Longest-common-prefix array (Kasai's algorithm).
//!
//! `lcp[k]` is the length of the common prefix of the suffixes at `sa[k]` and
//! `sa[k + 1]`. The computation walks text positions left to right, carrying
//! the running prefix length that Kasai's argument bounds to amortized O(n).
//! The walk writes a per-text-position table first, so it can be cut into
//! independent strips (the carried length resets at each strip start, costing
//! at most one extra token-length scan per strip) and gathered into
//! suffix-array order afterwards.

use rayon::prelude::*;

use crate::core::pool::Pool;

/// Text positions per worker strip.
const WORK_BATCH: usize = 1_000_000;

/// Compute `plcp[i]` = common prefix length of the suffix at text position
/// `begin + offset` and its successor in suffix-array order.
fn plcp_strip(s: &[u32], sa: &[u32], rank: &[u32], plcp: &mut [u32], begin: usize) {
    let n = s.len();
    let mut prefix_len = 0usize;
    for (offset, slot) in plcp.iter_mut().enumerate() {
        let i = begin + offset;
        let sa_index = rank[i] as usize;
        if sa_index + 1 == n {
            // Lexicographically last suffix: no successor.
            *slot = 0;
            prefix_len = 0;
            continue;
        }
        let successor = sa[sa_index + 1] as usize;
        while i.max(successor) + prefix_len < n && s[i + prefix_len] == s[successor + prefix_len] {
            prefix_len += 1;
        }
        *slot = prefix_len as u32;
        prefix_len = prefix_len.saturating_sub(1);
    }
}

/// Build the LCP array for `s` from its suffix array and rank (inverse)
/// permutation.
pub fn lcp_array(s: &[u32], sa: &[u32], rank: &[u32], pool: &Pool) -> Vec<u32> {
    let n = s.len();
    if n < 2 {
        return Vec::new();
    }

    let mut plcp = vec![0u32; n];
    if n < 2 * WORK_BATCH {
        plcp_strip(s, sa, rank, &mut plcp, 0);
    } else {
        let thread_count = pool.max_threads().min(n / WORK_BATCH);
        let work_batch = n / thread_count + 1;
        pool.install(|| {
            plcp.par_chunks_mut(work_batch)
                .enumerate()
                .for_each(|(strip, chunk)| {
                    plcp_strip(s, sa, rank, chunk, strip * work_batch);
                });
        });
    }

    let mut lcp = vec![0u32; n - 1];
    for (k, slot) in lcp.iter_mut().enumerate() {
        *slot = plcp[sa[k] as usize];
    }
    lcp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::suffix::suffix_array;

    fn naive_lcp(s: &[u32], sa: &[u32]) -> Vec<u32> {
        sa.windows(2)
            .map(|pair| {
                let a = &s[pair[0] as usize..];
                let b = &s[pair[1] as usize..];
                a.iter().zip(b).take_while(|(x, y)| x == y).count() as u32
            })
            .collect()
    }

    fn check(s: &[u32], alphabet: u32) {
        let pool = Pool::new(2);
        let sa = suffix_array(s, alphabet);
        let mut rank = vec![0u32; s.len()];
        for (k, &pos) in sa.iter().enumerate() {
            rank[pos as usize] = k as u32;
        }
        assert_eq!(lcp_array(s, &sa, &rank, &pool), naive_lcp(s, &sa));
    }

    #[test]
    fn test_banana() {
        let s: Vec<u32> = "banana".bytes().map(|b| u32::from(b - b'a' + 1)).collect();
        check(&s, 26);
    }

    #[test]
    fn test_repetitive() {
        let s: Vec<u32> = "abab".repeat(50).bytes().map(|b| u32::from(b - b'a' + 1)).collect();
        check(&s, 26);
        let s = vec![1u32; 100];
        check(&s, 1);
    }

    #[test]
    fn test_with_separators() {
        let mut s = Vec::new();
        for word in ["aa", "ab", "a", "b"] {
            for b in word.bytes() {
                s.push(u32::from(b - b'a') + 2);
            }
            s.push(1);
        }
        let max = *s.iter().max().unwrap();
        check(&s, max);
    }

    #[test]
    fn test_short_inputs() {
        let pool = Pool::new(1);
        assert!(lcp_array(&[], &[], &[], &pool).is_empty());
        assert!(lcp_array(&[5], &[0], &[0], &pool).is_empty());
    }
}
