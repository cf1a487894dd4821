//! Suffix-array construction over an integer alphabet.
//!
//! Implements the DC3/skew algorithm of Kärkkäinen and Sanders
//! (<http://www.cs.cmu.edu/~guyb/paralg/papers/KarkkainenSanders03.pdf>):
//! radix-sort the mod-1/mod-2 suffix triples, name them, recurse while names
//! collide, then merge with the radix-sorted mod-0 suffixes. Linear time in
//! `n + alphabet_size`, flat `u32` buffers throughout.

/// Stably sort `a[..n]` into `b` by the key `keys[a[i] + offset]`.
fn radix_pass(a: &[u32], b: &mut [u32], keys: &[u32], offset: usize, n: usize, alphabet: usize) {
    let mut count = vec![0u32; alphabet + 1];
    for &item in &a[..n] {
        count[keys[item as usize + offset] as usize] += 1;
    }
    let mut sum = 0;
    for slot in count.iter_mut() {
        let item_count = *slot;
        *slot = sum;
        sum += item_count;
    }
    for &item in &a[..n] {
        let key = keys[item as usize + offset] as usize;
        b[count[key] as usize] = item;
        count[key] += 1;
    }
}

#[inline]
fn leq2(a1: u32, a2: u32, b1: u32, b2: u32) -> bool {
    a1 < b1 || (a1 == b1 && a2 <= b2)
}

#[inline]
fn leq3(a1: u32, a2: u32, a3: u32, b1: u32, b2: u32, b3: u32) -> bool {
    a1 < b1 || (a1 == b1 && leq2(a2, a3, b2, b3))
}

/// Suffix position in the original string for the `t`-th entry of the sorted
/// mod-1/mod-2 sample.
#[inline]
fn sample_position(sa12: &[u32], n0: usize, t: usize) -> usize {
    let v = sa12[t] as usize;
    if v < n0 {
        v * 3 + 1
    } else {
        (v - n0) * 3 + 2
    }
}

/// Core recursion. `s[..n]` holds symbols in `1..=alphabet`, `s[n..n + 3]`
/// must be zero, and `sa` must hold at least `n` slots.
fn sa_rec(s: &[u32], sa: &mut [u32], n: usize, alphabet: usize) {
    let n0 = (n + 2) / 3;
    let n1 = (n + 1) / 3;
    let n2 = n / 3;
    let n02 = n0 + n2;

    let mut s12 = vec![0u32; n02 + 3];
    let mut sa12 = vec![0u32; n02 + 3];

    // Positions of mod-1 and mod-2 suffixes; n % 3 == 1 adds a dummy mod-1
    // suffix so the sample covers the last position.
    {
        let mut j = 0;
        for i in 0..n + n0 - n1 {
            if i % 3 != 0 {
                s12[j] = i as u32;
                j += 1;
            }
        }
    }

    // LSB radix sort of the character triples.
    radix_pass(&s12, &mut sa12, s, 2, n02, alphabet);
    radix_pass(&sa12, &mut s12, s, 1, n02, alphabet);
    radix_pass(&s12, &mut sa12, s, 0, n02, alphabet);

    // Name the triples in sorted order.
    let mut name = 0usize;
    let (mut c0, mut c1, mut c2) = (u32::MAX, u32::MAX, u32::MAX);
    for i in 0..n02 {
        let pos = sa12[i] as usize;
        if s[pos] != c0 || s[pos + 1] != c1 || s[pos + 2] != c2 {
            name += 1;
            c0 = s[pos];
            c1 = s[pos + 1];
            c2 = s[pos + 2];
        }
        if pos % 3 == 1 {
            s12[pos / 3] = name as u32;
        } else {
            s12[pos / 3 + n0] = name as u32;
        }
    }

    if name < n02 {
        // Names collide: recurse on the renamed sample string, then store
        // the unique ranks it yields.
        sa_rec(&s12, &mut sa12, n02, name);
        for i in 0..n02 {
            s12[sa12[i] as usize] = (i + 1) as u32;
        }
    } else {
        // Names are unique: the sample suffix array follows directly.
        for i in 0..n02 {
            sa12[(s12[i] - 1) as usize] = i as u32;
        }
    }

    // Stably sort the mod-0 suffixes by first character, seeded with the
    // sample order of their mod-1 right neighbors.
    let mut s0 = vec![0u32; n0];
    let mut sa0 = vec![0u32; n0];
    {
        let mut j = 0;
        for i in 0..n02 {
            if (sa12[i] as usize) < n0 {
                s0[j] = 3 * sa12[i];
                j += 1;
            }
        }
    }
    radix_pass(&s0, &mut sa0, s, 0, n0, alphabet);

    // Merge the two sorted sequences.
    let mut p = 0usize;
    let mut t = n0 - n1;
    let mut k = 0usize;
    while k < n {
        let i = sample_position(&sa12, n0, t);
        let j = sa0[p] as usize;
        let sample_first = if (sa12[t] as usize) < n0 {
            leq2(s[i], s12[sa12[t] as usize + n0], s[j], s12[j / 3])
        } else {
            leq3(
                s[i],
                s[i + 1],
                s12[sa12[t] as usize - n0 + 1],
                s[j],
                s[j + 1],
                s12[j / 3 + n0],
            )
        };
        if sample_first {
            sa[k] = i as u32;
            t += 1;
            if t == n02 {
                k += 1;
                while p < n0 {
                    sa[k] = sa0[p];
                    p += 1;
                    k += 1;
                }
                break;
            }
        } else {
            sa[k] = j as u32;
            p += 1;
            if p == n0 {
                k += 1;
                while t < n02 {
                    sa[k] = sample_position(&sa12, n0, t) as u32;
                    t += 1;
                    k += 1;
                }
                break;
            }
        }
        k += 1;
    }
}

/// Build the suffix array of `s`.
///
/// Symbols must lie in `1..=alphabet_size`; zero is reserved for the internal
/// sentinel padding. Returns the permutation of `0..s.len()` ordering the
/// suffixes lexicographically.
pub fn suffix_array(s: &[u32], alphabet_size: u32) -> Vec<u32> {
    let n = s.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0],
        _ => {}
    }
    let mut padded = Vec::with_capacity(n + 3);
    padded.extend_from_slice(s);
    padded.extend_from_slice(&[0, 0, 0]);
    let mut sa = vec![0u32; n + 3];
    sa_rec(&padded, &mut sa, n, alphabet_size as usize);
    sa.truncate(n);
    sa
}
