//! Rolling-hash code-point segments and the hash-addressed vocabulary index.
//!
//! Lookups during greedy matching repeatedly shrink a candidate window from
//! the right. [`SegmentBuilder`] precomputes the polynomial prefix hashes of
//! a window once, so each shrink step costs O(1) and yields a [`Segment`]
//! whose hash equals the hash of a freshly built segment over the same code
//! points. Hash collisions are possible; segment equality always falls back
//! to content comparison.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;

use crate::core::vocab::Vocabulary;

const HASH_P: u64 = 726_328_703;
const HASH_MOD: u64 = 2_032_191_299;

#[inline]
fn push_hash(hash: u64, ch: u32) -> u64 {
    (hash * HASH_P + u64::from(ch)) % HASH_MOD
}

/// A hashed view over a code-point slice.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    hash: u64,
    word: &'a [u32],
}

impl<'a> Segment<'a> {
    pub fn new(word: &'a [u32]) -> Self {
        let hash = word.iter().fold(0, |hash, &ch| push_hash(hash, ch));
        Self { hash, word }
    }
}

impl PartialEq for Segment<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.word == other.word
    }
}

impl Eq for Segment<'_> {}

impl Hash for Segment<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Prefix view over a window that supports shrinking from the right in O(1).
pub struct SegmentBuilder<'a> {
    word: &'a [u32],
    prefix_hashes: Vec<u64>,
    len: usize,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(word: &'a [u32]) -> Self {
        let mut prefix_hashes = Vec::with_capacity(word.len() + 1);
        prefix_hashes.push(0);
        let mut hash = 0;
        for &ch in word {
            hash = push_hash(hash, ch);
            prefix_hashes.push(hash);
        }
        Self {
            word,
            prefix_hashes,
            len: word.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop the rightmost code point of the current view.
    pub fn pop_back(&mut self) {
        debug_assert!(self.len > 0);
        self.len -= 1;
    }

    /// The current view as a hashed segment.
    pub fn finish(&self) -> Segment<'a> {
        Segment {
            hash: self.prefix_hashes[self.len],
            word: &self.word[..self.len],
        }
    }
}

/// Hash-addressed map from matchable vocabulary words to token ids, split by
/// prefix/suffix class.
pub struct VocabIndex<'a> {
    prefix: FxHashMap<Segment<'a>, i32>,
    suffix: FxHashMap<Segment<'a>, i32>,
    max_word_len: usize,
}

impl<'a> VocabIndex<'a> {
    /// Index every matchable token of `vocab`; special and malformed entries
    /// are left out so they can never match.
    pub fn build(vocab: &'a Vocabulary) -> Self {
        let mut prefix = FxHashMap::default();
        let mut suffix = FxHashMap::default();
        let mut max_word_len = 0;
        for (id, token) in vocab.tokens.iter().enumerate() {
            if !token.matchable() {
                continue;
            }
            max_word_len = max_word_len.max(token.word.len());
            let map = if token.is_prefix {
                &mut prefix
            } else {
                &mut suffix
            };
            map.insert(Segment::new(&token.word), id as i32);
        }
        Self {
            prefix,
            suffix,
            max_word_len,
        }
    }

    /// Look `segment` up in the prefix or suffix table.
    pub fn lookup(&self, is_prefix: bool, segment: &Segment<'a>) -> Option<i32> {
        let map = if is_prefix { &self.prefix } else { &self.suffix };
        map.get(segment).copied()
    }

    /// Length of the longest indexed word.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }
}
