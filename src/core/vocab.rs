//! Vocabulary loading and classification.
//!
//! A vocabulary is an ordered list of UTF-8 entries; the position of an entry
//! is its token id. Entries are classified on load:
//!
//! - entries starting with `##` are *suffix* tokens (the marker is stripped,
//!   they match only inside a word),
//! - entries like `[UNK]` or `[CLS]` are *special* and never match,
//! - entries containing invalid UTF-8, or consisting of more than one
//!   punctuation/whitespace code point, are *malformed* and never match,
//! - the literal `[UNK]` entry designates the unknown-token id.
//!
//! Malformed and special tokens keep their ids so decode stays aligned with
//! whatever produced the file.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::unicode::{self, INVALID_UNICODE};

/// Unknown-token id used when the vocabulary has no `[UNK]` entry.
pub const DEFAULT_UNK_TOKEN_ID: i32 = -1;

/// Entry designating the unknown-token id.
const UNK_TOKEN: &[u8] = b"[UNK]";

const SHARP_SIGN: u32 = '#' as u32;
const OPEN_BRACKET: u32 = '[' as u32;
const CLOSE_BRACKET: u32 = ']' as u32;

/// Errors raised while building a vocabulary.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("vocabulary entry {index} is empty")]
    EmptyToken { index: usize },
    #[error("duplicate vocabulary entry {word:?} at id {index}")]
    DuplicateToken { word: String, index: usize },
}

/// A classified vocabulary entry. The id is the entry's position in the
/// vocabulary and is not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Decoded code points, with any `##` marker stripped.
    pub word: Vec<u32>,
    /// False iff the entry carried a `##` continuation marker.
    pub is_prefix: bool,
    /// `[...]` control entries such as `[CLS]`.
    pub is_special: bool,
    /// Undecodable or all-punctuation entries; kept by id, never matched.
    pub is_malformed: bool,
}

impl Token {
    fn parse(encoded: &[u8], index: usize) -> Result<Self, VocabError> {
        let mut word = unicode::decode_word(encoded);
        let mut is_prefix = true;
        let mut is_special = false;

        if word.len() >= 2 && word[0] == SHARP_SIGN && word[1] == SHARP_SIGN {
            is_prefix = false;
            word.drain(..2);
        } else if word.len() > 2 && word[0] == OPEN_BRACKET && word[word.len() - 1] == CLOSE_BRACKET
        {
            is_special = true;
        }

        if word.is_empty() {
            return Err(VocabError::EmptyToken { index });
        }

        let mut is_malformed = false;
        let mut all_punctuation = true;
        for &ch in &word {
            if ch == INVALID_UNICODE {
                is_malformed = true;
            }
            if !unicode::is_punctuation(ch) && !unicode::is_space(ch) {
                all_punctuation = false;
            }
        }
        if all_punctuation && word.len() > 1 {
            is_malformed = true;
        }
        if is_malformed {
            log::warn!(
                "vocabulary entry {:?} (id {index}) is malformed",
                String::from_utf8_lossy(encoded)
            );
        }

        Ok(Self {
            word,
            is_prefix,
            is_special,
            is_malformed,
        })
    }

    /// Whether the token participates in matching at all.
    pub fn matchable(&self) -> bool {
        !self.is_special && !self.is_malformed
    }

    /// Render the token the way it would appear in a vocabulary file.
    pub fn render(&self) -> String {
        let word = unicode::encode_utf8(&self.word);
        if self.is_prefix {
            word
        } else {
            format!("##{word}")
        }
    }
}

/// An immutable, classified vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub tokens: Vec<Token>,
    /// Id of the `[UNK]` entry, or [`DEFAULT_UNK_TOKEN_ID`].
    pub unk_token_id: i32,
}

impl Vocabulary {
    /// Classify `entries` in order; the index of an entry is its id.
    ///
    /// Fails on empty entries and on duplicate (`word`, `is_prefix`) pairs
    /// among matchable tokens. Malformed entries are kept but flagged, with
    /// one warning each.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, VocabError> {
        Self::build(entries.iter().map(|entry| entry.as_ref().as_bytes()))
    }

    /// Parse the on-disk format: one token per LF-terminated line, ids
    /// assigned top down. Lines are taken as raw bytes so entries that are
    /// not valid UTF-8 come through as malformed tokens instead of failing
    /// the whole file.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, VocabError> {
        let mut lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
        if lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        Self::build(lines.into_iter().map(|line| match line.last() {
            Some(&b'\r') => &line[..line.len() - 1],
            _ => line,
        }))
    }

    fn build<'a, I: Iterator<Item = &'a [u8]>>(entries: I) -> Result<Self, VocabError> {
        let mut tokens = Vec::with_capacity(entries.size_hint().0);
        let mut unk_token_id = DEFAULT_UNK_TOKEN_ID;

        for (index, entry) in entries.enumerate() {
            if entry == UNK_TOKEN {
                unk_token_id = index as i32;
            }
            tokens.push(Token::parse(entry, index)?);
        }

        let mut seen: FxHashSet<(&[u32], bool)> = FxHashSet::default();
        for (index, token) in tokens.iter().enumerate() {
            if token.matchable() && !seen.insert((token.word.as_slice(), token.is_prefix)) {
                return Err(VocabError::DuplicateToken {
                    word: token.render(),
                    index,
                });
            }
        }

        Ok(Self {
            tokens,
            unk_token_id,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Length of the longest matchable word.
    pub fn max_word_len(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| token.matchable())
            .map(|token| token.word.len())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_suffix_classification() {
        let vocab = Vocabulary::parse(&["hello", "##llo", "##l"]).unwrap();
        assert!(vocab.tokens[0].is_prefix);
        assert!(!vocab.tokens[1].is_prefix);
        assert_eq!(vocab.tokens[1].word, unicode::decode_word(b"llo"));
        assert_eq!(vocab.unk_token_id, DEFAULT_UNK_TOKEN_ID);
    }

    #[test]
    fn test_unk_token_id() {
        let vocab = Vocabulary::parse(&["a", "[UNK]", "b"]).unwrap();
        assert_eq!(vocab.unk_token_id, 1);
        assert!(vocab.tokens[1].is_special);
        assert!(!vocab.tokens[1].matchable());
    }

    #[test]
    fn test_special_tokens() {
        let vocab = Vocabulary::parse(&["[CLS]", "[SEP]", "[x]", "[]"]).unwrap();
        assert!(vocab.tokens[0].is_special);
        assert!(vocab.tokens[1].is_special);
        assert!(vocab.tokens[2].is_special);
        // "[]" is only two code points long, so it is not special; it is
        // all-punctuation of length 2 and therefore malformed.
        assert!(!vocab.tokens[3].is_special);
        assert!(vocab.tokens[3].is_malformed);
    }

    #[test]
    fn test_single_punctuation_is_matchable() {
        let vocab = Vocabulary::parse(&["-", "##-", "--"]).unwrap();
        assert!(vocab.tokens[0].matchable());
        assert!(vocab.tokens[1].matchable());
        assert!(vocab.tokens[2].is_malformed);
    }

    #[test]
    fn test_empty_entry_fails() {
        assert!(matches!(
            Vocabulary::parse(&["a", ""]),
            Err(VocabError::EmptyToken { index: 1 })
        ));
        // "##" strips to nothing.
        assert!(matches!(
            Vocabulary::parse(&["##"]),
            Err(VocabError::EmptyToken { index: 0 })
        ));
    }

    #[test]
    fn test_duplicate_detection() {
        assert!(matches!(
            Vocabulary::parse(&["ab", "cd", "ab"]),
            Err(VocabError::DuplicateToken { index: 2, .. })
        ));
        // Same word, different class: allowed.
        assert!(Vocabulary::parse(&["ab", "##ab"]).is_ok());
        // Special duplicates are tolerated.
        assert!(Vocabulary::parse(&["[PAD]", "[PAD]"]).is_ok());
    }

    #[test]
    fn test_malformed_entry_kept_by_id() {
        let vocab = Vocabulary::parse(&["a", "...", "b"]).unwrap();
        assert_eq!(vocab.len(), 3);
        assert!(vocab.tokens[1].is_malformed);
        assert_eq!(vocab.max_word_len(), 1);
    }

    #[test]
    fn test_render() {
        let vocab = Vocabulary::parse(&["при", "##вет"]).unwrap();
        assert_eq!(vocab.tokens[0].render(), "при");
        assert_eq!(vocab.tokens[1].render(), "##вет");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let entries = ["aa", "##aa", "[UNK]", "-", "..."];
        assert_eq!(
            Vocabulary::parse(&entries).unwrap(),
            Vocabulary::parse(&entries).unwrap()
        );
    }

    #[test]
    fn test_parse_bytes_line_format() {
        let vocab = Vocabulary::parse_bytes(b"aa\n##aa\n[UNK]\n").unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.unk_token_id, 2);
        // CRLF and a missing trailing newline both work.
        let crlf = Vocabulary::parse_bytes(b"aa\r\n##aa\r\n[UNK]").unwrap();
        assert_eq!(crlf, vocab);
    }

    #[test]
    fn test_parse_bytes_invalid_utf8_entry() {
        let vocab = Vocabulary::parse_bytes(b"aa\nb\xffc\n").unwrap();
        assert!(vocab.tokens[1].is_malformed);
        assert!(!vocab.tokens[0].is_malformed);
    }
}
