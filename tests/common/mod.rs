//! Shared test support: a naive reference tokenizer and seeded random
//! text/vocabulary generators.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::Rng;
use sliver::core::unicode::{self, is_punctuation, is_space, is_spacing_char};
use sliver::{Pool, Vocabulary};

/// Straightforward reference: walk the text word by word, repeatedly take the
/// longest prefix of the remaining word found in the prefix table (word
/// start) or suffix table (inside the word); if a word cannot be fully
/// segmented, all of its ids are dropped and a single unknown id is emitted.
pub fn naive_encode<S: AsRef<str>>(text: &[u8], entries: &[S]) -> Vec<i32> {
    let vocab = Vocabulary::parse(entries).expect("reference vocabulary must parse");
    let text = unicode::decode_text(text, &Pool::new(1));

    let mut prefix: HashMap<&[u32], i32> = HashMap::new();
    let mut suffix: HashMap<&[u32], i32> = HashMap::new();
    for (id, token) in vocab.tokens.iter().enumerate() {
        if !token.matchable() {
            continue;
        }
        let map = if token.is_prefix {
            &mut prefix
        } else {
            &mut suffix
        };
        map.insert(&token.word, id as i32);
    }

    let mut ids = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        if is_space(text[pos]) {
            pos += 1;
            continue;
        }
        let word_end = if is_punctuation(text[pos]) {
            pos + 1
        } else {
            let mut end = pos + 1;
            while end < text.len() && !is_spacing_char(text[end]) {
                end += 1;
            }
            end
        };

        let mut word_ids = Vec::new();
        let mut index = pos;
        let mut segmented = true;
        while index < word_end {
            let map = if index == pos { &prefix } else { &suffix };
            let mut matched = None;
            for len in (1..=word_end - index).rev() {
                if let Some(&id) = map.get(&text[index..index + len]) {
                    matched = Some((id, len));
                    break;
                }
            }
            match matched {
                Some((id, len)) => {
                    word_ids.push(id);
                    index += len;
                }
                None => {
                    segmented = false;
                    break;
                }
            }
        }

        if segmented {
            ids.extend(word_ids);
        } else {
            ids.push(vocab.unk_token_id);
        }
        pos = word_end;
    }
    ids
}

/// Random lowercase string of the given length.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'a' + rng.gen_range(0..26)))
        .collect()
}

/// Split `s` at `parts - 1` random interior borders; the distinct pieces come
/// back sorted.
pub fn random_split(s: &str, rng: &mut StdRng, parts: usize) -> Vec<String> {
    assert!(s.len() >= parts);
    let mut borders = BTreeSet::new();
    borders.insert(s.len());
    while borders.len() < parts {
        borders.insert(rng.gen_range(1..s.len()));
    }

    let mut pieces = BTreeSet::new();
    let mut start = 0;
    for border in borders {
        pieces.insert(s[start..border].to_string());
        start = border;
    }
    pieces.into_iter().collect()
}

/// Distinct random strings of length `4..=max_len`, sorted.
pub fn random_string_set(rng: &mut StdRng, count: usize, max_len: usize) -> Vec<String> {
    let mut set = BTreeSet::new();
    while set.len() < count {
        let len = rng.gen_range(4..=max_len);
        set.insert(random_string(rng, len));
    }
    set.into_iter().collect()
}

/// Concatenate random picks from `pieces` (with occasional spaces) until the
/// text reaches `target_len`.
pub fn random_text_from_set(rng: &mut StdRng, target_len: usize, pieces: &[String]) -> String {
    let mut text = String::with_capacity(target_len + 32);
    while text.len() < target_len {
        text.push_str(&pieces[rng.gen_range(0..pieces.len())]);
        if rng.gen_bool(0.3) {
            text.push(' ');
        }
    }
    text
}

/// Turn base pieces into a WordPiece-style vocabulary: every piece as a word
/// start, most also as a `##` continuation, plus `[UNK]`. Dropping some
/// continuations keeps the rollback path busy.
pub fn wordpiece_vocab(rng: &mut StdRng, pieces: &[String]) -> Vec<String> {
    let mut vocab = Vec::with_capacity(pieces.len() * 2 + 1);
    vocab.push("[UNK]".to_string());
    for piece in pieces {
        vocab.push(piece.clone());
        if rng.gen_bool(0.8) {
            vocab.push(format!("##{piece}"));
        }
    }
    vocab
}
