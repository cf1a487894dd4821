//! Greedy longest-match encoder.
//!
//! Words are maximal runs of non-spacing code points; a punctuation code
//! point is a word of its own. The first token of a word is matched against
//! the prefix table, every later position against the suffix (`##`) table.
//! Matching shrinks a candidate window from the right until the hash index
//! hits; if the window empties, every id emitted for the current word is
//! rolled back and a single unknown id replaces the whole word.

use crate::core::pool::{self, Pool};
use crate::core::segment::{SegmentBuilder, VocabIndex};
use crate::core::unicode::{is_punctuation, is_space, is_spacing_char};
use crate::core::vocab::Vocabulary;

/// Code points per worker strip.
const WORK_BATCH: usize = 1_000_000;

/// Encode `text` against `vocab`, returning one id per emitted token.
pub fn encode(text: &[u32], vocab: &Vocabulary, pool: &Pool) -> Vec<i32> {
    if text.is_empty() {
        return Vec::new();
    }

    let index = VocabIndex::build(vocab);
    let max_word_len = index.max_word_len().min(text.len());
    let unk_token_id = vocab.unk_token_id;

    let is_word_prefix = |position: usize| {
        position == 0 || is_spacing_char(text[position]) || is_spacing_char(text[position - 1])
    };

    let worker = |mut begin: usize, end: usize| -> Vec<i32> {
        let mut token_ids = Vec::with_capacity((end - begin) / max_word_len.max(1) + 1);

        while begin != end && is_space(text[begin]) {
            begin += 1;
        }

        let mut tokens_since_prefix = 0;

        while begin != end {
            let mut word_len = 1;
            if !is_punctuation(text[begin]) {
                while word_len < max_word_len.min(end - begin)
                    && !is_spacing_char(text[begin + word_len])
                {
                    word_len += 1;
                }
            }

            let use_prefix = is_word_prefix(begin);
            let mut segment = SegmentBuilder::new(&text[begin..begin + word_len]);
            while !segment.is_empty() {
                if let Some(id) = index.lookup(use_prefix, &segment.finish()) {
                    tokens_since_prefix += 1;
                    token_ids.push(id);
                    begin += segment.len();
                    break;
                }
                segment.pop_back();
            }

            if segment.is_empty() {
                // No suffix continues this word: drop its ids and emit one
                // unknown for the whole word.
                token_ids.truncate(token_ids.len() - tokens_since_prefix);
                tokens_since_prefix = 0;
                token_ids.push(unk_token_id);
                begin += word_len;
                while begin != end && !is_word_prefix(begin) {
                    begin += 1;
                }
            } else if begin != end && is_word_prefix(begin) {
                tokens_since_prefix = 0;
            }

            while begin != end && is_space(text[begin]) {
                begin += 1;
            }
        }

        token_ids
    };

    if text.len() < 2 * WORK_BATCH {
        worker(0, text.len())
    } else {
        let thread_count = pool.max_threads().min(text.len() / WORK_BATCH);
        let strips = pool::strips(text.len(), thread_count, |mut end| {
            while end < text.len() && !is_space(text[end]) {
                end += 1;
            }
            end
        });
        pool.map_ordered(strips, |range| worker(range.start, range.end))
            .concat()
    }
}
