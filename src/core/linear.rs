//! Worst-case-linear encoder.
//!
//! Instead of probing a hash table per position, this encoder answers "what
//! is the longest vocabulary word starting at text position `i`" for *every*
//! position at once:
//!
//! 1. concatenate the text and all vocabulary words, separated by a reserved
//!    low symbol, and build the suffix array and LCP array of the result;
//! 2. mark every rank whose suffix starts at a vocabulary word (`who`);
//! 3. sweep a monotonic stack over the ranks, once per direction and
//!    prefix/suffix class: a vocabulary word matches at a rank exactly while
//!    the running LCP stays at or above its length, so the stack top is the
//!    longest word that is a prefix of that rank's suffix;
//! 4. segment the text greedily with the same word-prefix and rollback rules
//!    as the greedy encoder, now with O(1) per-position lookups.
//!
//! Total work is linear in text plus vocabulary length, independent of how
//! adversarially the vocabulary overlaps itself.

use crate::core::pool::{self, Pool};
use crate::core::tokenizer::TokenizerError;
use crate::core::unicode::{is_space, is_spacing_char};
use crate::core::vocab::Vocabulary;
use crate::core::{lcp, suffix};

/// Separator between the text and each vocabulary word in the concatenated
/// string. Code points are shifted above it, so it cannot collide.
const SEPARATOR_SYMBOL: u32 = 1;

/// Shift applied to every real code point in the concatenated string, keeping
/// symbols 0 (suffix-array sentinel) and 1 (separator) reserved.
const SYMBOL_SHIFT: u32 = 2;

/// Rank holds no vocabulary-word start / position has no match.
const NO_MATCH: i32 = -1;

/// Combined length limit of the 32-bit suffix-array engine.
const MAX_TOTAL_LENGTH: usize = 2_000_000_000;

/// Index entries per worker strip.
const WORK_BATCH: usize = 1_000_000;

/// Encode `text` against `vocab`, returning one id per emitted token.
///
/// Fails with [`TokenizerError::InputTooLarge`] when the combined length of
/// text and vocabulary, or the symbol alphabet, exceeds the 32-bit engine
/// limit.
pub fn encode(text: &[u32], vocab: &Vocabulary, pool: &Pool) -> Result<Vec<i32>, TokenizerError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut total_length = text.len() + 1;
    let mut longest_word = 1;
    for token in &vocab.tokens {
        if token.is_malformed {
            continue;
        }
        total_length += token.word.len() + 1;
        longest_word = longest_word.max(token.word.len());
    }
    if total_length > MAX_TOTAL_LENGTH {
        return Err(TokenizerError::InputTooLarge(total_length));
    }

    // Concatenated string: shifted text, then every non-malformed word, each
    // followed by the separator. Malformed words can never match, so they are
    // left out; their ids stay reserved.
    let mut combined = Vec::with_capacity(total_length);
    let mut alphabet_size = SEPARATOR_SYMBOL;
    for &ch in text {
        combined.push(ch + SYMBOL_SHIFT);
        alphabet_size = alphabet_size.max(ch + SYMBOL_SHIFT);
    }
    combined.push(SEPARATOR_SYMBOL);
    for token in &vocab.tokens {
        if token.is_malformed {
            continue;
        }
        for &ch in &token.word {
            combined.push(ch + SYMBOL_SHIFT);
            alphabet_size = alphabet_size.max(ch + SYMBOL_SHIFT);
        }
        combined.push(SEPARATOR_SYMBOL);
    }
    debug_assert_eq!(combined.len(), total_length);
    if alphabet_size as usize > MAX_TOTAL_LENGTH {
        return Err(TokenizerError::InputTooLarge(alphabet_size as usize));
    }

    let suffix_array = suffix::suffix_array(&combined, alphabet_size);
    if suffix_array.len() != total_length {
        return Err(TokenizerError::Internal(1));
    }

    let mut rank = vec![0u32; total_length];
    for (sa_index, &position) in suffix_array.iter().enumerate() {
        rank[position as usize] = sa_index as u32;
    }

    let lcp = lcp::lcp_array(&combined, &suffix_array, &rank, pool);
    drop(combined);
    drop(suffix_array);

    // who[r] = id of the vocabulary word whose start owns rank r.
    let mut who = vec![NO_MATCH; total_length];
    {
        let mut word_start = text.len() + 1;
        for (id, token) in vocab.tokens.iter().enumerate() {
            if token.is_malformed {
                continue;
            }
            who[rank[word_start] as usize] = id as i32;
            word_start += token.word.len() + 1;
        }
    }

    let ((best_left_prefix, best_right_prefix), (best_left_suffix, best_right_suffix)) = {
        let get_closest = |right_side: bool, want_prefix: bool| -> Vec<i32> {
            let mut result = vec![NO_MATCH; total_length];
            let mut stack: Vec<(i32, u32)> = Vec::with_capacity(longest_word);
            for i in 0..total_length {
                if i > 0 {
                    let lcp_index = if right_side { total_length - i - 1 } else { i - 1 };
                    while let Some(&(_, len)) = stack.last() {
                        if len > lcp[lcp_index] {
                            stack.pop();
                        } else {
                            break;
                        }
                    }
                }
                let index = if right_side { total_length - 1 - i } else { i };
                let id = who[index];
                if id != NO_MATCH {
                    let token = &vocab.tokens[id as usize];
                    if token.is_prefix == want_prefix && token.matchable() {
                        stack.push((id, token.word.len() as u32));
                    }
                }
                if let Some(&(top, _)) = stack.last() {
                    result[i] = top;
                }
            }
            result
        };

        if total_length < WORK_BATCH {
            (
                (get_closest(false, true), get_closest(true, true)),
                (get_closest(false, false), get_closest(true, false)),
            )
        } else {
            pool.install(|| {
                rayon::join(
                    || rayon::join(|| get_closest(false, true), || get_closest(true, true)),
                    || rayon::join(|| get_closest(false, false), || get_closest(true, false)),
                )
            })
        }
    };
    drop(lcp);
    drop(who);

    let is_word_prefix = |position: usize| {
        position == 0 || is_spacing_char(text[position]) || is_spacing_char(text[position - 1])
    };

    let unk_token_id = vocab.unk_token_id;
    let vocab_length = total_length - text.len();
    let worker = |begin: usize, end: usize| -> Vec<i32> {
        let mut token_ids = Vec::with_capacity((end - begin) * vocab.len() / vocab_length + 1);

        let mut match_index = begin;
        while match_index != end && is_space(text[match_index]) {
            match_index += 1;
        }

        let mut tokens_since_prefix = 0;

        while match_index < end {
            let left_sa_id = rank[match_index] as usize;
            let right_sa_id = total_length - 1 - left_sa_id;
            let use_prefix = is_word_prefix(match_index);
            let x = if use_prefix {
                best_left_prefix[left_sa_id]
            } else {
                best_left_suffix[left_sa_id]
            };
            let y = if use_prefix {
                best_right_prefix[right_sa_id]
            } else {
                best_right_suffix[right_sa_id]
            };

            if x != NO_MATCH || y != NO_MATCH {
                let token_id = if x != NO_MATCH && y != NO_MATCH {
                    if vocab.tokens[x as usize].word.len() > vocab.tokens[y as usize].word.len() {
                        x
                    } else {
                        y
                    }
                } else {
                    x.max(y)
                };
                tokens_since_prefix += 1;
                token_ids.push(token_id);
                match_index += vocab.tokens[token_id as usize].word.len();

                if match_index != end && is_word_prefix(match_index) {
                    tokens_since_prefix = 0;
                }
            } else {
                // No word of the required class starts here: the current
                // word cannot be segmented. Drop its ids, emit one unknown.
                token_ids.truncate(token_ids.len() - tokens_since_prefix);
                tokens_since_prefix = 0;
                token_ids.push(unk_token_id);
                match_index += 1;
                while match_index != end && !is_word_prefix(match_index) {
                    match_index += 1;
                }
            }
            while match_index != end && is_space(text[match_index]) {
                match_index += 1;
            }
        }

        token_ids
    };

    let token_ids = if text.len() < 2 * WORK_BATCH {
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
    };

    Ok(token_ids)
}
