//! UTF-8 decoding and code-point classification.
//!
//! The engines operate on flat `u32` code-point buffers rather than on
//! `&str`, because tokenization input is arbitrary bytes: invalid UTF-8 is
//! skipped with a warning instead of failing the whole call. Decoding large
//! inputs is parallelized over byte strips whose boundaries are pushed
//! forward to the next code-point start, so every strip decodes exactly the
//! same scalars a serial pass would.

use crate::core::pool::{self, Pool};

/// Sentinel stored in place of an undecodable byte. Never a valid scalar.
pub const INVALID_UNICODE: u32 = 0x0fff_ffff;

/// U+2581 "lower one eighth block", treated as whitespace by convention.
pub const SPACE_TOKEN: u32 = 9601;

/// Byte strip size per decode worker.
const WORK_BATCH: usize = 5_000_000;

/// Whitespace: the C-locale `isspace` set plus [`SPACE_TOKEN`].
#[inline]
pub fn is_space(ch: u32) -> bool {
    matches!(ch, 0x09..=0x0d | 0x20) || ch == SPACE_TOKEN
}

/// Punctuation: the C-locale `ispunct` set.
#[inline]
pub fn is_punctuation(ch: u32) -> bool {
    matches!(ch, 0x21..=0x2f | 0x3a..=0x40 | 0x5b..=0x60 | 0x7b..=0x7e)
}

/// A code point that separates words: whitespace or punctuation.
#[inline]
pub fn is_spacing_char(ch: u32) -> bool {
    is_space(ch) || is_punctuation(ch)
}

/// True unless `byte` is a UTF-8 continuation byte (top bits `10`).
#[inline]
pub fn starts_code_point(byte: u8) -> bool {
    byte & 0xc0 != 0x80
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

#[inline]
fn is_scalar(ch: u32) -> bool {
    ch < 0xd800 || (0xdfff < ch && ch < 0x11_0000)
}

/// Sequence length implied by a leading byte, or 0 for an invalid leader.
#[inline]
fn utf8_len(byte: u8) -> usize {
    if byte & 0x80 == 0 {
        1
    } else if byte & 0xe0 == 0xc0 {
        2
    } else if byte & 0xf0 == 0xe0 {
        3
    } else if byte & 0xf8 == 0xf0 {
        4
    } else {
        0
    }
}

/// Decode the code point starting at `bytes[0]`.
///
/// Returns the scalar and the number of bytes consumed. Truncated, overlong,
/// surrogate and out-of-range sequences yield `(INVALID_UNICODE, 1)`: the
/// caller advances one byte and resynchronizes on the next leading byte.
pub fn decode_code_point(bytes: &[u8]) -> (u32, usize) {
    let len = utf8_len(bytes[0]);
    if len == 1 {
        return (u32::from(bytes[0]), 1);
    }
    if len == 2 && bytes.len() >= 2 && is_continuation(bytes[1]) {
        let ch = (u32::from(bytes[0]) & 0x1f) << 6 | (u32::from(bytes[1]) & 0x3f);
        if ch >= 0x80 && is_scalar(ch) {
            return (ch, 2);
        }
    } else if len == 3 && bytes.len() >= 3 && is_continuation(bytes[1]) && is_continuation(bytes[2])
    {
        let ch = (u32::from(bytes[0]) & 0x0f) << 12
            | (u32::from(bytes[1]) & 0x3f) << 6
            | (u32::from(bytes[2]) & 0x3f);
        if ch >= 0x800 && is_scalar(ch) {
            return (ch, 3);
        }
    } else if len == 4
        && bytes.len() >= 4
        && is_continuation(bytes[1])
        && is_continuation(bytes[2])
        && is_continuation(bytes[3])
    {
        let ch = (u32::from(bytes[0]) & 0x07) << 18
            | (u32::from(bytes[1]) & 0x3f) << 12
            | (u32::from(bytes[2]) & 0x3f) << 6
            | (u32::from(bytes[3]) & 0x3f);
        if ch >= 0x1_0000 && is_scalar(ch) {
            return (ch, 4);
        }
    }
    (INVALID_UNICODE, 1)
}

/// True if the first code point of `bytes` decodes to whitespace.
pub fn starts_with_space(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let (ch, _) = decode_code_point(bytes);
    ch != INVALID_UNICODE && is_space(ch)
}

/// Decode one strip serially. Invalid positions are dropped; the second
/// element reports whether any were seen.
fn decode_strip(bytes: &[u8]) -> (Vec<u32>, bool) {
    let mut decoded = Vec::with_capacity(bytes.len() / 4 + 4);
    let mut invalid = false;
    let mut pos = 0;
    while pos < bytes.len() {
        let (ch, consumed) = decode_code_point(&bytes[pos..]);
        if ch == INVALID_UNICODE {
            invalid = true;
        } else {
            decoded.push(ch);
        }
        pos += consumed;
    }
    (decoded, invalid)
}

/// Decode an entire input to a code-point buffer.
///
/// Inputs of at least two work batches are split into per-thread strips whose
/// right boundaries move forward to the next code-point start byte; the
/// per-strip vectors are concatenated in strip order. Invalid sequences are
/// skipped and reported once per call through `log::warn!`.
pub fn decode_text(bytes: &[u8], pool: &Pool) -> Vec<u32> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let (decoded, invalid) = if bytes.len() < 2 * WORK_BATCH {
        decode_strip(bytes)
    } else {
        let thread_count = pool.max_threads().min(bytes.len() / WORK_BATCH);
        let strips = pool::strips(bytes.len(), thread_count, |mut end| {
            while end < bytes.len() && !starts_code_point(bytes[end]) {
                end += 1;
            }
            end
        });
        let parts = pool.map_ordered(strips, |range| decode_strip(&bytes[range]));
        let mut decoded = Vec::with_capacity(parts.iter().map(|(p, _)| p.len()).sum());
        let mut invalid = false;
        for (part, part_invalid) in parts {
            decoded.extend_from_slice(&part);
            invalid |= part_invalid;
        }
        (decoded, invalid)
    };

    if invalid {
        log::warn!("input contains invalid UTF-8 sequences; they were skipped");
    }
    decoded
}

/// Decode a vocabulary entry, keeping one [`INVALID_UNICODE`] sentinel per
/// undecodable byte so the caller can flag the entry as malformed.
pub fn decode_word(bytes: &[u8]) -> Vec<u32> {
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let (ch, consumed) = decode_code_point(&bytes[pos..]);
        decoded.push(ch);
        pos += consumed;
    }
    decoded
}

/// Render a code-point sequence back to a `String`. Sentinel values decode
/// to U+FFFD.
pub fn encode_utf8(word: &[u32]) -> String {
    word.iter()
        .map(|&ch| char::from_u32(ch).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
