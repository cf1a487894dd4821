//! Chunked streaming for inputs that do not fit the memory budget.
//!
//! The driver cuts the input bytes into chunks sized from the caller's
//! budget, extends every chunk until its last byte starts a whitespace code
//! point (so no word is ever split across chunk calls), encodes each chunk
//! with the supplied engine and appends the ids to the output file as
//! space-separated decimals. Read back as ids, the file equals what a single
//! in-memory call over the whole input would have produced.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::tokenizer::TokenizerError;
use crate::core::unicode::starts_with_space;

/// Smallest supported memory budget, in megabytes.
pub const MIN_MEMORY_LIMIT_MB: usize = 50;

/// Fraction of the budget a fast-encoder chunk may occupy.
pub const FAST_CHUNK_DIVISOR: usize = 2;

/// Fraction of the budget a linear-encoder chunk may occupy; the
/// suffix-array pipeline peaks at roughly ten times the chunk size.
pub const LINEAR_CHUNK_DIVISOR: usize = 20;

/// Append `ids` to `out` as space-separated decimals.
fn write_ids<W: Write>(out: &mut W, ids: &[i32], path: &Path) -> Result<(), TokenizerError> {
    for &id in ids {
        write!(out, "{id} ").map_err(|source| TokenizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Stream `bytes` through `encode_chunk` in budget-sized pieces, writing ids
/// to `out_path` in chunk order.
pub fn stream<F>(
    bytes: &[u8],
    chunk_budget: usize,
    out_path: &Path,
    mut encode_chunk: F,
) -> Result<(), TokenizerError>
where
    F: FnMut(&[u8]) -> Result<Vec<i32>, TokenizerError>,
{
    let io_error = |source| TokenizerError::Io {
        path: out_path.to_path_buf(),
        source,
    };
    let file = File::create(out_path).map_err(io_error)?;
    let mut out = BufWriter::new(file);

    let chunk_budget = chunk_budget.max(1);
    let mut rest = bytes;
    while !rest.is_empty() {
        let mut batch = chunk_budget.min(rest.len());
        if batch < rest.len() {
            // Grow until the chunk ends right after entering whitespace, so
            // the word in progress stays whole.
            while batch < rest.len() && !starts_with_space(&rest[batch - 1..]) {
                batch += 1;
            }
        }
        let ids = encode_chunk(&rest[..batch])?;
        write_ids(&mut out, &ids, out_path)?;
        rest = &rest[batch..];
    }

    out.flush().map_err(io_error)
}
