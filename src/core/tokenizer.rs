//! Public entry points.
//!
//! Every operation comes in an in-memory and a file form; the file forms map
//! the text read-only and feed the mapping straight to the engines. The
//! `*_with` variants take an explicit [`Pool`]; the plain forms run on the
//! lazily created process-wide default pool.

use std::fs;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

use crate::core::external;
use crate::core::pool::{default_pool, Pool};
use crate::core::unicode;
use crate::core::vocab::{VocabError, Vocabulary};
use crate::core::{fast, linear};

/// Fatal failures of a tokenization call. Recoverable conditions (invalid
/// UTF-8 in the text, unknown ids passed to [`decode`]) are logged warnings,
/// not errors.
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(#[from] VocabError),
    #[error("input too large: combined length {0} exceeds the 32-bit engine limit")]
    InputTooLarge(usize),
    #[error("memory limit {0} MB is below the 50 MB minimum")]
    MemoryLimitTooSmall(usize),
    #[error("I/O failure for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("suffix array construction failed (code {0})")]
    Internal(i32),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TokenizerError + '_ {
    move |source| TokenizerError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a vocabulary file: one UTF-8 token per line, ids assigned top down.
fn load_vocab(path: &Path) -> Result<Vocabulary, TokenizerError> {
    let raw = fs::read(path).map_err(io_error(path))?;
    Ok(Vocabulary::parse_bytes(&raw)?)
}

/// Map `path` read-only.
fn map_text(path: &Path) -> Result<Mmap, TokenizerError> {
    let file = fs::File::open(path).map_err(io_error(path))?;
    // The mapping is read-only and lives shorter than the call; the caller
    // must not truncate the file concurrently.
    unsafe { Mmap::map(&file) }.map_err(io_error(path))
}

/// Encode with the greedy engine on an explicit pool.
pub fn encode_fast_with<S: AsRef<str>>(
    pool: &Pool,
    text: &[u8],
    vocab: &[S],
) -> Result<Vec<i32>, TokenizerError> {
    let vocab = Vocabulary::parse(vocab)?;
    let text = unicode::decode_text(text, pool);
    Ok(fast::encode(&text, &vocab, pool))
}

/// Encode with the greedy engine.
pub fn encode_fast<S: AsRef<str>>(text: &[u8], vocab: &[S]) -> Result<Vec<i32>, TokenizerError> {
    encode_fast_with(default_pool(0), text, vocab)
}

/// Encode with the worst-case-linear engine on an explicit pool.
pub fn encode_linear_with<S: AsRef<str>>(
    pool: &Pool,
    text: &[u8],
    vocab: &[S],
) -> Result<Vec<i32>, TokenizerError> {
    let vocab = Vocabulary::parse(vocab)?;
    let text = unicode::decode_text(text, pool);
    linear::encode(&text, &vocab, pool)
}

/// Encode with the worst-case-linear engine.
pub fn encode_linear<S: AsRef<str>>(text: &[u8], vocab: &[S]) -> Result<Vec<i32>, TokenizerError> {
    encode_linear_with(default_pool(0), text, vocab)
}

/// Greedy engine over a memory-mapped text file.
pub fn encode_fast_file(text_path: &Path, vocab_path: &Path) -> Result<Vec<i32>, TokenizerError> {
    let pool = default_pool(0);
    let vocab = load_vocab(vocab_path)?;
    let map = map_text(text_path)?;
    let text = unicode::decode_text(&map[..], pool);
    Ok(fast::encode(&text, &vocab, pool))
}

/// Linear engine over a memory-mapped text file.
pub fn encode_linear_file(text_path: &Path, vocab_path: &Path) -> Result<Vec<i32>, TokenizerError> {
    let pool = default_pool(0);
    let vocab = load_vocab(vocab_path)?;
    let map = map_text(text_path)?;
    let text = unicode::decode_text(&map[..], pool);
    linear::encode(&text, &vocab, pool)
}

/// Greedy engine in external-memory mode: stream the text file in chunks of
/// half the budget, appending ids to `out_path`.
///
/// `memory_limit_mb` is the working-set budget in megabytes, at least
/// [`external::MIN_MEMORY_LIMIT_MB`]; smaller values fail with
/// [`TokenizerError::MemoryLimitTooSmall`].
pub fn encode_fast_external(
    text_path: &Path,
    vocab_path: &Path,
    out_path: &Path,
    memory_limit_mb: usize,
) -> Result<(), TokenizerError> {
    let budget = chunk_budget(memory_limit_mb, external::FAST_CHUNK_DIVISOR)?;
    let pool = default_pool(0);
    let vocab = load_vocab(vocab_path)?;
    let map = map_text(text_path)?;
    external::stream(&map[..], budget, out_path, |chunk| {
        let text = unicode::decode_text(chunk, pool);
        Ok(fast::encode(&text, &vocab, pool))
    })
}

/// Linear engine in external-memory mode. The chunk size is a twentieth of
/// the budget to leave room for the suffix-array pipeline's peak footprint.
pub fn encode_linear_external(
    text_path: &Path,
    vocab_path: &Path,
    out_path: &Path,
    memory_limit_mb: usize,
) -> Result<(), TokenizerError> {
    let budget = chunk_budget(memory_limit_mb, external::LINEAR_CHUNK_DIVISOR)?;
    let pool = default_pool(0);
    let vocab = load_vocab(vocab_path)?;
    let map = map_text(text_path)?;
    external::stream(&map[..], budget, out_path, |chunk| {
        let text = unicode::decode_text(chunk, pool);
        linear::encode(&text, &vocab, pool)
    })
}

fn chunk_budget(memory_limit_mb: usize, divisor: usize) -> Result<usize, TokenizerError> {
    if memory_limit_mb < external::MIN_MEMORY_LIMIT_MB {
        return Err(TokenizerError::MemoryLimitTooSmall(memory_limit_mb));
    }
    Ok(memory_limit_mb * 1024 * 1024 / divisor)
}

/// Render `ids` back to vocabulary entries: `word` for prefix tokens,
/// `##word` for suffix tokens. Ids outside the vocabulary and malformed
/// tokens are logged and skipped.
pub fn decode(vocab_path: &Path, ids: &[i32]) -> Result<Vec<String>, TokenizerError> {
    let vocab = load_vocab(vocab_path)?;
    let mut words = Vec::with_capacity(ids.len());
    for &id in ids {
        if id < 0 || id as usize >= vocab.len() {
            log::warn!("no token with id {id}");
            continue;
        }
        let token = &vocab.tokens[id as usize];
        if token.is_malformed {
            log::warn!("token {id} is malformed and cannot be decoded");
            continue;
        }
        words.push(token.render());
    }
    Ok(words)
}
