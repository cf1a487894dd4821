//! Sliver - WordPiece tokenization for large UTF-8 streams.
//!
//! A high-performance tokenizer featuring:
//! - Greedy longest-match encoding over a rolling-hash vocabulary index
//! - A worst-case-linear encoder built on a suffix array + LCP stack sweep,
//!   producing identical ids on every input
//! - Rayon parallelism over safe UTF-8 and whitespace strip boundaries
//! - FxHashMap lookups with content-wise collision handling
//! - Memory-mapped file input and an external-memory streaming mode for
//!   inputs that exceed RAM
//! - `##`-continuation vocabulary discipline with whole-word rollback to the
//!   unknown token
//!
//! # Example
//!
//! ```
//! let vocab = ["un", "##break", "##able", "[UNK]"];
//! let ids = sliver::encode_fast(b"unbreakable", &vocab)?;
//! assert_eq!(ids, vec![0, 1, 2]);
//! assert_eq!(ids, sliver::encode_linear(b"unbreakable", &vocab)?);
//! # Ok::<(), sliver::TokenizerError>(())
//! ```

pub mod core;

pub use crate::core::{
    decode, default_pool, encode_fast, encode_fast_external, encode_fast_file, encode_fast_with,
    encode_linear, encode_linear_external, encode_linear_file, encode_linear_with, Pool, Token,
    TokenizerError, VocabError, Vocabulary, DEFAULT_UNK_TOKEN_ID, INVALID_UNICODE, SPACE_TOKEN,
};
