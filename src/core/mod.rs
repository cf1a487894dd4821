//! Core tokenization engine for sliver.
//!
//! Two encoders implement the same WordPiece contract over a shared
//! substrate:
//!
//! - [`unicode`]: UTF-8 decoding to flat code-point buffers, parallel over
//!   safe byte strips, plus the code-point classes the matchers rely on
//! - [`vocab`]: vocabulary classification (prefix/suffix/special/malformed)
//!   with ids assigned by position
//! - [`segment`]: rolling-hash windows and the hash-addressed prefix/suffix
//!   index used by the greedy matcher
//! - [`pool`]: fixed-size worker pool and safe strip partitioning
//! - [`fast`]: greedy longest-match encoder, near-linear in practice
//! - [`suffix`] + [`lcp`]: DC3 suffix array and Kasai LCP over the
//!   concatenated text-plus-vocabulary string
//! - [`linear`]: monotonic-stack sweep encoder, worst-case linear
//! - [`external`]: chunked streaming for inputs beyond the memory budget
//! - [`tokenizer`]: the public API surface and its error type
//!
//! Both encoders produce identical id sequences on every input; the fast one
//! wins on typical text, the linear one is immune to adversarial vocabulary
//! overlap.

pub mod external;
pub mod fast;
pub mod lcp;
pub mod linear;
pub mod pool;
pub mod segment;
pub mod suffix;
pub mod tokenizer;
pub mod unicode;
pub mod vocab;

pub use pool::{default_pool, Pool};
pub use tokenizer::{
    decode, encode_fast, encode_fast_external, encode_fast_file, encode_fast_with, encode_linear,
    encode_linear_external, encode_linear_file, encode_linear_with, TokenizerError,
};
pub use unicode::{INVALID_UNICODE, SPACE_TOKEN};
pub use vocab::{Token, VocabError, Vocabulary, DEFAULT_UNK_TOKEN_ID};
