//! # Lexica
//!
//! An in-memory full-text word index for Rust.
//!
//! Lexica indexes tokenized documents and answers exact, prefix, and
//! substring word queries. Two index structures are provided behind a
//! common interface:
//!
//! - [`patricia::PatriciaIndex`] — a compressed prefix trie (radix tree)
//!   for exact and prefix lookup
//! - [`suffix::SuffixIndex`] — a generalized suffix structure over the
//!   vocabulary for substring lookup
//!
//! Both stay consistent with a shared [`token_store::TokenStore`], the
//! bidirectional word↔document bookkeeping that is the ground truth for
//! every query result. [`engine::SearchEngine`] owns the published index
//! instances and implements build-new-then-atomically-publish so that
//! long index builds never block query traffic.

pub mod engine;
pub mod error;
pub mod index;
pub mod patricia;
pub mod snapshot;
pub mod structure;
pub mod suffix;
pub mod token_store;

pub mod prelude {
    pub use crate::engine::SearchEngine;
    pub use crate::error::{LexicaError, Result};
    pub use crate::index::{Index, IndexKind, SearchHit};
    pub use crate::snapshot::IndexSnapshot;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
