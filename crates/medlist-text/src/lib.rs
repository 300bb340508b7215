//! medlist-text
//!
//! Tantivy-backed product index: one raw `id` key plus three stored, stemmed
//! text fields scored with BM25. See `index` for destructive builds and
//! `search` for the read side.

pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::{TantivyIndexWriter, TantivyIndexer};
pub use search::TantivySearchEngine;
