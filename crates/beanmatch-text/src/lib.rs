//! beanmatch-text
//!
//! Tantivy-backed lexical retrieval over bean descriptions. Queries are
//! tolerant to typos: every query word matches exactly or within an edit
//! distance that grows with its length.

pub mod index;
pub mod query;
pub mod tantivy_utils;

pub use index::TantivyIndexer;
