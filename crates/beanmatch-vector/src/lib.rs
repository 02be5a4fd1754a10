//! beanmatch-vector
//!
//! Dense-vector retrieval: a LanceDB table searched by cosine distance, and
//! a brute-force in-memory index for small catalogs.

pub mod memory;
pub mod schema;
pub mod search;
pub mod writer;

pub use memory::MemoryVectorIndex;
pub use writer::LanceVectorIndex;
