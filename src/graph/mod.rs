//! Graph layer: SQLite-backed family store, lineage traversal, and the
//! pure shaping/aggregation passes over its results.

pub mod age;
pub mod assembler;
pub mod source;
pub mod stats;
pub mod store;
pub mod traversal;
