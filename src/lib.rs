//! FamGraph: genealogy records with lineage queries.
//!
//! Persons, parent/child relationships, unions and life events live in a
//! SQLite store. The lineage engine walks that store (or an in-memory
//! snapshot) to answer ancestor, descendant and generation-depth queries.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod observability;
pub mod types;

pub use error::{FamGraphError, Result};
pub use graph::source::{LineageSource, MemorySource};
pub use graph::store::FamilyStore;
pub use graph::traversal::{Direction, LineageEntry, LineageTraversal, TraversalOptions};
