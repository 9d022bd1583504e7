//! Configuration data structures for famgraph.
//!
//! Defines the YAML config format: database location, traversal limits,
//! integrity policy and logging. Every section and field has a default, so
//! an empty file is a valid configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FamGraphError;
use crate::graph::traversal::{GenerationLimit, DEFAULT_MAX_GENERATIONS, MAX_GENERATIONS_CAP};
use crate::observability::DEFAULT_LOG_FILTER;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for famgraph.
///
/// Loaded from YAML files and environment variables; see
/// [`crate::config::loader`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamGraphConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub integrity: IntegrityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file (`:memory:` is accepted).
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// TraversalConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Generations walked when a request does not say.
    #[serde(default = "default_max_generations")]
    pub default_max_generations: u32,

    /// Requests above this are clamped.
    #[serde(default = "default_max_generations_cap")]
    pub max_generations_cap: u32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            default_max_generations: default_max_generations(),
            max_generations_cap: default_max_generations_cap(),
        }
    }
}

impl TraversalConfig {
    pub fn generation_limit(&self) -> GenerationLimit {
        GenerationLimit::new(self.default_max_generations, self.max_generations_cap)
    }
}

// ---------------------------------------------------------------------------
// IntegrityConfig
// ---------------------------------------------------------------------------

/// What deleting a person does to its relationship edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Soft-delete the person and deactivate its edges in one transaction.
    #[default]
    Cascade,
    /// Refuse while any active edge touches the person.
    Reject,
}

impl DeletePolicy {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cascade" => Some(Self::Cascade),
            "reject" | "restrict" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletePolicy {
    type Err = FamGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| {
            FamGraphError::invalid(format!("unknown delete policy '{s}' (cascade, reject)"))
        })
    }
}

/// Write-time rules enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityConfig {
    #[serde(default)]
    pub delete_policy: DeletePolicy,

    /// Refuse parent→child edges that would close a cycle.
    #[serde(default = "default_true")]
    pub reject_cycles: bool,

    /// Maximum active parents per child; unlimited when absent.
    #[serde(default)]
    pub max_parents: Option<usize>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::Cascade,
            reject_cycles: true,
            max_parents: None,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (for serde)
// ---------------------------------------------------------------------------

fn default_db_path() -> String {
    "famgraph.db".to_string()
}

fn default_max_generations() -> u32 {
    DEFAULT_MAX_GENERATIONS
}

fn default_max_generations_cap() -> u32 {
    MAX_GENERATIONS_CAP
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
