//! Structured logging and traversal metrics.
//!
//! This module provides:
//! - [`init_logging`]: one-time structured logging setup with `RUST_LOG` support
//! - [`TraversalMetrics`]: counters collected by a single lineage walk

use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor configuration supplies one.
pub const DEFAULT_LOG_FILTER: &str = "famgraph=info";

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies (falling back
/// to [`DEFAULT_LOG_FILTER`] if it does not parse). Subsequent calls are
/// silently ignored by `tracing_subscriber`.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Counters for one ancestor/descendant walk.
///
/// Serializable to JSON via [`TraversalMetrics::to_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalMetrics {
    /// Entries in the final result.
    pub emitted: usize,
    /// Person lookups issued against the source.
    pub person_reads: usize,
    /// Edge-list lookups issued against the source.
    pub edge_reads: usize,
    /// Ids that resolved to nothing (missing or soft-deleted).
    pub missing: usize,
    /// Ids popped again after their first visit.
    pub revisits: usize,
    /// Branches dropped for exceeding the generation limit.
    pub depth_cutoffs: usize,
}

impl TraversalMetrics {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "emitted": self.emitted,
            "person_reads": self.person_reads,
            "edge_reads": self.edge_reads,
            "missing": self.missing,
            "revisits": self.revisits,
            "depth_cutoffs": self.depth_cutoffs,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_does_not_panic() {
        init_logging("famgraph=debug");
        // Second call should also not panic (try_init ignores re-init).
        init_logging("not a [valid filter");
    }

    #[test]
    fn metrics_json_has_all_counters() {
        let metrics = TraversalMetrics {
            emitted: 2,
            person_reads: 3,
            edge_reads: 3,
            missing: 0,
            revisits: 1,
            depth_cutoffs: 0,
        };
        let json = metrics.to_json();
        assert_eq!(json["emitted"], 2);
        assert_eq!(json["revisits"], 1);
        assert_eq!(json, serde_json::to_value(metrics).unwrap());
    }
}
