//! Configuration discovery and loading.
//!
//! Resolution order:
//! 1. an explicit `--config` path (must exist),
//! 2. `./famgraph.yaml`,
//! 3. `famgraph.yaml` in the platform config directory,
//! 4. built-in defaults,
//!
//! then `FAMGRAPH_DB`, `FAMGRAPH_MAX_GENERATIONS` and `FAMGRAPH_LOG`
//! override individual fields.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::config::schema::FamGraphConfig;
use crate::error::{FamGraphError, Result};

pub const CONFIG_FILE_NAME: &str = "famgraph.yaml";

pub const ENV_DB: &str = "FAMGRAPH_DB";
pub const ENV_MAX_GENERATIONS: &str = "FAMGRAPH_MAX_GENERATIONS";
pub const ENV_LOG: &str = "FAMGRAPH_LOG";

/// Parse a YAML config file.
pub fn from_file(path: &Path) -> Result<FamGraphConfig> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(FamGraphConfig::default());
    }
    let config = serde_yaml::from_str(&text)?;
    Ok(config)
}

/// `famgraph.yaml` in the user's platform config directory, if resolvable.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "famgraph", "famgraph")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// First existing candidate among `cwd/famgraph.yaml` and the user config.
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|p| p.is_file())
}

/// Load configuration using the full resolution order and the process
/// environment.
pub fn load(explicit: Option<&Path>) -> Result<FamGraphConfig> {
    let mut config = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(FamGraphError::invalid(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            from_file(path)?
        }
        None => {
            let cwd = std::env::current_dir()?;
            match discover(&cwd) {
                Some(path) => {
                    debug!(path = %path.display(), "loading config");
                    from_file(&path)?
                }
                None => FamGraphConfig::default(),
            }
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply `FAMGRAPH_*` overrides read through `lookup`.
///
/// Unparsable numeric values are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut FamGraphConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
        config.database.path = path;
    }
    if let Some(raw) = lookup(ENV_MAX_GENERATIONS) {
        match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => config.traversal.default_max_generations = v,
            _ => warn!(value = %raw, "ignoring invalid {ENV_MAX_GENERATIONS}"),
        }
    }
    if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
        config.logging.filter = filter;
    }
}
