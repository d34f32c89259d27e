//! Site configuration module.
//!
//! Handles loading, validating, and merging the optional `config.toml` in the
//! documentation root. Stock defaults are overridden by whatever the file sets;
//! CLI flags are applied on top by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [repository]
//! host = "github.com"          # Source-control host for package links
//! organization = "gruntwork-io"
//! branch = "master"            # Branch package links point at
//!
//! [build]
//! template = "_html/doc_template.html"
//! excludes = []                # Glob patterns skipped before classification
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Name of the config file looked up in the documentation root.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where package documentation lives upstream.
    pub repository: RepositoryConfig,
    /// Template and input filtering.
    pub build: BuildConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let repo = &self.repository;
        for (key, value) in [
            ("repository.host", &repo.host),
            ("repository.organization", &repo.organization),
            ("repository.branch", &repo.branch),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be non-empty and contain no whitespace"
                )));
            }
        }
        if repo.host.contains('/') || repo.organization.contains('/') {
            return Err(ConfigError::Validation(
                "repository.host and repository.organization must not contain '/'".into(),
            ));
        }
        if self.build.template.is_empty() {
            return Err(ConfigError::Validation(
                "build.template must not be empty".into(),
            ));
        }
        for pattern in &self.build.excludes {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "build.excludes contains invalid pattern {pattern:?}: {e}"
                )));
            }
        }
        Ok(())
    }
}

/// Source-control location of package repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub host: String,
    pub organization: String,
    pub branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            organization: "gruntwork-io".to_string(),
            branch: "master".to_string(),
        }
    }
}

/// Build inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// HTML page template, relative to the working directory unless absolute.
    pub template: String,
    /// Glob patterns (`*` within a segment, `**` across segments) matched
    /// against root-relative paths. A matching directory prunes its subtree.
    pub excludes: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            template: crate::template::DEFAULT_TEMPLATE_PATH.to_string(),
            excludes: Vec::new(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Worker count for the build pool: `max_processes` clamped to `1..=cores`,
/// or every core when unset.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map_or(cores, |n| n.clamp(1, cores))
}

// =============================================================================
// Loading config.toml
// =============================================================================

/// [`SiteConfig::default`] as a TOML table, the base every `config.toml` is
/// layered over.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Layer a `config.toml` over the defaults. Sections merge key by key;
/// `[build] excludes` and any other array is replaced, not appended.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// The docs root's `config.toml` as a raw table, before it is layered.
/// A tree without one is `Ok(None)`.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Turn the layered tables into a [`SiteConfig`], rejecting unknown keys and
/// invalid values.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Config for the documentation tree rooted at `root`.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Docs Preprocessor Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the documentation tree (next to global/
# and packages/). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Package repositories
# ---------------------------------------------------------------------------
[repository]
# Links inside packages/<name>/ pages are rewritten to
#   https://<host>/<organization>/<name>/tree/<branch>/...
host = "github.com"
organization = "gruntwork-io"
branch = "master"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# HTML page template. Receives page_title, page_body and nav_tree.
template = "_html/doc_template.html"

# Glob patterns for paths to leave out entirely, relative to the docs root.
# "*" matches within one path segment, "**" across segments.
excludes = []

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
