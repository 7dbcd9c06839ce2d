//! TOML configuration for dataset preparation, matching and the execution engine.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! [dataset]
//! policy = "lenient"          # or "strict"
//! max-eligible-score = 320.0
//!
//! [search]
//! name-matching = "all-tokens" # "substring" | "all-tokens" | "fuzzy"
//! min-query-chars = 5
//! fuzzy-threshold = 0.8
//!
//! [engine]
//! substrate = "cooperative"    # or "isolated"
//! chunk-size = 256
//! clock-interval-ms = 100
//!
//! [display]
//! page-size = 20
//! ```

use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used under the platform config directory.
const APP_DIR: &str = "exam-search";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub dataset: DatasetConfig,
    pub search: SearchConfig,
    pub engine: EngineConfig,
    pub display: DisplayConfig,
}

/// How defective raw records are handled. One policy applies to every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetPolicy {
    /// Drop defective records and report how many were skipped.
    #[default]
    Lenient,
    /// Fail the whole preparation on the first defect.
    Strict,
}

/// Which name matching mode non-numeric queries use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatching {
    Substring,
    #[default]
    AllTokens,
    Fuzzy,
}

/// Where a scan executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Substrate {
    /// Chunked scan on the async runtime, yielding between chunks.
    #[default]
    Cooperative,
    /// Whole scan on a dedicated worker thread, one request and one reply.
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatasetConfig {
    pub policy: DatasetPolicy,
    /// Records scoring above this are excluded from ranking and search.
    pub max_eligible_score: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            policy: DatasetPolicy::default(),
            max_eligible_score: 320.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    pub name_matching: NameMatching,
    /// Minimum length, in characters, of a query that is not all digits.
    pub min_query_chars: usize,
    /// Similarity in `[0, 1]` a record must reach in fuzzy mode.
    pub fuzzy_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            name_matching: NameMatching::default(),
            min_query_chars: 5,
            fuzzy_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    pub substrate: Substrate,
    /// Records evaluated between two yields of the cooperative scan.
    pub chunk_size: usize,
    /// Cadence of the elapsed-time clock.
    pub clock_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            substrate: Substrate::default(),
            chunk_size: 256,
            clock_interval_ms: 100,
        }
    }
}

impl EngineConfig {
    /// Chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Clock cadence, never zero.
    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplayConfig {
    pub page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load the per-user configuration if one exists, otherwise the defaults.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/exam-search/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        check!(config == Config::default());
        check!(config.dataset.max_eligible_score == 320.0);
        check!(config.search.min_query_chars == 5);
        check!(config.engine.substrate == Substrate::Cooperative);
        check!(config.search.name_matching == NameMatching::AllTokens);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [search]
            name-matching = "fuzzy"

            [engine]
            substrate = "isolated"
            chunk-size = 64
            "#,
        )
        .unwrap();

        check!(config.search.name_matching == NameMatching::Fuzzy);
        check!(config.search.fuzzy_threshold == 0.8);
        check!(config.engine.substrate == Substrate::Isolated);
        check!(config.engine.chunk_size == 64);
        check!(config.engine.clock_interval_ms == 100);
        check!(config.dataset.policy == DatasetPolicy::Lenient);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let result = Config::from_toml_str("[dataset]\npolicy = \"sometimes\"\n");
        check!(result.is_err());
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let engine = EngineConfig {
            chunk_size: 0,
            clock_interval_ms: 0,
            ..EngineConfig::default()
        };
        check!(engine.chunk_size() == 1);
        check!(engine.clock_interval() == Duration::from_millis(1));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dataset]\npolicy = \"strict\"\n[display]\npage-size = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        check!(config.dataset.policy == DatasetPolicy::Strict);
        check!(config.display.page_size == 5);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(&missing).unwrap_err();
        check!(err.to_string().contains("nope.toml"));
    }
}
