//! Shared fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `scenario`: the three-student dataset used throughout the search tests
//! - `engine`: a cooperative engine over `scenario`
//! - `TempDataset`: a JSON dataset written to a temporary directory

#![allow(dead_code)] // Helpers used across different integration test crates

use exam_search::config::{Config, DatasetConfig};
use exam_search::{PreparedDataset, RawRecord, SearchEngine, SearchStatus};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Ahmed (100, 280), Amjad (200, 300) and Ali (300, 250).
///
/// Ranks: Amjad 1, Ahmed 2, Ali 3.
#[fixture]
pub fn scenario() -> Arc<PreparedDataset> {
    exam_search::logging::init_for_tests();
    let records = vec![
        RawRecord::new(100, "Ahmed", 280.0),
        RawRecord::new(200, "Amjad", 300.0),
        RawRecord::new(300, "Ali", 250.0),
    ];
    Arc::new(PreparedDataset::prepare(records, &DatasetConfig::default()).unwrap())
}

#[fixture]
pub fn engine(scenario: Arc<PreparedDataset>) -> SearchEngine {
    SearchEngine::new(scenario, &Config::default())
}

/// Run `query` to completion and return its final status.
pub async fn run(engine: &SearchEngine, query: &str) -> SearchStatus {
    let handle = engine.start_search(query).unwrap();
    engine.wait(handle).await
}

/// Names of the result records, in reporting order.
pub fn result_names(status: &SearchStatus) -> Vec<String> {
    status
        .results
        .as_ref()
        .map(|results| {
            results
                .records()
                .into_iter()
                .map(|record| record.name().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// A dataset file in a temporary directory, removed when dropped.
pub struct TempDataset {
    _temp: TempDir,
    path: PathBuf,
}

impl TempDataset {
    pub fn new(contents: &str) -> Self {
        exam_search::logging::init_for_tests();
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("results.json");
        std::fs::write(&path, contents).expect("Failed to write dataset");
        Self { _temp: temp, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path).expect("Failed to read dataset")
    }
}
