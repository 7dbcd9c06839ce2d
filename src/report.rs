//! Rendering of completed searches for the terminal.

use crate::dataset::PreparedRecord;
use crate::engine::{SearchResults, SearchState, SearchStatus};
use crate::search::{Hit, MatchMode, Page};
use serde::Serialize;

/// One page of a completed search, ready to print.
#[derive(Debug)]
pub struct ResultsView<'a> {
    query: &'a str,
    mode: MatchMode,
    elapsed_ms: u64,
    results: &'a SearchResults,
    page: Page<'a, Hit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    query: &'a str,
    mode: MatchMode,
    elapsed_ms: u64,
    page: usize,
    total_pages: usize,
    total_results: usize,
    results: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEntry<'a> {
    #[serde(flatten)]
    record: &'a PreparedRecord,
    is_top_ranked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<f64>,
}

impl<'a> ResultsView<'a> {
    /// Build the view for `page_number`, or `None` unless the search completed.
    pub fn new(status: &'a SearchStatus, page_size: usize, page_number: usize) -> Option<Self> {
        if status.state != SearchState::Completed {
            return None;
        }
        let results = status.results.as_ref()?;
        Some(Self {
            query: status.query.as_deref().unwrap_or_default(),
            mode: status.mode?,
            elapsed_ms: status.elapsed_ms,
            results,
            page: results.page(page_size, page_number),
        })
    }

    pub const fn page(&self) -> &Page<'a, Hit> {
        &self.page
    }

    fn similarity(&self, hit: &Hit) -> Option<f64> {
        self.mode.is_fuzzy().then_some(hit.similarity)
    }

    /// Plain-text listing. Top-ranked records are marked with `*`.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        if self.page.total_items == 0 {
            output.push_str(&format!(
                "No results for \"{}\" ({} ms)\n",
                self.query, self.elapsed_ms
            ));
            return output;
        }

        output.push_str(&format!(
            "{} results for \"{}\" in {} ms (page {} of {})\n",
            self.page.total_items,
            self.query,
            self.elapsed_ms,
            self.page.number,
            self.page.total_pages
        ));

        for hit in self.page.items {
            let record = self.results.record(hit);
            let marker = if record.is_top_ranked() { '*' } else { ' ' };
            output.push_str(&format!(
                "{}{:>5}  {:<10}  {:>7.2}  {}",
                marker,
                record.rank(),
                record.seating_number(),
                record.total_score(),
                record.name()
            ));
            if let Some(similarity) = self.similarity(hit) {
                output.push_str(&format!("  ({:.0}%)", similarity * 100.0));
            }
            output.push('\n');
        }

        output
    }

    /// JSON document with the page metadata and its records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = JsonReport {
            query: self.query,
            mode: self.mode,
            elapsed_ms: self.elapsed_ms,
            page: self.page.number,
            total_pages: self.page.total_pages,
            total_results: self.page.total_items,
            results: self
                .page
                .items
                .iter()
                .map(|hit| {
                    let record = self.results.record(hit);
                    JsonEntry {
                        record,
                        is_top_ranked: record.is_top_ranked(),
                        similarity: self.similarity(hit),
                    }
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }
}
