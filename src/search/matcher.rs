//! Query compilation and per-record match decisions.

use super::normalize::normalize;
use super::scoring::name_similarity;
use crate::config::{NameMatching, SearchConfig};
use crate::dataset::{PreparedDataset, PreparedRecord};
use crate::error::ValidationError;
use serde::Serialize;

/// Matching policy applied to every record of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// All-digit query, matched as a substring of the seating number.
    Identifier,
    /// Whole normalized query as a substring of the normalized name.
    Substring,
    /// Every whitespace-separated token contained in the name, in any order.
    AllTokens,
    /// Approximate matching above a similarity threshold.
    Fuzzy,
}

impl MatchMode {
    pub const fn is_fuzzy(self) -> bool {
        matches!(self, Self::Fuzzy)
    }
}

/// A record that satisfied the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position in [`PreparedDataset::records`].
    pub index: usize,
    /// 1.0 for exact modes, the similarity score in fuzzy mode.
    pub similarity: f64,
}

/// A validated query with its mode and canonical forms resolved up front.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    raw: String,
    normalized: String,
    tokens: Vec<String>,
    mode: MatchMode,
    fuzzy_threshold: f64,
}

/// True when the query consists solely of ASCII digits.
pub fn is_identifier_query(query: &str) -> bool {
    !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit())
}

impl CompiledQuery {
    /// Validate a raw query and select its matching mode.
    ///
    /// Surrounding whitespace is ignored. All-digit queries always use
    /// identifier mode and skip the length rule; any other query must reach
    /// `config.min_query_chars` characters.
    pub fn compile(raw: &str, config: &SearchConfig) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if is_identifier_query(trimmed) {
            return Ok(Self {
                raw: trimmed.to_owned(),
                normalized: trimmed.to_owned(),
                tokens: Vec::new(),
                mode: MatchMode::Identifier,
                fuzzy_threshold: config.fuzzy_threshold,
            });
        }

        let chars = trimmed.chars().count();
        if chars < config.min_query_chars {
            return Err(ValidationError::QueryTooShort {
                chars,
                min: config.min_query_chars,
            });
        }

        let normalized = normalize(trimmed).into_owned();
        let tokens = normalized.split_whitespace().map(str::to_owned).collect();
        let mode = match config.name_matching {
            NameMatching::Substring => MatchMode::Substring,
            NameMatching::AllTokens => MatchMode::AllTokens,
            NameMatching::Fuzzy => MatchMode::Fuzzy,
        };

        Ok(Self {
            raw: trimmed.to_owned(),
            normalized,
            tokens,
            mode,
            fuzzy_threshold: config.fuzzy_threshold,
        })
    }

    /// The trimmed query as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Decide whether `record` matches, returning its similarity when it does.
    pub fn evaluate(&self, record: &PreparedRecord) -> Option<f64> {
        match self.mode {
            MatchMode::Identifier => record.id_text().contains(&self.raw).then_some(1.0),
            MatchMode::Substring => record
                .normalized_name()
                .contains(&self.normalized)
                .then_some(1.0),
            MatchMode::AllTokens => {
                let name = record.normalized_name();
                let id = record.id_text();
                // A token may be satisfied by the seating number, so "احمد 1002" works.
                let by_tokens = self
                    .tokens
                    .iter()
                    .all(|token| name.contains(token.as_str()) || id.contains(token.as_str()));
                (by_tokens || id.contains(&self.raw)).then_some(1.0)
            }
            MatchMode::Fuzzy => {
                let similarity = name_similarity(record.normalized_name(), &self.tokens);
                (similarity >= self.fuzzy_threshold).then_some(similarity)
            }
        }
    }
}

/// Whether `record` satisfies `query`.
pub fn matches(record: &PreparedRecord, query: &CompiledQuery) -> bool {
    query.evaluate(record).is_some()
}

/// Evaluate `records`, which start at `offset` in the dataset, appending hits in order.
pub(crate) fn scan_range(
    records: &[PreparedRecord],
    offset: usize,
    query: &CompiledQuery,
    hits: &mut Vec<Hit>,
) {
    hits.extend(records.iter().enumerate().filter_map(|(i, record)| {
        query.evaluate(record).map(|similarity| Hit {
            index: offset + i,
            similarity,
        })
    }));
}

/// Evaluate the whole dataset in one pass and return ordered hits.
pub fn scan_all(dataset: &PreparedDataset, query: &CompiledQuery) -> Vec<Hit> {
    let mut hits = Vec::new();
    scan_range(dataset.records(), 0, query, &mut hits);
    order_hits(query.mode(), &mut hits);
    hits
}

/// Put hits in reporting order: rank ascending, or similarity descending in fuzzy mode.
///
/// Dataset index order is rank order, so rank comparisons use the index.
pub fn order_hits(mode: MatchMode, hits: &mut [Hit]) {
    if mode.is_fuzzy() {
        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.index.cmp(&b.index))
        });
    } else {
        hits.sort_by_key(|hit| hit.index);
    }
}
