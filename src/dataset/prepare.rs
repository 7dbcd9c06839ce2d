//! Ranked, search-ready record set built once per dataset load.

use super::raw::RawRecord;
use crate::config::{DatasetConfig, DatasetPolicy};
use crate::error::{RecordDefect, SearchError};
use crate::search::normalize;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Records ranked at or above this position are top-ranked.
pub const TOP_RANK_CUTOFF: usize = 10;

/// An eligible record with its rank and precomputed match keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRecord {
    seating_number: u64,
    name: String,
    total_score: f64,
    rank: usize,
    #[serde(skip)]
    normalized_name: String,
    #[serde(skip)]
    id_text: String,
}

impl PreparedRecord {
    fn new(raw: RawRecord, rank: usize) -> Self {
        let normalized_name = normalize(&raw.name).into_owned();
        Self {
            id_text: raw.seating_number.to_string(),
            seating_number: raw.seating_number,
            name: raw.name,
            total_score: raw.total_score,
            rank,
            normalized_name,
        }
    }

    /// Unique identity of the record.
    pub const fn seating_number(&self) -> u64 {
        self.seating_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn total_score(&self) -> f64 {
        self.total_score
    }

    /// 1-based position by score, ties broken by input order.
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Name in canonical comparison form.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Decimal form of the seating number.
    pub fn id_text(&self) -> &str {
        &self.id_text
    }

    pub const fn is_top_ranked(&self) -> bool {
        self.rank <= TOP_RANK_CUTOFF
    }
}

/// Counts gathered while preparing a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrepareReport {
    /// Records in the raw input.
    pub total: usize,
    /// Records ranked into the prepared set.
    pub accepted: usize,
    /// Valid records excluded for scoring above the eligibility ceiling.
    pub ineligible: usize,
    /// Defective records dropped under the lenient policy.
    pub skipped: usize,
}

/// Immutable, rank-ordered record set shared by every search.
///
/// `records()[i].rank() == i + 1` holds for every index.
#[derive(Debug, Clone, Default)]
pub struct PreparedDataset {
    records: Vec<PreparedRecord>,
    report: PrepareReport,
}

impl PreparedDataset {
    /// Prepare already-decoded records.
    ///
    /// Duplicate seating numbers are the only defect possible here and are
    /// handled by the configured policy.
    pub fn prepare(records: Vec<RawRecord>, config: &DatasetConfig) -> Result<Self, SearchError> {
        Self::build(records.into_iter().map(Ok).collect(), config)
    }

    /// Decode and prepare raw JSON records.
    pub fn from_values(values: &[Value], config: &DatasetConfig) -> Result<Self, SearchError> {
        Self::build(values.iter().map(RawRecord::from_value).collect(), config)
    }

    /// Decode and prepare a JSON array of records.
    pub fn from_json_str(text: &str, config: &DatasetConfig) -> Result<Self, SearchError> {
        let values: Vec<Value> = serde_json::from_str(text)?;
        Self::from_values(&values, config)
    }

    fn build(
        decoded: Vec<Result<RawRecord, RecordDefect>>,
        config: &DatasetConfig,
    ) -> Result<Self, SearchError> {
        let start = std::time::Instant::now();
        let total = decoded.len();

        let mut seen = HashSet::with_capacity(total);
        let mut valid = Vec::with_capacity(total);
        let mut defects = Vec::new();

        for (position, entry) in decoded.into_iter().enumerate() {
            let checked = entry.and_then(|record| {
                if !record.total_score.is_finite() {
                    Err(RecordDefect::NonNumericScore)
                } else if seen.insert(record.seating_number) {
                    Ok(record)
                } else {
                    Err(RecordDefect::DuplicateSeatingNumber(record.seating_number))
                }
            });
            match checked {
                Ok(record) => valid.push(record),
                Err(defect) => defects.push((position, defect)),
            }
        }

        if let Some((position, defect)) = defects.first() {
            match config.policy {
                DatasetPolicy::Strict => {
                    return Err(SearchError::MalformedDataset {
                        position: *position,
                        defect: defect.clone(),
                        defective: defects.len(),
                        total,
                    });
                }
                DatasetPolicy::Lenient => {
                    for (position, defect) in &defects {
                        tracing::debug!("Skipping record {}: {}", position, defect);
                    }
                    tracing::warn!(
                        "Skipped {} of {} records with missing or invalid fields",
                        defects.len(),
                        total
                    );
                }
            }
        }

        let valid_count = valid.len();
        let mut eligible: Vec<RawRecord> = valid
            .into_iter()
            .filter(|record| record.total_score <= config.max_eligible_score)
            .collect();

        // Stable sort: equal scores keep input order, which decides their ranks.
        // Scores are finite here, and -0.0 must tie with 0.0.
        eligible.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(Ordering::Equal)
        });

        let records: Vec<PreparedRecord> = eligible
            .into_iter()
            .enumerate()
            .map(|(index, raw)| PreparedRecord::new(raw, index + 1))
            .collect();

        let report = PrepareReport {
            total,
            accepted: records.len(),
            ineligible: valid_count - records.len(),
            skipped: defects.len(),
        };

        tracing::info!(
            "Prepared dataset: {} ranked, {} ineligible, {} skipped in {:?}",
            report.accepted,
            report.ineligible,
            report.skipped,
            start.elapsed()
        );

        Ok(Self { records, report })
    }

    /// Records in rank order.
    pub fn records(&self) -> &[PreparedRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&PreparedRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub const fn report(&self) -> PrepareReport {
        self.report
    }

    /// Look up a record by its seating number.
    pub fn find_by_seating_number(&self, seating_number: u64) -> Option<&PreparedRecord> {
        self.records
            .iter()
            .find(|record| record.seating_number == seating_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use serde_json::json;

    fn strict() -> DatasetConfig {
        DatasetConfig {
            policy: DatasetPolicy::Strict,
            ..DatasetConfig::default()
        }
    }

    #[test]
    fn test_ties_rank_in_input_order() {
        let dataset = PreparedDataset::prepare(
            vec![
                RawRecord::new(1, "Ahmed", 300.0),
                RawRecord::new(2, "Amjad", 300.0),
                RawRecord::new(3, "Ali", 200.0),
            ],
            &DatasetConfig::default(),
        )
        .unwrap();

        let ranked: Vec<(u64, usize)> = dataset
            .records()
            .iter()
            .map(|r| (r.seating_number(), r.rank()))
            .collect();
        check!(ranked == vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_ranks_by_score_descending() {
        let dataset = PreparedDataset::prepare(
            vec![
                RawRecord::new(10, "low", 100.0),
                RawRecord::new(11, "high", 310.0),
                RawRecord::new(12, "mid", 250.5),
                RawRecord::new(13, "mid-tie", 250.5),
            ],
            &DatasetConfig::default(),
        )
        .unwrap();

        let order: Vec<u64> = dataset.records().iter().map(PreparedRecord::seating_number).collect();
        check!(order == vec![11, 12, 13, 10]);
        for (index, record) in dataset.records().iter().enumerate() {
            check!(record.rank() == index + 1);
        }
    }

    #[test]
    fn test_excludes_records_above_ceiling() {
        let dataset = PreparedDataset::prepare(
            vec![
                RawRecord::new(1, "over", 320.5),
                RawRecord::new(2, "at", 320.0),
                RawRecord::new(3, "under", 10.0),
            ],
            &DatasetConfig::default(),
        )
        .unwrap();

        check!(dataset.len() == 2);
        check!(dataset.find_by_seating_number(1).is_none());
        check!(dataset.records()[0].seating_number() == 2);
        check!(dataset.report().ineligible == 1);
    }

    #[test]
    fn test_all_ineligible_gives_empty_dataset() {
        let dataset = PreparedDataset::prepare(
            vec![RawRecord::new(1, "a", 400.0), RawRecord::new(2, "b", 321.0)],
            &DatasetConfig::default(),
        )
        .unwrap();
        check!(dataset.is_empty());
        check!(dataset.report().accepted == 0);
    }

    #[test]
    fn test_precomputes_match_keys() {
        let dataset =
            PreparedDataset::prepare(vec![RawRecord::new(4021, "أحمد", 1.0)], &DatasetConfig::default())
                .unwrap();
        let record = &dataset.records()[0];
        check!(record.normalized_name() == "احمد");
        check!(record.name() == "أحمد");
        check!(record.id_text() == "4021");
    }

    #[test]
    fn test_top_ranked_flag() {
        let records = (0..12).map(|i| RawRecord::new(i, "x", 300.0 - i as f64)).collect();
        let dataset = PreparedDataset::prepare(records, &DatasetConfig::default()).unwrap();
        check!(dataset.records()[9].is_top_ranked());
        check!(!dataset.records()[10].is_top_ranked());
    }

    #[test]
    fn test_lenient_policy_skips_defects() {
        let values = vec![
            json!({"seating_no": 1, "arabic_name": "علي", "total_degree": 250}),
            json!({"seating_no": 2, "arabic_name": "حسن"}),
            json!({"seating_no": 3, "arabic_name": "منى", "total_degree": "n/a"}),
            json!({"seating_no": 1, "arabic_name": "نسخة", "total_degree": 100}),
            json!({"seating_no": 4, "arabic_name": "سارة", "total_degree": 260}),
        ];
        let dataset = PreparedDataset::from_values(&values, &DatasetConfig::default()).unwrap();

        check!(dataset.len() == 2);
        check!(
            dataset.report()
                == PrepareReport {
                    total: 5,
                    accepted: 2,
                    ineligible: 0,
                    skipped: 3,
                }
        );
        check!(dataset.records()[0].seating_number() == 4);
    }

    #[test]
    fn test_strict_policy_fails_on_first_defect() {
        let values = vec![
            json!({"seating_no": 1, "arabic_name": "علي", "total_degree": 250}),
            json!({"seating_no": 2, "total_degree": 250}),
            json!({"seating_no": 3, "arabic_name": "منى", "total_degree": "n/a"}),
        ];
        let err = PreparedDataset::from_values(&values, &strict()).unwrap_err();

        let SearchError::MalformedDataset {
            position,
            defect,
            defective,
            total,
        } = err
        else {
            panic!("expected MalformedDataset");
        };
        check!(position == 1);
        check!(defect == RecordDefect::MissingField("name"));
        check!(defective == 2);
        check!(total == 3);
    }

    #[test]
    fn test_strict_policy_rejects_duplicate_ids() {
        let err = PreparedDataset::prepare(
            vec![RawRecord::new(5, "a", 1.0), RawRecord::new(5, "b", 2.0)],
            &strict(),
        )
        .unwrap_err();
        check!(let SearchError::MalformedDataset { defect: RecordDefect::DuplicateSeatingNumber(5), .. } = err);
    }

    #[test]
    fn test_strict_policy_rejects_non_finite_scores() {
        let records = vec![
            RawRecord::new(1, "Ahmed", f64::NAN),
            RawRecord::new(2, "Amjad", f64::NEG_INFINITY),
            RawRecord::new(3, "Ali", 200.0),
        ];
        let err = PreparedDataset::prepare(records, &strict()).unwrap_err();
        check!(let SearchError::MalformedDataset {
            position: 0,
            defect: RecordDefect::NonNumericScore,
            defective: 2,
            total: 3,
        } = err);
    }

    #[test]
    fn test_lenient_policy_skips_non_finite_scores() {
        let records = vec![
            RawRecord::new(1, "Ahmed", f64::NAN),
            RawRecord::new(2, "Amjad", f64::NEG_INFINITY),
            RawRecord::new(3, "Ali", 200.0),
            RawRecord::new(4, "Mona", f64::INFINITY),
        ];
        let dataset = PreparedDataset::prepare(records, &DatasetConfig::default()).unwrap();

        check!(dataset.report().skipped == 3);
        check!(dataset.report().ineligible == 0);
        check!(dataset.len() == 1);
        check!(dataset.records()[0].seating_number() == 3);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let records = vec![RawRecord::new(1, "first", -0.0), RawRecord::new(2, "second", 0.0)];
        let dataset = PreparedDataset::prepare(records, &DatasetConfig::default()).unwrap();

        let order: Vec<u64> = dataset.records().iter().map(PreparedRecord::seating_number).collect();
        check!(order == [1, 2]);
    }

    #[test]
    fn test_from_json_str() {
        let dataset = PreparedDataset::from_json_str(
            r#"[{"seatingNumber": 9, "name": "Mona", "totalScore": 299}]"#,
            &DatasetConfig::default(),
        )
        .unwrap();
        check!(dataset.len() == 1);

        let err = PreparedDataset::from_json_str("{\"not\": \"an array\"}", &DatasetConfig::default());
        check!(let Err(SearchError::Decode(_)) = err);
    }
}
