//! Decoding of loosely typed input records.

use crate::error::RecordDefect;
use serde_json::{Map, Value};

/// Keys accepted for each field, in lookup order.
const SEATING_KEYS: &[&str] = &["seatingNumber", "seating_number", "seating_no"];
const NAME_KEYS: &[&str] = &["name", "arabic_name"];
const SCORE_KEYS: &[&str] = &["totalScore", "total_score", "total_degree"];

/// One examination result as supplied by the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub seating_number: u64,
    pub name: String,
    pub total_score: f64,
}

impl RawRecord {
    pub fn new(seating_number: u64, name: impl Into<String>, total_score: f64) -> Self {
        Self {
            seating_number,
            name: name.into(),
            total_score,
        }
    }

    /// Decode a record from a JSON object.
    ///
    /// Seating numbers may be integers or digit strings, scores may be numbers
    /// or numeric strings. A `null` field counts as missing.
    pub fn from_value(value: &Value) -> Result<Self, RecordDefect> {
        let object = value.as_object().ok_or(RecordDefect::NotAnObject)?;

        let seating_number = parse_seating_number(field(object, SEATING_KEYS, "seatingNumber")?)?;
        let name = field(object, NAME_KEYS, "name")?
            .as_str()
            .ok_or(RecordDefect::InvalidName)?
            .to_owned();
        let total_score = parse_score(field(object, SCORE_KEYS, "totalScore")?)?;

        Ok(Self {
            seating_number,
            name,
            total_score,
        })
    }
}

fn field<'a>(
    object: &'a Map<String, Value>,
    keys: &[&str],
    canonical: &'static str,
) -> Result<&'a Value, RecordDefect> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .filter(|value| !value.is_null())
        .ok_or(RecordDefect::MissingField(canonical))
}

fn parse_seating_number(value: &Value) -> Result<u64, RecordDefect> {
    match value {
        Value::Number(number) => number.as_u64().ok_or(RecordDefect::InvalidSeatingNumber),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RecordDefect::InvalidSeatingNumber);
            }
            text.parse().map_err(|_| RecordDefect::InvalidSeatingNumber)
        }
        _ => Err(RecordDefect::InvalidSeatingNumber),
    }
}

fn parse_score(value: &Value) -> Result<f64, RecordDefect> {
    let score = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|score| score.is_finite())
        .ok_or(RecordDefect::NonNumericScore)
}
