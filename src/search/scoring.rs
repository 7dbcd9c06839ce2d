//! Similarity scoring for fuzzy name matching.
//!
//! Names are partial on both sides: a user types two or three of the four
//! names a record carries, often with a misspelled letter. Scoring therefore
//! works per query token against the best name token instead of comparing
//! whole strings.

use rapidfuzz::distance::jaro_winkler;

/// Similarity of one query token to a name, in `[0, 1]`.
///
/// - 1.0: the token occurs verbatim inside the name
/// - otherwise: the best Jaro-Winkler similarity against any single name word
pub fn token_similarity(token: &str, name: &str) -> f64 {
    if name.contains(token) {
        return 1.0;
    }

    name.split_whitespace()
        .map(|word| jaro_winkler::similarity(token.chars(), word.chars()))
        .fold(0.0, f64::max)
}

/// Similarity of a tokenized query to a name: the mean of per-token scores.
///
/// Returns 0.0 for an empty token list.
pub fn name_similarity(name: &str, tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = tokens
        .iter()
        .map(|token| token_similarity(token, name))
        .sum();
    total / tokens.len() as f64
}
