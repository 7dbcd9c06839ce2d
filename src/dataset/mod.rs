//! Dataset decoding and preparation.
//!
//! Raw examination records arrive once from the host. They are decoded,
//! filtered to eligible scores, ranked and given their canonical match keys
//! here, then shared read-only by every search.

mod prepare;
mod raw;

pub use prepare::{PrepareReport, PreparedDataset, PreparedRecord, TOP_RANK_CUTOFF};
pub use raw::RawRecord;
