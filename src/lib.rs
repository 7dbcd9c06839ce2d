//! Ranked examination-result search.
//!
//! A raw list of examination records is prepared once into a ranked,
//! search-ready [`PreparedDataset`]. A [`SearchEngine`] then runs one query
//! session at a time over it, matching by seating number or by name, with
//! cancellation, supersession and an elapsed-time clock.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod search;

pub use config::Config;
pub use dataset::{PrepareReport, PreparedDataset, PreparedRecord, RawRecord};
pub use engine::{SearchEngine, SearchResults, SearchState, SearchStatus, SessionHandle};
pub use error::{RecordDefect, SearchError, ValidationError};
pub use search::{CompiledQuery, MatchMode};
