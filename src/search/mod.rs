//! Text matching for examination records.
//!
//! This module provides name normalization, query compilation, the per-record
//! match decision under each matching mode, fuzzy similarity scoring, and
//! paging of result lists.

// Module declarations
pub(crate) mod matcher;
pub(crate) mod normalize;
pub mod pager;
pub(crate) mod scoring;

// Public re-exports (used via lib.rs)
pub use matcher::{CompiledQuery, Hit, MatchMode, is_identifier_query, matches, order_hits, scan_all};
pub use normalize::normalize;
pub use pager::{Page, page, page_count};
pub use scoring::{name_similarity, token_similarity};

// Internal re-exports
pub(crate) use matcher::scan_range;
