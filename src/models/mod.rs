//! Core data models for citation retrieval.

mod citation;
mod query;
mod terms;

pub use citation::{CitationRecord, CitationRecordBuilder, NOT_AVAILABLE};
pub use query::{CitationQuery, DEFAULT_NUM_CITATIONS};
pub use terms::TermSet;
