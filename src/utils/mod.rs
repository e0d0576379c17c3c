//! Utility modules supporting citation retrieval.
//!
//! - [`TermExtractor`]: Derive search terms from a free-text question
//! - [`CitationRanker`]: Order citations by publication type and recency
//! - [`format_citation`]: Render a citation as a four-line text block
//! - [`HttpClient`]: Shared HTTP client with timeouts
//! - [`RetryConfig`] / [`with_retry`]: Retry transient transport errors with backoff
//!
//! # Ranking
//!
//! ```rust
//! use citation_retrieval::models::CitationRecordBuilder;
//! use citation_retrieval::utils::CitationRanker;
//!
//! let ranker = CitationRanker::with_current_year(2025);
//! let ranked = ranker.rank(vec![
//!     CitationRecordBuilder::new().title("A letter").publication_type("Letter").build(),
//!     CitationRecordBuilder::new().title("A review").publication_type("Review").build(),
//! ]);
//! assert_eq!(ranked[0].title, "A review");
//! ```

pub mod cite;
mod http;
pub mod rank;
pub mod retry;
pub mod terms;

pub use cite::{format_citation, format_numbered, lucky_search_url};
pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use rank::{type_priority, CitationRanker};
pub use retry::{with_retry, RetryConfig, TransientError};
pub use terms::{TermExtractor, STOP_WORDS};
