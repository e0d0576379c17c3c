//! Literature sources.
//!
//! A [`LiteratureSource`] turns a [`TermSet`] into citation records. Sources fail
//! soft: transport errors, bad status codes, malformed bodies and missing
//! credentials are logged and reported as an empty result, never raised to the
//! caller. [`SourceError`] is the internal error type used on the fallible path
//! before that conversion.
//!
//! - [`PubMedClient`]: NCBI E-utilities (esearch + efetch)
//! - [`MockSource`]: canned records for tests

mod pubmed;

pub mod mock;

pub use mock::MockSource;
pub use pubmed::{PubMedClient, EUTILS_BASE_URL};

use crate::models::{CitationRecord, TermSet};
use async_trait::async_trait;

/// Interface for bibliographic databases that can be searched by keyword
#[async_trait]
pub trait LiteratureSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for up to `limit` records matching `terms`
    ///
    /// Returns an empty list when nothing was found or the lookup failed.
    async fn search(&self, terms: &TermSet, limit: usize) -> Vec<CitationRecord>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No API key was configured for a source that requires one
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("{endpoint} returned HTTP status {status}")]
    Status { status: u16, endpoint: &'static str },

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Network(format!("Request timed out: {}", err))
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
