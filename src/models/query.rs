//! Inbound citation request.

use serde::{Deserialize, Serialize};

/// Number of citations returned when the caller does not ask for a specific count
pub const DEFAULT_NUM_CITATIONS: usize = 3;

/// A free-text question plus the number of citations wanted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationQuery {
    /// The question text
    pub query: String,

    /// Requested number of citations, always at least 1
    #[serde(default = "default_num_citations")]
    pub num_citations: usize,
}

fn default_num_citations() -> usize {
    DEFAULT_NUM_CITATIONS
}

impl CitationQuery {
    /// Create a query with the default citation count
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            num_citations: DEFAULT_NUM_CITATIONS,
        }
    }

    /// Set the citation count; zero is clamped to 1
    pub fn num_citations(mut self, count: usize) -> Self {
        self.num_citations = count.max(1);
        self
    }
}
