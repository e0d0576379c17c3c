//! Citation retrieval orchestration.
//!
//! [`CitationService`] runs the pipeline for one question:
//! extract terms, search the literature source (over-fetching by a fixed factor),
//! rank, then format the top results. Each call owns its records; nothing is
//! shared between concurrent calls.

use std::sync::Arc;

use crate::models::{CitationQuery, CitationRecord, DEFAULT_NUM_CITATIONS};
use crate::sources::LiteratureSource;
use crate::utils::{format_numbered, CitationRanker, TermExtractor};

/// Returned as the only element when no citations could be produced
pub const NO_CITATIONS_MESSAGE: &str = "Not able to scrape citations for this question.";

/// Default over-fetch factor applied to the requested citation count
pub const DEFAULT_OVERFETCH_FACTOR: usize = 2;

/// Retrieves, ranks and formats citations for free-text questions
#[derive(Debug, Clone)]
pub struct CitationService {
    source: Arc<dyn LiteratureSource>,
    extractor: TermExtractor,
    ranker: CitationRanker,
    overfetch_factor: usize,
}

impl CitationService {
    /// Create a service backed by `source`
    pub fn new(source: Arc<dyn LiteratureSource>) -> Self {
        Self {
            source,
            extractor: TermExtractor::new(),
            ranker: CitationRanker::new(),
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
        }
    }

    /// Use a specific ranker (e.g. with a fixed reference year)
    pub fn with_ranker(mut self, ranker: CitationRanker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Set how many candidates to fetch per requested citation (at least 1)
    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// The literature source this service queries
    pub fn source(&self) -> &Arc<dyn LiteratureSource> {
        &self.source
    }

    /// Retrieve up to `num_citations` formatted citations for `query`
    ///
    /// A count of 0 is treated as 1. When no terms can be extracted or the
    /// source returns nothing, the result is `[NO_CITATIONS_MESSAGE]`.
    pub async fn retrieve_and_rank_citations(
        &self,
        query: &str,
        num_citations: usize,
    ) -> Vec<String> {
        let num_citations = num_citations.max(1);

        let terms = self.extractor.extract(query);
        if terms.is_empty() {
            tracing::info!("No search terms extracted, cannot search for citations");
            return vec![NO_CITATIONS_MESSAGE.to_string()];
        }

        let limit = num_citations.saturating_mul(self.overfetch_factor);
        tracing::debug!(
            source = self.source.name(),
            terms = %terms.to_query_string(),
            limit,
            "Searching for citations"
        );
        let records = self.source.search(&terms, limit).await;
        if records.is_empty() {
            tracing::info!(source = self.source.id(), "No citations retrieved");
            return vec![NO_CITATIONS_MESSAGE.to_string()];
        }

        let ranked = self.ranker.rank(records);
        let formatted = format_top(&ranked, num_citations);
        tracing::info!(
            retrieved = ranked.len(),
            returned = formatted.len(),
            "Citations ready"
        );
        formatted
    }

    /// Run the pipeline for a [`CitationQuery`]
    pub async fn retrieve(&self, query: &CitationQuery) -> Vec<String> {
        self.retrieve_and_rank_citations(&query.query, query.num_citations)
            .await
    }

    /// Run the pipeline with the default citation count
    pub async fn retrieve_default(&self, query: &str) -> Vec<String> {
        self.retrieve_and_rank_citations(query, DEFAULT_NUM_CITATIONS)
            .await
    }
}

fn format_top(ranked: &[CitationRecord], count: usize) -> Vec<String> {
    ranked
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, record)| format_numbered(i + 1, record))
        .collect()
}
