//! # Citation Retrieval
//!
//! Answers a free-text biomedical question with a short, ranked list of
//! formatted PubMed citations.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (CitationRecord, TermSet, CitationQuery)
//! - [`sources`]: Literature sources behind the [`LiteratureSource`] trait, including PubMed
//! - [`utils`]: Term extraction, ranking, formatting, HTTP client and retry
//! - [`service`]: The retrieval pipeline tying the pieces together
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use citation_retrieval::{CitationService, PubMedClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PubMedClient::new(Some("your-ncbi-api-key".to_string()))?;
//! let service = CitationService::new(Arc::new(client));
//!
//! for block in service.retrieve_and_rank_citations("Role of APOE in neurodegeneration", 2).await {
//!     println!("{}", block);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod service;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{CitationRecord, TermSet};
pub use service::{CitationService, NO_CITATIONS_MESSAGE};
pub use sources::{LiteratureSource, PubMedClient, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
