//! Configuration management.
//!
//! Configuration comes from defaults, an optional TOML file and environment
//! variables prefixed with `CITATION_RETRIEVAL` (nested keys use `__`, e.g.
//! `CITATION_RETRIEVAL__HTTP__TIMEOUT_SECS=10`). The NCBI key defaults to the
//! `NCBI_API_KEY` environment variable.
//!
//! ```toml
//! [api_keys]
//! ncbi = "your-ncbi-api-key"
//!
//! [retrieval]
//! default_citations = 3
//! overfetch_factor = 2
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! eutils_base_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//!
//! [retry]
//! max_attempts = 2
//! initial_delay_ms = 500
//! max_delay_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::service::CitationService;
use crate::sources::{PubMedClient, SourceError, EUTILS_BASE_URL};
use crate::utils::{CitationRanker, HttpClient, RetryConfig, DEFAULT_USER_AGENT};

/// Environment variable holding the NCBI API key
pub const NCBI_API_KEY_ENV: &str = "NCBI_API_KEY";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CITATION_RETRIEVAL";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "citation-retrieval.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry settings for transient failures
    #[serde(default)]
    pub retry: RetrySettings,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// NCBI E-utilities API key
    #[serde(default = "default_ncbi_key")]
    pub ncbi: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            ncbi: default_ncbi_key(),
        }
    }
}

fn default_ncbi_key() -> Option<String> {
    std::env::var(NCBI_API_KEY_ENV).ok()
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Citations returned when the caller does not ask for a count
    #[serde(default = "default_citations")]
    pub default_citations: usize,

    /// Candidates fetched per requested citation
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_citations: default_citations(),
            overfetch_factor: default_overfetch_factor(),
        }
    }
}

fn default_citations() -> usize {
    crate::models::DEFAULT_NUM_CITATIONS
}

fn default_overfetch_factor() -> usize {
    crate::service::DEFAULT_OVERFETCH_FACTOR
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// E-utilities base URL
    #[serde(default = "default_eutils_base_url")]
    pub eutils_base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            eutils_base_url: default_eutils_base_url(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_eutils_base_url() -> String {
    EUTILS_BASE_URL.to_string()
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on the delay between retries in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    2
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5000
}

impl RetrySettings {
    /// Convert to the transport retry policy
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..RetryConfig::default()
        }
        .max_attempts(self.max_attempts)
    }
}

impl Config {
    /// Build a PubMed client from this configuration
    pub fn pubmed_client(&self) -> Result<PubMedClient, SourceError> {
        let http = HttpClient::with_settings(
            &self.http.user_agent,
            Duration::from_secs(self.http.timeout_secs),
            Duration::from_secs(self.http.connect_timeout_secs),
        )?;

        Ok(PubMedClient::with_client(http, self.api_keys.ncbi.clone())
            .with_base_url(self.http.eutils_base_url.clone())
            .with_retry_config(self.retry.to_retry_config()))
    }

    /// Build a citation service backed by PubMed
    pub fn citation_service(&self) -> Result<CitationService, SourceError> {
        let client = self.pubmed_client()?;
        Ok(CitationService::new(Arc::new(client))
            .with_ranker(CitationRanker::new())
            .with_overfetch_factor(self.retrieval.overfetch_factor))
    }
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build_config(Some(path), environment())
}

/// Load configuration from defaults and environment overrides only
pub fn get_config() -> Result<Config, config::ConfigError> {
    build_config(None, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build_config(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder.add_source(environment).build()?.try_deserialize()
}

/// Find a configuration file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("citation-retrieval").join("config.toml"))
        .filter(|path| path.is_file())
}
