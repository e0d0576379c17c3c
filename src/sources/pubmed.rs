//! PubMed literature source using the NCBI E-utilities API.
//!
//! A lookup is two sequential requests: `esearch.fcgi` turns the joined search
//! terms into PubMed IDs (JSON), then `efetch.fcgi` returns the full records for
//! all IDs in one batch (XML). Each `PubmedArticle` is parsed on its own so a
//! single malformed record is skipped without losing the rest of the batch.

use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::models::{CitationRecord, CitationRecordBuilder, TermSet};
use crate::sources::{LiteratureSource, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// NCBI E-utilities base URL
pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

const ESEARCH_PATH: &str = "esearch.fcgi";
const EFETCH_PATH: &str = "efetch.fcgi";

/// PubMed client
///
/// The NCBI API key is supplied at construction time; a client without a key
/// returns no results.
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    retry: RetryConfig,
}

impl PubMedClient {
    /// Create a new PubMed client with a default HTTP client
    pub fn new(api_key: Option<String>) -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?, api_key))
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: HttpClient, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: EUTILS_BASE_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different E-utilities base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retry policy for both requests
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SourceError::MissingApiKey("PubMed".to_string()))
    }

    /// Search and fetch, surfacing every failure as an error
    pub async fn try_search(
        &self,
        terms: &TermSet,
        limit: usize,
    ) -> Result<Vec<CitationRecord>, SourceError> {
        let term = terms.to_query_string();
        if term.trim().is_empty() {
            tracing::info!("Search term is empty, skipping PubMed lookup");
            return Ok(Vec::new());
        }

        let ids = self.esearch(&term, limit).await?;
        if ids.is_empty() {
            tracing::info!(term = %term, "No PubMed IDs found");
            return Ok(Vec::new());
        }

        let records = self.efetch(&ids).await?;
        tracing::info!(count = records.len(), "Retrieved detailed citations");
        Ok(records)
    }

    /// Identifier search: returns up to `limit` PubMed IDs for `term`
    pub async fn esearch(&self, term: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmax", limit.to_string()),
            ("retmode", "json".to_string()),
            ("api_key", self.api_key()?.to_string()),
        ];

        let body = self.get_text(ESEARCH_PATH, "esearch", params).await?;
        let ids = parse_search_response(&body)?;
        tracing::debug!(count = ids.len(), ids = ?ids, "PubMed esearch returned IDs");
        Ok(ids)
    }

    /// Record fetch: returns parsed records for `ids` in one batch request
    pub async fn efetch(&self, ids: &[String]) -> Result<Vec<CitationRecord>, SourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
            ("api_key", self.api_key()?.to_string()),
        ];

        let body = self.get_text(EFETCH_PATH, "efetch", params).await?;
        parse_fetch_response(&body)
    }

    async fn get_text(
        &self,
        path: &str,
        endpoint: &'static str,
        params: Vec<(&'static str, String)>,
    ) -> Result<String, SourceError> {
        let url = format!("{}/{}", self.base_url, path);
        let client = self.client.clone();

        with_retry(self.retry, || {
            let client = client.clone();
            let url = url.clone();
            let params = params.clone();
            async move {
                let response = client.get(&url).query(&params).send().await?;

                let status = response.status();
                tracing::debug!(endpoint, status = status.as_u16(), "E-utilities response");
                if !status.is_success() {
                    return Err(SourceError::Status {
                        status: status.as_u16(),
                        endpoint,
                    });
                }

                response.text().await.map_err(|e| {
                    SourceError::Network(format!("Failed to read {} response: {}", endpoint, e))
                })
            }
        })
        .await
    }
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search(&self, terms: &TermSet, limit: usize) -> Vec<CitationRecord> {
        match self.try_search(terms, limit).await {
            Ok(records) => records,
            Err(err @ SourceError::MissingApiKey(_)) => {
                tracing::error!(error = %err, "Cannot query PubMed without an API key");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "PubMed lookup failed, returning no results");
                Vec::new()
            }
        }
    }
}

/// Parse an esearch JSON body into PubMed IDs
fn parse_search_response(body: &str) -> Result<Vec<String>, SourceError> {
    #[derive(Debug, Deserialize)]
    struct ESearchEnvelope {
        #[serde(default)]
        esearchresult: ESearchResult,
    }

    #[derive(Debug, Default, Deserialize)]
    struct ESearchResult {
        #[serde(default)]
        idlist: Vec<String>,
        #[serde(rename = "ERROR", default)]
        error: Option<String>,
    }

    let envelope: ESearchEnvelope = serde_json::from_str(body)?;
    if let Some(error) = &envelope.esearchresult.error {
        tracing::warn!(error = %error, "PubMed esearch reported an error");
    }
    Ok(envelope.esearchresult.idlist)
}

/// Parse an efetch XML document into citation records
///
/// A document-level XML error fails the whole batch; an error inside one
/// `PubmedArticle` only drops that record.
fn parse_fetch_response(xml: &str) -> Result<Vec<CitationRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut position = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) if start.local_name().as_ref() == b"PubmedArticle" => {
                position += 1;
                let span = reader.read_to_end(start.name())?;
                let inner = &xml[span.start as usize..span.end as usize];

                match parse_article(inner) {
                    Ok(record) => {
                        tracing::debug!(
                            title = %record.title,
                            authors = %record.authors,
                            journal = %record.journal,
                            "Parsed article"
                        );
                        records.push(record);
                    }
                    Err(err) => {
                        let preview: String = inner.chars().take(200).collect();
                        tracing::warn!(
                            position,
                            error = %err,
                            article = %preview,
                            "Skipping malformed PubMed article"
                        );
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

#[derive(Debug, Default)]
struct AuthorParts {
    last_name: Option<String>,
    fore_name: Option<String>,
    initials: Option<String>,
}

impl AuthorParts {
    /// "LastName Initials", falling back to "LastName ForeName"
    fn display_name(&self) -> Option<String> {
        let given = self.initials.as_deref().or(self.fore_name.as_deref());
        let parts: Vec<&str> = self.last_name.as_deref().into_iter().chain(given).collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Default)]
struct DateParts {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
}

impl DateParts {
    /// Full date with missing month/day defaulting to 1, else January 1st of the year
    fn to_date(&self) -> Option<NaiveDate> {
        let year: i32 = self.year.as_deref()?.trim().parse().ok()?;
        if !(1..=9999).contains(&year) {
            return None;
        }

        let month = self.month.as_deref().map_or(Ok(1), |m| m.trim().parse::<u32>());
        let day = self.day.as_deref().map_or(Ok(1), |d| d.trim().parse::<u32>());

        if let (Ok(month), Ok(day)) = (month, day) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
        NaiveDate::from_ymd_opt(year, 1, 1)
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the content of one `PubmedArticle` element
fn parse_article(inner: &str) -> Result<CitationRecord, SourceError> {
    let wrapped = format!("<PubmedArticle>{}</PubmedArticle>", inner);
    let mut reader = Reader::from_str(&wrapped);

    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut title: Option<String> = None;
    let mut title_buf: Option<String> = None;
    let mut journal: Option<String> = None;
    let mut authors: Vec<String> = Vec::new();
    let mut author: Option<AuthorParts> = None;
    let mut date = DateParts::default();
    let mut in_pub_date = false;
    let mut pub_date_seen = false;
    let mut publication_types: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                let parent = path.last().map(String::as_str);

                match (name.as_str(), parent) {
                    ("ArticleTitle", _) if title.is_none() && title_buf.is_none() => {
                        title_buf = Some(String::new());
                    }
                    ("Author", Some("AuthorList")) => author = Some(AuthorParts::default()),
                    ("PubDate", _) if !pub_date_seen => in_pub_date = true,
                    _ => {}
                }

                path.push(name);
                text.clear();
            }
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                let parent = path.last().map(String::as_str);

                match (name.as_str(), parent) {
                    ("ArticleTitle", _) => {
                        if let Some(buf) = title_buf.take() {
                            title = non_empty(&buf);
                        }
                    }
                    ("Title", Some("Journal")) if journal.is_none() => journal = non_empty(&text),
                    ("LastName", Some("Author")) => {
                        if let Some(a) = author.as_mut() {
                            a.last_name = non_empty(&text);
                        }
                    }
                    ("ForeName", Some("Author")) => {
                        if let Some(a) = author.as_mut() {
                            a.fore_name = non_empty(&text);
                        }
                    }
                    ("Initials", Some("Author")) => {
                        if let Some(a) = author.as_mut() {
                            a.initials = non_empty(&text);
                        }
                    }
                    ("Author", Some("AuthorList")) => {
                        if let Some(name) = author.take().and_then(|a| a.display_name()) {
                            authors.push(name);
                        }
                    }
                    ("Year", Some("PubDate")) if in_pub_date => date.year = non_empty(&text),
                    ("Month", Some("PubDate")) if in_pub_date => date.month = non_empty(&text),
                    ("Day", Some("PubDate")) if in_pub_date => date.day = non_empty(&text),
                    ("PubDate", _) if in_pub_date => {
                        in_pub_date = false;
                        pub_date_seen = true;
                    }
                    ("PublicationType", Some("PublicationTypeList")) if !text.is_empty() => {
                        publication_types.push(text.clone());
                    }
                    _ => {}
                }

                text.clear();
            }
            Event::Text(content) => {
                let content = content
                    .unescape()
                    .map_err(|e| SourceError::Parse(format!("Invalid text: {}", e)))?;
                text.push_str(&content);
                if let Some(buf) = title_buf.as_mut() {
                    buf.push_str(&content);
                }
            }
            Event::CData(content) => {
                let content = String::from_utf8_lossy(&content).into_owned();
                text.push_str(&content);
                if let Some(buf) = title_buf.as_mut() {
                    buf.push_str(&content);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(CitationRecordBuilder::new()
        .title(title.unwrap_or_default())
        .author_list(authors)
        .journal(journal.unwrap_or_default())
        .publication_date(date.to_date())
        .publication_types(publication_types)
        .build())
}
