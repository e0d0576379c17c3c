//! Citation record model representing one retrieved bibliographic entry.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Placeholder used for any text field the source did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// A single bibliographic entry parsed from a literature database
///
/// Records are built once while parsing a fetch response and are never
/// modified afterwards; every later stage consumes or reorders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Article title, `"N/A"` if absent
    pub title: String,

    /// Authors formatted as `"Last Initials, Last Initials"`, `"N/A"` if none
    pub authors: String,

    /// Journal title, `"N/A"` if absent
    pub journal: String,

    /// Publication date, absent when the source supplied no parseable year
    pub publication_date: Option<NaiveDate>,

    /// Publication type labels, verbatim and in source order
    pub publication_types: Vec<String>,
}

impl CitationRecord {
    /// Year of publication, if a date is known
    pub fn publication_year(&self) -> Option<i32> {
        self.publication_date.map(|d| d.year())
    }
}

impl Default for CitationRecord {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            authors: NOT_AVAILABLE.to_string(),
            journal: NOT_AVAILABLE.to_string(),
            publication_date: None,
            publication_types: Vec::new(),
        }
    }
}

/// Builder for constructing [`CitationRecord`] values
///
/// Empty or whitespace-only text is treated as missing and keeps the `"N/A"` default.
#[derive(Debug, Clone, Default)]
pub struct CitationRecordBuilder {
    record: CitationRecord,
}

impl CitationRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn title(mut self, title: impl AsRef<str>) -> Self {
        if let Some(title) = non_empty(title.as_ref()) {
            self.record.title = title;
        }
        self
    }

    /// Set the pre-formatted author string
    pub fn authors(mut self, authors: impl AsRef<str>) -> Self {
        if let Some(authors) = non_empty(authors.as_ref()) {
            self.record.authors = authors;
        }
        self
    }

    /// Set the author list, joining names with `", "`
    pub fn author_list<I, S>(self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = authors
            .into_iter()
            .filter_map(|a| non_empty(a.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        self.authors(joined)
    }

    /// Set the journal title
    pub fn journal(mut self, journal: impl AsRef<str>) -> Self {
        if let Some(journal) = non_empty(journal.as_ref()) {
            self.record.journal = journal;
        }
        self
    }

    /// Set the publication date
    pub fn publication_date(mut self, date: Option<NaiveDate>) -> Self {
        self.record.publication_date = date;
        self
    }

    /// Add a publication type label
    pub fn publication_type(mut self, label: impl Into<String>) -> Self {
        self.record.publication_types.push(label.into());
        self
    }

    /// Set all publication type labels
    pub fn publication_types<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.publication_types = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> CitationRecord {
        self.record
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
