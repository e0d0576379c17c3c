//! Relevance ranking for citation records.
//!
//! `score = type_score * 100 + recency_score`, where `type_score` is the highest
//! priority among a record's publication types and `recency_score` is
//! `max(0, 10 - age_in_years)`. Records with equal scores keep their input order.

use chrono::{Datelike, Local};

use crate::models::CitationRecord;

/// Weight applied to the publication type priority
const TYPE_WEIGHT: i64 = 100;

/// Number of years over which recency contributes to the score
const RECENCY_WINDOW: i64 = 10;

/// Priority of a publication type label; unknown labels score 0
pub fn type_priority(publication_type: &str) -> i64 {
    match publication_type {
        "Review" => 3,
        "Journal Article" | "Clinical Trial" | "Meta-Analysis" | "Guideline" => 2,
        "Case Reports" => 1,
        "Letter" | "Editorial" | "Comment" => 0,
        _ => 0,
    }
}

/// Orders citation records by publication type and recency
#[derive(Debug, Clone, Copy)]
pub struct CitationRanker {
    current_year: i32,
}

impl Default for CitationRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationRanker {
    /// Create a ranker that measures recency against the local current year
    pub fn new() -> Self {
        Self::with_current_year(Local::now().year())
    }

    /// Create a ranker with a fixed reference year
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Highest type priority among the record's publication types
    pub fn type_score(&self, record: &CitationRecord) -> i64 {
        record
            .publication_types
            .iter()
            .map(|t| type_priority(t))
            .max()
            .unwrap_or(0)
    }

    /// Recency contribution; 0 for records without a date
    pub fn recency_score(&self, record: &CitationRecord) -> i64 {
        record
            .publication_year()
            .map(|year| {
                let years_ago = i64::from(self.current_year) - i64::from(year);
                (RECENCY_WINDOW - years_ago).max(0)
            })
            .unwrap_or(0)
    }

    /// Combined relevance score
    pub fn score(&self, record: &CitationRecord) -> i64 {
        self.type_score(record) * TYPE_WEIGHT + self.recency_score(record)
    }

    /// Sort records by descending score, keeping input order among equal scores
    pub fn rank(&self, records: Vec<CitationRecord>) -> Vec<CitationRecord> {
        let mut scored: Vec<(i64, CitationRecord)> = records
            .into_iter()
            .map(|record| (self.score(&record), record))
            .collect();

        // `sort_by` is stable.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        tracing::debug!(count = scored.len(), "Ranked citations");
        scored.into_iter().map(|(_, record)| record).collect()
    }
}
