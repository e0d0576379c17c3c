//! Normalized search terms derived from a free-text question.

use serde::Serialize;
use std::collections::BTreeSet;

/// Deduplicated bag of search tokens
///
/// Backed by an ordered set so the joined search string is deterministic.
/// An empty set means the question had no searchable content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TermSet {
    terms: BTreeSet<String>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term; returns `false` if it was already present
    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        self.terms.insert(term.into())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Join all terms with single spaces into one search string
    pub fn to_query_string(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for TermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(Into::into).collect(),
        }
    }
}
