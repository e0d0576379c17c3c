//! Search term extraction from free-text biomedical questions.
//!
//! Extraction is a fixed heuristic policy, not named-entity recognition.
//! Three passes are unioned into one [`TermSet`]:
//!
//! 1. Symbol candidates: maximal runs of uppercase letters and digits, optionally
//!    chained with `-` or `_` (`APOE`, `MAPT-STX6`), longer than one character.
//! 2. Interaction cues: the literal tokens `interaction` and `interact`.
//! 3. General words: lowercase word tokens longer than two characters that are not
//!    stop words.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::TermSet;

/// Words never used as search terms
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "and", "or", "in", "on", "with", "for", "of", "what", "which",
    "how", "when", "where", "why", "role", "effect", "about", "tell", "show", "me", "genes",
    "proteins", "pathways",
];

const INTERACTION_CUES: &[&str] = &["interaction", "interact"];

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[A-Z0-9]+(?:[-_][A-Z0-9]+)*\b").expect("symbol pattern is valid")
    })
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"))
}

/// Derives search terms from a question
#[derive(Debug, Clone, Copy, Default)]
pub struct TermExtractor;

impl TermExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the term set for `query`
    ///
    /// Returns an empty set when nothing searchable remains.
    pub fn extract(&self, query: &str) -> TermSet {
        let mut terms = TermSet::new();

        for symbol in symbol_pattern().find_iter(query) {
            let symbol = symbol.as_str();
            if symbol.chars().count() > 1 {
                terms.insert(symbol.to_uppercase());
            }
        }

        let lowered = query.to_lowercase();

        for cue in INTERACTION_CUES {
            if lowered.contains(cue) {
                terms.insert(*cue);
            }
        }

        for word in word_pattern().find_iter(&lowered) {
            let word = word.as_str();
            let length = word.chars().count();
            if length <= 2 || STOP_WORDS.contains(&word) {
                continue;
            }
            // Short words that collide with a symbol are already covered by it.
            if !terms.contains(&word.to_uppercase()) || length > 3 {
                terms.insert(word);
            }
        }

        tracing::debug!(terms = ?terms.iter().collect::<Vec<_>>(), "Extracted search terms");
        terms
    }
}
