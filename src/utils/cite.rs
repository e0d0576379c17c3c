//! Citation formatting.
//!
//! Every citation renders as four lines:
//!
//! ```text
//! Title of the paper: {title}
//! Authors: {authors}
//! Journal: {journal}
//! [Link]({url})
//! ```
//!
//! where `{url}` is an "I'm Feeling Lucky" search for the form-encoded title.

use url::form_urlencoded;

use crate::models::CitationRecord;

const LUCKY_SEARCH_BASE: &str = "https://www.google.com/search";
const LUCKY_SUFFIX: &str = "&btnI=I%27m%20Feeling%20Lucky";

/// Build the search-engine redirect link for a title
pub fn lucky_search_url(title: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
    format!("{}?q={}{}", LUCKY_SEARCH_BASE, encoded, LUCKY_SUFFIX)
}

/// Format a citation record as a four-line text block
pub fn format_citation(record: &CitationRecord) -> String {
    format!(
        "Title of the paper: {}\nAuthors: {}\nJournal: {}\n[Link]({})\n",
        record.title,
        record.authors,
        record.journal,
        lucky_search_url(&record.title)
    )
}

/// Format a citation with its 1-based position header
pub fn format_numbered(position: usize, record: &CitationRecord) -> String {
    format!("--- Citation {} ---\n{}", position, format_citation(record))
}
