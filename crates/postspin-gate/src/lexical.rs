//! Best-effort detection of source-specific names in generated text.
//!
//! This is a lexical check only: it compares capitalised tokens, not meaning. A hit
//! means a name from the source post's author or company-specific details appears
//! verbatim in the output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Capitalised words, allowing inner `-`, `'`, `&` and `.` (e.g. `O'Neil`, `AT&T`).
static CAPITALISED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}[\p{L}\p{N}]*(?:[-'&.][\p{L}\p{N}]+)*")
        .expect("capitalised-token pattern is valid")
});

/// Capitalised words that are usually sentence furniture rather than names.
const COMMON_WORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "Our", "Ours", "Their", "They", "His", "Her",
    "She", "You", "Your", "And", "But", "For", "With", "From", "Into", "When", "What",
    "Why", "How", "Who", "Where", "Which", "After", "Before", "During", "Last", "First",
    "Next", "Every", "Each", "Some", "All", "Any", "Not", "Its", "Was", "Were", "Are",
    "Has", "Have", "Had", "Will", "Can", "Could", "Should", "Would", "Also", "Then",
    "Than", "Just", "Only", "Over", "Under", "Here", "There", "Now", "New", "One", "Two",
    "Three", "CEO", "CTO", "CFO", "COO", "LinkedIn", "January", "February", "March",
    "April", "May", "June", "July", "August", "September", "October", "November",
    "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
    "Sunday",
];

/// Minimum characters for a token to count as a name.
const MIN_TERM_LEN: usize = 3;

fn is_candidate(token: &str) -> bool {
    token.chars().count() >= MIN_TERM_LEN && !COMMON_WORDS.contains(&token)
}

/// Build the list of terms that must not appear in the spun post.
///
/// Takes each part of the author's name plus every capitalised token in the
/// company-specific elements reported by the analyzer. Order is first-seen; no
/// duplicates.
#[must_use]
pub fn forbidden_terms(author_name: &str, company_specific_elements: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut add = |token: &str| {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if is_candidate(token) && !terms.iter().any(|t| t == token) {
            terms.push(token.to_string());
        }
    };

    for part in author_name.split_whitespace() {
        add(part);
    }
    for element in company_specific_elements {
        for m in CAPITALISED.find_iter(element) {
            add(m.as_str());
        }
    }
    terms
}

/// Terms from `forbidden` that occur in `text` as whole words (case-sensitive).
#[must_use]
pub fn find_leaks(text: &str, forbidden: &[String]) -> Vec<String> {
    forbidden
        .iter()
        .filter(|term| {
            Regex::new(&format!(r"\b{}\b", regex::escape(term)))
                .map(|re| re.is_match(text))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
