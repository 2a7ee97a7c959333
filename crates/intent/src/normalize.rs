//! Utterance normalization
//!
//! Raw transcripts carry line breaks, repeated whitespace and transcription
//! artifacts (emoji, control characters) that throw off the pattern sets.
//! Everything is cleaned through here before matching or display in a case
//! summary.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// Word characters, whitespace, basic punctuation and accented Latin letters
// survive; everything else is stripped.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s.,!?;:()\-áàâãéêíóôõúçÁÀÂÃÉÊÍÓÔÕÚÇ]").expect("valid regex")
});

/// Normalize a raw utterance for matching and summaries
///
/// Trims, collapses internal whitespace runs and line breaks to single
/// spaces, and strips characters outside the safe set. Total; empty input
/// yields an empty string.
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED.replace_all(text, "");
    WHITESPACE_RUNS
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}
