//! Legal issue extraction
//!
//! Finds the user's substantive issue description in the transcript so it
//! can seed the case summary. Greetings, acceptances and short fragments
//! are skipped; the first surviving message wins, because intake
//! conversations front-load the substantive issue before follow-up
//! questions.

use once_cell::sync::Lazy;
use regex::Regex;

use lexai_core::{Message, Role};

use crate::acceptance::detects_scheduling_acceptance;
use crate::normalize::clean_text;

/// Minimum utterance length (chars) to count as substantive
pub const MIN_ISSUE_LEN: usize = 15;

/// Maximum extracted issue length before ellipsis truncation
pub const MAX_ISSUE_LEN: usize = 300;

static BARE_GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(oi|olá|ola|bom dia|boa tarde|boa noite)$").expect("valid regex")
});

/// Extracts the primary stated legal issue from a transcript
#[derive(Debug, Clone)]
pub struct IssueExtractor {
    /// Assistant display name; greetings addressed to it are still bare
    /// greetings ("oi sonia")
    assistant_name: String,
}

impl IssueExtractor {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into().to_lowercase(),
        }
    }

    /// Extract the main issue from the transcript
    ///
    /// Returns an empty string when no user message survives the filters.
    pub fn extract(&self, transcript: &[Message]) -> String {
        let main_issue = transcript
            .iter()
            .filter(|m| m.role == Role::User)
            .filter(|m| self.is_substantive(&m.text))
            .map(|m| clean_text(&m.text))
            .find(|cleaned| cleaned.chars().count() >= MIN_ISSUE_LEN);

        match main_issue {
            Some(issue) => truncate_with_ellipsis(&issue, MAX_ISSUE_LEN),
            None => String::new(),
        }
    }

    /// Whether a single user utterance qualifies as a candidate issue
    pub fn is_substantive(&self, text: &str) -> bool {
        if detects_scheduling_acceptance(text) {
            return false;
        }

        let trimmed = text.trim();
        if self.is_greeting(trimmed) {
            return false;
        }

        trimmed.chars().count() >= MIN_ISSUE_LEN
    }

    fn is_greeting(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if BARE_GREETING.is_match(&lower) {
            return true;
        }
        // "olá sonia" and friends
        if let Some(rest) = lower.strip_suffix(&self.assistant_name) {
            return BARE_GREETING.is_match(rest.trim());
        }
        false
    }
}

/// Truncate to `max` characters, appending `...` when cut
fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{truncated}...")
}
