//! Scheduling intent detection
//!
//! Regex-based heuristics over a live agent conversation:
//! - Text normalization before pattern matching
//! - Offer detection on agent utterances (deliberately conservative)
//! - Acceptance detection on user utterances (first rule checked wins)
//! - Extraction of the user's substantive legal issue from the transcript
//!
//! Everything here is pure classification with no side effects; the session
//! controller owns all state transitions.

pub mod acceptance;
pub mod issue;
pub mod normalize;
pub mod offer;

pub use acceptance::detects_scheduling_acceptance;
pub use issue::IssueExtractor;
pub use normalize::clean_text;
pub use offer::detects_scheduling_offer;
