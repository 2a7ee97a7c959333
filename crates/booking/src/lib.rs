//! Booking link construction
//!
//! Embeds a synthesized case description into the scheduling provider URL
//! (custom answer parameter `a1`) and persists the untruncated description
//! for out-of-band retrieval.

pub mod link;
pub mod store;

pub use link::{
    BookingLinkBuilder, LAST_DESCRIPTION_KEY, MAX_DESCRIPTION_LEN, SESSION_DESCRIPTION_KEY,
};
pub use store::InMemoryStore;

use thiserror::Error;

/// Booking errors
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("invalid booking URL: {0}")]
    InvalidUrl(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<BookingError> for lexai_core::Error {
    fn from(err: BookingError) -> Self {
        lexai_core::Error::LinkBuild(err.to_string())
    }
}
