//! Durable key-value storage trait

use async_trait::async_trait;

use crate::error::Result;

/// Write-only key-value store for full case descriptions
///
/// Booking URLs carry a truncated description; the untruncated text is
/// persisted here for out-of-band retrieval by integrations without URL
/// length limits. There is no read path in core.
#[async_trait]
pub trait DescriptionStore: Send + Sync {
    /// Store a value under a key, overwriting any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
