//! Text generation trait

use async_trait::async_trait;

use crate::error::Result;

/// Credentialed text-generation provider
///
/// One synchronous request, no retry. Every caller has a deterministic
/// local fallback for the error path, so implementations should fail fast
/// with `Error::Generation` rather than degrade silently.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate completion text for a fixed system/user prompt pair
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
