//! Audio capture permission trait

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Platform microphone-permission prompt
///
/// Voice-mode connects must acquire this before opening the channel. A
/// denial is non-retryable and surfaced to the user with remediation steps.
#[async_trait]
pub trait AudioCapturePermission: Send + Sync {
    /// Request audio-capture permission, blocking until decided
    async fn request(&self) -> Result<()>;
}

/// Permission source that always grants
///
/// Used for headless deployments where capture happens on the presentation
/// side and for text-only sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedPermission;

#[async_trait]
impl AudioCapturePermission for GrantedPermission {
    async fn request(&self) -> Result<()> {
        Ok(())
    }
}

/// Permission source that always denies, with a fixed remediation message
#[derive(Debug, Clone, Default)]
pub struct DeniedPermission;

#[async_trait]
impl AudioCapturePermission for DeniedPermission {
    async fn request(&self) -> Result<()> {
        Err(Error::PermissionDenied(
            "permita o acesso ao microfone nas configurações do navegador".to_string(),
        ))
    }
}
