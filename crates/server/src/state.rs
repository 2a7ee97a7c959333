//! Shared application state

use std::sync::Arc;

use lexai_config::Settings;

use crate::session::SessionManager;
use crate::ServerError;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let sessions = Arc::new(SessionManager::from_settings(&settings)?);
        Ok(Self {
            settings: Arc::new(settings),
            sessions,
        })
    }
}
