//! Widget session management
//!
//! Each connected widget owns one [`ConversationController`]. The manager
//! enforces a capacity cap and expires idle sessions with a background
//! sweep task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::watch;

use lexai_booking::{BookingLinkBuilder, InMemoryStore};
use lexai_channel::ElevenLabsChannel;
use lexai_config::Settings;
use lexai_core::{
    AgentChannel, AudioCapturePermission, DescriptionStore, GrantedPermission, TextGenerator,
};
use lexai_session::{ControllerConfig, ConversationController, Timings};
use lexai_synthesis::{OpenAiConfig, OpenAiGenerator};

use crate::ServerError;

/// One widget session
pub struct Session {
    pub id: String,
    pub controller: ConversationController,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
    active: RwLock<bool>,
}

impl Session {
    fn new(id: impl Into<String>, controller: ConversationController) -> Self {
        Self {
            id: id.into(),
            controller,
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Whether the session has been idle past `timeout`
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    pub fn close(&self) {
        *self.active.write() = false;
    }

    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,

    controller_config: ControllerConfig,
    channel: Arc<dyn AgentChannel>,
    permission: Arc<dyn AudioCapturePermission>,
    generator: Option<Arc<dyn TextGenerator>>,
    link_builder: BookingLinkBuilder,
    durable_store: Arc<dyn DescriptionStore>,
}

impl SessionManager {
    /// Build a manager and its shared collaborators from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ServerError> {
        let link_builder = BookingLinkBuilder::new(&settings.booking.calendly_url)
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let generator: Option<Arc<dyn TextGenerator>> = match &settings.generation.api_key {
            Some(key) => {
                let generator = OpenAiGenerator::new(OpenAiConfig {
                    model: settings.generation.model.clone(),
                    endpoint: settings.generation.endpoint.clone(),
                    api_key: key.clone(),
                    ..OpenAiConfig::default()
                })
                .map_err(|e| ServerError::Internal(e.to_string()))?;
                Some(Arc::new(generator))
            }
            None => {
                tracing::info!("no generation credential, descriptions use the local template");
                None
            }
        };

        let controller_config = ControllerConfig {
            agent_id: settings.agent.agent_id.clone(),
            api_key: settings.agent.api_key.clone(),
            assistant_name: settings.agent.assistant_name.clone(),
            firm_name: settings.agent.firm_name.clone(),
            timings: Timings::default(),
        };

        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: settings.session.max_sessions,
            session_timeout: Duration::from_secs(settings.session.timeout_secs),
            cleanup_interval: Duration::from_secs(settings.session.cleanup_interval_secs),
            controller_config,
            channel: Arc::new(ElevenLabsChannel::new()),
            permission: Arc::new(GrantedPermission),
            generator,
            link_builder,
            durable_store: Arc::new(InMemoryStore::new()),
        })
    }

    /// Start a background task that expires idle sessions
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let before = manager.count();
                        manager.cleanup_expired();
                        let after = manager.count();
                        if before != after {
                            tracing::info!(
                                removed = before - after,
                                remaining = after,
                                "expired idle sessions"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Create a new session
    pub fn create(&self) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);
            if sessions.len() >= self.max_sessions {
                return Err(ServerError::CapacityExceeded);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let controller = ConversationController::new(
            self.controller_config.clone(),
            self.channel.clone(),
            self.permission.clone(),
            self.generator.clone(),
            self.link_builder.clone(),
            self.durable_store.clone(),
        );
        let session = Arc::new(Session::new(&id, controller));
        sessions.insert(id.clone(), session.clone());

        metrics::counter!("lexai_sessions_created_total").increment(1);
        tracing::info!(session_id = %id, "created session");
        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session, tearing down any open agent channel
    pub fn remove(&self, id: &str) {
        let session = self.sessions.write().remove(id);
        if let Some(session) = session {
            session.close();
            let controller = session.controller.clone();
            tokio::spawn(async move { controller.disconnect().await });
            tracing::info!(session_id = %id, "removed session");
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions);
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            if let Some(session) = sessions.remove(&id) {
                session.close();
                let controller = session.controller.clone();
                tokio::spawn(async move { controller.disconnect().await });
                tracing::info!(session_id = %id, "expired session");
            }
        }
    }

    /// All session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}
