//! Conversation session controller
//!
//! Owns one live session with the external agent and drives the
//! interception flow: agent utterances are offer-classified, user
//! utterances are acceptance-classified while an offer is pending, and a
//! positive acceptance short-circuits the session into description
//! synthesis, booking-link construction and the mode-specific completion.
//!
//! All state mutations happen behind a single dispatch lock, so channel
//! events, presentation commands and timer callbacks each run as one
//! atomic step. The acceptance path tears the channel down before any
//! code that could still forward the utterance runs.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

use lexai_booking::{BookingLinkBuilder, InMemoryStore};
use lexai_core::{
    AgentChannel, AgentMode, AudioCapturePermission, ChannelConfig, ChannelEvent, ChannelHandle,
    ConnectionStatus, DescriptionStore, Message, Role, SessionMode, TextGenerator,
};
use lexai_intent::issue::MIN_ISSUE_LEN;
use lexai_intent::{
    clean_text, detects_scheduling_acceptance, detects_scheduling_offer, IssueExtractor,
};
use lexai_synthesis::{synthesize, PromptTemplate};

use crate::state::SessionState;
use crate::timer::ScopedTimer;
use crate::ui::UiEvent;
use crate::SessionError;

const EVENT_CAPACITY: usize = 64;

/// Timer intervals for the orthogonal session timers
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Confirmation delay on the speaking-to-listening edge; a new speaking
    /// burst inside this window cancels the transition
    pub speaking_debounce: Duration,
    /// Voice-mode display window between the farewell message and the
    /// open-link action
    pub farewell_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            speaking_debounce: Duration::from_millis(500),
            farewell_delay: Duration::from_secs(4),
        }
    }
}

/// Static configuration for one controller
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub agent_id: String,
    pub api_key: Option<String>,
    pub assistant_name: String,
    pub firm_name: String,
    pub timings: Timings,
}

/// One widget session's controller
///
/// Cheap to clone; all clones share the same session.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

struct Inner {
    config: ControllerConfig,
    channel: Arc<dyn AgentChannel>,
    permission: Arc<dyn AudioCapturePermission>,
    generator: Option<Arc<dyn TextGenerator>>,
    link_builder: BookingLinkBuilder,
    durable_store: Arc<dyn DescriptionStore>,
    session_store: InMemoryStore,
    extractor: IssueExtractor,
    template: PromptTemplate,

    state: RwLock<SessionState>,
    // Serializes channel events, presentation commands and timer callbacks
    dispatch: Mutex<()>,
    handle: Mutex<Option<Box<dyn ChannelHandle>>>,
    reader: parking_lot::Mutex<Option<JoinHandle<()>>>,
    debounce: parking_lot::Mutex<Option<ScopedTimer>>,
    farewell: parking_lot::Mutex<Option<ScopedTimer>>,
    events: broadcast::Sender<UiEvent>,
}

impl Inner {
    fn emit(&self, event: UiEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

impl ConversationController {
    pub fn new(
        config: ControllerConfig,
        channel: Arc<dyn AgentChannel>,
        permission: Arc<dyn AudioCapturePermission>,
        generator: Option<Arc<dyn TextGenerator>>,
        link_builder: BookingLinkBuilder,
        durable_store: Arc<dyn DescriptionStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let extractor = IssueExtractor::new(&config.assistant_name);
        let template = PromptTemplate::new(&config.assistant_name, &config.firm_name);

        Self {
            inner: Arc::new(Inner {
                config,
                channel,
                permission,
                generator,
                link_builder,
                durable_store,
                session_store: InMemoryStore::new(),
                extractor,
                template,
                state: RwLock::new(SessionState::default()),
                dispatch: Mutex::new(()),
                handle: Mutex::new(None),
                reader: parking_lot::Mutex::new(None),
                debounce: parking_lot::Mutex::new(None),
                farewell: parking_lot::Mutex::new(None),
                events,
            }),
        }
    }

    /// Subscribe to presentation-facing events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.inner.events.subscribe()
    }

    /// Current session state snapshot
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// Open a session with the external agent
    ///
    /// Voice mode requests audio-capture permission first; a denial is
    /// surfaced and the session stays idle. Switching mode while connected
    /// forces a fresh session and clears the transcript.
    pub async fn connect(&self, mode: SessionMode) -> lexai_core::Result<()> {
        let _guard = self.inner.dispatch.lock().await;

        let (status, current_mode) = {
            let state = self.inner.state.read();
            (state.connection_status, state.mode)
        };
        if status != ConnectionStatus::Disconnected {
            if current_mode == mode {
                return Ok(());
            }
            teardown(&self.inner).await;
            self.inner.state.write().transcript.clear();
        }

        if mode == SessionMode::Voice {
            if let Err(e) = self.inner.permission.request().await {
                tracing::info!(error = %e, "audio capture permission denied");
                self.inner.emit(UiEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        }

        self.inner.state.write().mode = mode;
        set_status(&self.inner, ConnectionStatus::Connecting);

        let mut channel_config =
            ChannelConfig::new(&self.inner.config.agent_id).text_only(mode.text_only());
        if let Some(ref key) = self.inner.config.api_key {
            channel_config = channel_config.with_api_key(key);
        }

        let mut handle = match self.inner.channel.connect(channel_config).await {
            Ok(handle) => handle,
            Err(e) => {
                set_status(&self.inner, ConnectionStatus::Disconnected);
                self.inner.emit(UiEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let Some(events) = handle.take_events() else {
            set_status(&self.inner, ConnectionStatus::Disconnected);
            return Err(SessionError::Channel("channel delivered no event stream".to_string()).into());
        };

        *self.inner.handle.lock().await = Some(handle);
        let reader = tokio::spawn(read_loop(self.inner.clone(), events));
        *self.inner.reader.lock() = Some(reader);

        let mode_label = if mode.text_only() { "text" } else { "voice" };
        tracing::info!(mode = mode_label, "session opened");
        Ok(())
    }

    /// Forward a user-typed message, intercepting scheduling acceptances
    ///
    /// When an offer is pending and the text classifies as an acceptance,
    /// the message is processed locally and never reaches the external
    /// agent; the session stays open in text mode.
    pub async fn send_text(&self, text: &str) -> lexai_core::Result<()> {
        let _guard = self.inner.dispatch.lock().await;

        if self.inner.state.read().connection_status != ConnectionStatus::Connected {
            return Err(SessionError::NotConnected.into());
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        append_message(&self.inner, Message::user(trimmed));
        track_issue(&self.inner, trimmed);

        let offered = self.inner.state.read().offered_scheduling;
        if offered && detects_scheduling_acceptance(trimmed) {
            intercept_acceptance(&self.inner).await;
            return Ok(());
        }

        let handle = self.inner.handle.lock().await;
        match handle.as_ref() {
            Some(handle) => handle.send_text(trimmed).await,
            None => Err(SessionError::NotConnected.into()),
        }
    }

    /// Tear the session down; safe to call repeatedly
    pub async fn disconnect(&self) {
        let _guard = self.inner.dispatch.lock().await;
        teardown(&self.inner).await;
    }

    /// Disconnect and clear all conversation state
    pub async fn reset(&self) {
        let _guard = self.inner.dispatch.lock().await;
        teardown(&self.inner).await;

        let mut state = self.inner.state.write();
        state.transcript.clear();
        state.offered_scheduling = false;
        state.last_extracted_issue = None;
    }
}

async fn read_loop(inner: Arc<Inner>, mut events: mpsc::Receiver<ChannelEvent>) {
    while let Some(event) = events.recv().await {
        let _guard = inner.dispatch.lock().await;
        handle_event(&inner, event).await;
    }
    // Stream ended without an explicit disconnect event. The farewell timer
    // survives this path so a voice hand-off still opens the link.
    let _guard = inner.dispatch.lock().await;
    channel_closed(&inner).await;
}

async fn handle_event(inner: &Arc<Inner>, event: ChannelEvent) {
    match event {
        ChannelEvent::Connected => set_status(inner, ConnectionStatus::Connected),
        ChannelEvent::Disconnected => channel_closed(inner).await,
        ChannelEvent::Error { detail } => {
            tracing::warn!(error = %detail, "channel error");
            inner.emit(UiEvent::Error { message: detail });
            channel_closed(inner).await;
        }
        ChannelEvent::ModeChanged { mode } => handle_agent_mode(inner, mode),
        ChannelEvent::Message {
            text,
            source: Role::Agent,
        } => handle_agent_message(inner, text),
        ChannelEvent::Message {
            text,
            source: Role::User,
        } => handle_user_message(inner, text).await,
    }
}

fn handle_agent_message(inner: &Inner, text: String) {
    if detects_scheduling_offer(&text) {
        tracing::info!("scheduling offer detected");
        inner.state.write().offered_scheduling = true;
    }
    // The offer classification never suppresses the message itself
    append_message(inner, Message::agent(text));
}

async fn handle_user_message(inner: &Arc<Inner>, text: String) {
    append_message(inner, Message::user(&text));
    track_issue(inner, &text);

    let offered = inner.state.read().offered_scheduling;
    if offered && detects_scheduling_acceptance(&text) {
        intercept_acceptance(inner).await;
    }
}

/// Remember the most recent substantive user utterance
fn track_issue(inner: &Inner, text: &str) {
    if detects_scheduling_acceptance(text) {
        return;
    }
    let cleaned = clean_text(text);
    if cleaned.chars().count() >= MIN_ISSUE_LEN {
        inner.state.write().last_extracted_issue = Some(cleaned);
    }
}

/// Process an accepted scheduling offer
///
/// Voice path: the channel is torn down before anything else so the
/// external agent's in-flight reply is suppressed and the acceptance is
/// never forwarded. Text path: the session stays open, the acceptance is
/// simply not forwarded. Synthesis and link building cannot fail here;
/// every error path lands on the deterministic local template.
async fn intercept_acceptance(inner: &Arc<Inner>) {
    let mode = inner.state.read().mode;
    let mode_label = if mode.text_only() { "text" } else { "voice" };
    tracing::info!(mode = mode_label, "scheduling acceptance intercepted");
    metrics::counter!("lexai_interceptions_total", "mode" => mode_label).increment(1);
    inner.state.write().offered_scheduling = false;

    if mode == SessionMode::Voice {
        set_status(inner, ConnectionStatus::Ending);
        let handle = inner.handle.lock().await.take();
        if let Some(mut handle) = handle {
            if let Err(e) = handle.end_session().await {
                tracing::warn!(error = %e, "channel teardown failed");
            }
        }
        inner.debounce.lock().take();
        clear_speaking(inner);
    }

    let issue = {
        let state = inner.state.read();
        let extracted = inner.extractor.extract(&state.transcript);
        if extracted.is_empty() {
            state.last_extracted_issue.clone().unwrap_or_default()
        } else {
            extracted
        }
    };

    let description = synthesize(
        inner.generator.as_deref(),
        &inner.template,
        &issue,
    )
    .await;

    let link = inner
        .link_builder
        .build_and_persist(
            &description,
            inner.durable_store.as_ref(),
            &inner.session_store,
        )
        .await;

    match mode {
        SessionMode::Voice => {
            append_link_message(inner, &link, voice_farewell(&link));
            set_status(inner, ConnectionStatus::Disconnected);
            schedule_open_link(inner, link);
        }
        SessionMode::Text => {
            append_link_message(inner, &link, inline_link_message(&link));
        }
    }
}

fn schedule_open_link(inner: &Arc<Inner>, link: String) {
    let weak = Arc::downgrade(inner);
    let timer = ScopedTimer::spawn(inner.config.timings.farewell_delay, async move {
        if let Some(inner) = weak.upgrade() {
            let _guard = inner.dispatch.lock().await;
            inner.emit(UiEvent::OpenLink { url: link });
        }
    });
    *inner.farewell.lock() = Some(timer);
}

fn handle_agent_mode(inner: &Arc<Inner>, mode: AgentMode) {
    match mode {
        AgentMode::Speaking => {
            // A new audio burst cancels a pending listening confirmation
            inner.debounce.lock().take();
            let mut state = inner.state.write();
            if !state.speaking {
                state.speaking = true;
                drop(state);
                inner.emit(UiEvent::Speaking { speaking: true });
            }
        }
        AgentMode::Listening => {
            let weak = Arc::downgrade(inner);
            let timer = ScopedTimer::spawn(inner.config.timings.speaking_debounce, async move {
                if let Some(inner) = weak.upgrade() {
                    let _guard = inner.dispatch.lock().await;
                    clear_speaking(&inner);
                }
            });
            *inner.debounce.lock() = Some(timer);
        }
    }
}

fn clear_speaking(inner: &Inner) {
    let mut state = inner.state.write();
    if state.speaking {
        state.speaking = false;
        drop(state);
        inner.emit(UiEvent::Speaking { speaking: false });
    }
}

fn set_status(inner: &Inner, status: ConnectionStatus) {
    let mut state = inner.state.write();
    if state.connection_status != status {
        state.connection_status = status;
        drop(state);
        inner.emit(UiEvent::Status { status });
    }
}

fn append_message(inner: &Inner, message: Message) {
    inner.state.write().transcript.push(message.clone());
    inner.emit(UiEvent::Message {
        role: message.role,
        text: message.text,
    });
}

/// Append a booking-link message unless the link is already in the transcript
fn append_link_message(inner: &Inner, link: &str, text: String) {
    let duplicate = inner
        .state
        .read()
        .transcript
        .iter()
        .any(|m| m.text.contains(link));
    if duplicate {
        tracing::debug!("booking link already in transcript, skipping");
        return;
    }
    append_message(inner, Message::agent(text));
}

/// The channel closed on its own; the farewell timer is left running
async fn channel_closed(inner: &Inner) {
    inner.handle.lock().await.take();
    inner.debounce.lock().take();
    clear_speaking(inner);
    set_status(inner, ConnectionStatus::Disconnected);
}

/// Explicit teardown; clears both timers
async fn teardown(inner: &Inner) {
    inner.debounce.lock().take();
    inner.farewell.lock().take();

    let handle = inner.handle.lock().await.take();
    if let Some(mut handle) = handle {
        set_status(inner, ConnectionStatus::Ending);
        if let Err(e) = handle.end_session().await {
            tracing::debug!(error = %e, "teardown error ignored");
        }
    }
    if let Some(reader) = inner.reader.lock().take() {
        reader.abort();
    }
    clear_speaking(inner);
    set_status(inner, ConnectionStatus::Disconnected);
}

fn voice_farewell(link: &str) -> String {
    format!(
        "Muito obrigada pelo contato! Foi um imenso prazer poder ajudá-la hoje. \
         Desejo que tudo dê certo e que você encontre a solução que precisa. \
         Agora vou direcioná-la para a página de agendamento com nosso especialista.\
         \n\n🔗 {link}\n\n\
         Se a página não abrir automaticamente, clique no link acima. Tenha um ótimo dia!"
    )
}

fn inline_link_message(link: &str) -> String {
    format!(
        "Perfeito! Aqui está o link para você agendar sua consulta com nosso especialista:\
         \n\n{link}\n\n\
         Ao abrir o link, sua dúvida será automaticamente preenchida no campo de descrição. \
         Se não aparecer automaticamente, você pode copiar e colar a descrição que está \
         preparada para o especialista."
    )
}
