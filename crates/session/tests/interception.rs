//! End-to-end controller scenarios against a scripted agent channel

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use lexai_booking::{BookingLinkBuilder, InMemoryStore, LAST_DESCRIPTION_KEY};
use lexai_core::{
    AgentChannel, AgentMode, AudioCapturePermission, ChannelConfig, ChannelEvent, ChannelHandle,
    ConnectionStatus, DeniedPermission, GrantedPermission, Role, SessionMode,
};
use lexai_session::{ControllerConfig, ConversationController, Timings, UiEvent};

const BOOKING_BASE: &str = "https://calendly.com/exemplo/30min/?month=2026-01";

#[derive(Default)]
struct FakeState {
    sent: Mutex<Vec<String>>,
    ended: AtomicBool,
    event_tx: Mutex<Option<mpsc::Sender<ChannelEvent>>>,
}

/// Agent channel driven by the test
#[derive(Clone, Default)]
struct FakeChannel {
    state: Arc<FakeState>,
}

impl FakeChannel {
    fn new() -> Self {
        Self::default()
    }

    async fn push(&self, event: ChannelEvent) {
        let tx = self.state.event_tx.lock().clone();
        tx.expect("no open session").send(event).await.unwrap();
    }

    async fn agent_says(&self, text: &str) {
        self.push(ChannelEvent::Message {
            text: text.to_string(),
            source: Role::Agent,
        })
        .await;
    }

    async fn user_says(&self, text: &str) {
        self.push(ChannelEvent::Message {
            text: text.to_string(),
            source: Role::User,
        })
        .await;
    }

    fn sent(&self) -> Vec<String> {
        self.state.sent.lock().clone()
    }

    fn ended(&self) -> bool {
        self.state.ended.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentChannel for FakeChannel {
    async fn connect(&self, _config: ChannelConfig) -> lexai_core::Result<Box<dyn ChannelHandle>> {
        let (tx, rx) = mpsc::channel(16);
        *self.state.event_tx.lock() = Some(tx);
        self.state.ended.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeHandle {
            state: self.state.clone(),
            events: Some(rx),
        }))
    }
}

struct FakeHandle {
    state: Arc<FakeState>,
    events: Option<mpsc::Receiver<ChannelEvent>>,
}

#[async_trait]
impl ChannelHandle for FakeHandle {
    async fn send_text(&self, text: &str) -> lexai_core::Result<()> {
        if self.state.ended.load(Ordering::SeqCst) {
            return Err(lexai_core::Error::Channel("session closed".to_string()));
        }
        self.state.sent.lock().push(text.to_string());
        Ok(())
    }

    async fn end_session(&mut self) -> lexai_core::Result<()> {
        self.state.ended.store(true, Ordering::SeqCst);
        // Dropping the sender ends the controller's event stream
        self.state.event_tx.lock().take();
        Ok(())
    }

    fn take_events(&mut self) -> Option<mpsc::Receiver<ChannelEvent>> {
        self.events.take()
    }
}

fn controller_with(
    channel: FakeChannel,
    permission: Arc<dyn AudioCapturePermission>,
) -> (ConversationController, Arc<InMemoryStore>) {
    let config = ControllerConfig {
        agent_id: "agent-test".to_string(),
        api_key: None,
        assistant_name: "Sonia".to_string(),
        firm_name: "Machado e Costa Advocacia".to_string(),
        timings: Timings {
            speaking_debounce: Duration::from_millis(150),
            farewell_delay: Duration::from_millis(100),
        },
    };
    let durable = Arc::new(InMemoryStore::new());
    let builder = BookingLinkBuilder::new(BOOKING_BASE).unwrap();
    let controller = ConversationController::new(
        config,
        Arc::new(channel),
        permission,
        None,
        builder,
        durable.clone(),
    );
    (controller, durable)
}

async fn expect_event<F>(rx: &mut broadcast::Receiver<UiEvent>, pred: F) -> UiEvent
where
    F: Fn(&UiEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("event stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn is_link_message(event: &UiEvent) -> bool {
    matches!(
        event,
        UiEvent::Message { role: Role::Agent, text } if text.contains("calendly.com")
    )
}

#[tokio::test]
async fn test_text_mode_interception() {
    let channel = FakeChannel::new();
    let (controller, durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Text).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Connected })
    })
    .await;

    channel
        .agent_says("Posso agendar uma consulta com nosso especialista?")
        .await;
    expect_event(&mut events, |e| matches!(e, UiEvent::Message { .. })).await;
    assert!(controller.snapshot().offered_scheduling);

    controller
        .send_text("Fui demitido sem justa causa e não recebi as verbas rescisórias")
        .await
        .unwrap();
    controller.send_text("sim, quero agendar").await.unwrap();

    // The acceptance was intercepted, never forwarded
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Fui demitido"));
    assert!(!channel.ended(), "text mode keeps the session open");

    let state = controller.snapshot();
    assert!(!state.offered_scheduling);
    assert_eq!(state.connection_status, ConnectionStatus::Connected);

    let link_messages: Vec<_> = state
        .transcript
        .iter()
        .filter(|m| m.text.contains("calendly.com"))
        .collect();
    assert_eq!(link_messages.len(), 1);
    assert!(link_messages[0].text.contains("a1="));

    // Full description persisted out of band
    let stored = durable.get(LAST_DESCRIPTION_KEY).unwrap();
    assert!(stored.contains("Fui demitido sem justa causa"));
}

#[tokio::test]
async fn test_voice_mode_interception() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Voice).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    channel
        .user_says("Tenho um problema com meu contrato de aluguel não cumprido pelo locador")
        .await;
    channel
        .agent_says("Gostaria de marcar um horário com nosso especialista?")
        .await;
    channel.user_says("sim, quero agendar").await;

    let farewell = expect_event(&mut events, is_link_message).await;
    // Teardown happened before the farewell was appended
    assert!(channel.ended());
    assert!(channel.sent().is_empty(), "nothing was forwarded in voice mode");
    if let UiEvent::Message { text, .. } = &farewell {
        assert!(text.contains("Muito obrigada pelo contato"));
    }

    let open = expect_event(&mut events, |e| matches!(e, UiEvent::OpenLink { .. })).await;
    if let UiEvent::OpenLink { url } = open {
        assert!(url.starts_with("https://calendly.com/"));
        assert!(url.contains("a1="));
    }

    assert_eq!(
        controller.snapshot().connection_status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test]
async fn test_acceptance_without_offer_is_forwarded() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Text).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Connected })
    })
    .await;

    controller.send_text("sim, quero agendar").await.unwrap();

    assert_eq!(channel.sent(), vec!["sim, quero agendar".to_string()]);
    let state = controller.snapshot();
    assert!(!state.transcript.iter().any(|m| m.text.contains("calendly.com")));
}

#[tokio::test]
async fn test_permission_denied_stays_idle() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(DeniedPermission));
    let mut events = controller.subscribe();

    let err = controller.connect(SessionMode::Voice).await.unwrap_err();
    assert!(matches!(err, lexai_core::Error::PermissionDenied(_)));
    expect_event(&mut events, |e| matches!(e, UiEvent::Error { .. })).await;
    assert_eq!(
        controller.snapshot().connection_status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test]
async fn test_booking_link_never_duplicated() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Text).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Connected })
    })
    .await;

    controller
        .send_text("Preciso de ajuda com uma multa rescisória indevida no meu contrato")
        .await
        .unwrap();

    channel.agent_says("Deseja agendar uma consulta?").await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Message { text, .. } if text.contains("Deseja agendar"))
    })
    .await;
    controller.send_text("sim, quero agendar").await.unwrap();
    expect_event(&mut events, is_link_message).await;

    // A second offer/acceptance round produces the same deterministic link
    channel.agent_says("Posso marcar um horário para você?").await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Message { text, .. } if text.contains("Posso marcar"))
    })
    .await;
    assert!(controller.snapshot().offered_scheduling);
    controller.send_text("sim, quero agendar").await.unwrap();

    let link_count = controller
        .snapshot()
        .transcript
        .iter()
        .filter(|m| m.text.contains("calendly.com"))
        .count();
    assert_eq!(link_count, 1);
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Text).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Connected })
    })
    .await;
    channel.agent_says("Posso agendar uma consulta?").await;
    controller
        .send_text("Sofri um acidente de trânsito e a seguradora recusou a cobertura")
        .await
        .unwrap();

    controller.reset().await;
    let state = controller.snapshot();
    assert!(state.transcript.is_empty());
    assert!(!state.offered_scheduling);
    assert!(state.last_extracted_issue.is_none());
    assert_eq!(state.connection_status, ConnectionStatus::Disconnected);

    // Idempotent
    controller.reset().await;
    assert_eq!(
        controller.snapshot().connection_status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test]
async fn test_speaking_debounce() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Voice).await.unwrap();
    channel.push(ChannelEvent::Connected).await;

    channel
        .push(ChannelEvent::ModeChanged {
            mode: AgentMode::Speaking,
        })
        .await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Speaking { speaking: true })
    })
    .await;

    // A listening edge only commits after the debounce window
    channel
        .push(ChannelEvent::ModeChanged {
            mode: AgentMode::Listening,
        })
        .await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Speaking { speaking: false })
    })
    .await;
    assert!(!controller.snapshot().speaking);
}

#[tokio::test]
async fn test_channel_error_returns_to_idle() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Voice).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    channel
        .push(ChannelEvent::Error {
            detail: "websocket reset".to_string(),
        })
        .await;

    expect_event(&mut events, |e| matches!(e, UiEvent::Error { .. })).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Disconnected })
    })
    .await;

    // Sending into a dead session is an error, not a panic
    assert!(controller.send_text("olá").await.is_err());
}

#[tokio::test]
async fn test_mode_switch_forces_fresh_session() {
    let channel = FakeChannel::new();
    let (controller, _durable) = controller_with(channel.clone(), Arc::new(GrantedPermission));
    let mut events = controller.subscribe();

    controller.connect(SessionMode::Text).await.unwrap();
    channel.push(ChannelEvent::Connected).await;
    expect_event(&mut events, |e| {
        matches!(e, UiEvent::Status { status: ConnectionStatus::Connected })
    })
    .await;
    controller
        .send_text("Quero entender meus direitos numa rescisão de contrato de trabalho")
        .await
        .unwrap();
    assert!(!controller.snapshot().transcript.is_empty());

    controller.connect(SessionMode::Voice).await.unwrap();
    let state = controller.snapshot();
    assert!(state.transcript.is_empty());
    assert_eq!(state.mode, SessionMode::Voice);
}
