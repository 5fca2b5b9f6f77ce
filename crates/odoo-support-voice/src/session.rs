use crate::agent::{Participant, RoomSession, SessionOptions, ToolHandler};
use crate::error::VoiceError;
use crate::realtime::{RealtimeBridge, RealtimeSettings};
use crate::service::VoiceService;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Data-channel topic carrying the agent's spoken text as chat messages.
pub const CHAT_TOPIC: &str = "lk.chat";

/// Data-channel topic announcing the session configuration to the room.
pub const SESSION_TOPIC: &str = "agent.session";

const DEFAULT_AGENT_IDENTITY: &str = "odoo-support-agent";
const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Chat packet in the shape LiveKit clients render on [`CHAT_TOPIC`].
pub fn chat_message(text: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "timestamp": timestamp,
        "message": text,
    })
    .to_string()
}

/// [`RoomSession`] driven through the LiveKit server API.
///
/// The server API manages the room and its data channel but carries no
/// media. With [`RealtimeSettings`] the session binds the hosted model over
/// its WebSocket API: tool calls are executed and the model's replies are
/// posted to the room as chat messages. Without them, `say` posts the text
/// directly and no tool calls are served.
pub struct LiveKitRoomSession {
    service: Arc<VoiceService>,
    room: String,
    identity: String,
    join_timeout: Duration,
    poll_interval: Duration,
    token: Option<String>,
    realtime: Option<RealtimeSettings>,
    bridge: Option<RealtimeBridge>,
    relay: Option<JoinHandle<()>>,
}

impl LiveKitRoomSession {
    pub fn new(service: Arc<VoiceService>, room: impl Into<String>) -> Self {
        Self {
            service,
            room: room.into(),
            identity: DEFAULT_AGENT_IDENTITY.to_string(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            token: None,
            realtime: None,
            bridge: None,
            relay: None,
        }
    }

    pub fn with_realtime(mut self, settings: RealtimeSettings) -> Self {
        self.realtime = Some(settings);
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Join token minted by [`RoomSession::connect`] for a media runtime.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True once [`RoomSession::start`] has bound the model.
    pub fn has_model(&self) -> bool {
        self.bridge.is_some()
    }

    /// Ends the model session and stops relaying its replies.
    pub async fn close(&mut self) {
        if let Some(bridge) = self.bridge.take() {
            bridge.close().await;
        }
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }

    fn ensure_connected(&self) -> Result<(), VoiceError> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(VoiceError::NotConnected)
        }
    }

    async fn find_participant(&self) -> Result<Option<Participant>, VoiceError> {
        let participants = self.service.list_participants(&self.room).await?;
        Ok(participants
            .into_iter()
            .find(|p| p.identity != self.identity)
            .map(|p| Participant {
                identity: p.identity,
                name: p.name,
            }))
    }
}

#[async_trait::async_trait]
impl RoomSession for LiveKitRoomSession {
    fn room_name(&self) -> &str {
        &self.room
    }

    async fn connect(&mut self) -> Result<(), VoiceError> {
        if !self.service.is_configured() {
            return Err(VoiceError::NotConfigured);
        }

        let token = self
            .service
            .generate_join_token(&self.room, &self.identity, "Odoo Support Agent")?;
        self.service.create_room(&self.room).await?;
        self.token = Some(token);

        info!(room = %self.room, identity = %self.identity, "agent token issued, room ready");
        Ok(())
    }

    async fn wait_for_participant(&mut self) -> Result<Participant, VoiceError> {
        self.ensure_connected()?;

        let poll = async {
            loop {
                if let Some(participant) = self.find_participant().await? {
                    return Ok::<_, VoiceError>(participant);
                }
                debug!(room = %self.room, "waiting for participant");
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.join_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(VoiceError::ParticipantTimeout {
                room: self.room.clone(),
                waited_secs: self.join_timeout.as_secs(),
            }),
        }
    }

    async fn start(
        &mut self,
        options: SessionOptions,
        tools: Arc<dyn ToolHandler>,
    ) -> Result<(), VoiceError> {
        self.ensure_connected()?;

        let announcement = json!({
            "agent": self.identity,
            "model": options.model.model,
            "voice": options.model.voice,
            "tools": options.tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        });
        self.service
            .send_text(&self.room, SESSION_TOPIC, &announcement.to_string())
            .await?;

        let Some(settings) = &self.realtime else {
            warn!(room = %self.room, "no model credentials, tool calls will not be served");
            return Ok(());
        };

        let (transcripts, replies) = mpsc::channel(32);
        let bridge = RealtimeBridge::connect(settings, &options, tools, transcripts).await?;
        self.relay = Some(tokio::spawn(relay_replies(
            self.service.clone(),
            self.room.clone(),
            replies,
        )));
        self.bridge = Some(bridge);

        info!(room = %self.room, tools = options.tools.len(), "model session bound");
        Ok(())
    }

    async fn say(&mut self, text: &str, allow_interruptions: bool) -> Result<(), VoiceError> {
        self.ensure_connected()?;
        debug!(room = %self.room, allow_interruptions, "speaking");

        // The model's reply reaches the room through the relay.
        if let Some(bridge) = &self.bridge {
            return bridge.say(text).await;
        }
        self.service
            .send_text(&self.room, CHAT_TOPIC, &chat_message(text))
            .await
    }
}

async fn relay_replies(
    service: Arc<VoiceService>,
    room: String,
    mut replies: mpsc::Receiver<String>,
) {
    while let Some(text) = replies.recv().await {
        if let Err(e) = service.send_text(&room, CHAT_TOPIC, &chat_message(&text)).await {
            warn!(%room, error = %e, "failed to post model reply");
        }
    }
}
