use crate::error::VoiceError;
use crate::prompts::{GREETING_PROMPT, SYSTEM_PROMPT};
use async_trait::async_trait;
use odoo_support_tools::{tool_definitions, SupportTools};
use odoo_support_types::ToolDefinition;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Hosted speech-to-speech model the session runs on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeModelConfig {
    pub model: String,
    pub voice: String,
    pub temperature: f32,
    pub instructions: String,
}

impl Default for RealtimeModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-realtime-preview".to_string(),
            voice: "alloy".to_string(),
            temperature: 0.7,
            instructions: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Silero voice-activity detector tuning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VadConfig {
    pub activation_threshold: f32,
    pub min_speech_duration_ms: u32,
    pub min_silence_duration_ms: u32,
    pub prefix_padding_duration_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 0.5,
            min_speech_duration_ms: 50,
            min_silence_duration_ms: 550,
            prefix_padding_duration_ms: 500,
        }
    }
}

/// Everything a room session is started with.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOptions {
    pub instructions: String,
    pub model: RealtimeModelConfig,
    pub vad: VadConfig,
    pub tools: Vec<ToolDefinition>,
}

/// A remote participant in the session room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
    pub name: String,
}

/// Executes function calls made by the model.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle_tool_call(&self, name: &str, arguments: Value) -> String;
}

/// Connection between the agent and a LiveKit room, as provided by the agent
/// runtime. Audio, video and turn handling live behind this trait.
#[async_trait]
pub trait RoomSession: Send {
    fn room_name(&self) -> &str;

    /// Joins the room.
    async fn connect(&mut self) -> Result<(), VoiceError>;

    /// Resolves once a user other than the agent is present.
    async fn wait_for_participant(&mut self) -> Result<Participant, VoiceError>;

    /// Starts the model session in the joined room. Function calls from the
    /// model go to `tools`.
    async fn start(
        &mut self,
        options: SessionOptions,
        tools: Arc<dyn ToolHandler>,
    ) -> Result<(), VoiceError>;

    /// Speaks `text` to the room.
    async fn say(&mut self, text: &str, allow_interruptions: bool) -> Result<(), VoiceError>;
}

/// Odoo technical-support voice agent.
#[derive(Clone)]
pub struct SupportAgent {
    tools: Arc<SupportTools>,
    model: RealtimeModelConfig,
    vad: VadConfig,
}

impl SupportAgent {
    pub fn new(tools: Arc<SupportTools>) -> Self {
        Self {
            tools,
            model: RealtimeModelConfig::default(),
            vad: VadConfig::default(),
        }
    }

    pub fn with_model(mut self, model: RealtimeModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_vad(mut self, vad: VadConfig) -> Self {
        self.vad = vad;
        self
    }

    pub fn tools(&self) -> &Arc<SupportTools> {
        &self.tools
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            instructions: self.model.instructions.clone(),
            model: self.model.clone(),
            vad: self.vad.clone(),
            tools: tool_definitions(),
        }
    }

    /// Runs one support session: join the room, wait for the user, start the
    /// model, then greet. Returns the participant being helped.
    #[instrument(skip(self, session), fields(room = %session.room_name()))]
    pub async fn entrypoint<S>(&self, session: &mut S) -> Result<Participant, VoiceError>
    where
        S: RoomSession + ?Sized,
    {
        session.connect().await?;
        info!("connected to room");

        let participant = session.wait_for_participant().await?;
        info!(identity = %participant.identity, "participant joined");

        session
            .start(self.session_options(), Arc::new(self.clone()))
            .await?;
        session.say(GREETING_PROMPT, true).await?;

        Ok(participant)
    }

    /// Executes a function call requested by the model and returns the text
    /// handed back to it.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> String {
        debug!(tool = name, "model requested tool");
        self.tools.call(name, arguments).await
    }
}

#[async_trait]
impl ToolHandler for SupportAgent {
    async fn handle_tool_call(&self, name: &str, arguments: Value) -> String {
        SupportAgent::handle_tool_call(self, name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odoo_support_rpc::mock::MockTransport;
    use odoo_support_rpc::{OdooConnection, OdooSettings};
    use serde_json::json;

    #[derive(Default)]
    struct ScriptedRoom {
        events: Vec<String>,
        options: Option<SessionOptions>,
        tools: Option<Arc<dyn ToolHandler>>,
        nobody_joins: bool,
    }

    #[async_trait]
    impl RoomSession for ScriptedRoom {
        fn room_name(&self) -> &str {
            "support-1"
        }

        async fn connect(&mut self) -> Result<(), VoiceError> {
            self.events.push("connect".into());
            Ok(())
        }

        async fn wait_for_participant(&mut self) -> Result<Participant, VoiceError> {
            self.events.push("wait".into());
            if self.nobody_joins {
                return Err(VoiceError::ParticipantTimeout {
                    room: "support-1".into(),
                    waited_secs: 1,
                });
            }
            Ok(Participant {
                identity: "user-1".into(),
                name: "Mona".into(),
            })
        }

        async fn start(
            &mut self,
            options: SessionOptions,
            tools: Arc<dyn ToolHandler>,
        ) -> Result<(), VoiceError> {
            self.events.push("start".into());
            self.options = Some(options);
            self.tools = Some(tools);
            Ok(())
        }

        async fn say(&mut self, text: &str, allow_interruptions: bool) -> Result<(), VoiceError> {
            self.events
                .push(format!("say:{}:{}", allow_interruptions, text));
            Ok(())
        }
    }

    fn agent() -> SupportAgent {
        let transport = Arc::new(MockTransport::odoo(|_, _, _, _| Ok(json!([]))));
        let conn = OdooConnection::with_transport(OdooSettings::default(), transport);
        SupportAgent::new(Arc::new(SupportTools::new(
            Arc::new(conn),
            "/nonexistent/odoo.log",
        )))
    }

    #[test]
    fn custom_model_flows_into_session_options() {
        let agent = agent().with_model(RealtimeModelConfig {
            voice: "verse".to_string(),
            ..RealtimeModelConfig::default()
        });
        let options = agent.with_vad(VadConfig::default()).session_options();
        assert_eq!(options.model.voice, "verse");
        assert_eq!(options.vad, VadConfig::default());
    }

    #[test]
    fn defaults_match_hosted_model() {
        let model = RealtimeModelConfig::default();
        assert_eq!(model.voice, "alloy");
        assert!((model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(model.instructions, SYSTEM_PROMPT);

        let vad = VadConfig::default();
        assert!((vad.activation_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(vad.min_silence_duration_ms, 550);
    }

    #[tokio::test]
    async fn entrypoint_runs_steps_in_order_and_greets() {
        let agent = agent();
        let mut room = ScriptedRoom::default();

        let participant = agent.entrypoint(&mut room).await.unwrap();
        assert_eq!(participant.identity, "user-1");

        assert_eq!(room.events[..3], ["connect", "wait", "start"]);
        assert_eq!(room.events[3], format!("say:true:{}", GREETING_PROMPT));

        let options = room.options.unwrap();
        assert_eq!(options.instructions, SYSTEM_PROMPT);
        assert_eq!(options.tools.len(), 9);

        // The session gets a handler that reaches the agent's tools.
        let reply = room
            .tools
            .unwrap()
            .handle_tool_call("analyze_error", json!({"error_message": "Access Denied"}))
            .await;
        assert!(reply.contains("access rights"), "unexpected reply {reply}");
    }

    #[tokio::test]
    async fn entrypoint_stops_when_nobody_joins() {
        let agent = agent();
        let mut room = ScriptedRoom {
            nobody_joins: true,
            ..Default::default()
        };

        let err = agent.entrypoint(&mut room).await.unwrap_err();
        assert!(matches!(err, VoiceError::ParticipantTimeout { .. }));
        assert_eq!(room.events, ["connect", "wait"]);
        assert!(room.options.is_none());
        assert!(room.tools.is_none());
    }

    #[tokio::test]
    async fn tool_calls_route_to_support_tools() {
        let agent = agent();
        let reply = agent
            .handle_tool_call("analyze_error", json!({"error_message": "psycopg2 OperationalError"}))
            .await;
        assert!(reply.contains("PostgreSQL"));

        let reply = agent.handle_tool_call("drop_database", json!({})).await;
        assert_eq!(reply, "Unknown tool: drop_database");
    }
}
