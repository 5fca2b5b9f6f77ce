//! Bridge to the hosted speech-to-speech model over its realtime WebSocket API.
//!
//! The bridge configures the model with the session options, executes every
//! function call the model makes through a [`ToolHandler`], and hands the
//! model's finished utterances to the caller as transcripts.

use crate::agent::{SessionOptions, ToolHandler};
use crate::error::VoiceError;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

pub const DEFAULT_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Endpoint and credentials of the realtime model API.
#[derive(Clone)]
pub struct RealtimeSettings {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for RealtimeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeSettings")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl RealtimeSettings {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads `OPENAI_API_KEY` and the optional `OPENAI_REALTIME_URL`.
    /// `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let url = std::env::var("OPENAI_REALTIME_URL")
            .unwrap_or_else(|_| DEFAULT_REALTIME_URL.to_string());
        Some(Self::new(url, api_key))
    }

    /// WebSocket URL for `model`. A URL that already carries a query is used
    /// as is.
    pub fn endpoint(&self, model: &str) -> String {
        if self.url.contains('?') {
            self.url.clone()
        } else {
            format!("{}?model={}", self.url, model)
        }
    }
}

/// `session.update` event carrying instructions, voice, VAD tuning and the
/// function tools.
pub fn session_update(options: &SessionOptions) -> Value {
    let tools: Vec<Value> = options
        .tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            })
        })
        .collect();

    json!({
        "type": "session.update",
        "session": {
            "instructions": options.instructions,
            "voice": options.model.voice,
            "temperature": options.model.temperature,
            "modalities": ["audio", "text"],
            "turn_detection": {
                "type": "server_vad",
                "threshold": options.vad.activation_threshold,
                "prefix_padding_ms": options.vad.prefix_padding_duration_ms,
                "silence_duration_ms": options.vad.min_silence_duration_ms,
            },
            "tools": tools,
            "tool_choice": "auto",
        }
    })
}

/// Asks the model to speak `text` to the user.
pub fn say_request(text: &str) -> Value {
    json!({
        "type": "response.create",
        "response": {
            "instructions": format!("Say the following to the user: {}", text),
        }
    })
}

/// Returns a tool result to the model and lets it continue the turn.
pub fn tool_output_events(call_id: &str, output: &str) -> [Value; 2] {
    [
        json!({
            "type": "conversation.item.create",
            "item": {
                "type": "function_call_output",
                "call_id": call_id,
                "output": output,
            }
        }),
        json!({ "type": "response.create" }),
    ]
}

/// Server events the bridge acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    FunctionCall {
        call_id: String,
        name: String,
        arguments: Value,
    },
    Transcript(String),
    Error(String),
    Other(String),
}

impl ServerEvent {
    /// Parses one text frame. `None` when it is not a JSON event.
    pub fn parse(raw: &str) -> Option<Self> {
        let event: Value = serde_json::from_str(raw).ok()?;
        let kind = event.get("type").and_then(Value::as_str)?;
        let text = |field: &str| {
            event
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let parsed = match kind {
            "response.function_call_arguments.done" => {
                // Arguments arrive as a JSON document inside a string.
                let arguments = serde_json::from_str(&text("arguments"))
                    .unwrap_or_else(|_| json!({}));
                ServerEvent::FunctionCall {
                    call_id: text("call_id"),
                    name: text("name"),
                    arguments,
                }
            }
            "response.audio_transcript.done" => ServerEvent::Transcript(text("transcript")),
            "response.text.done" => ServerEvent::Transcript(text("text")),
            "error" => ServerEvent::Error(
                event
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            ),
            other => ServerEvent::Other(other.to_string()),
        };
        Some(parsed)
    }
}

/// Live connection to the model. Dropping the bridge, or calling
/// [`RealtimeBridge::close`], ends the session.
pub struct RealtimeBridge {
    outbound: mpsc::Sender<Value>,
    task: JoinHandle<()>,
}

impl RealtimeBridge {
    /// Opens the model WebSocket, sends `session.update` and starts pumping
    /// events. Finished utterances are delivered on `transcripts`.
    pub async fn connect(
        settings: &RealtimeSettings,
        options: &SessionOptions,
        tools: Arc<dyn ToolHandler>,
        transcripts: mpsc::Sender<String>,
    ) -> Result<Self, VoiceError> {
        let mut request = settings
            .endpoint(&options.model.model)
            .into_client_request()
            .map_err(realtime_error)?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|e| VoiceError::Realtime(e.to_string()))?;
        request.headers_mut().insert("Authorization", auth);
        request
            .headers_mut()
            .insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (ws, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(realtime_error)?;
        let (mut sink, stream) = ws.split();

        sink.send(to_message(&session_update(options)))
            .await
            .map_err(realtime_error)?;
        info!(model = %options.model.model, tools = options.tools.len(), "model session configured");

        let (outbound, rx) = mpsc::channel(16);
        let task = tokio::spawn(pump(sink, stream, rx, tools, transcripts));
        Ok(Self { outbound, task })
    }

    /// Queues a spoken reply.
    pub async fn say(&self, text: &str) -> Result<(), VoiceError> {
        self.outbound
            .send(say_request(text))
            .await
            .map_err(|_| VoiceError::Realtime("model session closed".to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Closes the model socket and waits for the event pump to stop.
    pub async fn close(self) {
        drop(self.outbound);
        if let Err(e) = self.task.await {
            warn!(error = %e, "model event pump ended abnormally");
        }
    }
}

fn realtime_error(e: WsError) -> VoiceError {
    VoiceError::Realtime(e.to_string())
}

fn to_message(event: &Value) -> Message {
    Message::Text(event.to_string().into())
}

async fn pump<K, S>(
    mut sink: K,
    mut stream: S,
    mut outbound: mpsc::Receiver<Value>,
    tools: Arc<dyn ToolHandler>,
    transcripts: mpsc::Sender<String>,
) where
    K: Sink<Message, Error = WsError> + Unpin,
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(raw))) => {
                    for reply in handle_event(raw.as_str(), tools.as_ref(), &transcripts).await {
                        if let Err(e) = sink.send(to_message(&reply)).await {
                            warn!(error = %e, "failed to answer the model");
                            return;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("model closed the session");
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "model socket error");
                    return;
                }
            },
            queued = outbound.recv() => match queued {
                Some(event) => {
                    if let Err(e) = sink.send(to_message(&event)).await {
                        warn!(error = %e, "failed to send to the model");
                        return;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    debug!("model session closed locally");
                    return;
                }
            },
        }
    }
}

async fn handle_event(
    raw: &str,
    tools: &dyn ToolHandler,
    transcripts: &mpsc::Sender<String>,
) -> Vec<Value> {
    match ServerEvent::parse(raw) {
        Some(ServerEvent::FunctionCall {
            call_id,
            name,
            arguments,
        }) => {
            let output = tools.handle_tool_call(&name, arguments).await;
            tool_output_events(&call_id, &output).to_vec()
        }
        Some(ServerEvent::Transcript(text)) => {
            if !text.is_empty() && transcripts.send(text).await.is_err() {
                debug!("transcript receiver dropped");
            }
            Vec::new()
        }
        Some(ServerEvent::Error(message)) => {
            warn!(error = %message, "model reported an error");
            Vec::new()
        }
        Some(ServerEvent::Other(kind)) => {
            debug!(kind, "model event");
            Vec::new()
        }
        None => {
            warn!("unparsable model event");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{RealtimeModelConfig, VadConfig};
    use odoo_support_tools::tool_definitions;

    fn options() -> SessionOptions {
        let model = RealtimeModelConfig::default();
        SessionOptions {
            instructions: model.instructions.clone(),
            model,
            vad: VadConfig::default(),
            tools: tool_definitions(),
        }
    }

    #[test]
    fn session_update_carries_tools_and_vad() {
        let update = session_update(&options());
        let session = &update["session"];

        assert_eq!(update["type"], "session.update");
        assert_eq!(session["voice"], "alloy");
        assert_eq!(session["turn_detection"]["silence_duration_ms"], 550);
        assert_eq!(session["turn_detection"]["prefix_padding_ms"], 500);

        let tools = session["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 9);
        assert!(tools.iter().all(|t| t["type"] == "function"));
        assert!(tools.iter().any(|t| t["name"] == "analyze_error"));
    }

    #[test]
    fn function_call_arguments_are_decoded() {
        let raw = json!({
            "type": "response.function_call_arguments.done",
            "call_id": "call_7",
            "name": "install_module",
            "arguments": "{\"module_name\":\"sale\"}"
        })
        .to_string();

        assert_eq!(
            ServerEvent::parse(&raw),
            Some(ServerEvent::FunctionCall {
                call_id: "call_7".into(),
                name: "install_module".into(),
                arguments: json!({"module_name": "sale"}),
            })
        );
    }

    #[test]
    fn transcripts_errors_and_noise() {
        let transcript = json!({"type": "response.audio_transcript.done", "transcript": "أهلا"});
        assert_eq!(
            ServerEvent::parse(&transcript.to_string()),
            Some(ServerEvent::Transcript("أهلا".into()))
        );

        let error = json!({"type": "error", "error": {"message": "bad key"}});
        assert_eq!(
            ServerEvent::parse(&error.to_string()),
            Some(ServerEvent::Error("bad key".into()))
        );

        assert_eq!(
            ServerEvent::parse(r#"{"type":"session.created"}"#),
            Some(ServerEvent::Other("session.created".into()))
        );
        assert_eq!(ServerEvent::parse("not json"), None);
    }

    #[test]
    fn endpoint_appends_model_once() {
        let settings = RealtimeSettings::new(DEFAULT_REALTIME_URL, "sk-test");
        assert_eq!(
            settings.endpoint("gpt-4o-realtime-preview"),
            "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview"
        );

        let pinned = RealtimeSettings::new("ws://127.0.0.1:9/rt?model=x", "sk-test");
        assert_eq!(pinned.endpoint("ignored"), "ws://127.0.0.1:9/rt?model=x");
        assert!(!format!("{:?}", pinned).contains("sk-test"));
    }

    #[test]
    fn tool_output_then_continue() {
        let [item, next] = tool_output_events("call_1", "done");
        assert_eq!(item["item"]["call_id"], "call_1");
        assert_eq!(item["item"]["output"], "done");
        assert_eq!(next["type"], "response.create");
    }
}
