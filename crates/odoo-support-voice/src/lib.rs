//! Voice session support for the Odoo support agent.
//!
//! Integrates with LiveKit for room management and join tokens, and wires
//! the hosted speech-to-speech model, voice-activity detection settings and
//! the Odoo tool set into a session.
//!
//! Media transport, turn taking and interruption handling belong to the
//! agent framework behind [`RoomSession`]. [`LiveKitRoomSession`] drives the
//! room through the LiveKit server API and binds the model through
//! [`RealtimeBridge`], without a media path.

pub mod agent;
pub mod config;
pub mod error;
pub mod prompts;
pub mod realtime;
pub mod service;
pub mod session;

pub use agent::{
    Participant, RealtimeModelConfig, RoomSession, SessionOptions, SupportAgent, ToolHandler,
    VadConfig,
};
pub use config::LiveKitConfig;
pub use error::VoiceError;
pub use prompts::{GREETING_PROMPT, SYSTEM_PROMPT};
pub use realtime::{RealtimeBridge, RealtimeSettings, ServerEvent};
pub use service::{VoiceService, PUBLISH_SOURCES};
pub use session::LiveKitRoomSession;
