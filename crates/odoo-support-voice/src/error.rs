use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("LiveKit API error: {0}")]
    LiveKit(#[from] livekit_api::access_token::AccessTokenError),

    #[error("Room service error: {0}")]
    RoomService(String),

    #[error("LiveKit credentials not configured")]
    NotConfigured,

    #[error("no participant joined room '{room}' within {waited_secs}s")]
    ParticipantTimeout { room: String, waited_secs: u64 },

    #[error("session is not connected")]
    NotConnected,

    #[error("realtime model error: {0}")]
    Realtime(String),
}
