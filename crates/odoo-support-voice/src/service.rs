use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient, SendDataOptions};
use livekit_protocol::{ParticipantInfo, Room};
use std::time::Duration;

/// Seconds an empty support room lingers before LiveKit closes it.
pub const ROOM_EMPTY_TIMEOUT_SECS: u32 = 300;

/// A support room holds the user and the agent.
pub const ROOM_MAX_PARTICIPANTS: u32 = 2;

/// Track sources a support participant may publish. Screen sharing is how
/// the user shows the agent an error dialog.
pub const PUBLISH_SOURCES: &[&str] = &["microphone", "camera", "screen_share", "screen_share_audio"];

#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
    room_client: RoomClient,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client =
            RoomClient::with_api_key(&config.url, &config.api_key, &config.api_secret);
        Self {
            config,
            room_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    fn ensure_configured(&self) -> Result<(), VoiceError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(VoiceError::NotConfigured)
        }
    }

    /// Creates a support room. LiveKit returns the existing room when one
    /// with the same name is already open.
    pub async fn create_room(&self, name: &str) -> Result<Room, VoiceError> {
        self.ensure_configured()?;

        let options = CreateRoomOptions {
            empty_timeout: ROOM_EMPTY_TIMEOUT_SECS,
            max_participants: ROOM_MAX_PARTICIPANTS,
            ..Default::default()
        };

        let room = self
            .room_client
            .create_room(name, options)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))?;

        tracing::info!(room = %room.name, sid = %room.sid, "created room");
        Ok(room)
    }

    /// Signs a join token for `participant_identity` in `room_name`.
    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
        participant_name: &str,
    ) -> Result<String, VoiceError> {
        self.ensure_configured()?;

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: Some(true),
                can_subscribe: Some(true),
                can_publish_data: Some(true),
                can_publish_sources: PUBLISH_SOURCES.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    pub async fn list_participants(&self, room: &str) -> Result<Vec<ParticipantInfo>, VoiceError> {
        self.room_client
            .list_participants(room)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }

    /// Publishes `text` to everyone in `room` on the data channel under `topic`.
    pub async fn send_text(&self, room: &str, topic: &str, text: &str) -> Result<(), VoiceError> {
        let options = SendDataOptions {
            topic: Some(topic.to_string()),
            ..Default::default()
        };

        self.room_client
            .send_data(room, text.as_bytes().to_vec(), options)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }
}
