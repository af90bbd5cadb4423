use serde::{Deserialize, Serialize};

/// Video quality requested from the streaming service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarQuality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEmotion {
    Neutral,
    Excited,
    Serious,
    Friendly,
    Soothing,
}

/// TTS voice model identifiers as the vendor names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceModel {
    #[serde(rename = "eleven_flash_v2_5")]
    ElevenFlashV2_5,
    #[serde(rename = "eleven_multilingual_v2")]
    ElevenMultilingualV2,
}

/// Transport used for the voice chat channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceChatTransport {
    Websocket,
    Livekit,
}

/// Speech-to-text provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    Deepgram,
    Gladia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Good,
    Bad,
    Unknown,
}

/// Voice parameters for the avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Speech rate multiplier (1.0 = normal)
    pub rate: f32,
    pub emotion: VoiceEmotion,
    pub model: VoiceModel,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 1.5,
            emotion: VoiceEmotion::Excited,
            model: VoiceModel::ElevenFlashV2_5,
        }
    }
}

/// Configuration object passed to the vendor "start avatar" call.
///
/// Editable by the user only while the session is inactive; the controller
/// snapshots it when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartAvatarRequest {
    pub quality: AvatarQuality,
    pub avatar_name: String,
    /// Knowledge base backing the avatar's answers, if any
    pub knowledge_id: Option<String>,
    pub voice: VoiceSettings,
    /// BCP 47-ish language code (e.g. "es")
    pub language: String,
    pub transport: VoiceChatTransport,
    pub stt_provider: SttProvider,
}

impl Default for StartAvatarRequest {
    fn default() -> Self {
        Self {
            quality: AvatarQuality::Low,
            avatar_name: "Ann_Doctor_Standing2_public".to_string(),
            knowledge_id: Some("13f254b102cf436d8c07b9fb617dbadf".to_string()),
            voice: VoiceSettings::default(),
            language: "es".to_string(),
            transport: VoiceChatTransport::Websocket,
            stt_provider: SttProvider::Deepgram,
        }
    }
}
