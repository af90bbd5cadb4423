use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::ConnectionQuality;

/// Who produced a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Avatar,
}

/// A single message record accumulated over the session's lifetime.
///
/// The full ordered sequence is serialized as a JSON array at finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle and message events emitted by the vendor session handle.
///
/// Delivery is in emission order per handle, but no ordering is guaranteed
/// between these and other event sources (timers, user actions).
#[derive(Debug, Clone)]
pub enum AvatarEvent {
    AvatarStartTalking,
    AvatarStopTalking,
    /// The remote avatar's video is available to play
    StreamReady,
    /// The remote side ended the session
    StreamDisconnected,
    UserStart,
    UserStop,
    UserTalkingMessage { text: String },
    UserEndMessage,
    AvatarTalkingMessage { text: String },
    AvatarEndMessage,
    ConnectionQualityChanged(ConnectionQuality),
}
