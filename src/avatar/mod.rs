//! Vendor streaming-avatar SDK seam
//!
//! The real SDK lives in the embedding host; this crate consumes it through
//! the `AvatarClient`/`AvatarHandle` traits:
//! - session initialization with a short-lived access token
//! - a single event channel for lifecycle and message events
//! - start-avatar / start-voice-chat / stop operations
//!
//! `sim` provides a scriptable implementation for development and tests.

pub mod client;
pub mod events;
pub mod sim;
pub mod types;

pub use client::{AvatarClient, AvatarError, AvatarHandle};
pub use events::{AvatarEvent, Speaker, TranscriptEntry};
pub use types::{
    AvatarQuality, ConnectionQuality, StartAvatarRequest, SttProvider, VoiceChatTransport,
    VoiceEmotion, VoiceModel, VoiceSettings,
};
