use tokio::sync::mpsc;

use super::events::AvatarEvent;
use super::types::StartAvatarRequest;

/// Errors surfaced by the vendor SDK seam.
///
/// The controller branches on classification: blocked-media errors surface as
/// a user-facing retry prompt, everything else aborts the start flow.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("playback blocked by autoplay policy: {0}")]
    AutoplayBlocked(String),

    #[error("media permission denied: {0}")]
    PermissionDenied(String),

    #[error("vendor API error: {0}")]
    Api(String),

    #[error("vendor transport error: {0}")]
    Transport(String),
}

impl AvatarError {
    /// True for errors that should show the "media blocked" retry prompt
    pub fn is_media_blocked(&self) -> bool {
        matches!(
            self,
            AvatarError::AutoplayBlocked(_) | AvatarError::PermissionDenied(_)
        )
    }
}

/// Entry point to the vendor streaming service.
#[async_trait::async_trait]
pub trait AvatarClient: Send + Sync {
    /// Initialize a session handle with a fresh access token
    async fn init(&self, token: &str) -> Result<Box<dyn AvatarHandle>, AvatarError>;
}

/// An initialized vendor session.
///
/// The embedding host provides the real SDK bridge; [`crate::avatar::sim`]
/// ships a scriptable implementation for development and tests.
#[async_trait::async_trait]
pub trait AvatarHandle: Send + Sync {
    /// Take the lifecycle event receiver.
    ///
    /// Must be called before [`start_avatar`](Self::start_avatar) so no early
    /// event is lost. Subsequent calls return `None`.
    fn subscribe(&mut self) -> Option<mpsc::Receiver<AvatarEvent>>;

    /// Start the avatar video stream with the given configuration
    async fn start_avatar(&mut self, request: &StartAvatarRequest) -> Result<(), AvatarError>;

    /// Start the bidirectional voice chat channel
    async fn start_voice_chat(&mut self) -> Result<(), AvatarError>;

    /// Stop the session. Idempotent; closes the event channel.
    async fn stop(&mut self) -> Result<(), AvatarError>;

    /// Handle name for logging
    fn name(&self) -> &str;
}
