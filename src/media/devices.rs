use super::recorder::MediaRecorder;

/// Errors from the local capture devices and recorder.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no capture device available: {0}")]
    NoDevice(String),

    #[error("unsupported recorder codec: {0}")]
    UnsupportedCodec(String),

    #[error("capture device lost: {0}")]
    DeviceLost(String),
}

/// A live local camera preview stream.
pub trait CameraStream: Send + Sync {
    /// Number of live video tracks; recording requires at least one
    fn video_track_count(&self) -> usize;

    /// Release the underlying device tracks
    fn close(&self);
}

/// Local capture device access.
///
/// Host environments back this with the platform media stack; the controller
/// only depends on the seam.
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Capability probe: acquires the microphone and releases it immediately.
    ///
    /// Used before voice-enabled session start so a denial aborts the flow
    /// before any vendor work happens.
    async fn probe_microphone(&self) -> Result<(), MediaError>;

    /// Open the local camera preview stream (video only)
    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, MediaError>;

    /// Construct a recorder over a live camera stream
    fn create_recorder(
        &self,
        stream: &dyn CameraStream,
    ) -> Result<Box<dyn MediaRecorder>, MediaError>;
}
