use tokio::sync::mpsc;

use super::devices::MediaError;

/// Incremental media recorder over a camera stream.
///
/// Emits binary container fragments (webm) as they become available. After
/// `stop`, any final flush chunk is delivered and then the chunk channel
/// closes. A recorder whose final flush never completes is possible; consumers
/// must bound their wait on the channel close.
#[async_trait::async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Start recording; returns the chunk receiver
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<u8>>, MediaError>;

    /// Stop recording and trigger the final data flush
    async fn stop(&mut self) -> Result<(), MediaError>;

    fn is_recording(&self) -> bool;

    /// Recorder name for logging
    fn name(&self) -> &str;
}
