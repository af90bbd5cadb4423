use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::devices::{CameraStream, MediaDevices, MediaError};
use super::recorder::MediaRecorder;

/// Failure injection and chunk scripting for the simulated media layer.
#[derive(Debug, Clone)]
pub struct SimMediaOptions {
    pub deny_microphone: bool,
    pub camera_available: bool,
    pub video_tracks: usize,

    /// Fail recorder construction (unsupported codec)
    pub recorder_unsupported: bool,

    /// Chunks emitted while recording, one per interval, in order
    pub chunks: Vec<Vec<u8>>,
    pub chunk_interval: Duration,

    /// Extra chunk flushed on stop (empty means none)
    pub final_chunk: Vec<u8>,

    /// Never complete the final flush, so the consumer's bounded wait expires
    pub stuck_flush: bool,
}

impl Default for SimMediaOptions {
    fn default() -> Self {
        Self {
            deny_microphone: false,
            camera_available: true,
            video_tracks: 1,
            recorder_unsupported: false,
            chunks: vec![b"webm-chunk".to_vec()],
            chunk_interval: Duration::from_millis(20),
            final_chunk: Vec::new(),
            stuck_flush: false,
        }
    }
}

/// Simulated capture devices for development and tests.
#[derive(Default)]
pub struct SimMediaDevices {
    opts: SimMediaOptions,
    probe_calls: AtomicUsize,
    recorders_started: AtomicUsize,
    recorders_active: Arc<AtomicUsize>,
}

impl SimMediaDevices {
    pub fn new(opts: SimMediaOptions) -> Self {
        Self {
            opts,
            probe_calls: AtomicUsize::new(0),
            recorders_started: AtomicUsize::new(0),
            recorders_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Total recorders constructed so far
    pub fn recorders_started(&self) -> usize {
        self.recorders_started.load(Ordering::SeqCst)
    }

    /// Recorders currently recording; the controller keeps this at most 1
    pub fn recorders_active(&self) -> usize {
        self.recorders_active.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaDevices for SimMediaDevices {
    async fn probe_microphone(&self) -> Result<(), MediaError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);

        if self.opts.deny_microphone {
            return Err(MediaError::PermissionDenied(
                "microphone access denied".to_string(),
            ));
        }
        Ok(())
    }

    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, MediaError> {
        if !self.opts.camera_available {
            return Err(MediaError::NoDevice("no camera present".to_string()));
        }

        Ok(Box::new(SimCameraStream {
            tracks: self.opts.video_tracks,
            closed: AtomicBool::new(false),
        }))
    }

    fn create_recorder(
        &self,
        stream: &dyn CameraStream,
    ) -> Result<Box<dyn MediaRecorder>, MediaError> {
        if self.opts.recorder_unsupported {
            return Err(MediaError::UnsupportedCodec(
                "video/webm; codecs=vp8".to_string(),
            ));
        }
        if stream.video_track_count() == 0 {
            return Err(MediaError::NoDevice(
                "stream has no video track".to_string(),
            ));
        }

        self.recorders_started.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(SimRecorder::new(
            self.opts.clone(),
            Arc::clone(&self.recorders_active),
        )))
    }
}

pub struct SimCameraStream {
    tracks: usize,
    closed: AtomicBool,
}

impl CameraStream for SimCameraStream {
    fn video_track_count(&self) -> usize {
        if self.closed.load(Ordering::SeqCst) {
            0
        } else {
            self.tracks
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("Simulated camera stream released");
    }
}

pub struct SimRecorder {
    opts: SimMediaOptions,
    active_gauge: Arc<AtomicUsize>,
    recording: AtomicBool,
    emit_task: Option<JoinHandle<()>>,
    chunk_tx: Option<mpsc::Sender<Vec<u8>>>,
    // Kept alive when stuck_flush is set so the channel never closes
    stuck_tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl SimRecorder {
    fn new(opts: SimMediaOptions, active_gauge: Arc<AtomicUsize>) -> Self {
        Self {
            opts,
            active_gauge,
            recording: AtomicBool::new(false),
            emit_task: None,
            chunk_tx: None,
            stuck_tx: None,
        }
    }
}

#[async_trait::async_trait]
impl MediaRecorder for SimRecorder {
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<u8>>, MediaError> {
        if self.recording.swap(true, Ordering::SeqCst) {
            return Err(MediaError::DeviceLost(
                "recorder already started".to_string(),
            ));
        }
        self.active_gauge.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(64);
        self.chunk_tx = Some(tx.clone());

        let opts = self.opts.clone();
        self.emit_task = Some(tokio::spawn(async move {
            for chunk in opts.chunks {
                tokio::time::sleep(opts.chunk_interval).await;
                if tx.send(chunk).await.is_err() {
                    return;
                }
            }
            // Keep the channel open until stop aborts this task
            std::future::pending::<()>().await;
        }));

        debug!("Simulated recorder started");
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), MediaError> {
        if !self.recording.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.active_gauge.fetch_sub(1, Ordering::SeqCst);

        if let Some(task) = self.emit_task.take() {
            task.abort();
        }

        let tx = self.chunk_tx.take();
        if self.opts.stuck_flush {
            self.stuck_tx = tx;
            debug!("Simulated recorder stuck: final flush withheld");
            return Ok(());
        }

        if let Some(tx) = tx {
            if !self.opts.final_chunk.is_empty() {
                let _ = tx.send(self.opts.final_chunk.clone()).await;
            }
        }

        debug!("Simulated recorder stopped");
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "sim"
    }
}

impl Drop for SimRecorder {
    fn drop(&mut self) {
        if self.recording.swap(false, Ordering::SeqCst) {
            self.active_gauge.fetch_sub(1, Ordering::SeqCst);
        }
        if let Some(task) = self.emit_task.take() {
            task.abort();
        }
    }
}
