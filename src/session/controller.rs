use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::state::{FinalizeReason, SessionState, SessionStatus};
use crate::avatar::{
    AvatarClient, AvatarError, AvatarEvent, AvatarHandle, Speaker, StartAvatarRequest,
    TranscriptEntry,
};
use crate::backend::SessionBackend;
use crate::config::SessionSettings;
use crate::media::{CameraStream, MediaDevices, MediaRecorder};

/// Route navigation seam. The embedding host decides what "navigate" means;
/// the default implementation only logs.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
    }
}

struct RecorderRig {
    recorder: Box<dyn MediaRecorder>,
    collect_task: JoinHandle<()>,
}

/// Coordinates credential fetch, the vendor session lifecycle, local camera
/// recording, the session countdown, and finalization.
///
/// All mutable session state lives in private fields with explicit lifecycle:
/// created with the controller, torn down by [`shutdown`](Self::shutdown).
pub struct SessionController {
    settings: SessionSettings,
    backend: Arc<dyn SessionBackend>,
    client: Arc<dyn AvatarClient>,
    devices: Arc<dyn MediaDevices>,
    navigator: Arc<dyn Navigator>,

    avatar_config: Mutex<StartAvatarRequest>,

    state_tx: watch::Sender<SessionState>,
    session_id: Mutex<Option<String>>,
    connected_at: Mutex<Option<DateTime<Utc>>>,

    starting: AtomicBool,
    media_blocked: AtomicBool,
    voice_active: AtomicBool,
    // Exactly-once guard for the finalize sequence
    finalizing: AtomicBool,

    seconds_remaining: AtomicU64,

    recorded_chunks: Mutex<Vec<Vec<u8>>>,
    transcript: Mutex<Vec<TranscriptEntry>>,

    handle: Mutex<Option<Box<dyn AvatarHandle>>>,
    recorder: Mutex<Option<RecorderRig>>,
    camera: Mutex<Option<Box<dyn CameraStream>>>,

    event_task: Mutex<Option<JoinHandle<()>>>,
    countdown_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        avatar_config: StartAvatarRequest,
        backend: Arc<dyn SessionBackend>,
        client: Arc<dyn AvatarClient>,
        devices: Arc<dyn MediaDevices>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Inactive);
        let duration_secs = settings.duration_secs;

        Arc::new(Self {
            settings,
            backend,
            client,
            devices,
            navigator,
            avatar_config: Mutex::new(avatar_config),
            state_tx,
            session_id: Mutex::new(None),
            connected_at: Mutex::new(None),
            starting: AtomicBool::new(false),
            media_blocked: AtomicBool::new(false),
            voice_active: AtomicBool::new(false),
            finalizing: AtomicBool::new(false),
            seconds_remaining: AtomicU64::new(duration_secs),
            recorded_chunks: Mutex::new(Vec::new()),
            transcript: Mutex::new(Vec::new()),
            handle: Mutex::new(None),
            recorder: Mutex::new(None),
            camera: Mutex::new(None),
            event_task: Mutex::new(None),
            countdown_task: Mutex::new(None),
        })
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Observe state transitions (used by the HTTP surface and tests)
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn media_blocked(&self) -> bool {
        self.media_blocked.load(Ordering::SeqCst)
    }

    /// Acquire the local camera preview stream.
    ///
    /// Failure only disables the preview and recording; the avatar session
    /// itself still works without it.
    pub async fn acquire_camera(&self) {
        match self.devices.open_camera().await {
            Ok(stream) => {
                info!(
                    "User camera preview acquired ({} video tracks)",
                    stream.video_track_count()
                );
                *self.camera.lock().await = Some(stream);
            }
            Err(e) => {
                warn!("Could not access user camera for preview: {}", e);
            }
        }
    }

    /// Update the avatar configuration. Only allowed while inactive.
    pub async fn set_avatar_config(&self, request: StartAvatarRequest) -> Result<()> {
        if self.state() != SessionState::Inactive {
            anyhow::bail!("avatar configuration can only change while the session is inactive");
        }
        *self.avatar_config.lock().await = request;
        Ok(())
    }

    /// Start a new avatar session.
    ///
    /// Setup-time failures (permission, credential, autoplay) abort the flow
    /// without ever reaching the upload path.
    pub async fn start_session(self: &Arc<Self>, with_voice: bool) -> Result<()> {
        if self.state() != SessionState::Inactive {
            warn!("Session already {:?}, ignoring start request", self.state());
            return Ok(());
        }
        if self.starting.swap(true, Ordering::SeqCst) {
            warn!("Session start already in progress");
            return Ok(());
        }

        let result = self.start_session_inner(with_voice).await;
        self.starting.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            error!("Error starting avatar session: {e:#}");
        }
        result
    }

    async fn start_session_inner(self: &Arc<Self>, with_voice: bool) -> Result<()> {
        self.state_tx.send_replace(SessionState::Connecting);
        self.media_blocked.store(false, Ordering::SeqCst);
        // Re-arm finalize and clear artifacts from any previous session
        self.finalizing.store(false, Ordering::SeqCst);
        self.transcript.lock().await.clear();
        self.recorded_chunks.lock().await.clear();
        self.seconds_remaining
            .store(self.settings.duration_secs, Ordering::SeqCst);

        let session_id = format!("session-{}", uuid::Uuid::new_v4());
        info!("Starting session {} (voice={})", session_id, with_voice);
        *self.session_id.lock().await = Some(session_id);

        // Microphone capability probe: acquire and release before any vendor
        // work, so a denial aborts with no side effects.
        if with_voice {
            if let Err(e) = self.devices.probe_microphone().await {
                self.media_blocked.store(true, Ordering::SeqCst);
                self.state_tx.send_replace(SessionState::Inactive);
                return Err(e).context("Microphone access denied or not available");
            }
        }

        let token = match self.backend.fetch_access_token().await {
            Ok(token) => token,
            Err(e) => {
                self.state_tx.send_replace(SessionState::Inactive);
                return Err(e).context("Failed to fetch access token");
            }
        };

        let mut handle = match self.client.init(&token).await {
            Ok(handle) => handle,
            Err(e) => {
                self.state_tx.send_replace(SessionState::Inactive);
                return Err(e).context("Failed to initialize avatar session");
            }
        };

        // Register the dispatch loop before starting the stream so no early
        // event is dropped.
        let events = handle
            .subscribe()
            .context("Avatar handle yielded no event stream")?;
        let dispatch = {
            let controller = Arc::clone(self);
            tokio::spawn(async move { controller.run_event_loop(events).await })
        };
        if let Some(old) = self.event_task.lock().await.replace(dispatch) {
            old.abort();
        }

        *self.handle.lock().await = Some(handle);

        let request = self.avatar_config.lock().await.clone();
        info!(
            "Starting avatar video (avatar={}, language={})",
            request.avatar_name, request.language
        );

        let start_result = {
            let mut guard = self.handle.lock().await;
            match guard.as_mut() {
                Some(handle) => handle.start_avatar(&request).await,
                None => return Ok(()), // finalized underneath us
            }
        };
        if let Err(e) = start_result {
            return self.abort_setup(e, "Failed to start avatar video").await;
        }

        if with_voice {
            let voice_result = {
                let mut guard = self.handle.lock().await;
                match guard.as_mut() {
                    Some(handle) => handle.start_voice_chat().await,
                    None => return Ok(()),
                }
            };
            match voice_result {
                Ok(()) => self.voice_active.store(true, Ordering::SeqCst),
                Err(e) => return self.abort_setup(e, "Failed to start voice chat").await,
            }
        }

        Ok(())
    }

    /// Cleanup for a failed session start. Stops the vendor session and any
    /// recording a racing stream-ready may have started, but never uploads:
    /// partial-setup failures are not user sessions worth recording.
    async fn abort_setup(&self, err: AvatarError, what: &'static str) -> Result<()> {
        if err.is_media_blocked() {
            info!("Playback or media permission blocked; prompting user retry");
            self.media_blocked.store(true, Ordering::SeqCst);
        }

        if let Some(mut handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.stop().await {
                warn!("Vendor stop during setup cleanup failed: {}", e);
            }
        }
        if let Some(task) = self.event_task.lock().await.take() {
            task.abort();
        }
        self.stop_active_recorder().await;
        self.recorded_chunks.lock().await.clear();

        self.state_tx.send_replace(SessionState::Inactive);
        Err(err).context(what)
    }

    /// Single dispatch point for all vendor events, registered once per
    /// session handle. Ends when the handle closes its event channel.
    async fn run_event_loop(self: Arc<Self>, mut events: mpsc::Receiver<AvatarEvent>) {
        debug!("Avatar event dispatch started");

        while let Some(event) = events.recv().await {
            match event {
                AvatarEvent::StreamReady => {
                    // A ready buffered in the channel before stop() must not
                    // revive a finalized session; the handle slot is empty
                    // once finalize or setup cleanup has run.
                    if self.finalizing.load(Ordering::SeqCst)
                        || self.handle.lock().await.is_none()
                    {
                        debug!("Ignoring stream-ready for an ended session");
                        continue;
                    }
                    info!("Stream ready");
                    self.media_blocked.store(false, Ordering::SeqCst);
                    self.state_tx.send_replace(SessionState::Connected);
                    *self.connected_at.lock().await = Some(Utc::now());

                    if let Err(e) = self.start_recording().await {
                        // Recording is best effort; the session continues
                        warn!("Recording unavailable: {e:#}");
                    }

                    self.seconds_remaining
                        .store(self.settings.duration_secs, Ordering::SeqCst);
                    self.spawn_countdown().await;
                }
                AvatarEvent::StreamDisconnected => {
                    if self.finalizing.load(Ordering::SeqCst) {
                        debug!("Ignoring stream-disconnected for an ended session");
                        continue;
                    }
                    info!("Stream disconnected");
                    // Detached so teardown can never abort a finalize in
                    // progress along with this dispatch task.
                    let controller = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = controller
                            .finalize(FinalizeReason::StreamDisconnected)
                            .await
                        {
                            error!("Finalize after disconnect failed: {e:#}");
                        }
                    });
                }
                AvatarEvent::UserTalkingMessage { text } => {
                    self.push_transcript(Speaker::User, text).await;
                }
                AvatarEvent::AvatarTalkingMessage { text } => {
                    self.push_transcript(Speaker::Avatar, text).await;
                }
                AvatarEvent::AvatarStartTalking => debug!("Avatar started talking"),
                AvatarEvent::AvatarStopTalking => debug!("Avatar stopped talking"),
                AvatarEvent::UserStart => debug!("User started talking"),
                AvatarEvent::UserStop => debug!("User stopped talking"),
                AvatarEvent::UserEndMessage => debug!("User message complete"),
                AvatarEvent::AvatarEndMessage => debug!("Avatar message complete"),
                AvatarEvent::ConnectionQualityChanged(quality) => {
                    info!("Connection quality changed: {:?}", quality);
                }
            }
        }

        debug!("Avatar event dispatch stopped");
    }

    async fn push_transcript(&self, speaker: Speaker, text: String) {
        debug!("{:?} message: {}", speaker, text);
        self.transcript.lock().await.push(TranscriptEntry {
            speaker,
            text,
            timestamp: Utc::now(),
        });
    }

    /// Start recording the local camera stream.
    ///
    /// Any previous recorder is stopped first so at most one recorder
    /// instance is ever active. Construction failure is logged by the caller
    /// and the session continues without a recording.
    async fn start_recording(self: &Arc<Self>) -> Result<()> {
        let camera = self.camera.lock().await;
        let stream = camera
            .as_ref()
            .context("User camera stream not available")?;
        if stream.video_track_count() == 0 {
            anyhow::bail!("no video track available for recording");
        }

        self.stop_active_recorder().await;

        let mut recorder = self
            .devices
            .create_recorder(stream.as_ref())
            .context("Failed to construct media recorder")?;
        let mut chunk_rx = recorder
            .start()
            .await
            .context("Failed to start media recorder")?;

        self.recorded_chunks.lock().await.clear();

        let controller = Arc::clone(self);
        let collect_task = tokio::spawn(async move {
            debug!("Chunk collection started");
            while let Some(chunk) = chunk_rx.recv().await {
                if chunk.is_empty() {
                    continue;
                }
                controller.recorded_chunks.lock().await.push(chunk);
            }
            debug!("Chunk collection stopped");
        });

        *self.recorder.lock().await = Some(RecorderRig {
            recorder,
            collect_task,
        });
        info!("User camera recording started");
        Ok(())
    }

    /// Stop the active recorder and wait for its final data flush.
    ///
    /// The flush arrives as a channel close observed by the collection task.
    /// A recorder that never completes must not hang finalization, so the
    /// wait is bounded; buffered chunks are used as-is on expiry.
    async fn stop_active_recorder(&self) {
        let rig = self.recorder.lock().await.take();
        let Some(mut rig) = rig else {
            return;
        };

        if let Err(e) = rig.recorder.stop().await {
            warn!("Failed to stop media recorder: {}", e);
        }

        let flush_timeout = Duration::from_millis(self.settings.flush_timeout_ms);
        match tokio::time::timeout(flush_timeout, &mut rig.collect_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Chunk collection task failed: {}", e),
            Err(_) => {
                warn!(
                    "Recorder final flush timed out after {:?}, using buffered chunks",
                    flush_timeout
                );
                rig.collect_task.abort();
            }
        }
    }

    /// Run the one-second countdown while connected. The loop exits on any
    /// state change or finalize, so the timer never fires after teardown.
    async fn spawn_countdown(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if controller.finalizing.load(Ordering::SeqCst)
                    || controller.state() != SessionState::Connected
                {
                    break;
                }

                let remaining = controller.seconds_remaining.load(Ordering::SeqCst);
                if remaining <= 1 {
                    controller.seconds_remaining.store(0, Ordering::SeqCst);
                    info!("Session time limit reached, finalizing");
                    let trigger = Arc::clone(&controller);
                    tokio::spawn(async move {
                        if let Err(e) = trigger.finalize(FinalizeReason::Timeout).await {
                            error!("Finalize after timeout failed: {e:#}");
                        }
                    });
                    break;
                }
                controller
                    .seconds_remaining
                    .store(remaining - 1, Ordering::SeqCst);
            }
        });

        if let Some(old) = self.countdown_task.lock().await.replace(task) {
            old.abort();
        }
    }

    /// Manual stop from the user controls.
    pub async fn stop_session(&self) -> Result<()> {
        self.finalize(FinalizeReason::ManualStop).await
    }

    /// Retry path for a blocked-media prompt: restart the whole session if
    /// inactive, or just bring up voice chat if the stream already plays.
    pub async fn retry_after_block(self: &Arc<Self>) -> Result<()> {
        self.media_blocked.store(false, Ordering::SeqCst);

        match self.state() {
            SessionState::Inactive => self.start_session(true).await,
            SessionState::Connected if !self.voice_active.load(Ordering::SeqCst) => {
                let result = {
                    let mut guard = self.handle.lock().await;
                    match guard.as_mut() {
                        Some(handle) => handle.start_voice_chat().await,
                        None => return Ok(()),
                    }
                };
                match result {
                    Ok(()) => {
                        self.voice_active.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                    Err(e) => {
                        if e.is_media_blocked() {
                            self.media_blocked.store(true, Ordering::SeqCst);
                        }
                        Err(e).context("Failed to start voice chat on retry")
                    }
                }
            }
            _ => {
                info!("Session already active, nothing to retry");
                Ok(())
            }
        }
    }

    /// Stop all capture, upload the artifacts, and navigate away.
    ///
    /// Idempotent: timeout, manual stop, stream disconnect and teardown can
    /// all race here, and only the first trigger runs the sequence. Upload
    /// failure is logged and never blocks navigation.
    pub async fn finalize(&self, reason: FinalizeReason) -> Result<()> {
        if self.finalizing.swap(true, Ordering::SeqCst) {
            debug!("Finalize already in progress, ignoring {:?} trigger", reason);
            return Ok(());
        }
        info!("Finalizing session ({:?})", reason);

        // The countdown loop only ever spawns finalize detached, so aborting
        // it here cannot cancel a finalize in progress.
        if let Some(task) = self.countdown_task.lock().await.take() {
            task.abort();
        }

        if let Some(mut handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.stop().await {
                warn!("Vendor stop failed: {}", e);
            }
        }

        self.stop_active_recorder().await;

        let video: Vec<u8> = {
            let mut chunks = self.recorded_chunks.lock().await;
            std::mem::take(&mut *chunks).concat()
        };
        let transcript = self.transcript.lock().await.clone();

        let upload = reason != FinalizeReason::StreamDisconnected
            || self.settings.upload_on_disconnect;
        if upload {
            match serde_json::to_vec(&transcript) {
                Ok(transcript_json) => {
                    if let Err(e) = self.backend.upload_recording(video, transcript_json).await {
                        error!("Failed to upload recording: {e:#}");
                    }
                }
                Err(e) => error!("Failed to serialize transcript: {}", e),
            }
        } else {
            info!("Skipping upload for {:?} per policy", reason);
        }

        self.voice_active.store(false, Ordering::SeqCst);
        *self.connected_at.lock().await = None;
        self.state_tx.send_replace(SessionState::Inactive);

        self.navigator.navigate(&self.settings.dashboard_route);
        Ok(())
    }

    /// Teardown path: finalize (idempotent) and release local devices.
    pub async fn shutdown(&self) {
        if let Err(e) = self.finalize(FinalizeReason::Teardown).await {
            error!("Finalize during shutdown failed: {e:#}");
        }
        if let Some(task) = self.event_task.lock().await.take() {
            task.abort();
        }
        if let Some(camera) = self.camera.lock().await.take() {
            camera.close();
        }
    }

    pub async fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.session_id.lock().await.clone(),
            state: self.state(),
            media_blocked: self.media_blocked.load(Ordering::SeqCst),
            starting: self.starting.load(Ordering::SeqCst),
            voice_active: self.voice_active.load(Ordering::SeqCst),
            seconds_remaining: self.seconds_remaining.load(Ordering::SeqCst),
            connected_at: *self.connected_at.lock().await,
            chunks_recorded: self.recorded_chunks.lock().await.len(),
            transcript_entries: self.transcript.lock().await.len(),
        }
    }

    /// Accumulated transcript so far
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().await.clone()
    }
}
