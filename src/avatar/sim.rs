use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::client::{AvatarClient, AvatarError, AvatarHandle};
use super::events::{AvatarEvent, Speaker};
use super::types::{ConnectionQuality, StartAvatarRequest};

/// Scripted behavior for the simulated vendor session.
#[derive(Debug, Clone)]
pub struct SimScript {
    /// Delay before the stream-ready event fires
    pub ready_delay: Duration,

    /// Talking messages emitted after stream-ready, one per interval
    pub lines: Vec<(Speaker, String)>,

    /// Gap between talking messages
    pub line_interval: Duration,

    /// Emit a second stream-ready this long after the first (vendor
    /// re-emits ready on internal reconnects)
    pub extra_ready: Option<Duration>,

    /// Emit stream-disconnected this long after stream-ready
    pub disconnect_after: Option<Duration>,

    /// Fail the start-avatar call instead of streaming
    pub start_error: Option<SimStartError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStartError {
    AutoplayBlocked,
    Api,
}

impl Default for SimScript {
    fn default() -> Self {
        Self {
            ready_delay: Duration::from_millis(50),
            lines: Vec::new(),
            line_interval: Duration::from_millis(25),
            extra_ready: None,
            disconnect_after: None,
            start_error: None,
        }
    }
}

/// Simulated vendor client for development and tests.
///
/// Every handle it hands out replays the configured [`SimScript`]. Call
/// counters let tests assert which vendor operations were reached.
#[derive(Default)]
pub struct SimAvatarClient {
    script: Mutex<SimScript>,
    init_calls: AtomicUsize,
    start_calls: Arc<AtomicUsize>,
}

impl SimAvatarClient {
    pub fn new(script: SimScript) -> Self {
        Self {
            script: Mutex::new(script),
            init_calls: AtomicUsize::new(0),
            start_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the script replayed by subsequently created handles
    pub fn set_script(&self, script: SimScript) {
        *self.script.lock().unwrap() = script;
    }

    /// Number of session handles created so far
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Number of start-avatar calls across all handles
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AvatarClient for SimAvatarClient {
    async fn init(&self, token: &str) -> Result<Box<dyn AvatarHandle>, AvatarError> {
        if token.is_empty() {
            return Err(AvatarError::Api("empty access token".to_string()));
        }

        self.init_calls.fetch_add(1, Ordering::SeqCst);
        debug!("Simulated avatar session initialized");

        let script = self.script.lock().unwrap().clone();
        Ok(Box::new(SimAvatarHandle::new(
            script,
            Arc::clone(&self.start_calls),
        )))
    }
}

pub struct SimAvatarHandle {
    script: SimScript,
    start_calls: Arc<AtomicUsize>,
    event_tx: Option<mpsc::Sender<AvatarEvent>>,
    event_rx: Option<mpsc::Receiver<AvatarEvent>>,
    script_task: Option<JoinHandle<()>>,
    voice_active: AtomicBool,
}

impl SimAvatarHandle {
    fn new(script: SimScript, start_calls: Arc<AtomicUsize>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);

        Self {
            script,
            start_calls,
            event_tx: Some(event_tx),
            event_rx: Some(event_rx),
            script_task: None,
            voice_active: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl AvatarHandle for SimAvatarHandle {
    fn subscribe(&mut self) -> Option<mpsc::Receiver<AvatarEvent>> {
        self.event_rx.take()
    }

    async fn start_avatar(&mut self, request: &StartAvatarRequest) -> Result<(), AvatarError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        match self.script.start_error {
            Some(SimStartError::AutoplayBlocked) => {
                return Err(AvatarError::AutoplayBlocked(
                    "simulated autoplay rejection".to_string(),
                ));
            }
            Some(SimStartError::Api) => {
                return Err(AvatarError::Api("simulated start failure".to_string()));
            }
            None => {}
        }

        let Some(tx) = self.event_tx.clone() else {
            return Err(AvatarError::Api("session already stopped".to_string()));
        };

        info!(
            "Simulated avatar starting: {} ({})",
            request.avatar_name, request.language
        );

        let script = self.script.clone();
        self.script_task = Some(tokio::spawn(async move {
            tokio::time::sleep(script.ready_delay).await;

            if tx.send(AvatarEvent::StreamReady).await.is_err() {
                return;
            }
            let ready_at = tokio::time::Instant::now();

            let _ = tx
                .send(AvatarEvent::ConnectionQualityChanged(
                    ConnectionQuality::Good,
                ))
                .await;

            for (speaker, text) in script.lines {
                tokio::time::sleep(script.line_interval).await;

                let event = match speaker {
                    Speaker::User => AvatarEvent::UserTalkingMessage { text },
                    Speaker::Avatar => AvatarEvent::AvatarTalkingMessage { text },
                };

                if tx.send(event).await.is_err() {
                    return;
                }
            }

            if let Some(after) = script.extra_ready {
                tokio::time::sleep_until(ready_at + after).await;
                if tx.send(AvatarEvent::StreamReady).await.is_err() {
                    return;
                }
            }

            if let Some(after) = script.disconnect_after {
                tokio::time::sleep_until(ready_at + after).await;
                let _ = tx.send(AvatarEvent::StreamDisconnected).await;
            }
        }));

        Ok(())
    }

    async fn start_voice_chat(&mut self) -> Result<(), AvatarError> {
        if self.event_tx.is_none() {
            return Err(AvatarError::Api("session already stopped".to_string()));
        }

        self.voice_active.store(true, Ordering::SeqCst);
        debug!("Simulated voice chat started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), AvatarError> {
        if let Some(task) = self.script_task.take() {
            task.abort();
        }

        // Dropping the sender closes the event channel, which ends dispatch.
        self.event_tx = None;
        debug!("Simulated avatar session stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "sim"
    }
}
