// Shared test doubles and harness wiring for the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use avatar_session::avatar::sim::{SimAvatarClient, SimScript};
use avatar_session::avatar::StartAvatarRequest;
use avatar_session::config::SessionSettings;
use avatar_session::media::sim::{SimMediaDevices, SimMediaOptions};
use avatar_session::{Navigator, SessionBackend, SessionController, SessionStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend double that records every upload and can fail token issuance.
pub struct FakeBackend {
    fail_token: bool,
    pub uploads: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    upload_attempts: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            fail_token: false,
            uploads: Mutex::new(Vec::new()),
            upload_attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing_token() -> Self {
        Self {
            fail_token: true,
            ..Self::new()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.upload_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn fetch_access_token(&self) -> Result<String> {
        if self.fail_token {
            anyhow::bail!("Token endpoint returned 500 Internal Server Error");
        }
        Ok("test-token".to_string())
    }

    async fn upload_recording(&self, video: Vec<u8>, transcript_json: Vec<u8>) -> Result<()> {
        self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push((video, transcript_json));
        Ok(())
    }
}

/// Navigator double recording every navigation.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub controller: Arc<SessionController>,
    pub backend: Arc<FakeBackend>,
    pub client: Arc<SimAvatarClient>,
    pub devices: Arc<SimMediaDevices>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        duration_secs: 600,
        flush_timeout_ms: 500,
        dashboard_route: "/dashboard".to_string(),
        upload_on_disconnect: true,
        auto_start: false,
    }
}

pub async fn harness(
    settings: SessionSettings,
    script: SimScript,
    media: SimMediaOptions,
    backend: FakeBackend,
) -> Harness {
    let backend = Arc::new(backend);
    let client = Arc::new(SimAvatarClient::new(script));
    let devices = Arc::new(SimMediaDevices::new(media));
    let navigator = Arc::new(RecordingNavigator::default());

    let controller = SessionController::new(
        settings,
        StartAvatarRequest::default(),
        backend.clone(),
        client.clone(),
        devices.clone(),
        navigator.clone(),
    );
    controller.acquire_camera().await;

    Harness {
        controller,
        backend,
        client,
        devices,
        navigator,
    }
}

/// Poll a status predicate until it holds or the (tokio-clock) deadline passes.
pub async fn wait_for_status(
    controller: &SessionController,
    mut pred: impl FnMut(&SessionStatus) -> bool,
) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while tokio::time::Instant::now() < deadline {
        if pred(&controller.status().await) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Poll an arbitrary condition until it holds or the deadline passes.
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
