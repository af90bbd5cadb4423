use anyhow::Result;
use serde::Deserialize;

use crate::avatar::StartAvatarRequest;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub session: SessionSettings,
    pub avatar: StartAvatarRequest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "avatar-session".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Backend endpoints for token issuance and artifact upload
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub token_path: String,
    pub upload_path: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token_path: "/api/get-access-token".to_string(),
            upload_path: "/api/upload".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Session lifecycle knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Hard session limit in seconds; the countdown forces finalize at zero
    pub duration_secs: u64,

    /// Bound on the wait for the recorder's final data flush
    pub flush_timeout_ms: u64,

    /// Route navigated to after finalize, regardless of upload outcome
    pub dashboard_route: String,

    /// Whether a disconnect-triggered finalize still uploads the artifacts
    pub upload_on_disconnect: bool,

    /// Start a voice-enabled session automatically on boot
    pub auto_start: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_secs: 600, // 10 minutes
            flush_timeout_ms: 3000,
            dashboard_route: "/dashboard".to_string(),
            upload_on_disconnect: true,
            auto_start: false,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
