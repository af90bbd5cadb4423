use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::info;

use crate::config::BackendConfig;

/// Backend endpoints the controller talks to: token issuance and artifact
/// upload. Trait seam so tests can count and inspect upload attempts.
#[async_trait::async_trait]
pub trait SessionBackend: Send + Sync {
    /// POST to the token endpoint; the response body is the bearer token
    async fn fetch_access_token(&self) -> Result<String>;

    /// POST recording and transcript as multipart form data.
    ///
    /// Fields: `video` (webm binary) and `transcript` (JSON array of message
    /// records). Only the response status is inspected.
    async fn upload_recording(&self, video: Vec<u8>, transcript_json: Vec<u8>) -> Result<()>;
}

/// reqwest-based implementation over the configured backend base URL.
pub struct HttpBackend {
    client: reqwest::Client,
    token_url: String,
    upload_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let base = cfg.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            token_url: format!("{}{}", base, cfg.token_path),
            upload_url: format!("{}{}", base, cfg.upload_path),
        })
    }
}

#[async_trait::async_trait]
impl SessionBackend for HttpBackend {
    async fn fetch_access_token(&self) -> Result<String> {
        info!("Fetching access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .send()
            .await
            .context("Token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Token endpoint returned {}: {}", status, body);
        }

        let token = response.text().await.context("Failed to read token body")?;
        info!("Access token received");
        Ok(token)
    }

    async fn upload_recording(&self, video: Vec<u8>, transcript_json: Vec<u8>) -> Result<()> {
        info!(
            "Uploading recording ({} video bytes, {} transcript bytes) to {}",
            video.len(),
            transcript_json.len(),
            self.upload_url
        );

        let form = Form::new()
            .part(
                "video",
                Part::bytes(video)
                    .file_name("user_recording.webm")
                    .mime_str("video/webm")
                    .context("Invalid video part")?,
            )
            .part(
                "transcript",
                Part::bytes(transcript_json)
                    .mime_str("application/json")
                    .context("Invalid transcript part")?,
            );

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .context("Upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Upload endpoint returned {}: {}", status, body);
        }

        info!("Recording uploaded successfully");
        Ok(())
    }
}
