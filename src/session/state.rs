use chrono::{DateTime, Utc};
use serde::Serialize;

/// Session state as observed from the vendor integration layer.
///
/// The controller does not own the transitions; it reacts to vendor events
/// and guards its side effects with explicit state checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Inactive,
    Connecting,
    Connected,
}

/// What triggered finalization. All reasons converge on the same idempotent
/// sequence; the reason drives logging and the upload policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeReason {
    ManualStop,
    Timeout,
    StreamDisconnected,
    Teardown,
}

/// Point-in-time snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Option<String>,
    pub state: SessionState,
    pub media_blocked: bool,
    pub starting: bool,
    pub voice_active: bool,
    pub seconds_remaining: u64,
    pub connected_at: Option<DateTime<Utc>>,
    pub chunks_recorded: usize,
    pub transcript_entries: usize,
}
