//! Session controller
//!
//! Coordinates the whole session lifecycle:
//! - access-token fetch and vendor session initialization
//! - vendor event dispatch (stream-ready, disconnect, transcript messages)
//! - local camera recording with an at-most-one-recorder invariant
//! - the fixed-duration countdown that forces termination
//! - idempotent finalization: stop capture, upload artifacts, navigate away

mod controller;
mod state;

pub use controller::{LoggingNavigator, Navigator, SessionController};
pub use state::{FinalizeReason, SessionState, SessionStatus};
