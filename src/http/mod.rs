//! HTTP control surface for the session controller
//!
//! Replaces the original UI controls with a small REST API:
//! - POST /session/start - Start a new avatar session
//! - POST /session/stop - Manually stop and finalize
//! - POST /session/retry - Retry after a blocked-media prompt
//! - PUT /session/config - Replace the avatar configuration while inactive
//! - GET /session/status - Query session state and counters
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
