pub mod avatar;
pub mod backend;
pub mod config;
pub mod http;
pub mod media;
pub mod session;

pub use avatar::{
    AvatarClient, AvatarError, AvatarEvent, AvatarHandle, Speaker, StartAvatarRequest,
    TranscriptEntry,
};
pub use backend::{HttpBackend, SessionBackend};
pub use config::Config;
pub use http::{create_router, AppState};
pub use media::{CameraStream, MediaDevices, MediaError, MediaRecorder};
pub use session::{
    FinalizeReason, LoggingNavigator, Navigator, SessionController, SessionState, SessionStatus,
};
