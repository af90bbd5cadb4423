//! Local capture seam: camera preview, microphone probe, media recorder
//!
//! Mirrors the browser media surface the controller depends on, reduced to
//! traits so host environments can plug in the platform stack. At most one
//! recorder is active at a time; the controller enforces this by stopping any
//! prior recorder before starting a new one.

pub mod devices;
pub mod recorder;
pub mod sim;

pub use devices::{CameraStream, MediaDevices, MediaError};
pub use recorder::MediaRecorder;
