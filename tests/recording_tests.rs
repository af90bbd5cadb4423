// Integration tests for the local recording path: the at-most-one-recorder
// invariant and the bounded wait on the recorder's final data flush.

mod common;

use avatar_session::avatar::sim::SimScript;
use avatar_session::media::sim::SimMediaOptions;
use avatar_session::SessionState;
use common::{harness, settings, wait_for_status, FakeBackend};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn repeated_stream_ready_never_leaves_two_recorders() {
    let script = SimScript {
        // Vendor re-emits stream-ready (internal reconnect); the controller
        // must stop the first recorder before starting the second.
        extra_ready: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let h = harness(
        settings(),
        script,
        SimMediaOptions::default(),
        FakeBackend::new(),
    )
    .await;

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.state == SessionState::Connected).await);

    // Wait until the second ready has been processed
    assert!(common::wait_for(|| h.devices.recorders_started() == 2).await);
    assert_eq!(h.devices.recorders_active(), 1);

    h.controller.stop_session().await.unwrap();
    assert_eq!(h.devices.recorders_active(), 0);
}

#[tokio::test(start_paused = true)]
async fn stuck_final_flush_is_bounded_and_uses_buffered_chunks() {
    let media = SimMediaOptions {
        chunks: vec![b"webm-chunk".to_vec()],
        stuck_flush: true,
        ..Default::default()
    };
    let h = harness(settings(), SimScript::default(), media, FakeBackend::new()).await;

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.chunks_recorded == 1).await);

    // The recorder never closes its chunk channel; finalize must still
    // complete within the flush bound and upload what was buffered.
    h.controller.stop_session().await.unwrap();

    assert_eq!(h.backend.upload_count(), 1);
    let uploads = h.backend.uploads.lock().unwrap();
    assert_eq!(uploads[0].0.as_slice(), b"webm-chunk".as_slice());
}

#[tokio::test(start_paused = true)]
async fn missing_camera_disables_recording_only() {
    let media = SimMediaOptions {
        camera_available: false,
        ..Default::default()
    };
    let h = harness(settings(), SimScript::default(), media, FakeBackend::new()).await;

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.state == SessionState::Connected).await);

    assert_eq!(h.devices.recorders_started(), 0);
    assert_eq!(h.controller.status().await.chunks_recorded, 0);
}

#[tokio::test(start_paused = true)]
async fn empty_recorder_chunks_are_dropped() {
    let media = SimMediaOptions {
        chunks: vec![b"head".to_vec(), Vec::new(), b"tail".to_vec()],
        ..Default::default()
    };
    let h = harness(settings(), SimScript::default(), media, FakeBackend::new()).await;

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.chunks_recorded == 2).await);

    h.controller.stop_session().await.unwrap();
    let uploads = h.backend.uploads.lock().unwrap();
    assert_eq!(uploads[0].0.as_slice(), b"headtail".as_slice());
}
