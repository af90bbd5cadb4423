// Integration tests for the HTTP control surface.

mod common;

use avatar_session::avatar::sim::SimScript;
use avatar_session::media::sim::SimMediaOptions;
use avatar_session::{create_router, AppState, SessionState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{harness, settings, wait_for_status, FakeBackend};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let h = harness(
        settings(),
        SimScript::default(),
        SimMediaOptions::default(),
        FakeBackend::new(),
    )
    .await;
    let app = create_router(AppState::new(Arc::clone(&h.controller)));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/session/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let status: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status["state"], "inactive");
    assert_eq!(status["seconds_remaining"], 600);
    assert_eq!(status["media_blocked"], false);
}

#[tokio::test]
async fn start_and_stop_via_http() {
    let h = harness(
        settings(),
        SimScript::default(),
        SimMediaOptions::default(),
        FakeBackend::new(),
    )
    .await;
    let app = create_router(AppState::new(Arc::clone(&h.controller)));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/start")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"voice": false}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(wait_for_status(&h.controller, |s| s.state == SessionState::Connected).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(h.backend.upload_count(), 1);
    assert_eq!(h.controller.state(), SessionState::Inactive);
}

#[tokio::test]
async fn retry_endpoint_enables_voice_on_connected_session() {
    let h = harness(
        settings(),
        SimScript::default(),
        SimMediaOptions::default(),
        FakeBackend::new(),
    )
    .await;
    let app = create_router(AppState::new(Arc::clone(&h.controller)));

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.state == SessionState::Connected).await);
    assert!(!h.controller.status().await.voice_active);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/retry")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(h.controller.status().await.voice_active);
    h.controller.stop_session().await.unwrap();
}

#[tokio::test]
async fn config_update_rejected_while_session_active() {
    let h = harness(
        settings(),
        SimScript::default(),
        SimMediaOptions::default(),
        FakeBackend::new(),
    )
    .await;
    let app = create_router(AppState::new(Arc::clone(&h.controller)));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/session/config")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"language": "en"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    h.controller.start_session(false).await.unwrap();
    assert!(wait_for_status(&h.controller, |s| s.state == SessionState::Connected).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/session/config")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"language": "fr"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    h.controller.stop_session().await.unwrap();
}

#[tokio::test]
async fn start_with_denied_microphone_maps_to_conflict() {
    let media = SimMediaOptions {
        deny_microphone: true,
        ..Default::default()
    };
    let h = harness(settings(), SimScript::default(), media, FakeBackend::new()).await;
    let app = create_router(AppState::new(Arc::clone(&h.controller)));

    // Empty body defaults to a voice-enabled start
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(h.controller.status().await.media_blocked);
}
