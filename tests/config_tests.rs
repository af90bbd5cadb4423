// Unit tests for configuration defaults and the avatar request wire shape.

use avatar_session::avatar::{
    AvatarQuality, StartAvatarRequest, SttProvider, VoiceChatTransport, VoiceEmotion, VoiceModel,
};
use avatar_session::config::{Config, SessionSettings};

#[test]
fn default_avatar_request_matches_product_defaults() {
    let request = StartAvatarRequest::default();

    assert_eq!(request.quality, AvatarQuality::Low);
    assert_eq!(request.avatar_name, "Ann_Doctor_Standing2_public");
    assert_eq!(
        request.knowledge_id.as_deref(),
        Some("13f254b102cf436d8c07b9fb617dbadf")
    );
    assert_eq!(request.language, "es");
    assert_eq!(request.voice.rate, 1.5);
    assert_eq!(request.voice.emotion, VoiceEmotion::Excited);
    assert_eq!(request.voice.model, VoiceModel::ElevenFlashV2_5);
    assert_eq!(request.transport, VoiceChatTransport::Websocket);
    assert_eq!(request.stt_provider, SttProvider::Deepgram);
}

#[test]
fn avatar_request_serializes_vendor_names() {
    let request = StartAvatarRequest::default();
    let json = serde_json::to_string(&request).unwrap();

    assert!(json.contains("\"low\""));
    assert!(json.contains("\"excited\""));
    assert!(json.contains("\"eleven_flash_v2_5\""));
    assert!(json.contains("\"websocket\""));
    assert!(json.contains("\"deepgram\""));

    let roundtrip: StartAvatarRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(roundtrip.avatar_name, request.avatar_name);
    assert_eq!(roundtrip.voice.model, request.voice.model);
}

#[test]
fn partial_avatar_request_fills_defaults() {
    let request: StartAvatarRequest = serde_json::from_str(r#"{"language": "en"}"#).unwrap();

    assert_eq!(request.language, "en");
    assert_eq!(request.avatar_name, "Ann_Doctor_Standing2_public");
    assert_eq!(request.quality, AvatarQuality::Low);
}

#[test]
fn session_settings_defaults() {
    let settings = SessionSettings::default();

    assert_eq!(settings.duration_secs, 600, "Session limit should be 10 minutes");
    assert_eq!(settings.flush_timeout_ms, 3000);
    assert_eq!(settings.dashboard_route, "/dashboard");
    assert!(settings.upload_on_disconnect);
    assert!(!settings.auto_start);
}

#[test]
fn config_defaults_are_complete() {
    let cfg = Config::default();

    assert_eq!(cfg.service.name, "avatar-session");
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.service.http.port, 8090);
    assert_eq!(cfg.backend.token_path, "/api/get-access-token");
    assert_eq!(cfg.backend.upload_path, "/api/upload");
}
