use std::path::Path;
use std::time::Duration;

use agentdesk::tools::{SpeechClient, SpeechConfig, ToolError};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, output_dir: &Path) -> SpeechConfig {
    SpeechConfig {
        url: Url::parse(&format!("{}/openai/v1/audio/speech", server.uri())).unwrap(),
        api_key: Some("speech-key".to_string()),
        model: "gpt-4o-mini-tts".to_string(),
        voice: "alloy".to_string(),
        format: "wav".to_string(),
        timeout: Duration::from_secs(5),
        output_dir: output_dir.to_path_buf(),
    }
}

#[tokio::test]
async fn narration_is_saved_to_disk() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/openai/v1/audio/speech"))
        .and(header("api-key", "speech-key"))
        .and(body_json(json!({
            "model": "gpt-4o-mini-tts",
            "voice": "alloy",
            "input": "TL;DR: revenue is up",
            "response_format": "wav"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFfake".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SpeechClient::new(config(&server, dir.path())).unwrap();
    let payload = client.narrate("TL;DR: revenue is up").await.unwrap();

    assert_eq!(payload["source"], "gpt-4o-mini-tts");
    let audio = Path::new(payload["audio"].as_str().unwrap());
    assert!(audio
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("narration_"));
    assert_eq!(audio.extension().unwrap(), "wav");
    assert_eq!(std::fs::read(audio).unwrap(), b"RIFFfake");
}

#[tokio::test]
async fn service_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/openai/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = SpeechClient::new(config(&server, dir.path())).unwrap();
    let err = client.narrate("hi").await.unwrap_err();

    assert_eq!(
        err.payload(),
        json!({ "error": "speech_failed", "status": 429, "body": "slow down" })
    );
}

#[tokio::test]
async fn missing_key_makes_no_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config(&server, dir.path());
    cfg.api_key = None;
    let client = SpeechClient::new(cfg).unwrap();

    assert_eq!(client.narrate("hi").await.unwrap_err(), ToolError::NoApiKeyForSpeech);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
