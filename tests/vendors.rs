//! Vendor adapters against mocked HTTP endpoints.

use book_reels::api::creatomate::CreatomateRenderer;
use book_reels::api::elevenlabs::ElevenLabsTts;
use book_reels::api::huggingface::HuggingFaceSummarizer;
use book_reels::api::openai::OpenAiSummarizer;
use book_reels::api::{SpeechSynthesizer, Summarizer};
use book_reels::config::Config;
use book_reels::PipelineError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RENDER_ID: &str = "3f1c2b6a-9d4e-4c7b-8a2f-0e5d6c7b8a9f";

fn config(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.openai_key = "sk-test".into();
    cfg.openai_base = server.uri();
    cfg.hf_base = server.uri();
    cfg.hf_api_token = "hf-test".into();
    cfg.elevenlabs_key = "xi-test".into();
    cfg.elevenlabs_base = server.uri();
    cfg.eleven_voice_ids = vec!["voice123".into()];
    cfg.creatomate_api_key = "cm-test".into();
    cfg.creatomate_base = server.uri();
    cfg.creatomate_poll_secs = 0;
    cfg.creatomate_max_wait_secs = 5;
    cfg
}

#[tokio::test]
async fn openai_summary_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "Tiny habits add up."}]}]
        })))
        .mount(&server)
        .await;

    let summarizer = OpenAiSummarizer::new(reqwest::Client::new(), &config(&server));
    let summary = summarizer.summarize("A book about habits.").await.unwrap();
    assert_eq!(summary, "Tiny habits add up.");
}

#[tokio::test]
async fn openai_http_error_is_summarization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let summarizer = OpenAiSummarizer::new(reqwest::Client::new(), &config(&server));
    let err = summarizer.summarize("text").await.unwrap_err();
    assert!(matches!(err, PipelineError::Summarization(msg) if msg.contains("429")));
}

#[tokio::test]
async fn huggingface_sends_adaptive_length() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/facebook/bart-large-cnn"))
        .and(body_partial_json(json!({"parameters": {"max_length": 20, "min_length": 10, "do_sample": false}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"summary_text": "Short."}])))
        .mount(&server)
        .await;

    let summarizer = HuggingFaceSummarizer::new(reqwest::Client::new(), &config(&server));
    assert_eq!(summarizer.summarize("only a few words").await.unwrap(), "Short.");
}

#[tokio::test]
async fn elevenlabs_writes_mp3() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice123"))
        .and(header("xi-api-key", "xi-test"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&server);
    cfg.voices_dir = dir.path().join("voices");

    let tts = ElevenLabsTts::new(reqwest::Client::new(), &cfg);
    let audio = tts.synthesize("Title: X", "Atomic_Habits").await.unwrap();
    assert_eq!(audio.path, dir.path().join("voices/Atomic_Habits.mp3"));
    assert_eq!(std::fs::read(&audio.path).unwrap(), b"ID3fake-mp3");
}

#[tokio::test]
async fn elevenlabs_failure_is_synthesis_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&server);
    cfg.voices_dir = dir.path().to_path_buf();
    let tts = ElevenLabsTts::new(reqwest::Client::new(), &cfg);
    assert!(matches!(
        tts.synthesize("x", "stem").await,
        Err(PipelineError::Synthesis(_))
    ));
}

#[tokio::test]
async fn creatomate_accepts_array_and_polls_until_finished() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/renders"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!([{"id": RENDER_ID, "status": "planned"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/renders/{RENDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": RENDER_ID, "status": "rendering"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/renders/{RENDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": RENDER_ID,
            "status": "finished",
            "url": "https://cdn.example.com/reel.mp4"
        })))
        .mount(&server)
        .await;

    let renderer = CreatomateRenderer::new(reqwest::Client::new(), &config(&server));
    let id = renderer.start_render("Title: X", 30.0).await.unwrap();
    assert_eq!(id, RENDER_ID);
    let url = renderer.poll_render(&id).await.unwrap();
    assert_eq!(url, "https://cdn.example.com/reel.mp4");
}

#[tokio::test]
async fn creatomate_failed_render_stops_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/renders/{RENDER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": RENDER_ID,
            "status": "failed",
            "error_message": "template error"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let renderer = CreatomateRenderer::new(reqwest::Client::new(), &config(&server));
    let err = renderer.poll_render(RENDER_ID).await.unwrap_err();
    assert!(matches!(err, PipelineError::Render(msg) if msg.contains("template error")));
}

#[tokio::test]
async fn creatomate_rejects_malformed_render_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/renders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
        .mount(&server)
        .await;

    let renderer = CreatomateRenderer::new(reqwest::Client::new(), &config(&server));
    assert!(matches!(
        renderer.start_render("x", 10.0).await,
        Err(PipelineError::Render(_))
    ));
}
