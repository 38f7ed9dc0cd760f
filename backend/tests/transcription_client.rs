//! Integration tests for `ChatCompletionTranscriber` against an in-process
//! OpenAI-compatible provider.

use std::time::Duration;

use bookmd::domain::ports::{Transcriber, TranscriberError};
use bookmd::outbound::transcription::{
    ChatCompletionTranscriber, TRANSCRIPTION_PROMPT, TranscriberConfig,
};
use rstest::rstest;
use serde_json::json;
use url::Url;

mod support;

use support::{FakeProvider, completion, no_choices};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

fn transcriber(base_url: Url, api_key: Option<&str>) -> ChatCompletionTranscriber {
    ChatCompletionTranscriber::new(
        TranscriberConfig::new(base_url)
            .with_api_key(api_key.map(str::to_owned))
            .with_model("test-model")
            .with_timeout(Some(Duration::from_secs(10))),
    )
    .expect("transcriber builds")
}

#[rstest]
#[actix_web::test]
async fn sends_prompt_image_and_bearer_token() {
    let provider = FakeProvider::start(200, completion("# Groceries\n- milk"));
    let client = transcriber(provider.base_url(), Some("sk-test"));

    let markdown = client
        .transcribe(PNG_BYTES)
        .await
        .expect("transcription succeeds");

    assert_eq!(markdown, "# Groceries\n- milk");
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request.body["model"], "test-model");
    let content = &request.body["messages"][0]["content"];
    assert_eq!(request.body["messages"][0]["role"], "user");
    assert_eq!(content[0], json!({"type": "text", "text": TRANSCRIPTION_PROMPT}));
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(
        content[1]["image_url"]["url"],
        "data:image/png;base64,iVBORw0KGgoAAA=="
    );
    provider.stop().await;
}

#[rstest]
#[actix_web::test]
async fn unknown_content_is_sent_as_octet_stream() {
    let provider = FakeProvider::start(200, completion("text"));
    let client = transcriber(provider.base_url(), Some("sk-test"));

    client
        .transcribe(b"not an image")
        .await
        .expect("transcription succeeds");

    let url = provider.requests()[0].body["messages"][0]["content"][1]["image_url"]["url"]
        .as_str()
        .map(str::to_owned)
        .expect("url is a string");
    assert!(url.starts_with("data:application/octet-stream;base64,"));
    provider.stop().await;
}

#[rstest]
#[actix_web::test]
async fn null_content_is_an_empty_transcription() {
    let reply = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
    let provider = FakeProvider::start(200, reply);
    let client = transcriber(provider.base_url(), Some("sk-test"));

    let markdown = client.transcribe(PNG_BYTES).await.expect("succeeds");

    assert_eq!(markdown, "");
    provider.stop().await;
}

#[rstest]
#[actix_web::test]
async fn zero_choices_is_a_distinct_failure() {
    let provider = FakeProvider::start(200, no_choices());
    let client = transcriber(provider.base_url(), Some("sk-test"));

    let err = client.transcribe(PNG_BYTES).await.expect_err("no choices");

    assert!(matches!(err, TranscriberError::EmptyChoices));
    provider.stop().await;
}

#[rstest]
#[case(401, false)]
#[case(500, false)]
#[case(504, true)]
#[actix_web::test]
async fn error_statuses_are_reported(#[case] status: u16, #[case] is_timeout: bool) {
    let provider = FakeProvider::start(status, json!({"error": {"message": "nope"}}));
    let client = transcriber(provider.base_url(), Some("sk-test"));

    let err = client.transcribe(PNG_BYTES).await.expect_err("error status");

    if is_timeout {
        assert!(matches!(err, TranscriberError::Timeout { .. }), "got {err:?}");
    } else {
        match err {
            TranscriberError::Api {
                status: reported,
                message,
            } => {
                assert_eq!(reported, status);
                assert!(message.contains("nope"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
    provider.stop().await;
}

#[rstest]
#[actix_web::test]
async fn missing_credential_fails_without_a_request() {
    let provider = FakeProvider::start(200, completion("unused"));
    let client = transcriber(provider.base_url(), None);

    let err = client.transcribe(PNG_BYTES).await.expect_err("no key");

    assert!(matches!(err, TranscriberError::MissingCredential));
    assert!(provider.requests().is_empty());
    provider.stop().await;
}

#[rstest]
#[actix_web::test]
async fn unreachable_provider_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}/v1/")).expect("url");
    let client = transcriber(base_url, Some("sk-test"));

    let err = client.transcribe(PNG_BYTES).await.expect_err("connection refused");

    assert!(matches!(err, TranscriberError::Transport { .. }), "got {err:?}");
}
