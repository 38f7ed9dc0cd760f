//! Reqwest-backed chat-completion transcriber.
//!
//! This adapter owns transport details only: building the multimodal request,
//! bearer authentication, HTTP error mapping, and decoding the first choice.
//! It never retries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{ChatRequestDto, ChatResponseDto};
use crate::domain::ports::{Transcriber, TranscriberError};

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
/// Instruction sent alongside every image.
pub const TRANSCRIPTION_PROMPT: &str = "Transcribe this image of notes into clean Markdown. \
    Use headers, bullet points, and code blocks to match the visual structure.";

const FALLBACK_MIME: &str = "application/octet-stream";

/// Errors raised while constructing the transcriber.
#[derive(Debug, thiserror::Error)]
pub enum TranscriberSetupError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL cannot carry a `chat/completions` path.
    #[error("invalid transcription base URL {base_url}: {message}")]
    BaseUrl {
        /// Rejected URL.
        base_url: String,
        /// Reason.
        message: String,
    },
}

/// Connection settings for [`ChatCompletionTranscriber`].
#[derive(Clone)]
pub struct TranscriberConfig {
    api_key: Option<Zeroizing<String>>,
    base_url: Url,
    model: String,
    timeout: Option<Duration>,
}

impl TranscriberConfig {
    /// Settings for the provider at `base_url`, using [`DEFAULT_MODEL`], no
    /// credential, and no request timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            api_key: None,
            base_url,
            model: DEFAULT_MODEL.to_owned(),
            timeout: None,
        }
    }

    /// Bearer credential. Blank keys count as absent.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .map(Zeroizing::new);
        self
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whole-request timeout; `None` leaves requests unbounded.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a credential is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for TranscriberConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriberConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Transcriber posting images to `<base_url>/chat/completions`.
pub struct ChatCompletionTranscriber {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: Option<Zeroizing<String>>,
}

impl ChatCompletionTranscriber {
    /// Build a transcriber from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// base URL cannot be extended with `chat/completions`.
    pub fn new(config: TranscriberConfig) -> Result<Self, TranscriberSetupError> {
        let endpoint = completions_endpoint(&config.base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            endpoint,
            model: config.model,
            api_key: config.api_key,
        })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn completions_endpoint(base_url: &Url) -> Result<Url, TranscriberSetupError> {
    let invalid = |message: String| TranscriberSetupError::BaseUrl {
        base_url: base_url.to_string(),
        message,
    };
    if base_url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_owned()));
    }
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
        .map_err(|err| invalid(err.to_string()))
}

fn image_data_url(image_bytes: &[u8]) -> String {
    let mime = image::guess_format(image_bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{mime};base64,{}", STANDARD.encode(image_bytes))
}

#[async_trait]
impl Transcriber for ChatCompletionTranscriber {
    async fn transcribe(&self, image_bytes: &[u8]) -> Result<String, TranscriberError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(TranscriberError::missing_credential)?;

        let request =
            ChatRequestDto::with_image(&self.model, TRANSCRIPTION_PROMPT, image_data_url(image_bytes));
        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            image_bytes = image_bytes.len(),
            "requesting transcription"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            warn!(status = status.as_u16(), %error, "transcription provider rejected request");
            return Err(error);
        }

        parse_markdown(body.as_ref())
    }
}

fn parse_markdown(body: &[u8]) -> Result<String, TranscriberError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        TranscriberError::decode(format!("invalid chat completion JSON: {error}"))
    })?;
    decoded
        .into_first_content()
        .ok_or_else(TranscriberError::empty_choices)
}

fn map_transport_error(error: reqwest::Error) -> TranscriberError {
    if error.is_timeout() {
        TranscriberError::timeout(error.to_string())
    } else {
        TranscriberError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TranscriberError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TranscriberError::timeout(format!("status {}: {preview}", status.as_u16()))
        }
        _ => TranscriberError::api(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
