//! Port for converting an image of notes into Markdown.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by transcription adapters.
    pub enum TranscriberError {
        /// No API credential is configured; no request was attempted.
        MissingCredential =>
            "transcription API key is not configured",
        /// The request could not be sent or the connection failed.
        Transport { message: String } =>
            "transcription transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "transcription request timed out: {message}",
        /// The provider answered with a non-success status.
        Api { status: u16, message: String } =>
            "transcription provider returned status {status}: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } =>
            "transcription response could not be decoded: {message}",
        /// The provider answered without any choices.
        EmptyChoices =>
            "transcription provider returned no choices",
    }
}

/// Port for image-to-Markdown transcription.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the image in `image_bytes` into Markdown.
    ///
    /// An empty string is a valid transcription; a response without choices
    /// is [`TranscriberError::EmptyChoices`].
    async fn transcribe(&self, image_bytes: &[u8]) -> Result<String, TranscriberError>;
}

/// Fixture transcriber returning the same Markdown for every image.
#[derive(Debug, Clone)]
pub struct FixtureTranscriber {
    markdown: String,
}

impl FixtureTranscriber {
    /// Fixture answering every request with `markdown`.
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }
}

impl Default for FixtureTranscriber {
    fn default() -> Self {
        Self::new("# Notes")
    }
}

#[async_trait]
impl Transcriber for FixtureTranscriber {
    async fn transcribe(&self, _image_bytes: &[u8]) -> Result<String, TranscriberError> {
        Ok(self.markdown.clone())
    }
}
