//! Transcription adapters.
//!
//! This module provides an HTTP implementation of the `Transcriber` port
//! against OpenAI-compatible chat-completion endpoints.

mod dto;
mod http_transcriber;

pub use http_transcriber::{
    ChatCompletionTranscriber, DEFAULT_BASE_URL, DEFAULT_MODEL, TRANSCRIPTION_PROMPT,
    TranscriberConfig, TranscriberSetupError,
};
