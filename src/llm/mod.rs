//! Completion service abstractions.
//!
//! This module defines the seam between the relay and the remote
//! text-generation backend. The relay only ever needs one operation: given
//! an ordered transcript, produce the next assistant turn.
//!
//! # Overview
//!
//! The [`CompletionService`] trait is that single operation. The stock
//! implementation is [`ChatCompletionsClient`], which speaks the `OpenAI`
//! Chat Completions protocol (`/v1/chat/completions`) without streaming;
//! the relay delivers whole replies, so token-by-token delivery buys
//! nothing here.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_relay::llm::{ChatCompletionsClient, CompletionSettings};
//!
//! let client = ChatCompletionsClient::new(CompletionSettings {
//!     base_url: "https://api.openai.com".to_string(),
//!     api_key: Some("sk-...".to_string()),
//!     model: "gpt-4o-mini".to_string(),
//! });
//! ```

pub mod chat_completions;

pub use chat_completions::ChatCompletionsClient;

use std::fmt;

use crate::history::Turn;

/// Connection and model settings for the completion backend.
#[derive(Clone)]
pub struct CompletionSettings {
    /// Base URL for the backend API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of Debug output.
        f.debug_struct("CompletionSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .finish()
    }
}

/// Produces the next assistant turn for a transcript.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync + std::fmt::Debug {
    /// Generate a reply to the latest user turn in `turns`.
    ///
    /// `identity` is carried for logging only and must not influence the
    /// generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or its response cannot be
    /// interpreted.
    async fn generate(&self, identity: &str, turns: &[Turn]) -> anyhow::Result<String>;
}
