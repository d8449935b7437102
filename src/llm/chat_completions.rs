//! `OpenAI`-compatible Chat Completions client.
//!
//! This module implements [`CompletionService`] against the Chat Completions
//! API (`/v1/chat/completions`), requesting whole replies rather than
//! streamed deltas.

use anyhow::Context;

use crate::history::Turn;

use super::{CompletionService, CompletionSettings};

/// Client for an `OpenAI`-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: CompletionSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a new client with the given settings.
    #[must_use]
    pub fn new(settings: CompletionSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl CompletionService for ChatCompletionsClient {
    async fn generate(&self, identity: &str, turns: &[Turn]) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": wire_messages(turns),
        });

        tracing::debug!(
            identity = %identity,
            turns = turns.len(),
            model = %self.settings.model,
            "Requesting completion"
        );

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp = rb.send().await?.error_for_status()?;
        let v: serde_json::Value = resp.json().await?;

        let text = v["choices"][0]["message"]["content"]
            .as_str()
            .context("completion response carried no message content")?;
        Ok(text.to_string())
    }
}

/// Map transcript turns onto the `{role, content}` wire shape.
fn wire_messages(turns: &[Turn]) -> Vec<serde_json::Value> {
    turns
        .iter()
        .map(|turn| serde_json::json!({ "role": turn.speaker, "content": turn.text }))
        .collect()
}
