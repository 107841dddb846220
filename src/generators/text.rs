//! Quote generation over a chat-completions API.

use super::{
    Credential, GenerationError, PhraseRequest, TextGenerator, build_http_client, upstream_error,
};
use crate::config::TextConfig;
use crate::types::Theme;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// The instruction sent as the single user message.
pub fn build_instruction(theme: Theme, topic: &str, max_words: u32) -> String {
    format!(
        "Write a short {} greeting phrase related to {}, under {} words.",
        theme.greeting(),
        topic.trim(),
        max_words
    )
}

/// Trim whitespace and one layer of matching surrounding quotation marks.
///
/// Quotes inside the phrase are left alone.
pub fn clean_phrase(raw: &str) -> String {
    const PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

    let trimmed = raw.trim();
    for (open, close) in PAIRS {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// [`TextGenerator`] backed by a chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatTextGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_words: u32,
    credential: Credential,
}

impl ChatTextGenerator {
    pub fn from_config(config: &TextConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_http_client(config.request_timeout_secs)?,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_words: config.max_words,
            credential: Credential::FromEnv(config.api_key_env.clone()),
        })
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TextGenerator for ChatTextGenerator {
    async fn generate_phrase(&self, request: &PhraseRequest) -> Result<String, GenerationError> {
        let api_key = self.credential.resolve()?;
        let instruction = build_instruction(request.theme, &request.topic, self.max_words);
        let body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: &instruction,
            }],
            model: &self.model,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting phrase");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Malformed(format!("invalid completion JSON: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Malformed("no choices in completion".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let phrase = clean_phrase(&content);
        if phrase.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(phrase)
    }
}
