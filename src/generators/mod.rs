//! Remote generator clients: quote text and background images.
//!
//! | Generator | Trait | HTTP client | Response |
//! |---|---|---|---|
//! | Quote | [`TextGenerator`] | [`ChatTextGenerator`] | JSON, `choices[0].message.content` |
//! | Background | [`ImageGenerator`] | [`HttpImageGenerator`] | raw image bytes |
//!
//! The traits are the seam the controller depends on; tests substitute
//! canned implementations. Every call is a single outbound request with no
//! retry. Failures come back as [`GenerationError`].

pub mod image;
pub mod text;

pub use self::image::{HttpImageGenerator, generate_batch};
pub use self::text::{ChatTextGenerator, build_instruction, clean_phrase};

use crate::handle::ImageHandle;
use crate::types::Theme;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key: set the {var} environment variable")]
    MissingCredential { var: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Generation service returned {status}: {reason}")]
    Upstream { status: u16, reason: String },
    #[error("Unexpected response from generation service: {0}")]
    Malformed(String),
    #[error("Generation service returned an empty result")]
    EmptyResponse,
}

/// What the quote generator is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRequest {
    pub theme: Theme,
    /// User-supplied subject, e.g. "coffee and sunrise".
    pub topic: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce one short phrase, already cleaned of surrounding quotes.
    async fn generate_phrase(&self, request: &PhraseRequest) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce one image for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<ImageHandle, GenerationError>;
}

/// Where a client gets its bearer token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Read from this environment variable on every request.
    FromEnv(String),
    /// Fixed key supplied by the caller.
    Key(String),
}

impl Credential {
    pub fn resolve(&self) -> Result<String, GenerationError> {
        match self {
            Credential::Key(key) => Ok(key.clone()),
            Credential::FromEnv(var) => crate::config::credential_from_env(var)
                .ok_or_else(|| GenerationError::MissingCredential { var: var.clone() }),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::FromEnv(var) => f.debug_tuple("FromEnv").field(var).finish(),
            Credential::Key(_) => f.write_str("Key(<redacted>)"),
        }
    }
}

/// Shared HTTP client construction for both generators.
pub(crate) fn build_http_client(
    timeout_secs: Option<u64>,
) -> Result<reqwest::Client, GenerationError> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("shubhkaman/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Turn a non-success response into [`GenerationError::Upstream`].
pub(crate) async fn upstream_error(response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let reason = if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.chars().take(200).collect()
    };
    GenerationError::Upstream {
        status: status.as_u16(),
        reason,
    }
}
