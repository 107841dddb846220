//! Background generation over a text-to-image API.
//!
//! The endpoint takes `{"prompt": ...}` and answers with the encoded image as
//! the response body. A batch of N candidates is N independent requests joined
//! all-or-nothing.

use super::{
    Credential, GenerationError, ImageGenerator, build_http_client, upstream_error,
};
use crate::config::ImageConfig;
use crate::handle::{ImageHandle, ImageKind};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

/// Request `count` images for `prompt` concurrently.
///
/// Handles come back in request order. If any request fails the whole batch
/// fails and the images already received are dropped.
pub async fn generate_batch(
    generator: &dyn ImageGenerator,
    prompt: &str,
    count: usize,
) -> Result<Vec<ImageHandle>, GenerationError> {
    let requests = (0..count.max(1)).map(|_| generator.generate_image(prompt));
    try_join_all(requests).await
}

/// [`ImageGenerator`] backed by a text-to-image endpoint returning raw bytes.
#[derive(Debug, Clone)]
pub struct HttpImageGenerator {
    client: reqwest::Client,
    endpoint: String,
    credential: Credential,
}

impl HttpImageGenerator {
    pub fn from_config(config: &ImageConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_http_client(config.request_timeout_secs)?,
            endpoint: config.endpoint.clone(),
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
impl ImageGenerator for HttpImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<ImageHandle, GenerationError> {
        let api_key = self.credential.resolve()?;

        debug!(endpoint = %self.endpoint, "requesting image");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header(ACCEPT, "image/jpeg")
            .json(&ImageRequest { prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        let kind = ImageKind::sniff(&bytes).ok_or_else(|| {
            GenerationError::Malformed("response body is not a supported image".to_string())
        })?;
        debug!(bytes = bytes.len(), %kind, "image received");
        Ok(ImageHandle::new(kind, bytes.to_vec()))
    }
}
