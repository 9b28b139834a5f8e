//! Aging-preview image generation (OpenAI-compatible images endpoint).
//!
//! Previews are optional: the analysis flow drops them on any error.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const IMAGES_API_URL: &str = "https://api.openai.com/v1/images/generations";
pub const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Image API returned no image")]
    EmptyResult,
}

#[async_trait]
pub trait PreviewGenerator: Send + Sync {
    /// Generates one image for `prompt` and returns its hosted URL.
    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

impl ImageResponse {
    fn first_url(self) -> Result<String, ImageGenError> {
        self.data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(ImageGenError::EmptyResult)
    }
}

#[derive(Clone)]
pub struct ImageGenClient {
    client: Client,
    api_key: String,
}

impl ImageGenClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(90))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl PreviewGenerator for ImageGenClient {
    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        let response = self
            .client
            .post(IMAGES_API_URL)
            .bearer_auth(&self.api_key)
            .json(&ImageRequest {
                model: IMAGE_MODEL,
                prompt,
                n: 1,
                size: IMAGE_SIZE,
                response_format: "url",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let url = response.json::<ImageResponse>().await?.first_url()?;
        debug!("Generated preview image ({IMAGE_MODEL})");
        Ok(url)
    }
}
