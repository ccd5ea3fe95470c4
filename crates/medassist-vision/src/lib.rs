//! medassist-vision
//!
//! Captions uploaded medical images through the Hugging Face Inference API
//! (BLIP by default). The caption is plain text that the query assembler
//! folds into the prompt; no image understanding happens in-process.

pub mod error;

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::VisionError;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

pub const DEFAULT_MODEL: &str = "Salesforce/blip-image-captioning-base";

#[derive(Clone)]
pub struct CaptionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl CaptionConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.model)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for CaptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionConfig")
            .field("api_key", &self.api_key().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

/// The API answers with either a list of generations or a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptionResponse {
    Many(Vec<Generated>),
    One(Generated),
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

pub struct ImageCaptioner {
    client: reqwest::Client,
    config: CaptionConfig,
}

impl ImageCaptioner {
    pub fn new(config: CaptionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Produce a caption for the raw image bytes.
    pub async fn caption(
        &self,
        image: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, VisionError> {
        let api_key = self.config.api_key().ok_or(VisionError::MissingApiKey)?;
        if image.is_empty() {
            return Err(VisionError::EmptyImage);
        }

        info!(model = %self.config.model, bytes = image.len(), "requesting image caption");

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .header(
                reqwest::header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(image)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(VisionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        parse_caption(&body)
    }
}

fn parse_caption(body: &str) -> Result<String, VisionError> {
    let parsed: CaptionResponse =
        serde_json::from_str(body).map_err(|e| VisionError::ResponseParse(e.to_string()))?;

    let text = match parsed {
        CaptionResponse::Many(list) => list.into_iter().next().map(|g| g.generated_text),
        CaptionResponse::One(g) => Some(g.generated_text),
    };

    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| VisionError::ResponseParse("no caption in response".to_string()))
}

/// File extension used when storing an uploaded image.
pub fn image_extension(content_type: Option<&str>, filename: Option<&str>) -> &'static str {
    let from_name = filename
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match (content_type, from_name.as_deref()) {
        (Some("image/png"), _) | (_, Some("png")) => "png",
        (Some("image/gif"), _) | (_, Some("gif")) => "gif",
        (Some("image/webp"), _) | (_, Some("webp")) => "webp",
        (Some("image/bmp"), _) | (_, Some("bmp")) => "bmp",
        _ => "jpg",
    }
}
