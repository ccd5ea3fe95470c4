use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("image captioning is not configured")]
    MissingApiKey,

    #[error("image is empty")]
    EmptyImage,

    #[error("captioning API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("captioning request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse caption response: {0}")]
    ResponseParse(String),
}
