//! Multi-modal query assembly.
//!
//! A request can carry typed text, a transcript of recorded speech, and a
//! caption of an uploaded image. They are merged into the single query string
//! sent to the completion model.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const IMAGE_CLAUSE: &str = "\n\nThe medical image shows: ";
pub const IMAGE_ONLY_PREFIX: &str = "Please analyze this medical image: ";

/// The inputs available for one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryInputs {
    pub text: Option<String>,
    pub transcript: Option<String>,
    pub image_caption: Option<String>,
}

impl QueryInputs {
    /// Whether a transcript would be used if one were produced. Callers use
    /// this to skip the speech-to-text call when typed text is present.
    pub fn needs_transcript(&self) -> bool {
        non_blank(self.text.as_deref()).is_none()
    }

    pub fn assemble(&self) -> Result<String, CoreError> {
        assemble_query(
            self.text.as_deref(),
            self.transcript.as_deref(),
            self.image_caption.as_deref(),
        )
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Merge typed text, transcript and image caption into one query.
///
/// Typed text wins over the transcript; the caption is appended to whichever
/// primary input was chosen. With only a caption, the query asks for an
/// analysis of the image. Blank strings count as absent.
pub fn assemble_query(
    text: Option<&str>,
    transcript: Option<&str>,
    image_caption: Option<&str>,
) -> Result<String, CoreError> {
    let primary = non_blank(text).or_else(|| non_blank(transcript));
    let caption = non_blank(image_caption);

    match (primary, caption) {
        (Some(primary), Some(caption)) => Ok(format!("{primary}{IMAGE_CLAUSE}{caption}")),
        (Some(primary), None) => Ok(primary.to_string()),
        (None, Some(caption)) => Ok(format!("{IMAGE_ONLY_PREFIX}{caption}")),
        (None, None) => Err(CoreError::EmptyQuery),
    }
}
