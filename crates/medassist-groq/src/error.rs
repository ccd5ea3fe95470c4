use thiserror::Error;

pub const MISSING_API_KEY_MESSAGE: &str = "AI Error: Missing API key!";

pub const UNKNOWN_UPSTREAM_MESSAGE: &str = "AI Error: Unknown error";

pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while processing your medical request.";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("completion API key is not configured")]
    MissingApiKey,

    #[error("completion API returned status {status}")]
    Upstream { status: u16, message: Option<String> },

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),
}

/// Coarse classification of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing was sent; the dispatcher is not configured to make the call.
    Configuration,
    /// The completion service answered with a non-success status.
    Upstream,
    /// The call could not be completed or its answer could not be read.
    Internal,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MissingApiKey => ErrorKind::Configuration,
            DispatchError::Upstream { .. } => ErrorKind::Upstream,
            DispatchError::Transport(_) | DispatchError::ResponseParse(_) => ErrorKind::Internal,
        }
    }

    /// The string shown to the user in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::MissingApiKey => MISSING_API_KEY_MESSAGE.to_string(),
            DispatchError::Upstream {
                message: Some(message),
                ..
            } => format!("AI Error: {message}"),
            DispatchError::Upstream { message: None, .. } => UNKNOWN_UPSTREAM_MESSAGE.to_string(),
            DispatchError::Transport(_) | DispatchError::ResponseParse(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_embedded() {
        let err = DispatchError::Upstream {
            status: 429,
            message: Some("Rate limit reached".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.user_message(), "AI Error: Rate limit reached");
    }

    #[test]
    fn parse_failures_are_generic() {
        let err = DispatchError::ResponseParse("no choices".into());
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
