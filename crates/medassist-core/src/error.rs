use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no valid input provided: send text, voice, or an image")]
    EmptyQuery,

    #[error("invalid uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
