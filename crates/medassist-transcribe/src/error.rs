use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio upload is empty")]
    EmptyAudio,

    #[error("failed to stage audio in S3: {0}")]
    Upload(String),

    #[error("transcription job failed: {0}")]
    JobFailed(String),

    #[error("transcription job {job_name} did not finish after {attempts} polls")]
    TimedOut { job_name: String, attempts: u32 },

    #[error("transcription API error: {0}")]
    Api(String),

    #[error("failed to parse transcript: {0}")]
    Parse(String),
}
