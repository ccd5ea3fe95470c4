//! medassist-transcribe
//!
//! Speech-to-text for voice queries via Amazon Transcribe. The uploaded
//! audio is staged in the bucket, a job is started against it, and the
//! transcript JSON the job writes back is read and removed again.

pub mod error;

pub use aws_sdk_transcribe::types::MediaFormat;

use std::time::Duration;

use aws_sdk_transcribe::types::{LanguageCode, Media, TranscriptionJobStatus};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use medassist_core::s3_keys;

use crate::error::TranscribeError;

/// Polling schedule for a transcription job.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 40,
        }
    }
}

/// Stage `audio` in S3 and transcribe it. The staged object is deleted
/// whether or not transcription succeeds.
pub async fn transcribe_upload(
    config: &aws_config::SdkConfig,
    bucket: &str,
    audio: Vec<u8>,
    ext: &str,
    schedule: PollSchedule,
) -> Result<String, TranscribeError> {
    if audio.is_empty() {
        return Err(TranscribeError::EmptyAudio);
    }
    let ext = ext.to_ascii_lowercase();
    let media_format = media_format_for_extension(&ext)
        .ok_or_else(|| TranscribeError::UnsupportedFormat(ext.clone()))?;

    let s3 = aws_sdk_s3::Client::new(config);
    let audio_key = s3_keys::audio_upload(Uuid::new_v4(), &ext);

    s3.put_object()
        .bucket(bucket)
        .key(&audio_key)
        .body(audio.into())
        .send()
        .await
        .map_err(|e| TranscribeError::Upload(e.into_service_error().to_string()))?;

    let result = transcribe_audio(config, bucket, &audio_key, media_format, schedule).await;

    if let Err(e) = s3.delete_object().bucket(bucket).key(&audio_key).send().await {
        warn!(audio_key, error = %e, "failed to remove staged audio");
    }

    result
}

/// Transcribe an audio file already uploaded to S3.
pub async fn transcribe_audio(
    config: &aws_config::SdkConfig,
    bucket: &str,
    audio_key: &str,
    media_format: MediaFormat,
    schedule: PollSchedule,
) -> Result<String, TranscribeError> {
    let transcribe = aws_sdk_transcribe::Client::new(config);
    let s3 = aws_sdk_s3::Client::new(config);

    let job_name = format!("medassist-{}", Uuid::new_v4());
    let s3_uri = format!("s3://{bucket}/{audio_key}");
    let output_key = s3_keys::transcript_output(&job_name);

    info!(job_name, s3_uri, "starting transcription job");

    transcribe
        .start_transcription_job()
        .transcription_job_name(&job_name)
        .media(Media::builder().media_file_uri(&s3_uri).build())
        .media_format(media_format)
        .language_code(LanguageCode::EnUs)
        .output_bucket_name(bucket)
        .output_key(&output_key)
        .send()
        .await
        .map_err(|e| TranscribeError::Api(e.into_service_error().to_string()))?;

    let outcome = wait_for_job(&transcribe, &job_name, schedule).await;

    let text = match outcome {
        Ok(()) => read_transcript(&s3, bucket, &output_key).await,
        Err(e) => Err(e),
    };

    let _ = s3
        .delete_object()
        .bucket(bucket)
        .key(&output_key)
        .send()
        .await;
    let _ = transcribe
        .delete_transcription_job()
        .transcription_job_name(&job_name)
        .send()
        .await;

    text
}

async fn wait_for_job(
    transcribe: &aws_sdk_transcribe::Client,
    job_name: &str,
    schedule: PollSchedule,
) -> Result<(), TranscribeError> {
    for _ in 0..schedule.max_attempts {
        tokio::time::sleep(schedule.interval).await;

        let resp = transcribe
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| TranscribeError::Api(e.into_service_error().to_string()))?;

        let job = resp
            .transcription_job()
            .ok_or_else(|| TranscribeError::Api("no job in response".into()))?;

        match job.transcription_job_status() {
            Some(TranscriptionJobStatus::Completed) => {
                info!(job_name, "transcription complete");
                return Ok(());
            }
            Some(TranscriptionJobStatus::Failed) => {
                let reason = job.failure_reason().unwrap_or("unknown").to_string();
                return Err(TranscribeError::JobFailed(reason));
            }
            _ => continue,
        }
    }

    Err(TranscribeError::TimedOut {
        job_name: job_name.to_string(),
        attempts: schedule.max_attempts,
    })
}

async fn read_transcript(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    output_key: &str,
) -> Result<String, TranscribeError> {
    let resp = s3
        .get_object()
        .bucket(bucket)
        .key(output_key)
        .send()
        .await
        .map_err(|e| TranscribeError::Api(format!("failed to read transcript from S3: {e}")))?;

    let body = resp
        .body
        .collect()
        .await
        .map_err(|e| TranscribeError::Api(format!("failed to read transcript body: {e}")))?;

    extract_transcript_text(&body.into_bytes())
}

#[derive(Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extract plain text from the job output.
///
/// ```json
/// { "results": { "transcripts": [{ "transcript": "the text..." }] } }
/// ```
fn extract_transcript_text(json: &[u8]) -> Result<String, TranscribeError> {
    let doc: TranscriptDocument =
        serde_json::from_slice(json).map_err(|e| TranscribeError::Parse(e.to_string()))?;

    Ok(doc
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|t| t.transcript.trim().to_string())
        .unwrap_or_default())
}

/// Map a file extension to an Amazon Transcribe `MediaFormat`.
pub fn media_format_for_extension(ext: &str) -> Option<MediaFormat> {
    match ext.to_lowercase().as_str() {
        "mp3" => Some(MediaFormat::Mp3),
        "mp4" | "m4a" => Some(MediaFormat::Mp4),
        "wav" => Some(MediaFormat::Wav),
        "flac" => Some(MediaFormat::Flac),
        "ogg" => Some(MediaFormat::Ogg),
        "amr" => Some(MediaFormat::Amr),
        "webm" => Some(MediaFormat::Webm),
        _ => None,
    }
}

/// Pick the extension for an audio upload from its content type, falling
/// back to the file name.
pub fn audio_extension(content_type: Option<&str>, filename: Option<&str>) -> Option<String> {
    let from_type = match content_type {
        Some("audio/mpeg" | "audio/mp3") => Some("mp3"),
        Some("audio/wav" | "audio/x-wav" | "audio/wave") => Some("wav"),
        Some("audio/flac" | "audio/x-flac") => Some("flac"),
        Some("audio/ogg") => Some("ogg"),
        Some("audio/webm") => Some("webm"),
        Some("audio/mp4" | "audio/x-m4a") => Some("m4a"),
        Some("audio/amr") => Some("amr"),
        _ => None,
    };

    from_type.map(str::to_string).or_else(|| {
        filename
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| media_format_for_extension(ext).is_some())
    })
}
