use std::sync::Arc;

use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;

use medassist_core::context::ContextWindow;
use medassist_groq::PromptDispatcher;
use medassist_transcribe::PollSchedule;
use medassist_vision::ImageCaptioner;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub sdk_config: SdkConfig,
    pub s3: S3Client,
    pub bucket: String,
    pub dispatcher: Arc<PromptDispatcher>,
    /// `None` when no captioning key is configured.
    pub captioner: Option<Arc<ImageCaptioner>>,
    pub context_window: ContextWindow,
    pub transcribe_poll: PollSchedule,
}

impl AppState {
    pub fn build(config: &crate::config::ApiConfig, sdk_config: SdkConfig) -> eyre::Result<Self> {
        let s3 = medassist_storage::client::build_client(&sdk_config);
        let dispatcher = Arc::new(PromptDispatcher::new(config.completion.clone())?);

        let captioner = if config.caption.api_key().is_some() {
            Some(Arc::new(ImageCaptioner::new(config.caption.clone())?))
        } else {
            tracing::warn!("HUGGINGFACE_API_KEY not set, image analysis disabled");
            None
        };

        Ok(Self {
            sdk_config,
            s3,
            bucket: config.bucket.clone(),
            dispatcher,
            captioner,
            context_window: config.context_window,
            transcribe_poll: PollSchedule::default(),
        })
    }
}
