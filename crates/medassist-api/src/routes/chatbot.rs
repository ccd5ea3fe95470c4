//! `POST /chatbot/query`
//!
//! Accepts either a JSON body `{conversation_id?, query?}` or a multipart
//! form carrying any of `conversation_id`, `text`, `audio` (or `voice`) and
//! `image`. Speech is transcribed only when no text was typed; an image is
//! captioned and stored with the conversation. The merged query is answered
//! with the conversation's recent history as context and the exchange is
//! appended to the history.

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use medassist_core::error::CoreError;
use medassist_core::models::conversation::Exchange;
use medassist_core::query::QueryInputs;
use medassist_storage::conversations;
use medassist_transcribe::error::TranscribeError;
use medassist_vision::error::VisionError;
use medassist_vision::image_extension;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatbotRequest {
    pub conversation_id: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub ai_response: String,
    pub conversation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
}

#[derive(Debug)]
struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
    filename: Option<String>,
}

#[derive(Debug, Default)]
struct ChatbotInput {
    conversation_id: Option<String>,
    text: Option<String>,
    audio: Option<Upload>,
    image: Option<Upload>,
}

impl ChatbotInput {
    fn conversation_id(&self) -> Result<Option<Uuid>, CoreError> {
        match self.conversation_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) => Ok(Some(id.parse()?)),
        }
    }

    fn has_any_input(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
            || self.audio.is_some()
            || self.image.is_some()
    }
}

pub async fn query(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<ChatbotResponse>, ApiError> {
    let input = read_input(&state, req).await?;
    let conversation_id = input.conversation_id()?;
    if !input.has_any_input() {
        return Err(CoreError::EmptyQuery.into());
    }

    let mut inputs = QueryInputs {
        text: input.text,
        ..QueryInputs::default()
    };

    if let Some(audio) = &input.audio {
        if inputs.needs_transcript() {
            inputs.transcript = Some(transcribe(&state, audio).await?);
        }
    }

    if let Some(image) = &input.image {
        inputs.image_caption = Some(caption(&state, image).await?);
    }

    let query = inputs.assemble()?;

    let mut conversation =
        conversations::load_or_create(&state.s3, &state.bucket, conversation_id).await?;

    if let (Some(image), Some(caption)) = (input.image, inputs.image_caption.as_deref()) {
        let ext = image_extension(image.content_type.as_deref(), image.filename.as_deref());
        conversation = conversations::record_image(
            &state.s3,
            &state.bucket,
            conversation,
            image.bytes,
            ext,
            image.content_type.as_deref(),
            caption,
        )
        .await?;
    }

    let context = state
        .context_window
        .build(conversation.value.history.as_slice());
    let ai_response = state.dispatcher.respond(&context, &query).await;

    let conversation_id = conversation.value.id;
    conversations::append_exchange(
        &state.s3,
        &state.bucket,
        conversation,
        Exchange::new(query, ai_response.clone()),
    )
    .await?;

    info!(%conversation_id, "answered chatbot query");

    Ok(Json(ChatbotResponse {
        ai_response,
        conversation_id,
        transcript: inputs.transcript,
        image_caption: inputs.image_caption,
    }))
}

async fn read_input(state: &AppState, req: Request) -> Result<ChatbotInput, ApiError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(req, state).await?;
        read_multipart(multipart).await
    } else {
        let Json(body) = Json::<ChatbotRequest>::from_request(req, state).await?;
        Ok(ChatbotInput {
            conversation_id: body.conversation_id,
            text: body.query,
            ..ChatbotInput::default()
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ChatbotInput, ApiError> {
    let mut input = ChatbotInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "conversation_id" => {
                input.conversation_id = Some(field_text(field).await?);
            }
            "text" | "query" => {
                input.text = Some(field_text(field).await?);
            }
            "audio" | "voice" | "image" => {
                let content_type = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                if bytes.is_empty() {
                    continue;
                }
                let upload = Upload {
                    bytes,
                    content_type,
                    filename,
                };
                if name == "image" {
                    input.image = Some(upload);
                } else {
                    input.audio = Some(upload);
                }
            }
            _ => {}
        }
    }

    Ok(input)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    Ok(field.text().await?)
}

async fn transcribe(state: &AppState, audio: &Upload) -> Result<String, ApiError> {
    let ext = medassist_transcribe::audio_extension(
        audio.content_type.as_deref(),
        audio.filename.as_deref(),
    )
    .ok_or_else(|| {
        TranscribeError::UnsupportedFormat(
            audio
                .content_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        )
    })?;

    let transcript = medassist_transcribe::transcribe_upload(
        &state.sdk_config,
        &state.bucket,
        audio.bytes.clone(),
        &ext,
        state.transcribe_poll,
    )
    .await?;
    Ok(transcript)
}

async fn caption(state: &AppState, image: &Upload) -> Result<String, ApiError> {
    let captioner = state
        .captioner
        .as_ref()
        .ok_or(VisionError::MissingApiKey)?;
    let caption = captioner
        .caption(image.bytes.clone(), image.content_type.as_deref())
        .await?;
    Ok(caption)
}
