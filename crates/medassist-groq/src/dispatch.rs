use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::CompletionConfig;
use crate::error::{DispatchError, ErrorKind};
use crate::prompt::{self, SYSTEM_PROMPT};
use crate::sanitize::sanitize_response;
use crate::screening::{self, OFF_TOPIC_REPLY};

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull `error.message` out of an OpenAI-style error body.
fn upstream_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
}

// ── Dispatcher ───────────────────────────────────────────────────────────────

/// Sends a query plus prior context to the completion endpoint.
pub struct PromptDispatcher {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl PromptDispatcher {
    pub fn new(config: CompletionConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Run one completion and return the sanitized answer.
    ///
    /// Without an API key this fails before anything is sent. Queries that
    /// are clearly off-topic get a fixed redirect, also without a call.
    pub async fn complete(&self, context: &str, query: &str) -> Result<String, DispatchError> {
        let api_key = self.config.api_key().ok_or(DispatchError::MissingApiKey)?;

        if screening::is_off_topic(query) {
            info!("query screened as off-topic, skipping completion call");
            return Ok(OFF_TOPIC_REPLY.to_string());
        }

        let user_content =
            prompt::build_user_content(context, query, self.config.max_prompt_tokens);
        let request = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        info!(
            model = %self.config.model,
            context_chars = context.chars().count(),
            query_chars = query.chars().count(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::ResponseParse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DispatchError::ResponseParse("no message in response".to_string()))?;

        Ok(sanitize_response(&content))
    }

    /// Like [`complete`](Self::complete), but every failure is turned into
    /// the string shown to the user in place of an answer.
    pub async fn respond(&self, context: &str, query: &str) -> String {
        match self.complete(context, query).await {
            Ok(answer) => answer,
            Err(e) => {
                match e.kind() {
                    ErrorKind::Configuration => warn!(error = %e, "completion not attempted"),
                    ErrorKind::Upstream | ErrorKind::Internal => {
                        error!(error = %e, "completion failed")
                    }
                }
                e.user_message()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_openai_error_body() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        assert_eq!(upstream_error_message(body).as_deref(), Some("Invalid API Key"));
    }

    #[test]
    fn unparseable_error_body_has_no_message() {
        assert_eq!(upstream_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(upstream_error_message(r#"{"error":{"message":""}}"#), None);
    }

    #[test]
    fn request_body_shape() {
        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            model: "m",
            max_tokens: 10,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_tokens"], 10);
        assert_eq!(json["temperature"], 0.5);
    }
}
