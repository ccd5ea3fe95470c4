use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Settings for the completion endpoint, constructed once at startup and
/// owned by the [`PromptDispatcher`](crate::PromptDispatcher).
#[derive(Clone)]
pub struct CompletionConfig {
    /// Bearer token. `None` (or empty) disables the call entirely.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Estimated-token ceiling for context + query, see
    /// [`prompt::build_user_content`](crate::prompt::build_user_content).
    pub max_prompt_tokens: usize,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            max_prompt_tokens: 4000,
            timeout: Duration::from_secs(60),
        }
    }
}

impl CompletionConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_prompt_tokens", &self.max_prompt_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = CompletionConfig {
            base_url: "http://localhost:9000/v1/".into(),
            ..CompletionConfig::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = CompletionConfig {
            api_key: Some("  ".into()),
            ..CompletionConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn debug_redacts_key() {
        let config = CompletionConfig {
            api_key: Some("gsk_secret".into()),
            ..CompletionConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
