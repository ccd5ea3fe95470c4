use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use eyre::WrapErr;

use medassist_core::context::ContextWindow;
use medassist_groq::CompletionConfig;
use medassist_vision::CaptionConfig;

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bucket: String,
    pub bind_addr: SocketAddr,
    pub completion: CompletionConfig,
    pub caption: CaptionConfig,
    pub context_window: ContextWindow,
    /// Set when running inside the Lambda runtime.
    pub lambda: bool,
}

impl ApiConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 60u64)?);

        let completion_defaults = CompletionConfig::default();
        let completion = CompletionConfig {
            api_key: get("GROQ_API_KEY"),
            base_url: get("GROQ_BASE_URL").unwrap_or(completion_defaults.base_url),
            model: get("GROQ_MODEL").unwrap_or(completion_defaults.model),
            max_tokens: parse_or(&get, "GROQ_MAX_TOKENS", completion_defaults.max_tokens)?,
            temperature: parse_or(&get, "GROQ_TEMPERATURE", completion_defaults.temperature)?,
            max_prompt_tokens: completion_defaults.max_prompt_tokens,
            timeout,
        };

        let caption_defaults = CaptionConfig::default();
        let caption = CaptionConfig {
            api_key: get("HUGGINGFACE_API_KEY"),
            base_url: caption_defaults.base_url,
            model: get("CAPTION_MODEL").unwrap_or(caption_defaults.model),
            timeout,
        };

        let window_defaults = ContextWindow::default();
        let context_window = ContextWindow {
            max_exchanges: parse_or(&get, "CONTEXT_MAX_EXCHANGES", window_defaults.max_exchanges)?,
            max_chars: parse_or(&get, "CONTEXT_MAX_CHARS", window_defaults.max_chars)?,
        };

        Ok(Self {
            bucket: get("MEDASSIST_BUCKET").unwrap_or_else(|| "medassist".to_string()),
            bind_addr: parse_or(&get, "MEDASSIST_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            completion,
            caption,
            context_window,
            lambda: get("AWS_LAMBDA_RUNTIME_API").is_some(),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("invalid value for {name}: {raw:?}")),
    }
}
