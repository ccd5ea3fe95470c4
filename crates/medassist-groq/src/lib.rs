//! medassist-groq
//!
//! Prompt dispatch to an OpenAI-compatible chat-completions endpoint (Groq
//! by default): prompt assembly, topic screening, the HTTP call, and
//! sanitizing of the returned text.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod prompt;
pub mod sanitize;
pub mod screening;

pub use config::CompletionConfig;
pub use dispatch::PromptDispatcher;
pub use error::{DispatchError, ErrorKind};
