//! Conversation context window for chat prompts.
//!
//! Turns the stored history of a conversation into the bounded block of
//! prior exchanges that precedes the next query. The window favours recent
//! exchanges: it looks at the last `max_exchanges` entries, keeps as many of
//! the newest as fit in `max_chars`, and emits them oldest first.

use serde::{Deserialize, Serialize};

use crate::models::conversation::Exchange;

/// Limits applied when building a context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Number of trailing exchanges considered at all.
    pub max_exchanges: usize,
    /// Upper bound on the length of the rendered context, in characters.
    pub max_chars: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_exchanges: 5,
            max_chars: 2000,
        }
    }
}

/// Render one exchange the way it appears in the context block.
pub fn format_exchange(exchange: &Exchange) -> String {
    format!(
        "User: {}\nAssistant: {}\n\n",
        exchange.user_text, exchange.assistant_text
    )
}

impl ContextWindow {
    /// Build the context string for the next turn from `history`.
    ///
    /// `history` must hold only exchanges that precede the turn being
    /// answered, in chronological order. Exchanges are never split: the walk
    /// from newest to oldest stops at the first one that would push the total
    /// past `max_chars`, so a single oversized latest exchange yields `""`.
    pub fn build(&self, history: &[Exchange]) -> String {
        let start = history.len().saturating_sub(self.max_exchanges);
        let recent = &history[start..];

        let mut kept: Vec<String> = Vec::new();
        let mut used = 0usize;

        for exchange in recent.iter().rev() {
            let block = format_exchange(exchange);
            let len = block.chars().count();
            if used + len > self.max_chars {
                break;
            }
            used += len;
            kept.push(block);
        }

        kept.reverse();
        kept.concat()
    }
}
