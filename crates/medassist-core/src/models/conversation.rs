use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters shown in a conversation preview.
pub const PREVIEW_CHARS: usize = 50;

/// A persisted conversation between a user and the assistant.
///
/// Stored as one JSON document in S3 and rewritten after every
/// query/response pair so the history is durable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub history: ConversationHistory,
    #[serde(default)]
    pub images: Vec<MedicalImage>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Conversation {
    pub fn new() -> Self {
        let now = jiff::Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            history: ConversationHistory::default(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an exchange and bump `updated_at`.
    pub fn push_exchange(&mut self, exchange: Exchange) {
        self.updated_at = exchange.created_at.max(self.updated_at);
        self.history.append(exchange);
    }

    pub fn summary(&self) -> ConversationSummary {
        let preview = self
            .history
            .iter()
            .map(|e| e.user_text.trim())
            .find(|t| !t.is_empty())
            .map(|t| t.chars().take(PREVIEW_CHARS).collect())
            .unwrap_or_else(|| "No messages".to_string());

        ConversationSummary {
            id: self.id,
            start_time: self.created_at,
            last_interaction: self.updated_at,
            exchange_count: self.history.len(),
            preview,
        }
    }

    /// Flatten the history into alternating user/assistant messages.
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.history
            .iter()
            .flat_map(|e| {
                [
                    ConversationMessage {
                        sender: Sender::User,
                        content: e.user_text.clone(),
                        timestamp: e.created_at,
                    },
                    ConversationMessage {
                        sender: Sender::Ai,
                        content: e.assistant_text.clone(),
                        timestamp: e.created_at,
                    },
                ]
            })
            .collect()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// One user query paired with the assistant's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_text: String,
    pub assistant_text: String,
    pub created_at: jiff::Timestamp,
}

impl Exchange {
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

/// Chronological, append-only sequence of exchanges.
///
/// There is no way to remove or reorder entries; windowing for prompts works
/// on a borrowed snapshot via [`ConversationHistory::as_slice`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<Exchange>);

impl ConversationHistory {
    pub fn append(&mut self, exchange: Exchange) {
        self.0.push(exchange);
    }

    pub fn as_slice(&self) -> &[Exchange] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Exchange> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = Exchange>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An uploaded image and the caption produced for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalImage {
    pub s3_key: String,
    pub caption: String,
    pub uploaded_at: jiff::Timestamp,
}

/// Listing entry for a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub start_time: jiff::Timestamp,
    pub last_interaction: jiff::Timestamp,
    pub exchange_count: usize,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: jiff::Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}
