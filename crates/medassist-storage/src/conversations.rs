//! Conversation store.
//!
//! Each conversation is a single JSON document under `conversations/`. The
//! exchange log only ever grows: appends read the document, push the new
//! exchange and write back with `If-Match` on the ETag that was read. When
//! another request wrote in between, the document is re-read and the append
//! is replayed on top of the newer version.

use aws_sdk_s3::Client;
use tracing::{info, warn};
use uuid::Uuid;

use medassist_core::models::conversation::{
    Conversation, ConversationSummary, Exchange, MedicalImage,
};
use medassist_core::s3_keys;

use crate::documents::{self, Versioned};
use crate::error::StorageError;
use crate::objects::{self, WriteCondition};

pub async fn create(client: &Client, bucket: &str) -> Result<Versioned<Conversation>, StorageError> {
    let conversation = Conversation::new();
    let key = s3_keys::conversation(conversation.id);
    let etag = documents::save(client, bucket, &key, &conversation, WriteCondition::IfAbsent).await?;

    info!(conversation_id = %conversation.id, "created conversation");

    Ok(Versioned {
        value: conversation,
        etag,
    })
}

pub async fn load(
    client: &Client,
    bucket: &str,
    id: Uuid,
) -> Result<Versioned<Conversation>, StorageError> {
    documents::load(client, bucket, &s3_keys::conversation(id)).await
}

/// Load the conversation with `id`, or start a new one when no id is given
/// or the id is unknown.
pub async fn load_or_create(
    client: &Client,
    bucket: &str,
    id: Option<Uuid>,
) -> Result<Versioned<Conversation>, StorageError> {
    if let Some(id) = id {
        if let Some(doc) = documents::try_load(client, bucket, &s3_keys::conversation(id)).await? {
            return Ok(doc);
        }
        warn!(conversation_id = %id, "unknown conversation, starting a new one");
    }
    create(client, bucket).await
}

/// Append an exchange to the conversation's log.
pub async fn append_exchange(
    client: &Client,
    bucket: &str,
    current: Versioned<Conversation>,
    exchange: Exchange,
) -> Result<Versioned<Conversation>, StorageError> {
    update(client, bucket, current, |c| c.push_exchange(exchange.clone())).await
}

/// Upload image bytes for a conversation and record the caption produced
/// for them. Returns the updated document.
pub async fn record_image(
    client: &Client,
    bucket: &str,
    current: Versioned<Conversation>,
    bytes: Vec<u8>,
    ext: &str,
    content_type: Option<&str>,
    caption: &str,
) -> Result<Versioned<Conversation>, StorageError> {
    let key = s3_keys::conversation_image(current.value.id, Uuid::new_v4(), ext);
    objects::put_object(client, bucket, &key, bytes, content_type, WriteCondition::Always).await?;

    let image = MedicalImage {
        s3_key: key,
        caption: caption.to_string(),
        uploaded_at: jiff::Timestamp::now(),
    };
    update(client, bucket, current, |c| c.images.push(image.clone())).await
}

/// Apply `change` and write back conditionally, replaying on a fresh read
/// when the ETag no longer matches.
async fn update<F>(
    client: &Client,
    bucket: &str,
    current: Versioned<Conversation>,
    change: F,
) -> Result<Versioned<Conversation>, StorageError>
where
    F: FnMut(&mut Conversation),
{
    let id = current.value.id;
    let key = s3_keys::conversation(id);
    let key = key.as_str();

    documents::save_with_replay(
        current,
        change,
        |next, etag| async move {
            let etag =
                documents::save(client, bucket, key, &next, WriteCondition::IfMatch(&etag)).await?;
            Ok::<_, StorageError>(Versioned { value: next, etag })
        },
        || {
            warn!(conversation_id = %id, "reloading conversation after concurrent write");
            load(client, bucket, id)
        },
    )
    .await
}

/// Summaries of all conversations, most recently active first.
pub async fn list_summaries(
    client: &Client,
    bucket: &str,
) -> Result<Vec<ConversationSummary>, StorageError> {
    let conversations: Vec<Conversation> =
        documents::load_all(client, bucket, s3_keys::CONVERSATIONS_PREFIX).await?;

    let mut summaries: Vec<ConversationSummary> =
        conversations.iter().map(Conversation::summary).collect();
    sort_recent_first(&mut summaries);
    Ok(summaries)
}

pub fn sort_recent_first(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| b.last_interaction.cmp(&a.last_interaction));
}

/// Delete a conversation and every image uploaded to it.
pub async fn delete(client: &Client, bucket: &str, id: Uuid) -> Result<(), StorageError> {
    let key = s3_keys::conversation(id);
    // S3 deletes are idempotent; check first so unknown ids report NotFound.
    objects::head_object(client, bucket, &key).await?;

    let images =
        objects::delete_objects_by_prefix(client, bucket, &s3_keys::conversation_images_prefix(id))
            .await?;
    objects::delete_object(client, bucket, &key).await?;

    info!(conversation_id = %id, images, "deleted conversation");
    Ok(())
}
