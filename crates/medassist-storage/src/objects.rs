use aws_sdk_s3::Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;

/// Result of a GET operation, including the body and ETag.
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: Option<String>,
}

/// Write condition for [`put_object`].
#[derive(Debug, Clone, Copy)]
pub enum WriteCondition<'a> {
    /// Unconditional overwrite.
    Always,
    /// Only replace the object if its current ETag matches.
    IfMatch(&'a str),
    /// Only create the object if nothing exists at the key yet.
    IfAbsent,
}

pub async fn get_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<GetObjectOutput, StorageError> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_no_such_key() {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::GetObject(err.to_string())
            }
        })?;

    let etag = resp.e_tag().map(|s| s.to_string());
    let body = resp
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(e.to_string()))?
        .into_bytes()
        .to_vec();

    Ok(GetObjectOutput { body, etag })
}

/// Check that an object exists without downloading it. Returns its ETag.
pub async fn head_object(client: &Client, bucket: &str, key: &str) -> Result<String, StorageError> {
    let resp = client
        .head_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| head_error(e.into_service_error(), key))?;

    Ok(resp.e_tag().unwrap_or_default().to_string())
}

fn head_error(err: HeadObjectError, key: &str) -> StorageError {
    if err.is_not_found() {
        StorageError::NotFound {
            key: key.to_string(),
        }
    } else {
        StorageError::HeadObject(err.to_string())
    }
}

/// Put an object to S3. Returns the new ETag.
///
/// S3 answers a failed `If-Match` / `If-None-Match` with `412
/// PreconditionFailed`, surfaced as [`StorageError::PreconditionFailed`].
pub async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
    condition: WriteCondition<'_>,
) -> Result<String, StorageError> {
    let mut req = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body));

    if let Some(ct) = content_type {
        req = req.content_type(ct);
    }

    req = match condition {
        WriteCondition::Always => req,
        WriteCondition::IfMatch(etag) => req.if_match(etag),
        WriteCondition::IfAbsent => req.if_none_match("*"),
    };

    let resp = req.send().await.map_err(|e| {
        let err = e.into_service_error();
        if err.code() == Some("PreconditionFailed") {
            StorageError::PreconditionFailed {
                key: key.to_string(),
            }
        } else {
            StorageError::PutObject(err.to_string())
        }
    })?;

    Ok(resp.e_tag().unwrap_or_default().to_string())
}

pub async fn delete_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<(), StorageError> {
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| StorageError::DeleteObject(e.into_service_error().to_string()))?;

    Ok(())
}

/// Delete all objects under a prefix. Returns the number deleted.
pub async fn delete_objects_by_prefix(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<usize, StorageError> {
    let keys = list_objects(client, bucket, prefix).await?;
    for key in &keys {
        delete_object(client, bucket, key).await?;
    }
    Ok(keys.len())
}

/// List object keys under a prefix, following continuation tokens.
pub async fn list_objects(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<String>, StorageError> {
    let mut keys = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let resp = client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token.take())
            .send()
            .await
            .map_err(|e| StorageError::ListObjects(e.into_service_error().to_string()))?;

        keys.extend(resp.contents().iter().filter_map(|o| o.key()).map(str::to_string));

        match resp.next_continuation_token() {
            Some(token) if resp.is_truncated() == Some(true) => {
                continuation_token = Some(token.to_string());
            }
            _ => break,
        }
    }

    Ok(keys)
}
