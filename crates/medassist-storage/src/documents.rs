use std::future::Future;

use aws_sdk_s3::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::objects::{self, WriteCondition};

const JSON: &str = "application/json";

/// A JSON document read from S3 along with the ETag it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: String,
}

pub async fn load<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Versioned<T>, StorageError> {
    let output = objects::get_object(client, bucket, key).await?;
    let value: T = serde_json::from_slice(&output.body)?;
    Ok(Versioned {
        value,
        etag: output.etag.unwrap_or_default(),
    })
}

/// Like [`load`], but a missing key is `Ok(None)`.
pub async fn try_load<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Versioned<T>>, StorageError> {
    match load(client, bucket, key).await {
        Ok(doc) => Ok(Some(doc)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write a document. Returns the new ETag.
pub async fn save<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
    condition: WriteCondition<'_>,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    objects::put_object(client, bucket, key, body, Some(JSON), condition).await
}

/// How many times a conditional write is attempted before giving up.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Apply `change` to `current` and write it back with `write`, which is
/// handed the changed value and the ETag it was derived from.
///
/// When `write` reports a lost `If-Match` race, `reload` fetches the newer
/// version and `change` is replayed on top of it. After
/// [`MAX_WRITE_ATTEMPTS`] lost races the last `PreconditionFailed` is
/// returned. Any other error ends the loop immediately.
pub async fn save_with_replay<T, C, W, WF, R, RF>(
    mut current: Versioned<T>,
    mut change: C,
    mut write: W,
    mut reload: R,
) -> Result<Versioned<T>, StorageError>
where
    T: Clone,
    C: FnMut(&mut T),
    W: FnMut(T, String) -> WF,
    WF: Future<Output = Result<Versioned<T>, StorageError>>,
    R: FnMut() -> RF,
    RF: Future<Output = Result<Versioned<T>, StorageError>>,
{
    let mut attempt = 1;
    loop {
        let mut next = current.value.clone();
        change(&mut next);

        match write(next, current.etag.clone()).await {
            Ok(saved) => return Ok(saved),
            Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                attempt += 1;
                current = reload().await?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Load every document under `prefix`.
pub async fn load_all<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let keys = objects::list_objects(client, bucket, prefix).await?;

    let mut values = Vec::with_capacity(keys.len());
    for key in &keys {
        values.push(load(client, bucket, key).await?.value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use super::*;

    fn doc(items: &[&str], etag: &str) -> Versioned<Vec<String>> {
        Versioned {
            value: items.iter().map(|s| s.to_string()).collect(),
            etag: etag.to_string(),
        }
    }

    fn conflict() -> StorageError {
        StorageError::PreconditionFailed {
            key: "conversations/x.json".to_string(),
        }
    }

    #[tokio::test]
    async fn lost_race_replays_onto_newer_version() {
        let mut seen_etags = Vec::new();
        let mut reloads = 0;

        let saved = save_with_replay(
            doc(&["a"], "v1"),
            |items| items.push("mine".to_string()),
            |next, etag| {
                let result = if etag == "v1" {
                    Err(conflict())
                } else {
                    Ok(Versioned {
                        value: next,
                        etag: "v3".to_string(),
                    })
                };
                seen_etags.push(etag);
                ready(result)
            },
            || {
                reloads += 1;
                ready(Ok(doc(&["a", "theirs"], "v2")))
            },
        )
        .await
        .unwrap();

        assert_eq!(saved.value, ["a", "theirs", "mine"]);
        assert_eq!(saved.etag, "v3");
        assert_eq!(seen_etags, ["v1", "v2"]);
        assert_eq!(reloads, 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut writes = 0;
        let mut reloads = 0;

        let err = save_with_replay(
            doc(&[], "v1"),
            |items| items.push("mine".to_string()),
            |_, _| {
                writes += 1;
                ready(Err::<Versioned<Vec<String>>, _>(conflict()))
            },
            || {
                reloads += 1;
                ready(Ok(doc(&[], "v2")))
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(writes, MAX_WRITE_ATTEMPTS);
        assert_eq!(reloads, MAX_WRITE_ATTEMPTS - 1);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let mut writes = 0;
        let mut reloads = 0;

        let err = save_with_replay(
            doc(&[], "v1"),
            |items| items.push("mine".to_string()),
            |_, _| {
                writes += 1;
                ready(Err::<Versioned<Vec<String>>, _>(StorageError::PutObject(
                    "service unavailable".to_string(),
                )))
            },
            || {
                reloads += 1;
                ready(Ok(doc(&[], "v2")))
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::PutObject(_)));
        assert_eq!(writes, 1);
        assert_eq!(reloads, 0);
    }

    #[tokio::test]
    async fn reload_failure_is_returned() {
        let err = save_with_replay(
            doc(&[], "v1"),
            |items| items.push("mine".to_string()),
            |_, _| ready(Err::<Versioned<Vec<String>>, _>(conflict())),
            || {
                ready(Err(StorageError::NotFound {
                    key: "conversations/x.json".to_string(),
                }))
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
