use aws_sdk_s3::Client;
use tracing::info;
use uuid::Uuid;

use medassist_core::models::medication::{
    Medication, MedicationLog, MedicationUpdate, sort_by_next_dose,
};
use medassist_core::s3_keys;

use crate::documents;
use crate::error::StorageError;
use crate::objects::{self, WriteCondition};

/// All medications, ordered by next dose.
pub async fn list(client: &Client, bucket: &str) -> Result<Vec<Medication>, StorageError> {
    let mut medications: Vec<Medication> =
        documents::load_all(client, bucket, s3_keys::MEDICATIONS_PREFIX).await?;
    sort_by_next_dose(&mut medications);
    Ok(medications)
}

pub async fn get(client: &Client, bucket: &str, id: Uuid) -> Result<Medication, StorageError> {
    Ok(documents::load(client, bucket, &s3_keys::medication(id)).await?.value)
}

pub async fn create(
    client: &Client,
    bucket: &str,
    medication: &Medication,
) -> Result<(), StorageError> {
    let key = s3_keys::medication(medication.id);
    documents::save(client, bucket, &key, medication, WriteCondition::IfAbsent).await?;
    info!(medication_id = %medication.id, name = %medication.name, "created medication");
    Ok(())
}

/// Apply a partial update. Writes a dose log when the update marks the
/// medication as taken.
pub async fn update(
    client: &Client,
    bucket: &str,
    id: Uuid,
    mut update: MedicationUpdate,
) -> Result<Medication, StorageError> {
    let key = s3_keys::medication(id);
    let doc = documents::load::<Medication>(client, bucket, &key).await?;
    let mut medication = doc.value;

    let notes = update.notes.take().unwrap_or_default();
    let taken = medication.apply(update);

    documents::save(client, bucket, &key, &medication, WriteCondition::IfMatch(&doc.etag)).await?;
    if taken {
        save_log(client, bucket, &MedicationLog::taken(id, notes)).await?;
    }
    Ok(medication)
}

/// Mark a medication as taken and write the corresponding log entry.
pub async fn mark_taken(
    client: &Client,
    bucket: &str,
    id: Uuid,
    notes: &str,
) -> Result<(Medication, MedicationLog), StorageError> {
    let key = s3_keys::medication(id);
    let doc = documents::load::<Medication>(client, bucket, &key).await?;
    let mut medication = doc.value;

    let log = medication.mark_taken(notes);
    documents::save(client, bucket, &key, &medication, WriteCondition::IfMatch(&doc.etag)).await?;
    save_log(client, bucket, &log).await?;

    info!(medication_id = %id, "medication marked as taken");
    Ok((medication, log))
}

pub async fn delete(client: &Client, bucket: &str, id: Uuid) -> Result<(), StorageError> {
    let key = s3_keys::medication(id);
    objects::head_object(client, bucket, &key).await?;
    objects::delete_object(client, bucket, &key).await
}

async fn save_log(client: &Client, bucket: &str, log: &MedicationLog) -> Result<(), StorageError> {
    let key = s3_keys::medication_log(log.id);
    documents::save(client, bucket, &key, log, WriteCondition::IfAbsent).await?;
    Ok(())
}

/// All dose logs, newest first.
pub async fn list_logs(client: &Client, bucket: &str) -> Result<Vec<MedicationLog>, StorageError> {
    let mut logs: Vec<MedicationLog> =
        documents::load_all(client, bucket, s3_keys::MEDICATION_LOGS_PREFIX).await?;
    logs.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
    Ok(logs)
}
