//! Object key layout of the MedAssist bucket.

use uuid::Uuid;

pub const CONVERSATIONS_PREFIX: &str = "conversations/";

pub const MEDICATIONS_PREFIX: &str = "medications/";

pub const MEDICATION_LOGS_PREFIX: &str = "medication-logs/";

pub fn conversation(id: Uuid) -> String {
    format!("conversations/{id}.json")
}

pub fn conversation_images_prefix(id: Uuid) -> String {
    format!("images/{id}/")
}

pub fn conversation_image(id: Uuid, image_id: Uuid, ext: &str) -> String {
    format!("images/{id}/{image_id}.{ext}")
}

pub fn medication(id: Uuid) -> String {
    format!("medications/{id}.json")
}

pub fn medication_log(id: Uuid) -> String {
    format!("medication-logs/{id}.json")
}

/// Staging key for uploaded audio awaiting transcription.
pub fn audio_upload(id: Uuid, ext: &str) -> String {
    format!("_uploads/audio/{id}.{ext}")
}

pub fn transcript_output(job_name: &str) -> String {
    format!("_transcribe/{job_name}.json")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_live_under_their_list_prefixes() {
        let id = Uuid::new_v4();
        assert!(conversation(id).starts_with(CONVERSATIONS_PREFIX));
        assert!(medication(id).starts_with(MEDICATIONS_PREFIX));
        assert!(medication_log(id).starts_with(MEDICATION_LOGS_PREFIX));
    }

    #[test]
    fn images_are_outside_the_conversation_prefix() {
        let id = Uuid::new_v4();
        let image = conversation_image(id, Uuid::new_v4(), "png");
        assert!(image.starts_with(&conversation_images_prefix(id)));
        assert!(!image.starts_with(CONVERSATIONS_PREFIX));
    }
}
