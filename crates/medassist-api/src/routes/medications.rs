use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medassist_core::models::medication::{
    Medication, MedicationLog, MedicationStats, MedicationUpdate, NewMedication,
};
use medassist_storage::medications;

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;

pub async fn list_medications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    Ok(Json(medications::list(&state.s3, &state.bucket).await?))
}

/// Every medication is on a daily schedule, so today's list is the full
/// list in dose order.
pub async fn today(State(state): State<AppState>) -> Result<Json<Vec<Medication>>, ApiError> {
    Ok(Json(medications::list(&state.s3, &state.bucket).await?))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<MedicationStats>, ApiError> {
    let all = medications::list(&state.s3, &state.bucket).await?;
    let today = jiff::Zoned::now().date();
    Ok(Json(MedicationStats::compute(&all, today)))
}

pub async fn get_medication(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Medication>, ApiError> {
    Ok(Json(medications::get(&state.s3, &state.bucket, id).await?))
}

pub async fn create_medication(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewMedication>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::BadRequest("medication name is required".to_string()));
    }
    let medication = new.into_medication();
    medications::create(&state.s3, &state.bucket, &medication).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

pub async fn update_medication(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(update): JsonBody<MedicationUpdate>,
) -> Result<Json<Medication>, ApiError> {
    Ok(Json(
        medications::update(&state.s3, &state.bucket, id, update).await?,
    ))
}

pub async fn delete_medication(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    medications::delete(&state.s3, &state.bucket, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkTakenRequest {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct MarkTakenResponse {
    pub medication: Medication,
    pub log: MedicationLog,
}

pub async fn mark_taken(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    body: Bytes,
) -> Result<Json<MarkTakenResponse>, ApiError> {
    // The body is optional; an empty one means no notes.
    let notes = if body.is_empty() {
        String::new()
    } else {
        serde_json::from_slice::<MarkTakenRequest>(&body)?.notes
    };
    let (medication, log) = medications::mark_taken(&state.s3, &state.bucket, id, &notes).await?;
    Ok(Json(MarkTakenResponse { medication, log }))
}

pub async fn list_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationLog>>, ApiError> {
    Ok(Json(medications::list_logs(&state.s3, &state.bucket).await?))
}
