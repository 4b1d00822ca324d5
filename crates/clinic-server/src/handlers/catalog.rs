//! Read-only reference data: doctors and appointment types.

use super::AppState;
use crate::error::{ApiError, StoreResultExt};
use axum::Json;
use axum::extract::State;
use clinic_db::ClinicStore;
use clinic_db::models::{AppointmentType, Doctor};
use std::sync::Arc;

pub async fn list_doctors<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let doctors = state
        .store
        .list_doctors()
        .await
        .or_api("Failed to fetch doctors")?;
    Ok(Json(doctors))
}

pub async fn list_appointment_types<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<AppointmentType>>, ApiError> {
    let types = state
        .store
        .list_appointment_types()
        .await
        .or_api("Failed to fetch appointment types")?;
    Ok(Json(types))
}
