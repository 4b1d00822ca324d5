use super::AppState;
use crate::error::{ApiError, StoreResultExt, parse_path_id};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use clinic_db::ClinicStore;
use clinic_db::models::{
    Appointment, AppointmentDetail, AppointmentPatch, AppointmentQuery, NewAppointmentInput,
};
use std::sync::Arc;

pub async fn list_appointments<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<AppointmentQuery>, QueryRejection>,
) -> Result<Json<Vec<AppointmentDetail>>, ApiError> {
    let Query(query) = query?;
    let filters = query
        .to_filter_set()
        .or_api("Failed to fetch appointments")?;

    let appointments = state
        .store
        .list_appointments(&filters)
        .await
        .or_api("Failed to fetch appointments")?;
    Ok(Json(appointments))
}

pub async fn create_appointment<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<NewAppointmentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(input) = body?;
    let appointment = input.try_into_model().map_err(|errs| {
        let message = if errs.has_missing() {
            "Missing required fields"
        } else {
            "Invalid appointment data"
        };
        ApiError::invalid(message, errs)
    })?;

    let created = state
        .store
        .create_appointment(appointment)
        .await
        .or_api("Failed to create appointment")?;
    tracing::info!(
        appointment_id = created.id,
        patient_id = created.patient_id,
        "appointment created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_appointment<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .store
        .get_appointment(id)
        .await
        .or_api("Failed to fetch appointment")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment not found"))
}

pub async fn update_appointment<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<AppointmentPatch>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let id = parse_path_id(&id)?;
    let Json(patch) = body?;
    let fields = patch
        .try_into_patch()
        .map_err(|errs| ApiError::invalid("Invalid appointment data", errs))?;

    state
        .store
        .update_appointment(id, fields)
        .await
        .or_api("Failed to update appointment")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment not found"))
}
