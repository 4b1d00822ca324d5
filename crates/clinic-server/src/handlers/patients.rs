use super::AppState;
use crate::error::{ApiError, StoreResultExt, parse_path_id};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use clinic_db::ClinicStore;
use clinic_db::models::{NewPatientInput, Patient, PatientPatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub term: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

pub async fn list_patients<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = state
        .store
        .list_patients()
        .await
        .or_api("Failed to fetch patients")?;
    Ok(Json(patients))
}

pub async fn search_patients<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let Query(params) = query?;
    let term = params
        .term
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Search term is required"))?;

    let patients = state
        .store
        .search_patients(&term)
        .await
        .or_api("Failed to search patients")?;
    Ok(Json(patients))
}

pub async fn create_patient<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<NewPatientInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(input) = body?;
    let patient = input.try_into_model().map_err(|errs| {
        let message = if errs.has_missing() {
            "First name, last name and phone are required"
        } else {
            "Invalid patient data"
        };
        ApiError::invalid(message, errs)
    })?;

    let created = state
        .store
        .create_patient(patient)
        .await
        .or_api("Failed to create patient")?;
    tracing::info!(patient_id = created.id, "patient created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_patient<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .store
        .get_patient(id)
        .await
        .or_api("Failed to fetch patient")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Patient not found"))
}

pub async fn update_patient<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<PatientPatch>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_path_id(&id)?;
    let Json(patch) = body?;
    let fields = patch
        .try_into_patch()
        .map_err(|errs| ApiError::invalid("Invalid patient data", errs))?;

    state
        .store
        .update_patient(id, fields)
        .await
        .or_api("Failed to update patient")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Patient not found"))
}

pub async fn delete_patient<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_path_id(&id)?;
    let deleted = state
        .store
        .delete_patient(id)
        .await
        .or_api("Failed to delete patient")?;
    if !deleted {
        return Err(ApiError::not_found("Patient not found or could not be deleted"));
    }

    tracing::info!(patient_id = id, "patient deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Patient deleted successfully",
    }))
}
