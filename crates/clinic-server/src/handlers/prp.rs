use super::AppState;
use crate::error::{ApiError, StoreResultExt};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use clinic_db::models::{PrpTreatment, PrpTreatmentQuery};
use clinic_db::{ClinicStore, PrpReport, PrpReportQuery};
use std::sync::Arc;

pub async fn list_prp_treatments<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<PrpTreatmentQuery>, QueryRejection>,
) -> Result<Json<Vec<PrpTreatment>>, ApiError> {
    let Query(query) = query?;
    let filters = query
        .to_filter_set()
        .or_api("Failed to fetch PRP treatments")?;

    let treatments = state
        .store
        .list_prp_treatments(&filters)
        .await
        .or_api("Failed to fetch PRP treatments")?;
    Ok(Json(treatments))
}

/// Earnings summary. Without dates it covers the last 30 days.
pub async fn prp_report<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<PrpReportQuery>, QueryRejection>,
) -> Result<Json<PrpReport>, ApiError> {
    let Query(query) = query?;
    let range = query
        .to_range((state.today)())
        .or_api("Failed to build PRP report")?;

    let treatments = state
        .store
        .list_prp_treatments(&range.to_filter_set())
        .await
        .or_api("Failed to build PRP report")?;
    Ok(Json(PrpReport::build(range, &treatments)))
}
