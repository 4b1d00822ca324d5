use super::AppState;
use crate::error::{ApiError, StoreResultExt, parse_path_id};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use clinic_db::ClinicStore;
use clinic_db::models::{NewNotificationInput, Notification, NotificationQuery};
use std::sync::Arc;

pub async fn list_notifications<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let Query(query) = query?;
    let notifications = state
        .store
        .list_notifications(query.user_id, query.unread_only())
        .await
        .or_api("Failed to fetch notifications")?;
    Ok(Json(notifications))
}

pub async fn create_notification<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<NewNotificationInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let Json(input) = body?;
    let notification = input
        .try_into_model()
        .map_err(|errs| ApiError::invalid("Title, message and type are required", errs))?;

    let created = state
        .store
        .create_notification(notification)
        .await
        .or_api("Failed to create notification")?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn mark_notification_read<S: ClinicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let id = parse_path_id(&id)?;
    state
        .store
        .mark_notification_read(id)
        .await
        .or_api("Failed to update notification")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Notification not found"))
}
