//! Route handlers, one module per resource.
//!
//! Handlers are generic over the [`ClinicStore`] so the same router serves
//! PostgreSQL in production and the in-memory store in tests.

pub mod appointments;
pub mod catalog;
pub mod notifications;
pub mod patients;
pub mod prp;

use axum::Json;
use chrono::{NaiveDate, Utc};
use clinic_db::ClinicStore;
use serde_json::{Value, json};

/// Shared state handed to every handler.
pub struct AppState<S> {
    pub store: S,
    /// Today's date; the PRP report defaults its range from it.
    pub today: fn() -> NaiveDate,
}

impl<S: ClinicStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: utc_today,
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
