use crate::error::OrmResult;
use crate::row::{FromRow, RowExt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FromRow for Doctor {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            specialty: row.try_get_column("specialty")?,
            created_at: row.try_get_column("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentType {
    pub id: i64,
    pub name: String,
    /// CSS color used by calendar views.
    pub color: String,
    /// Default duration in minutes.
    pub duration: i32,
}

impl FromRow for AppointmentType {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            color: row.try_get_column("color")?,
            duration: row.try_get_column("duration")?,
        })
    }
}
