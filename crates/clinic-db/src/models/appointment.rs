use super::{deserialize_some, non_blank, parse_id};
use crate::changeset::ValidationErrors;
use crate::error::{OrmError, OrmResult};
use crate::field_set::FieldSet;
use crate::filter::{FilterKey, FilterSet, Filterable, parse_from_date, parse_to_date};
use crate::row::{FromRow, RowExt};
use crate::value::{FromValue, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_postgres::Row;

/// Lifecycle of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [&'static str; 4] = ["pending", "confirmed", "completed", "cancelled"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `appointments` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_type_id: i64,
    pub date: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Apply allow-listed assignments in place.
    pub fn apply_fields(&mut self, fields: &FieldSet) -> OrmResult<()> {
        for (column, value) in fields.iter() {
            match column {
                "patient_id" => self.patient_id = i64::from_value(column, value)?,
                "doctor_id" => self.doctor_id = i64::from_value(column, value)?,
                "appointment_type_id" => self.appointment_type_id = i64::from_value(column, value)?,
                "date" => self.date = DateTime::<Utc>::from_value(column, value)?,
                "duration" => self.duration = i32::from_value(column, value)?,
                "status" => self.status = String::from_value(column, value)?,
                "notes" => self.notes = Option::<String>::from_value(column, value)?,
                "updated_at" => self.updated_at = DateTime::<Utc>::from_value(column, value)?,
                other => {
                    return Err(OrmError::schema_violation(format!(
                        "unknown column '{other}' for table 'appointments'"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromRow for Appointment {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            patient_id: row.try_get_column("patient_id")?,
            doctor_id: row.try_get_column("doctor_id")?,
            appointment_type_id: row.try_get_column("appointment_type_id")?,
            date: row.try_get_column("date")?,
            duration: row.try_get_column("duration")?,
            status: row.try_get_column("status")?,
            notes: row.try_get_column("notes")?,
            created_at: row.try_get_column("created_at")?,
            updated_at: row.try_get_column("updated_at")?,
        })
    }
}

/// An appointment joined with its patient, doctor and type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_phone: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub appointment_type_name: String,
    pub appointment_type_color: String,
}

impl FromRow for AppointmentDetail {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            appointment: Appointment::from_row(row)?,
            patient_first_name: row.try_get_column("patient_first_name")?,
            patient_last_name: row.try_get_column("patient_last_name")?,
            patient_phone: row.try_get_column("patient_phone")?,
            doctor_first_name: row.try_get_column("doctor_first_name")?,
            doctor_last_name: row.try_get_column("doctor_last_name")?,
            appointment_type_name: row.try_get_column("appointment_type_name")?,
            appointment_type_color: row.try_get_column("appointment_type_color")?,
        })
    }
}

impl Filterable for AppointmentDetail {
    fn filter_value(&self, key: FilterKey) -> Value {
        let a = &self.appointment;
        match key {
            FilterKey::Status => Value::from(&a.status),
            FilterKey::FromDate | FilterKey::ToDate => Value::Timestamp(a.date),
            FilterKey::PatientId => Value::Int(a.patient_id),
            FilterKey::DoctorId => Value::Int(a.doctor_id),
        }
    }
}

/// A validated appointment ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_type_id: i64,
    pub date: DateTime<Utc>,
    pub duration: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Request body for creating an appointment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAppointmentInput {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub appointment_type_id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl NewAppointmentInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.require("patient_id", &self.patient_id);
        errs.require("doctor_id", &self.doctor_id);
        errs.require("appointment_type_id", &self.appointment_type_id);
        errs.require("date", &self.date);
        errs.require("duration", &self.duration);
        errs.require_text("status", self.status.as_deref().unwrap_or(""));

        if let Some(id) = self.patient_id {
            errs.check_positive("patient_id", id);
        }
        if let Some(id) = self.doctor_id {
            errs.check_positive("doctor_id", id);
        }
        if let Some(id) = self.appointment_type_id {
            errs.check_positive("appointment_type_id", id);
        }
        if let Some(duration) = self.duration {
            errs.check_positive("duration", i64::from(duration));
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            errs.check_one_of("status", status, &AppointmentStatus::ALL);
        }
        errs
    }

    pub fn try_into_model(self) -> Result<NewAppointment, ValidationErrors> {
        self.validate().into_result()?;
        match (
            self.patient_id,
            self.doctor_id,
            self.appointment_type_id,
            self.date,
            self.duration,
            self.status.as_deref().and_then(AppointmentStatus::parse),
        ) {
            (
                Some(patient_id),
                Some(doctor_id),
                Some(appointment_type_id),
                Some(date),
                Some(duration),
                Some(status),
            ) => Ok(NewAppointment {
                patient_id,
                doctor_id,
                appointment_type_id,
                date,
                duration,
                status,
                notes: non_blank(self.notes),
            }),
            // validate() already reported every missing field.
            _ => Err(ValidationErrors::new()),
        }
    }
}

/// Request body for a partial appointment update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub appointment_type_id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl AppointmentPatch {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        for (field, id) in [
            ("patient_id", self.patient_id),
            ("doctor_id", self.doctor_id),
            ("appointment_type_id", self.appointment_type_id),
        ] {
            if let Some(id) = id {
                errs.check_positive(field, id);
            }
        }
        if let Some(duration) = self.duration {
            errs.check_positive("duration", i64::from(duration));
        }
        if let Some(status) = &self.status {
            errs.check_one_of("status", status, &AppointmentStatus::ALL);
        }
        errs
    }

    /// The columns this patch assigns, in declaration order.
    pub fn into_field_set(self) -> FieldSet {
        FieldSet::new()
            .set_opt("patient_id", self.patient_id)
            .set_opt("doctor_id", self.doctor_id)
            .set_opt("appointment_type_id", self.appointment_type_id)
            .set_opt("date", self.date)
            .set_opt("duration", self.duration)
            .set_opt("status", self.status)
            .set_opt("notes", self.notes)
    }

    pub fn try_into_patch(self) -> Result<FieldSet, ValidationErrors> {
        self.validate().into_result()?;
        Ok(self.into_field_set())
    }
}

/// Query-string filters for the appointment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}

impl AppointmentQuery {
    /// Blank values are ignored. Unparseable dates or ids are a validation error.
    pub fn to_filter_set(&self) -> OrmResult<FilterSet> {
        let from = non_blank(self.from_date.clone())
            .map(|d| parse_from_date(&d))
            .transpose()?;
        let to = non_blank(self.to_date.clone())
            .map(|d| parse_to_date(&d))
            .transpose()?;

        Ok(FilterSet::new()
            .set_opt(FilterKey::Status, non_blank(self.status.clone()))
            .set_opt(FilterKey::FromDate, from)
            .set_opt(FilterKey::ToDate, to)
            .set_opt(FilterKey::PatientId, parse_id("patient_id", self.patient_id.clone())?)
            .set_opt(FilterKey::DoctorId, parse_id("doctor_id", self.doctor_id.clone())?))
    }
}
