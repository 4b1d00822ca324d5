use super::deserialize_some;
use crate::changeset::ValidationErrors;
use crate::error::{OrmError, OrmResult};
use crate::field_set::FieldSet;
use crate::row::{FromRow, RowExt};
use crate::value::FromValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Case-insensitive substring match over first name, last name and phone.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.first_name, &self.last_name, &self.phone]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Apply allow-listed assignments in place.
    pub fn apply_fields(&mut self, fields: &FieldSet) -> OrmResult<()> {
        for (column, value) in fields.iter() {
            match column {
                "first_name" => self.first_name = String::from_value(column, value)?,
                "last_name" => self.last_name = String::from_value(column, value)?,
                "phone" => self.phone = String::from_value(column, value)?,
                "email" => self.email = Option::<String>::from_value(column, value)?,
                "gender" => self.gender = Option::<String>::from_value(column, value)?,
                "updated_at" => self.updated_at = DateTime::<Utc>::from_value(column, value)?,
                other => {
                    return Err(OrmError::schema_violation(format!(
                        "unknown column '{other}' for table 'patients'"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromRow for Patient {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            phone: row.try_get_column("phone")?,
            email: row.try_get_column("email")?,
            gender: row.try_get_column("gender")?,
            created_at: row.try_get_column("created_at")?,
            updated_at: row.try_get_column("updated_at")?,
        })
    }
}

/// A validated patient ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<String>,
}

/// Request body for creating a patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

impl NewPatientInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.require_text("first_name", self.first_name.as_deref().unwrap_or(""));
        errs.require_text("last_name", self.last_name.as_deref().unwrap_or(""));
        errs.require_text("phone", self.phone.as_deref().unwrap_or(""));
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            errs.check_phone("phone", phone.trim());
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            errs.check_email("email", email.trim());
        }
        errs
    }

    pub fn try_into_model(self) -> Result<NewPatient, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewPatient {
            first_name: self.first_name.unwrap_or_default().trim().to_string(),
            last_name: self.last_name.unwrap_or_default().trim().to_string(),
            phone: self.phone.unwrap_or_default().trim().to_string(),
            email: blank_to_none(self.email),
            gender: blank_to_none(self.gender),
        })
    }
}

/// Request body for a partial patient update.
///
/// `email` and `gender` are nullable: an explicit `null` clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub gender: Option<Option<String>>,
}

impl PatientPatch {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        if let Some(first_name) = &self.first_name {
            errs.require_text("first_name", first_name);
        }
        if let Some(last_name) = &self.last_name {
            errs.require_text("last_name", last_name);
        }
        if let Some(phone) = &self.phone {
            errs.require_text("phone", phone);
            if !phone.trim().is_empty() {
                errs.check_phone("phone", phone.trim());
            }
        }
        if let Some(Some(email)) = &self.email {
            errs.check_email("email", email.trim());
        }
        errs
    }

    /// The columns this patch assigns, in declaration order.
    pub fn into_field_set(self) -> FieldSet {
        FieldSet::new()
            .set_opt("first_name", self.first_name.map(trimmed))
            .set_opt("last_name", self.last_name.map(trimmed))
            .set_opt("phone", self.phone.map(trimmed))
            .set_opt("email", self.email.map(|e| e.map(trimmed)))
            .set_opt("gender", self.gender)
    }

    pub fn try_into_patch(self) -> Result<FieldSet, ValidationErrors> {
        self.validate().into_result()?;
        Ok(self.into_field_set())
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|v| !v.is_empty())
}
