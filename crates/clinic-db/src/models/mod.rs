//! Row types and request inputs for the clinic tables.
//!
//! Each `*Input` type is what a request body deserializes into. `validate()`
//! collects every problem, and `try_into_model()` / `into_field_set()` turn a
//! valid input into what the store consumes.

mod appointment;
mod doctor;
mod notification;
mod patient;
mod prp;

pub use appointment::{
    Appointment, AppointmentDetail, AppointmentPatch, AppointmentQuery, AppointmentStatus,
    NewAppointment, NewAppointmentInput,
};
pub use doctor::{AppointmentType, Doctor};
pub use notification::{NewNotification, NewNotificationInput, Notification, NotificationQuery};
pub use patient::{NewPatient, NewPatientInput, Patient, PatientPatch};
pub use prp::{PrpTreatment, PrpTreatmentQuery, PrpTreatmentRow};

use serde::{Deserialize, Deserializer};

/// Keep an explicit JSON `null` distinct from an absent key.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>`: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Treat blank query-string values as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse an optional numeric id from a query string.
pub(crate) fn parse_id(field: &str, value: Option<String>) -> crate::OrmResult<Option<i64>> {
    non_blank(value)
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| crate::OrmError::validation(format!("invalid {field} '{raw}'")))
        })
        .transpose()
}
