//! Data access for the clinic tables.
//!
//! [`ClinicStore`] is the contract the HTTP layer talks to. [`PgStore`] runs
//! the built statements against PostgreSQL; [`MemoryStore`] applies the same
//! allow-lists and filter semantics to in-process tables.

mod fixture;
mod memory;
#[cfg(feature = "pool")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "pool")]
pub use postgres::PgStore;

use crate::error::OrmResult;
use crate::field_set::FieldSet;
use crate::filter::FilterSet;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentType, Doctor, NewAppointment, NewNotification,
    NewPatient, Notification, Patient, PrpTreatment,
};
use std::future::Future;

/// Async access to the clinic data.
///
/// Update methods take an allow-listed [`FieldSet`], stamp `updated_at`, and
/// return `Ok(None)` when the row does not exist. An empty FieldSet fails with
/// [`OrmError::EmptyUpdate`](crate::OrmError::EmptyUpdate).
pub trait ClinicStore: Send + Sync {
    /// All patients, newest first.
    fn list_patients(&self) -> impl Future<Output = OrmResult<Vec<Patient>>> + Send;

    fn get_patient(&self, id: i64) -> impl Future<Output = OrmResult<Option<Patient>>> + Send;

    /// Case-insensitive substring search over first name, last name and phone.
    fn search_patients(&self, term: &str) -> impl Future<Output = OrmResult<Vec<Patient>>> + Send;

    fn create_patient(&self, input: NewPatient) -> impl Future<Output = OrmResult<Patient>> + Send;

    fn update_patient(
        &self,
        id: i64,
        fields: FieldSet,
    ) -> impl Future<Output = OrmResult<Option<Patient>>> + Send;

    /// Delete a patient and their appointments. `false` when nothing was deleted.
    fn delete_patient(&self, id: i64) -> impl Future<Output = OrmResult<bool>> + Send;

    /// All doctors by last name.
    fn list_doctors(&self) -> impl Future<Output = OrmResult<Vec<Doctor>>> + Send;

    fn list_appointment_types(
        &self,
    ) -> impl Future<Output = OrmResult<Vec<AppointmentType>>> + Send;

    /// Appointment details matching `filters`, soonest first.
    fn list_appointments(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = OrmResult<Vec<AppointmentDetail>>> + Send;

    fn get_appointment(
        &self,
        id: i64,
    ) -> impl Future<Output = OrmResult<Option<AppointmentDetail>>> + Send;

    fn create_appointment(
        &self,
        input: NewAppointment,
    ) -> impl Future<Output = OrmResult<Appointment>> + Send;

    fn update_appointment(
        &self,
        id: i64,
        fields: FieldSet,
    ) -> impl Future<Output = OrmResult<Option<Appointment>>> + Send;

    /// PRP treatments matching `filters`, newest first.
    fn list_prp_treatments(
        &self,
        filters: &FilterSet,
    ) -> impl Future<Output = OrmResult<Vec<PrpTreatment>>> + Send;

    /// Broadcast notifications plus those addressed to `user_id`, newest first.
    fn list_notifications(
        &self,
        user_id: Option<i64>,
        unread_only: bool,
    ) -> impl Future<Output = OrmResult<Vec<Notification>>> + Send;

    fn create_notification(
        &self,
        input: NewNotification,
    ) -> impl Future<Output = OrmResult<Notification>> + Send;

    fn mark_notification_read(
        &self,
        id: i64,
    ) -> impl Future<Output = OrmResult<Option<Notification>>> + Send;
}

/// Escape `%`, `_` and `\` so a search term matches literally inside `ILIKE`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ayşe"), "%ayşe%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
