use super::ClinicStore;
use super::fixture;
use crate::error::{OrmError, OrmResult};
use crate::field_set::FieldSet;
use crate::filter::FilterSet;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentType, Doctor, NewAppointment, NewNotification,
    NewPatient, Notification, Patient, PrpTreatment, PrpTreatmentRow,
};
use crate::schema::{APPOINTMENTS, PATIENTS};
use chrono::Utc;
use std::cmp::Reverse;
use tokio::sync::RwLock;

/// Next id per table.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequences {
    patients: i64,
    appointments: i64,
    notifications: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) patients: Vec<Patient>,
    pub(crate) doctors: Vec<Doctor>,
    pub(crate) appointment_types: Vec<AppointmentType>,
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) prp_treatments: Vec<PrpTreatmentRow>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) sequences: Sequences,
}

impl Tables {
    /// Start every sequence after the largest id already present.
    pub(crate) fn with_sequences(mut self) -> Self {
        self.sequences = Sequences {
            patients: self.patients.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            appointments: self.appointments.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            notifications: self.notifications.iter().map(|n| n.id).max().unwrap_or(0) + 1,
        };
        self
    }

    fn appointment_detail(&self, appointment: &Appointment) -> Option<AppointmentDetail> {
        let patient = self.patients.iter().find(|p| p.id == appointment.patient_id)?;
        let doctor = self.doctors.iter().find(|d| d.id == appointment.doctor_id)?;
        let kind = self
            .appointment_types
            .iter()
            .find(|t| t.id == appointment.appointment_type_id)?;

        Some(AppointmentDetail {
            appointment: appointment.clone(),
            patient_first_name: patient.first_name.clone(),
            patient_last_name: patient.last_name.clone(),
            patient_phone: patient.phone.clone(),
            doctor_first_name: doctor.first_name.clone(),
            doctor_last_name: doctor.last_name.clone(),
            appointment_type_name: kind.name.clone(),
            appointment_type_color: kind.color.clone(),
        })
    }

    fn prp_detail(&self, row: &PrpTreatmentRow) -> Option<PrpTreatment> {
        let appointment = self.appointments.iter().find(|a| a.id == row.appointment_id)?;
        let patient = self.patients.iter().find(|p| p.id == appointment.patient_id)?;
        let doctor = self.doctors.iter().find(|d| d.id == appointment.doctor_id)?;

        Some(PrpTreatment {
            treatment: row.clone(),
            date: appointment.date,
            status: appointment.status.clone(),
            doctor_id: appointment.doctor_id,
            patient_first_name: patient.first_name.clone(),
            patient_last_name: patient.last_name.clone(),
            doctor_first_name: doctor.first_name.clone(),
            doctor_last_name: doctor.last_name.clone(),
        })
    }

    /// Mirror the foreign keys on `appointments`.
    fn check_appointment_refs(
        &self,
        patient_id: i64,
        doctor_id: i64,
        appointment_type_id: i64,
    ) -> OrmResult<()> {
        if !self.patients.iter().any(|p| p.id == patient_id) {
            return Err(OrmError::ForeignKeyViolation(format!(
                "appointments_patient_id_fkey: patient {patient_id} does not exist"
            )));
        }
        if !self.doctors.iter().any(|d| d.id == doctor_id) {
            return Err(OrmError::ForeignKeyViolation(format!(
                "appointments_doctor_id_fkey: doctor {doctor_id} does not exist"
            )));
        }
        if !self.appointment_types.iter().any(|t| t.id == appointment_type_id) {
            return Err(OrmError::ForeignKeyViolation(format!(
                "appointments_appointment_type_id_fkey: appointment type {appointment_type_id} does not exist"
            )));
        }
        Ok(())
    }
}

/// [`ClinicStore`] over in-process tables.
///
/// Updates pass through the same allow-list check as the SQL builder, and
/// list filters are evaluated with [`FilterSet::matches`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    seed: Tables,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store loaded with the deterministic demo fixture.
    pub fn seeded() -> Self {
        let seed = fixture::seed();
        Self {
            tables: RwLock::new(seed.clone()),
            seed,
        }
    }

    /// Restore the state the store was created with.
    pub async fn reset(&self) {
        *self.tables.write().await = self.seed.clone();
    }
}

impl ClinicStore for MemoryStore {
    async fn list_patients(&self) -> OrmResult<Vec<Patient>> {
        let tables = self.tables.read().await;
        let mut patients = tables.patients.clone();
        patients.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(patients)
    }

    async fn get_patient(&self, id: i64) -> OrmResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn search_patients(&self, term: &str) -> OrmResult<Vec<Patient>> {
        let term = term.trim();
        Ok(self
            .list_patients()
            .await?
            .into_iter()
            .filter(|p| p.matches_term(term))
            .collect())
    }

    async fn create_patient(&self, input: NewPatient) -> OrmResult<Patient> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = tables.sequences.patients;
        tables.sequences.patients += 1;

        let patient = Patient {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            email: input.email,
            gender: input.gender,
            created_at: now,
            updated_at: now,
        };
        tables.patients.push(patient.clone());
        Ok(patient)
    }

    async fn update_patient(&self, id: i64, fields: FieldSet) -> OrmResult<Option<Patient>> {
        let fields = fields.touch(PATIENTS.updated_at, Utc::now());
        PATIENTS.check_fields(&fields)?;

        let mut tables = self.tables.write().await;
        let Some(patient) = tables.patients.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let mut updated = patient.clone();
        updated.apply_fields(&fields)?;
        *patient = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_patient(&self, id: i64) -> OrmResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.patients.len();
        tables.patients.retain(|p| p.id != id);
        if tables.patients.len() == before {
            return Ok(false);
        }

        // ON DELETE CASCADE: appointments, then their PRP sessions.
        let removed: Vec<i64> = tables
            .appointments
            .iter()
            .filter(|a| a.patient_id == id)
            .map(|a| a.id)
            .collect();
        tables.appointments.retain(|a| a.patient_id != id);
        tables
            .prp_treatments
            .retain(|t| !removed.contains(&t.appointment_id));
        Ok(true)
    }

    async fn list_doctors(&self) -> OrmResult<Vec<Doctor>> {
        let tables = self.tables.read().await;
        let mut doctors = tables.doctors.clone();
        doctors.sort_by(|a, b| a.last_name.cmp(&b.last_name).then(a.id.cmp(&b.id)));
        Ok(doctors)
    }

    async fn list_appointment_types(&self) -> OrmResult<Vec<AppointmentType>> {
        let tables = self.tables.read().await;
        let mut types = tables.appointment_types.clone();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn list_appointments(&self, filters: &FilterSet) -> OrmResult<Vec<AppointmentDetail>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .appointments
            .iter()
            .filter_map(|a| tables.appointment_detail(a))
            .filter(|d| filters.matches(d))
            .collect();
        rows.sort_by_key(|d| (d.appointment.date, d.appointment.id));
        Ok(rows)
    }

    async fn get_appointment(&self, id: i64) -> OrmResult<Option<AppointmentDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| tables.appointment_detail(a)))
    }

    async fn create_appointment(&self, input: NewAppointment) -> OrmResult<Appointment> {
        let mut tables = self.tables.write().await;
        tables.check_appointment_refs(input.patient_id, input.doctor_id, input.appointment_type_id)?;

        let now = Utc::now();
        let id = tables.sequences.appointments;
        tables.sequences.appointments += 1;

        let appointment = Appointment {
            id,
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            appointment_type_id: input.appointment_type_id,
            date: input.date,
            duration: input.duration,
            status: input.status.as_str().to_string(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        tables.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(&self, id: i64, fields: FieldSet) -> OrmResult<Option<Appointment>> {
        let fields = fields.touch(APPOINTMENTS.updated_at, Utc::now());
        APPOINTMENTS.check_fields(&fields)?;

        let mut tables = self.tables.write().await;
        let Some(current) = tables.appointments.iter().find(|a| a.id == id).cloned() else {
            return Ok(None);
        };
        let mut updated = current;
        updated.apply_fields(&fields)?;
        tables.check_appointment_refs(
            updated.patient_id,
            updated.doctor_id,
            updated.appointment_type_id,
        )?;

        if let Some(slot) = tables.appointments.iter_mut().find(|a| a.id == id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn list_prp_treatments(&self, filters: &FilterSet) -> OrmResult<Vec<PrpTreatment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .prp_treatments
            .iter()
            .filter_map(|t| tables.prp_detail(t))
            .filter(|t| filters.matches(t))
            .collect();
        rows.sort_by_key(|t| Reverse((t.date, t.treatment.id)));
        Ok(rows)
    }

    async fn list_notifications(
        &self,
        user_id: Option<i64>,
        unread_only: bool,
    ) -> OrmResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .notifications
            .iter()
            .filter(|n| n.visible_to(user_id))
            .filter(|n| !unread_only || !n.is_read)
            .cloned()
            .collect();
        rows.sort_by_key(|n| Reverse((n.created_at, n.id)));
        Ok(rows)
    }

    async fn create_notification(&self, input: NewNotification) -> OrmResult<Notification> {
        let mut tables = self.tables.write().await;
        let id = tables.sequences.notifications;
        tables.sequences.notifications += 1;

        let notification = Notification {
            id,
            user_id: input.user_id,
            title: input.title,
            message: input.message,
            kind: input.kind,
            is_read: false,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: i64) -> OrmResult<Option<Notification>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKey;
    use crate::models::AppointmentStatus;
    use crate::value::Value;
    use chrono::TimeZone;

    #[tokio::test]
    async fn seeded_lists_follow_sql_ordering() {
        let store = MemoryStore::seeded();

        let patients = store.list_patients().await.unwrap();
        assert_eq!(patients.first().map(|p| p.id), Some(4));

        let doctors = store.list_doctors().await.unwrap();
        let names: Vec<_> = doctors.iter().map(|d| d.last_name.as_str()).collect();
        assert_eq!(names, vec!["Aydın", "Demir"]);

        let appts = store.list_appointments(&FilterSet::new()).await.unwrap();
        assert!(appts.windows(2).all(|w| w[0].appointment.date <= w[1].appointment.date));

        let prp = store.list_prp_treatments(&FilterSet::new()).await.unwrap();
        assert!(prp.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn update_checks_allow_list_before_lookup() {
        let store = MemoryStore::seeded();
        let err = store.update_patient(999, FieldSet::new()).await.unwrap_err();
        assert!(err.is_empty_update());

        let err = store
            .update_patient(1, FieldSet::new().set("is_admin", true))
            .await
            .unwrap_err();
        assert!(err.is_empty_update());

        let err = store
            .update_patient(1, FieldSet::new().set("last_name", "Demir").set("is_admin", true))
            .await
            .unwrap_err();
        assert!(err.is_schema_violation());

        let missing = store
            .update_patient(999, FieldSet::new().set("first_name", "X"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_stamps_updated_at() {
        let store = MemoryStore::seeded();
        let before = store.get_patient(1).await.unwrap().unwrap();
        let after = store
            .update_patient(1, FieldSet::new().set("email", Value::Null))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.email, None);
        assert_eq!(after.first_name, before.first_name);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn delete_cascades_to_appointments() {
        let store = MemoryStore::seeded();
        assert!(store.delete_patient(1).await.unwrap());
        assert!(!store.delete_patient(1).await.unwrap());

        let filters = FilterSet::new().set(FilterKey::PatientId, 1i64);
        assert!(store.list_appointments(&filters).await.unwrap().is_empty());
        let prp = store.list_prp_treatments(&FilterSet::new()).await.unwrap();
        assert_eq!(prp.len(), 2);
    }

    #[tokio::test]
    async fn create_appointment_checks_references() {
        let store = MemoryStore::seeded();
        let input = NewAppointment {
            patient_id: 42,
            doctor_id: 1,
            appointment_type_id: 1,
            date: Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap(),
            duration: 30,
            status: AppointmentStatus::Pending,
            notes: None,
        };
        let err = store.create_appointment(input.clone()).await.unwrap_err();
        assert!(matches!(err, OrmError::ForeignKeyViolation(_)));

        let created = store
            .create_appointment(NewAppointment {
                patient_id: 2,
                ..input
            })
            .await
            .unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(created.status, "pending");
    }

    #[tokio::test]
    async fn reset_restores_seed() {
        let store = MemoryStore::seeded();
        store.delete_patient(2).await.unwrap();
        store.reset().await;
        assert_eq!(store.list_patients().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn notifications_visibility_and_read_flag() {
        let store = MemoryStore::seeded();
        assert_eq!(store.list_notifications(None, false).await.unwrap().len(), 1);
        assert_eq!(store.list_notifications(Some(1), false).await.unwrap().len(), 3);
        assert_eq!(store.list_notifications(Some(1), true).await.unwrap().len(), 2);

        let read = store.mark_notification_read(2).await.unwrap().unwrap();
        assert!(read.is_read);
        assert_eq!(store.list_notifications(Some(1), true).await.unwrap().len(), 1);
        assert!(store.mark_notification_read(99).await.unwrap().is_none());
    }
}
