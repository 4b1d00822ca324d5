use super::{ClinicStore, like_pattern};
use crate::client::{GenericClient, StatementExt};
use crate::error::OrmResult;
use crate::field_set::FieldSet;
use crate::filter::FilterSet;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentType, Doctor, NewAppointment, NewNotification,
    NewPatient, Notification, Patient, PrpTreatment,
};
use crate::monitor::{LoggedClient, SqlLogConfig};
use crate::qb::{
    APPOINTMENT_BY_ID_SQL, APPOINTMENTS_SELECT, PRP_TREATMENTS_SELECT, Statement,
    build_filtered_select, build_update_for,
};
use crate::schema::{APPOINTMENTS, PATIENTS};
use crate::value::Value;
use chrono::Utc;
use deadpool_postgres::Pool;

const LIST_PATIENTS: &str = "SELECT * FROM patients ORDER BY created_at DESC, id DESC";
const GET_PATIENT: &str = "SELECT * FROM patients WHERE id = $1";
const SEARCH_PATIENTS: &str = "SELECT * FROM patients \
     WHERE first_name ILIKE $1 OR last_name ILIKE $1 OR phone ILIKE $1 \
     ORDER BY created_at DESC, id DESC";
const INSERT_PATIENT: &str = "INSERT INTO patients (first_name, last_name, phone, email, gender) \
     VALUES ($1, $2, $3, $4, $5) RETURNING *";
const DELETE_PATIENT: &str = "DELETE FROM patients WHERE id = $1";
const LIST_DOCTORS: &str = "SELECT * FROM doctors ORDER BY last_name, id";
const LIST_APPOINTMENT_TYPES: &str = "SELECT * FROM appointment_types ORDER BY id";
const INSERT_APPOINTMENT: &str = "INSERT INTO appointments \
     (patient_id, doctor_id, appointment_type_id, date, duration, status, notes) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *";
const LIST_NOTIFICATIONS: &str = "SELECT * FROM notifications WHERE (user_id IS NULL OR user_id = $1)";
const INSERT_NOTIFICATION: &str = "INSERT INTO notifications (user_id, title, message, type) \
     VALUES ($1, $2, $3, $4) RETURNING *";
const MARK_NOTIFICATION_READ: &str =
    "UPDATE notifications SET is_read = true WHERE id = $1 RETURNING *";

/// [`ClinicStore`] over a deadpool-postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
    log: SqlLogConfig,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            log: SqlLogConfig::default(),
        }
    }

    pub fn with_log_config(mut self, log: SqlLogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn client(&self) -> OrmResult<LoggedClient<deadpool_postgres::Client>> {
        let client = self.pool.get().await?;
        Ok(LoggedClient::new(client, self.log.clone()))
    }
}

impl ClinicStore for PgStore {
    async fn list_patients(&self) -> OrmResult<Vec<Patient>> {
        let client = self.client().await?;
        client
            .fetch_all("patients.list", &Statement::raw(LIST_PATIENTS))
            .await
    }

    async fn get_patient(&self, id: i64) -> OrmResult<Option<Patient>> {
        let client = self.client().await?;
        let stmt = Statement::new(GET_PATIENT, vec![Value::Int(id)]);
        client.fetch_opt("patients.get", &stmt).await
    }

    async fn search_patients(&self, term: &str) -> OrmResult<Vec<Patient>> {
        let client = self.client().await?;
        let stmt = Statement::new(SEARCH_PATIENTS, vec![Value::from(like_pattern(term.trim()))]);
        client.fetch_all("patients.search", &stmt).await
    }

    async fn create_patient(&self, input: NewPatient) -> OrmResult<Patient> {
        let client = self.client().await?;
        let stmt = Statement::new(
            INSERT_PATIENT,
            vec![
                Value::from(input.first_name),
                Value::from(input.last_name),
                Value::from(input.phone),
                Value::from(input.email),
                Value::from(input.gender),
            ],
        );
        client.fetch_one("patients.create", &stmt).await
    }

    async fn update_patient(&self, id: i64, fields: FieldSet) -> OrmResult<Option<Patient>> {
        let stmt = build_update_for(&PATIENTS, id, &fields.touch(PATIENTS.updated_at, Utc::now()))?;
        let client = self.client().await?;
        client.fetch_opt("patients.update", &stmt).await
    }

    async fn delete_patient(&self, id: i64) -> OrmResult<bool> {
        let client = self.client().await?;
        let affected = client
            .execute_tagged("patients.delete", DELETE_PATIENT, &[&id])
            .await?;
        Ok(affected > 0)
    }

    async fn list_doctors(&self) -> OrmResult<Vec<Doctor>> {
        let client = self.client().await?;
        client
            .fetch_all("doctors.list", &Statement::raw(LIST_DOCTORS))
            .await
    }

    async fn list_appointment_types(&self) -> OrmResult<Vec<AppointmentType>> {
        let client = self.client().await?;
        client
            .fetch_all("appointment_types.list", &Statement::raw(LIST_APPOINTMENT_TYPES))
            .await
    }

    async fn list_appointments(&self, filters: &FilterSet) -> OrmResult<Vec<AppointmentDetail>> {
        let stmt = build_filtered_select(&APPOINTMENTS_SELECT, filters)?;
        let client = self.client().await?;
        client.fetch_all("appointments.list", &stmt).await
    }

    async fn get_appointment(&self, id: i64) -> OrmResult<Option<AppointmentDetail>> {
        let client = self.client().await?;
        let stmt = Statement::new(APPOINTMENT_BY_ID_SQL, vec![Value::Int(id)]);
        client.fetch_opt("appointments.get", &stmt).await
    }

    async fn create_appointment(&self, input: NewAppointment) -> OrmResult<Appointment> {
        let client = self.client().await?;
        let stmt = Statement::new(
            INSERT_APPOINTMENT,
            vec![
                Value::Int(input.patient_id),
                Value::Int(input.doctor_id),
                Value::Int(input.appointment_type_id),
                Value::Timestamp(input.date),
                Value::from(input.duration),
                Value::from(input.status.as_str()),
                Value::from(input.notes),
            ],
        );
        client.fetch_one("appointments.create", &stmt).await
    }

    async fn update_appointment(&self, id: i64, fields: FieldSet) -> OrmResult<Option<Appointment>> {
        let fields = fields.touch(APPOINTMENTS.updated_at, Utc::now());
        let stmt = build_update_for(&APPOINTMENTS, id, &fields)?;
        let client = self.client().await?;
        client.fetch_opt("appointments.update", &stmt).await
    }

    async fn list_prp_treatments(&self, filters: &FilterSet) -> OrmResult<Vec<PrpTreatment>> {
        let stmt = build_filtered_select(&PRP_TREATMENTS_SELECT, filters)?;
        let client = self.client().await?;
        client.fetch_all("prp_treatments.list", &stmt).await
    }

    async fn list_notifications(
        &self,
        user_id: Option<i64>,
        unread_only: bool,
    ) -> OrmResult<Vec<Notification>> {
        let mut sql = String::from(LIST_NOTIFICATIONS);
        if unread_only {
            sql.push_str(" AND is_read = false");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let client = self.client().await?;
        let stmt = Statement::new(sql, vec![Value::from(user_id)]);
        client.fetch_all("notifications.list", &stmt).await
    }

    async fn create_notification(&self, input: NewNotification) -> OrmResult<Notification> {
        let client = self.client().await?;
        let stmt = Statement::new(
            INSERT_NOTIFICATION,
            vec![
                Value::from(input.user_id),
                Value::from(input.title),
                Value::from(input.message),
                Value::from(input.kind),
            ],
        );
        client.fetch_one("notifications.create", &stmt).await
    }

    async fn mark_notification_read(&self, id: i64) -> OrmResult<Option<Notification>> {
        let client = self.client().await?;
        let stmt = Statement::new(MARK_NOTIFICATION_READ, vec![Value::Int(id)]);
        client.fetch_opt("notifications.mark_read", &stmt).await
    }
}
