//! Filtered SELECT builder over fixed query templates.

use crate::error::{OrmError, OrmResult};
use crate::filter::{FilterKey, FilterSet};
use crate::qb::statement::Statement;

/// The always-true clause every template ends with.
const OPEN_WHERE: &str = "WHERE 1=1";

/// A fixed SELECT/JOIN template that filter predicates are appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectTemplate {
    /// Name used in error messages.
    pub name: &'static str,
    /// SELECT ... FROM ... JOIN ... WHERE 1=1
    pub base_sql: &'static str,
    /// ORDER BY expression appended after the predicates.
    pub order_by: &'static str,
    /// Filter keys this template supports and the column each one compares.
    pub filters: &'static [(FilterKey, &'static str)],
}

impl SelectTemplate {
    /// The column a filter key compares against, if the template supports it.
    pub fn column_for(&self, key: FilterKey) -> Option<&'static str> {
        self.filters
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, column)| *column)
    }

    /// The unfiltered statement text.
    pub fn to_sql(&self) -> String {
        format!("{} ORDER BY {}", self.base_sql, self.order_by)
    }
}

macro_rules! appointment_select {
    () => {
        "SELECT a.id, a.patient_id, a.doctor_id, a.appointment_type_id, a.date, a.duration, \
         a.status, a.notes, a.created_at, a.updated_at, \
         p.first_name AS patient_first_name, p.last_name AS patient_last_name, \
         p.phone AS patient_phone, \
         d.first_name AS doctor_first_name, d.last_name AS doctor_last_name, \
         at.name AS appointment_type_name, at.color AS appointment_type_color \
         FROM appointments a \
         JOIN patients p ON a.patient_id = p.id \
         JOIN doctors d ON a.doctor_id = d.id \
         JOIN appointment_types at ON a.appointment_type_id = at.id"
    };
}

/// Appointment detail rows, soonest first.
pub static APPOINTMENTS_SELECT: SelectTemplate = SelectTemplate {
    name: "appointments",
    base_sql: concat!(appointment_select!(), " WHERE 1=1"),
    order_by: "a.date",
    filters: &[
        (FilterKey::Status, "a.status"),
        (FilterKey::FromDate, "a.date"),
        (FilterKey::ToDate, "a.date"),
        (FilterKey::PatientId, "a.patient_id"),
        (FilterKey::DoctorId, "a.doctor_id"),
    ],
};

/// A single appointment detail row by id (`$1`).
pub const APPOINTMENT_BY_ID_SQL: &str = concat!(appointment_select!(), " WHERE a.id = $1");

/// PRP treatments with their appointment, newest first.
pub static PRP_TREATMENTS_SELECT: SelectTemplate = SelectTemplate {
    name: "prp_treatments",
    base_sql: "SELECT pt.id, pt.appointment_id, pt.session_number, pt.session_count, \
               pt.price, pt.discount, pt.total_paid, pt.notes, \
               a.date, a.status, a.doctor_id, \
               p.first_name AS patient_first_name, p.last_name AS patient_last_name, \
               d.first_name AS doctor_first_name, d.last_name AS doctor_last_name \
               FROM prp_treatments pt \
               JOIN appointments a ON pt.appointment_id = a.id \
               JOIN patients p ON a.patient_id = p.id \
               JOIN doctors d ON a.doctor_id = d.id \
               WHERE 1=1",
    order_by: "a.date DESC",
    filters: &[
        (FilterKey::FromDate, "a.date"),
        (FilterKey::ToDate, "a.date"),
        (FilterKey::DoctorId, "a.doctor_id"),
    ],
};

/// Append one `AND <column> <op> $n` per present filter, then the template's ORDER BY.
///
/// Predicates follow [`FilterKey`] order, not the order the caller set them in.
/// An empty FilterSet yields exactly [`SelectTemplate::to_sql`].
///
/// # Errors
/// [`OrmError::SchemaViolation`] when the template does not end in `WHERE 1=1`
/// or does not support one of the filter keys.
pub fn build_filtered_select(template: &SelectTemplate, filters: &FilterSet) -> OrmResult<Statement> {
    if !template.base_sql.trim_end().ends_with(OPEN_WHERE) {
        return Err(OrmError::schema_violation(format!(
            "template '{}' must end with '{OPEN_WHERE}'",
            template.name
        )));
    }

    let mut sql = String::from(template.base_sql);
    let mut params = Vec::with_capacity(filters.len());

    for (key, value) in filters.iter() {
        let column = template.column_for(key).ok_or_else(|| {
            OrmError::schema_violation(format!(
                "filter '{}' is not supported for {}",
                key.as_str(),
                template.name
            ))
        })?;
        params.push(value.clone());
        sql.push_str(&format!(
            " AND {} {} ${}",
            column,
            key.comparator().as_sql(),
            params.len()
        ));
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(template.order_by);

    Ok(Statement::new(sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn templates_end_with_open_where() {
        assert!(APPOINTMENTS_SELECT.base_sql.ends_with(OPEN_WHERE));
        assert!(PRP_TREATMENTS_SELECT.base_sql.ends_with(OPEN_WHERE));
    }

    #[test]
    fn status_and_doctor() {
        let filters = FilterSet::new()
            .set(FilterKey::DoctorId, 3i64)
            .set(FilterKey::Status, "pending");
        let stmt = build_filtered_select(&APPOINTMENTS_SELECT, &filters).unwrap();
        assert!(stmt.sql.ends_with(" AND a.status = $1 AND a.doctor_id = $2 ORDER BY a.date"));
        assert_eq!(stmt.params, vec![Value::from("pending"), Value::Int(3)]);
    }

    #[test]
    fn prp_rejects_status_filter() {
        let filters = FilterSet::new().set(FilterKey::Status, "completed");
        let err = build_filtered_select(&PRP_TREATMENTS_SELECT, &filters).unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn template_without_open_where_is_rejected() {
        let bad = SelectTemplate {
            name: "bad",
            base_sql: "SELECT * FROM patients",
            order_by: "id",
            filters: &[],
        };
        assert!(build_filtered_select(&bad, &FilterSet::new())
            .unwrap_err()
            .is_schema_violation());
    }

    #[test]
    fn by_id_sql_has_single_placeholder() {
        assert!(APPOINTMENT_BY_ID_SQL.ends_with("WHERE a.id = $1"));
    }
}
