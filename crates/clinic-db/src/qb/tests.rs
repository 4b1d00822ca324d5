//! Contract tests for the qb module.

use crate::field_set::FieldSet;
use crate::filter::{FilterKey, FilterSet};
use crate::qb::{
    APPOINTMENTS_SELECT, PRP_TREATMENTS_SELECT, build_filtered_select, build_update, placeholders,
};
use crate::value::Value;
use chrono::{TimeZone, Utc};

#[test]
fn test_update_patient_scenario() {
    let fields = FieldSet::new()
        .set("first_name", "Ayşe")
        .set("email", Value::Null);

    let stmt = build_update("patients", 42, &fields).unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE patients SET first_name = $1, email = $2 WHERE id = $3 RETURNING *"
    );
    assert_eq!(
        stmt.params,
        vec![Value::from("Ayşe"), Value::Null, Value::Int(42)]
    );
}

#[test]
fn test_update_empty_is_rejected() {
    let err = build_update("patients", 42, &FieldSet::new()).unwrap_err();
    assert!(err.is_empty_update());
}

#[test]
fn test_update_placeholders_are_contiguous() {
    let fields = FieldSet::new()
        .set("patient_id", 1i64)
        .set("doctor_id", 2i64)
        .set("duration", 45i64)
        .set("status", "confirmed")
        .set("notes", "bring previous results");

    let stmt = build_update("appointments", 7, &fields).unwrap();
    let mut seen = placeholders(&stmt.sql);
    assert_eq!(seen.len(), fields.len() + 1);
    assert_eq!(stmt.params.len(), fields.len() + 1);

    seen.sort_unstable();
    assert_eq!(seen, (1..=fields.len() + 1).collect::<Vec<_>>());

    // The id is always the last placeholder.
    assert!(stmt.sql.ends_with(&format!("WHERE id = ${} RETURNING *", fields.len() + 1)));
    assert_eq!(stmt.params.last(), Some(&Value::Int(7)));
}

#[test]
fn test_update_values_never_in_sql() {
    let fields = FieldSet::new().set("notes", "'; DROP TABLE appointments; --");
    let stmt = build_update("appointments", 1, &fields).unwrap();
    assert!(!stmt.sql.contains("DROP"));
    assert_eq!(stmt.params[0], Value::from("'; DROP TABLE appointments; --"));
}

#[test]
fn test_update_unknown_column_is_schema_violation() {
    let fields = FieldSet::new()
        .set("first_name", "Ayşe")
        .set("role = 'admin', first_name", "x");
    assert!(build_update("patients", 1, &fields).unwrap_err().is_schema_violation());
}

#[test]
fn test_select_empty_filters_is_base_query() {
    let stmt = build_filtered_select(&APPOINTMENTS_SELECT, &FilterSet::new()).unwrap();
    assert_eq!(stmt.sql, APPOINTMENTS_SELECT.to_sql());
    assert!(stmt.params.is_empty());

    let stmt = build_filtered_select(&PRP_TREATMENTS_SELECT, &FilterSet::new()).unwrap();
    assert_eq!(stmt.sql, PRP_TREATMENTS_SELECT.to_sql());
    assert!(stmt.sql.ends_with("WHERE 1=1 ORDER BY a.date DESC"));
}

#[test]
fn test_select_date_range_order_is_fixed() {
    let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();

    let mut a = FilterSet::new();
    a.insert("to_date", to).unwrap();
    a.insert("from_date", from).unwrap();

    let mut b = FilterSet::new();
    b.insert("from_date", from).unwrap();
    b.insert("to_date", to).unwrap();

    let sa = build_filtered_select(&APPOINTMENTS_SELECT, &a).unwrap();
    let sb = build_filtered_select(&APPOINTMENTS_SELECT, &b).unwrap();
    assert_eq!(sa, sb);
    assert!(sa.sql.ends_with("WHERE 1=1 AND a.date >= $1 AND a.date <= $2 ORDER BY a.date"));
    assert_eq!(sa.params, vec![Value::Timestamp(from), Value::Timestamp(to)]);
}

#[test]
fn test_select_all_filters() {
    let filters = FilterSet::new()
        .set(FilterKey::DoctorId, 2i64)
        .set(FilterKey::PatientId, 9i64)
        .set(FilterKey::Status, "pending");

    let stmt = build_filtered_select(&APPOINTMENTS_SELECT, &filters).unwrap();
    assert!(stmt.sql.contains(
        "WHERE 1=1 AND a.status = $1 AND a.patient_id = $2 AND a.doctor_id = $3 ORDER BY a.date"
    ));
    assert_eq!(placeholders(&stmt.sql), vec![1, 2, 3]);
    assert_eq!(
        stmt.params,
        vec![Value::from("pending"), Value::Int(9), Value::Int(2)]
    );
}

#[test]
fn test_select_prp_doctor_filter() {
    let filters = FilterSet::new().set(FilterKey::DoctorId, 4i64);
    let stmt = build_filtered_select(&PRP_TREATMENTS_SELECT, &filters).unwrap();
    assert!(stmt.sql.ends_with("AND a.doctor_id = $1 ORDER BY a.date DESC"));
    assert_eq!(stmt.params, vec![Value::Int(4)]);
}
