use super::{non_blank, parse_id};
use crate::error::OrmResult;
use crate::filter::{FilterKey, FilterSet, Filterable, parse_from_date, parse_to_date};
use crate::row::{FromRow, RowExt};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A row of the `prp_treatments` table. Amounts are whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrpTreatmentRow {
    pub id: i64,
    pub appointment_id: i64,
    pub session_number: i32,
    pub session_count: i32,
    pub price: i64,
    /// Percent.
    pub discount: i64,
    pub total_paid: i64,
    pub notes: Option<String>,
}

/// A PRP treatment joined with its appointment, patient and doctor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrpTreatment {
    #[serde(flatten)]
    pub treatment: PrpTreatmentRow,
    pub date: DateTime<Utc>,
    pub status: String,
    pub doctor_id: i64,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
}

impl FromRow for PrpTreatmentRow {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            appointment_id: row.try_get_column("appointment_id")?,
            session_number: row.try_get_column("session_number")?,
            session_count: row.try_get_column("session_count")?,
            price: row.try_get_column("price")?,
            discount: row.try_get_column("discount")?,
            total_paid: row.try_get_column("total_paid")?,
            notes: row.try_get_column("notes")?,
        })
    }
}

impl FromRow for PrpTreatment {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            treatment: PrpTreatmentRow::from_row(row)?,
            date: row.try_get_column("date")?,
            status: row.try_get_column("status")?,
            doctor_id: row.try_get_column("doctor_id")?,
            patient_first_name: row.try_get_column("patient_first_name")?,
            patient_last_name: row.try_get_column("patient_last_name")?,
            doctor_first_name: row.try_get_column("doctor_first_name")?,
            doctor_last_name: row.try_get_column("doctor_last_name")?,
        })
    }
}

impl Filterable for PrpTreatment {
    fn filter_value(&self, key: FilterKey) -> Value {
        match key {
            FilterKey::FromDate | FilterKey::ToDate => Value::Timestamp(self.date),
            FilterKey::DoctorId => Value::Int(self.doctor_id),
            FilterKey::Status => Value::from(&self.status),
            FilterKey::PatientId => Value::Null,
        }
    }
}

/// Query-string filters for the PRP treatment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrpTreatmentQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub doctor_id: Option<String>,
}

impl PrpTreatmentQuery {
    pub fn to_filter_set(&self) -> OrmResult<FilterSet> {
        let from = non_blank(self.from_date.clone())
            .map(|d| parse_from_date(&d))
            .transpose()?;
        let to = non_blank(self.to_date.clone())
            .map(|d| parse_to_date(&d))
            .transpose()?;

        Ok(FilterSet::new()
            .set_opt(FilterKey::FromDate, from)
            .set_opt(FilterKey::ToDate, to)
            .set_opt(FilterKey::DoctorId, parse_id("doctor_id", self.doctor_id.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_flat() {
        let row = PrpTreatment {
            treatment: PrpTreatmentRow {
                id: 1,
                appointment_id: 5,
                session_number: 1,
                session_count: 3,
                price: 3000,
                discount: 10,
                total_paid: 2700,
                notes: None,
            },
            date: DateTime::<Utc>::UNIX_EPOCH,
            status: "completed".into(),
            doctor_id: 2,
            patient_first_name: "Ayşe".into(),
            patient_last_name: "Yılmaz".into(),
            doctor_first_name: "Mehmet".into(),
            doctor_last_name: "Demir".into(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["total_paid"], 2700);
        assert_eq!(json["appointment_id"], 5);
        assert_eq!(json["doctor_last_name"], "Demir");
    }

    #[test]
    fn query_only_builds_supported_keys() {
        let query = PrpTreatmentQuery {
            from_date: Some("2025-01-01".into()),
            to_date: Some("2025-01-31".into()),
            doctor_id: None,
        };
        let filters = query.to_filter_set().unwrap();
        let keys: Vec<_> = filters.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![FilterKey::FromDate, FilterKey::ToDate]);
    }
}
