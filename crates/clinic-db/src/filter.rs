//! Recognized list filters and their fixed comparators.
//!
//! A [`FilterSet`] holds at most one value per [`FilterKey`]. Keys are kept in
//! declaration order, so generated predicates do not depend on the order in
//! which a caller supplied them.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Comparison operator attached to a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Gte,
    Lte,
}

impl Comparator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
        }
    }

    /// Whether `actual <op> expected` holds given `actual.compare(expected)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Gte => ordering != Ordering::Less,
            Comparator::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A recognized filter key. Declaration order is emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Status,
    FromDate,
    ToDate,
    PatientId,
    DoctorId,
}

impl FilterKey {
    pub const ALL: [FilterKey; 5] = [
        FilterKey::Status,
        FilterKey::FromDate,
        FilterKey::ToDate,
        FilterKey::PatientId,
        FilterKey::DoctorId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Status => "status",
            FilterKey::FromDate => "from_date",
            FilterKey::ToDate => "to_date",
            FilterKey::PatientId => "patient_id",
            FilterKey::DoctorId => "doctor_id",
        }
    }

    /// The comparator is fixed per key.
    pub fn comparator(self) -> Comparator {
        match self {
            FilterKey::FromDate => Comparator::Gte,
            FilterKey::ToDate => Comparator::Lte,
            FilterKey::Status | FilterKey::PatientId | FilterKey::DoctorId => Comparator::Eq,
        }
    }

    pub fn parse(key: &str) -> OrmResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| OrmError::schema_violation(format!("unknown filter key '{key}'")))
    }
}

/// Rows that can be tested against a [`FilterSet`] in memory.
pub trait Filterable {
    /// The value the filter key compares against for this row.
    fn filter_value(&self, key: FilterKey) -> Value;
}

/// A sparse set of recognized filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: BTreeMap<FilterKey, Value>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter by typed key.
    pub fn set(mut self, key: FilterKey, value: impl Into<Value>) -> Self {
        self.filters.insert(key, value.into());
        self
    }

    /// Set an optional filter (None => skip).
    pub fn set_opt<T: Into<Value>>(self, key: FilterKey, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Set a filter by its string key, rejecting keys outside the allow-list.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> OrmResult<()> {
        let key = FilterKey::parse(key)?;
        self.filters.insert(key, value.into());
        Ok(())
    }

    pub fn get(&self, key: FilterKey) -> Option<&Value> {
        self.filters.get(&key)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filters in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &Value)> {
        self.filters.iter().map(|(k, v)| (*k, v))
    }

    /// Evaluate every predicate against a row, with SQL `NULL` semantics.
    pub fn matches(&self, row: &impl Filterable) -> bool {
        self.iter().all(|(key, expected)| {
            row.filter_value(key)
                .compare(expected)
                .is_some_and(|ord| key.comparator().holds(ord))
        })
    }
}

fn parse_bound(raw: &str, time_of_day: impl Fn(NaiveDate) -> DateTime<Utc>) -> OrmResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(time_of_day)
        .map_err(|_| OrmError::validation(format!("invalid date '{raw}'")))
}

/// Parse a lower date bound. A bare `YYYY-MM-DD` starts at midnight UTC.
pub fn parse_from_date(raw: &str) -> OrmResult<DateTime<Utc>> {
    parse_bound(raw, start_of_day)
}

/// Parse an upper date bound. A bare `YYYY-MM-DD` includes the whole day.
pub fn parse_to_date(raw: &str) -> OrmResult<DateTime<Utc>> {
    parse_bound(raw, end_of_day)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::microseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row {
        status: &'static str,
        doctor_id: i64,
    }

    impl Filterable for Row {
        fn filter_value(&self, key: FilterKey) -> Value {
            match key {
                FilterKey::Status => Value::from(self.status),
                FilterKey::DoctorId => Value::Int(self.doctor_id),
                _ => Value::Null,
            }
        }
    }

    #[test]
    fn comparators_are_fixed() {
        assert_eq!(FilterKey::Status.comparator().as_sql(), "=");
        assert_eq!(FilterKey::FromDate.comparator().as_sql(), ">=");
        assert_eq!(FilterKey::ToDate.comparator().as_sql(), "<=");
        assert_eq!(FilterKey::PatientId.comparator().as_sql(), "=");
        assert_eq!(FilterKey::DoctorId.comparator().as_sql(), "=");
    }

    #[test]
    fn unknown_key_is_schema_violation() {
        let mut filters = FilterSet::new();
        let err = filters.insert("1=1; --", "x").unwrap_err();
        assert!(err.is_schema_violation());
        assert!(filters.is_empty());
    }

    #[test]
    fn iteration_follows_key_order() {
        let mut filters = FilterSet::new();
        filters.insert("to_date", "2025-01-31").unwrap();
        filters.insert("status", "pending").unwrap();
        filters.insert("from_date", "2025-01-01").unwrap();
        let keys: Vec<_> = filters.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![FilterKey::Status, FilterKey::FromDate, FilterKey::ToDate]
        );
    }

    #[test]
    fn matches_uses_comparators() {
        let row = Row {
            status: "pending",
            doctor_id: 2,
        };
        assert!(FilterSet::new().matches(&row));
        assert!(FilterSet::new().set(FilterKey::Status, "pending").matches(&row));
        assert!(!FilterSet::new().set(FilterKey::DoctorId, 1i64).matches(&row));
        // NULL never compares.
        assert!(!FilterSet::new().set(FilterKey::PatientId, 1i64).matches(&row));
    }

    #[test]
    fn bare_dates_cover_whole_days() {
        let from = parse_from_date("2025-01-01").unwrap();
        let to = parse_to_date("2025-01-31").unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_bounds_are_exact() {
        let ts = parse_to_date("2025-01-31T10:00:00+03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 31, 7, 0, 0).unwrap());
    }

    #[test]
    fn garbage_date_is_validation_error() {
        assert!(matches!(
            parse_from_date("yesterday"),
            Err(OrmError::Validation(_))
        ));
    }
}
