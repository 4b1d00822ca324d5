//! Ordered column/value pairs destined for an UPDATE statement.

use crate::value::Value;
use chrono::{DateTime, Utc};

/// An ordered set of `column = value` assignments.
///
/// Insertion order decides placeholder numbering. A column that is never set
/// is left unchanged by the update; a column set to [`Value::Null`] is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, Value)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Setting a column twice keeps its first position.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// In-place variant of [`FieldSet::set`].
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Stamp `column` with `now`, but only when something else is being updated.
    ///
    /// An empty set stays empty so it still fails as an empty update.
    pub fn touch(mut self, column: &str, now: DateTime<Utc>) -> Self {
        if !self.is_empty() {
            self.insert(column, now);
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn set_opt_skips_none() {
        let fields = FieldSet::new()
            .set_opt("first_name", Some("Ayşe"))
            .set_opt("last_name", None::<String>);
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains("last_name"));
    }

    #[test]
    fn explicit_null_is_kept() {
        let fields = FieldSet::new().set("email", Value::Null);
        assert_eq!(fields.get("email"), Some(&Value::Null));
    }

    #[test]
    fn resetting_a_column_keeps_position() {
        let fields = FieldSet::new()
            .set("a", 1i64)
            .set("b", 2i64)
            .set("a", 3i64);
        let cols: Vec<_> = fields.iter().map(|(c, v)| (c.to_string(), v.clone())).collect();
        assert_eq!(
            cols,
            vec![("a".into(), Value::Int(3)), ("b".into(), Value::Int(2))]
        );
    }

    #[test]
    fn touch_leaves_empty_set_empty() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
        assert!(FieldSet::new().touch("updated_at", now).is_empty());

        let touched = FieldSet::new().set("status", "confirmed").touch("updated_at", now);
        assert_eq!(touched.len(), 2);
        assert_eq!(touched.get("updated_at"), Some(&Value::Timestamp(now)));
    }
}
