//! Allow-lists of the tables and columns the statement builders may reference.
//!
//! Column names that reach SQL text always come from these static tables,
//! never from request keys.

use crate::error::{OrmError, OrmResult};
use crate::field_set::FieldSet;
use crate::value::Value;

/// Storage kind of an allow-listed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

impl ColumnKind {
    /// Whether a non-null value can be stored in a column of this kind.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ColumnKind::Text, Value::Text(_))
                | (ColumnKind::Integer, Value::Int(_))
                | (ColumnKind::Boolean, Value::Bool(_))
                | (ColumnKind::Timestamp, Value::Timestamp(_) | Value::Date(_))
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Timestamp => "timestamp",
        }
    }
}

/// An allow-listed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// An updatable table and the columns an UPDATE may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    /// Column stamped on every non-empty update.
    pub updated_at: &'static str,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Check a FieldSet against this table's allow-list.
    ///
    /// Fails with [`OrmError::EmptyUpdate`] when no key is a column of this
    /// table, and with [`OrmError::SchemaViolation`] on an unknown column next
    /// to recognized ones, primary key assignment, `NULL` in a non-nullable
    /// column or kind mismatch.
    pub fn check_fields(&self, fields: &FieldSet) -> OrmResult<()> {
        let recognized = fields
            .iter()
            .any(|(name, _)| name == self.primary_key || self.has_column(name));
        if !recognized {
            return Err(OrmError::empty_update(self.name));
        }

        for (name, value) in fields.iter() {
            if name == self.primary_key {
                return Err(OrmError::schema_violation(format!(
                    "primary key '{}' of '{}' cannot be updated",
                    name, self.name
                )));
            }
            let Some(column) = self.column(name) else {
                return Err(OrmError::schema_violation(format!(
                    "unknown column '{}' for table '{}'",
                    name, self.name
                )));
            };
            if value.is_null() {
                if !column.nullable {
                    return Err(OrmError::schema_violation(format!(
                        "column '{}.{}' is not nullable",
                        self.name, name
                    )));
                }
                continue;
            }
            if !column.kind.accepts(value) {
                return Err(OrmError::schema_violation(format!(
                    "column '{}.{}' expects {}, got {}",
                    self.name,
                    name,
                    column.kind.as_str(),
                    value.kind_name()
                )));
            }
        }

        Ok(())
    }
}

pub static PATIENTS: TableSchema = TableSchema {
    name: "patients",
    primary_key: "id",
    columns: &[
        Column::new("first_name", ColumnKind::Text),
        Column::new("last_name", ColumnKind::Text),
        Column::new("phone", ColumnKind::Text),
        Column::nullable("email", ColumnKind::Text),
        Column::nullable("gender", ColumnKind::Text),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
    updated_at: "updated_at",
};

pub static APPOINTMENTS: TableSchema = TableSchema {
    name: "appointments",
    primary_key: "id",
    columns: &[
        Column::new("patient_id", ColumnKind::Integer),
        Column::new("doctor_id", ColumnKind::Integer),
        Column::new("appointment_type_id", ColumnKind::Integer),
        Column::new("date", ColumnKind::Timestamp),
        Column::new("duration", ColumnKind::Integer),
        Column::new("status", ColumnKind::Text),
        Column::nullable("notes", ColumnKind::Text),
        Column::new("updated_at", ColumnKind::Timestamp),
    ],
    updated_at: "updated_at",
};

static UPDATABLE: [&TableSchema; 2] = [&PATIENTS, &APPOINTMENTS];

/// Resolve an updatable table by name.
pub fn table(name: &str) -> OrmResult<&'static TableSchema> {
    UPDATABLE
        .iter()
        .copied()
        .find(|t| t.name == name)
        .ok_or_else(|| OrmError::schema_violation(format!("unknown table '{name}'")))
}
