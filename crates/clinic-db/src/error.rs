//! Error types for clinic-db.

use crate::changeset::ValidationErrors;
use thiserror::Error;

pub type OrmResult<T> = Result<T, OrmError>;

#[derive(Debug, Error)]
pub enum OrmError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any driver error without a more specific mapping.
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A referenced patient, doctor, appointment type or appointment does not exist.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A single malformed input value, e.g. an unparseable date filter.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level problems collected from a request body.
    #[error("Validation failed for {} field(s)", .0.len())]
    Invalid(ValidationErrors),

    /// An update payload carried no recognized, defined fields.
    #[error("Nothing to update on '{table}'")]
    EmptyUpdate { table: String },

    /// A table, column or filter key outside the allow-list.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),
}

impl OrmError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn empty_update(table: impl Into<String>) -> Self {
        Self::EmptyUpdate {
            table: table.into(),
        }
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::SchemaViolation(message.into())
    }

    pub fn is_empty_update(&self) -> bool {
        matches!(self, Self::EmptyUpdate { .. })
    }

    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation(_))
    }

    /// Whether the request input caused the error. Retrying the same input fails the same way.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyUpdate { .. }
                | Self::SchemaViolation(_)
                | Self::Validation(_)
                | Self::Invalid(_)
                | Self::UniqueViolation(_)
                | Self::ForeignKeyViolation(_)
                | Self::CheckViolation(_)
        )
    }

    /// Map integrity-constraint SQLSTATEs to their own variants.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db_err) = err.as_db_error() else {
            return Self::Query(err);
        };
        let detail = format!(
            "{}: {}",
            db_err.constraint().unwrap_or("unknown"),
            db_err.message()
        );
        match db_err.code().code() {
            "23505" => Self::UniqueViolation(detail),
            "23503" => Self::ForeignKeyViolation(detail),
            "23514" => Self::CheckViolation(detail),
            _ => Self::Query(err),
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for OrmError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<ValidationErrors> for OrmError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}
