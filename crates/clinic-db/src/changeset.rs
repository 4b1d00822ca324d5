//! Changeset-style validation error types.
//!
//! Input structs (`NewPatient`, `AppointmentPatch`, ...) collect every problem
//! into [`ValidationErrors`] instead of stopping at the first one.

use serde::Serialize;

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    Required,
    Range,
    Email,
    OneOf,
    Custom(String),
}

impl ValidationCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Range => "range",
            Self::Email => "email",
            Self::OneOf => "one_of",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl Serialize for ValidationCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.items.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// Record a `required` error when `value` is blank.
    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(ValidationError::new(
                field,
                ValidationCode::Required,
                format!("{field} is required"),
            ));
        }
    }

    /// Record a `required` error when `value` is missing.
    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.push(ValidationError::new(
                field,
                ValidationCode::Required,
                format!("{field} is required"),
            ));
        }
    }

    /// Record a `one_of` error when `value` is not in `allowed`.
    pub fn check_one_of(&mut self, field: &str, value: &str, allowed: &[&str]) {
        if !allowed.contains(&value) {
            self.push(ValidationError::new(
                field,
                ValidationCode::OneOf,
                format!("{field} must be one of: {}", allowed.join(", ")),
            ));
        }
    }

    /// Whether any recorded error is a missing required field.
    pub fn has_missing(&self) -> bool {
        self.iter().any(|e| e.code == ValidationCode::Required)
    }

    /// Record an `email` error when `value` is not an email address.
    pub fn check_email(&mut self, field: &str, value: &str) {
        if !crate::validate::is_email(value) {
            self.push(ValidationError::new(
                field,
                ValidationCode::Email,
                format!("{field} must be a valid email address"),
            ));
        }
    }

    /// Record a `phone` error when `value` does not look like a phone number.
    pub fn check_phone(&mut self, field: &str, value: &str) {
        if !crate::validate::is_phone(value) {
            self.push(ValidationError::new(
                field,
                ValidationCode::Custom("phone".into()),
                format!("{field} must be a valid phone number"),
            ));
        }
    }

    /// Record a `range` error when `value` is not strictly positive.
    pub fn check_positive(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.push(ValidationError::new(
                field,
                ValidationCode::Range,
                format!("{field} must be greater than 0"),
            ));
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}
