//! Statement builders for partial updates and filtered listings.
//!
//! Both builders are pure: they turn a sparse map of caller input into SQL text
//! plus positional parameters without touching a connection. Column names and
//! filter columns always come from static allow-lists, and every value travels
//! as a bound parameter.
//!
//! # Usage
//!
//! ```ignore
//! use clinic_db::qb;
//!
//! // UPDATE patients SET first_name = $1, email = $2 WHERE id = $3 RETURNING *
//! let fields = FieldSet::new()
//!     .set("first_name", "Ayşe")
//!     .set("email", Value::Null);
//! let stmt = qb::build_update("patients", 42, &fields)?;
//!
//! // ... WHERE 1=1 AND a.status = $1 AND a.date >= $2 ORDER BY a.date
//! let filters = FilterSet::new()
//!     .set(FilterKey::Status, "pending")
//!     .set(FilterKey::FromDate, from);
//! let stmt = qb::build_filtered_select(&qb::APPOINTMENTS_SELECT, &filters)?;
//! ```

mod select;
mod statement;
mod update;

pub use select::{
    APPOINTMENT_BY_ID_SQL, APPOINTMENTS_SELECT, PRP_TREATMENTS_SELECT, SelectTemplate,
    build_filtered_select,
};
pub use statement::{Statement, placeholders};
pub use update::{build_update, build_update_for};

#[cfg(test)]
mod tests;
