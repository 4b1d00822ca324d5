//! # clinic-db
//!
//! Data access for the clinic service: allow-list driven statement builders,
//! row types, and two interchangeable stores.
//!
//! ## Features
//!
//! - **Allow-listed SQL**: column and table names in generated SQL come only
//!   from static schemas; every value is bound as a `$n` parameter
//! - **Partial updates**: a [`FieldSet`] keeps absent, `null` and set apart
//! - **Filtered lists**: a [`FilterSet`] appends predicates in a fixed order
//! - **Swappable storage**: [`PgStore`] and [`MemoryStore`] implement the same
//!   [`ClinicStore`] contract
//! - **Statement logging**: every statement goes through `tracing`
//!
//! ## Builder
//!
//! ```ignore
//! use clinic_db::{FieldSet, build_update};
//!
//! let fields = FieldSet::new()
//!     .set("first_name", "Ayşe")
//!     .set("email", clinic_db::Value::Null);
//! let stmt = build_update("patients", 42, &fields)?;
//! // UPDATE patients SET first_name = $1, email = $2 WHERE id = $3 RETURNING *
//! ```
//!
//! ## Stores
//!
//! ```ignore
//! use clinic_db::{ClinicStore, PgStore, create_pool};
//!
//! let store = PgStore::new(create_pool(&database_url)?);
//! let patients = store.search_patients("yılmaz").await?;
//! ```

pub mod changeset;
pub mod client;
pub mod error;
pub mod field_set;
pub mod filter;
pub mod models;
pub mod monitor;
pub mod qb;
pub mod report;
pub mod row;
pub mod schema;
pub mod store;
pub mod validate;
pub mod value;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::{GenericClient, StatementExt};
pub use error::{OrmError, OrmResult};
pub use field_set::FieldSet;
pub use filter::{Comparator, FilterKey, FilterSet, Filterable};
pub use monitor::{LoggedClient, QueryType, SqlLogConfig};
pub use qb::{SelectTemplate, Statement, build_filtered_select, build_update, build_update_for};
pub use report::{DailyEarnings, DateRange, PrpReport, PrpReportQuery};
pub use row::{FromRow, RowExt};
pub use schema::{Column, ColumnKind, TableSchema};
pub use store::{ClinicStore, MemoryStore};
pub use value::{FromValue, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{
    PoolSettings, create_pool, create_pool_with_config, create_pool_with_manager_config,
    create_pool_with_settings,
};

#[cfg(feature = "pool")]
pub use store::PgStore;

#[cfg(feature = "migrate")]
pub mod migrate;
