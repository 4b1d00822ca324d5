//! UPDATE statement builder over an allow-listed table.

use crate::error::OrmResult;
use crate::field_set::FieldSet;
use crate::qb::statement::Statement;
use crate::schema::{self, TableSchema};
use crate::value::Value;

/// Build `UPDATE <table> SET c1 = $1, ... WHERE id = $n RETURNING *`.
///
/// `table` must name an updatable table. Placeholders follow the insertion
/// order of `fields`, and the id placeholder comes last.
///
/// # Errors
/// - [`OrmError::SchemaViolation`](crate::OrmError::SchemaViolation) for an unknown
///   table, or an unknown column next to recognized ones
/// - [`OrmError::EmptyUpdate`](crate::OrmError::EmptyUpdate) when `fields` holds no
///   column of the table
pub fn build_update(table: &str, id: i64, fields: &FieldSet) -> OrmResult<Statement> {
    let schema = schema::table(table)?;
    build_update_for(schema, id, fields)
}

/// Typed variant of [`build_update`] for callers that already hold the schema.
pub fn build_update_for(schema: &TableSchema, id: i64, fields: &FieldSet) -> OrmResult<Statement> {
    schema.check_fields(fields)?;

    let mut params = Vec::with_capacity(fields.len() + 1);
    let mut set_parts = Vec::with_capacity(fields.len());

    for (name, value) in fields.iter() {
        // Column text comes from the allow-list, not from the caller's key.
        let column = schema.column(name).map_or(name, |c| c.name);
        params.push(value.clone());
        set_parts.push(format!("{} = ${}", column, params.len()));
    }

    params.push(Value::Int(id));
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        schema.name,
        set_parts.join(", "),
        schema.primary_key,
        params.len()
    );

    Ok(Statement::new(sql, params))
}
