/// Repeat grouping: equality probe on a column's default expression.
pub mod repeats;
/// Discovery of columns whose default draws from a sequence.
pub mod sequences;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::report::RepeatReport;

/// One schema column together with the literal text of its default-value
/// expression, exactly as `information_schema.columns` reports it.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct ColumnBinding {
    /// Table the column belongs to.
    #[diesel(sql_type = Text)]
    pub table_name: String,
    /// Column name within the table.
    #[diesel(sql_type = Text)]
    pub column_name: String,
    /// Default-value expression, e.g. `nextval('users_id_seq'::regclass)`.
    #[diesel(sql_type = Text)]
    pub default_expression: String,
}

/// Detect sequence repeats for one schema.
///
/// Discovers every sequence-backed column, then probes each one for other
/// columns sharing its exact default expression. Every probe whose sequence
/// backs two or more columns contributes its full group to the report, so a
/// sequence shared by N columns is reported once per probing column. Any
/// query failure aborts the whole scan.
pub fn scan_schema(conn: &mut PgConnection, schema: &str) -> Result<RepeatReport, String> {
    let bindings = sequences::find_sequence_columns(conn, schema)?;

    let mut report = RepeatReport::new();
    for probe in &bindings {
        report.extend(repeats::find_repeats(conn, probe, schema)?);
    }

    Ok(report)
}
