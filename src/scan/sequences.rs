use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::scan::ColumnBinding;

// information_schema columns are typed with catalog domains (sql_identifier,
// character_data); the ::text casts pin them to plain text for row decoding.
const SEQUENCE_COLUMNS_QUERY: &str = "\
select table_name::text, column_name::text, column_default::text as default_expression
from information_schema.columns
where column_default like 'nextval%' and table_schema = $1";

/// Find every column in `schema` whose default expression draws from a
/// sequence, i.e. whose catalog default text starts with `nextval`.
///
/// Rows come back in whatever order the catalog stores them; the scan does
/// not sort them.
pub fn find_sequence_columns(
    conn: &mut PgConnection,
    schema: &str,
) -> Result<Vec<ColumnBinding>, String> {
    diesel::sql_query(SEQUENCE_COLUMNS_QUERY)
        .bind::<Text, _>(schema)
        .load(conn)
        .map_err(|e| format!("failed to scan schema '{schema}' for sequence-backed columns: {e}"))
}
