use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::scan::ColumnBinding;

const SAME_DEFAULT_QUERY: &str = "\
select table_name::text, column_name::text, column_default::text as default_expression
from information_schema.columns
where column_default = $1 and table_schema = $2";

/// Find every column in `schema` sharing the probe's exact default
/// expression, and keep the group only when the sequence backs at least two
/// columns.
///
/// The expression is bound as a query parameter, so defaults containing
/// single quotes (every `regclass` literal does) match their own catalog
/// rows without any escaping.
pub fn find_repeats(
    conn: &mut PgConnection,
    probe: &ColumnBinding,
    schema: &str,
) -> Result<Vec<ColumnBinding>, String> {
    let rows: Vec<ColumnBinding> = diesel::sql_query(SAME_DEFAULT_QUERY)
        .bind::<Text, _>(&probe.default_expression)
        .bind::<Text, _>(schema)
        .load(conn)
        .map_err(|e| {
            format!(
                "failed to look up columns sharing the default of {}.{}: {e}",
                probe.table_name, probe.column_name
            )
        })?;

    Ok(collect_repeats(rows))
}

/// Apply the repeat-counting rule to the probe's equality-group rows.
///
/// The first row is held back until a second one proves the sequence is
/// shared; from then on every row is emitted. A single-row group means the
/// sequence is private to its column and nothing is reported.
fn collect_repeats(rows: Vec<ColumnBinding>) -> Vec<ColumnBinding> {
    let mut repeats = Vec::new();
    let mut first = None;

    for row in rows {
        match first {
            None => first = Some(row),
            Some(ref held) => {
                if repeats.is_empty() {
                    repeats.push(held.clone());
                }
                repeats.push(row);
            }
        }
    }

    repeats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(table: &str, column: &str, default: &str) -> ColumnBinding {
        ColumnBinding {
            table_name: table.to_string(),
            column_name: column.to_string(),
            default_expression: default.to_string(),
        }
    }

    #[test]
    fn no_rows_yield_no_repeats() {
        assert!(collect_repeats(Vec::new()).is_empty());
    }

    #[test]
    fn single_row_group_is_not_a_repeat() {
        let rows = vec![binding("orders", "id", "nextval('orders_id_seq'::regclass)")];
        assert!(collect_repeats(rows).is_empty());
    }

    #[test]
    fn two_row_group_keeps_both_rows_in_order() {
        let seq = "nextval('users_id_seq'::regclass)";
        let rows = vec![binding("users", "id", seq), binding("accounts", "id", seq)];

        let repeats = collect_repeats(rows.clone());
        assert_eq!(repeats, rows);
    }

    #[test]
    fn larger_group_keeps_every_row_exactly_once() {
        let seq = "nextval('shared_seq'::regclass)";
        let rows = vec![
            binding("a", "id", seq),
            binding("b", "id", seq),
            binding("c", "id", seq),
        ];

        let repeats = collect_repeats(rows.clone());
        assert_eq!(
            repeats, rows,
            "the held-back first row must be emitted once, not re-added per later row"
        );
    }
}
