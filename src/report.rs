use std::fmt::Write;

use crate::scan::ColumnBinding;

/// Every repeated column binding accumulated over one schema scan, in the
/// order the probes emitted them.
#[derive(Debug, Default)]
pub struct RepeatReport {
    entries: Vec<ColumnBinding>,
}

impl RepeatReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one probe's repeat group to the accumulated entries.
    pub fn extend(&mut self, group: Vec<ColumnBinding>) {
        self.entries.extend(group);
    }

    /// True when no probe found a shared sequence.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of accumulated entries. Counts entries, not distinct
    /// sequences: a sequence shared by N columns is probed N times and
    /// contributes N entries per probe.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Render the accumulated entries, or the no-repeats notice when the
    /// scan of `schema` came up empty.
    pub fn render_for_schema(&self, schema: &str) -> String {
        if self.is_empty() {
            return format!("No repeats found for {schema} schema");
        }
        self.render()
    }

    /// Render the `Matches:` listing and the entry total.
    ///
    /// Entries sharing a default expression sit together; a blank line
    /// separates an entry from a predecessor with a different expression,
    /// and the first entry always gets one.
    pub fn render(&self) -> String {
        let mut out = String::from("Matches:\n");
        let mut last_seen: Option<&str> = None;

        for entry in &self.entries {
            if last_seen != Some(entry.default_expression.as_str()) {
                out.push('\n');
            }
            writeln!(
                out,
                "sequence: {})\ttableName: {};\tcolumnName: {};",
                entry.default_expression, entry.table_name, entry.column_name
            )
            .unwrap();
            last_seen = Some(entry.default_expression.as_str());
        }

        out.push('\n');
        write!(out, "Total:{}", self.entries.len()).unwrap();
        out
    }
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
    fn empty_report_renders_the_no_repeats_notice() {
        let report = RepeatReport::new();
        assert!(report.is_empty());
        assert_eq!(
            report.render_for_schema("users"),
            "No repeats found for users schema"
        );
    }

    #[test]
    fn entries_render_one_line_each_with_the_total() {
        let seq = "nextval('users_id_seq'::regclass)";
        let mut report = RepeatReport::new();
        report.extend(vec![binding("users", "id", seq), binding("accounts", "id", seq)]);

        let expected = "Matches:\n\
                        \n\
                        sequence: nextval('users_id_seq'::regclass))\ttableName: users;\tcolumnName: id;\n\
                        sequence: nextval('users_id_seq'::regclass))\ttableName: accounts;\tcolumnName: id;\n\
                        \n\
                        Total:2";
        assert_eq!(report.render_for_schema("public"), expected);
    }

    #[test]
    fn a_blank_line_separates_groups_with_different_expressions() {
        let seq_a = "nextval('a_seq'::regclass)";
        let seq_b = "nextval('b_seq'::regclass)";
        let mut report = RepeatReport::new();
        report.extend(vec![binding("a1", "id", seq_a), binding("a2", "id", seq_a)]);
        report.extend(vec![binding("b1", "id", seq_b), binding("b2", "id", seq_b)]);

        let rendered = report.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Matches:");
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("tableName: a1;"));
        assert!(lines[3].contains("tableName: a2;"));
        assert_eq!(lines[4], "", "expected a separator before the b_seq group");
        assert!(lines[5].contains("tableName: b1;"));
        assert!(lines[6].contains("tableName: b2;"));
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Total:4");
    }

    #[test]
    fn re_emissions_of_the_same_group_are_not_separated() {
        let seq = "nextval('shared_seq'::regclass)";
        let group = vec![binding("x", "id", seq), binding("y", "id", seq)];
        let mut report = RepeatReport::new();
        report.extend(group.clone());
        report.extend(group);

        let rendered = report.render();
        let blank_lines = rendered.lines().filter(|line| line.is_empty()).count();
        assert_eq!(
            blank_lines, 2,
            "only the leading separator and the one before the total, got:\n{rendered}"
        );
        assert!(rendered.ends_with("Total:4"));
    }

    #[test]
    fn rendering_is_a_pure_function_of_the_accumulated_entries() {
        let seq = "nextval('q_seq'::regclass)";
        let mut report = RepeatReport::new();
        report.extend(vec![binding("p", "id", seq), binding("q", "id", seq)]);

        assert_eq!(report.render(), report.render());
        assert_eq!(report.total(), 2);
    }
}
