use std::fmt;

use serde::Serialize;

use crate::roster::reconcile::error::Result;
use crate::roster::reconcile::merge::{MergeStats, MergedTable};

/// Number of updated records shown in the summary by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// A (key, value) pair that was written into the target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRow {
    pub key: String,
    pub value: String,
}

/// Summary of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub reference_rows: usize,
    pub target_rows: usize,
    pub stats: MergeStats,
    pub key_column: String,
    pub value_column: String,
    pub sample: Vec<SampleRow>,
}

impl Report {
    /// Collects counts and up to `sample_size` updated records, in table
    /// order.
    pub fn new(
        reference_rows: usize,
        target_rows: usize,
        stats: MergeStats,
        merged: &MergedTable,
        key_column: &str,
        value_column: &str,
        sample_size: usize,
    ) -> Self {
        let sample = merged
            .updated_rows()
            .take(sample_size)
            .map(|row| SampleRow {
                key: row.text(key_column),
                value: row.text(value_column),
            })
            .collect();

        Self {
            reference_rows,
            target_rows,
            stats,
            key_column: key_column.to_string(),
            value_column: value_column.to_string(),
            sample,
        }
    }

    /// Human-readable summary, see the [`Display`](fmt::Display) impl.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// The same data as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The sample section is left out when nothing was updated.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reference rows: {}", self.reference_rows)?;
        writeln!(f, "Target rows: {}", self.target_rows)?;
        writeln!(f)?;
        writeln!(f, "Update Summary:")?;
        writeln!(f, "- Records with key: {}", self.stats.records_with_key)?;
        writeln!(f, "- Records updated from reference: {}", self.stats.updated)?;
        writeln!(f, "- Keys with no match: {}", self.stats.no_match)?;

        if self.stats.updated == 0 || self.sample.is_empty() {
            return Ok(());
        }

        let width = self
            .sample
            .iter()
            .map(|row| row.key.chars().count())
            .chain(std::iter::once(self.key_column.chars().count()))
            .max()
            .unwrap_or(0);

        writeln!(f)?;
        writeln!(f, "Sample of updated records:")?;
        writeln!(f, "{:<width$}  {}", self.key_column, self.value_column)?;
        for row in &self.sample {
            writeln!(f, "{:<width$}  {}", row.key, row.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::reconcile::model::Table;

    fn merged() -> MergedTable {
        MergedTable {
            table: Table::from_text_rows(
                "Hosts",
                &["Login ID", "User Name"],
                &[&["jdoe", "Jane Doe"], &["nomatch", ""], &["asmith", "Alex Smith"]],
            ),
            matched: vec![true, false, true],
        }
    }

    fn stats() -> MergeStats {
        MergeStats {
            records_with_key: 3,
            updated: 2,
            no_match: 1,
        }
    }

    #[test]
    fn render_lists_counts_and_sample() {
        let report = Report::new(4, 3, stats(), &merged(), "Login ID", "User Name", 5);

        let text = report.render();

        assert!(text.contains("Reference rows: 4"));
        assert!(text.contains("Target rows: 3"));
        assert!(text.contains("- Records with key: 3"));
        assert!(text.contains("- Records updated from reference: 2"));
        assert!(text.contains("- Keys with no match: 1"));
        assert!(text.contains("Login ID  User Name"));
        assert!(text.contains("jdoe      Jane Doe"));
        assert!(!text.contains("nomatch"));
    }

    #[test]
    fn sample_is_capped() {
        let report = Report::new(4, 3, stats(), &merged(), "Login ID", "User Name", 1);

        assert_eq!(
            report.sample,
            vec![SampleRow {
                key: "jdoe".into(),
                value: "Jane Doe".into()
            }]
        );
    }

    #[test]
    fn no_sample_section_without_updates() {
        let merged = MergedTable {
            table: Table::from_text_rows("Hosts", &["Login ID"], &[&["x"]]),
            matched: vec![false],
        };
        let stats = MergeStats {
            records_with_key: 1,
            updated: 0,
            no_match: 1,
        };

        let report = Report::new(0, 1, stats, &merged, "Login ID", "User Name", 5);

        assert!(!report.render().contains("Sample of updated records"));
    }

    #[test]
    fn json_carries_stats() {
        let report = Report::new(4, 3, stats(), &merged(), "Login ID", "User Name", 5);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("serialised")).expect("parsed");

        assert_eq!(json["stats"]["updated"], 2);
        assert_eq!(json["sample"][1]["key"], "asmith");
    }
}
