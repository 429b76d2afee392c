//! Header resolution by alias.

use crate::roster::reconcile::model::Table;

/// Accepted headers for the login identifier, in priority order.
pub const KEY_ALIASES: &[&str] = &["Login ID", "LoginID", "UserID", "User ID"];

/// Accepted headers for the display name, in priority order.
pub const VALUE_ALIASES: &[&str] = &["User Name", "Username", "User", "Display Name", "Full Name"];

/// Column created on the target when it has no value column yet.
pub const DEFAULT_VALUE_COLUMN: &str = "User Name";

/// Finds the table's actual column for the first matching alias.
///
/// Candidates are tried in order and compared case-insensitively after
/// trimming, so an earlier alias always wins over a later one even when the
/// table carries both. Returns `None` when no candidate matches.
pub fn resolve(table: &Table, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let wanted = candidate.trim().to_lowercase();
        table
            .columns
            .iter()
            .find(|column| column.trim().to_lowercase() == wanted)
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(columns: &[&str]) -> Table {
        Table::new(
            "Sheet1",
            columns.iter().map(|column| column.to_string()).collect(),
        )
    }

    #[test]
    fn matches_case_and_whitespace_insensitively() {
        let table = table_with(&["login id", "Hostname"]);

        assert_eq!(resolve(&table, KEY_ALIASES), Some("login id".to_string()));
        assert_eq!(resolve(&table, &["  LOGIN ID  "]), Some("login id".to_string()));
    }

    #[test]
    fn earlier_candidate_wins_over_later_one() {
        let table = table_with(&["Display Name", "User", "Login ID"]);

        assert_eq!(resolve(&table, VALUE_ALIASES), Some("User".to_string()));
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        let table = table_with(&["Hostname", "Serial"]);

        assert_eq!(resolve(&table, KEY_ALIASES), None);
        assert_eq!(resolve(&table, &[]), None);
    }
}
