//! Attribution-based filtering for duplicate detection.
//! Restricts the report to duplicate sets that involve records entered by a given person.

use log::{debug, info, warn};

use crate::table::{RecordId, ResolvedColumns, Table};

#[derive(Debug, Clone, Default)]
pub struct EntryRecordedByFilter {
    pub recorded_by: Option<String>,
}

impl EntryRecordedByFilter {
    pub fn new(recorded_by: Option<String>) -> Self {
        let recorded_by = recorded_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        debug!("Entry-recorded-by filter config: {:?}", recorded_by);
        Self { recorded_by }
    }

    /// Check if filtering is effectively enabled
    pub fn is_active(&self) -> bool {
        self.recorded_by.is_some()
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        match &self.recorded_by {
            Some(person) => {
                info!("🔍 Entry-recorded-by filtering ENABLED");
                info!("   Only reporting duplicates involving records entered by: {}", person);
            }
            None => info!("🔍 Entry-recorded-by filtering DISABLED - reporting all duplicates"),
        }
    }

    /// Whether a single record was entered by the configured person.
    /// Always true when the filter is inactive.
    pub fn matches_record(&self, table: &Table, columns: &ResolvedColumns, id: RecordId) -> bool {
        let Some(person) = &self.recorded_by else {
            return true;
        };
        let Some(column) = columns.entry_recorded_by else {
            return false;
        };
        table
            .value(id, column)
            .map_or(false, |value| value.trim() == person)
    }

    /// A group passes when at least one of its members was entered by the configured person.
    pub fn matches_group(&self, table: &Table, columns: &ResolvedColumns, members: &[RecordId]) -> bool {
        !self.is_active()
            || members
                .iter()
                .any(|id| self.matches_record(table, columns, *id))
    }

    /// Warn when the configured person never appears in the table, which usually
    /// means a typo in the name.
    pub fn validate(&self, table: &Table, columns: &ResolvedColumns) {
        let Some(person) = &self.recorded_by else {
            return;
        };
        if columns.entry_recorded_by.is_none() {
            warn!("⚠️ No entry-recorded-by column in the table; no duplicates will be reported");
            return;
        }
        let count = table
            .records()
            .filter(|r| self.matches_record(table, columns, r.id()))
            .count();
        if count == 0 {
            warn!("⚠️ No records were entered by '{}'. Check the spelling.", person);
        } else {
            info!("✅ {} records entered by '{}'", count, person);
        }
    }
}
