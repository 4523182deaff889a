// src/session/edits.rs - Undo log for the set under review
use std::collections::BTreeSet;

use crate::table::{Record, RecordId, Table};

/// One applied change, carrying the record as it was before the change so undo
/// puts back the exact row, source bytes included.
#[derive(Debug, Clone)]
pub enum Edit {
    Transfer { before: Record, column: usize },
    Delete { before: Record },
}

impl Edit {
    pub fn record_id(&self) -> RecordId {
        match self {
            Edit::Transfer { before, .. } | Edit::Delete { before } => before.id(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EditLog {
    edits: Vec<Edit>,
}

impl EditLog {
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// (record, column) of the most recent edit when it was a transfer.
    pub fn last_transfer(&self) -> Option<(RecordId, usize)> {
        match self.edits.last() {
            Some(Edit::Transfer { before, column }) => Some((before.id(), *column)),
            _ => None,
        }
    }

    /// Records that received a transfer and are still in the table.
    pub fn transfer_targets(&self, table: &Table) -> BTreeSet<RecordId> {
        self.edits
            .iter()
            .filter_map(|edit| match edit {
                Edit::Transfer { before, .. } if table.contains(before.id()) => Some(before.id()),
                _ => None,
            })
            .collect()
    }

    /// Revert the most recent edit. Returns the reverted edit, or None when the log is empty.
    pub fn undo(&mut self, table: &mut Table) -> Option<Edit> {
        let edit = self.edits.pop()?;
        match &edit {
            Edit::Transfer { before, .. } => {
                table.replace(before.clone());
            }
            Edit::Delete { before } => {
                table.restore(before.clone());
            }
        }
        Some(edit)
    }
}
