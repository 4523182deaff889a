// src/table/columns.rs
use log::{debug, warn};

use super::Table;
use crate::errors::FormatError;
use crate::utils::constants::{
    CITY_COLUMN, ENTRY_RECORDED_BY_COLUMN, NAME_COLUMN, STATE_COLUMN, STREET_ADDRESS_COLUMN,
    UPDATED_AT_COLUMN,
};

/// Which CSV columns play which role during de-duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: String,
    pub city: String,
    pub state: String,
    pub street_address: String,
    pub entry_recorded_by: String,
    pub updated_at: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: NAME_COLUMN.to_string(),
            city: CITY_COLUMN.to_string(),
            state: STATE_COLUMN.to_string(),
            street_address: STREET_ADDRESS_COLUMN.to_string(),
            entry_recorded_by: ENTRY_RECORDED_BY_COLUMN.to_string(),
            updated_at: UPDATED_AT_COLUMN.to_string(),
        }
    }
}

/// Column indices for a particular table. Identity columns are required,
/// the rest are optional and the features using them switch off when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub name: usize,
    pub city: usize,
    pub state: usize,
    pub street_address: Option<usize>,
    pub entry_recorded_by: Option<usize>,
    pub updated_at: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(&self, table: &Table) -> Result<ResolvedColumns, FormatError> {
        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| FormatError::MissingColumn(name.to_string()))
        };
        let optional = |name: &str| {
            let idx = table.column_index(name);
            if idx.is_none() {
                warn!("Column '{}' not found; features that use it are disabled", name);
            }
            idx
        };

        let resolved = ResolvedColumns {
            name: required(&self.name)?,
            city: required(&self.city)?,
            state: required(&self.state)?,
            street_address: optional(&self.street_address),
            entry_recorded_by: optional(&self.entry_recorded_by),
            updated_at: optional(&self.updated_at),
        };
        debug!("Resolved columns: {:?}", resolved);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_map() -> ColumnMap {
        ColumnMap {
            name: "name".into(),
            city: "city".into(),
            state: "state".into(),
            street_address: "address".into(),
            entry_recorded_by: "entry recorded by".into(),
            updated_at: "updated".into(),
        }
    }

    #[test]
    fn test_resolve_required_and_optional() {
        let table = crate::table::tests::sample_table();
        let resolved = short_map().resolve(&table).unwrap();
        assert_eq!(resolved.name, 0);
        assert_eq!(resolved.state, 2);
        assert_eq!(resolved.street_address, Some(3));
        assert_eq!(resolved.entry_recorded_by, None);
        assert_eq!(resolved.updated_at, None);
    }

    #[test]
    fn test_missing_identity_column_is_format_error() {
        let table = crate::table::tests::sample_table();
        let err = ColumnMap::default().resolve(&table).unwrap_err();
        assert!(matches!(err, FormatError::MissingColumn(c) if c == NAME_COLUMN));
    }
}
