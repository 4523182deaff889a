// src/utils/constants.rs

/// Source file used when none is given on the command line.
pub const DEFAULT_SOURCE_FILE: &str = "data.csv";

// Column names of the archival repository schema. Header names double as JSON
// keys for the downstream converters, so they are fixed.
pub const NAME_COLUMN: &str = "repository_name_unauthorized";
pub const CITY_COLUMN: &str = "st_city";
pub const STATE_COLUMN: &str = "state";
pub const STREET_ADDRESS_COLUMN: &str = "street_address_1";
pub const ENTRY_RECORDED_BY_COLUMN: &str = "entry_recorded_by";
pub const UPDATED_AT_COLUMN: &str = "date_entry_updated";

/// Timestamp format of `date_entry_recorded` / `date_entry_updated`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Terminal width used when it cannot be detected.
pub const FALLBACK_TERMINAL_WIDTH: usize = 120;
