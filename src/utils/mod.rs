pub mod constants;
pub mod contributor_filter;
pub mod env;
pub mod logging;
pub mod progress_config;
