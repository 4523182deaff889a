// src/utils/progress_config.rs

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Duration;

/// Configuration for progress bars while scanning the table
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Refresh rate for progress bars in milliseconds
    pub refresh_rate_ms: u64,
    /// Tables smaller than this scan too fast for a bar to be useful
    pub min_rows: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate_ms: 100,
            min_rows: 5_000,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("PROGRESS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            refresh_rate_ms: env::var("PROGRESS_REFRESH_RATE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_rate_ms),
            min_rows: env::var("PROGRESS_MIN_ROWS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_rows),
        }
    }

    /// A bar for `len` rows, or None when progress is disabled or the table is small.
    pub fn create_bar(&self, len: usize, message: &str) -> Option<ProgressBar> {
        if !self.enabled || len < self.min_rows {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(self.refresh_rate_ms));
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProgressConfig::default();
        assert!(config.enabled);
        assert_eq!(config.refresh_rate_ms, 100);
        assert_eq!(config.min_rows, 5_000);
    }

    #[test]
    fn test_bar_creation() {
        let mut config = ProgressConfig::default();

        // Should not create a bar for small tables
        assert!(config.create_bar(10, "scanning").is_none());

        config.min_rows = 0;
        let bar = config.create_bar(10, "scanning");
        assert!(bar.is_some());
        if let Some(pb) = bar {
            pb.finish_and_clear();
        }

        // Should not create a bar when disabled
        config.enabled = false;
        assert!(config.create_bar(10, "scanning").is_none());
    }
}
