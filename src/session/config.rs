// src/session/config.rs

use std::env;

use crate::utils::constants::FALLBACK_TERMINAL_WIDTH;

/// How the review screen is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Clear the terminal before drawing each set
    pub clear_screen: bool,
    /// Fixed width in columns; None asks the terminal
    pub terminal_width: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clear_screen: true,
            terminal_width: None,
        }
    }
}

impl SessionConfig {
    /// Create session configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            clear_screen: env::var("DEDUPE_CLEAR_SCREEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            terminal_width: env::var("DEDUPE_TERMINAL_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Plain output for scripted runs and tests.
    pub fn plain(width: usize) -> Self {
        Self {
            clear_screen: false,
            terminal_width: Some(width),
        }
    }

    pub fn width(&self) -> usize {
        self.terminal_width
            .or_else(|| {
                crossterm::terminal::size()
                    .ok()
                    .map(|(cols, _)| cols as usize)
                    .filter(|cols| *cols > 0)
            })
            .unwrap_or(FALLBACK_TERMINAL_WIDTH)
    }
}
