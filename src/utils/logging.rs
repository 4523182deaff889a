// src/utils/logging.rs - Logging helpers for the dedupe phases
use log::{debug, info};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loader,
    Finder,
    Session,
    Writer,
}

#[derive(Clone)]
pub struct DedupeLogger {
    phase_name: &'static str,
    phase_emoji: &'static str,
    start_time: Instant,
}

impl DedupeLogger {
    pub fn new(phase: Phase) -> Self {
        let (phase_name, phase_emoji) = match phase {
            Phase::Loader => ("LOADER", "📂"),
            Phase::Finder => ("FINDER", "🔎"),
            Phase::Session => ("SESSION", "🧑"),
            Phase::Writer => ("WRITER", "💾"),
        };
        Self {
            phase_name,
            phase_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, detail: &str) {
        info!(
            "[{}] {} 🚀 Starting: {}",
            self.phase_name, self.phase_emoji, detail
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.phase_name,
                self.phase_emoji,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.phase_name,
                self.phase_emoji,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_filtering_results(
        &self,
        scanned: usize,
        kept: usize,
        blank_name: usize,
        missing_address: usize,
        po_box: usize,
    ) {
        let percent_kept = if scanned > 0 {
            (kept as f64 / scanned as f64) * 100.0
        } else {
            0.0
        };
        info!(
            "[{}] {} 🎯 Record filtering: {} scanned → {} evaluated ({:.1}% kept)",
            self.phase_name, self.phase_emoji, scanned, kept, percent_kept
        );
        if blank_name + missing_address + po_box > 0 {
            info!(
                "[{}] {} 🚫 Filtered out: {} blank names, {} missing street addresses, {} PO boxes",
                self.phase_name, self.phase_emoji, blank_name, missing_address, po_box
            );
        }
    }

    pub fn log_processing_complete(&self, unique_keys: usize, groups: usize, groups_dropped: usize) {
        info!(
            "[{}] {} ✅ Grouping complete: {} unique identity keys → {} candidate sets",
            self.phase_name, self.phase_emoji, unique_keys, groups
        );
        if groups_dropped > 0 {
            info!(
                "[{}] {} ⏭️  {} duplicate groups skipped by the entry-recorded-by filter",
                self.phase_name, self.phase_emoji, groups_dropped
            );
        }
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {} {}", self.phase_name, self.phase_emoji, message);
    }

    pub fn log_completion(&self, summary: &str) {
        info!(
            "[{}] {} 🏁 Completed in {:.2?}: {}",
            self.phase_name,
            self.phase_emoji,
            self.start_time.elapsed(),
            summary
        );
    }
}
