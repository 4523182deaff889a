// src/session/mod.rs - Interactive merge session
//!
//! The review loop is an explicit state machine. Each candidate set is
//! `Presenting` until the operator skips it or deletes all but one of its
//! records, at which point it is `Done` and `advance` moves to the next set.
//! After the last set the session is `SessionComplete`; quitting (or running
//! out of input) ends it as `Aborted`.
//!
//! `apply` is pure state manipulation and is what tests drive; `run` wraps it
//! with rendering and a blocking line read.

pub mod command;
pub mod config;
pub mod edits;
pub mod render;

use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use log::{info, warn};
use std::io::{BufRead, Write};

use crate::errors::{DedupeError, OperatorInputError};
use crate::matching::CandidateSet;
use crate::table::{RecordId, ResolvedColumns, Table, TableWriter};
use crate::utils::constants::TIMESTAMP_FORMAT;
use crate::utils::logging::{DedupeLogger, Phase};

pub use command::{Command, FieldRef};
pub use config::SessionConfig;
use edits::{Edit, EditLog};
use render::{present_members, SetView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Showing set `i` and waiting for a command
    Presenting(usize),
    /// Set `i` is finished; `advance` moves on
    Done(usize),
    SessionComplete,
    Aborted,
}

/// What a successfully applied command asks of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Applied,
    ShowHelp,
    SaveRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every set was reviewed; the table should be written
    Completed,
    /// The operator quit; changes since the last save are abandoned
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub records_deleted: usize,
    pub values_transferred: usize,
    pub undos: usize,
    pub saves: usize,
    pub input_errors: usize,
}

pub struct MergeSession {
    table: Table,
    columns: ResolvedColumns,
    sets: Vec<CandidateSet>,
    state: SessionState,
    edits: EditLog,
    config: SessionConfig,
    stats: SessionStats,
    /// Changes made since the last save
    unsaved: bool,
}

impl MergeSession {
    pub fn new(
        table: Table,
        columns: ResolvedColumns,
        sets: Vec<CandidateSet>,
        config: SessionConfig,
    ) -> Self {
        let state = if sets.is_empty() {
            SessionState::SessionComplete
        } else {
            SessionState::Presenting(0)
        };
        Self {
            table,
            columns,
            sets,
            state,
            edits: EditLog::default(),
            config,
            stats: SessionStats::default(),
            unsaved: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn can_undo(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn current_set(&self) -> Option<&CandidateSet> {
        match self.state {
            SessionState::Presenting(i) | SessionState::Done(i) => self.sets.get(i),
            _ => None,
        }
    }

    /// Apply one operator command to the set being presented. Commands are
    /// ignored in any other state.
    pub fn apply(&mut self, command: Command) -> Result<Effect, OperatorInputError> {
        let SessionState::Presenting(index) = self.state else {
            return Ok(Effect::Applied);
        };
        match command {
            Command::Skip => {
                self.state = SessionState::Done(index);
                Ok(Effect::Applied)
            }
            Command::Previous => {
                // sets already cut down to one record are finished; go past them
                let previous = (0..index)
                    .rev()
                    .find(|i| present_members(&self.sets[*i], &self.table).len() > 1)
                    .ok_or(OperatorInputError::NoPreviousSet)?;
                self.leave_set();
                self.state = SessionState::Presenting(previous);
                Ok(Effect::Applied)
            }
            Command::Delete(numbers) => {
                self.delete(index, &numbers)?;
                Ok(Effect::Applied)
            }
            Command::Transfer { field, from, to } => {
                self.transfer(index, &field, from, to)?;
                Ok(Effect::Applied)
            }
            Command::Undo => {
                self.edits
                    .undo(&mut self.table)
                    .ok_or(OperatorInputError::NothingToUndo)?;
                self.stats.undos += 1;
                self.unsaved = true;
                Ok(Effect::Applied)
            }
            Command::Save => Ok(Effect::SaveRequested),
            Command::Quit => {
                self.state = SessionState::Aborted;
                Ok(Effect::Applied)
            }
            Command::Help => Ok(Effect::ShowHelp),
        }
    }

    /// Leave a finished set: move to the next one, or complete the session.
    pub fn advance(&mut self) {
        if let SessionState::Done(index) = self.state {
            self.leave_set();
            self.state = if index + 1 < self.sets.len() {
                SessionState::Presenting(index + 1)
            } else {
                SessionState::SessionComplete
            };
        }
    }

    /// Called by the run loop after a successful write.
    pub fn mark_saved(&mut self) {
        self.unsaved = false;
        self.stats.saves += 1;
    }

    /// Stamp every record that received a value in this set, then forget the
    /// set's edits. Undo does not reach across sets.
    fn leave_set(&mut self) {
        if let Some(updated_col) = self.columns.updated_at {
            let targets = self.edits.transfer_targets(&self.table);
            if !targets.is_empty() {
                let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
                for id in targets {
                    self.table.set_value(id, updated_col, now.clone());
                }
                self.unsaved = true;
            }
        }
        self.edits.clear();
    }

    /// Resolve a 1-based member number of set `index` to a record still in the table.
    fn member(&self, index: usize, number: usize) -> Result<RecordId, OperatorInputError> {
        let set = &self.sets[index];
        let id = number
            .checked_sub(1)
            .and_then(|i| set.members.get(i))
            .copied()
            .ok_or(OperatorInputError::RecordOutOfRange {
                number,
                size: set.members.len(),
            })?;
        if !self.table.contains(id) {
            return Err(OperatorInputError::RecordDeleted(number));
        }
        Ok(id)
    }

    fn resolve_field(&self, field: &FieldRef) -> Result<usize, OperatorInputError> {
        let columns = self.table.columns();
        match field {
            FieldRef::Number(n) => {
                if *n >= 1 && *n <= columns.len() {
                    Ok(n - 1)
                } else {
                    Err(OperatorInputError::PropertyOutOfRange {
                        number: *n,
                        size: columns.len(),
                    })
                }
            }
            FieldRef::Name(name) => self
                .table
                .column_index(name)
                .or_else(|| columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
                .ok_or_else(|| OperatorInputError::UnknownProperty(name.clone())),
        }
    }

    fn delete(&mut self, index: usize, numbers: &[usize]) -> Result<(), OperatorInputError> {
        let ids = numbers
            .iter()
            .map(|n| self.member(index, *n))
            .collect::<Result<Vec<_>, _>>()?;
        let remaining = present_members(&self.sets[index], &self.table).len();
        if ids.len() >= remaining {
            return Err(OperatorInputError::WouldEmptySet);
        }

        for id in ids {
            if let Some(before) = self.table.remove(id) {
                info!("🗑️  Deleted {} ({})", id, self.sets[index].key);
                self.edits.push(Edit::Delete { before });
                self.stats.records_deleted += 1;
                self.unsaved = true;
            }
        }

        if present_members(&self.sets[index], &self.table).len() <= 1 {
            self.state = SessionState::Done(index);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        index: usize,
        field: &FieldRef,
        from: usize,
        to: usize,
    ) -> Result<(), OperatorInputError> {
        let column = self.resolve_field(field)?;
        let source = self.member(index, from)?;
        let target = self.member(index, to)?;
        if source == target {
            return Err(OperatorInputError::SameRecord(from));
        }

        let value = self
            .table
            .value(source, column)
            .unwrap_or_default()
            .to_string();
        let Some(before) = self.table.get(target).cloned() else {
            return Err(OperatorInputError::RecordDeleted(to));
        };
        self.table.set_value(target, column, value);
        self.edits.push(Edit::Transfer { before, column });
        self.stats.values_transferred += 1;
        self.unsaved = true;
        info!(
            "✏️  Copied '{}' from {} to {}",
            self.table.columns()[column],
            source,
            target
        );
        Ok(())
    }

    /// Drive the review loop until every set is handled or the operator quits.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        writer: &TableWriter,
    ) -> Result<SessionOutcome, DedupeError> {
        let logger = DedupeLogger::new(Phase::Session);
        logger.log_start(&format!("{} candidate sets to review", self.sets.len()));
        let width = self.config.width();
        let mut notice: Option<String> = None;

        loop {
            let index = match self.state {
                SessionState::SessionComplete => {
                    logger.log_completion(&format!("{:?}", self.stats));
                    return Ok(SessionOutcome::Completed);
                }
                SessionState::Aborted => {
                    if self.unsaved {
                        warn!("Quitting with unsaved changes; they are discarded");
                    }
                    logger.log_completion(&format!("aborted, {:?}", self.stats));
                    return Ok(SessionOutcome::Aborted);
                }
                SessionState::Done(_) => {
                    self.advance();
                    continue;
                }
                SessionState::Presenting(i) => i,
            };

            if self.config.clear_screen {
                execute!(output, Clear(ClearType::All), MoveTo(0, 0))?;
            }
            let view = SetView {
                position: index,
                total: self.sets.len(),
                set: &self.sets[index],
                table: &self.table,
                highlight: self.edits.last_transfer(),
            };
            render::render_set(output, &view, width)?;
            if let Some(message) = notice.take() {
                writeln!(output, "{}", message)?;
            }
            render::render_prompt(output, index, self.sets.len(), self.can_undo())?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                info!("End of input; ending session");
                writeln!(output)?;
                self.state = SessionState::Aborted;
                continue;
            }

            match Command::parse(&line).and_then(|command| self.apply(command)) {
                Ok(Effect::Applied) => {}
                Ok(Effect::ShowHelp) => {
                    if self.config.clear_screen {
                        execute!(output, Clear(ClearType::All), MoveTo(0, 0))?;
                    }
                    render::render_help(output)?;
                    output.flush()?;
                    let mut ignored = String::new();
                    input.read_line(&mut ignored)?;
                }
                Ok(Effect::SaveRequested) => {
                    writer.write(&self.table)?;
                    self.mark_saved();
                    notice = Some(format!(
                        "💾 Saved {} records to {}",
                        self.table.len(),
                        writer.destination().display()
                    ));
                }
                Err(e) => {
                    warn!("Invalid command {:?}: {}", line.trim(), e);
                    self.stats.input_errors += 1;
                    notice = Some(format!("⚠️  {}", e));
                }
            }
        }
    }
}
