// src/session/command.rs - Operator command parsing
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::OperatorInputError;

static DELETE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^d(?:elete)?\s+(\d+(?:\s*[,\s]\s*\d+)*)$").expect("delete pattern is valid")
});

static MOVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^m(?:ove)?\s+(\S+)\s+(\d+)\s*[,\s]\s*(\d+)$").expect("move pattern is valid")
});

/// A property given either by its 1-based number in the display or by column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Number(usize),
    Name(String),
}

/// Record numbers are the 1-based positions shown as "Record k" for the current set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Skip,
    Previous,
    Delete(Vec<usize>),
    Transfer { field: FieldRef, from: usize, to: usize },
    Undo,
    Save,
    Quit,
    Help,
}

impl Command {
    pub fn parse(input: &str) -> Result<Command, OperatorInputError> {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "n" | "next" | "skip" => return Ok(Command::Skip),
            "p" | "prev" | "previous" => return Ok(Command::Previous),
            "u" | "undo" => return Ok(Command::Undo),
            "s" | "save" => return Ok(Command::Save),
            "q" | "quit" => return Ok(Command::Quit),
            "h" | "help" | "?" => return Ok(Command::Help),
            _ => {}
        }

        if let Some(caps) = DELETE_PATTERN.captures(trimmed) {
            let mut numbers = Vec::new();
            for token in caps[1].split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                let n = parse_number(token)?;
                if !numbers.contains(&n) {
                    numbers.push(n);
                }
            }
            return Ok(Command::Delete(numbers));
        }

        if let Some(caps) = MOVE_PATTERN.captures(trimmed) {
            let field = match caps[1].parse::<usize>() {
                Ok(n) => FieldRef::Number(n),
                Err(_) => FieldRef::Name(caps[1].to_string()),
            };
            return Ok(Command::Transfer {
                field,
                from: parse_number(&caps[2])?,
                to: parse_number(&caps[3])?,
            });
        }

        Err(OperatorInputError::UnknownCommand(trimmed.to_string()))
    }
}

fn parse_number(token: &str) -> Result<usize, OperatorInputError> {
    token
        .parse::<usize>()
        .map_err(|_| OperatorInputError::UnknownCommand(token.to_string()))
}
