//! This module defines the core data structures and types used by the Turing Machine
//! interpreter, including program representation, transitions, halting outcomes and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// A special input symbol used in program definitions to represent the blank symbol.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a Turing Machine program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default number of steps to execute before the machine is forced to reject.
pub const MAX_EXECUTION_STEPS: usize = 1000;
/// State name used when a program does not declare `accept:`.
pub const DEFAULT_ACCEPT_STATE: &str = "qaccept";
/// State name used when a program does not declare `reject:`.
pub const DEFAULT_REJECT_STATE: &str = "qreject";

/// Key of a transition table: the current state and the symbol under the head.
pub type TransitionKey = (String, char);

/// A deterministic transition table, `δ: (state, symbol) → transition`.
pub type TransitionTable = HashMap<TransitionKey, Transition>;

/// Represents a single-tape, deterministic Turing Machine program.
///
/// A program defines the terminal states, the blank symbol, the step budget
/// and the transition table. The initial state is the first declared state.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The name of the Turing Machine program.
    pub name: String,
    /// The initial state of the Turing Machine.
    pub initial_state: String,
    /// Reaching this state halts the machine and accepts.
    pub accept_state: String,
    /// Reaching this state halts the machine and rejects. Failures also force it.
    pub reject_state: String,
    /// The blank symbol used on the tape.
    pub blank: char,
    /// Number of transitions executed before the run is forced to reject.
    pub max_steps: usize,
    /// Declared states, in declaration order.
    pub states: Vec<String>,
    /// The transition rules keyed by `(state, symbol)`.
    pub rules: TransitionTable,
}

impl Program {
    /// Returns the transition for `state` reading `symbol`, if one is defined.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rules.get(&(state.to_string(), symbol))
    }

    /// Returns `true` if `state` is the accept or the reject state.
    pub fn is_terminal(&self, state: &str) -> bool {
        state == self.accept_state || state == self.reject_state
    }

    /// Iterates over the transitions leaving `state`, sorted by read symbol.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a str,
    ) -> impl Iterator<Item = (char, &'a Transition)> + 'a {
        let mut transitions: Vec<_> = self
            .rules
            .iter()
            .filter(move |((from, _), _)| from == state)
            .map(|((_, symbol), transition)| (*symbol, transition))
            .collect();
        transitions.sort_by_key(|(symbol, _)| *symbol);
        transitions.into_iter()
    }
}

/// Represents a single transition rule: what to write, where to move and the next state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The character written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The next state the machine transitions to.
    pub next_state: String,
    /// Human readable explanation of the rule, shown in the execution history.
    pub note: Option<String>,
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the head offset for this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        write!(f, "{c}")
    }
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine successfully performed a step and continues execution.
    Continue,
    /// The machine has halted.
    Halt(Halt),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The accept state was reached.
    Accept,
    /// The reject state was reached through the transition table.
    Reject,
    /// The machine failed (no transition, exhausted budget) and was forced to reject.
    Err(TuringMachineError),
}

impl Halt {
    /// Returns `true` only for [`Halt::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, Halt::Accept)
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Accept => write!(f, "accepted"),
            Halt::Reject => write!(f, "rejected"),
            Halt::Err(e) => write!(f, "rejected ({e})"),
        }
    }
}

/// One entry of the execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 0 for the initial configuration, then one per executed step.
    pub step: usize,
    /// State after the step.
    pub state: String,
    /// Materialized tape content after the step.
    pub tape: String,
    /// Logical position of the first character of `tape`.
    pub origin: isize,
    /// Logical head position after the step.
    pub head: isize,
    /// Symbol under the head after the step.
    pub symbol: char,
    /// What happened in this step.
    pub action: String,
}

impl Record {
    /// Index of the head inside `tape`, if the head is over the materialized region.
    pub fn head_index(&self) -> Option<usize> {
        usize::try_from(self.head - self.origin)
            .ok()
            .filter(|&i| i < self.tape.chars().count())
    }
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates that there's no rule defined for a particular state and symbol.
    #[error("No transition defined for state {0} and symbol '{1}'")]
    UndefinedTransition(String, char),
    /// Indicates that the step budget ran out before a terminal state was reached.
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    /// Indicates an error during the parsing of a Turing Machine program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a Turing Machine program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations, such as reading program files.
    #[error("File error: {0}")]
    FileError(String),
}
