//! This module provides functions for analyzing Turing Machine programs to detect common errors
//! and inconsistencies before execution. This includes checks for terminal states, the initial
//! state, undefined next states and unreachable states.

use crate::types::{Program, TuringMachineError};
use std::collections::HashSet;

/// Represents various errors that can be found during the analysis of a Turing Machine program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The accept and reject states are the same state.
    ConflictingTerminalStates(String),
    /// Terminal states halt the machine, so they must not carry transitions.
    TerminalStateTransitions(Vec<String>),
    /// Indicates that the initial state is not declared in the rules.
    InvalidStartState(String),
    /// Indicates that transitions reference states that are neither declared nor terminal.
    UndefinedNextStates(Vec<String>),
    /// Indicates declared states that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::ConflictingTerminalStates(state) => TuringMachineError::ValidationError(
                format!("Accept and reject states must differ: {state}"),
            ),
            AnalysisError::TerminalStateTransitions(states) => {
                TuringMachineError::ValidationError(format!(
                    "Terminal states must not define transitions: {states:?}"
                ))
            }
            AnalysisError::InvalidStartState(state) => {
                TuringMachineError::ValidationError(format!("Invalid start state: {state}"))
            }
            AnalysisError::UndefinedNextStates(transitions) => TuringMachineError::ValidationError(
                format!("Transitions reference undefined states: {transitions:?}"),
            ),
            AnalysisError::UnreachableStates(states) => TuringMachineError::ValidationError(
                format!("Unreachable states detected: {states:?}"),
            ),
        }
    }
}

/// Analyzes a given Turing Machine `Program` for structural and logical errors.
///
/// # Arguments
///
/// * `program` - A reference to the `Program` to be analyzed.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` with the first violated check.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    [
        check_terminal_states,
        check_terminal_transitions,
        check_valid_start_state,
        check_undefined_next_states,
        check_unreachable_states,
    ]
    .iter()
    .find_map(|f| f(program).err())
    .map_or(Ok(()), |e| Err(e.into()))
}

fn check_terminal_states(program: &Program) -> Result<(), AnalysisError> {
    if program.accept_state == program.reject_state {
        return Err(AnalysisError::ConflictingTerminalStates(
            program.accept_state.clone(),
        ));
    }

    Ok(())
}

fn check_terminal_transitions(program: &Program) -> Result<(), AnalysisError> {
    let mut states: Vec<String> = program
        .rules
        .keys()
        .filter(|(state, _)| program.is_terminal(state))
        .map(|(state, _)| state.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if !states.is_empty() {
        states.sort();
        return Err(AnalysisError::TerminalStateTransitions(states));
    }

    Ok(())
}

/// Checks whether the initial state is declared as a block in the rules.
fn check_valid_start_state(program: &Program) -> Result<(), AnalysisError> {
    if !program.states.contains(&program.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that all `next_state` references within transitions point to declared states.
///
/// The accept and reject states are implicitly defined and do not need a block.
fn check_undefined_next_states(program: &Program) -> Result<(), AnalysisError> {
    let declared: HashSet<&String> = program.states.iter().collect();

    let mut undefined: Vec<String> = program
        .rules
        .iter()
        .filter(|(_, t)| !declared.contains(&t.next_state) && !program.is_terminal(&t.next_state))
        .map(|((state, symbol), t)| format!("{state}[{symbol}] -> {}", t.next_state))
        .collect();

    if !undefined.is_empty() {
        undefined.sort();
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Checks for unreachable states by performing a depth-first traversal
/// starting from the initial state.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut stack = vec![program.initial_state.as_str()];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }

        for (_, transition) in program.transitions_from(state) {
            if !visited.contains(transition.next_state.as_str()) {
                stack.push(transition.next_state.as_str());
            }
        }
    }

    let mut unreachable: Vec<String> = program
        .states
        .iter()
        .filter(|s| !visited.contains(s.as_str()))
        .cloned()
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort(); // Sort for deterministic output
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}
