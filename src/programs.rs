//! Registry of the built-in Turing Machine programs.
//!
//! The transition tables live as data in `machines/*.tur`. They are embedded at compile
//! time and parsed once, on first access.

use crate::machine::{Execution, TuringMachine};
use crate::types::{Program, TuringMachineError};
use serde::Serialize;

/// Name of the built-in unary addition machine.
pub const UNARY_ADDITION: &str = "Unary addition";
/// Name of the built-in unary multiplication machine.
pub const UNARY_MULTIPLICATION: &str = "Unary multiplication";
/// Name of the built-in `aⁿbⁿcⁿ` recognizer.
pub const ANBNCN: &str = "a^n b^n c^n";
/// Name of the built-in palindrome recognizer.
pub const PALINDROME: &str = "Palindrome";
/// Name of the built-in `aⁿb²ⁿ` recognizer.
pub const ANB2N: &str = "a^n b^2n";

// Default embedded programs
const PROGRAM_TEXTS: [&str; 5] = [
    include_str!("../machines/unary-addition.tur"),
    include_str!("../machines/unary-multiplication.tur"),
    include_str!("../machines/anbncn.tur"),
    include_str!("../machines/palindrome.tur"),
    include_str!("../machines/anb2n.tur"),
];

lazy_static::lazy_static! {
    /// The embedded programs that parsed successfully, paired with their source text.
    pub static ref PROGRAMS: Vec<(&'static str, Program)> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(program) => Some((*text, program)),
            Err(e) => {
                log::warn!("Failed to parse embedded program: {e}");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {index} out of range"))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|(_, program)| program.name == name)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| TuringMachineError::ValidationError(format!("Program '{name}' not found")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|(_, program)| program.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_state: program.initial_state.clone(),
            accept_state: program.accept_state.clone(),
            reject_state: program.reject_state.clone(),
            state_count: program.states.len(),
            transition_count: program.rules.len(),
            max_steps: program.max_steps,
        })
    }

    /// Search for programs by name, case-insensitively
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, (_, program))| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Runs the built-in program `name` on `input` until it halts.
    ///
    /// Fails only when the program is not available.
    pub fn execute(name: &str, input: &str) -> Result<Execution, TuringMachineError> {
        let program = Self::get_program_by_name(name)?;
        let execution = TuringMachine::new(program, input).execute();

        log::debug!(
            "{name} on {input:?}: {} after {} steps",
            execution.halt,
            execution.steps
        );

        Ok(execution)
    }

    /// Get the source text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAMS.get(index).map(|(text, _)| *text).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program text index {index} out of range"))
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub accept_state: String,
    pub reject_state: String,
    pub state_count: usize,
    pub transition_count: usize,
    pub max_steps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Halt, Step};

    #[test]
    fn test_all_programs_are_embedded() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();
        for name in [UNARY_ADDITION, UNARY_MULTIPLICATION, ANBNCN, PALINDROME, ANB2N] {
            assert!(names.contains(&name.to_string()), "missing {name}");
        }
    }

    #[test]
    fn test_programs_can_be_executed() {
        let count = ProgramManager::get_program_count();
        for i in 0..count {
            let program = ProgramManager::get_program_by_index(i).unwrap();
            let program_name = program.name.clone();
            let mut machine = TuringMachine::new(program, "1");

            // A first step either continues or halts through the table
            match machine.step() {
                Step::Continue | Step::Halt(Halt::Accept) | Step::Halt(Halt::Reject) => {}
                Step::Halt(Halt::Err(e)) => {
                    // Recognizers have no rule for '1', that is their rejection path
                    assert!(
                        matches!(e, TuringMachineError::UndefinedTransition(_, '1')),
                        "Program '{program_name}' failed on first step: {e}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        let program = ProgramManager::get_program_by_name(UNARY_ADDITION).unwrap();
        assert_eq!(program.initial_state, "q0");
        assert_eq!(program.accept_state, "qf");

        let multiplication = ProgramManager::get_program_by_name(UNARY_MULTIPLICATION).unwrap();
        assert_eq!(multiplication.max_steps, 100_000);

        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let info = ProgramManager::get_program_info(0).unwrap();
        assert_eq!(info.index, 0);
        assert_eq!(info.name, UNARY_ADDITION);
        assert_eq!(info.state_count, 3);
        assert_eq!(info.transition_count, 5);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_program_manager_search_programs() {
        assert_eq!(ProgramManager::search_programs("unary").len(), 2);
        assert_eq!(ProgramManager::search_programs("PALINDROME").len(), 1);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }

    #[test]
    fn test_execute_unknown_program() {
        let error = ProgramManager::execute("Nonexistent", "").unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
    }

    #[test]
    fn test_program_text_by_index() {
        let text = ProgramManager::get_program_text_by_index(3).unwrap();
        assert!(text.contains("name: Palindrome"));
        assert!(ProgramManager::get_program_text_by_index(999).is_err());
    }
}
