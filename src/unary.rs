//! Unary arithmetic on the built-in machines.
//!
//! A number `n` is written as `n` consecutive `1` cells, operands are separated by the
//! operator symbol. The result is the number of `1` cells left on the tape.

use crate::machine::{Execution, TuringMachine};
use crate::programs::{ProgramManager, UNARY_ADDITION, UNARY_MULTIPLICATION};
use crate::types::TuringMachineError;

/// Computes `a + b` on the tape `1ᵃ+1ᵇ`.
pub fn add_unary(a: usize, b: usize) -> Result<Execution, TuringMachineError> {
    ProgramManager::execute(UNARY_ADDITION, &operands(a, '+', b))
}

/// Computes `a * b` on the tape `1ᵃ*1ᵇ`.
///
/// The copy loop crosses the growing product once per copied digit, so the run takes
/// time quadratic in the tape length. The step budget is sized from the operands and
/// never drops below the program's own limit.
pub fn multiply_unary(a: usize, b: usize) -> Result<Execution, TuringMachineError> {
    let program = ProgramManager::get_program_by_name(UNARY_MULTIPLICATION)?;
    let max_steps = multiplication_budget(a, b).max(program.max_steps);

    let execution = TuringMachine::new(program, &operands(a, '*', b))
        .with_max_steps(max_steps)
        .execute();
    log::debug!(
        "{a} * {b}: {} after {} steps (limit {max_steps})",
        execution.halt,
        execution.steps
    );
    Ok(execution)
}

/// Twice the square of the longest tape the multiplication can use.
fn multiplication_budget(a: usize, b: usize) -> usize {
    let cells = a
        .saturating_mul(b)
        .saturating_add(a)
        .saturating_add(b)
        .saturating_add(2);
    cells.saturating_mul(cells).saturating_mul(2)
}

/// Encodes two operands as the initial tape content.
pub fn operands(a: usize, operator: char, b: usize) -> String {
    format!("{}{operator}{}", "1".repeat(a), "1".repeat(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Halt;

    #[test]
    fn test_operands() {
        assert_eq!(operands(3, '+', 2), "111+11");
        assert_eq!(operands(0, '*', 1), "*1");
    }

    #[test]
    fn test_add_unary() {
        let execution = add_unary(3, 2).unwrap();

        assert_eq!(execution.halt, Halt::Accept);
        assert_eq!(execution.result(), Some(5));
        assert_eq!(execution.tape.trimmed(), "11111");
        assert_eq!(execution.history[0].action, "Initial configuration");
        assert_eq!(execution.history[0].tape, "111+11");
    }

    #[test]
    fn test_add_unary_with_zero() {
        assert_eq!(add_unary(5, 0).unwrap().result(), Some(5));
        assert_eq!(add_unary(0, 4).unwrap().result(), Some(4));
        assert_eq!(add_unary(0, 0).unwrap().result(), Some(0));
    }

    #[test]
    fn test_add_unary_history_notes() {
        let execution = add_unary(1, 1).unwrap();

        assert!(execution
            .history
            .iter()
            .any(|r| r.action == "δ(q0, +) = (q1, 1, R): replace the separator with a 1"));
        assert_eq!(execution.history.last().unwrap().state, "qf");
    }

    #[test]
    fn test_multiply_unary() {
        let execution = multiply_unary(3, 4).unwrap();

        assert!(execution.accepted());
        assert_eq!(execution.result(), Some(12));
        assert_eq!(execution.tape.trimmed(), "1".repeat(12));
    }

    #[test]
    fn test_multiply_unary_small_operands() {
        assert_eq!(multiply_unary(1, 1).unwrap().result(), Some(1));
        assert_eq!(multiply_unary(2, 1).unwrap().result(), Some(2));
        assert_eq!(multiply_unary(0, 5).unwrap().result(), Some(0));
        assert_eq!(multiply_unary(4, 0).unwrap().result(), Some(0));
        assert_eq!(multiply_unary(0, 0).unwrap().result(), Some(0));
    }

    #[test]
    fn test_multiply_unary_largest_operands() {
        let execution = multiply_unary(20, 20).unwrap();

        assert_eq!(execution.halt, Halt::Accept);
        assert_eq!(execution.result(), Some(400));
        assert!(execution.steps > 100_000);
    }

    #[test]
    fn test_multiply_unary_lopsided_operands() {
        assert_eq!(multiply_unary(20, 1).unwrap().result(), Some(20));
        assert_eq!(multiply_unary(1, 20).unwrap().result(), Some(20));
        assert_eq!(multiply_unary(10, 10).unwrap().result(), Some(100));
    }

    #[test]
    fn test_add_unary_largest_operands() {
        let execution = add_unary(20, 20).unwrap();

        assert!(execution.accepted());
        assert_eq!(execution.result(), Some(40));
        assert_eq!(execution.history.len(), execution.steps + 1);
    }

    #[test]
    fn test_multiplication_budget() {
        assert_eq!(multiplication_budget(20, 20), 2 * 442 * 442);
        assert_eq!(multiplication_budget(0, 0), 8);
        assert_eq!(multiplication_budget(usize::MAX, 2), usize::MAX);
    }
}
