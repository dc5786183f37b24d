//! This crate provides small formal-language engines: a tokenizer with implicit
//! multiplication, a shift-reduce recognizer and a recursive-descent evaluator for
//! arithmetic expressions, and a single-tape Turing Machine interpreter with built-in
//! machines for unary arithmetic and language recognition.

pub mod analyzer;
pub mod descent;
pub mod error;
pub mod language;
pub mod lexer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod shift_reduce;
pub mod tape;
pub mod types;
pub mod unary;
pub mod variables;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
pub use descent::RecursiveDescent;
pub use error::ExpressionError;
pub use language::{recognize, Language};
pub use lexer::{normalize, tokenize, Token, TokenKind};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
pub use machine::{Execution, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use shift_reduce::{Analysis, Evaluation, ShiftReduceParser, TraceStep};
pub use tape::Tape;
/// Re-exports various types related to Turing Machine definition and execution from the types module.
pub use types::{
    Direction, Halt, Program, Record, Step, Transition, TuringMachineError, MAX_EXECUTION_STEPS,
    MAX_PROGRAM_SIZE,
};
pub use unary::{add_unary, multiply_unary};
pub use variables::VariableStore;
