//! Errors reported by the tokenizer and the two expression parsers.

use thiserror::Error;

/// Characters accepted by the tokenizer, shown as a hint after lexical errors.
const LEXICAL_HINT: &str =
    "  Hint: only numbers, variables, operators (+, -, *, /, %, **, ^, =) and parentheses are allowed";

/// Represents the errors an expression can fail with, grouped as lexical, syntax and
/// semantic errors (see [`ExpressionError::category`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// A character no token pattern matches. `position` is the 0-based character index
    /// into the normalized text.
    #[error("Lexical error: invalid character '{character}' at position {position}")]
    Lexical { character: char, position: usize },
    #[error("Expression is empty")]
    Empty,
    /// The input ended while `expected` was still required.
    #[error("Syntax error: expected {expected} but the expression ended unexpectedly")]
    UnexpectedEnd { expected: String },
    /// A token other than `expected` was found.
    #[error("Syntax error: expected {expected} but found '{found}'")]
    UnexpectedToken { expected: String, found: String },
    /// A complete expression was followed by more tokens.
    #[error("Syntax error: trailing characters after valid expression: '{0}'")]
    TrailingInput(String),
    /// The shift-reduce run did not end with `$ S` on the stack.
    #[error("Syntax error: the input does not reduce to S, final stack: {stack}")]
    NotASentence { stack: String },
    #[error("Semantic error: division by zero")]
    DivisionByZero,
    #[error("Semantic error: modulo by zero")]
    ModuloByZero,
    #[error("Semantic error: undefined variable '{0}'")]
    UndefinedVariable(String),
    /// Any failure of the semantic evaluation that follows a shift-reduce recognition.
    #[error("Evaluation error: {0}")]
    Evaluation(Box<ExpressionError>),
}

impl ExpressionError {
    /// Returns `"lexical"`, `"syntax"` or `"semantic"`.
    pub fn category(&self) -> &'static str {
        match self {
            ExpressionError::Lexical { .. } => "lexical",
            ExpressionError::Empty
            | ExpressionError::UnexpectedEnd { .. }
            | ExpressionError::UnexpectedToken { .. }
            | ExpressionError::TrailingInput(_)
            | ExpressionError::NotASentence { .. } => "syntax",
            ExpressionError::DivisionByZero
            | ExpressionError::ModuloByZero
            | ExpressionError::UndefinedVariable(_) => "semantic",
            ExpressionError::Evaluation(inner) => inner.category(),
        }
    }

    /// Renders the error as a list of lines for display. Lexical errors carry a hint
    /// about the accepted characters as a second line.
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];

        if matches!(self, ExpressionError::Lexical { .. }) {
            lines.push(LEXICAL_HINT.to_string());
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_diagnostics() {
        let error = ExpressionError::Lexical {
            character: '$',
            position: 3,
        };

        let lines = error.diagnostics();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Lexical error: invalid character '$' at position 3");
        assert!(lines[1].contains("Hint"));
        assert_eq!(error.category(), "lexical");
    }

    #[test]
    fn test_semantic_messages() {
        assert!(ExpressionError::DivisionByZero
            .to_string()
            .contains("division by zero"));
        assert!(ExpressionError::ModuloByZero
            .to_string()
            .contains("modulo by zero"));
        assert_eq!(ExpressionError::Empty.diagnostics(), vec!["Expression is empty"]);
    }

    #[test]
    fn test_evaluation_wraps_cause() {
        let error = ExpressionError::Evaluation(Box::new(ExpressionError::UndefinedVariable(
            "x".to_string(),
        )));

        assert_eq!(
            error.to_string(),
            "Evaluation error: Semantic error: undefined variable 'x'"
        );
        assert_eq!(error.category(), "semantic");
    }
}
