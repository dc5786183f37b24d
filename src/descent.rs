//! Predictive (LL(1)) recursive-descent evaluator.
//!
//! ```text
//! E  → T E'
//! E' → + T E' | - T E' | ε
//! T  → P T'
//! T' → * P T' | / P T' | % P T' | ε
//! P  → F P'
//! P' → ** F P' | ^ F P' | ε
//! F  → ( E ) | NUMBER | - F
//! ```
//!
//! Each nonterminal is one method that evaluates while it parses and appends a line
//! to the derivation trace. When a [`VariableStore`] is bound, `F → VAR` is accepted
//! as well; the shift-reduce engine evaluates through this path.

use crate::error::ExpressionError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::variables::VariableStore;

const NUMBER_OR_PARENTHESIS: &str = "a number or parenthesis";

/// Parses and evaluates arithmetic expressions, keeping the derivation of the last call.
#[derive(Debug, Default)]
pub struct RecursiveDescent {
    derivation: Vec<String>,
}

impl RecursiveDescent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `text`.
    ///
    /// An empty token stream fails with [`ExpressionError::Empty`] without entering
    /// the grammar. A lexical failure is returned as is.
    pub fn parse(&mut self, text: &str) -> Result<f64, ExpressionError> {
        self.derivation.clear();

        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let mut evaluator = Evaluator::new(&tokens, None);
        let result = evaluator.run();
        self.derivation = evaluator.trace;

        log::debug!("recursive descent {text:?}: {result:?}");

        result
    }

    /// Derivation lines recorded by the last call to [`RecursiveDescent::parse`].
    pub fn derivation(&self) -> &[String] {
        &self.derivation
    }
}

/// Evaluates a token stream with variables resolved against `variables`.
pub(crate) fn evaluate(
    tokens: &[Token],
    variables: Option<&VariableStore>,
) -> Result<f64, ExpressionError> {
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    Evaluator::new(tokens, variables).run()
}

struct Evaluator<'a> {
    tokens: &'a [Token],
    position: usize,
    variables: Option<&'a VariableStore>,
    trace: Vec<String>,
}

impl<'a> Evaluator<'a> {
    fn new(tokens: &'a [Token], variables: Option<&'a VariableStore>) -> Self {
        Self {
            tokens,
            position: 0,
            variables,
            trace: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<f64, ExpressionError> {
        self.log(0, "Start of syntactic analysis".to_string());

        let value = self.expression()?;

        if self.position < self.tokens.len() {
            let rest: Vec<&str> = self.tokens[self.position..]
                .iter()
                .map(|t| t.text.as_str())
                .collect();
            return Err(ExpressionError::TrailingInput(rest.join(" ")));
        }

        self.log(0, "Syntactic analysis completed successfully".to_string());
        Ok(value)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn consume(&mut self, expected: TokenKind) -> Result<&'a Token, ExpressionError> {
        match self.peek() {
            None => Err(ExpressionError::UnexpectedEnd {
                expected: format!("'{expected}'"),
            }),
            Some(token) if token.kind != expected => Err(ExpressionError::UnexpectedToken {
                expected: format!("'{expected}'"),
                found: token.text.clone(),
            }),
            Some(token) => {
                self.position += 1;
                Ok(token)
            }
        }
    }

    fn log(&mut self, level: usize, line: String) {
        self.trace.push(format!("{}{line}", "  ".repeat(level)));
    }

    /// E → T E'
    fn expression(&mut self) -> Result<f64, ExpressionError> {
        self.log(1, format!("E → T E' (position {})", self.position));
        let value = self.term()?;
        self.expression_rest(value)
    }

    /// E' → + T E' | - T E' | ε
    fn expression_rest(&mut self, value: f64) -> Result<f64, ExpressionError> {
        match self.peek_kind() {
            Some(TokenKind::Plus) => {
                self.log(2, format!("E' → + T E' (adding {value:?} + ...)"));
                self.consume(TokenKind::Plus)?;
                let rhs = self.term()?;
                self.expression_rest(value + rhs)
            }
            Some(TokenKind::Minus) => {
                self.log(2, format!("E' → - T E' (subtracting {value:?} - ...)"));
                self.consume(TokenKind::Minus)?;
                let rhs = self.term()?;
                self.expression_rest(value - rhs)
            }
            _ => {
                self.log(2, format!("E' → ε (partial result: {value:?})"));
                Ok(value)
            }
        }
    }

    /// T → P T'
    fn term(&mut self) -> Result<f64, ExpressionError> {
        self.log(2, format!("T → P T' (position {})", self.position));
        let value = self.power()?;
        self.term_rest(value)
    }

    /// T' → * P T' | / P T' | % P T' | ε
    fn term_rest(&mut self, value: f64) -> Result<f64, ExpressionError> {
        match self.peek_kind() {
            Some(TokenKind::Star) => {
                self.log(3, format!("T' → * P T' (multiplying {value:?} * ...)"));
                self.consume(TokenKind::Star)?;
                let rhs = self.power()?;
                self.term_rest(value * rhs)
            }
            Some(TokenKind::Slash) => {
                self.log(3, format!("T' → / P T' (dividing {value:?} / ...)"));
                self.consume(TokenKind::Slash)?;
                let divisor = self.power()?;
                if divisor == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                self.term_rest(value / divisor)
            }
            Some(TokenKind::Percent) => {
                self.log(3, format!("T' → % P T' (modulo {value:?} % ...)"));
                self.consume(TokenKind::Percent)?;
                let divisor = self.power()?;
                if divisor == 0.0 {
                    return Err(ExpressionError::ModuloByZero);
                }
                self.term_rest(floored_modulo(value, divisor))
            }
            _ => {
                self.log(3, format!("T' → ε (partial result: {value:?})"));
                Ok(value)
            }
        }
    }

    /// P → F P'
    fn power(&mut self) -> Result<f64, ExpressionError> {
        self.log(3, format!("P → F P' (position {})", self.position));
        let base = self.factor()?;
        self.power_rest(base)
    }

    /// P' → ** F P' | ε
    ///
    /// The exponent is threaded through the rest of the chain first, which makes the
    /// operator right-associative: `2 ** 3 ** 2 = 2 ** 9`.
    fn power_rest(&mut self, base: f64) -> Result<f64, ExpressionError> {
        match self.peek_kind() {
            Some(TokenKind::Power) => {
                self.log(4, format!("P' → ** F P' (power {base:?} ** ...)"));
                self.consume(TokenKind::Power)?;
                let exponent = self.factor()?;
                let exponent = self.power_rest(exponent)?;
                Ok(base.powf(exponent))
            }
            _ => {
                self.log(4, format!("P' → ε (partial result: {base:?})"));
                Ok(base)
            }
        }
    }

    /// F → ( E ) | NUMBER | - F | VAR
    fn factor(&mut self) -> Result<f64, ExpressionError> {
        let token = self.peek().ok_or_else(|| ExpressionError::UnexpectedEnd {
            expected: NUMBER_OR_PARENTHESIS.to_string(),
        })?;

        match token.kind {
            TokenKind::LParen => {
                self.log(4, "F → ( E ) (parenthesized subexpression)".to_string());
                self.consume(TokenKind::LParen)?;
                let value = self.expression()?;
                self.consume(TokenKind::RParen)?;
                Ok(value)
            }
            TokenKind::Number => {
                self.consume(TokenKind::Number)?;
                let value = parse_number(&token.text)?;
                self.log(4, format!("F → {value:?} (number)"));
                Ok(value)
            }
            TokenKind::Minus => {
                self.log(4, "F → - F (negation)".to_string());
                self.consume(TokenKind::Minus)?;
                Ok(-self.factor()?)
            }
            TokenKind::Ident if self.variables.is_some() => {
                self.consume(TokenKind::Ident)?;
                let value = self
                    .variables
                    .and_then(|store| store.get(&token.text))
                    .ok_or_else(|| ExpressionError::UndefinedVariable(token.text.clone()))?;
                self.log(4, format!("F → {} (variable = {value:?})", token.text));
                Ok(value)
            }
            _ => Err(ExpressionError::UnexpectedToken {
                expected: NUMBER_OR_PARENTHESIS.to_string(),
                found: token.text.clone(),
            }),
        }
    }
}

fn parse_number(text: &str) -> Result<f64, ExpressionError> {
    text.parse::<f64>()
        .map_err(|_| ExpressionError::UnexpectedToken {
            expected: "a number".to_string(),
            found: text.to_string(),
        })
}

/// Modulo whose result takes the sign of the divisor.
fn floored_modulo(value: f64, divisor: f64) -> f64 {
    let remainder = value % divisor;
    if remainder != 0.0 && (remainder < 0.0) != (divisor < 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> Result<f64, ExpressionError> {
        RecursiveDescent::new().parse(text)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 2 ** 2"), Ok(14.0));
        assert_eq!(eval("(2 + 3) * 2"), Ok(10.0));
        assert_eq!(eval("10 - 4 - 3"), Ok(3.0));
        assert_eq!(eval("7 / 2"), Ok(3.5));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2 ** 3 ** 2"), Ok(512.0));
        assert_eq!(eval("2 ^ 3 ^ 2"), Ok(512.0));
        assert_eq!(eval("(2 ** 3) ** 2"), Ok(64.0));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-3 + 5"), Ok(2.0));
        assert_eq!(eval("--4"), Ok(4.0));
        assert_eq!(eval("-(1 + 2)"), Ok(-3.0));
        assert_eq!(eval("2 * -3"), Ok(-6.0));
    }

    #[test]
    fn test_floored_modulo() {
        assert_eq!(eval("7 % 3"), Ok(1.0));
        assert_eq!(eval("-7 % 3"), Ok(2.0));
        assert_eq!(eval("7 % -3"), Ok(-2.0));
        assert_eq!(eval("6 % 3"), Ok(0.0));
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(eval("2(3 + 1)"), Ok(8.0));
        assert_eq!(eval("(1 + 1)(2 + 2)"), Ok(8.0));
    }

    #[test]
    fn test_division_by_zero() {
        let error = eval("10 / 0").unwrap_err();

        assert_eq!(error, ExpressionError::DivisionByZero);
        assert!(error.to_string().contains("division by zero"));
    }

    #[test]
    fn test_modulo_by_zero() {
        assert_eq!(eval("10 % (2 - 2)"), Err(ExpressionError::ModuloByZero));
    }

    #[test]
    fn test_empty_expression() {
        let mut parser = RecursiveDescent::new();

        assert_eq!(parser.parse("  "), Err(ExpressionError::Empty));
        assert!(parser.derivation().is_empty());
    }

    #[test]
    fn test_lexical_error() {
        let error = eval("2 + #").unwrap_err();

        assert!(matches!(error, ExpressionError::Lexical { character: '#', .. }));
        assert_eq!(error.diagnostics().len(), 2);
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(
            eval("(1 + 2))"),
            Err(ExpressionError::TrailingInput(")".to_string()))
        );
        assert!(eval("1 2")
            .unwrap_err()
            .to_string()
            .contains("trailing characters after valid expression"));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            eval("(1 + 2"),
            Err(ExpressionError::UnexpectedEnd {
                expected: "')'".to_string()
            })
        );
        assert_eq!(
            eval("1 +"),
            Err(ExpressionError::UnexpectedEnd {
                expected: NUMBER_OR_PARENTHESIS.to_string()
            })
        );
        assert_eq!(
            eval("1 + * 2"),
            Err(ExpressionError::UnexpectedToken {
                expected: NUMBER_OR_PARENTHESIS.to_string(),
                found: "*".to_string()
            })
        );
    }

    #[test]
    fn test_variables_need_a_store() {
        assert!(matches!(
            eval("x + 1"),
            Err(ExpressionError::UnexpectedToken { .. })
        ));

        let mut store = VariableStore::new();
        store.set("x", 4.0);
        let tokens = tokenize("x * 2 + 1").unwrap();

        assert_eq!(evaluate(&tokens, Some(&store)), Ok(9.0));
        assert_eq!(
            evaluate(&tokenize("y").unwrap(), Some(&store)),
            Err(ExpressionError::UndefinedVariable("y".to_string()))
        );
    }

    #[test]
    fn test_derivation_trace() {
        let mut parser = RecursiveDescent::new();
        parser.parse("1 + 2").unwrap();

        let derivation = parser.derivation();
        assert_eq!(derivation.first().unwrap(), "Start of syntactic analysis");
        assert_eq!(derivation[1], "  E → T E' (position 0)");
        assert!(derivation.contains(&"        F → 1.0 (number)".to_string()));
        assert!(derivation.contains(&"    E' → + T E' (adding 1.0 + ...)".to_string()));
        assert!(derivation.contains(&"    E' → ε (partial result: 3.0)".to_string()));
        assert_eq!(
            derivation.last().unwrap(),
            "Syntactic analysis completed successfully"
        );
    }

    #[test]
    fn test_derivation_is_reset_per_call() {
        let mut parser = RecursiveDescent::new();
        parser.parse("1 + 2 + 3").unwrap();
        let long = parser.derivation().len();

        parser.parse("1").unwrap();
        assert!(parser.derivation().len() < long);
    }
}
