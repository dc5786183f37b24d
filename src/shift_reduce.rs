//! Shift-reduce recognizer for assignments and arithmetic expressions.
//!
//! ```text
//! S → VAR = E | E
//! E → E + T | E - T | T
//! T → T * F | T / F | F
//! F → ( E ) | NUMBER | VAR
//! ```
//!
//! There is no LR table. After every shift the engine keeps reducing the top of the
//! stack with the first applicable production, where some productions are gated on
//! the next input token. Every shift and reduction is logged as a [`TraceStep`].
//! Accepted inputs are then evaluated with the recursive-descent evaluator and the
//! parser's [`VariableStore`].

use crate::descent;
use crate::error::ExpressionError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::variables::VariableStore;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NonTerminal {
    F,
    T,
    E,
    S,
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A grammar symbol on the parse stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// The `$` sentinel at the bottom of the stack.
    End,
    Terminal(TokenKind),
    NonTerminal(NonTerminal),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::End => f.write_str("$"),
            Symbol::Terminal(kind) => write!(f, "{kind}"),
            Symbol::NonTerminal(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The productions the engine reduces with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    /// `F → NUMBER`
    Number,
    /// `F → VAR`
    Variable,
    /// `F → ( E )`
    Group,
    /// `T → T * F`
    Multiply,
    /// `T → T / F`
    Divide,
    /// `T → F`
    Factor,
    /// `E → E + T`
    Add,
    /// `E → E - T`
    Subtract,
    /// `E → T`
    Term,
    /// `S → VAR = E`
    Assign,
    /// `S → E`
    Bare,
}

impl Production {
    pub fn lhs(self) -> NonTerminal {
        match self {
            Production::Number | Production::Variable | Production::Group => NonTerminal::F,
            Production::Multiply | Production::Divide | Production::Factor => NonTerminal::T,
            Production::Add | Production::Subtract | Production::Term => NonTerminal::E,
            Production::Assign | Production::Bare => NonTerminal::S,
        }
    }

    pub fn rhs(self) -> &'static [Symbol] {
        use NonTerminal::{E, F, T};
        use Symbol::{NonTerminal as N, Terminal as K};

        match self {
            Production::Number => &[K(TokenKind::Number)],
            Production::Variable => &[K(TokenKind::Ident)],
            Production::Group => &[K(TokenKind::LParen), N(E), K(TokenKind::RParen)],
            Production::Multiply => &[N(T), K(TokenKind::Star), N(F)],
            Production::Divide => &[N(T), K(TokenKind::Slash), N(F)],
            Production::Factor => &[N(F)],
            Production::Add => &[N(E), K(TokenKind::Plus), N(T)],
            Production::Subtract => &[N(E), K(TokenKind::Minus), N(T)],
            Production::Term => &[N(T)],
            Production::Assign => &[K(TokenKind::Ident), K(TokenKind::Equals), N(E)],
            Production::Bare => &[N(E)],
        }
    }

    /// Number of stack symbols the production replaces.
    pub fn arity(self) -> usize {
        self.rhs().len()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs())?;
        self.rhs().iter().try_for_each(|s| write!(f, " {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Shift(TokenKind),
    Reduce(Production),
    Accept,
    Reject,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start => f.write_str("Start"),
            Action::Shift(kind) => write!(f, "Shift {kind}"),
            Action::Reduce(production) => write!(f, "Reduce {production}"),
            Action::Accept => f.write_str("Accept"),
            Action::Reject => f.write_str("Reject"),
        }
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One line of the shift-reduce trace: the stack and remaining input after `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub step: usize,
    pub stack: Vec<Symbol>,
    /// Remaining token texts, terminated by `$`.
    pub input: String,
    pub action: Action,
}

impl TraceStep {
    /// The stack rendered bottom to top, e.g. `$ E + T`.
    pub fn stack_text(&self) -> String {
        render_stack(&self.stack)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub accepted: bool,
    pub trace: Vec<TraceStep>,
}

impl Analysis {
    /// The stack after the last step.
    pub fn final_stack(&self) -> &[Symbol] {
        self.trace
            .last()
            .map(|step| step.stack.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// The assigned variable, for `VAR = E` inputs.
    pub name: Option<String>,
    pub value: f64,
    pub trace: Vec<TraceStep>,
}

/// Shift-reduce parser owning the variables its assignments write.
#[derive(Debug, Default)]
pub struct ShiftReduceParser {
    variables: VariableStore,
}

impl ShiftReduceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser that starts from existing variables.
    pub fn with_variables(variables: VariableStore) -> Self {
        Self { variables }
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }

    /// Recognizes `text` and returns the full trace.
    ///
    /// Lexical errors are returned before a trace exists. Input that does not reduce
    /// to `$ S` is reported as `accepted: false`, with a final `Reject` step.
    pub fn parse(&self, text: &str) -> Result<Analysis, ExpressionError> {
        let tokens = tokenize(text)?;
        Ok(recognize(&tokens))
    }

    /// Recognizes and evaluates `text`. Assignments store their value.
    ///
    /// # Returns
    ///
    /// * `Ok(Evaluation)` with the assigned name (if any), the value and the trace.
    /// * `Err(ExpressionError::NotASentence)` if the input is not accepted.
    /// * `Err(ExpressionError::Evaluation)` if the accepted input cannot be evaluated,
    ///   e.g. on division by zero or an undefined variable.
    pub fn evaluate(&mut self, text: &str) -> Result<Evaluation, ExpressionError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let analysis = recognize(&tokens);
        if !analysis.accepted {
            return Err(ExpressionError::NotASentence {
                stack: render_stack(analysis.final_stack()),
            });
        }

        let (name, expression) = match tokens.as_slice() {
            [Token {
                kind: TokenKind::Ident,
                text,
            }, Token {
                kind: TokenKind::Equals,
                ..
            }, rest @ ..] => (Some(text.clone()), rest),
            all => (None, all),
        };

        let value = descent::evaluate(expression, Some(&self.variables))
            .map_err(|e| ExpressionError::Evaluation(Box::new(e)))?;

        if let Some(name) = &name {
            self.variables.set(name, value);
            log::debug!("{name} = {value:?}");
        }

        Ok(Evaluation {
            name,
            value,
            trace: analysis.trace,
        })
    }
}

/// Runs the shift-reduce loop over `tokens`.
fn recognize(tokens: &[Token]) -> Analysis {
    let mut stack = vec![Symbol::End];
    let mut trace = Vec::new();

    record(&mut trace, &stack, tokens, Action::Start);

    for (i, token) in tokens.iter().enumerate() {
        let rest = &tokens[i + 1..];
        stack.push(Symbol::Terminal(token.kind));
        record(&mut trace, &stack, rest, Action::Shift(token.kind));

        let next = rest.first().map(|t| t.kind);
        while let Some(production) = reduction(&stack, next) {
            reduce(&mut stack, production);
            record(&mut trace, &stack, rest, Action::Reduce(production));
        }
    }

    let last = match stack.as_slice() {
        [.., Symbol::Terminal(TokenKind::Ident), Symbol::Terminal(TokenKind::Equals), Symbol::NonTerminal(NonTerminal::E)] => {
            Some(Production::Assign)
        }
        [.., Symbol::NonTerminal(NonTerminal::E)] => Some(Production::Bare),
        _ => None,
    };

    if let Some(production) = last {
        reduce(&mut stack, production);
        record(&mut trace, &stack, &[], Action::Reduce(production));
    }

    let accepted = stack == [Symbol::End, Symbol::NonTerminal(NonTerminal::S)];
    let action = if accepted { Action::Accept } else { Action::Reject };
    record(&mut trace, &stack, &[], action);

    Analysis { accepted, trace }
}

/// Picks the production to reduce the top of `stack` with, given the next token.
///
/// `E → T` and `E → E ± T` only fire once the expression cannot grow any more, that is
/// when `next` is the end of input, `+`, `-` or `)`. `T → T * F` and `T → T / F` win
/// over `T → F`.
fn reduction(stack: &[Symbol], next: Option<TokenKind>) -> Option<Production> {
    use NonTerminal::{E, F, T};
    use Symbol::{NonTerminal as N, Terminal as K};

    let closes = matches!(
        next,
        None | Some(TokenKind::Plus | TokenKind::Minus | TokenKind::RParen)
    );

    match stack {
        [.., K(TokenKind::Number)] => Some(Production::Number),
        [.., K(TokenKind::Ident)] if next != Some(TokenKind::Equals) => Some(Production::Variable),
        [.., K(TokenKind::LParen), N(E), K(TokenKind::RParen)] => Some(Production::Group),
        [.., N(T), K(TokenKind::Star), N(F)] => Some(Production::Multiply),
        [.., N(T), K(TokenKind::Slash), N(F)] => Some(Production::Divide),
        [.., N(F)] => Some(Production::Factor),
        [.., N(E), K(TokenKind::Plus), N(T)] if closes => Some(Production::Add),
        [.., N(E), K(TokenKind::Minus), N(T)] if closes => Some(Production::Subtract),
        [.., N(T)] if closes => Some(Production::Term),
        _ => None,
    }
}

fn reduce(stack: &mut Vec<Symbol>, production: Production) {
    stack.truncate(stack.len().saturating_sub(production.arity()));
    stack.push(Symbol::NonTerminal(production.lhs()));
}

fn record(trace: &mut Vec<TraceStep>, stack: &[Symbol], rest: &[Token], action: Action) {
    log::trace!("{} | {action}", render_stack(stack));

    let input = rest
        .iter()
        .map(|t| t.text.as_str())
        .chain(std::iter::once("$"))
        .collect::<Vec<_>>()
        .join(" ");

    trace.push(TraceStep {
        step: trace.len(),
        stack: stack.to_vec(),
        input,
        action,
    });
}

fn render_stack(stack: &[Symbol]) -> String {
    stack
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
