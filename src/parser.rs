//! This module provides the parser for Turing Machine programs, utilizing the `pest` crate.
//! It defines the grammar for `.tur` files and functions to parse the input into a `Program` struct.

use crate::{
    analyzer::analyze,
    types::{
        Direction, Program, Transition, TransitionTable, TuringMachineError,
        DEFAULT_ACCEPT_STATE, DEFAULT_BLANK_SYMBOL, DEFAULT_REJECT_STATE, INPUT_BLANK_SYMBOL,
        MAX_EXECUTION_STEPS,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the Turing Machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// This is the main entry point for parsing Turing Machine program definitions.
/// It trims the input, parses it using the `TuringMachineParser`, and then processes
/// the resulting parse tree into a structured `Program`. The parsed program is
/// automatically validated before being returned.
///
/// # Arguments
///
/// * `input` - A string slice containing the Turing Machine program definition.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".into()))?;

    let program = parse_program(root)?;

    // Analyze the parsed program
    analyze(&program)?;

    log::debug!(
        "Parsed program '{}' with {} states and {} transitions",
        program.name,
        program.states.len(),
        program.rules.len()
    );

    Ok(program)
}

/// Parses the top-level structure of a Turing Machine program from a `Pair<Rule::program>`.
///
/// Headers precede the `rules:` section, so the blank symbol is known by the time
/// the transitions are read.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut accept: Option<String> = None;
    let mut reject: Option<String> = None;
    let mut limit: Option<usize> = None;
    let mut rules: Option<(Vec<String>, TransitionTable)> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::accept => accept = Some(parse_inner_string(p)),
            Rule::reject => reject = Some(parse_inner_string(p)),
            Rule::limit => limit = Some(parse_limit(p)?),
            Rule::rules => {
                rules = Some(parse_transitions(p, blank.unwrap_or(DEFAULT_BLANK_SYMBOL))?)
            }
            _ => {} // Skip EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let (states, rules) = check_required_rule(rules, "rules")?;
    let initial_state = states.first().cloned().ok_or_else(|| {
        TuringMachineError::ValidationError("The 'rules' section declares no states".into())
    })?;

    Ok(Program {
        name,
        initial_state,
        accept_state: accept.unwrap_or_else(|| DEFAULT_ACCEPT_STATE.to_string()),
        reject_state: reject.unwrap_or_else(|| DEFAULT_REJECT_STATE.to_string()),
        blank: blank.unwrap_or(DEFAULT_BLANK_SYMBOL),
        max_steps: limit.unwrap_or(MAX_EXECUTION_STEPS),
        states,
        rules,
    })
}

/// Creates a `TuringMachineError::ParseError` pointing at `span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

fn parse_limit(pair: Pair<Rule>) -> Result<usize, TuringMachineError> {
    let span = pair.as_span();
    let value = parse_inner_string(pair);

    value
        .parse::<usize>()
        .map_err(|_| parse_error(&format!("Invalid step limit: {value}"), span))
}

/// Parses the transition rules section from a `Pair<Rule::rules>`.
///
/// Returns the declared states in order (the first one is the initial state) and
/// the transition table. Duplicate state blocks and duplicate `(state, symbol)`
/// keys are rejected.
fn parse_transitions(
    pair: Pair<Rule>,
    blank: char,
) -> Result<(Vec<String>, TransitionTable), TuringMachineError> {
    let mut states = Vec::new();
    let mut table = TransitionTable::new();

    for transition_pair in pair.into_inner() {
        let span = transition_pair.as_span();
        let mut pairs = transition_pair.into_inner();
        let state = parse_string(&mut pairs);

        // Prevent duplicated transition rule
        if states.contains(&state) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {state}"),
                span,
            ));
        }

        for action in pairs.filter(|p| p.as_rule() == Rule::action) {
            let span = action.as_span();
            let (read, transition) = parse_action(action, blank)?;

            if table.contains_key(&(state.clone(), read)) {
                return Err(parse_error(
                    &format!("Duplicate transition for state {state} and symbol '{read}'"),
                    span,
                ));
            }

            table.insert((state.clone(), read), transition);
        }

        states.push(state);
    }

    Ok((states, table))
}

/// Parses a single action from a `Pair<Rule::action>`.
///
/// It extracts the read symbol, write symbol (defaults to read if omitted), direction,
/// next state and the optional note.
fn parse_action(pair: Pair<Rule>, blank: char) -> Result<(char, Transition), TuringMachineError> {
    let mut pairs = pair.into_inner();
    let read = rewrite_blank(parse_symbol_from_pairs(&mut pairs), blank);

    // If `write` is omitted, we'll make `write` equal to `read`
    let write = match pairs.peek().map(|p| p.as_rule()) {
        Some(Rule::symbol) => rewrite_blank(parse_symbol_from_pairs(&mut pairs), blank),
        _ => read,
    };

    // The grammar requires a direction in every action
    let direction = parse_direction(pairs.next().unwrap())?;
    let next_state = parse_string(&mut pairs);
    let note = pairs
        .next()
        .map(parse_inner_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok((
        read,
        Transition {
            write,
            direction,
            next_state,
            note,
        },
    ))
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-' or 'S' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        "-" | "S" => Ok(Direction::Stay),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> char {
    let inner = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    inner.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// `_` inside a rule always denotes the program's blank symbol.
fn rewrite_blank(symbol: char, blank: char) -> char {
    if symbol == INPUT_BLANK_SYMBOL {
        blank
    } else {
        symbol
    }
}

/// Parses a single character symbol from a `Pairs` iterator.
fn parse_symbol_from_pairs(pairs: &mut Pairs<Rule>) -> char {
    parse_symbol(&parse_string(pairs))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Checks if a given rule has already been declared, ensuring uniqueness for top-level sections.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::name | Rule::blank | Rule::accept | Rule::reject | Rule::limit | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required rule is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_program() {
        let input = r#"
name: Simple Test
rules:
  start:
    a -> b, R, start
    _ -> _, S, qaccept
"#;

        let program = parse(input).unwrap();
        assert_eq!(program.name, "Simple Test");
        assert_eq!(program.initial_state, "start");
        assert_eq!(program.accept_state, DEFAULT_ACCEPT_STATE);
        assert_eq!(program.reject_state, DEFAULT_REJECT_STATE);
        assert_eq!(program.max_steps, MAX_EXECUTION_STEPS);
        assert_eq!(
            program.transition("start", 'a'),
            Some(&Transition {
                write: 'b',
                direction: Direction::Right,
                next_state: "start".into(),
                note: None,
            })
        );
        assert_eq!(program.rules.len(), 2);
    }

    #[test]
    fn test_parse_headers() {
        let input = r#"
// Comments are allowed anywhere
name: Headers
blank: '#'
accept: done
reject: fail
limit: 42
rules:
  q0:
    _ -> x, L, done
"#;

        let program = parse(input).unwrap();
        assert_eq!(program.blank, '#');
        assert_eq!(program.accept_state, "done");
        assert_eq!(program.reject_state, "fail");
        assert_eq!(program.max_steps, 42);
        // `_` in a rule is rewritten to the declared blank
        assert!(program.transition("q0", '#').is_some());
        assert!(program.transition("q0", '_').is_none());
    }

    #[test]
    fn test_parse_notes_and_comments() {
        let input = r#"
name: Notes
rules:
  q0:
    a -> X, R, q1   # mark the first a
  q1: // trailing comment
    _, S, qaccept
"#;

        let program = parse(input).unwrap();
        assert_eq!(
            program.transition("q0", 'a').unwrap().note.as_deref(),
            Some("mark the first a")
        );
        assert_eq!(program.transition("q1", '_').unwrap().note, None);
        assert_eq!(program.states, vec!["q0", "q1"]);
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
rules:
  start:
    a -> b, R, qaccept
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
rules:
  start:
    a -> b, R, qaccept
"#;
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_transitions() {
        let input = r#"
name: Missing Transitions
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'rules' section"
        );
    }

    #[test]
    fn test_parse_duplicate_transition_rule() {
        let input = r#"
name: Duplicate Transition
rules:
  start:
    a -> b, R, qaccept
  start:
    b -> a, L, start
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate transition rule: start"));
    }

    #[test]
    fn test_parse_duplicate_symbol_in_state() {
        let input = r#"
name: Nondeterministic
rules:
  start:
    a -> b, R, qaccept
    a -> c, L, qreject
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate transition for state start and symbol 'a'"));
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = r#"
name: Bad Direction
rules:
  start:
    a -> b, X, qaccept
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_direction_aliases() {
        let input = r#"
name: Aliases
rules:
  start:
    a -> a, >, start
    b -> b, <, start
    c -> c, -, qaccept
"#;
        let program = parse(input).unwrap();
        assert_eq!(
            program.transition("start", 'a').unwrap().direction,
            Direction::Right
        );
        assert_eq!(
            program.transition("start", 'b').unwrap().direction,
            Direction::Left
        );
        assert_eq!(
            program.transition("start", 'c').unwrap().direction,
            Direction::Stay
        );
    }

    #[test]
    fn test_parse_omitted_write_symbol() {
        let input = r#"
name: Omitted Write
rules:
  start:
    a, R, qaccept
"#;
        let program = parse(input).unwrap();
        let transition = program.transition("start", 'a').unwrap();
        assert_eq!(transition.write, 'a'); // Should write what it read
        assert_eq!(transition.direction, Direction::Right);
        assert_eq!(transition.next_state, "qaccept");
    }

    #[test]
    fn test_parse_quoted_symbols() {
        let input = r#"
name: Quoted
rules:
  start:
    ',' -> ':', R, qaccept
"#;
        let program = parse(input).unwrap();
        assert_eq!(program.transition("start", ',').unwrap().write, ':');
    }

    #[test]
    fn test_parse_syntax_error() {
        let error = parse("name: Broken\nrules:\n  start:\n    a -> b R qaccept").unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_missing_direction() {
        let error = parse("name: Broken\nrules:\n  start:\n    a -> b, qaccept").unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }
}
