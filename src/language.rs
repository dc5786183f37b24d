//! Language recognition on the built-in machines.

use crate::machine::{Execution, TuringMachine};
use crate::programs::{ProgramManager, ANB2N, ANBNCN, PALINDROME};
use crate::types::TuringMachineError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A language decided by one of the built-in recognizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// `{aⁿbⁿcⁿ | n ≥ 0}`
    AnBnCn,
    /// Palindromes over `{a, b}`, including the empty word.
    Palindrome,
    /// `{aⁿb²ⁿ | n ≥ 1}`
    AnB2n,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::AnBnCn, Language::Palindrome, Language::AnB2n];

    /// The short tag used to select the language.
    pub fn tag(self) -> &'static str {
        match self {
            Language::AnBnCn => "anbncn",
            Language::Palindrome => "palindrome",
            Language::AnB2n => "anb2n",
        }
    }

    /// Name of the built-in program recognizing this language.
    pub fn program_name(self) -> &'static str {
        match self {
            Language::AnBnCn => ANBNCN,
            Language::Palindrome => PALINDROME,
            Language::AnB2n => ANB2N,
        }
    }

    /// The input symbols of the language. Everything else, the blank included, is
    /// rejected before the recognizer runs.
    pub fn alphabet(self) -> &'static [char] {
        match self {
            Language::AnBnCn => &['a', 'b', 'c'],
            Language::Palindrome | Language::AnB2n => &['a', 'b'],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.tag() == s)
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!(
                    "Unknown language '{s}', expected one of: anbncn, palindrome, anb2n"
                ))
            })
    }
}

/// Runs the recognizer for `language` with `input` on the tape.
///
/// Words outside the language are reported through the returned [`Execution`]; `Err`
/// only means the recognizer is not available. A word containing a symbol outside the
/// alphabet is rejected without executing a transition.
pub fn recognize(language: Language, input: &str) -> Result<Execution, TuringMachineError> {
    let program = ProgramManager::get_program_by_name(language.program_name())?;
    let mut machine = TuringMachine::new(program, input);

    if let Some(symbol) = input.chars().find(|c| !language.alphabet().contains(c)) {
        machine.reject(&format!(
            "Symbol '{symbol}' is not in the alphabet of {language}"
        ));
    }

    let execution = machine.execute();
    log::debug!(
        "{language} on {input:?}: {} after {} steps",
        execution.halt,
        execution.steps
    );
    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Halt;

    fn accepts(language: Language, input: &str) -> bool {
        recognize(language, input).unwrap().accepted()
    }

    #[test]
    fn test_language_tags() {
        assert_eq!("anbncn".parse::<Language>().unwrap(), Language::AnBnCn);
        assert_eq!("palindrome".parse::<Language>().unwrap(), Language::Palindrome);
        assert_eq!("anb2n".parse::<Language>().unwrap(), Language::AnB2n);
        assert!("anbn".parse::<Language>().is_err());
        assert_eq!(Language::AnB2n.to_string(), "anb2n");
        assert_eq!(serde_json::to_string(&Language::AnBnCn).unwrap(), "\"anbncn\"");
    }

    #[test]
    fn test_anbncn() {
        assert!(accepts(Language::AnBnCn, "aabbcc"));
        assert!(accepts(Language::AnBnCn, "abc"));
        assert!(accepts(Language::AnBnCn, ""));
        assert!(!accepts(Language::AnBnCn, "aabbc"));
        assert!(!accepts(Language::AnBnCn, "aabbccc"));
        assert!(!accepts(Language::AnBnCn, "abcabc"));
        assert!(!accepts(Language::AnBnCn, "bc"));
    }

    #[test]
    fn test_palindrome() {
        assert!(accepts(Language::Palindrome, "abba"));
        assert!(accepts(Language::Palindrome, "aba"));
        assert!(accepts(Language::Palindrome, "a"));
        assert!(accepts(Language::Palindrome, ""));
        assert!(!accepts(Language::Palindrome, "abab"));
        assert!(!accepts(Language::Palindrome, "ab"));
    }

    #[test]
    fn test_anb2n() {
        assert!(accepts(Language::AnB2n, "aabbbb"));
        assert!(accepts(Language::AnB2n, "abb"));
        assert!(!accepts(Language::AnB2n, "aabbb"));
        assert!(!accepts(Language::AnB2n, "abbb"));
        assert!(!accepts(Language::AnB2n, ""));
    }

    #[test]
    fn test_rejection_is_recorded() {
        let execution = recognize(Language::AnBnCn, "aabbc").unwrap();

        assert!(matches!(
            execution.halt,
            Halt::Err(TuringMachineError::UndefinedTransition(_, '_'))
        ));
        assert_eq!(execution.result(), None);
        let last = execution.history.last().unwrap();
        assert_eq!(last.state, "qreject");
        assert!(last.action.contains("No transition defined"));
    }

    #[test]
    fn test_symbols_outside_the_alphabet_reject() {
        let execution = recognize(Language::Palindrome, "aca").unwrap();
        assert!(!execution.accepted());
    }

    #[test]
    fn test_blank_inside_the_word_rejects() {
        assert!(!accepts(Language::Palindrome, "a_b"));
        assert!(!accepts(Language::Palindrome, "a_a"));
        assert!(!accepts(Language::AnBnCn, "abc_a"));
        assert!(!accepts(Language::AnBnCn, "_abc"));
        assert!(!accepts(Language::AnB2n, "abb_a"));
    }

    #[test]
    fn test_alphabet_rejection_is_recorded() {
        let execution = recognize(Language::AnBnCn, "abc_a").unwrap();

        assert_eq!(execution.halt, Halt::Reject);
        assert_eq!(execution.steps, 0);
        assert_eq!(execution.history.len(), 2);
        let last = execution.history.last().unwrap();
        assert_eq!(last.state, "qreject");
        assert_eq!(
            last.action,
            "Symbol '_' is not in the alphabet of anbncn - REJECTED"
        );
    }

    #[test]
    fn test_alphabet() {
        assert_eq!(Language::AnBnCn.alphabet(), &['a', 'b', 'c']);
        assert!(!Language::Palindrome.alphabet().contains(&'c'));
        assert!(accepts(Language::AnB2n, "abb"));
    }
}
