//! This module defines the `TuringMachine` struct, which simulates a deterministic
//! single-tape Turing Machine. It handles the machine's state, tape operations, head
//! movements, the step budget and the execution history.

use crate::tape::Tape;
use crate::types::{Halt, Program, Record, Step, Transition, TuringMachineError};

/// The outcome of a complete run: how it halted, the final tape and the full history.
#[derive(Debug, Clone)]
pub struct Execution {
    pub halt: Halt,
    pub tape: Tape,
    pub history: Vec<Record>,
    /// Number of transitions executed.
    pub steps: usize,
}

impl Execution {
    /// Returns `true` if the run ended in the accept state.
    pub fn accepted(&self) -> bool {
        self.halt.is_accept()
    }

    /// The unary result: the number of `1` cells on the final tape, for accepted runs only.
    pub fn result(&self) -> Option<usize> {
        self.accepted().then(|| self.tape.count('1'))
    }
}

/// Represents a single-tape Turing Machine executing a [`Program`].
///
/// Every executed step, and every failure, is appended to the execution history.
/// Failures (no transition defined, step budget exhausted) force the program's
/// reject state so callers only need to inspect the final [`Halt`].
pub struct TuringMachine {
    state: String,
    tape: Tape,
    head: isize,
    input: String,
    program: Program,
    max_steps: usize,
    step_count: usize,
    history: Vec<Record>,
    halt: Option<Halt>,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` with `input` written at positions `0..input.len()`.
    ///
    /// The head starts at position 0 in the program's initial state, and the initial
    /// configuration is recorded as step 0 of the history.
    ///
    /// # Arguments
    ///
    /// * `program` - The `Program` defining the Turing Machine.
    /// * `input` - The initial tape content.
    pub fn new(program: Program, input: &str) -> Self {
        let mut machine = Self {
            state: program.initial_state.clone(),
            tape: Tape::new(input, program.blank),
            head: 0,
            input: input.to_string(),
            max_steps: program.max_steps,
            program,
            step_count: 0,
            history: Vec::new(),
            halt: None,
        };
        machine.record("Initial configuration".to_string());
        machine
    }

    /// Overrides the program's step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Halts the machine in the reject state without executing a transition.
    ///
    /// The reason is recorded in the history. Has no effect once the machine halted.
    pub fn reject(&mut self, reason: &str) -> Step {
        if let Some(halt) = &self.halt {
            return Step::Halt(halt.clone());
        }

        self.state = self.program.reject_state.clone();
        self.record(format!("{reason} - REJECTED"));
        self.halt(Halt::Reject)
    }

    /// Executes a single step of the Turing Machine's computation.
    ///
    /// This involves reading the symbol under the head, writing the new symbol, moving
    /// the head and transitioning to the next state based on the transition table.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if the machine performed a step and is not in a terminal state.
    /// * `Step::Halt(_)` once the machine accepted, rejected or failed. Further calls
    ///   keep returning the same halt.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = &self.halt {
            return Step::Halt(halt.clone());
        }

        if let Some(halt) = self.terminal_halt() {
            return self.halt(halt);
        }

        if self.step_count >= self.max_steps {
            self.state = self.program.reject_state.clone();
            self.record(format!(
                "Step limit of {} exceeded - REJECTED",
                self.max_steps
            ));
            return self.halt(Halt::Err(TuringMachineError::StepLimitExceeded(
                self.max_steps,
            )));
        }

        let symbol = self.symbol();
        let transition = match self.transition().cloned() {
            Some(t) => t,
            None => {
                let state = std::mem::replace(&mut self.state, self.program.reject_state.clone());
                self.record(format!(
                    "No transition defined for ({state}, {symbol}) - REJECTED"
                ));
                return self.halt(Halt::Err(TuringMachineError::UndefinedTransition(
                    state, symbol,
                )));
            }
        };

        let action = describe(&self.state, symbol, &transition);
        log::trace!("{}: {}", self.program.name, action);

        self.state = transition.next_state;
        self.tape.write(self.head, transition.write);
        self.head += transition.direction.offset();
        self.step_count += 1;
        self.record(action);

        match self.terminal_halt() {
            Some(halt) => self.halt(halt),
            None => Step::Continue,
        }
    }

    /// Runs the Turing Machine until it accepts, rejects or fails.
    ///
    /// Termination is guaranteed by the step budget.
    pub fn run(&mut self) -> Halt {
        loop {
            if let Step::Halt(halt) = self.step() {
                return halt;
            }
        }
    }

    /// Runs the machine to completion and consumes it into an [`Execution`].
    pub fn execute(mut self) -> Execution {
        let halt = self.run();

        Execution {
            halt,
            steps: self.step_count,
            tape: self.tape,
            history: self.history,
        }
    }

    /// Returns the current state of the Turing Machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the initial state of the Turing Machine.
    pub fn initial_state(&self) -> &str {
        &self.program.initial_state
    }

    /// Returns the program this machine executes.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Resets the Turing Machine to its initial configuration.
    /// This includes resetting the state, tape, head position, step count and history.
    pub fn reset(&mut self) {
        self.state = self.program.initial_state.clone();
        self.tape = Tape::new(&self.input, self.program.blank);
        self.head = 0;
        self.step_count = 0;
        self.history.clear();
        self.halt = None;
        self.record("Initial configuration".to_string());
    }

    /// Returns the total number of transitions executed by the Turing Machine.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the step budget of this run.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Checks if the Turing Machine has halted.
    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Returns the halt outcome, if the machine has halted.
    pub fn outcome(&self) -> Option<&Halt> {
        self.halt.as_ref()
    }

    /// Returns the machine's tape.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the logical head position. Negative values are left of the input.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns the symbol currently under the head.
    /// If the head is outside the materialized tape, the blank symbol is returned.
    pub fn symbol(&self) -> char {
        self.tape.read(self.head)
    }

    /// Returns the execution history recorded so far.
    pub fn history(&self) -> &[Record] {
        &self.history
    }

    /// Finds and returns the `Transition` for the current state and symbol under the head.
    ///
    /// # Returns
    ///
    /// * `Some(&Transition)` if a matching transition is defined.
    /// * `None` if the table has no entry for the pair.
    pub fn transition(&self) -> Option<&Transition> {
        self.program.transition(&self.state, self.symbol())
    }

    /// Returns the blank symbol used by this Turing Machine.
    pub fn blank(&self) -> char {
        self.program.blank
    }

    fn terminal_halt(&self) -> Option<Halt> {
        if self.state == self.program.accept_state {
            Some(Halt::Accept)
        } else if self.state == self.program.reject_state {
            Some(Halt::Reject)
        } else {
            None
        }
    }

    fn halt(&mut self, halt: Halt) -> Step {
        log::debug!(
            "{} halted after {} steps: {}",
            self.program.name,
            self.step_count,
            halt
        );
        self.halt = Some(halt.clone());
        Step::Halt(halt)
    }

    fn record(&mut self, action: String) {
        self.history.push(Record {
            step: self.history.len(),
            state: self.state.clone(),
            tape: self.tape.to_string(),
            origin: self.tape.origin(),
            head: self.head,
            symbol: self.symbol(),
            action,
        });
    }
}

/// Formats an applied rule as `δ(q, s) = (q', s', d)`, followed by its note.
fn describe(state: &str, symbol: char, transition: &Transition) -> String {
    let rule = format!(
        "δ({state}, {symbol}) = ({}, {}, {})",
        transition.next_state, transition.write, transition.direction
    );

    match &transition.note {
        Some(note) => format!("{rule}: {note}"),
        None => rule,
    }
}
