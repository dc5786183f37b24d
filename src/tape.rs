//! A single Turing Machine tape, unbounded in both directions.
//!
//! Cells are materialized lazily in a `VecDeque` together with the logical index of its
//! first cell, so heads at negative positions stay addressable without shifting the
//! content around.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    /// Logical position of `cells[0]`.
    origin: isize,
    blank: char,
}

impl Tape {
    /// Creates a tape holding `content` at positions `0..content.len()`.
    pub fn new(content: &str, blank: char) -> Self {
        Self {
            cells: content.chars().collect(),
            origin: 0,
            blank,
        }
    }

    /// Returns the symbol at `position`, or the blank outside the materialized region.
    pub fn read(&self, position: isize) -> char {
        self.index(position)
            .and_then(|i| self.cells.get(i).copied())
            .unwrap_or(self.blank)
    }

    /// Writes `symbol` at `position`, growing the tape with blanks as needed.
    pub fn write(&mut self, position: isize, symbol: char) {
        while position < self.origin {
            self.cells.push_front(self.blank);
            self.origin -= 1;
        }

        let index = (position - self.origin) as usize;
        if index >= self.cells.len() {
            self.cells.resize(index + 1, self.blank);
        }

        self.cells[index] = symbol;
    }

    /// Logical position of the first materialized cell.
    pub fn origin(&self) -> isize {
        self.origin
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Counts the occurrences of `symbol` on the materialized region.
    pub fn count(&self, symbol: char) -> usize {
        self.cells.iter().filter(|&&c| c == symbol).count()
    }

    /// Returns the content with leading and trailing blanks removed.
    pub fn trimmed(&self) -> String {
        self.to_string().trim_matches(self.blank).to_string()
    }

    fn index(&self, position: isize) -> Option<usize> {
        usize::try_from(position - self.origin).ok()
    }
}

impl std::fmt::Display for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cells.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
