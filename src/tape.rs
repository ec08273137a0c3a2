//! A bidirectionally unbounded tape backed by a head-centered zipper.

use crate::types::{Direction, Symbol};
use serde::Serialize;
use std::fmt;

/// Snapshot of a tape around its head. Both halves are ordered left to right.
///
/// `after_including_head` is never empty; its first element is the cell under the head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeState {
    pub before: Vec<Symbol>,
    pub after_including_head: Vec<Symbol>,
}

/// A tape that lazily grows with blanks in either direction as the head moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    blank: Symbol,
    // Cells left of the head, left to right.
    before: Vec<Symbol>,
    // Cells from the head rightwards, right to left: the head is the last element.
    after: Vec<Symbol>,
    // Head offset from the cell the tape started at.
    position: isize,
}

impl Tape {
    /// Creates a tape holding `input` with the head on its first symbol. An empty input
    /// yields a single blank cell.
    pub fn new(blank: Symbol, input: &str) -> Self {
        let mut after: Vec<Symbol> = input.chars().rev().collect();
        if after.is_empty() {
            after.push(blank);
        }

        Self {
            blank,
            before: Vec::new(),
            after,
            position: 0,
        }
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Reads the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.after.last().copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` under the head.
    pub fn write(&mut self, symbol: Symbol) {
        match self.after.last_mut() {
            Some(head) => *head = symbol,
            None => self.after.push(symbol),
        }
    }

    pub fn head_left(&mut self) {
        let cell = self.before.pop().unwrap_or(self.blank);
        self.after.push(cell);
        self.position -= 1;
    }

    pub fn head_right(&mut self) {
        if let Some(cell) = self.after.pop() {
            self.before.push(cell);
        }
        if self.after.is_empty() {
            self.after.push(self.blank);
        }
        self.position += 1;
    }

    pub fn head_stay(&mut self) {}

    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.head_left(),
            Direction::Right => self.head_right(),
            Direction::Stay => self.head_stay(),
        }
    }

    /// Head position relative to where the tape started (negative is left of it).
    pub fn position(&self) -> isize {
        self.position
    }

    /// Reads the cell at `offset` from the head (0 is the head, positive is to the right).
    /// Unvisited cells read as blank.
    pub fn read_offset(&self, offset: isize) -> Symbol {
        let cell = if offset >= 0 {
            let offset = offset.unsigned_abs();
            self.after
                .len()
                .checked_sub(offset + 1)
                .and_then(|i| self.after.get(i))
        } else {
            self.before
                .len()
                .checked_sub(offset.unsigned_abs())
                .and_then(|i| self.before.get(i))
        };

        cell.copied().unwrap_or(self.blank)
    }

    /// Reads the cells from offset `start` to `end`, inclusive.
    pub fn read_range(&self, start: isize, end: isize) -> Vec<Symbol> {
        (start..=end).map(|i| self.read_offset(i)).collect()
    }

    /// Reads the cell at `index`, counted from the tape's starting cell.
    pub fn cell(&self, index: isize) -> Symbol {
        self.read_offset(index - self.position)
    }

    /// All visited cells, left to right.
    pub fn contents(&self) -> String {
        self.before
            .iter()
            .chain(self.after.iter().rev())
            .collect()
    }

    pub fn snapshot(&self) -> TapeState {
        TapeState {
            before: self.before.clone(),
            after_including_head: self.after.iter().rev().copied().collect(),
        }
    }
}

impl fmt::Display for Tape {
    /// Renders visited cells with the head cell in brackets, e.g. `ab[c]d`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before: String = self.before.iter().collect();
        let rest: String = self.after.iter().rev().skip(1).collect();
        write!(f, "{before}[{}]{rest}", self.read())
    }
}
