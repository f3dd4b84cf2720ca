//! This module defines the `Tape`, a two-way infinite sequence of cells with a movable head.
//!
//! Cells are materialized lazily: moving the head past either end allocates one blank cell.
//! They are stored in two buffers addressed by the offset from the start cell, `right` for
//! offsets `0, 1, 2, ...` and `left` for `-1, -2, ...`.

use crate::types::{Direction, Symbol, DEFAULT_EMPTY_SYMBOL};
use serde::Serialize;
use std::fmt;

/// A Turing machine tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tape {
    right: Vec<Symbol>,
    left: Vec<Symbol>,
    head: isize,
    blank: Symbol,
}

impl Tape {
    /// Creates a tape holding a single blank cell under the head.
    pub fn new(blank: impl Into<Symbol>) -> Self {
        let blank = blank.into();
        Self {
            right: vec![blank.clone()],
            left: Vec::new(),
            head: 0,
            blank,
        }
    }

    pub fn blank(&self) -> &str {
        &self.blank
    }

    /// Offset of the head from the start cell.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns the symbol under the head.
    pub fn current(&self) -> &str {
        self.cell(self.head)
            .map_or(self.blank.as_str(), String::as_str)
    }

    /// Overwrites the cell under the head.
    pub fn write_symbol(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        if let Some(cell) = self.cell_mut(self.head) {
            *cell = symbol;
        }
    }

    /// Moves the head one cell, allocating a blank cell if it leaves the materialized part.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                self.head -= 1;
                if self.head < -(self.left.len() as isize) {
                    self.left.push(self.blank.clone());
                }
            }
            Direction::Right => {
                self.head += 1;
                if self.head >= self.right.len() as isize {
                    self.right.push(self.blank.clone());
                }
            }
            Direction::Stay => {}
        }
    }

    /// Lays `text` down from the head, one character per cell, then rewinds to the start cell.
    pub fn write(&mut self, text: &str) {
        self.write_symbols(text.chars().map(String::from));
    }

    /// Lays `symbols` down from the head, then rewinds to the start cell.
    pub fn write_symbols<I>(&mut self, symbols: I)
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        for symbol in symbols {
            self.write_symbol(symbol);
            self.move_head(Direction::Right);
        }

        self.head = 0;
    }

    /// Drops every cell and leaves a single blank start cell under the head.
    pub fn clear(&mut self) {
        self.right = vec![self.blank.clone()];
        self.left.clear();
        self.head = 0;
    }

    /// All materialized cells, leftmost first.
    pub fn symbols(&self) -> Vec<&str> {
        self.left
            .iter()
            .rev()
            .chain(&self.right)
            .map(String::as_str)
            .collect()
    }

    /// The tape content with blank cells trimmed from both ends.
    pub fn content(&self) -> String {
        let symbols = self.symbols();
        let is_blank = |symbol: &&str| *symbol == self.blank;

        let start = symbols
            .iter()
            .position(|s| !is_blank(s))
            .unwrap_or(symbols.len());
        let end = symbols
            .iter()
            .rposition(|s| !is_blank(s))
            .map_or(start, |i| i + 1);

        symbols[start..end].concat()
    }

    fn index(&self) -> usize {
        (self.head + self.left.len() as isize) as usize
    }

    fn cell(&self, position: isize) -> Option<&Symbol> {
        if position >= 0 {
            self.right.get(position as usize)
        } else {
            self.left.get((-position - 1) as usize)
        }
    }

    fn cell_mut(&mut self, position: isize) -> Option<&mut Symbol> {
        if position >= 0 {
            self.right.get_mut(position as usize)
        } else {
            self.left.get_mut((-position - 1) as usize)
        }
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_EMPTY_SYMBOL)
    }
}

/// Renders the cells as `| > | a |   |` with a `^` below the head.
impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<&str> = self
            .symbols()
            .into_iter()
            .map(|symbol| if symbol.is_empty() { " " } else { symbol })
            .collect();

        let offset: usize = cells[..self.index()]
            .iter()
            .map(|cell| cell.chars().count() + 3)
            .sum();

        writeln!(f, "| {} |", cells.join(" | "))?;
        writeln!(f, "{}^", " ".repeat(offset + 2))
    }
}
