//! This module defines the shared vocabulary of the toolkit: state and symbol labels,
//! default machine settings, tape head directions, simulation outcomes, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A state label. States are opaque strings.
pub type State = String;
/// A symbol label. Symbols are opaque strings; the empty string is epsilon.
pub type Symbol = String;

/// The empty symbol, denoting an epsilon transition in nondeterministic automata.
pub const EPSILON: &str = "";
/// The default number of steps after which a machine is considered looping.
pub const DEFAULT_MAX_STEPS: usize = 100;
/// The symbol written at position 0 of a tape before the input.
pub const DEFAULT_START_SYMBOL: &str = ">";
/// The default blank symbol of a tape cell.
pub const DEFAULT_EMPTY_SYMBOL: &str = "";
/// The initial state name used when none is given.
pub const DEFAULT_INITIAL_STATE: &str = "init";

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

/// A single-tape rule: the state to enter, the symbol to write and where to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub next_state: State,
    pub write: Symbol,
    pub direction: Direction,
}

impl Rule {
    pub fn new(
        next_state: impl Into<State>,
        write: impl Into<Symbol>,
        direction: Direction,
    ) -> Self {
        Self {
            next_state: next_state.into(),
            write: write.into(),
            direction,
        }
    }
}

/// A multi-tape rule. `write` and `directions` hold one slot per tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRule {
    pub next_state: State,
    pub write: Vec<Symbol>,
    pub directions: Vec<Direction>,
}

impl MultiRule {
    pub fn new<W>(next_state: impl Into<State>, write: W, directions: Vec<Direction>) -> Self
    where
        W: IntoIterator,
        W::Item: Into<Symbol>,
    {
        Self {
            next_state: next_state.into(),
            write: write.into_iter().map(Into::into).collect(),
            directions,
        }
    }
}

/// Represents the outcome of a single simulation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The machine applied a rule and can continue.
    Continue,
    /// The machine reached a verdict.
    Halt(Outcome),
}

/// The verdict of a simulation.
///
/// The boolean contract (`simulate`) collapses everything but `Accepted` to `false`;
/// this type keeps explicit rejection and step-bound exhaustion apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine entered an accepting state.
    Accepted,
    /// The machine rejected the input.
    Rejected(Rejection),
    /// The machine needed more than the given number of steps and is considered looping.
    StepLimitExceeded(usize),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Details of a rejection outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// No rule is defined for the state and the symbols under the heads.
    UndefinedTransition { state: State, symbols: Vec<Symbol> },
    /// The matching rule leads into a rejecting state.
    RejectingState(State),
}

/// Errors reported when validating or constructing finite automata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("A DFA alphabet cannot contain the empty symbol")]
    EpsilonInDfa,
    #[error("Automaton has to have at least one state")]
    EmptyStates,
    #[error("Initial state {0} is not part of the states set")]
    UnknownInitialState(State),
    #[error("Final states {0:?} are not part of the states set")]
    UnknownFinalStates(Vec<State>),
    #[error("Transitions reference undeclared states: {0:?}")]
    UnknownStates(Vec<State>),
    #[error("Transitions reference symbols outside the alphabet: {0:?}")]
    UnknownSymbols(Vec<Symbol>),
}

/// Errors reported by Turing Machine construction, tape access, and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Tape index {index} is out of bounds (machine has {count} tapes)")]
    TapeIndexOutOfBounds { index: usize, count: usize },
    #[error("Expected {expected} tapes, got {actual}")]
    TapeCountMismatch { expected: usize, actual: usize },
    #[error("Tape blank '{actual}' differs from the blank '{expected}' of the other tapes")]
    BlankMismatch { expected: Symbol, actual: Symbol },
    #[error("States {0:?} are both accepting and rejecting")]
    ConflictingHaltStates(Vec<State>),
    #[error("Invalid state: {0}")]
    UnknownState(State),
    #[error("Rule in state '{state}' does not have {expected} tape slots")]
    ArityMismatch { state: State, expected: usize },
    #[error("Machine validation error: {0}")]
    Validation(String),
}
