//! This crate provides a small computation-theory toolkit.
//! It includes deterministic and nondeterministic finite automata with the classical
//! transformations (epsilon removal, determinization, minimization and canonical relabeling),
//! single- and multi-tape Turing machines with bounded simulation, and a set of built-in
//! demonstration programs.

pub mod analyzer;
pub mod automaton;
pub mod canonical;
pub mod determinize;
pub mod dfa;
pub mod epsilon;
pub mod machine;
pub mod minimize;
pub mod multitape;
pub mod nfa;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `analyze_automaton` function from the analyzer module.
pub use analyzer::analyze_automaton;
/// Re-exports the `FiniteAutomaton` trait shared by `Dfa` and `Nfa`.
pub use automaton::FiniteAutomaton;
/// Re-exports canonical relabeling and equivalence testing.
pub use canonical::{canonize, equivalent, normal_form, Automaton};
/// Re-exports the subset construction.
pub use determinize::determinize;
/// Re-exports the `Dfa` struct and its transition table type.
pub use dfa::{Dfa, DfaTransitions};
/// Re-exports epsilon closure computation and elimination.
pub use epsilon::{epsilon_closures, remove_epsilon_transitions};
/// Re-exports the single-tape `DeterministicMachine`.
pub use machine::{DeterministicMachine, DtmTransitions};
/// Re-exports state pruning and minimization.
pub use minimize::{minimize, remove_dead_states, remove_unreachable_states};
/// Re-exports the `MultiTapeMachine`.
pub use multitape::{MtmTransitions, MultiTapeMachine};
/// Re-exports the `Nfa` struct and its transition table type.
pub use nfa::{Nfa, NfaTransitions};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` struct.
pub use tape::Tape;
/// Re-exports the shared types, constants and errors.
pub use types::{
    AutomatonError, Direction, MachineError, MultiRule, Outcome, Rejection, Rule, State, Step,
    Symbol, DEFAULT_EMPTY_SYMBOL, DEFAULT_INITIAL_STATE, DEFAULT_MAX_STEPS, DEFAULT_START_SYMBOL,
    EPSILON,
};
