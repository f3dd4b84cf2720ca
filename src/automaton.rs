//! This module defines the contract shared by deterministic and nondeterministic finite
//! automata: the state bookkeeping both keep, and the `FiniteAutomaton` trait the
//! transformation algorithms are written against.

use crate::types::{AutomatonError, State, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// States, alphabet, initial state and final states of an automaton.
///
/// The transition relation lives in the concrete automaton type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AutomatonCore {
    pub(crate) states: BTreeSet<State>,
    pub(crate) alphabet: BTreeSet<Symbol>,
    pub(crate) initial_state: State,
    pub(crate) final_states: BTreeSet<State>,
}

impl AutomatonCore {
    pub(crate) fn new<S, A, F>(
        states: S,
        alphabet: A,
        initial_state: impl Into<State>,
        final_states: F,
    ) -> Self
    where
        S: IntoIterator,
        S::Item: Into<State>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
        F: IntoIterator,
        F::Item: Into<State>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            alphabet: alphabet.into_iter().map(Into::into).collect(),
            initial_state: initial_state.into(),
            final_states: final_states.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn add_state(&mut self, state: &str, is_final: bool) -> bool {
        if self.states.contains(state) {
            return false;
        }

        if is_final {
            self.final_states.insert(state.to_string());
        }
        self.states.insert(state.to_string());

        true
    }

    /// Drops the state from `states` and `final_states`. The caller purges transitions.
    pub(crate) fn remove_state(&mut self, state: &str) -> bool {
        // The automaton must keep its initial state and at least one state.
        if state == self.initial_state || !self.states.contains(state) || self.states.len() == 1 {
            return false;
        }

        self.final_states.remove(state);
        self.states.remove(state);

        true
    }

    /// Checks that the given labels are declared states and the symbol is in the alphabet.
    pub(crate) fn accepts_edge<'a>(
        &self,
        states: impl IntoIterator<Item = &'a str>,
        symbol: &str,
    ) -> bool {
        self.alphabet.contains(symbol) && states.into_iter().all(|s| self.states.contains(s))
    }
}

/// The operations every finite automaton supports.
///
/// Structural transforms (pruning, validation) are written against this trait so they work
/// for both `Dfa` and `Nfa`.
pub trait FiniteAutomaton: Clone {
    /// True for automata whose alphabet may not contain the empty symbol.
    const DETERMINISTIC: bool;

    fn states(&self) -> &BTreeSet<State>;
    fn alphabet(&self) -> &BTreeSet<Symbol>;
    fn initial_state(&self) -> &str;
    fn final_states(&self) -> &BTreeSet<State>;

    /// Adds a state, returning `false` if it already exists.
    fn add_state(&mut self, state: &str, is_final: bool) -> bool;

    /// Removes a state and every transition from or to it.
    ///
    /// Fails for the initial state, unknown states, and the last remaining state.
    fn remove_state(&mut self, state: &str) -> bool;

    /// All states reachable from `state` in one transition over any alphabet symbol.
    fn successors(&self, state: &str) -> BTreeSet<State>;

    /// The states and symbols mentioned anywhere in the transition relation.
    fn transition_domain(&self) -> (BTreeSet<&str>, BTreeSet<&str>);

    fn is_accepted(&self, word: &str) -> bool;

    fn is_final(&self, state: &str) -> bool {
        self.final_states().contains(state)
    }

    /// Runs every structural check and returns the first violation found.
    fn validate(&self) -> Result<(), AutomatonError> {
        crate::analyzer::analyze_automaton(self)
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Renders a transition table.
///
/// `-->` marks the initial state, `<--` a final state, and `<->` a state that is both.
/// The empty symbol is displayed as `ε`.
pub(crate) fn render_table<A, F>(
    f: &mut fmt::Formatter<'_>,
    automaton: &A,
    kind: &str,
    cell: F,
) -> fmt::Result
where
    A: FiniteAutomaton,
    F: Fn(&str, &str) -> String,
{
    let mut rows = Vec::new();
    let mut width = 5;
    for state in automaton.states() {
        let cells: Vec<String> = automaton
            .alphabet()
            .iter()
            .map(|symbol| cell(state.as_str(), symbol.as_str()))
            .collect();

        let widest = cells.iter().map(String::len).max().unwrap_or(0);
        width = width.max(widest).max(state.len());
        rows.push((state.as_str(), cells));
    }
    let width = width + 2;

    write!(f, "{:^w$}", kind, w = width + 4)?;
    for symbol in automaton.alphabet() {
        let symbol = if symbol.is_empty() {
            "ε"
        } else {
            symbol.as_str()
        };
        write!(f, "|{:^width$}", symbol)?;
    }
    writeln!(f)?;

    for (state, cells) in rows {
        let initial = state == automaton.initial_state();
        let prefix = match (initial, automaton.is_final(state)) {
            (true, true) => "<->",
            (true, false) => "-->",
            (false, true) => "<--",
            (false, false) => "",
        };
        write!(f, "{:<4}{:<width$}", prefix, state)?;
        for text in cells {
            write!(f, "|{:^width$}", text)?;
        }
        writeln!(f)?;
    }

    Ok(())
}
