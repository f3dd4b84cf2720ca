//! Deterministic Finite Automaton (DFA) model with its mutation and query operations.

use crate::automaton::{render_table, AutomatonCore, FiniteAutomaton};
use crate::types::{AutomatonError, State, Symbol, EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Transitions: source state -> symbol -> destination state.
pub type DfaTransitions = BTreeMap<State, BTreeMap<Symbol, State>>;

/// Builds a transition map from `(from, symbol, to)` triples.
///
/// A later triple for the same `(from, symbol)` pair replaces an earlier one.
pub fn rules<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>) -> DfaTransitions {
    let mut transitions = DfaTransitions::new();
    for (from, symbol, to) in edges {
        transitions
            .entry(from.to_string())
            .or_default()
            .insert(symbol.to_string(), to.to_string());
    }
    transitions
}

/// A Deterministic Finite Automaton over string-labelled states and symbols.
///
/// The transition function may be partial: a missing rule rejects the word.
/// Deserialization goes through [`Dfa::new`], so a snapshot cannot smuggle in the empty symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DfaRepr")]
pub struct Dfa {
    #[serde(flatten)]
    core: AutomatonCore,
    transitions: DfaTransitions,
}

/// Unchecked serialized form of a [`Dfa`].
#[derive(Deserialize)]
struct DfaRepr {
    #[serde(flatten)]
    core: AutomatonCore,
    transitions: DfaTransitions,
}

impl TryFrom<DfaRepr> for Dfa {
    type Error = AutomatonError;

    fn try_from(repr: DfaRepr) -> Result<Self, Self::Error> {
        let DfaRepr { core, transitions } = repr;
        Dfa::new(
            core.states,
            core.alphabet,
            core.initial_state,
            core.final_states,
            transitions,
        )
    }
}

impl Dfa {
    /// Creates a DFA from its components.
    ///
    /// Only the absence of the empty symbol is enforced here. Everything else is checked
    /// by [`FiniteAutomaton::validate`], so an automaton may be assembled step by step.
    pub fn new<S, A, F>(
        states: S,
        alphabet: A,
        initial_state: impl Into<State>,
        final_states: F,
        transitions: DfaTransitions,
    ) -> Result<Self, AutomatonError>
    where
        S: IntoIterator,
        S::Item: Into<State>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
        F: IntoIterator,
        F::Item: Into<State>,
    {
        let core = AutomatonCore::new(states, alphabet, initial_state, final_states);
        if core.alphabet.contains(EPSILON) {
            return Err(AutomatonError::EpsilonInDfa);
        }

        Ok(Self { core, transitions })
    }

    pub(crate) fn from_parts(core: AutomatonCore, transitions: DfaTransitions) -> Self {
        debug_assert!(!core.alphabet.contains(EPSILON));
        Self { core, transitions }
    }

    pub fn transitions(&self) -> &DfaTransitions {
        &self.transitions
    }

    /// Returns the destination of the rule for `(from, symbol)`, if any.
    pub fn get_transition(&self, from: &str, symbol: &str) -> Option<&str> {
        self.transitions
            .get(from)
            .and_then(|rules| rules.get(symbol))
            .map(String::as_str)
    }

    /// Adds a rule. Fails if a rule for `(from, symbol)` already exists.
    pub fn add_transition(&mut self, from: &str, to: &str, symbol: &str) -> bool {
        if !self.core.accepts_edge([from, to], symbol)
            || self.get_transition(from, symbol).is_some()
        {
            return false;
        }

        self.insert(from, to, symbol);
        true
    }

    /// Adds or overwrites the rule for `(from, symbol)`.
    pub fn set_transition(&mut self, from: &str, to: &str, symbol: &str) -> bool {
        if !self.core.accepts_edge([from, to], symbol) {
            return false;
        }

        self.insert(from, to, symbol);
        true
    }

    fn insert(&mut self, from: &str, to: &str, symbol: &str) {
        self.transitions
            .entry(from.to_string())
            .or_default()
            .insert(symbol.to_string(), to.to_string());
    }

    /// Removes the rule for `(from, symbol)`. Fails if there is none.
    pub fn remove_transition(&mut self, from: &str, symbol: &str) -> bool {
        let Some(rules) = self.transitions.get_mut(from) else {
            return false;
        };

        if rules.remove(symbol).is_none() {
            return false;
        }
        if rules.is_empty() {
            self.transitions.remove(from);
        }

        true
    }

    /// Returns every symbol leading from `from` directly to `to`.
    pub fn get_symbols_between_states(&self, from: &str, to: &str) -> BTreeSet<Symbol> {
        self.transitions
            .get(from)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|(_, dest)| dest.as_str() == to)
                    .map(|(symbol, _)| symbol.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FiniteAutomaton for Dfa {
    const DETERMINISTIC: bool = true;

    fn states(&self) -> &BTreeSet<State> {
        &self.core.states
    }

    fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.core.alphabet
    }

    fn initial_state(&self) -> &str {
        &self.core.initial_state
    }

    fn final_states(&self) -> &BTreeSet<State> {
        &self.core.final_states
    }

    fn add_state(&mut self, state: &str, is_final: bool) -> bool {
        self.core.add_state(state, is_final)
    }

    fn remove_state(&mut self, state: &str) -> bool {
        if !self.core.remove_state(state) {
            return false;
        }

        // Rules into the removed state are deleted, not rewired.
        self.transitions.remove(state);
        for rules in self.transitions.values_mut() {
            rules.retain(|_, dest| dest.as_str() != state);
        }
        self.transitions.retain(|_, rules| !rules.is_empty());

        true
    }

    fn successors(&self, state: &str) -> BTreeSet<State> {
        self.core
            .alphabet
            .iter()
            .filter_map(|symbol| self.get_transition(state, symbol))
            .map(str::to_string)
            .collect()
    }

    fn transition_domain(&self) -> (BTreeSet<&str>, BTreeSet<&str>) {
        let mut states = BTreeSet::new();
        let mut symbols = BTreeSet::new();
        for (from, rules) in &self.transitions {
            states.insert(from.as_str());
            for (symbol, to) in rules {
                symbols.insert(symbol.as_str());
                states.insert(to.as_str());
            }
        }
        (states, symbols)
    }

    /// Walks the word symbol by symbol, rejecting as soon as a rule is missing.
    fn is_accepted(&self, word: &str) -> bool {
        let mut current = self.core.initial_state.as_str();
        let mut buffer = [0u8; 4];

        for c in word.chars() {
            match self.get_transition(current, c.encode_utf8(&mut buffer)) {
                Some(next) => current = next,
                None => return false,
            }
        }

        self.is_final(current)
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_table(f, self, "DFA", |state, symbol| {
            self.get_transition(state, symbol)
                .unwrap_or("empty")
                .to_string()
        })
    }
}
