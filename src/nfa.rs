//! Nondeterministic Finite Automaton (NFA) model, optionally with epsilon transitions.
//!
//! The empty symbol [`EPSILON`] is an ordinary member of the alphabet here; an automaton
//! whose alphabet contains it may use epsilon transitions.

use crate::automaton::{render_table, AutomatonCore, FiniteAutomaton};
use crate::types::{State, Symbol, EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Transitions: source state -> symbol -> set of destination states.
pub type NfaTransitions = BTreeMap<State, BTreeMap<Symbol, BTreeSet<State>>>;

static NO_STATES: BTreeSet<State> = BTreeSet::new();

/// Builds a transition map from `(from, symbol, destinations)` triples.
///
/// Triples sharing `(from, symbol)` are merged.
pub fn rules<'a, D>(edges: impl IntoIterator<Item = (&'a str, &'a str, D)>) -> NfaTransitions
where
    D: IntoIterator<Item = &'a str>,
{
    let mut transitions = NfaTransitions::new();
    for (from, symbol, destinations) in edges {
        transitions
            .entry(from.to_string())
            .or_default()
            .entry(symbol.to_string())
            .or_default()
            .extend(destinations.into_iter().map(str::to_string));
    }
    transitions
}

/// A Nondeterministic Finite Automaton over string-labelled states and symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nfa {
    #[serde(flatten)]
    core: AutomatonCore,
    transitions: NfaTransitions,
}

impl Nfa {
    /// Creates an NFA from its components. Nothing is validated here.
    pub fn new<S, A, F>(
        states: S,
        alphabet: A,
        initial_state: impl Into<State>,
        final_states: F,
        transitions: NfaTransitions,
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
            core: AutomatonCore::new(states, alphabet, initial_state, final_states),
            transitions,
        }
    }

    pub(crate) fn from_parts(core: AutomatonCore, transitions: NfaTransitions) -> Self {
        Self { core, transitions }
    }

    pub(crate) fn core(&self) -> &AutomatonCore {
        &self.core
    }

    pub fn transitions(&self) -> &NfaTransitions {
        &self.transitions
    }

    /// True if the alphabet contains the empty symbol.
    pub fn has_epsilon(&self) -> bool {
        self.core.alphabet.contains(EPSILON)
    }

    /// Returns the destinations of `(from, symbol)`. Missing rules yield an empty set.
    pub fn get_transition(&self, from: &str, symbol: &str) -> &BTreeSet<State> {
        self.transitions
            .get(from)
            .and_then(|rules| rules.get(symbol))
            .unwrap_or(&NO_STATES)
    }

    /// Extends the rule for `(from, symbol)` with `destinations`.
    ///
    /// Fails on undeclared states or symbols, and when every destination is already present.
    pub fn add_transition<'a, D>(&mut self, from: &str, destinations: D, symbol: &str) -> bool
    where
        D: IntoIterator<Item = &'a str>,
    {
        let destinations: BTreeSet<&str> = destinations.into_iter().collect();
        let endpoints = destinations.iter().copied().chain([from]);
        if !self.core.accepts_edge(endpoints, symbol) {
            return false;
        }

        let existing = self.get_transition(from, symbol);
        if destinations.iter().all(|dest| existing.contains(*dest)) {
            return false;
        }

        self.transitions
            .entry(from.to_string())
            .or_default()
            .entry(symbol.to_string())
            .or_default()
            .extend(destinations.into_iter().map(str::to_string));

        true
    }

    /// Replaces the rule for `(from, symbol)` with `destinations`.
    pub fn set_transition<'a, D>(&mut self, from: &str, destinations: D, symbol: &str) -> bool
    where
        D: IntoIterator<Item = &'a str>,
    {
        let destinations: BTreeSet<State> = destinations.into_iter().map(str::to_string).collect();
        let endpoints = destinations.iter().map(String::as_str).chain([from]);
        if !self.core.accepts_edge(endpoints, symbol) {
            return false;
        }

        let rules = self.transitions.entry(from.to_string()).or_default();
        if destinations.is_empty() {
            rules.remove(symbol);
        } else {
            rules.insert(symbol.to_string(), destinations);
        }
        if rules.is_empty() {
            self.transitions.remove(from);
        }

        true
    }

    /// Removes the single edge `from --symbol--> to`. Fails if there is no such edge.
    pub fn remove_transition(&mut self, from: &str, to: &str, symbol: &str) -> bool {
        let Some(rules) = self.transitions.get_mut(from) else {
            return false;
        };
        let Some(destinations) = rules.get_mut(symbol) else {
            return false;
        };

        if !destinations.remove(to) {
            return false;
        }
        if destinations.is_empty() {
            rules.remove(symbol);
        }
        if rules.is_empty() {
            self.transitions.remove(from);
        }

        true
    }

    /// Returns every symbol (including the empty one) leading from `from` directly to `to`.
    pub fn get_symbols_between_states(&self, from: &str, to: &str) -> BTreeSet<Symbol> {
        self.transitions
            .get(from)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|(_, destinations)| destinations.contains(to))
                    .map(|(symbol, _)| symbol.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The smallest set containing `states` and closed under epsilon transitions.
    pub fn epsilon_closure<'a>(
        &self,
        states: impl IntoIterator<Item = &'a str>,
    ) -> BTreeSet<State> {
        let mut closure = BTreeSet::new();
        let mut stack: Vec<&str> = states.into_iter().collect();

        while let Some(state) = stack.pop() {
            if !closure.insert(state.to_string()) {
                continue;
            }

            for next in self.get_transition(state, EPSILON) {
                if !closure.contains(next) {
                    stack.push(next);
                }
            }
        }

        closure
    }

    /// All states reachable from `states` by reading `symbol`, closed under epsilon moves.
    pub(crate) fn step(&self, states: &BTreeSet<State>, symbol: &str) -> BTreeSet<State> {
        let reached: BTreeSet<&str> = states
            .iter()
            .flat_map(|state| self.get_transition(state, symbol))
            .map(String::as_str)
            .collect();

        if self.has_epsilon() {
            self.epsilon_closure(reached)
        } else {
            reached.into_iter().map(str::to_string).collect()
        }
    }
}

impl FiniteAutomaton for Nfa {
    const DETERMINISTIC: bool = false;

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

        self.transitions.remove(state);
        for rules in self.transitions.values_mut() {
            for destinations in rules.values_mut() {
                destinations.remove(state);
            }
            rules.retain(|_, destinations| !destinations.is_empty());
        }
        self.transitions.retain(|_, rules| !rules.is_empty());

        true
    }

    fn successors(&self, state: &str) -> BTreeSet<State> {
        self.core
            .alphabet
            .iter()
            .flat_map(|symbol| self.get_transition(state, symbol))
            .cloned()
            .collect()
    }

    fn transition_domain(&self) -> (BTreeSet<&str>, BTreeSet<&str>) {
        let mut states = BTreeSet::new();
        let mut symbols = BTreeSet::new();
        for (from, rules) in &self.transitions {
            states.insert(from.as_str());
            for (symbol, destinations) in rules {
                symbols.insert(symbol.as_str());
                states.extend(destinations.iter().map(String::as_str));
            }
        }
        (states, symbols)
    }

    /// Tracks the set of states the automaton can be in after each symbol.
    ///
    /// Epsilon transitions are followed between symbols.
    fn is_accepted(&self, word: &str) -> bool {
        let mut current = if self.has_epsilon() {
            self.epsilon_closure([self.initial_state()])
        } else {
            BTreeSet::from([self.core.initial_state.clone()])
        };
        let mut buffer = [0u8; 4];

        for c in word.chars() {
            current = self.step(&current, c.encode_utf8(&mut buffer));
            if current.is_empty() {
                return false;
            }
        }

        current.iter().any(|state| self.is_final(state))
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_table(f, self, "NFA", |state, symbol| {
            let destinations: Vec<&str> = self
                .get_transition(state, symbol)
                .iter()
                .map(String::as_str)
                .collect();
            format!("{{{}}}", destinations.join(","))
        })
    }
}
