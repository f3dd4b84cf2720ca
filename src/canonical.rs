//! Canonical relabeling of DFAs and language equivalence testing.

use crate::automaton::{AutomatonCore, FiniteAutomaton};
use crate::determinize::determinize;
use crate::dfa::{Dfa, DfaTransitions};
use crate::minimize::{minimize, remove_dead_states};
use crate::nfa::Nfa;
use crate::types::State;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Either kind of finite automaton, for operations that accept both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Automaton {
    Dfa(Dfa),
    Nfa(Nfa),
}

impl Automaton {
    /// Converts to a DFA, determinizing if needed.
    pub fn into_dfa(self) -> Dfa {
        match self {
            Automaton::Dfa(dfa) => dfa,
            Automaton::Nfa(nfa) => determinize(&nfa),
        }
    }

    pub fn is_accepted(&self, word: &str) -> bool {
        match self {
            Automaton::Dfa(dfa) => dfa.is_accepted(word),
            Automaton::Nfa(nfa) => nfa.is_accepted(word),
        }
    }
}

impl From<Dfa> for Automaton {
    fn from(dfa: Dfa) -> Self {
        Automaton::Dfa(dfa)
    }
}

impl From<Nfa> for Automaton {
    fn from(nfa: Nfa) -> Self {
        Automaton::Nfa(nfa)
    }
}

/// Renames the states of `automaton` by breadth-first rank from the initial state.
///
/// States are named `"0"`, `"1"`, ... in visiting order; successors are visited in sorted
/// symbol order. States unreachable from the initial state receive no rank and are dropped.
pub fn canonize(automaton: &Dfa) -> Dfa {
    let mut ranks: BTreeMap<&str, State> = BTreeMap::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([automaton.initial_state()]);
    ranks.insert(automaton.initial_state(), "0".to_string());

    while let Some(state) = queue.pop_front() {
        order.push(state);
        for symbol in automaton.alphabet() {
            if let Some(next) = automaton.get_transition(state, symbol) {
                if !ranks.contains_key(next) {
                    ranks.insert(next, ranks.len().to_string());
                    queue.push_back(next);
                }
            }
        }
    }

    let mut transitions = DfaTransitions::new();
    for &state in &order {
        for symbol in automaton.alphabet() {
            if let Some(next) = automaton.get_transition(state, symbol) {
                transitions
                    .entry(ranks[state].clone())
                    .or_default()
                    .insert(symbol.clone(), ranks[next].clone());
            }
        }
    }

    let final_states: BTreeSet<State> = order
        .iter()
        .filter(|state| automaton.is_final(state))
        .map(|state| ranks[state].clone())
        .collect();

    Dfa::from_parts(
        AutomatonCore {
            states: ranks.values().cloned().collect(),
            alphabet: automaton.alphabet().clone(),
            initial_state: "0".to_string(),
            final_states,
        },
        transitions,
    )
}

/// The canonical minimal DFA of the language accepted by `automaton`.
///
/// States that cannot reach a final state are removed before minimizing, so a DFA with an
/// explicit sink state and its partial counterpart share one normal form.
pub fn normal_form(automaton: impl Into<Automaton>) -> Dfa {
    let dfa = automaton.into().into_dfa();
    canonize(&minimize(&remove_dead_states(&dfa)))
}

/// True if both automata accept the same language over the same alphabet.
///
/// NFA inputs are determinized, then both sides are compared by their normal form.
pub fn equivalent(first: impl Into<Automaton>, second: impl Into<Automaton>) -> bool {
    let first = normal_form(first);
    let second = normal_form(second);
    let result = first == second;

    debug!(
        "equivalence check: {} vs {} states, equivalent = {}",
        first.states().len(),
        second.states().len(),
        result
    );

    result
}
