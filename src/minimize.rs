//! Reachability pruning and partition-refinement minimization of DFAs.

use crate::automaton::{AutomatonCore, FiniteAutomaton};
use crate::dfa::{Dfa, DfaTransitions};
use crate::types::State;
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A group of equivalent states.
type Group = BTreeSet<State>;
/// For each symbol in alphabet order, the group index of the successor (if any).
type Signature = Vec<Option<usize>>;

/// Returns a copy of `automaton` without the states unreachable from its initial state.
pub fn remove_unreachable_states<A: FiniteAutomaton>(automaton: &A) -> A {
    let reachable = reachable_states(automaton);
    let mut result = automaton.clone();

    for state in automaton.states().difference(&reachable) {
        trace!("removing unreachable state {}", state);
        result.remove_state(state);
    }

    result
}

/// Breadth-first search from the initial state over every transition.
fn reachable_states<A: FiniteAutomaton>(automaton: &A) -> BTreeSet<State> {
    let initial = automaton.initial_state().to_string();
    let mut reachable = BTreeSet::from([initial.clone()]);
    let mut queue = VecDeque::from([initial]);

    while let Some(state) = queue.pop_front() {
        for next in automaton.successors(&state) {
            if reachable.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    reachable
}

/// Returns a copy of `automaton` without states from which no final state is reachable.
///
/// The initial state is always kept; if it is itself dead, its rules are dropped so the
/// result is the one-state automaton of the empty language.
pub fn remove_dead_states(automaton: &Dfa) -> Dfa {
    let mut predecessors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (from, rules) in automaton.transitions() {
        for to in rules.values() {
            predecessors
                .entry(to.as_str())
                .or_default()
                .insert(from.as_str());
        }
    }

    let finals = automaton.final_states().iter().map(String::as_str);
    let mut live: BTreeSet<&str> = finals.collect();
    let mut queue: VecDeque<&str> = live.iter().copied().collect();
    while let Some(state) = queue.pop_front() {
        for &previous in predecessors.get(state).into_iter().flatten() {
            if live.insert(previous) {
                queue.push_back(previous);
            }
        }
    }

    let mut result = automaton.clone();
    for state in automaton.states() {
        if !live.contains(state.as_str()) && !result.remove_state(state) {
            // The initial state cannot be removed; keep it without rules.
            for symbol in automaton.alphabet() {
                result.remove_transition(state, symbol);
            }
        }
    }

    result
}

/// Returns the minimal DFA accepting the same language as `automaton`.
///
/// Unreachable states are pruned, then the final/non-final partition is refined until the
/// number of groups stops changing. Result states are named after group indices.
pub fn minimize(automaton: &Dfa) -> Dfa {
    let reachable = remove_unreachable_states(automaton);
    let symbols: Vec<&str> = reachable.alphabet().iter().map(String::as_str).collect();

    let (finals, others): (Group, Group) = reachable
        .states()
        .iter()
        .cloned()
        .partition(|state| reachable.is_final(state));
    let mut groups: Vec<Group> = [finals, others]
        .into_iter()
        .filter(|group| !group.is_empty())
        .collect();

    let mut round = 0;
    let signatures = loop {
        round += 1;
        let (next, signatures) = {
            let group_of = index_groups(&groups);
            let signatures: BTreeMap<State, Signature> = reachable
                .states()
                .iter()
                .map(|state| {
                    let signature = symbols
                        .iter()
                        .map(|symbol| {
                            reachable
                                .get_transition(state, symbol)
                                .and_then(|next| group_of.get(next).copied())
                        })
                        .collect();
                    (state.clone(), signature)
                })
                .collect();

            // Ordered by previous group first, so a stable round keeps group indices.
            let mut refined: BTreeMap<(usize, &Signature), Group> = BTreeMap::new();
            for (state, signature) in &signatures {
                refined
                    .entry((group_of[state.as_str()], signature))
                    .or_default()
                    .insert(state.clone());
            }

            let next: Vec<Group> = refined.into_values().collect();
            (next, signatures)
        };

        trace!("round {}: {} groups", round, next.len());
        let stable = next.len() == groups.len();
        groups = next;
        if stable {
            break signatures;
        }
    };

    build_minimized(&reachable, &groups, &signatures, &symbols)
}

fn index_groups(groups: &[Group]) -> BTreeMap<&str, usize> {
    let mut indices = BTreeMap::new();
    for (index, group) in groups.iter().enumerate() {
        for state in group {
            indices.insert(state.as_str(), index);
        }
    }
    indices
}

fn build_minimized(
    reachable: &Dfa,
    groups: &[Group],
    signatures: &BTreeMap<State, Signature>,
    symbols: &[&str],
) -> Dfa {
    let mut states = BTreeSet::new();
    let mut final_states = BTreeSet::new();
    let mut initial_state = String::new();
    let mut transitions = DfaTransitions::new();

    for (index, group) in groups.iter().enumerate() {
        let name = index.to_string();
        states.insert(name.clone());

        if group.iter().any(|state| reachable.is_final(state)) {
            final_states.insert(name.clone());
        }
        if group.contains(reachable.initial_state()) {
            initial_state = name.clone();
        }

        let Some(representative) = group.iter().next() else {
            continue;
        };
        let signature = &signatures[representative];
        debug_assert!(
            group.iter().all(|member| &signatures[member] == signature),
            "group {} has members with diverging transitions",
            index
        );

        for (symbol, target) in symbols.iter().zip(signature) {
            if let Some(target) = target {
                transitions
                    .entry(name.clone())
                    .or_default()
                    .insert(symbol.to_string(), target.to_string());
            }
        }
    }

    debug!(
        "minimized {} states into {}",
        reachable.states().len(),
        states.len()
    );

    Dfa::from_parts(
        AutomatonCore {
            states,
            alphabet: reachable.alphabet().clone(),
            initial_state,
            final_states,
        },
        transitions,
    )
}
