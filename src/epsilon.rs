//! Epsilon-transition elimination for nondeterministic automata.

use crate::automaton::FiniteAutomaton;
use crate::nfa::{Nfa, NfaTransitions};
use crate::types::{State, EPSILON};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

/// Computes the epsilon closure of every state.
///
/// The result maps each state to the smallest set containing it and closed under
/// epsilon edges.
pub fn epsilon_closures(automaton: &Nfa) -> BTreeMap<State, BTreeSet<State>> {
    automaton
        .states()
        .iter()
        .map(|state| {
            let closure = automaton.epsilon_closure([state.as_str()]);
            (state.clone(), closure)
        })
        .collect()
}

/// Returns an equivalent NFA over the alphabet without the empty symbol.
///
/// The input is not modified. Without the empty symbol in the alphabet, the result is an
/// identical copy. A state becomes final when its epsilon closure reaches a final state.
pub fn remove_epsilon_transitions(automaton: &Nfa) -> Nfa {
    if !automaton.has_epsilon() {
        return automaton.clone();
    }

    let closures = epsilon_closures(automaton);
    let mut core = automaton.core().clone();
    core.alphabet.remove(EPSILON);

    // Reading a symbol from any state in the closure.
    let mut transitions = NfaTransitions::new();
    for (state, closure) in &closures {
        for symbol in &core.alphabet {
            let reached: BTreeSet<State> = closure
                .iter()
                .flat_map(|member| automaton.get_transition(member, symbol))
                .cloned()
                .collect();

            if !reached.is_empty() {
                transitions
                    .entry(state.clone())
                    .or_default()
                    .insert(symbol.clone(), reached);
            }
        }
    }

    // Absorb the closures of the destinations.
    for rules in transitions.values_mut() {
        for destinations in rules.values_mut() {
            let absorbed: BTreeSet<State> = destinations
                .iter()
                .filter_map(|dest| closures.get(dest))
                .flatten()
                .cloned()
                .collect();
            destinations.extend(absorbed);
        }
    }

    for (state, closure) in &closures {
        if closure.iter().any(|member| automaton.is_final(member)) {
            trace!("state {} reaches a final state by epsilon moves", state);
            core.final_states.insert(state.clone());
        }
    }

    let result = Nfa::from_parts(core, transitions);
    debug!(
        "removed epsilon transitions: {} states, {} final",
        result.states().len(),
        result.final_states().len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::rules;

    fn epsilon_demo() -> Nfa {
        Nfa::new(
            ["0", "1", "2"],
            ["a", "b", EPSILON],
            "0",
            ["2"],
            rules([
                ("0", "a", vec!["1"]),
                ("1", "b", vec!["2"]),
                ("1", EPSILON, vec!["0"]),
                ("2", "a", vec!["2"]),
                ("2", EPSILON, vec!["1"]),
            ]),
        )
    }

    #[test]
    fn test_removes_empty_symbol() {
        let result = remove_epsilon_transitions(&epsilon_demo());

        assert!(!result.has_epsilon());
        assert!(result.alphabet().iter().all(|symbol| !symbol.is_empty()));
        assert!(result.is_valid());
    }

    #[test]
    fn test_language_is_kept() {
        let original = epsilon_demo();
        let result = remove_epsilon_transitions(&original);

        assert!(result.is_accepted("ab"));
        assert!(result.is_accepted("aba"));
        assert!(!result.is_accepted("b"));

        for word in ["", "a", "ab", "aab", "abab", "abba", "abaab", "ba", "bb"] {
            assert_eq!(
                original.is_accepted(word),
                result.is_accepted(word),
                "word {:?}",
                word
            );
        }
    }

    #[test]
    fn test_closure_is_absorbed_into_destinations() {
        let result = remove_epsilon_transitions(&epsilon_demo());

        // 2 reads 'a' into 2, whose closure is {0, 1, 2}
        assert_eq!(result.get_transition("2", "a").len(), 3);
        // 1 reads 'a' through 0 into 1, whose closure is {0, 1}
        assert_eq!(
            result.get_transition("1", "a"),
            &BTreeSet::from(["0".to_string(), "1".to_string()])
        );
    }

    #[test]
    fn test_identity_without_epsilon() {
        let nfa = Nfa::new(
            ["0", "1"],
            ["a"],
            "0",
            ["1"],
            rules([("0", "a", vec!["1"])]),
        );

        assert_eq!(remove_epsilon_transitions(&nfa), nfa);
    }

    #[test]
    fn test_epsilon_into_final_state() {
        let nfa = Nfa::new(
            ["0", "1"],
            ["a", EPSILON],
            "0",
            ["1"],
            rules([("0", EPSILON, vec!["1"]), ("1", "a", vec!["1"])]),
        );
        let result = remove_epsilon_transitions(&nfa);

        assert!(result.is_accepted(""));
        assert!(result.is_accepted("aa"));
        assert!(result.is_final("0"));
    }

    #[test]
    fn test_forward_closure_reference() {
        // 0 -ε-> 1 -ε-> 2 -b-> 3
        let nfa = Nfa::new(
            ["0", "1", "2", "3"],
            ["b", EPSILON],
            "0",
            ["3"],
            rules([
                ("0", EPSILON, vec!["1"]),
                ("1", EPSILON, vec!["2"]),
                ("2", "b", vec!["3"]),
            ]),
        );
        let closures = epsilon_closures(&nfa);

        assert_eq!(closures["0"].len(), 3);
        assert!(remove_epsilon_transitions(&nfa).is_accepted("b"));
    }
}
