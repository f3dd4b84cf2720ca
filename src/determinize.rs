//! Subset construction converting an NFA into an equivalent DFA.

use crate::automaton::{AutomatonCore, FiniteAutomaton};
use crate::dfa::{Dfa, DfaTransitions};
use crate::epsilon::remove_epsilon_transitions;
use crate::nfa::Nfa;
use crate::types::State;
use log::{debug, trace};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A set of NFA states forming one DFA state.
type Subset = BTreeSet<State>;

/// Assigns display labels to subsets.
///
/// Subsets are identified by their members; the label is only rendered for the resulting
/// DFA. Singletons keep their member's name, larger subsets render as `{a,b}`. A label
/// already taken by a different subset gets a numeric suffix.
#[derive(Default)]
struct SubsetLabels {
    labels: BTreeMap<Subset, State>,
    taken: BTreeSet<State>,
}

impl SubsetLabels {
    /// Returns the label for `subset` and whether it was seen for the first time.
    fn label(&mut self, subset: &Subset) -> (State, bool) {
        if let Some(label) = self.labels.get(subset) {
            return (label.clone(), false);
        }

        let rendered = match subset.len() {
            1 => subset.iter().next().cloned().unwrap_or_default(),
            _ => {
                let members: Vec<&str> = subset.iter().map(String::as_str).collect();
                format!("{{{}}}", members.join(","))
            }
        };

        let mut label = rendered.clone();
        let mut suffix = 1;
        while self.taken.contains(&label) {
            label = format!("{}#{}", rendered, suffix);
            suffix += 1;
        }

        self.taken.insert(label.clone());
        self.labels.insert(subset.clone(), label.clone());
        (label, true)
    }
}

/// Returns a DFA accepting the same language as `automaton`.
///
/// Epsilon transitions are removed first if the alphabet contains the empty symbol. Only
/// subsets reachable from `{initial_state}` become DFA states. The input is not modified.
pub fn determinize(automaton: &Nfa) -> Dfa {
    let nfa: Cow<'_, Nfa> = if automaton.has_epsilon() {
        Cow::Owned(remove_epsilon_transitions(automaton))
    } else {
        Cow::Borrowed(automaton)
    };

    let mut labels = SubsetLabels::default();
    let initial: Subset = BTreeSet::from([nfa.initial_state().to_string()]);
    let (initial_label, _) = labels.label(&initial);

    let mut states = BTreeSet::new();
    let mut final_states = BTreeSet::new();
    let mut transitions = DfaTransitions::new();
    let mut queue = VecDeque::from([(initial_label.clone(), initial)]);

    while let Some((label, subset)) = queue.pop_front() {
        trace!("processing subset {}: {:?}", label, subset);
        states.insert(label.clone());

        if subset.iter().any(|state| nfa.is_final(state)) {
            final_states.insert(label.clone());
        }

        for symbol in nfa.alphabet() {
            let next: Subset = subset
                .iter()
                .flat_map(|state| nfa.get_transition(state, symbol))
                .cloned()
                .collect();

            if next.is_empty() {
                continue;
            }

            let (next_label, is_new) = labels.label(&next);
            transitions
                .entry(label.clone())
                .or_default()
                .insert(symbol.clone(), next_label.clone());

            if is_new {
                trace!("discovered subset {}: {:?}", next_label, next);
                queue.push_back((next_label, next));
            }
        }
    }

    debug!(
        "determinized {} NFA states into {} DFA states",
        nfa.states().len(),
        states.len()
    );

    Dfa::from_parts(
        AutomatonCore {
            states,
            alphabet: nfa.alphabet().clone(),
            initial_state: initial_label,
            final_states,
        },
        transitions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::rules;
    use crate::types::EPSILON;

    /// Accepts words over {a, b} whose second to last symbol is 'a'.
    fn second_to_last_a() -> Nfa {
        Nfa::new(
            ["0", "1", "2"],
            ["a", "b"],
            "0",
            ["2"],
            rules([
                ("0", "a", vec!["0", "1"]),
                ("0", "b", vec!["0"]),
                ("1", "a", vec!["2"]),
                ("1", "b", vec!["2"]),
            ]),
        )
    }

    #[test]
    fn test_determinize_basic() {
        let nfa = second_to_last_a();
        let dfa = determinize(&nfa);

        assert_eq!(dfa.initial_state(), "0");
        assert_eq!(dfa.states().len(), 4);
        assert_eq!(dfa.alphabet(), nfa.alphabet());
        assert!(dfa.is_valid());

        for word in ["", "a", "ab", "aa", "ba", "bab", "abb", "aab", "bbbab"] {
            assert_eq!(nfa.is_accepted(word), dfa.is_accepted(word), "{}", word);
        }
    }

    #[test]
    fn test_subset_labels() {
        let dfa = determinize(&second_to_last_a());

        assert!(dfa.states().contains("{0,1}"));
        assert!(dfa.states().contains("{0,1,2}"));
        assert!(dfa.is_final("{0,2}"));
        assert_eq!(dfa.get_transition("0", "a"), Some("{0,1}"));
    }

    #[test]
    fn test_subsets_rendering_alike_stay_distinct() {
        // {"a,b", "c"} and {"a", "b,c"} both render as "{a,b,c}"
        let nfa = Nfa::new(
            ["s", "a,b", "c", "a", "b,c"],
            ["a", "b"],
            "s",
            ["c"],
            rules([("s", "a", vec!["a,b", "c"]), ("s", "b", vec!["a", "b,c"])]),
        );
        let dfa = determinize(&nfa);

        assert_eq!(dfa.states().len(), 3);
        assert_eq!(dfa.get_transition("s", "a"), Some("{a,b,c}"));
        assert_eq!(dfa.get_transition("s", "b"), Some("{a,b,c}#1"));
        assert!(dfa.is_final("{a,b,c}"));
        assert!(!dfa.is_final("{a,b,c}#1"));
        assert!(dfa.is_accepted("a"));
        assert!(!dfa.is_accepted("b"));
    }

    #[test]
    fn test_label_clash_gets_suffix() {
        let nfa = Nfa::new(
            ["x", "y", "{x,y}"],
            ["a", "b"],
            "{x,y}",
            ["y"],
            rules([
                ("{x,y}", "a", vec!["x", "y"]),
                ("{x,y}", "b", vec!["{x,y}"]),
            ]),
        );
        let dfa = determinize(&nfa);

        assert_eq!(dfa.states().len(), 2);
        assert!(dfa.states().contains("{x,y}#1"));
        assert!(dfa.is_accepted("ba"));
    }

    #[test]
    fn test_determinize_removes_epsilon_first() {
        let nfa = Nfa::new(
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
        );
        let dfa = determinize(&nfa);

        assert!(!dfa.alphabet().contains(EPSILON));
        assert!(dfa.is_accepted("ab"));
        assert!(dfa.is_accepted("aba"));
        assert!(!dfa.is_accepted("b"));
    }

    #[test]
    fn test_input_is_untouched() {
        let nfa = second_to_last_a();
        let copy = nfa.clone();
        let _ = determinize(&nfa);

        assert_eq!(nfa, copy);
    }
}
