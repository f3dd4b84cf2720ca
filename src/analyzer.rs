//! This module provides the structural checks run by `validate` on automata and machines:
//! declared states and symbols, the initial state, halting state sets, and rule arity.
//! Checks run in a fixed order and the first violation is reported.

use crate::automaton::FiniteAutomaton;
use crate::types::{AutomatonError, MachineError, State, EPSILON};
use std::collections::BTreeSet;

/// Borrowed view of a Turing machine definition, shared by single- and multi-tape machines.
pub(crate) struct MachineOutline<'a> {
    pub(crate) states: &'a BTreeSet<State>,
    pub(crate) acc_states: &'a BTreeSet<State>,
    pub(crate) rej_states: &'a BTreeSet<State>,
    pub(crate) initial_state: &'a str,
    pub(crate) tape_count: usize,
    pub(crate) rules: Vec<RuleOutline<'a>>,
}

/// One rule of a machine: its endpoints and how many tape slots each part covers.
pub(crate) struct RuleOutline<'a> {
    pub(crate) from: &'a str,
    pub(crate) to: &'a str,
    pub(crate) read: usize,
    pub(crate) write: usize,
    pub(crate) moves: usize,
}

impl MachineOutline<'_> {
    fn is_known(&self, state: &str) -> bool {
        self.states.contains(state)
            || self.acc_states.contains(state)
            || self.rej_states.contains(state)
    }
}

/// Analyzes a finite automaton for structural errors.
///
/// # Returns
///
/// * `Ok(())` if the automaton is valid.
/// * `Err(AutomatonError)` describing the first violation found.
pub fn analyze_automaton<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    let checks: [fn(&A) -> Result<(), AutomatonError>; 6] = [
        check_alphabet,
        check_states,
        check_initial_state,
        check_final_states,
        check_transition_states,
        check_transition_symbols,
    ];

    checks.iter().try_for_each(|check| check(automaton))
}

fn check_alphabet<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    if A::DETERMINISTIC && automaton.alphabet().contains(EPSILON) {
        return Err(AutomatonError::EpsilonInDfa);
    }

    Ok(())
}

fn check_states<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    if automaton.states().is_empty() {
        return Err(AutomatonError::EmptyStates);
    }

    Ok(())
}

fn check_initial_state<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    if !automaton.states().contains(automaton.initial_state()) {
        return Err(AutomatonError::UnknownInitialState(
            automaton.initial_state().to_string(),
        ));
    }

    Ok(())
}

fn check_final_states<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    let unknown: Vec<State> = automaton
        .final_states()
        .difference(automaton.states())
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(AutomatonError::UnknownFinalStates(unknown));
    }

    Ok(())
}

/// Every source and destination of a transition must be declared.
fn check_transition_states<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    let (states, _) = automaton.transition_domain();
    let unknown: Vec<State> = states
        .into_iter()
        .filter(|state| !automaton.states().contains(*state))
        .map(str::to_string)
        .collect();

    if !unknown.is_empty() {
        return Err(AutomatonError::UnknownStates(unknown));
    }

    Ok(())
}

fn check_transition_symbols<A: FiniteAutomaton>(automaton: &A) -> Result<(), AutomatonError> {
    let (_, symbols) = automaton.transition_domain();
    let unknown: Vec<State> = symbols
        .into_iter()
        .filter(|symbol| !automaton.alphabet().contains(*symbol))
        .map(str::to_string)
        .collect();

    if !unknown.is_empty() {
        return Err(AutomatonError::UnknownSymbols(unknown));
    }

    Ok(())
}

/// Analyzes a Turing machine definition for structural errors.
///
/// # Returns
///
/// * `Ok(())` if the machine is valid.
/// * `Err(MachineError)` describing the first violation found.
pub(crate) fn analyze_machine(machine: &MachineOutline<'_>) -> Result<(), MachineError> {
    let checks: [fn(&MachineOutline<'_>) -> Result<(), MachineError>; 4] = [
        check_machine_initial_state,
        check_halt_states,
        check_rule_states,
        check_rule_arity,
    ];

    checks.iter().try_for_each(|check| check(machine))
}

fn check_machine_initial_state(machine: &MachineOutline<'_>) -> Result<(), MachineError> {
    if !machine.is_known(machine.initial_state) {
        return Err(MachineError::UnknownState(
            machine.initial_state.to_string(),
        ));
    }

    Ok(())
}

/// A state cannot be both accepting and rejecting.
fn check_halt_states(machine: &MachineOutline<'_>) -> Result<(), MachineError> {
    let conflicting: Vec<State> = machine
        .acc_states
        .intersection(machine.rej_states)
        .cloned()
        .collect();

    if !conflicting.is_empty() {
        return Err(MachineError::ConflictingHaltStates(conflicting));
    }

    Ok(())
}

fn check_rule_states(machine: &MachineOutline<'_>) -> Result<(), MachineError> {
    let undefined: BTreeSet<&str> = machine
        .rules
        .iter()
        .flat_map(|rule| [rule.from, rule.to])
        .filter(|state| !machine.is_known(state))
        .collect();

    if !undefined.is_empty() {
        return Err(MachineError::Validation(format!(
            "Rules reference undeclared states: {:?}",
            undefined
        )));
    }

    Ok(())
}

/// Read, write and move parts of every rule must cover each tape exactly once.
fn check_rule_arity(machine: &MachineOutline<'_>) -> Result<(), MachineError> {
    let expected = machine.tape_count;
    machine
        .rules
        .iter()
        .find(|rule| [rule.read, rule.write, rule.moves] != [expected; 3])
        .map_or(Ok(()), |rule| {
            Err(MachineError::ArityMismatch {
                state: rule.from.to_string(),
                expected,
            })
        })
}
