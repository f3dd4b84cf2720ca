//! This module defines the `DeterministicMachine`, a single-tape Turing machine, along with
//! the bookkeeping it shares with the multi-tape machine: state sets, tape symbols, and the
//! halting rules applied before every transition.

use crate::analyzer::{analyze_machine, MachineOutline, RuleOutline};
use crate::tape::Tape;
use crate::types::{
    MachineError, Outcome, Rejection, Rule, State, Step, Symbol, DEFAULT_EMPTY_SYMBOL,
    DEFAULT_MAX_STEPS, DEFAULT_START_SYMBOL,
};
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Transitions: state -> symbol under the head -> rule.
pub type DtmTransitions = BTreeMap<State, BTreeMap<Symbol, Rule>>;

/// Builds a transition map from `(state, read, rule)` triples.
pub fn rules<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str, Rule)>) -> DtmTransitions {
    let mut transitions = DtmTransitions::new();
    for (state, read, rule) in entries {
        transitions
            .entry(state.to_string())
            .or_default()
            .insert(read.to_string(), rule);
    }
    transitions
}

pub(crate) fn label_set<I>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    labels.into_iter().map(Into::into).collect()
}

/// State sets and settings shared by single- and multi-tape machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MachineCore {
    pub(crate) states: BTreeSet<State>,
    pub(crate) input_alphabet: BTreeSet<Symbol>,
    pub(crate) acc_states: BTreeSet<State>,
    pub(crate) rej_states: BTreeSet<State>,
    pub(crate) initial_state: State,
    pub(crate) start_symbol: Symbol,
    pub(crate) empty_symbol: Symbol,
    pub(crate) max_steps: usize,
}

impl MachineCore {
    pub(crate) fn new(
        states: BTreeSet<State>,
        input_alphabet: BTreeSet<Symbol>,
        acc_states: BTreeSet<State>,
        rej_states: BTreeSet<State>,
        initial_state: State,
    ) -> Self {
        Self {
            states,
            input_alphabet,
            acc_states,
            rej_states,
            initial_state,
            start_symbol: DEFAULT_START_SYMBOL.to_string(),
            empty_symbol: DEFAULT_EMPTY_SYMBOL.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// A state is known if it is declared, accepting, or rejecting.
    pub(crate) fn is_known(&self, state: &str) -> bool {
        self.states.contains(state)
            || self.acc_states.contains(state)
            || self.rej_states.contains(state)
    }

    pub(crate) fn add_state(&mut self, state: &str, is_acc: bool, is_rej: bool) -> bool {
        if self.is_known(state) || (is_acc && is_rej) {
            return false;
        }

        if is_acc {
            self.acc_states.insert(state.to_string());
        }
        if is_rej {
            self.rej_states.insert(state.to_string());
        }
        self.states.insert(state.to_string());

        true
    }

    /// Drops the state from every set. The caller purges its rules.
    pub(crate) fn remove_state(&mut self, state: &str) -> bool {
        if !self.is_known(state) {
            return false;
        }

        self.states.remove(state);
        self.acc_states.remove(state);
        self.rej_states.remove(state);

        true
    }

    /// The verdict for a machine sitting in `state`, before any rule is looked up.
    pub(crate) fn halted_in(&self, state: &str) -> Option<Outcome> {
        if self.acc_states.contains(state) {
            return Some(Outcome::Accepted);
        }
        if self.rej_states.contains(state) {
            let rejection = Rejection::RejectingState(state.to_string());
            return Some(Outcome::Rejected(rejection));
        }

        None
    }

    /// The verdict for a matching rule leading to `next` after `step_count` transitions.
    pub(crate) fn refuses(&self, next: &str, step_count: usize) -> Option<Outcome> {
        if self.rej_states.contains(next) {
            let rejection = Rejection::RejectingState(next.to_string());
            return Some(Outcome::Rejected(rejection));
        }
        if step_count >= self.max_steps {
            return Some(Outcome::StepLimitExceeded(self.max_steps));
        }

        None
    }

    /// The start symbol followed by one symbol per character of `text`.
    pub(crate) fn input_symbols(&self, text: &str) -> Vec<Symbol> {
        std::iter::once(self.start_symbol.clone())
            .chain(text.chars().map(String::from))
            .collect()
    }

    /// Tape content without the leading start symbol.
    pub(crate) fn output(&self, tape: &Tape) -> String {
        let content = tape.content();
        match content.strip_prefix(self.start_symbol.as_str()) {
            Some(rest) => rest.to_string(),
            None => content,
        }
    }
}

/// Represents a deterministic single-tape Turing machine.
///
/// The machine owns its tape. Rules are looked up by the current state and the symbol under
/// the head; a missing rule rejects.
#[derive(Debug, Clone, Serialize)]
pub struct DeterministicMachine {
    #[serde(flatten)]
    core: MachineCore,
    transitions: DtmTransitions,
    tape: Tape,
    state: State,
    step_count: usize,
}

impl DeterministicMachine {
    /// Creates a machine with a blank tape, the default start and empty symbols, and the
    /// default step bound.
    pub fn new<S, A, F, R>(
        states: S,
        input_alphabet: A,
        acc_states: F,
        rej_states: R,
        transitions: DtmTransitions,
        initial_state: impl Into<State>,
    ) -> Self
    where
        S: IntoIterator,
        S::Item: Into<State>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
        F: IntoIterator,
        F::Item: Into<State>,
        R: IntoIterator,
        R::Item: Into<State>,
    {
        let core = MachineCore::new(
            label_set(states),
            label_set(input_alphabet),
            label_set(acc_states),
            label_set(rej_states),
            initial_state.into(),
        );

        Self {
            state: core.initial_state.clone(),
            tape: Tape::new(core.empty_symbol.clone()),
            core,
            transitions,
            step_count: 0,
        }
    }

    /// Replaces the tape. The tape's blank becomes the machine's empty symbol.
    pub fn with_tape(mut self, tape: Tape) -> Self {
        self.core.empty_symbol = tape.blank().to_string();
        self.tape = tape;
        self
    }

    pub fn with_start_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.core.start_symbol = symbol.into();
        self
    }

    /// Sets the blank symbol and replaces the tape with a blank one.
    ///
    /// A tape given to [`with_tape`](Self::with_tape) earlier is discarded, so call this first.
    pub fn with_empty_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.core.empty_symbol = symbol.into();
        self.tape = Tape::new(self.core.empty_symbol.clone());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.core.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.core.max_steps
    }

    /// Sets the number of transitions after which the machine is considered looping.
    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.core.max_steps = max_steps;
    }

    pub fn states(&self) -> &BTreeSet<State> {
        &self.core.states
    }

    pub fn input_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.core.input_alphabet
    }

    pub fn acc_states(&self) -> &BTreeSet<State> {
        &self.core.acc_states
    }

    pub fn rej_states(&self) -> &BTreeSet<State> {
        &self.core.rej_states
    }

    pub fn initial_state(&self) -> &str {
        &self.core.initial_state
    }

    pub fn start_symbol(&self) -> &str {
        &self.core.start_symbol
    }

    pub fn empty_symbol(&self) -> &str {
        &self.core.empty_symbol
    }

    pub fn transitions(&self) -> &DtmTransitions {
        &self.transitions
    }

    /// Returns the rule for `state` reading `read`, if any.
    pub fn get_transition(&self, state: &str, read: &str) -> Option<&Rule> {
        self.transitions
            .get(state)
            .and_then(|rules| rules.get(read))
    }

    /// Adds a state, optionally accepting or rejecting.
    ///
    /// Fails if the state is already known or both flags are set.
    pub fn add_state(&mut self, state: &str, is_acc: bool, is_rej: bool) -> bool {
        self.core.add_state(state, is_acc, is_rej)
    }

    /// Removes a state together with the rules from it and the rules leading to it.
    pub fn remove_state(&mut self, state: &str) -> bool {
        if !self.core.remove_state(state) {
            return false;
        }

        self.transitions.remove(state);
        for rules in self.transitions.values_mut() {
            rules.retain(|_, rule| rule.next_state != state);
        }
        self.transitions.retain(|_, rules| !rules.is_empty());

        true
    }

    /// Writes the start symbol followed by `text` from the head, then rewinds it.
    pub fn write_to_tape(&mut self, text: &str) {
        let symbols = self.core.input_symbols(text);
        self.tape.write_symbols(symbols);
    }

    pub fn clear_tape(&mut self) {
        self.tape.clear();
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Tape content without the leading start symbol.
    pub fn output(&self) -> String {
        self.core.output(&self.tape)
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the number of transitions applied since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns to the initial state and zeroes the step counter. The tape is left as is.
    pub fn reset(&mut self) {
        self.state = self.core.initial_state.clone();
        self.step_count = 0;
    }

    /// Executes a single transition.
    ///
    /// Acceptance is checked first, then the rule lookup, then the rejecting states and the
    /// step bound.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a rule was applied.
    /// * `Step::Halt(_)` with the verdict otherwise. The configuration is left unchanged.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.core.halted_in(&self.state) {
            return Step::Halt(outcome);
        }

        let read = self.tape.current();
        let Some(rule) = self.get_transition(&self.state, read).cloned() else {
            return Step::Halt(Outcome::Rejected(Rejection::UndefinedTransition {
                state: self.state.clone(),
                symbols: vec![read.to_string()],
            }));
        };

        if let Some(outcome) = self.core.refuses(&rule.next_state, self.step_count) {
            return Step::Halt(outcome);
        }

        trace!(
            "{}. ({}, {:?}) -> {:?}",
            self.step_count + 1,
            self.state,
            self.tape.current(),
            rule
        );

        self.tape.write_symbol(rule.write);
        self.tape.move_head(rule.direction);
        self.state = rule.next_state;
        self.step_count += 1;

        Step::Continue
    }

    /// Runs from the current configuration until the machine halts.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let Step::Halt(outcome) = self.step() {
                debug!("halted after {} steps: {:?}", self.step_count, outcome);
                return outcome;
            }
        }
    }

    /// Simulates the machine from its initial state on the current tape.
    ///
    /// Returns `false` both for rejection and for exceeding the step bound; use [`run`]
    /// to tell them apart.
    ///
    /// [`run`]: DeterministicMachine::run
    pub fn simulate(&mut self) -> bool {
        self.reset();
        self.run().is_accepted()
    }

    /// Checks the initial state, the halting state sets, and that every rule uses known states.
    pub fn validate(&self) -> Result<(), MachineError> {
        let rules = self
            .transitions
            .iter()
            .flat_map(|(from, rules)| {
                rules.values().map(move |rule| RuleOutline {
                    from,
                    to: &rule.next_state,
                    read: 1,
                    write: 1,
                    moves: 1,
                })
            })
            .collect();

        analyze_machine(&MachineOutline {
            states: &self.core.states,
            acc_states: &self.core.acc_states,
            rej_states: &self.core.rej_states,
            initial_state: &self.core.initial_state,
            tape_count: 1,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::substitution_machine;
    use crate::types::Direction::{Left, Right, Stay};

    /// Two states bouncing the head back and forth forever.
    fn create_looping_machine() -> DeterministicMachine {
        DeterministicMachine::new(
            ["ping", "pong"],
            ["a"],
            ["accept"],
            ["reject"],
            rules([
                ("ping", ">", Rule::new("pong", ">", Right)),
                ("ping", "a", Rule::new("pong", "a", Right)),
                ("pong", "a", Rule::new("ping", "a", Left)),
                ("pong", "", Rule::new("ping", "", Left)),
            ]),
            "ping",
        )
    }

    #[test]
    fn test_machine_creation() {
        let machine = substitution_machine();

        assert_eq!(machine.state(), "init");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.max_steps(), DEFAULT_MAX_STEPS);
        assert_eq!(machine.start_symbol(), ">");
        assert_eq!(machine.tape().current(), "");
        assert!(machine.validate().is_ok());
    }

    #[test]
    fn test_substitution_aba() {
        let mut machine = substitution_machine();
        machine.write_to_tape("aba");

        assert!(machine.simulate());
        assert_eq!(machine.state(), "finish");
        assert_eq!(machine.output(), "ccbcc");
    }

    #[test]
    fn test_substitution_aaa() {
        let mut machine = substitution_machine();
        machine.write_to_tape("aaa");

        assert_eq!(machine.run(), Outcome::Accepted);
        assert_eq!(machine.output(), "cccccc");
    }

    #[test]
    fn test_clear_and_rerun() {
        let mut machine = substitution_machine();
        machine.write_to_tape("aba");
        assert!(machine.simulate());

        machine.clear_tape();
        machine.write_to_tape("b");
        assert!(machine.simulate());
        assert_eq!(machine.output(), "b");
    }

    #[test]
    fn test_single_step() {
        let mut machine = substitution_machine();
        machine.write_to_tape("a");

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.state(), "findA");
        assert_eq!(machine.tape().head(), 1);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_undefined_transition_rejects() {
        let mut machine = substitution_machine();
        machine.write_to_tape("x");
        machine.step();

        assert_eq!(
            machine.run(),
            Outcome::Rejected(Rejection::UndefinedTransition {
                state: "findA".to_string(),
                symbols: vec!["x".to_string()],
            })
        );
    }

    #[test]
    fn test_missing_start_symbol_rejects() {
        let mut machine = substitution_machine();
        machine.write_to_tape("a");
        machine.clear_tape();

        assert!(!machine.simulate());
    }

    #[test]
    fn test_rejecting_state() {
        let mut machine = create_looping_machine();
        machine.transitions.insert(
            "pong".to_string(),
            BTreeMap::from([("a".to_string(), Rule::new("reject", "a", Stay))]),
        );
        machine.write_to_tape("a");

        assert_eq!(
            machine.run(),
            Outcome::Rejected(Rejection::RejectingState("reject".to_string()))
        );
        // the refused rule was not applied
        assert_eq!(machine.state(), "pong");
    }

    #[test]
    fn test_step_limit_is_distinct_from_rejection() {
        let mut machine = create_looping_machine();
        machine.write_to_tape("a");

        assert_eq!(machine.run(), Outcome::StepLimitExceeded(DEFAULT_MAX_STEPS));
        assert_eq!(machine.step_count(), DEFAULT_MAX_STEPS);
        assert!(!machine.simulate());
    }

    #[test]
    fn test_max_steps_setter() {
        let mut machine = create_looping_machine().with_max_steps(7);
        machine.write_to_tape("a");
        assert_eq!(machine.run(), Outcome::StepLimitExceeded(7));

        machine.set_max_steps(3);
        machine.reset();
        assert_eq!(machine.run(), Outcome::StepLimitExceeded(3));
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_accepting_after_last_allowed_step() {
        let mut machine = DeterministicMachine::new(
            ["init"],
            ["a"],
            ["done"],
            Vec::<&str>::new(),
            rules([("init", ">", Rule::new("done", ">", Stay))]),
            "init",
        )
        .with_max_steps(1);
        machine.write_to_tape("");

        assert_eq!(machine.run(), Outcome::Accepted);
    }

    #[test]
    fn test_reset_keeps_tape() {
        let mut machine = substitution_machine();
        machine.write_to_tape("ab");
        machine.step();
        machine.step();
        machine.reset();

        assert_eq!(machine.state(), "init");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().symbols()[1], "c");
    }

    #[test]
    fn test_custom_symbols() {
        let mut machine = DeterministicMachine::new(
            ["init"],
            ["a"],
            ["done"],
            Vec::<&str>::new(),
            rules([
                ("init", "^", Rule::new("init", "^", Right)),
                ("init", "a", Rule::new("init", "a", Right)),
                ("init", "_", Rule::new("done", "_", Stay)),
            ]),
            "init",
        )
        .with_start_symbol("^")
        .with_empty_symbol("_");
        machine.write_to_tape("aa");

        assert!(machine.simulate());
        assert_eq!(machine.output(), "aa");
    }

    #[test]
    fn test_with_tape_adopts_blank() {
        let mut tape = Tape::new("_");
        tape.write(">aa");
        let machine = create_looping_machine().with_tape(tape);

        assert_eq!(machine.empty_symbol(), "_");
        assert_eq!(machine.output(), "aa");

        let machine = machine.with_empty_symbol("#");
        assert_eq!(machine.tape().blank(), "#");
        assert_eq!(machine.output(), "");
    }

    #[test]
    fn test_add_state() {
        let mut machine = substitution_machine();

        assert!(machine.add_state("extra", false, false));
        assert!(!machine.add_state("extra", false, false));
        assert!(!machine.add_state("finish", false, false));
        assert!(!machine.add_state("both", true, true));
        assert!(machine.add_state("nope", false, true));
        assert!(machine.rej_states().contains("nope"));
    }

    #[test]
    fn test_remove_state() {
        let mut machine = substitution_machine();

        assert!(!machine.remove_state("unknown"));
        assert!(machine.remove_state("back"));
        assert!(machine.transitions().get("back").is_none());
        assert!(machine.get_transition("writeA", "").is_none());
        assert!(machine.get_transition("writeA", "a").is_some());
        assert!(machine.remove_state("finish"));
        assert!(machine.acc_states().is_empty());
    }

    #[test]
    fn test_validate() {
        let mut machine = substitution_machine();
        machine.transitions.insert(
            "findA".to_string(),
            BTreeMap::from([("z".to_string(), Rule::new("ghost", "z", Stay))]),
        );

        assert!(matches!(
            machine.validate(),
            Err(MachineError::Validation(msg)) if msg.contains("ghost")
        ));
    }

    #[test]
    fn test_serialize_snapshot() {
        let machine = substitution_machine();
        let json = serde_json::to_value(&machine).unwrap();

        assert_eq!(json["initial_state"], "init");
        assert_eq!(json["max_steps"], 100);
        assert_eq!(json["transitions"]["init"][">"]["direction"], "Right");
    }
}
