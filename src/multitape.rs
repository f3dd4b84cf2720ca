//! This module defines the `MultiTapeMachine`, a Turing machine reading and writing several
//! tapes in lock-step. Rules are keyed by the tuple of symbols under all heads.

use crate::analyzer::{analyze_machine, MachineOutline, RuleOutline};
use crate::machine::{label_set, MachineCore};
use crate::tape::Tape;
use crate::types::{MachineError, MultiRule, Outcome, Rejection, State, Step, Symbol};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

/// Transitions: state -> symbols under the heads (one per tape) -> rule.
pub type MtmTransitions = BTreeMap<State, BTreeMap<Vec<Symbol>, MultiRule>>;

/// Builds a transition map from `(state, read, rule)` triples.
pub fn rules<'a, R>(entries: impl IntoIterator<Item = (&'a str, R, MultiRule)>) -> MtmTransitions
where
    R: IntoIterator<Item = &'a str>,
{
    let mut transitions = MtmTransitions::new();
    for (state, read, rule) in entries {
        transitions
            .entry(state.to_string())
            .or_default()
            .insert(read.into_iter().map(str::to_string).collect(), rule);
    }
    transitions
}

/// Represents a multi-tape Turing machine.
///
/// All tapes share one state, one step counter, and one verdict.
#[derive(Debug, Clone)]
pub struct MultiTapeMachine {
    core: MachineCore,
    tape_count: usize,
    transitions: MtmTransitions,
    tapes: Vec<Tape>,
    state: State,
    step_count: usize,
}

impl MultiTapeMachine {
    /// Creates a machine with `tape_count` blank tapes and the default settings.
    pub fn new<S, A, F, R>(
        states: S,
        input_alphabet: A,
        acc_states: F,
        rej_states: R,
        transitions: MtmTransitions,
        tape_count: usize,
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
            tapes: vec![Tape::new(core.empty_symbol.clone()); tape_count],
            core,
            tape_count,
            transitions,
            step_count: 0,
        }
    }

    /// Replaces the tapes. Their common blank becomes the machine's empty symbol.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::TapeCountMismatch)` unless exactly `tape_count` tapes are given.
    /// * `Err(MachineError::BlankMismatch)` if the tapes do not share one blank symbol.
    pub fn with_tapes(mut self, tapes: Vec<Tape>) -> Result<Self, MachineError> {
        if tapes.len() != self.tape_count {
            return Err(MachineError::TapeCountMismatch {
                expected: self.tape_count,
                actual: tapes.len(),
            });
        }

        if let Some(first) = tapes.first() {
            let blank = first.blank();
            if let Some(other) = tapes.iter().find(|tape| tape.blank() != blank) {
                return Err(MachineError::BlankMismatch {
                    expected: blank.to_string(),
                    actual: other.blank().to_string(),
                });
            }
            self.core.empty_symbol = blank.to_string();
        }

        self.tapes = tapes;
        Ok(self)
    }

    pub fn with_start_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.core.start_symbol = symbol.into();
        self
    }

    /// Sets the blank symbol and replaces every tape with a blank one.
    ///
    /// Tapes given to [`with_tapes`](Self::with_tapes) earlier are discarded, so call this first.
    pub fn with_empty_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.core.empty_symbol = symbol.into();
        self.tapes = vec![Tape::new(self.core.empty_symbol.as_str()); self.tape_count];
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.core.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.core.max_steps
    }

    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.core.max_steps = max_steps;
    }

    pub fn tape_count(&self) -> usize {
        self.tape_count
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

    pub fn transitions(&self) -> &MtmTransitions {
        &self.transitions
    }

    /// Returns the rule for `state` reading `read` (one symbol per tape), if any.
    pub fn get_transition<S: AsRef<str>>(&self, state: &str, read: &[S]) -> Option<&MultiRule> {
        let key: Vec<Symbol> = read
            .iter()
            .map(|symbol| symbol.as_ref().to_string())
            .collect();
        self.transitions
            .get(state)
            .and_then(|rules| rules.get(&key))
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

    fn tape_mut(&mut self, index: usize) -> Result<&mut Tape, MachineError> {
        let count = self.tapes.len();
        self.tapes
            .get_mut(index)
            .ok_or(MachineError::TapeIndexOutOfBounds { index, count })
    }

    /// Writes the start symbol followed by `text` on the tape at `index`, then rewinds its head.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the tape was written.
    /// * `Err(MachineError::TapeIndexOutOfBounds)` if there is no such tape.
    pub fn write_to_tape(&mut self, text: &str, index: usize) -> Result<(), MachineError> {
        let symbols = self.core.input_symbols(text);
        self.tape_mut(index)?.write_symbols(symbols);
        Ok(())
    }

    /// Clears the tape at `index`.
    pub fn clear_tape(&mut self, index: usize) -> Result<(), MachineError> {
        self.tape_mut(index)?.clear();
        Ok(())
    }

    pub fn clear_tapes(&mut self) {
        self.tapes.iter_mut().for_each(Tape::clear);
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    /// Content of the tape at `index` without the leading start symbol.
    pub fn output(&self, index: usize) -> Result<String, MachineError> {
        self.tapes
            .get(index)
            .map(|tape| self.core.output(tape))
            .ok_or(MachineError::TapeIndexOutOfBounds {
                index,
                count: self.tapes.len(),
            })
    }

    /// Returns the symbols under the heads, one per tape.
    ///
    /// | > | a | b |   tape 0
    /// | a | b |       tape 1
    ///       ^         heads [1, 1] read ["a", "b"]
    pub fn current_symbols(&self) -> Vec<&str> {
        self.tapes.iter().map(Tape::current).collect()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns to the initial state and zeroes the step counter. Tapes are left as they are.
    pub fn reset(&mut self) {
        self.state = self.core.initial_state.clone();
        self.step_count = 0;
    }

    /// Executes a single transition on all tapes.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a rule was applied.
    /// * `Step::Halt(_)` with the verdict otherwise. The configuration is left unchanged.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.core.halted_in(&self.state) {
            return Step::Halt(outcome);
        }

        let read = self.current_symbols();
        let Some(rule) = self.get_transition(&self.state, &read).cloned() else {
            return Step::Halt(Outcome::Rejected(Rejection::UndefinedTransition {
                state: self.state.clone(),
                symbols: read.into_iter().map(str::to_string).collect(),
            }));
        };

        if let Some(outcome) = self.core.refuses(&rule.next_state, self.step_count) {
            return Step::Halt(outcome);
        }

        trace!(
            "{}. ({}, {:?}) -> {:?}",
            self.step_count + 1,
            self.state,
            self.current_symbols(),
            rule
        );

        let moves = rule.write.into_iter().zip(rule.directions);
        for (tape, (symbol, direction)) in self.tapes.iter_mut().zip(moves) {
            tape.write_symbol(symbol);
            tape.move_head(direction);
        }
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

    /// Simulates the machine from its initial state on the current tapes.
    pub fn simulate(&mut self) -> bool {
        self.reset();
        self.run().is_accepted()
    }

    /// Checks the initial state, the halting state sets, rule states, and that every rule has
    /// one slot per tape.
    pub fn validate(&self) -> Result<(), MachineError> {
        let rules = self
            .transitions
            .iter()
            .flat_map(|(from, rules)| {
                rules.iter().map(move |(read, rule)| RuleOutline {
                    from,
                    to: &rule.next_state,
                    read: read.len(),
                    write: rule.write.len(),
                    moves: rule.directions.len(),
                })
            })
            .collect();

        analyze_machine(&MachineOutline {
            states: &self.core.states,
            acc_states: &self.core.acc_states,
            rej_states: &self.core.rej_states,
            initial_state: &self.core.initial_state,
            tape_count: self.tape_count,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::two_tape_palindrome_machine;
    use crate::types::Direction::Stay;

    #[test]
    fn test_machine_creation() {
        let machine = two_tape_palindrome_machine();

        assert_eq!(machine.tape_count(), 2);
        assert_eq!(machine.tapes().len(), 2);
        assert_eq!(machine.current_symbols(), vec!["", ""]);
        assert!(machine.validate().is_ok());
    }

    #[test]
    fn test_palindromes() {
        let mut machine = two_tape_palindrome_machine();

        for word in ["", "a", "aa", "abba", "abaaba", "bab"] {
            machine.write_to_tape(word, 0).unwrap();
            assert!(machine.simulate(), "expected {:?} to be accepted", word);
            machine.clear_tapes();
        }

        for word in ["ab", "abaa", "bba"] {
            machine.write_to_tape(word, 0).unwrap();
            assert!(!machine.simulate(), "expected {:?} to be rejected", word);
            machine.clear_tapes();
        }
    }

    #[test]
    fn test_copy_to_second_tape() {
        let mut machine = two_tape_palindrome_machine();
        machine.write_to_tape("ab", 0).unwrap();

        assert_eq!(
            machine.run(),
            Outcome::Rejected(Rejection::RejectingState("reject".to_string()))
        );
        assert_eq!(machine.tapes()[1].content(), "ab");
        assert_eq!(machine.output(0).unwrap(), "ab");
    }

    #[test]
    fn test_lock_step() {
        let mut machine = two_tape_palindrome_machine();
        machine.write_to_tape("a", 0).unwrap();

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.current_symbols(), vec!["a", ""]);
        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.current_symbols(), vec!["", ""]);
        assert_eq!(machine.tapes()[1].head(), 1);
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_undefined_transition() {
        let mut machine = two_tape_palindrome_machine();
        machine.write_to_tape("c", 0).unwrap();

        assert_eq!(
            machine.run(),
            Outcome::Rejected(Rejection::UndefinedTransition {
                state: "copy".to_string(),
                symbols: vec!["c".to_string(), String::new()],
            })
        );
    }

    #[test]
    fn test_step_limit() {
        let mut machine = two_tape_palindrome_machine().with_max_steps(3);
        machine.write_to_tape("abba", 0).unwrap();

        assert_eq!(machine.run(), Outcome::StepLimitExceeded(3));
        assert!(!machine.simulate());
    }

    #[test]
    fn test_tape_index_out_of_bounds() {
        let mut machine = two_tape_palindrome_machine();

        assert_eq!(
            machine.write_to_tape("a", 2),
            Err(MachineError::TapeIndexOutOfBounds { index: 2, count: 2 })
        );
        assert!(machine.clear_tape(5).is_err());
        assert!(machine.output(2).is_err());
        assert!(machine.clear_tape(1).is_ok());
    }

    #[test]
    fn test_with_tapes() {
        let machine = two_tape_palindrome_machine();
        let result = machine.clone().with_tapes(vec![Tape::default()]);

        assert_eq!(
            result.map(|_| ()),
            Err(MachineError::TapeCountMismatch {
                expected: 2,
                actual: 1,
            })
        );

        let mut tape = Tape::default();
        tape.write(">bb");
        let mut machine = machine.with_tapes(vec![tape, Tape::default()]).unwrap();
        assert!(machine.simulate());
    }

    #[test]
    fn test_with_tapes_adopts_common_blank() {
        let machine = two_tape_palindrome_machine();
        let mixed = vec![Tape::new("_"), Tape::default()];

        assert_eq!(
            machine.clone().with_tapes(mixed).map(|_| ()),
            Err(MachineError::BlankMismatch {
                expected: "_".to_string(),
                actual: String::new(),
            })
        );

        let machine = machine.with_tapes(vec![Tape::new("_"), Tape::new("_")]);
        assert_eq!(machine.unwrap().current_symbols(), vec!["_", "_"]);
    }

    #[test]
    fn test_with_empty_symbol_replaces_tapes() {
        let mut tape = Tape::default();
        tape.write(">a");
        let machine = two_tape_palindrome_machine()
            .with_tapes(vec![tape, Tape::default()])
            .unwrap()
            .with_empty_symbol("_");

        assert_eq!(machine.current_symbols(), vec!["_", "_"]);
        assert_eq!(machine.output(0).unwrap(), "");
    }

    #[test]
    fn test_remove_state() {
        let mut machine = two_tape_palindrome_machine();

        assert!(machine.remove_state("goToStart"));
        assert!(machine.get_transition("copy", &["", ""]).is_none());
        assert!(machine.get_transition("copy", &["a", ""]).is_some());
        assert!(!machine.remove_state("goToStart"));
    }

    #[test]
    fn test_arity_validation() {
        let mut machine = two_tape_palindrome_machine();
        assert!(machine.add_state("odd", false, false));
        let rule = MultiRule::new("odd", ["a"], vec![Stay]);
        let rules = BTreeMap::from([(vec!["a".to_string()], rule)]);
        machine.transitions.insert("odd".to_string(), rules);

        assert_eq!(
            machine.validate(),
            Err(MachineError::ArityMismatch {
                state: "odd".to_string(),
                expected: 2,
            })
        );
    }
}
