//! Built-in demonstration machines and automata.

use crate::machine::{self, DeterministicMachine};
use crate::multitape::{self, MultiTapeMachine};
use crate::nfa::{self, Nfa};
use crate::types::Direction::{Left, Right, Stay};
use crate::types::{MultiRule, Rule, DEFAULT_INITIAL_STATE, EPSILON};

/// Step bound used by the palindrome machines, whose running time is quadratic.
const PALINDROME_MAX_STEPS: usize = 10_000;

/// A ready-to-use program.
#[derive(Debug, Clone)]
pub enum Program {
    Deterministic(DeterministicMachine),
    MultiTape(MultiTapeMachine),
    Automaton(Nfa),
}

/// Describes a built-in program.
pub struct ProgramInfo {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Program,
}

impl ProgramInfo {
    /// Builds a fresh instance of the program.
    pub fn build(&self) -> Program {
        (self.build)()
    }
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<ProgramInfo> = vec![
        ProgramInfo {
            name: "substitution",
            description: "Replaces every 'a' with \"cc\"",
            build: || Program::Deterministic(substitution_machine()),
        },
        ProgramInfo {
            name: "palindrome",
            description: "Accepts palindromes over {a, b}",
            build: || Program::Deterministic(palindrome_machine()),
        },
        ProgramInfo {
            name: "palindrome-two-tape",
            description: "Accepts palindromes over {a, b} using a copy on a second tape",
            build: || Program::MultiTape(two_tape_palindrome_machine()),
        },
        ProgramInfo {
            name: "epsilon-nfa",
            description: "Three-state NFA with epsilon transitions",
            build: || Program::Automaton(epsilon_nfa()),
        },
    ];
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|info| info.name).collect()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Option<Program> {
        PROGRAMS.get(index).map(ProgramInfo::build)
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Option<Program> {
        PROGRAMS
            .iter()
            .find(|info| info.name == name)
            .map(ProgramInfo::build)
    }
}

/// Replaces every 'a' of the input with "cc", shifting the rest to the right.
pub fn substitution_machine() -> DeterministicMachine {
    DeterministicMachine::new(
        [
            DEFAULT_INITIAL_STATE,
            "space",
            "writeA",
            "writeB",
            "findA",
            "back",
        ],
        ["a", "b", "c"],
        ["finish"],
        Vec::<&str>::new(),
        machine::rules([
            (DEFAULT_INITIAL_STATE, ">", Rule::new("findA", ">", Right)),
            ("findA", "a", Rule::new("space", "c", Right)),
            ("findA", "b", Rule::new("findA", "b", Right)),
            ("findA", "", Rule::new("finish", "", Stay)),
            ("space", "a", Rule::new("writeA", "", Right)),
            ("space", "b", Rule::new("writeB", "", Right)),
            ("space", "", Rule::new("finish", "c", Stay)),
            ("writeA", "a", Rule::new("writeA", "a", Right)),
            ("writeA", "b", Rule::new("writeB", "a", Right)),
            ("writeA", "", Rule::new("back", "a", Stay)),
            ("writeB", "a", Rule::new("writeA", "b", Right)),
            ("writeB", "b", Rule::new("writeB", "b", Right)),
            ("writeB", "", Rule::new("back", "b", Stay)),
            ("back", "a", Rule::new("back", "a", Left)),
            ("back", "b", Rule::new("back", "b", Left)),
            ("back", "", Rule::new("findA", "c", Right)),
        ]),
        DEFAULT_INITIAL_STATE,
    )
}

/// Crosses out matching symbols from both ends until the middle is reached.
pub fn palindrome_machine() -> DeterministicMachine {
    DeterministicMachine::new(
        [
            DEFAULT_INITIAL_STATE,
            "mark",
            "foundA",
            "checkA",
            "foundB",
            "checkB",
            "back",
        ],
        ["a", "b"],
        ["accept"],
        ["reject"],
        machine::rules([
            (DEFAULT_INITIAL_STATE, ">", Rule::new("mark", ">", Right)),
            ("mark", "a", Rule::new("foundA", "X", Right)),
            ("mark", "b", Rule::new("foundB", "X", Right)),
            ("mark", "X", Rule::new("accept", "X", Stay)),
            ("mark", "", Rule::new("accept", "", Stay)),
            ("foundA", "a", Rule::new("foundA", "a", Right)),
            ("foundA", "b", Rule::new("foundA", "b", Right)),
            ("foundA", "X", Rule::new("checkA", "X", Left)),
            ("foundA", "", Rule::new("checkA", "", Left)),
            ("checkA", "a", Rule::new("back", "X", Left)),
            ("checkA", "b", Rule::new("reject", "b", Stay)),
            ("checkA", "X", Rule::new("accept", "X", Stay)),
            ("foundB", "a", Rule::new("foundB", "a", Right)),
            ("foundB", "b", Rule::new("foundB", "b", Right)),
            ("foundB", "X", Rule::new("checkB", "X", Left)),
            ("foundB", "", Rule::new("checkB", "", Left)),
            ("checkB", "a", Rule::new("reject", "a", Stay)),
            ("checkB", "b", Rule::new("back", "X", Left)),
            ("checkB", "X", Rule::new("accept", "X", Stay)),
            ("back", "a", Rule::new("back", "a", Left)),
            ("back", "b", Rule::new("back", "b", Left)),
            ("back", "X", Rule::new("mark", "X", Right)),
        ]),
        DEFAULT_INITIAL_STATE,
    )
    .with_max_steps(PALINDROME_MAX_STEPS)
}

/// Copies the input to the second tape, then compares it backwards against the first.
pub fn two_tape_palindrome_machine() -> MultiTapeMachine {
    MultiTapeMachine::new(
        [DEFAULT_INITIAL_STATE, "copy", "goToStart", "check"],
        ["a", "b"],
        ["accept"],
        ["reject"],
        multitape::rules([
            (
                DEFAULT_INITIAL_STATE,
                [">", ""],
                MultiRule::new("copy", [">", ""], vec![Right, Stay]),
            ),
            (
                "copy",
                ["a", ""],
                MultiRule::new("copy", ["a", "a"], vec![Right, Right]),
            ),
            (
                "copy",
                ["b", ""],
                MultiRule::new("copy", ["b", "b"], vec![Right, Right]),
            ),
            (
                "copy",
                ["", ""],
                MultiRule::new("goToStart", ["", ""], vec![Left, Stay]),
            ),
            (
                "goToStart",
                ["a", ""],
                MultiRule::new("goToStart", ["a", ""], vec![Left, Stay]),
            ),
            (
                "goToStart",
                ["b", ""],
                MultiRule::new("goToStart", ["b", ""], vec![Left, Stay]),
            ),
            (
                "goToStart",
                [">", ""],
                MultiRule::new("check", [">", ""], vec![Right, Left]),
            ),
            (
                "check",
                ["a", "a"],
                MultiRule::new("check", ["a", "a"], vec![Right, Left]),
            ),
            (
                "check",
                ["b", "b"],
                MultiRule::new("check", ["b", "b"], vec![Right, Left]),
            ),
            (
                "check",
                ["", ""],
                MultiRule::new("accept", ["", ""], vec![Stay, Stay]),
            ),
            (
                "check",
                ["a", "b"],
                MultiRule::new("reject", ["a", "b"], vec![Stay, Stay]),
            ),
            (
                "check",
                ["b", "a"],
                MultiRule::new("reject", ["b", "a"], vec![Stay, Stay]),
            ),
        ]),
        2,
        DEFAULT_INITIAL_STATE,
    )
    .with_max_steps(PALINDROME_MAX_STEPS)
}

/// NFA over {a, b} with epsilon moves from 1 back to 0 and from 2 back to 1.
pub fn epsilon_nfa() -> Nfa {
    Nfa::new(
        ["0", "1", "2"],
        ["a", "b", EPSILON],
        "0",
        ["2"],
        nfa::rules([
            ("0", "a", vec!["1"]),
            ("1", "b", vec!["2"]),
            ("1", EPSILON, vec!["0"]),
            ("2", "a", vec!["2"]),
            ("2", EPSILON, vec!["1"]),
        ]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::FiniteAutomaton;
    use crate::epsilon::remove_epsilon_transitions;

    #[test]
    fn test_program_catalogue() {
        assert_eq!(ProgramManager::get_program_count(), 4);
        assert_eq!(
            ProgramManager::list_program_names(),
            vec!["substitution", "palindrome", "palindrome-two-tape", "epsilon-nfa"]
        );
        assert!(ProgramManager::get_program_by_index(4).is_none());
        assert!(ProgramManager::get_program_by_name("missing").is_none());
    }

    #[test]
    fn test_programs_are_valid() {
        for info in PROGRAMS.iter() {
            let valid = match info.build() {
                Program::Deterministic(machine) => machine.validate().is_ok(),
                Program::MultiTape(machine) => machine.validate().is_ok(),
                Program::Automaton(nfa) => nfa.is_valid(),
            };
            assert!(valid, "{}", info.name);
        }
    }

    #[test]
    fn test_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("substitution");
        let Some(Program::Deterministic(mut machine)) = program else {
            panic!("Expected a deterministic machine");
        };

        machine.write_to_tape("aba");
        assert!(machine.simulate());
        assert_eq!(machine.output(), "ccbcc");
    }

    #[test]
    fn test_palindrome_machine() {
        let mut machine = palindrome_machine();

        for word in ["abba", "aa", "", "aba", "b"] {
            machine.write_to_tape(word);
            assert!(machine.simulate(), "expected {:?} to be accepted", word);
            machine.clear_tape();
        }

        for word in ["ab", "abaa", "ba"] {
            machine.write_to_tape(word);
            assert!(!machine.simulate(), "expected {:?} to be rejected", word);
            machine.clear_tape();
        }
    }

    #[test]
    fn test_epsilon_nfa() {
        let nfa = epsilon_nfa();
        let eliminated = remove_epsilon_transitions(&nfa);

        for word in ["ab", "aba"] {
            assert!(nfa.is_accepted(word));
            assert!(eliminated.is_accepted(word));
        }
        assert!(!eliminated.is_accepted("b"));
    }
}
