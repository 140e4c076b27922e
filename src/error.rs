use crate::abnf::ParseError;
use reglang_automata::InvalidAutomaton;

/// Errors surfaced by parsing or compiling grammars.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Parse(#[from] ParseError),

	/// A rule name is referenced but neither defined nor a core rule.
	#[error("undefined rule `{0}`")]
	UndefinedRule(String),

	/// The rule graph is recursive; the language is not regular.
	#[error("rule `{0}` is recursive")]
	NotRegular(String),

	/// Prose values describe their content informally and cannot be
	/// compiled.
	#[error("prose value <{0}> cannot be compiled")]
	Prose(String),

	#[error(transparent)]
	Invalid(#[from] InvalidAutomaton),

	/// A configured automaton size ceiling was exceeded.
	#[error("automaton grew to {states} states, over the limit of {limit}")]
	Overlarge { states: usize, limit: usize },
}
