//! Graphviz rendering of automata, as a debugging aid.
use std::fmt::Display;
use std::io::{self, Write};

use crate::class::ClassAlgebra;
use crate::dfa::DFA;
use crate::nfa::NFA;

fn escape(label: &str) -> String {
	label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<C: ClassAlgebra, Q: Clone + Ord + Display> DFA<C, Q> {
	/// Write the automaton as a Graphviz digraph.
	///
	/// `label` renders transition classes; final states get a double
	/// periphery and an unlabeled arrow marks the initial state.
	pub fn to_dot<W: Write>(&self, mut output: W, label: impl Fn(&C) -> String) -> io::Result<()> {
		writeln!(output, "digraph {{")?;
		writeln!(output, "\trankdir = LR;")?;

		for q in self.states() {
			let peripheries = if self.is_final_state(q) { 2 } else { 1 };
			writeln!(
				output,
				"\t\"{q}\" [shape = circle, peripheries = {peripheries}];"
			)?;
		}

		writeln!(output, "\tstart [shape = none, label = \"\"];")?;
		writeln!(output, "\tstart -> \"{}\";", self.initial_state())?;

		for (q, row) in self.transitions().iter() {
			for (class, target) in row {
				writeln!(
					output,
					"\t\"{q}\" -> \"{target}\" [label = \"{}\"];",
					escape(&label(class))
				)?;
			}
		}

		writeln!(output, "}}")
	}
}

impl<C: ClassAlgebra, Q: Clone + Ord + Display> NFA<C, Q> {
	/// Write the automaton as a Graphviz digraph.
	///
	/// ε-transitions are labeled `ε`; every initial state gets its own
	/// unlabeled entry arrow.
	pub fn to_dot<W: Write>(&self, mut output: W, label: impl Fn(&C) -> String) -> io::Result<()> {
		writeln!(output, "digraph {{")?;
		writeln!(output, "\trankdir = LR;")?;

		for (q, _) in self.transitions() {
			let peripheries = if self.is_final_state(q) { 2 } else { 1 };
			writeln!(
				output,
				"\t\"{q}\" [shape = circle, peripheries = {peripheries}];"
			)?;
		}

		for (i, q) in self.initial_states().iter().enumerate() {
			writeln!(output, "\tstart{i} [shape = none, label = \"\"];")?;
			writeln!(output, "\tstart{i} -> \"{q}\";")?;
		}

		for (q, row) in self.transitions() {
			for (class, targets) in row {
				let rendered = match class {
					Some(class) => escape(&label(class)),
					None => "ε".to_owned(),
				};

				for target in targets {
					writeln!(output, "\t\"{q}\" -> \"{target}\" [label = \"{rendered}\"];")?;
				}
			}
		}

		writeln!(output, "}}")
	}
}

#[cfg(test)]
mod tests {
	use crate::class::Single;
	use crate::dfa::DFA;
	use crate::nfa::NFA;

	#[test]
	fn dfa_digraph() {
		let dfa: DFA<Single<char>> = DFA::verbatim("ab".chars());

		let mut out = Vec::new();
		dfa.to_dot(&mut out, |Single(c)| c.to_string()).unwrap();
		let rendered = String::from_utf8(out).unwrap();

		assert!(rendered.starts_with("digraph {"));
		assert!(rendered.contains("\"2\" [shape = circle, peripheries = 2];"));
		assert!(rendered.contains("\"0\" -> \"1\" [label = \"a\"];"));
		assert!(rendered.contains("start -> \"0\";"));
		assert!(rendered.ends_with("}\n"));
	}

	#[test]
	fn nfa_epsilon_edges() {
		let nfa: NFA<Single<char>> = NFA::symbol('x').star();

		let mut out = Vec::new();
		nfa.to_dot(&mut out, |Single(c)| c.to_string()).unwrap();
		let rendered = String::from_utf8(out).unwrap();

		assert!(rendered.contains("[label = \"ε\"];"));
		assert!(rendered.contains("[label = \"x\"];"));
	}

	#[test]
	fn quotes_in_labels_are_escaped() {
		let dfa: DFA<Single<char>> = DFA::symbol('"');

		let mut out = Vec::new();
		dfa.to_dot(&mut out, |Single(c)| c.to_string()).unwrap();
		let rendered = String::from_utf8(out).unwrap();

		assert!(rendered.contains("[label = \"\\\"\"];"));
	}
}
