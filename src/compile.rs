//! Semantic evaluation: ABNF syntax down to automata.
//!
//! Rule references are resolved against the rulelist (with the core rules as
//! fallback), checked for recursion, and each node is lowered to an NFA over
//! closed character ranges before subset construction.
use std::collections::{BTreeMap, BTreeSet};

use reglang_automata::{ClosedRangeAlphabet, RangeSet, DFA, NFA};

use crate::abnf::ast::{
	Alternation, CharVal, Concatenation, Element, NumVal, NumValKind, RepeatSpec, Repetition,
	Rulelist, Rulename,
};
use crate::abnf::core::core_rule;
use crate::Error;

/// Transition class of compiled automata.
pub type Class = RangeSet<char>;

impl Rulelist {
	/// Compile every rule of the list to a minimized DFA.
	pub fn compile(&self) -> Result<BTreeMap<Rulename, DFA<Class>>, Error> {
		let mut compiler = Compiler::new(self);
		let mut result = BTreeMap::new();

		for name in self.names() {
			let nfa = compiler.rule_nfa(name)?;
			result.insert(name.clone(), DFA::from_nfa(&nfa).minimize());
		}

		Ok(result)
	}

	/// Compile one rule of the list to a minimized DFA.
	pub fn compile_rule(&self, name: &Rulename) -> Result<DFA<Class>, Error> {
		let nfa = Compiler::new(self).rule_nfa(name)?;
		Ok(DFA::from_nfa(&nfa).minimize())
	}

	/// Like [`Self::compile_rule`], failing with [`Error::Overlarge`] when
	/// the deterministic automaton exceeds `max_states` states before
	/// minimization.
	pub fn compile_rule_bounded(
		&self,
		name: &Rulename,
		max_states: usize,
	) -> Result<DFA<Class>, Error> {
		let nfa = Compiler::new(self).rule_nfa(name)?;
		let dfa = DFA::from_nfa(&nfa);

		let states = dfa.state_count();
		if states > max_states {
			return Err(Error::Overlarge {
				states,
				limit: max_states,
			});
		}

		Ok(dfa.minimize())
	}
}

impl Alternation {
	/// Compile the node against the rules of `rulelist`.
	pub fn compile(&self, rulelist: &Rulelist) -> Result<DFA<Class>, Error> {
		let nfa = Compiler::new(rulelist).alternation_nfa(self)?;
		Ok(DFA::from_nfa(&nfa).minimize())
	}

	/// The alphabet partition induced by the node.
	///
	/// Rule references contribute nothing; resolve them by compiling when
	/// the full alphabet is needed.
	pub fn alphabet(&self) -> ClosedRangeAlphabet<char> {
		let mut alphabet = ClosedRangeAlphabet::new();
		self.collect_classes(&mut alphabet);
		alphabet
	}

	fn collect_classes(&self, alphabet: &mut ClosedRangeAlphabet<char>) {
		for alternative in &self.alternatives {
			for repetition in &alternative.repetitions {
				repetition.element.collect_classes(alphabet);
			}
		}
	}
}

impl Element {
	fn collect_classes(&self, alphabet: &mut ClosedRangeAlphabet<char>) {
		match self {
			Self::Rulename(_) | Self::ProseVal(_) => {}
			Self::Group(group) => group.0.collect_classes(alphabet),
			Self::Option(option) => option.0.collect_classes(alphabet),
			Self::CharVal(value) => {
				for c in value.value.chars() {
					alphabet.insert(char_val_class(c, value.case_sensitive));
				}
			}
			Self::NumVal(value) => match &value.kind {
				NumValKind::Sequence(values) => {
					for c in values {
						alphabet.insert(singleton(*c));
					}
				}
				NumValKind::Range(first, last) => {
					let mut class = RangeSet::new();
					class.insert(*first..=*last);
					alphabet.insert(class);
				}
			},
		}
	}
}

fn singleton(c: char) -> Class {
	let mut class = RangeSet::new();
	class.insert(c..=c);
	class
}

/// The class matched by one character of a char-val: both case variants
/// unless matching is case-sensitive.
fn char_val_class(c: char, case_sensitive: bool) -> Class {
	let mut class = singleton(c);

	if !case_sensitive && c.is_ascii_alphabetic() {
		let folded = if c.is_ascii_lowercase() {
			c.to_ascii_uppercase()
		} else {
			c.to_ascii_lowercase()
		};
		class.insert(folded..=folded);
	}

	class
}

struct Compiler<'a> {
	rulelist: &'a Rulelist,
	visiting: BTreeSet<Rulename>,
	cache: BTreeMap<Rulename, NFA<Class>>,
}

impl<'a> Compiler<'a> {
	fn new(rulelist: &'a Rulelist) -> Self {
		Self {
			rulelist,
			visiting: BTreeSet::new(),
			cache: BTreeMap::new(),
		}
	}

	fn rule_nfa(&mut self, name: &Rulename) -> Result<NFA<Class>, Error> {
		if let Some(nfa) = self.cache.get(name) {
			return Ok(nfa.clone());
		}

		if self.visiting.contains(name) {
			return Err(Error::NotRegular(name.to_string()));
		}

		let rule = self
			.rulelist
			.get(name)
			.or_else(|| core_rule(name))
			.ok_or_else(|| Error::UndefinedRule(name.to_string()))?;

		self.visiting.insert(name.clone());
		let nfa = self.alternation_nfa(&rule.alternation)?;
		self.visiting.remove(name);

		self.cache.insert(name.clone(), nfa.clone());
		Ok(nfa)
	}

	fn alternation_nfa(&mut self, alternation: &Alternation) -> Result<NFA<Class>, Error> {
		let mut alternatives = alternation.alternatives.iter();

		let mut nfa = match alternatives.next() {
			Some(first) => self.concatenation_nfa(first)?,
			None => return Ok(NFA::empty()),
		};

		for alternative in alternatives {
			nfa = nfa.union(self.concatenation_nfa(alternative)?);
		}

		Ok(nfa)
	}

	fn concatenation_nfa(&mut self, concatenation: &Concatenation) -> Result<NFA<Class>, Error> {
		let mut nfa = NFA::epsilon();
		for repetition in &concatenation.repetitions {
			nfa = nfa.concat(self.repetition_nfa(repetition)?);
		}
		Ok(nfa)
	}

	fn repetition_nfa(&mut self, repetition: &Repetition) -> Result<NFA<Class>, Error> {
		let inner = self.element_nfa(&repetition.element)?;

		match repetition.repeat {
			None => Ok(inner),
			Some(RepeatSpec::Exact(n)) => Ok(inner.repeat(n, Some(n))),
			Some(RepeatSpec::Range { min, max }) => Ok(inner.repeat(min.unwrap_or(0), max)),
			Some(RepeatSpec::List { min, max }) => Ok(list_nfa(inner, min.unwrap_or(0), max)),
		}
	}

	fn element_nfa(&mut self, element: &Element) -> Result<NFA<Class>, Error> {
		match element {
			Element::Rulename(name) => self.rule_nfa(name),
			Element::Group(group) => self.alternation_nfa(&group.0),
			Element::Option(option) => Ok(self.alternation_nfa(&option.0)?.optional()),
			Element::CharVal(value) => Ok(char_val_nfa(value)),
			Element::NumVal(value) => Ok(num_val_nfa(value)),
			Element::ProseVal(prose) => Err(Error::Prose(prose.0.clone())),
		}
	}
}

fn char_val_nfa(value: &CharVal) -> NFA<Class> {
	let mut nfa = NFA::epsilon();
	for c in value.value.chars() {
		nfa = nfa.concat(NFA::from_class(char_val_class(c, value.case_sensitive)));
	}
	nfa
}

fn num_val_nfa(value: &NumVal) -> NFA<Class> {
	match &value.kind {
		NumValKind::Sequence(values) => NFA::verbatim(values.iter().copied()),
		NumValKind::Range(first, last) => {
			let mut class = RangeSet::new();
			class.insert(*first..=*last);
			NFA::from_class(class)
		}
	}
}

/// The HTTP-style list: `min` to `max` items separated by a comma with
/// optional surrounding whitespace. The separator is mandatory between
/// items.
fn list_nfa(item: NFA<Class>, min: u32, max: Option<u32>) -> NFA<Class> {
	if let Some(max) = max {
		if max < min {
			return NFA::empty();
		}

		if max == 0 {
			return NFA::epsilon();
		}
	}

	let mut ws = RangeSet::new();
	ws.insert(' '..=' ');
	ws.insert('\t'..='\t');

	let ows = NFA::from_class(ws).star();
	let separator = ows.clone().concat(NFA::symbol(',')).concat(ows);
	let tail = separator.concat(item.clone());

	let at_least_one = item.concat(tail.repeat(
		min.saturating_sub(1),
		max.map(|max| max - 1),
	));

	if min == 0 {
		at_least_one.optional()
	} else {
		at_least_one
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abnf::parser::Parse;

	fn compile_first(input: &str) -> DFA<Class> {
		let rulelist = Rulelist::parse(input).unwrap();
		let name = rulelist.rules[0].name.clone();
		rulelist.compile_rule(&name).unwrap()
	}

	#[test]
	fn char_val_is_case_insensitive_by_default() {
		let dfa = compile_first("r = \"Foo\"\r\n");
		for accepted in ["Foo", "foo", "FOO", "fOo"] {
			assert!(dfa.contains(accepted.chars()), "{accepted} rejected");
		}
		assert!(!dfa.contains("Fo".chars()));
	}

	#[test]
	fn sensitive_char_val_matches_exactly() {
		let dfa = compile_first("r = %s\"Foo\"\r\n");
		assert!(dfa.contains("Foo".chars()));
		assert!(!dfa.contains("foo".chars()));
		assert!(!dfa.contains("FOO".chars()));
	}

	#[test]
	fn incremental_rules_compile_together() {
		let rulelist = Rulelist::parse("rule = %x20\r\nrule =/ %x30\r\n").unwrap();
		let dfa = rulelist.compile_rule(&Rulename::new("rule")).unwrap();
		assert!(dfa.contains(" ".chars()));
		assert!(dfa.contains("0".chars()));
		assert!(!dfa.contains("00".chars()));
	}

	#[test]
	fn list_notation_requires_separators() {
		let rulelist = Rulelist::parse("r = 2#4foo\r\nfoo = \"x\"\r\n").unwrap();
		let dfa = rulelist.compile_rule(&Rulename::new("r")).unwrap();

		for accepted in ["x,x", "x,x,x", "x,x,x,x", "x , x"] {
			assert!(dfa.contains(accepted.chars()), "{accepted} rejected");
		}
		for rejected in ["x", "x,x,x,x,x", "xx", ""] {
			assert!(!dfa.contains(rejected.chars()), "{rejected} accepted");
		}
	}

	#[test]
	fn rule_references_resolve_through_core() {
		let dfa = compile_first("r = 2DIGIT\r\n");
		assert!(dfa.contains("42".chars()));
		assert!(!dfa.contains("4".chars()));
		assert!(!dfa.contains("4a".chars()));
	}

	#[test]
	fn undefined_rule_reference() {
		let rulelist = Rulelist::parse("r = missing\r\n").unwrap();
		assert!(matches!(
			rulelist.compile_rule(&Rulename::new("r")),
			Err(Error::UndefinedRule(name)) if name == "missing"
		));
	}

	#[test]
	fn recursive_rules_are_rejected() {
		let rulelist = Rulelist::parse("a = \"x\" b\r\nb = a / \"y\"\r\n").unwrap();
		assert!(matches!(
			rulelist.compile_rule(&Rulename::new("a")),
			Err(Error::NotRegular(_))
		));

		let rulelist = Rulelist::parse("a = \"x\" a\r\n").unwrap();
		assert!(matches!(
			rulelist.compile_rule(&Rulename::new("a")),
			Err(Error::NotRegular(_))
		));
	}

	#[test]
	fn prose_values_cannot_compile() {
		let rulelist = Rulelist::parse("r = <anything at all>\r\n").unwrap();
		assert!(matches!(
			rulelist.compile_rule(&Rulename::new("r")),
			Err(Error::Prose(_))
		));
	}

	#[test]
	fn optional_groups() {
		let dfa = compile_first("r = \"a\" [\"b\"]\r\n");
		assert!(dfa.contains("a".chars()));
		assert!(dfa.contains("ab".chars()));
		assert!(!dfa.contains("b".chars()));
	}

	#[test]
	fn alphabet_of_a_node() {
		let alternation = Alternation::parse("%x30-39 / \"a\"").unwrap();
		let alphabet = alternation.alphabet();
		assert!(alphabet.contains(&'5'));
		assert!(alphabet.contains(&'a'));
		assert!(alphabet.contains(&'A'));
		assert!(!alphabet.contains(&'z'));
	}

	#[test]
	fn bounded_compilation() {
		let rulelist = Rulelist::parse("r = 1*8DIGIT\r\n").unwrap();
		assert!(matches!(
			rulelist.compile_rule_bounded(&Rulename::new("r"), 2),
			Err(Error::Overlarge { .. })
		));
		assert!(rulelist
			.compile_rule_bounded(&Rulename::new("r"), 64)
			.is_ok());
	}
}
