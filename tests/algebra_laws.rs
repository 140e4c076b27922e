//! The pattern algebra laws hold semantically in every representation.
use reglang::abnf::{Alternation, Rulelist};
use reglang::automata::{RangeSet, DFA, NFA};
use reglang::syntax::{RegexPattern, RegularPattern, SimpleRegex};
use reglang::Class;

type Dfa = DFA<Class>;

fn assert_equivalent(a: &Dfa, b: &Dfa, law: &str) {
	assert!(a.is_equivalent(b), "law violated: {law}");
}

/// Check the §-algebra laws for one representation, given its projection
/// down to a deterministic automaton.
fn check_laws<P>(to_dfa: impl Fn(&P) -> Dfa)
where
	P: RegularPattern<char> + Clone,
{
	let x = P::verbatim("ab".chars());
	let dx = to_dfa(&x);

	// union units.
	assert_equivalent(&to_dfa(&P::empty().union(x.clone())), &dx, "empty ∪ x = x");
	assert_equivalent(&to_dfa(&x.clone().union(P::empty())), &dx, "x ∪ empty = x");
	assert_equivalent(
		&to_dfa(&P::epsilon().union(P::epsilon())),
		&to_dfa(&P::epsilon()),
		"ε ∪ ε = ε",
	);

	// concatenation units and absorption.
	assert_equivalent(&to_dfa(&P::epsilon().concat(x.clone())), &dx, "ε · x = x");
	assert_equivalent(&to_dfa(&x.clone().concat(P::epsilon())), &dx, "x · ε = x");
	assert_equivalent(
		&to_dfa(&P::empty().concat(x.clone())),
		&to_dfa(&P::empty()),
		"∅ · x = ∅",
	);

	// star collapses the constants.
	assert_equivalent(
		&to_dfa(&P::empty().star()),
		&to_dfa(&P::epsilon()),
		"∅* = ε",
	);
	assert_equivalent(
		&to_dfa(&P::epsilon().star()),
		&to_dfa(&P::epsilon()),
		"ε* = ε",
	);

	// idempotent union, doubling concatenation.
	assert_equivalent(
		&to_dfa(&P::union_all([x.clone(), x.clone()])),
		&dx,
		"x ∪ x = x",
	);
	assert_equivalent(
		&to_dfa(&P::concat_all([x.clone(), x.clone()])),
		&to_dfa(&x.clone().repeat(2)),
		"x · x = x{2}",
	);

	// derived repetitions.
	assert_equivalent(
		&to_dfa(&x.clone().optional()),
		&to_dfa(&P::epsilon().union(x.clone())),
		"x? = ε ∪ x",
	);
	assert_equivalent(
		&to_dfa(&x.clone().plus()),
		&to_dfa(&x.clone().concat(x.clone().star())),
		"x+ = x · x*",
	);
	assert_equivalent(
		&to_dfa(&x.clone().repeat(1..=2)),
		&to_dfa(&x.clone().union(x.clone().concat(x.clone()))),
		"x{1,2} = x ∪ xx",
	);
}

#[test]
fn laws_hold_for_nfa() {
	check_laws::<NFA<Class>>(|nfa| DFA::from_nfa(nfa));
}

#[test]
fn laws_hold_for_dfa() {
	check_laws::<Dfa>(|dfa| dfa.clone());
}

#[test]
fn laws_hold_for_simple_regex() {
	check_laws::<SimpleRegex<RangeSet<char>>>(|regex| regex.to_dfa());
}

#[test]
fn laws_hold_for_regex_pattern() {
	check_laws::<RegexPattern>(|pattern| pattern.to_simple().to_dfa());
}

#[test]
fn laws_hold_for_abnf_nodes() {
	let empty_rules = Rulelist { rules: Vec::new() };
	check_laws::<Alternation>(|alternation| alternation.compile(&empty_rules).unwrap());
}

#[test]
fn boolean_algebra_on_languages() {
	let a: Dfa = RegularPattern::verbatim("ab".chars());
	let b: Dfa = RegularPattern::union_all([
		RegularPattern::verbatim("ab".chars()),
		RegularPattern::verbatim("cd".chars()),
	]);

	// a ⊆ b, so a ∪ b = b, a ∩ b = a and a △ b = b ∖ a.
	assert!(a.union(&b).is_equivalent(&b));
	assert!(a.intersection(&b).is_equivalent(&a));
	assert!(a.symmetric_difference(&b).is_equivalent(&b.difference(&a)));

	// distributivity spot check: (a ∪ b) ∩ b = b.
	assert!(a.union(&b).intersection(&b).is_equivalent(&b));
}
