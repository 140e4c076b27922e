//! End-to-end grammar scenarios: parse, compile, query.
use reglang::abnf::{Parse, Rulelist, Rulename};
use reglang::automata::{ClosedRangeAlphabet, RangeSet, DFA};
use reglang::Class;

fn compile(input: &str, name: &str) -> DFA<Class> {
	Rulelist::parse(input)
		.unwrap()
		.compile_rule(&Rulename::new(name))
		.unwrap()
}

#[test]
fn incremental_rule_with_remainder() {
	let (rulelist, rest) = Rulelist::match_prefix("rule = %x20\r\nrule =/ %x30\r\n...").unwrap();
	assert_eq!(rest, "...");

	let rules = rulelist.compile().unwrap();
	assert_eq!(rules.len(), 1);

	let rule = &rules[&Rulename::new("rule")];
	assert!(rule.contains(" ".chars()));
	assert!(rule.contains("0".chars()));
	assert!(!rule.contains(" 0".chars()));
	assert!(!rule.contains("".chars()));
}

#[test]
fn char_val_case_insensitive_by_default() {
	let dfa = compile("r = \"Foo\"\r\n", "r");
	for accepted in ["Foo", "foo", "FOO", "fOo", "fOO"] {
		assert!(dfa.contains(accepted.chars()), "{accepted} rejected");
	}

	let sensitive = compile("r = %s\"Foo\"\r\n", "r");
	assert!(sensitive.contains("Foo".chars()));
	for rejected in ["foo", "FOO", "fOo"] {
		assert!(!sensitive.contains(rejected.chars()), "{rejected} accepted");
	}
}

#[test]
fn bounded_list_repetition() {
	let dfa = compile("r = 2#4foo\r\nfoo = \"x\"\r\n", "r");

	for accepted in ["x,x", "x,x,x", "x,x,x,x"] {
		assert!(dfa.contains(accepted.chars()), "{accepted} rejected");
	}
	for rejected in ["x", "x,x,x,x,x", "xx", ""] {
		assert!(!dfa.contains(rejected.chars()), "{rejected} accepted");
	}
}

#[test]
fn minimization_fixpoint() {
	let dfa = compile("r = \"0\" / \"1\" / 2%x32-33\r\n", "r");

	// compile() minimizes: the six-word language needs three states.
	assert_eq!(dfa.state_count(), 3);
	for word in ["0", "1", "22", "23", "32", "33"] {
		assert!(dfa.contains(word.chars()), "{word} rejected");
	}
	for word in ["2", "3", "02", "222"] {
		assert!(!dfa.contains(word.chars()), "{word} accepted");
	}

	// minimization is a fixpoint.
	let again = dfa.minimize();
	assert_eq!(again.state_count(), 3);
	assert!(dfa.is_equivalent(&again));
}

#[test]
fn alphabet_partition_refinement() {
	fn range(a: u32, b: u32) -> RangeSet<u32> {
		let mut set = RangeSet::new();
		set.insert(a..=b);
		set
	}

	let mut alphabet = ClosedRangeAlphabet::new();
	alphabet.insert(range(0, 9));
	alphabet.insert(range(0, 0));
	alphabet.insert(range(0, 1));

	assert_eq!(
		alphabet.classes(),
		&[range(0, 0), range(1, 1), range(2, 9)]
	);
}

#[test]
fn greedy_prefix_match() {
	let dfa = compile("r = \"a\" / \"ab\" / \"xy\"\r\n", "r");

	let input: Vec<char> = "abc".chars().collect();
	let (prefix, rest) = dfa.match_prefix(&input).unwrap();
	assert_eq!(prefix, &['a', 'b']);
	assert_eq!(rest, &['c']);

	let input: Vec<char> = "x".chars().collect();
	assert!(dfa.match_prefix(&input).is_none());

	let input: Vec<char> = vec![];
	assert!(dfa.match_prefix(&input).is_none());
}

#[test]
fn enumeration_is_deterministic_and_lazy() {
	let dfa = compile("r = \"a\" *\"b\"\r\n", "r");
	let words: Vec<String> = dfa
		.strings()
		.take(3)
		.map(|w: Vec<char>| w.into_iter().collect())
		.collect();
	assert_eq!(words, vec!["a", "ab", "abb"]);
}

#[test]
fn undefined_and_recursive_rules_error_out() {
	let rulelist = Rulelist::parse("r = missing\r\n").unwrap();
	assert!(matches!(
		rulelist.compile(),
		Err(reglang::Error::UndefinedRule(_))
	));

	let rulelist = Rulelist::parse("r = \"x\" r\r\n").unwrap();
	assert!(matches!(
		rulelist.compile(),
		Err(reglang::Error::NotRegular(_))
	));
}
