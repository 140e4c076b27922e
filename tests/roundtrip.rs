//! Round trips: syntax → automaton → regular expression → automaton, and
//! syntax → text → syntax.
use reglang::abnf::{Alternation, Parse, Rulelist};
use reglang::syntax::{RegexPattern, ToRegex, ECMASCRIPT};

#[test]
fn abnf_through_automaton_and_back() {
	let empty_rules = Rulelist { rules: Vec::new() };

	for input in [
		"%x0 %x1",
		"*(%x0 / %x1)",
		"*(%x0 / %x1 *%x3 %x2) %x1 *%x3",
	] {
		let alternation = Alternation::parse(input).unwrap();
		let dfa = alternation.compile(&empty_rules).unwrap();

		let regex = dfa.to_regex();
		let back = regex.to_dfa();

		// the symmetric difference has no reachable final state.
		assert!(
			!dfa.symmetric_difference(&back).has_reachable_final(),
			"{input} did not survive the round trip"
		);
	}
}

#[test]
fn abnf_text_round_trip() {
	for input in [
		"a = \"x\"\r\n",
		"a = %x30-39 / \"y\" [\"z\"]\r\n",
		"a = 1*3(DIGIT / \"-\")\r\nb = a \"!\"\r\n",
		"a = 2#4token\r\ntoken = 1*VCHAR\r\n",
		"a = %s\"Case\" %i\"fold\"\r\n",
		"a = %d13.10 <prose here>\r\n",
	] {
		let rulelist = Rulelist::parse(input).unwrap();
		let printed = rulelist.to_string();
		assert_eq!(Rulelist::parse(&printed).unwrap(), rulelist, "for {input}");
	}
}

#[test]
fn compiled_grammar_emits_a_usable_regex() {
	let rulelist = Rulelist::parse("id = 1*3DIGIT\r\n").unwrap();
	let rules = rulelist.compile().unwrap();
	let dfa = rules.values().next().unwrap();

	let pattern = RegexPattern::from(dfa.to_regex());
	let encoded = ECMASCRIPT.encode_whole(&pattern);

	assert!(encoded.starts_with('^') && encoded.ends_with('$'));
	// the emitted pattern accepts the same language when compiled back.
	assert!(dfa.is_equivalent(&pattern.to_simple().to_dfa()));
}
