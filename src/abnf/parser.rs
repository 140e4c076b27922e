//! Recursive-descent ABNF parser.
//!
//! Every node type implements [`Parse`]: `match_prefix` returns the longest
//! parse at the start of the input together with the leftover input, `parse`
//! requires the whole input to be consumed. Errors report the farthest
//! offset reached and the set of constructs expected there.
use std::collections::BTreeSet;

use super::ast::{
	Alternation, Base, CharVal, Concatenation, Element, Group, NumVal, NumValKind, OptionalGroup,
	ProseVal, Repetition, RepeatSpec, Rule, Rulelist, Rulename,
};

/// Malformed ABNF input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at offset {offset}, expected one of: {}", expected_list(.expected))]
pub struct ParseError {
	/// Byte offset of the farthest point the parser reached.
	pub offset: usize,
	/// The constructs that would have allowed it to continue.
	pub expected: BTreeSet<&'static str>,
}

fn expected_list(expected: &BTreeSet<&'static str>) -> String {
	expected.iter().copied().collect::<Vec<_>>().join(", ")
}

/// Parsable ABNF node.
pub trait Parse: Sized {
	/// Longest parse at the start of `input`, with the leftover input.
	fn match_prefix(input: &str) -> Result<(Self, &str), ParseError>;

	/// Parse the whole input.
	fn parse(input: &str) -> Result<Self, ParseError> {
		let (node, rest) = Self::match_prefix(input)?;
		if rest.is_empty() {
			Ok(node)
		} else {
			let mut expected = BTreeSet::new();
			expected.insert("end of input");
			Err(ParseError {
				offset: input.len() - rest.len(),
				expected,
			})
		}
	}
}

struct Fail;

struct Cursor<'a> {
	bytes: &'a [u8],
	offset: usize,
	farthest: usize,
	expected: BTreeSet<&'static str>,
	lenient: bool,
}

impl<'a> Cursor<'a> {
	fn new(input: &'a str, lenient: bool) -> Self {
		Self {
			bytes: input.as_bytes(),
			offset: 0,
			farthest: 0,
			expected: BTreeSet::new(),
			lenient,
		}
	}

	fn into_error(self) -> ParseError {
		ParseError {
			offset: self.farthest,
			expected: self.expected,
		}
	}

	fn fail<T>(&mut self, expected: &'static str) -> Result<T, Fail> {
		if self.offset > self.farthest {
			self.farthest = self.offset;
			self.expected.clear();
		}
		if self.offset == self.farthest {
			self.expected.insert(expected);
		}
		Err(Fail)
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.offset).copied()
	}

	fn peek_at(&self, n: usize) -> Option<u8> {
		self.bytes.get(self.offset + n).copied()
	}

	fn bump(&mut self) {
		self.offset += 1;
	}

	fn eat(&mut self, byte: u8) -> bool {
		if self.peek() == Some(byte) {
			self.bump();
			true
		} else {
			false
		}
	}

	fn at_end(&self) -> bool {
		self.offset == self.bytes.len()
	}
}

fn is_wsp(byte: u8) -> bool {
	byte == b' ' || byte == b'\t'
}

fn is_vchar(byte: u8) -> bool {
	(0x21..=0x7e).contains(&byte)
}

/// CRLF, or a bare LF in lenient mode.
fn newline(c: &mut Cursor) -> Result<(), Fail> {
	if c.peek() == Some(b'\r') && c.peek_at(1) == Some(b'\n') {
		c.bump();
		c.bump();
		Ok(())
	} else if c.lenient && c.eat(b'\n') {
		Ok(())
	} else {
		c.fail("newline")
	}
}

/// `c-nl`: a comment or a line break.
fn c_nl(c: &mut Cursor) -> Result<(), Fail> {
	if c.eat(b';') {
		while let Some(byte) = c.peek() {
			if is_wsp(byte) || is_vchar(byte) {
				c.bump();
			} else {
				break;
			}
		}
		newline(c)
	} else {
		newline(c)
	}
}

/// One `c-wsp`: whitespace, possibly after a line continuation.
fn c_wsp(c: &mut Cursor) -> bool {
	if let Some(byte) = c.peek() {
		if is_wsp(byte) {
			c.bump();
			return true;
		}
	}

	let start = c.offset;
	if c_nl(c).is_ok() {
		if let Some(byte) = c.peek() {
			if is_wsp(byte) {
				c.bump();
				return true;
			}
		}
	}

	c.offset = start;
	false
}

fn c_wsp_star(c: &mut Cursor) {
	while c_wsp(c) {}
}

fn c_wsp_plus(c: &mut Cursor) -> Result<(), Fail> {
	if c_wsp(c) {
		c_wsp_star(c);
		Ok(())
	} else {
		c.fail("whitespace")
	}
}

fn rulename(c: &mut Cursor) -> Result<Rulename, Fail> {
	let start = c.offset;

	match c.peek() {
		Some(byte) if byte.is_ascii_alphabetic() => c.bump(),
		_ => return c.fail("rule name"),
	}

	while let Some(byte) = c.peek() {
		if byte.is_ascii_alphanumeric() || byte == b'-' {
			c.bump();
		} else {
			break;
		}
	}

	let name = std::str::from_utf8(&c.bytes[start..c.offset]).unwrap();
	Ok(Rulename::new(name))
}

/// `defined-as`: returns `true` for the incremental `=/` form.
fn defined_as(c: &mut Cursor) -> Result<bool, Fail> {
	c_wsp_star(c);

	if c.eat(b'=') {
		let incremental = c.eat(b'/');
		c_wsp_star(c);
		Ok(incremental)
	} else {
		c.fail("\"=\" or \"=/\"")
	}
}

fn rule(c: &mut Cursor) -> Result<Rule, Fail> {
	let name = rulename(c)?;
	let incremental = defined_as(c)?;
	let alternation = alternation(c)?;
	c_wsp_star(c);

	if !c.at_end() {
		c_nl(c)?;
	}

	Ok(Rule {
		name,
		incremental,
		alternation,
	})
}

fn rulelist(c: &mut Cursor) -> Result<(Rulelist, usize), Fail> {
	let mut rules = Vec::new();
	let mut last_good = c.offset;

	loop {
		match rule(c) {
			Ok(parsed) => {
				rules.push(parsed);
				last_good = c.offset;
				continue;
			}
			Err(Fail) => c.offset = last_good,
		}

		// a rulelist line may also be blank or hold only a comment.
		c_wsp_star(c);
		if c_nl(c).is_ok() {
			last_good = c.offset;
			continue;
		}

		c.offset = last_good;
		break;
	}

	if rules.is_empty() {
		return c.fail("rule");
	}

	Ok((Rulelist { rules }, last_good))
}

fn alternation(c: &mut Cursor) -> Result<Alternation, Fail> {
	let mut alternatives = vec![concatenation(c)?];

	loop {
		let start = c.offset;
		c_wsp_star(c);

		if c.eat(b'/') {
			c_wsp_star(c);
			alternatives.push(concatenation(c)?);
		} else {
			c.offset = start;
			break;
		}
	}

	Ok(Alternation { alternatives })
}

fn concatenation(c: &mut Cursor) -> Result<Concatenation, Fail> {
	let mut repetitions = vec![repetition(c)?];

	loop {
		let start = c.offset;

		if c_wsp_plus(c).is_err() {
			c.offset = start;
			break;
		}

		match repetition(c) {
			Ok(next) => repetitions.push(next),
			Err(Fail) => {
				c.offset = start;
				break;
			}
		}
	}

	Ok(Concatenation { repetitions })
}

fn repetition(c: &mut Cursor) -> Result<Repetition, Fail> {
	let repeat = repeat_spec(c)?;
	let element = element(c)?;
	Ok(normalize_repetition(repeat, element))
}

/// Fold the degenerate repeat prefixes into their canonical spellings:
/// a once-repetition disappears and a zero-or-once repetition becomes an
/// optional group.
fn normalize_repetition(repeat: Option<RepeatSpec>, element: Element) -> Repetition {
	match repeat {
		Some(RepeatSpec::Exact(1))
		| Some(RepeatSpec::Range {
			min: Some(1),
			max: Some(1),
		}) => Repetition {
			repeat: None,
			element,
		},
		Some(RepeatSpec::Range {
			min: None | Some(0),
			max: Some(1),
		}) => {
			let inner = match element {
				Element::Group(group) => group.0,
				element => element.alternation(),
			};
			Repetition {
				repeat: None,
				element: Element::Option(OptionalGroup(inner)),
			}
		}
		repeat => Repetition { repeat, element },
	}
}

fn repeat_spec(c: &mut Cursor) -> Result<Option<RepeatSpec>, Fail> {
	let min = decimal(c);

	if c.eat(b'*') {
		let max = decimal(c);
		Ok(Some(RepeatSpec::Range { min, max }))
	} else if c.eat(b'#') {
		let max = decimal(c);
		Ok(Some(RepeatSpec::List { min, max }))
	} else {
		match min {
			Some(n) => Ok(Some(RepeatSpec::Exact(n))),
			None => Ok(None),
		}
	}
}

fn decimal(c: &mut Cursor) -> Option<u32> {
	let mut value: Option<u32> = None;

	while let Some(byte) = c.peek() {
		if byte.is_ascii_digit() {
			c.bump();
			value = Some(
				value
					.unwrap_or(0)
					.saturating_mul(10)
					.saturating_add((byte - b'0') as u32),
			);
		} else {
			break;
		}
	}

	value
}

fn element(c: &mut Cursor) -> Result<Element, Fail> {
	match c.peek() {
		Some(byte) if byte.is_ascii_alphabetic() => Ok(Element::Rulename(rulename(c)?)),
		Some(b'(') => Ok(Element::Group(group(c)?)),
		Some(b'[') => Ok(Element::Option(option(c)?)),
		Some(b'"') => Ok(Element::CharVal(char_val(c)?)),
		Some(b'%') => match c.peek_at(1) {
			Some(b's') | Some(b'i') => Ok(Element::CharVal(char_val(c)?)),
			_ => Ok(Element::NumVal(num_val(c)?)),
		},
		Some(b'<') => Ok(Element::ProseVal(prose_val(c)?)),
		_ => c.fail("element"),
	}
}

fn group(c: &mut Cursor) -> Result<Group, Fail> {
	if !c.eat(b'(') {
		return c.fail("\"(\"");
	}

	c_wsp_star(c);
	let inner = alternation(c)?;
	c_wsp_star(c);

	if !c.eat(b')') {
		return c.fail("\")\"");
	}

	Ok(Group(inner))
}

fn option(c: &mut Cursor) -> Result<OptionalGroup, Fail> {
	if !c.eat(b'[') {
		return c.fail("\"[\"");
	}

	c_wsp_star(c);
	let inner = alternation(c)?;
	c_wsp_star(c);

	if !c.eat(b']') {
		return c.fail("\"]\"");
	}

	Ok(OptionalGroup(inner))
}

fn char_val(c: &mut Cursor) -> Result<CharVal, Fail> {
	let case_sensitive = if c.peek() == Some(b'%') {
		match c.peek_at(1) {
			Some(b's') => {
				c.bump();
				c.bump();
				true
			}
			Some(b'i') => {
				c.bump();
				c.bump();
				false
			}
			_ => return c.fail("quoted string"),
		}
	} else {
		false
	};

	if !c.eat(b'"') {
		return c.fail("quoted string");
	}

	let start = c.offset;
	while let Some(byte) = c.peek() {
		match byte {
			0x20 | 0x21 | 0x23..=0x7e => c.bump(),
			_ => break,
		}
	}

	let value = std::str::from_utf8(&c.bytes[start..c.offset])
		.unwrap()
		.to_owned();

	if !c.eat(b'"') {
		return c.fail("closing quote");
	}

	Ok(CharVal {
		value,
		case_sensitive,
	})
}

fn num_val(c: &mut Cursor) -> Result<NumVal, Fail> {
	if !c.eat(b'%') {
		return c.fail("numeric value");
	}

	let base = match c.peek() {
		Some(b'b') => Base::Binary,
		Some(b'd') => Base::Decimal,
		Some(b'x') => Base::Hex,
		_ => return c.fail("numeric base (b, d or x)"),
	};
	c.bump();

	let first = scalar(c, base)?;

	if c.eat(b'-') {
		let last = scalar(c, base)?;
		Ok(NumVal {
			base,
			kind: NumValKind::Range(first, last),
		})
	} else {
		let mut values = vec![first];
		while c.eat(b'.') {
			values.push(scalar(c, base)?);
		}

		Ok(NumVal {
			base,
			kind: NumValKind::Sequence(values),
		})
	}
}

fn scalar(c: &mut Cursor, base: Base) -> Result<char, Fail> {
	let radix = match base {
		Base::Binary => 2,
		Base::Decimal => 10,
		Base::Hex => 16,
	};

	let start = c.offset;
	while let Some(byte) = c.peek() {
		if (byte as char).is_digit(radix) {
			c.bump();
		} else {
			break;
		}
	}

	if c.offset == start {
		return c.fail("digits");
	}

	let digits = std::str::from_utf8(&c.bytes[start..c.offset]).unwrap();
	u32::from_str_radix(digits, radix)
		.ok()
		.and_then(char::from_u32)
		.map_or_else(|| c.fail("scalar value"), Ok)
}

fn prose_val(c: &mut Cursor) -> Result<ProseVal, Fail> {
	if !c.eat(b'<') {
		return c.fail("prose value");
	}

	let start = c.offset;
	while let Some(byte) = c.peek() {
		match byte {
			0x20..=0x3d | 0x3f..=0x7e => c.bump(),
			_ => break,
		}
	}

	let value = std::str::from_utf8(&c.bytes[start..c.offset])
		.unwrap()
		.to_owned();

	if !c.eat(b'>') {
		return c.fail("\">\"");
	}

	Ok(ProseVal(value))
}

macro_rules! impl_parse {
	($ty:ty, $parser:ident) => {
		impl Parse for $ty {
			fn match_prefix(input: &str) -> Result<(Self, &str), ParseError> {
				let mut c = Cursor::new(input, false);
				match $parser(&mut c) {
					Ok(node) => Ok((node, &input[c.offset..])),
					Err(Fail) => Err(c.into_error()),
				}
			}
		}
	};
}

impl_parse!(Rule, rule);
impl_parse!(Rulename, rulename);
impl_parse!(Alternation, alternation);
impl_parse!(Concatenation, concatenation);
impl_parse!(Repetition, repetition);
impl_parse!(Element, element);
impl_parse!(Group, group);
impl_parse!(OptionalGroup, option);
impl_parse!(CharVal, char_val);
impl_parse!(NumVal, num_val);
impl_parse!(ProseVal, prose_val);

impl Parse for Rulelist {
	fn match_prefix(input: &str) -> Result<(Self, &str), ParseError> {
		Self::match_prefix_with(input, false)
	}
}

impl Rulelist {
	fn match_prefix_with(input: &str, lenient: bool) -> Result<(Self, &str), ParseError> {
		let mut c = Cursor::new(input, lenient);
		match rulelist(&mut c) {
			Ok((node, end)) => Ok((node, &input[end..])),
			Err(Fail) => Err(c.into_error()),
		}
	}

	/// Like [`Parse::match_prefix`], accepting bare LF line ends.
	pub fn match_prefix_lenient(input: &str) -> Result<(Self, &str), ParseError> {
		Self::match_prefix_with(input, true)
	}

	/// Like [`Parse::parse`], accepting bare LF line ends.
	pub fn parse_lenient(input: &str) -> Result<Self, ParseError> {
		let (node, rest) = Self::match_prefix_lenient(input)?;
		if rest.is_empty() {
			Ok(node)
		} else {
			let mut expected = BTreeSet::new();
			expected.insert("end of input");
			Err(ParseError {
				offset: input.len() - rest.len(),
				expected,
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rulelist_with_incremental_rule_and_remainder() {
		let (rulelist, rest) = Rulelist::match_prefix("rule = %x20\r\nrule =/ %x30\r\n...").unwrap();
		assert_eq!(rulelist.rules.len(), 2);
		assert!(rulelist.rules[1].incremental);
		assert_eq!(rest, "...");

		let merged = rulelist.get(&Rulename::new("RULE")).unwrap();
		assert_eq!(merged.alternation.alternatives.len(), 2);
	}

	#[test]
	fn char_val_case_modifiers() {
		let value = CharVal::parse("\"Foo\"").unwrap();
		assert!(!value.case_sensitive);

		let value = CharVal::parse("%s\"Foo\"").unwrap();
		assert!(value.case_sensitive);

		let value = CharVal::parse("%i\"Foo\"").unwrap();
		assert!(!value.case_sensitive);
	}

	#[test]
	fn num_val_forms() {
		assert_eq!(
			NumVal::parse("%x61.62").unwrap().kind,
			NumValKind::Sequence(vec!['a', 'b'])
		);
		assert_eq!(
			NumVal::parse("%d97-122").unwrap().kind,
			NumValKind::Range('a', 'z')
		);
		assert_eq!(
			NumVal::parse("%b1100001").unwrap().kind,
			NumValKind::Sequence(vec!['a'])
		);
	}

	#[test]
	fn num_val_rejects_lone_surrogates() {
		assert!(NumVal::parse("%xD800").is_err());
	}

	#[test]
	fn repeat_prefixes() {
		let repetition = Repetition::parse("2*4x").unwrap();
		assert_eq!(
			repetition.repeat,
			Some(RepeatSpec::Range {
				min: Some(2),
				max: Some(4),
			})
		);

		let repetition = Repetition::parse("*x").unwrap();
		assert_eq!(
			repetition.repeat,
			Some(RepeatSpec::Range {
				min: None,
				max: None,
			})
		);

		let repetition = Repetition::parse("2#4x").unwrap();
		assert_eq!(
			repetition.repeat,
			Some(RepeatSpec::List {
				min: Some(2),
				max: Some(4),
			})
		);
	}

	#[test]
	fn once_repetitions_are_normalized_away() {
		assert_eq!(Repetition::parse("1*1x").unwrap().repeat, None);
		assert_eq!(Repetition::parse("1x").unwrap().repeat, None);

		let optional = Repetition::parse("0*1x").unwrap();
		assert_eq!(optional.repeat, None);
		assert!(matches!(optional.element, Element::Option(_)));
	}

	#[test]
	fn alternation_with_groups_and_options() {
		let alternation = Alternation::parse("\"a\" (\"b\" / \"c\") [\"d\"]").unwrap();
		assert_eq!(alternation.alternatives.len(), 1);
		assert_eq!(alternation.alternatives[0].repetitions.len(), 3);
	}

	#[test]
	fn comments_and_continuations() {
		let input = "r = \"a\" ; trailing comment\r\n     \"b\"\r\n";
		let rule = Rule::parse(input).unwrap();
		assert_eq!(rule.alternation.alternatives[0].repetitions.len(), 2);
	}

	#[test]
	fn lenient_mode_accepts_bare_lf() {
		assert!(Rulelist::parse("r = \"a\"\n").is_err());
		assert!(Rulelist::parse_lenient("r = \"a\"\n").is_ok());
	}

	#[test]
	fn errors_report_farthest_offset() {
		let error = Rulelist::parse("r = %z\r\n").unwrap_err();
		assert_eq!(error.offset, 5);
		assert!(!error.expected.is_empty());
	}

	#[test]
	fn prose_val_round_trip() {
		let prose = ProseVal::parse("<some prose>").unwrap();
		assert_eq!(prose.0, "some prose");
		assert_eq!(prose.to_string(), "<some prose>");
	}

	#[test]
	fn display_round_trip() {
		for input in [
			"r = %x20 / %x30-39\r\n",
			"r = 2*4\"ab\" [\"c\"] (\"d\" / \"e\")\r\n",
			"r = %s\"Foo\" *DIGIT\r\n",
			"r = 2#4name\r\n",
			"r = %x61.62.63\r\n",
		] {
			let rulelist = Rulelist::parse(input).unwrap();
			assert_eq!(rulelist.to_string(), input);
			assert_eq!(Rulelist::parse(&rulelist.to_string()).unwrap(), rulelist);
		}
	}
}
