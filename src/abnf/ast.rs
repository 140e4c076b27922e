//! Syntactic model of ABNF (RFC 5234 with the RFC 7405 case modifiers and
//! the HTTP-style `#` list extension).
//!
//! Every node keeps the shape the parser saw; canonicalization happens at
//! construction time (through the pattern algebra) rather than at printing
//! time, so the printed form of any node parses back to an equal node.
use std::fmt;
use std::hash::{Hash, Hasher};

use reglang_syntax::{Repeat, RegularPattern};

/// A rule name. Identity is ASCII-case-insensitive, the original spelling is
/// kept for printing.
#[derive(Debug, Clone)]
pub struct Rulename(String);

impl Rulename {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Wraps the name as an element.
	pub fn element(self) -> Element {
		Element::Rulename(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.element().alternation()
	}

	pub fn group(self) -> Group {
		self.element().group()
	}
}

impl PartialEq for Rulename {
	fn eq(&self, other: &Self) -> bool {
		self.0.eq_ignore_ascii_case(&other.0)
	}
}

impl Eq for Rulename {}

impl PartialOrd for Rulename {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Rulename {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.0
			.bytes()
			.map(|b| b.to_ascii_lowercase())
			.cmp(other.0.bytes().map(|b| b.to_ascii_lowercase()))
	}
}

impl Hash for Rulename {
	fn hash<H: Hasher>(&self, state: &mut H) {
		for b in self.0.bytes() {
			state.write_u8(b.to_ascii_lowercase());
		}
	}
}

impl fmt::Display for Rulename {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A list of rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rulelist {
	pub rules: Vec<Rule>,
}

impl Rulelist {
	/// The resolved definition of `name`: the base rule with every
	/// incremental (`=/`) branch folded in.
	pub fn get(&self, name: &Rulename) -> Option<Rule> {
		let mut found: Option<Rule> = None;

		for rule in &self.rules {
			if rule.name != *name {
				continue;
			}

			match &mut found {
				None => found = Some(rule.clone()),
				Some(combined) => combined
					.alternation
					.alternatives
					.extend(rule.alternation.alternatives.iter().cloned()),
			}
		}

		found.map(|mut rule| {
			rule.incremental = false;
			rule
		})
	}

	/// The distinct rule names, in definition order.
	pub fn names(&self) -> Vec<&Rulename> {
		let mut names: Vec<&Rulename> = Vec::new();
		for rule in &self.rules {
			if !names.contains(&&rule.name) {
				names.push(&rule.name);
			}
		}
		names
	}
}

impl fmt::Display for Rulelist {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for rule in &self.rules {
			rule.fmt(f)?;
		}
		Ok(())
	}
}

/// A single rule definition or incremental extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
	pub name: Rulename,
	/// `true` for `=/` extensions.
	pub incremental: bool,
	pub alternation: Alternation,
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let defined_as = if self.incremental { "=/" } else { "=" };
		write!(f, "{} {} {}\r\n", self.name, defined_as, self.alternation)
	}
}

/// A choice between concatenations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternation {
	pub alternatives: Vec<Concatenation>,
}

impl Alternation {
	pub fn alternation(self) -> Self {
		self
	}

	pub fn group(self) -> Group {
		Group(self)
	}

	pub fn element(self) -> Element {
		// a single bare element needs no grouping to change level.
		match self.single_element() {
			Ok(element) => element,
			Err(this) => Element::Group(Group(this)),
		}
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		match self.single_concatenation() {
			Ok(concatenation) => concatenation,
			Err(this) => this.element().concatenation(),
		}
	}

	/// The inner element when the alternation is exactly one undecorated
	/// element.
	fn single_element(mut self) -> Option<Element> {
		if self.alternatives.len() != 1 {
			return None;
		}

		let mut concatenation = self.alternatives.pop().unwrap();
		if concatenation.repetitions.len() != 1 {
			return None;
		}

		let repetition = concatenation.repetitions.pop().unwrap();
		if repetition.repeat.is_none() {
			Some(repetition.element)
		} else {
			None
		}
	}
}

impl fmt::Display for Alternation {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, alternative) in self.alternatives.iter().enumerate() {
			if i > 0 {
				write!(f, " / ")?;
			}
			alternative.fmt(f)?;
		}
		Ok(())
	}
}

/// A sequence of repetitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenation {
	pub repetitions: Vec<Repetition>,
}

impl Concatenation {
	pub fn concatenation(self) -> Self {
		self
	}

	pub fn alternation(self) -> Alternation {
		Alternation {
			alternatives: vec![self],
		}
	}

	pub fn element(self) -> Element {
		self.alternation().element()
	}

	pub fn group(self) -> Group {
		Group(self.alternation())
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}
}

impl fmt::Display for Concatenation {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, repetition) in self.repetitions.iter().enumerate() {
			if i > 0 {
				write!(f, " ")?;
			}
			repetition.fmt(f)?;
		}
		Ok(())
	}
}

/// An element with an optional repeat prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
	pub repeat: Option<RepeatSpec>,
	pub element: Element,
}

impl Repetition {
	pub fn repetition(self) -> Self {
		self
	}

	pub fn concatenation(self) -> Concatenation {
		Concatenation {
			repetitions: vec![self],
		}
	}

	pub fn alternation(self) -> Alternation {
		self.concatenation().alternation()
	}

	pub fn element(self) -> Element {
		if self.repeat.is_none() {
			self.element
		} else {
			Element::Group(self.group())
		}
	}

	pub fn group(self) -> Group {
		Group(self.concatenation().alternation())
	}
}

impl fmt::Display for Repetition {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if let Some(repeat) = &self.repeat {
			repeat.fmt(f)?;
		}
		self.element.fmt(f)
	}
}

/// A repeat prefix: `n`, `n*m` or the `n#m` list extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatSpec {
	/// Exactly `n` occurrences.
	Exact(u32),
	/// `min*max`, each bound optional.
	Range {
		min: Option<u32>,
		max: Option<u32>,
	},
	/// `min#max`: comma-separated list with optional surrounding whitespace.
	List {
		min: Option<u32>,
		max: Option<u32>,
	},
}

impl RepeatSpec {
	pub fn min(&self) -> u32 {
		match self {
			Self::Exact(n) => *n,
			Self::Range { min, .. } | Self::List { min, .. } => min.unwrap_or(0),
		}
	}

	pub fn max(&self) -> Option<u32> {
		match self {
			Self::Exact(n) => Some(*n),
			Self::Range { max, .. } | Self::List { max, .. } => *max,
		}
	}
}

impl fmt::Display for RepeatSpec {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Exact(n) => write!(f, "{n}"),
			Self::Range { min, max } => {
				if let Some(min) = min {
					write!(f, "{min}")?;
				}
				write!(f, "*")?;
				if let Some(max) = max {
					write!(f, "{max}")?;
				}
				Ok(())
			}
			Self::List { min, max } => {
				if let Some(min) = min {
					write!(f, "{min}")?;
				}
				write!(f, "#")?;
				if let Some(max) = max {
					write!(f, "{max}")?;
				}
				Ok(())
			}
		}
	}
}

/// The element alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
	Rulename(Rulename),
	Group(Group),
	Option(OptionalGroup),
	CharVal(CharVal),
	NumVal(NumVal),
	ProseVal(ProseVal),
}

impl Element {
	pub fn element(self) -> Self {
		self
	}

	pub fn repetition(self) -> Repetition {
		Repetition {
			repeat: None,
			element: self,
		}
	}

	pub fn concatenation(self) -> Concatenation {
		self.repetition().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.repetition().alternation()
	}

	pub fn group(self) -> Group {
		Group(self.alternation())
	}
}

impl fmt::Display for Element {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Rulename(v) => v.fmt(f),
			Self::Group(v) => v.fmt(f),
			Self::Option(v) => v.fmt(f),
			Self::CharVal(v) => v.fmt(f),
			Self::NumVal(v) => v.fmt(f),
			Self::ProseVal(v) => v.fmt(f),
		}
	}
}

/// A parenthesized alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group(pub Alternation);

impl Group {
	pub fn group(self) -> Self {
		self
	}

	pub fn element(self) -> Element {
		Element::Group(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.0
	}
}

impl fmt::Display for Group {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "({})", self.0)
	}
}

/// A bracketed, optional alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalGroup(pub Alternation);

impl OptionalGroup {
	pub fn element(self) -> Element {
		Element::Option(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.element().alternation()
	}

	pub fn group(self) -> Group {
		self.element().group()
	}
}

impl fmt::Display for OptionalGroup {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "[{}]", self.0)
	}
}

/// A quoted string. Matching is case-insensitive unless `case_sensitive` is
/// set (the RFC 7405 `%s` form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharVal {
	pub value: String,
	pub case_sensitive: bool,
}

impl CharVal {
	pub fn element(self) -> Element {
		Element::CharVal(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.element().alternation()
	}

	pub fn group(self) -> Group {
		self.element().group()
	}
}

impl fmt::Display for CharVal {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.case_sensitive {
			write!(f, "%s\"{}\"", self.value)
		} else {
			write!(f, "\"{}\"", self.value)
		}
	}
}

/// The numeral base of a num-val.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
	Binary,
	Decimal,
	Hex,
}

impl Base {
	fn prefix(self) -> char {
		match self {
			Self::Binary => 'b',
			Self::Decimal => 'd',
			Self::Hex => 'x',
		}
	}

	fn write(self, value: char, f: &mut fmt::Formatter) -> fmt::Result {
		let value = value as u32;
		match self {
			Self::Binary => write!(f, "{value:b}"),
			Self::Decimal => write!(f, "{value}"),
			Self::Hex => write!(f, "{value:X}"),
		}
	}
}

/// A numeric terminal: a dotted series of values or a closed value range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumVal {
	pub base: Base,
	pub kind: NumValKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumValKind {
	/// `%x61.62.63`: the verbatim sequence. A single value is a
	/// one-element sequence.
	Sequence(Vec<char>),
	/// `%x61-7A`: any one value of the closed range.
	Range(char, char),
}

impl NumVal {
	pub fn single(value: char) -> Self {
		Self {
			base: Base::Hex,
			kind: NumValKind::Sequence(vec![value]),
		}
	}

	pub fn range(first: char, last: char) -> Self {
		Self {
			base: Base::Hex,
			kind: NumValKind::Range(first, last),
		}
	}

	pub fn element(self) -> Element {
		Element::NumVal(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.element().alternation()
	}

	pub fn group(self) -> Group {
		self.element().group()
	}
}

impl fmt::Display for NumVal {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "%{}", self.base.prefix())?;
		match &self.kind {
			NumValKind::Sequence(values) => {
				for (i, value) in values.iter().enumerate() {
					if i > 0 {
						write!(f, ".")?;
					}
					self.base.write(*value, f)?;
				}
				Ok(())
			}
			NumValKind::Range(first, last) => {
				self.base.write(*first, f)?;
				write!(f, "-")?;
				self.base.write(*last, f)
			}
		}
	}
}

/// An informal `<...>` description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProseVal(pub String);

impl ProseVal {
	pub fn element(self) -> Element {
		Element::ProseVal(self)
	}

	pub fn repetition(self) -> Repetition {
		self.element().repetition()
	}

	pub fn concatenation(self) -> Concatenation {
		self.element().concatenation()
	}

	pub fn alternation(self) -> Alternation {
		self.element().alternation()
	}

	pub fn group(self) -> Group {
		self.element().group()
	}
}

impl fmt::Display for ProseVal {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "<{}>", self.0)
	}
}

/// The pattern algebra over ABNF: operations collapse adjacent literals the
/// way a grammar author would write them. Unions of adjacent one-value
/// num-vals become ranges and concatenated same-case char-vals merge.
impl RegularPattern<char> for Alternation {
	fn empty() -> Self {
		// no string satisfies a one-or-more repetition capped at zero.
		Repetition {
			repeat: Some(RepeatSpec::Range {
				min: Some(1),
				max: Some(0),
			}),
			element: CharVal {
				value: String::new(),
				case_sensitive: false,
			}
			.element(),
		}
		.alternation()
	}

	fn epsilon() -> Self {
		CharVal {
			value: String::new(),
			case_sensitive: false,
		}
		.alternation()
	}

	fn symbol(symbol: char) -> Self {
		NumVal::single(symbol).alternation()
	}

	fn union(mut self, other: Self) -> Self {
		for alternative in other.alternatives {
			merge_alternative(&mut self.alternatives, alternative);
		}
		self
	}

	fn concat(self, other: Self) -> Self {
		match self.single_concatenation() {
			Ok(mut this) => {
				match other.single_concatenation() {
					Ok(tail) => {
						for repetition in tail.repetitions {
							push_repetition(&mut this.repetitions, repetition);
						}
					}
					Err(other) => {
						push_repetition(&mut this.repetitions, other.element().repetition())
					}
				}
				this.alternation()
			}
			Err(this) => {
				let mut base = this.element().concatenation();
				push_repetition(&mut base.repetitions, other.element().repetition());
				base.alternation()
			}
		}
	}

	fn star(self) -> Self {
		Repetition {
			repeat: Some(RepeatSpec::Range {
				min: None,
				max: None,
			}),
			element: self.element(),
		}
		.alternation()
	}

	fn optional(self) -> Self {
		OptionalGroup(self).alternation()
	}

	fn plus(self) -> Self {
		Repetition {
			repeat: Some(RepeatSpec::Range {
				min: Some(1),
				max: None,
			}),
			element: self.element(),
		}
		.alternation()
	}

	fn repeat(self, bounds: impl Into<Repeat>) -> Self {
		let bounds = bounds.into();
		let spec = match (bounds.min(), bounds.max()) {
			(min, Some(max)) if min == max => RepeatSpec::Exact(min),
			(min, max) => RepeatSpec::Range {
				min: (min > 0).then_some(min),
				max,
			},
		};

		Repetition {
			repeat: Some(spec),
			element: self.element(),
		}
		.alternation()
	}
}

impl RegularPattern<char> for Element {
	fn empty() -> Self {
		Alternation::empty().element()
	}

	fn epsilon() -> Self {
		Alternation::epsilon().element()
	}

	fn symbol(symbol: char) -> Self {
		NumVal::single(symbol).element()
	}

	fn union(self, other: Self) -> Self {
		self.alternation().union(other.alternation()).element()
	}

	fn concat(self, other: Self) -> Self {
		self.alternation().concat(other.alternation()).element()
	}

	fn star(self) -> Self {
		self.alternation().star().element()
	}

	fn optional(self) -> Self {
		OptionalGroup(self.alternation()).element()
	}
}

impl RegularPattern<char> for Concatenation {
	fn empty() -> Self {
		Alternation::empty().concatenation()
	}

	fn epsilon() -> Self {
		Alternation::epsilon().concatenation()
	}

	fn symbol(symbol: char) -> Self {
		NumVal::single(symbol).concatenation()
	}

	fn union(self, other: Self) -> Self {
		self.alternation().union(other.alternation()).concatenation()
	}

	fn concat(self, other: Self) -> Self {
		self.alternation().concat(other.alternation()).concatenation()
	}

	fn star(self) -> Self {
		self.alternation().star().concatenation()
	}
}

impl RegularPattern<char> for Repetition {
	fn empty() -> Self {
		Alternation::empty().repetition()
	}

	fn epsilon() -> Self {
		Alternation::epsilon().repetition()
	}

	fn symbol(symbol: char) -> Self {
		NumVal::single(symbol).repetition()
	}

	fn union(self, other: Self) -> Self {
		self.alternation().union(other.alternation()).repetition()
	}

	fn concat(self, other: Self) -> Self {
		self.alternation().concat(other.alternation()).repetition()
	}

	fn star(self) -> Self {
		self.alternation().star().repetition()
	}
}

impl Alternation {
	/// The single concatenation of a one-alternative alternation.
	fn single_concatenation(mut self) -> Result<Concatenation, Self> {
		if self.alternatives.len() == 1 {
			Ok(self.alternatives.pop().unwrap())
		} else {
			Err(self)
		}
	}
}

/// Append an alternative, collapsing adjacent one-value num-vals into
/// ranges (`%x20 / %x21` becomes `%x20-21`).
fn merge_alternative(alternatives: &mut Vec<Concatenation>, alternative: Concatenation) {
	let merged = (|| {
		let last = alternatives.last().and_then(bare_num_val)?;
		let next = bare_num_val(&alternative)?;

		let (first, last_value) = match &last.kind {
			NumValKind::Sequence(values) if values.len() == 1 => (values[0], values[0]),
			NumValKind::Range(first, last) => (*first, *last),
			_ => return None,
		};

		let next_value = match &next.kind {
			NumValKind::Sequence(values) if values.len() == 1 => values[0],
			_ => return None,
		};

		(last_value as u32 + 1 == next_value as u32).then(|| NumVal {
			base: last.base,
			kind: NumValKind::Range(first, next_value),
		})
	})();

	match merged {
		Some(num_val) => *alternatives.last_mut().unwrap() = num_val.concatenation(),
		None => alternatives.push(alternative),
	}
}

/// The num-val of a bare single-repetition concatenation.
fn bare_num_val(concatenation: &Concatenation) -> Option<&NumVal> {
	match concatenation.repetitions.as_slice() {
		[Repetition {
			repeat: None,
			element: Element::NumVal(v),
		}] => Some(v),
		_ => None,
	}
}

/// Append a repetition, collapsing adjacent same-case char-vals into one
/// quoted string.
fn push_repetition(repetitions: &mut Vec<Repetition>, repetition: Repetition) {
	if let (
		Some(Repetition {
			repeat: None,
			element: Element::CharVal(last),
		}),
		Repetition {
			repeat: None,
			element: Element::CharVal(next),
		},
	) = (repetitions.last_mut(), &repetition)
	{
		if last.case_sensitive == next.case_sensitive {
			last.value.push_str(&next.value);
			return;
		}
	}

	repetitions.push(repetition);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn char_val(s: &str) -> CharVal {
		CharVal {
			value: s.into(),
			case_sensitive: false,
		}
	}

	#[test]
	fn rulename_identity_is_case_insensitive() {
		assert_eq!(Rulename::new("Foo"), Rulename::new("FOO"));
		assert_eq!(Rulename::new("Foo").to_string(), "Foo");
	}

	#[test]
	fn upcasts_preserve_the_node() {
		let element = char_val("a").element();
		assert_eq!(
			element.clone().alternation().element(),
			element
		);
	}

	#[test]
	fn adjacent_num_vals_collapse_to_a_range() {
		let alternation = Alternation::symbol(' ').union(Alternation::symbol('!'));
		assert_eq!(alternation.to_string(), "%x20-21");
	}

	#[test]
	fn non_adjacent_num_vals_stay_separate() {
		let alternation = Alternation::symbol(' ').union(Alternation::symbol('0'));
		assert_eq!(alternation.to_string(), "%x20 / %x30");
	}

	#[test]
	fn concatenated_char_vals_collapse() {
		let alternation = char_val("ab")
			.alternation()
			.concat(char_val("cd").alternation());
		assert_eq!(alternation.to_string(), "\"abcd\"");
	}

	#[test]
	fn display_repetitions() {
		let star = char_val("x").alternation().star();
		assert_eq!(star.to_string(), "*\"x\"");

		let optional = char_val("x").alternation().optional();
		assert_eq!(optional.to_string(), "[\"x\"]");

		let bounded = char_val("x").alternation().repeat(2..=4);
		assert_eq!(bounded.to_string(), "2*4\"x\"");

		let exact = char_val("x").alternation().repeat(3);
		assert_eq!(exact.to_string(), "3\"x\"");
	}

	#[test]
	fn incremental_rules_fold_into_one_definition() {
		let rulelist = Rulelist {
			rules: vec![
				Rule {
					name: Rulename::new("r"),
					incremental: false,
					alternation: Alternation::symbol(' '),
				},
				Rule {
					name: Rulename::new("R"),
					incremental: true,
					alternation: Alternation::symbol('0'),
				},
			],
		};

		let rule = rulelist.get(&Rulename::new("r")).unwrap();
		assert_eq!(rule.alternation.alternatives.len(), 2);
		assert!(!rule.incremental);
	}
}
