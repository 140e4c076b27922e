//! Printable regular expression trees.
use reglang_automata::RangeSet;

use crate::pattern::{Repeat, RegularPattern};
use crate::simple::SimpleRegex;

/// Regular expression tree over Unicode scalar values, the bridge between
/// [`SimpleRegex`] and the dialect printers.
///
/// Unlike [`SimpleRegex`], repetitions are kept as bounded nodes and runs of
/// single characters collapse into literals, so the printed form stays close
/// to what a human would write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexPattern {
	/// Matches nothing.
	Empty,
	/// Matches the empty string.
	Epsilon,
	/// Matches any one character of the set.
	Class(RangeSet<char>),
	/// Matches the verbatim character sequence.
	Literal(String),
	/// Alternation.
	Alt(Vec<Self>),
	/// Concatenation.
	Seq(Vec<Self>),
	/// Repetition, unbounded above when the upper bound is `None`.
	Repeat(Box<Self>, u32, Option<u32>),
}

impl RegexPattern {
	/// The single character matched by the node, if it matches exactly one.
	pub fn as_single_char(&self) -> Option<char> {
		match self {
			Self::Class(set) => {
				let mut iter = set.iter();
				let range = iter.next()?;
				if iter.next().is_some() {
					return None;
				}

				let first = range.first()?;
				if range.last()? == first {
					Some(first)
				} else {
					None
				}
			}
			Self::Literal(s) => {
				let mut chars = s.chars();
				let c = chars.next()?;
				chars.next().is_none().then_some(c)
			}
			_ => None,
		}
	}

	/// The algebraic form of the pattern, with literals expanded back into
	/// symbol sequences and repetition nodes unrolled.
	pub fn to_simple(&self) -> SimpleRegex<RangeSet<char>> {
		match self {
			Self::Empty => SimpleRegex::empty(),
			Self::Epsilon => SimpleRegex::epsilon(),
			Self::Class(set) => SimpleRegex::Symbol(set.clone()),
			Self::Literal(s) => SimpleRegex::Concat(
				s.chars()
					.map(|c| {
						let mut set = RangeSet::new();
						set.insert(c..=c);
						SimpleRegex::Symbol(set)
					})
					.collect(),
			),
			Self::Alt(items) => SimpleRegex::Union(items.iter().map(Self::to_simple).collect()),
			Self::Seq(items) => SimpleRegex::Concat(items.iter().map(Self::to_simple).collect()),
			Self::Repeat(inner, min, max) => {
				let bounds = match max {
					Some(max) => Repeat::Between(*min, *max),
					None => Repeat::AtLeast(*min),
				};
				inner.to_simple().repeat(bounds)
			}
		}
	}

	/// Appends a node to a sequence, merging adjacent character literals.
	fn push_seq(items: &mut Vec<Self>, item: Self) {
		let single = item.as_single_char();

		match (items.last_mut(), single, item) {
			(Some(Self::Literal(s)), Some(c), _) => s.push(c),
			(_, Some(c), _) => items.push(Self::Literal(c.to_string())),
			(_, None, item) => items.push(item),
		}
	}
}

impl From<SimpleRegex<RangeSet<char>>> for RegexPattern {
	fn from(value: SimpleRegex<RangeSet<char>>) -> Self {
		match value {
			SimpleRegex::Symbol(set) => Self::Class(set),
			SimpleRegex::Union(items) => {
				if items.is_empty() {
					Self::Empty
				} else if items.len() == 1 {
					items.into_iter().next().unwrap().into()
				} else {
					Self::Alt(items.into_iter().map(Into::into).collect())
				}
			}
			SimpleRegex::Concat(items) => {
				if items.is_empty() {
					Self::Epsilon
				} else if items.len() == 1 {
					items.into_iter().next().unwrap().into()
				} else {
					let mut seq = Vec::with_capacity(items.len());
					for item in items {
						Self::push_seq(&mut seq, item.into());
					}

					if seq.len() == 1 {
						seq.into_iter().next().unwrap()
					} else {
						Self::Seq(seq)
					}
				}
			}
			SimpleRegex::Star(inner) => {
				Self::Repeat(Box::new(Self::from(*inner)), 0, None)
			}
		}
	}
}

impl RegularPattern<char> for RegexPattern {
	fn empty() -> Self {
		Self::Empty
	}

	fn epsilon() -> Self {
		Self::Epsilon
	}

	fn symbol(symbol: char) -> Self {
		Self::Literal(symbol.to_string())
	}

	fn union(self, other: Self) -> Self {
		match (self, other) {
			(Self::Empty, other) => other,
			(this, Self::Empty) => this,
			(Self::Alt(mut items), Self::Alt(others)) => {
				items.extend(others);
				Self::Alt(items)
			}
			(Self::Alt(mut items), other) => {
				items.push(other);
				Self::Alt(items)
			}
			(this, Self::Alt(mut others)) => {
				others.insert(0, this);
				Self::Alt(others)
			}
			(this, other) => Self::Alt(vec![this, other]),
		}
	}

	fn concat(self, other: Self) -> Self {
		match (self, other) {
			(Self::Empty, _) | (_, Self::Empty) => Self::Empty,
			(Self::Epsilon, other) => other,
			(this, Self::Epsilon) => this,
			(Self::Seq(mut items), other) => {
				Self::push_seq(&mut items, other);
				Self::Seq(items)
			}
			(this, other) => {
				let mut items = Vec::new();
				Self::push_seq(&mut items, this);
				Self::push_seq(&mut items, other);
				if items.len() == 1 {
					items.into_iter().next().unwrap()
				} else {
					Self::Seq(items)
				}
			}
		}
	}

	fn star(self) -> Self {
		Self::Repeat(Box::new(self), 0, None)
	}

	fn optional(self) -> Self {
		Self::Repeat(Box::new(self), 0, Some(1))
	}

	fn plus(self) -> Self {
		Self::Repeat(Box::new(self), 1, None)
	}

	fn repeat(self, bounds: impl Into<Repeat>) -> Self {
		let bounds = bounds.into();
		Self::Repeat(Box::new(self), bounds.min(), bounds.max())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn class(ranges: &[(char, char)]) -> RegexPattern {
		let mut set = RangeSet::new();
		for (a, b) in ranges {
			set.insert(*a..=*b);
		}
		RegexPattern::Class(set)
	}

	#[test]
	fn adjacent_characters_collapse_into_literals() {
		let pattern = RegexPattern::symbol('a')
			.concat(RegexPattern::symbol('b'))
			.concat(class(&[('c', 'c')]));
		assert_eq!(pattern, RegexPattern::Literal("abc".into()));
	}

	#[test]
	fn union_folds_empty() {
		let pattern = RegexPattern::Empty.union(RegexPattern::symbol('a'));
		assert_eq!(pattern, RegexPattern::Literal("a".into()));
	}

	#[test]
	fn repetition_nodes_are_kept() {
		let pattern = RegexPattern::symbol('a').repeat(2..=4);
		assert_eq!(
			pattern,
			RegexPattern::Repeat(Box::new(RegexPattern::Literal("a".into())), 2, Some(4))
		);
	}

	#[test]
	fn from_simple_regex() {
		let simple: SimpleRegex<RangeSet<char>> = SimpleRegex::Concat(vec![
			SimpleRegex::Symbol({
				let mut s = RangeSet::new();
				s.insert('a'..='a');
				s
			}),
			SimpleRegex::Star(Box::new(SimpleRegex::Symbol({
				let mut s = RangeSet::new();
				s.insert('0'..='9');
				s
			}))),
		]);

		let pattern = RegexPattern::from(simple);
		assert_eq!(
			pattern,
			RegexPattern::Seq(vec![
				RegexPattern::Literal("a".into()),
				RegexPattern::Repeat(Box::new(class(&[('0', '9')])), 0, None),
			])
		);
	}
}
