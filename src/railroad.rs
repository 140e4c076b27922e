//! Railroad diagram tree-walkers.
//!
//! The walkers translate grammar and regular expression trees into calls on
//! an abstract [`DiagramBuilder`]; concrete text or SVG renderers implement
//! the trait elsewhere.
use reglang_syntax::{RegexPattern, ECMASCRIPT};

use crate::abnf::ast::{Alternation, Concatenation, Element, Repetition, RepeatSpec, Rule};

/// Receiver of diagram construction calls.
///
/// One method per diagram node kind. `Output` is whatever the builder
/// accumulates: a layout node, a string, a bounding box.
pub trait DiagramBuilder {
	type Output;

	/// The diagram root around a fully built body.
	fn diagram(&mut self, body: Self::Output) -> Self::Output;

	/// Items rendered left to right.
	fn sequence(&mut self, items: Vec<Self::Output>) -> Self::Output;

	/// Items rendered top to bottom.
	fn stack(&mut self, items: Vec<Self::Output>) -> Self::Output;

	/// One of the items, `default` indexing the straight-through branch.
	fn choice(&mut self, default: usize, items: Vec<Self::Output>) -> Self::Output;

	/// A sequence whose items may each be skipped.
	fn optional_sequence(&mut self, items: Vec<Self::Output>) -> Self::Output;

	/// Items traversed alternately, as in a separated list. At most two
	/// items are supported.
	fn alternating_sequence(&mut self, items: Vec<Self::Output>) -> Self::Output;

	/// A literal token.
	fn terminal(&mut self, text: &str) -> Self::Output;

	/// A reference to another rule.
	fn non_terminal(&mut self, text: &str) -> Self::Output;

	/// Free-form annotation.
	fn comment(&mut self, text: &str) -> Self::Output;

	/// Zero or one traversal of `item`.
	fn optional(&mut self, item: Self::Output) -> Self::Output;

	/// One or more traversals; `repeat` decorates the back edge.
	fn one_or_more(&mut self, item: Self::Output, repeat: Option<Self::Output>) -> Self::Output;

	/// Zero or more traversals; `repeat` decorates the back edge.
	fn zero_or_more(&mut self, item: Self::Output, repeat: Option<Self::Output>) -> Self::Output;

	/// A boxed sub-diagram with an optional label.
	fn group(&mut self, item: Self::Output, label: Option<&str>) -> Self::Output;

	/// The entry marker.
	fn start(&mut self) -> Self::Output;

	/// The exit marker.
	fn end(&mut self) -> Self::Output;

	/// An empty traversal.
	fn skip(&mut self) -> Self::Output;
}

/// Walk a rule into a complete diagram.
pub fn walk_rule<B: DiagramBuilder>(rule: &Rule, builder: &mut B) -> B::Output {
	let start = builder.start();
	let body = walk_alternation(&rule.alternation, builder);
	let end = builder.end();
	let sequence = builder.sequence(vec![start, body, end]);
	builder.diagram(sequence)
}

pub fn walk_alternation<B: DiagramBuilder>(
	alternation: &Alternation,
	builder: &mut B,
) -> B::Output {
	if alternation.alternatives.len() == 1 {
		walk_concatenation(&alternation.alternatives[0], builder)
	} else {
		let items = alternation
			.alternatives
			.iter()
			.map(|alternative| walk_concatenation(alternative, builder))
			.collect();
		builder.choice(0, items)
	}
}

fn walk_concatenation<B: DiagramBuilder>(
	concatenation: &Concatenation,
	builder: &mut B,
) -> B::Output {
	if concatenation.repetitions.len() == 1 {
		walk_repetition(&concatenation.repetitions[0], builder)
	} else {
		let items = concatenation
			.repetitions
			.iter()
			.map(|repetition| walk_repetition(repetition, builder))
			.collect();
		builder.sequence(items)
	}
}

fn walk_repetition<B: DiagramBuilder>(repetition: &Repetition, builder: &mut B) -> B::Output {
	let item = walk_element(&repetition.element, builder);

	let Some(repeat) = repetition.repeat else {
		return item;
	};

	if repeat.max() == Some(0) {
		return builder.skip();
	}

	match repeat {
		RepeatSpec::List { .. } => {
			let separator = builder.terminal(",");
			let list = builder.alternating_sequence(vec![item, separator]);
			match bounds_comment(&repeat, builder) {
				Some(comment) => {
					let items = vec![list, comment];
					builder.sequence(items)
				}
				None => list,
			}
		}
		repeat => {
			let annotation = bounds_comment(&repeat, builder);
			if repeat.min() == 0 {
				builder.zero_or_more(item, annotation)
			} else {
				builder.one_or_more(item, annotation)
			}
		}
	}
}

/// A back-edge annotation for non-trivial bounds, `None` for plain `*`,
/// `1*` and `#` repetitions.
fn bounds_comment<B: DiagramBuilder>(
	repeat: &RepeatSpec,
	builder: &mut B,
) -> Option<B::Output> {
	let text = match (repeat.min(), repeat.max()) {
		(0, None) | (1, None) => return None,
		(n, Some(m)) if n == m => format!("{n} times"),
		(n, None) => format!("{n} or more"),
		(0, Some(m)) => format!("at most {m}"),
		(n, Some(m)) => format!("{n} to {m}"),
	};
	Some(builder.comment(&text))
}

fn walk_element<B: DiagramBuilder>(element: &Element, builder: &mut B) -> B::Output {
	match element {
		Element::Rulename(name) => builder.non_terminal(name.as_str()),
		Element::Group(group) => {
			let inner = walk_alternation(&group.0, builder);
			builder.group(inner, None)
		}
		Element::Option(option) => {
			let inner = walk_alternation(&option.0, builder);
			builder.optional(inner)
		}
		Element::CharVal(value) => builder.terminal(&value.to_string()),
		Element::NumVal(value) => builder.terminal(&value.to_string()),
		Element::ProseVal(prose) => builder.comment(&prose.0),
	}
}

/// Walk a regular expression into a complete diagram.
pub fn walk_regex<B: DiagramBuilder>(pattern: &RegexPattern, builder: &mut B) -> B::Output {
	let start = builder.start();
	let body = walk_regex_node(pattern, builder);
	let end = builder.end();
	let sequence = builder.sequence(vec![start, body, end]);
	builder.diagram(sequence)
}

fn walk_regex_node<B: DiagramBuilder>(pattern: &RegexPattern, builder: &mut B) -> B::Output {
	match pattern {
		RegexPattern::Empty => builder.comment("matches nothing"),
		RegexPattern::Epsilon => builder.skip(),
		RegexPattern::Class(_) => builder.terminal(&ECMASCRIPT.encode(pattern)),
		RegexPattern::Literal(text) => builder.terminal(text),
		RegexPattern::Alt(items) => {
			let items = items
				.iter()
				.map(|item| walk_regex_node(item, builder))
				.collect();
			builder.choice(0, items)
		}
		RegexPattern::Seq(items) => {
			let items = items
				.iter()
				.map(|item| walk_regex_node(item, builder))
				.collect();
			builder.sequence(items)
		}
		RegexPattern::Repeat(inner, min, max) => {
			let item = walk_regex_node(inner, builder);
			match (*min, *max) {
				(_, Some(0)) => builder.skip(),
				(0, Some(1)) => builder.optional(item),
				(0, max) => {
					let annotation = repeat_comment(0, max, builder);
					builder.zero_or_more(item, annotation)
				}
				(min, max) => {
					let annotation = repeat_comment(min, max, builder);
					builder.one_or_more(item, annotation)
				}
			}
		}
	}
}

fn repeat_comment<B: DiagramBuilder>(
	min: u32,
	max: Option<u32>,
	builder: &mut B,
) -> Option<B::Output> {
	let text = match (min, max) {
		(0, None) | (1, None) => return None,
		(n, Some(m)) if n == m => format!("{n} times"),
		(n, None) => format!("{n} or more"),
		(0, Some(m)) => format!("at most {m}"),
		(n, Some(m)) => format!("{n} to {m}"),
	};
	Some(builder.comment(&text))
}
