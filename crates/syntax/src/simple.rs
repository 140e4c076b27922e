//! Minimal algebraic regular expressions.
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use replace_with::replace_with_or_abort;

use reglang_automata::{ClassAlgebra, SymbolClass, DFA, NFA};

use crate::pattern::RegularPattern;

/// Algebraic regular expression over atoms of type `A`.
///
/// This is the intermediate form between automata and printable regular
/// expressions. The empty language is `Union([])` and the empty string is
/// `Concat([])`; both invariants are relied upon by the simplifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimpleRegex<A> {
	/// A single atom (a symbol class read in one step).
	Symbol(A),
	/// Union of the children; matches nothing when empty.
	Union(Vec<Self>),
	/// Concatenation of the children; matches the empty string when empty.
	Concat(Vec<Self>),
	/// Zero or more repetitions of the child.
	Star(Box<Self>),
}

impl<A> SimpleRegex<A> {
	/// The regular expression matching no string at all.
	pub fn empty() -> Self {
		Self::Union(Vec::new())
	}

	/// The regular expression matching exactly the empty string.
	pub fn epsilon() -> Self {
		Self::Concat(Vec::new())
	}

	/// Checks if the expression matches no string at all.
	pub fn is_empty_language(&self) -> bool {
		match self {
			Self::Symbol(_) => false,
			Self::Union(items) => items.iter().all(Self::is_empty_language),
			Self::Concat(items) => items.iter().any(Self::is_empty_language),
			Self::Star(_) => false,
		}
	}

	/// Checks if the expression matches exactly the empty string.
	pub fn is_epsilon(&self) -> bool {
		match self {
			Self::Symbol(_) => false,
			Self::Union(items) => {
				!items.is_empty() && items.iter().all(Self::is_epsilon)
			}
			Self::Concat(items) => items.iter().all(Self::is_epsilon),
			Self::Star(inner) => inner.is_epsilon() || inner.is_empty_language(),
		}
	}

	/// Push the given expression at the end of this sequence.
	pub fn push(&mut self, e: Self) {
		replace_with_or_abort(self, |this| match this {
			Self::Concat(mut seq) => {
				seq.push(e);
				Self::Concat(seq)
			}
			item => Self::Concat(vec![item, e]),
		})
	}

	/// Add the given expression as an alternative.
	pub fn merge(&mut self, e: Self) {
		replace_with_or_abort(self, |this| match this {
			Self::Union(mut items) => {
				items.push(e);
				Self::Union(items)
			}
			item => Self::Union(vec![item, e]),
		})
	}

	/// Map every atom of the expression.
	pub fn map_atoms<B>(self, f: &impl Fn(A) -> B) -> SimpleRegex<B> {
		match self {
			Self::Symbol(a) => SimpleRegex::Symbol(f(a)),
			Self::Union(items) => {
				SimpleRegex::Union(items.into_iter().map(|e| e.map_atoms(f)).collect())
			}
			Self::Concat(items) => {
				SimpleRegex::Concat(items.into_iter().map(|e| e.map_atoms(f)).collect())
			}
			Self::Star(inner) => SimpleRegex::Star(Box::new(inner.map_atoms(f))),
		}
	}

	/// Rewrites the expression using the algebra identities: units and
	/// absorbing elements are folded away, single-child unions and sequences
	/// collapse, duplicate alternatives drop, nested stars flatten.
	pub fn simplified(self) -> Self
	where
		A: PartialEq,
	{
		match self {
			Self::Symbol(a) => Self::Symbol(a),
			Self::Union(items) => {
				let mut new_items: Vec<Self> = Vec::with_capacity(items.len());
				for item in items {
					let item = item.simplified();
					if item.is_empty_language() {
						continue;
					}

					match item {
						Self::Union(children) => new_items.extend(children),
						item => {
							if !new_items.contains(&item) {
								new_items.push(item)
							}
						}
					}
				}

				if new_items.len() == 1 {
					new_items.into_iter().next().unwrap()
				} else {
					Self::Union(new_items)
				}
			}
			Self::Concat(items) => {
				let mut new_items = Vec::with_capacity(items.len());
				for item in items {
					let item = item.simplified();
					if item.is_empty_language() {
						return Self::empty();
					}

					match item {
						Self::Concat(children) => new_items.extend(children),
						item => new_items.push(item),
					}
				}

				if new_items.len() == 1 {
					new_items.into_iter().next().unwrap()
				} else {
					Self::Concat(new_items)
				}
			}
			Self::Star(inner) => {
				let inner = inner.simplified();
				if inner.is_empty_language() || inner.is_epsilon() {
					Self::epsilon()
				} else if let Self::Star(_) = inner {
					inner
				} else {
					Self::Star(Box::new(inner))
				}
			}
		}
	}
}

/// Union with the zero element folded away.
fn union_smart<A>(a: SimpleRegex<A>, b: SimpleRegex<A>) -> SimpleRegex<A> {
	if a.is_empty_language() {
		b
	} else if b.is_empty_language() {
		a
	} else {
		match a {
			SimpleRegex::Union(mut items) => {
				items.push(b);
				SimpleRegex::Union(items)
			}
			a => SimpleRegex::Union(vec![a, b]),
		}
	}
}

/// Concatenation with units and the absorbing element folded away.
fn concat_smart<A>(a: SimpleRegex<A>, b: SimpleRegex<A>) -> SimpleRegex<A> {
	if a.is_empty_language() || b.is_empty_language() {
		SimpleRegex::empty()
	} else if a.is_epsilon() {
		b
	} else if b.is_epsilon() {
		a
	} else {
		match a {
			SimpleRegex::Concat(mut items) => {
				items.push(b);
				SimpleRegex::Concat(items)
			}
			a => SimpleRegex::Concat(vec![a, b]),
		}
	}
}

fn star_smart<A>(a: SimpleRegex<A>) -> SimpleRegex<A> {
	if a.is_empty_language() || a.is_epsilon() {
		SimpleRegex::epsilon()
	} else if let SimpleRegex::Star(_) = a {
		a
	} else {
		SimpleRegex::Star(Box::new(a))
	}
}

impl<A: ClassAlgebra> SimpleRegex<A> {
	/// Compiles the expression to a nondeterministic automaton.
	pub fn to_nfa(&self) -> NFA<A> {
		let mut result = NFA::new();

		let mut n = 0;
		let mut new_state = move || {
			let r = n;
			n += 1;
			r
		};

		let (a, b) = self.build_into(&mut new_state, &mut result);
		result.add_initial_state(a);
		result.add_final_state(b);

		result
	}

	/// Compiles the expression to a deterministic automaton.
	pub fn to_dfa(&self) -> DFA<A> {
		DFA::from_nfa(&self.to_nfa())
	}

	fn build_into(
		&self,
		new_state: &mut impl FnMut() -> u32,
		automaton: &mut NFA<A>,
	) -> (u32, u32) {
		match self {
			Self::Symbol(class) => {
				let a = new_state();
				let b = new_state();
				automaton.add(a, Some(class.clone()), b);
				(a, b)
			}
			Self::Concat(items) => {
				let a = new_state();
				automaton.add_state(a);
				let mut b = a;

				for e in items {
					let (ea, eb) = e.build_into(new_state, automaton);
					automaton.add(b, None, ea);
					b = eb;
				}

				(a, b)
			}
			Self::Union(items) => {
				let a = new_state();
				let b = new_state();
				automaton.add_state(a);
				automaton.add_state(b);

				for e in items {
					let (ea, eb) = e.build_into(new_state, automaton);
					automaton.add(a, None, ea);
					automaton.add(eb, None, b);
				}

				(a, b)
			}
			Self::Star(inner) => {
				let (a, b) = inner.build_into(new_state, automaton);
				automaton.add(a, None, b);
				automaton.add(b, None, a);
				(a, b)
			}
		}
	}

	/// Extracts a regular expression from a deterministic automaton by state
	/// elimination.
	///
	/// A fresh source and sink are wired to the initial and final states;
	/// interior states are then eliminated one by one (lowest fan-in × fan-out
	/// first, which keeps the output readable), each elimination replacing the
	/// paths through the state by direct labeled edges.
	pub fn from_dfa<Q: Clone + Ord + Hash>(dfa: &DFA<A, Q>) -> Self {
		#[derive(PartialEq, Eq, Hash)]
		enum Node<'q, Q> {
			Source,
			State(&'q Q),
			Sink,
		}

		impl<'q, Q> Clone for Node<'q, Q> {
			fn clone(&self) -> Self {
				*self
			}
		}

		impl<'q, Q> Copy for Node<'q, Q> {}

		fn add_edge<'q, Q: Eq + Hash, A: ClassAlgebra>(
			edges: &mut HashMap<(Node<'q, Q>, Node<'q, Q>), SimpleRegex<A>>,
			from: Node<'q, Q>,
			to: Node<'q, Q>,
			label: SimpleRegex<A>,
		) {
			match edges.get_mut(&(from, to)) {
				Some(existing) => {
					replace_with_or_abort(existing, |e| union_smart(e, label));
				}
				None => {
					edges.insert((from, to), label);
				}
			}
		}

		let mut edges: HashMap<(Node<Q>, Node<Q>), SimpleRegex<A>> = HashMap::new();

		add_edge(
			&mut edges,
			Node::Source,
			Node::State(dfa.initial_state()),
			SimpleRegex::epsilon(),
		);

		for q in dfa.final_states() {
			add_edge(&mut edges, Node::State(q), Node::Sink, SimpleRegex::epsilon());
		}

		for (q, row) in dfa.transitions().iter() {
			for (class, target) in row {
				add_edge(
					&mut edges,
					Node::State(q),
					Node::State(target),
					SimpleRegex::Symbol(class.clone()),
				);
			}
		}

		let mut todo: Vec<&Q> = dfa.states().into_iter().collect();

		while !todo.is_empty() {
			// eliminate the cheapest state first: fewest shortcut edges.
			let (i, _) = todo
				.iter()
				.enumerate()
				.min_by_key(|(_, q)| {
					let node = Node::State(**q);
					let fan_in = edges
						.keys()
						.filter(|(from, to)| *to == node && *from != node)
						.count();
					let fan_out = edges
						.keys()
						.filter(|(from, to)| *from == node && *to != node)
						.count();
					fan_in * fan_out
				})
				.unwrap();
			let q = todo.remove(i);
			let node = Node::State(q);

			let mut incoming = Vec::new();
			let mut outgoing = Vec::new();
			let mut self_loop = SimpleRegex::empty();
			let mut rest = HashMap::new();

			for ((from, to), label) in edges.drain() {
				if from == node && to == node {
					self_loop = union_smart(self_loop, label);
				} else if to == node {
					incoming.push((from, label));
				} else if from == node {
					outgoing.push((to, label));
				} else {
					rest.insert((from, to), label);
				}
			}

			edges = rest;
			let self_loop = star_smart(self_loop);

			for (from, in_label) in &incoming {
				for (to, out_label) in &outgoing {
					let label = concat_smart(
						in_label.clone(),
						concat_smart(self_loop.clone(), out_label.clone()),
					);

					match edges.get_mut(&(*from, *to)) {
						Some(existing) => {
							replace_with_or_abort(existing, |e| union_smart(e, label));
						}
						None => {
							edges.insert((*from, *to), label);
						}
					}
				}
			}
		}

		edges
			.remove(&(Node::Source, Node::Sink))
			.map(SimpleRegex::simplified)
			.unwrap_or_else(SimpleRegex::empty)
	}
}

/// Extraction of a regular expression from an automaton.
pub trait ToRegex<A> {
	fn to_regex(&self) -> SimpleRegex<A>;
}

impl<A: ClassAlgebra, Q: Clone + Ord + Hash> ToRegex<A> for DFA<A, Q> {
	fn to_regex(&self) -> SimpleRegex<A> {
		SimpleRegex::from_dfa(self)
	}
}

impl<T, A: SymbolClass<T>> RegularPattern<T> for SimpleRegex<A> {
	fn empty() -> Self {
		Self::empty()
	}

	fn epsilon() -> Self {
		Self::epsilon()
	}

	fn symbol(symbol: T) -> Self {
		Self::Symbol(A::from_symbol(symbol))
	}

	fn union(mut self, other: Self) -> Self {
		self.merge(other);
		self
	}

	fn concat(mut self, other: Self) -> Self {
		self.push(other);
		self
	}

	fn star(self) -> Self {
		Self::Star(Box::new(self))
	}
}

impl<A: fmt::Display> SimpleRegex<A> {
	/// Precedence levels: union (0) < concatenation (1) < star (2) < atoms.
	fn fmt_prec(&self, f: &mut fmt::Formatter, level: u8) -> fmt::Result {
		match self {
			Self::Union(items) if items.len() == 1 => return items[0].fmt_prec(f, level),
			Self::Concat(items) if items.len() == 1 => return items[0].fmt_prec(f, level),
			_ => {}
		}

		let own = match self {
			Self::Symbol(_) => 3,
			Self::Union(items) => {
				if items.is_empty() {
					3
				} else {
					0
				}
			}
			Self::Concat(items) => {
				if items.is_empty() {
					3
				} else {
					1
				}
			}
			Self::Star(_) => 2,
		};

		if own < level {
			write!(f, "(")?;
		}

		match self {
			Self::Symbol(a) => write!(f, "{a}")?,
			Self::Union(items) => {
				if items.is_empty() {
					write!(f, "∅")?;
				} else {
					for (i, item) in items.iter().enumerate() {
						if i > 0 {
							write!(f, "|")?;
						}
						item.fmt_prec(f, 1)?;
					}
				}
			}
			Self::Concat(items) => {
				if items.is_empty() {
					write!(f, "ε")?;
				} else {
					for item in items {
						item.fmt_prec(f, 2)?;
					}
				}
			}
			Self::Star(inner) => {
				inner.fmt_prec(f, 3)?;
				write!(f, "*")?;
			}
		}

		if own < level {
			write!(f, ")")?;
		}

		Ok(())
	}
}

impl<A: fmt::Display> fmt::Display for SimpleRegex<A> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.fmt_prec(f, 0)
	}
}
