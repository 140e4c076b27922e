use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;

use crate::alphabet::Alphabet;
use crate::class::{ClassAlgebra, SymbolClass};
use crate::dfa::{DetTransitions, DFA};
use crate::{Automaton, InvalidAutomaton};

/// Nondeterministic state transitions.
///
/// The `None` label denotes an ε-transition.
pub type Transitions<C, Q> = BTreeMap<Option<C>, BTreeSet<Q>>;

/// Nondeterministic finite automaton over the class type `C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFA<C, Q = u32> {
	transitions: BTreeMap<Q, Transitions<C, Q>>,
	initial_states: BTreeSet<Q>,
	final_states: BTreeSet<Q>,
}

impl<C, Q> Default for NFA<C, Q> {
	fn default() -> Self {
		Self {
			transitions: BTreeMap::new(),
			initial_states: BTreeSet::new(),
			final_states: BTreeSet::new(),
		}
	}
}

impl<C, Q> NFA<C, Q> {
	/// Create a new empty nondeterministic finite automaton.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns an iterator over the transitions.
	pub fn transitions(&self) -> std::collections::btree_map::Iter<Q, Transitions<C, Q>> {
		self.transitions.iter()
	}
}

impl<C: ClassAlgebra, Q: Ord> NFA<C, Q> {
	/// Assemble an automaton from raw parts, checking its structure.
	pub fn try_from_parts(
		transitions: BTreeMap<Q, Transitions<C, Q>>,
		initial_states: BTreeSet<Q>,
		final_states: BTreeSet<Q>,
	) -> Result<Self, InvalidAutomaton> {
		let mut states: BTreeSet<&Q> = transitions.keys().collect();
		for state_transitions in transitions.values() {
			for (label, targets) in state_transitions {
				if let Some(label) = label {
					if label.is_void() {
						return Err(InvalidAutomaton::EmptyClass);
					}
				}

				states.extend(targets);
			}
		}

		if !initial_states.iter().all(|q| states.contains(q)) {
			return Err(InvalidAutomaton::InitialOutOfRange);
		}

		if !final_states.iter().all(|q| states.contains(q)) {
			return Err(InvalidAutomaton::FinalOutOfRange);
		}

		Ok(Self {
			transitions,
			initial_states,
			final_states,
		})
	}

	/// Get the successors of the given state.
	pub fn successors(&self, q: &Q) -> Successors<C, Q> {
		Successors::new(self.transitions.get(q))
	}

	/// Adds the given transition to the automaton.
	pub fn add(&mut self, source: Q, label: Option<C>, target: Q)
	where
		Q: Clone,
	{
		self.add_state(target.clone());
		self.transitions
			.entry(source)
			.or_default()
			.entry(label)
			.or_default()
			.insert(target);
	}

	/// Adds the given state into the automaton, even if it is not the source
	/// or destination of any transition.
	pub fn add_state(&mut self, q: Q) {
		self.transitions.entry(q).or_default();
	}

	/// Checks if the given state is an initial state.
	pub fn is_initial_state(&self, q: &Q) -> bool {
		self.initial_states.contains(q)
	}

	/// Sets the given state as an initial state.
	pub fn add_initial_state(&mut self, q: Q) -> bool {
		self.initial_states.insert(q)
	}

	/// Returns the set of initial states.
	pub fn initial_states(&self) -> &BTreeSet<Q> {
		&self.initial_states
	}

	/// Checks if the given state is a final state.
	pub fn is_final_state(&self, q: &Q) -> bool {
		self.final_states.contains(q)
	}

	/// Returns the set of final states.
	pub fn final_states(&self) -> &BTreeSet<Q> {
		&self.final_states
	}

	/// Adds a final state to the automaton.
	pub fn add_final_state(&mut self, q: Q) -> bool {
		self.final_states.insert(q)
	}

	/// The partition of the symbol universe induced by the transition labels.
	pub fn alphabet(&self) -> Alphabet<C> {
		let mut alphabet = Alphabet::new();
		for state_transitions in self.transitions.values() {
			for label in state_transitions.keys().flatten() {
				alphabet.insert(label.clone());
			}
		}
		alphabet
	}

	/// Checks if this automaton can recognize the empty string.
	pub fn recognizes_empty(&self) -> bool {
		let mut stack: Vec<_> = self.initial_states.iter().collect();
		let mut visited = BTreeSet::new();

		while let Some(q) = stack.pop() {
			if visited.insert(q) {
				if self.is_final_state(q) {
					return true;
				}

				if let Some(transitions) = self.transitions.get(q) {
					if let Some(successors) = transitions.get(&None) {
						stack.extend(successors)
					}
				}
			}
		}

		false
	}

	/// Checks if this automaton recognizes exactly one string.
	pub fn is_singleton<T: Clone>(&self) -> bool
	where
		C: SymbolClass<T>,
	{
		self.to_singleton().is_some()
	}

	/// Returns the string recognized by this automaton if it is a singleton
	/// automaton (it recognizes exactly one string).
	///
	/// Returns `None` if this automaton recognizes no string, or more than one
	/// string.
	pub fn to_singleton<T: Clone>(&self) -> Option<Vec<T>>
	where
		C: SymbolClass<T>,
	{
		if self.initial_states.len() > 1 {
			return None;
		}

		let mut result = Vec::new();
		let mut q = self.initial_states.first()?;

		while let Some(q_transitions) = self.transitions.get(q) {
			if q_transitions.len() > 1 {
				return None;
			}

			match q_transitions.first_key_value() {
				Some((label, r)) => {
					if r.len() > 1 {
						return None;
					}

					match r.first() {
						Some(r) => match label {
							Some(class) => {
								// a final state mid-chain accepts a prefix too
								if self.is_final_state(q) {
									return None;
								}

								let symbol = class.label();
								if *class != C::from_symbol(symbol.clone()) {
									return None;
								}
								result.push(symbol);
								q = r
							}
							None => return None,
						},
						None => break,
					}
				}
				None => break,
			}
		}

		if self.is_final_state(q) {
			Some(result)
		} else {
			None
		}
	}

	/// The least superset of `qs` closed under ε-transitions.
	pub fn epsilon_closure<'a>(&'a self, qs: impl IntoIterator<Item = &'a Q>) -> BTreeSet<&'a Q> {
		let mut states = BTreeSet::new();
		let mut stack: Vec<_> = qs.into_iter().collect();

		while let Some(q) = stack.pop() {
			if states.insert(q) {
				// add states reachable through epsilon-transitions.
				if let Some(transitions) = self.transitions.get(q) {
					if let Some(epsilon_qs) = transitions.get(&None) {
						for t in epsilon_qs {
							stack.push(t)
						}
					}
				}
			}
		}

		states
	}

	/// The deterministic transitions leaving the set state `states`: the
	/// transition labels of all member states, refined into disjoint classes,
	/// each mapped to the ε-closed set of reachable states.
	fn determinize_transitions_for(&self, states: &BTreeSet<&Q>) -> Vec<(C, BTreeSet<&Q>)> {
		let mut atoms: Vec<(C, BTreeSet<&Q>)> = Vec::new();

		for q in states {
			if let Some(transitions) = self.transitions.get(q) {
				for (label, targets) in transitions {
					if let Some(label) = label {
						debug_assert!(!label.is_void());
						let closed = self.epsilon_closure(targets.iter());
						insert_atom(&mut atoms, label.clone(), closed);
					}
				}
			}
		}

		atoms.sort_by(|a, b| a.0.cmp(&b.0));
		atoms
	}

	/// Turns this NFA into a DFA using the subset construction.
	///
	/// The input function `f` names each ε-closed state set.
	pub fn determinize<'a, R>(&'a self, mut f: impl FnMut(&BTreeSet<&'a Q>) -> R) -> DFA<C, R>
	where
		R: Clone + Ord + Hash,
	{
		let mut transitions = BTreeMap::new();

		// create the initial deterministic state.
		let initial_state = self.epsilon_closure(&self.initial_states);
		let mut final_states = BTreeSet::new();

		let mut visited_states = HashSet::new();
		let mut stack = vec![initial_state.clone()];
		while let Some(det_q) = stack.pop() {
			let r = f(&det_q);
			if visited_states.insert(r.clone()) {
				if det_q.iter().any(|q| self.final_states.contains(q)) {
					final_states.insert(r.clone());
				}

				let map = self.determinize_transitions_for(&det_q);

				let mut r_map = BTreeMap::new();
				for (label, next_det_q) in map {
					r_map.insert(label, f(&next_det_q));
					stack.push(next_det_q)
				}

				transitions.insert(r, r_map);
			}
		}

		DFA::from_parts(
			f(&initial_state),
			final_states,
			DetTransitions::from(transitions),
		)
	}

	/// Adds the given `other` automaton to `self`, mapping the other automaton
	/// states in the process.
	pub fn mapped_union<R>(&mut self, other: NFA<C, R>, f: impl Fn(R) -> Q) {
		for (q, transitions) in other.transitions {
			let this_transitions = self.transitions.entry(f(q)).or_default();
			for (label, targets) in transitions {
				this_transitions
					.entry(label)
					.or_default()
					.extend(targets.into_iter().map(&f));
			}
		}

		self.initial_states
			.extend(other.initial_states.into_iter().map(&f));
		self.final_states
			.extend(other.final_states.into_iter().map(f));
	}
}

/// Refine `atoms` with a new labeled target set, keeping classes disjoint.
fn insert_atom<'a, C: ClassAlgebra, Q: Ord>(
	atoms: &mut Vec<(C, BTreeSet<&'a Q>)>,
	class: C,
	targets: BTreeSet<&'a Q>,
) {
	let mut rest = Some(class);
	let mut result = Vec::with_capacity(atoms.len() + 2);

	for (existing, existing_targets) in atoms.drain(..) {
		let common = match &rest {
			Some(r) => existing.meet(r),
			None => None,
		};

		match common {
			None => result.push((existing, existing_targets)),
			Some(common) => {
				if let Some(outside) = existing.without(&common) {
					result.push((outside, existing_targets.clone()));
				}

				let mut merged = existing_targets;
				merged.extend(targets.iter().copied());
				rest = rest.and_then(|r| r.without(&common));
				result.push((common, merged));
			}
		}
	}

	if let Some(rest) = rest {
		result.push((rest, targets));
	}

	*atoms = result;
}

impl<C: ClassAlgebra> NFA<C, u32> {
	/// The automaton accepting no string at all.
	pub fn empty() -> Self {
		let mut nfa = Self::new();
		nfa.add_state(0);
		nfa.add_initial_state(0);
		nfa
	}

	/// The automaton accepting exactly the empty string.
	pub fn epsilon() -> Self {
		let mut nfa = Self::new();
		nfa.add_state(0);
		nfa.add_initial_state(0);
		nfa.add_final_state(0);
		nfa
	}

	/// The automaton accepting exactly the one-symbol strings of `class`.
	pub fn from_class(class: C) -> Self {
		if class.is_void() {
			return Self::empty();
		}

		let mut nfa = Self::new();
		nfa.add(0, Some(class), 1);
		nfa.add_initial_state(0);
		nfa.add_final_state(1);
		nfa
	}

	/// The automaton accepting exactly the one-symbol string `symbol`.
	pub fn symbol<T>(symbol: T) -> Self
	where
		C: SymbolClass<T>,
	{
		Self::from_class(C::from_symbol(symbol))
	}

	/// The automaton accepting exactly the given symbol sequence: a chain of
	/// `n + 1` states.
	pub fn verbatim<T>(symbols: impl IntoIterator<Item = T>) -> Self
	where
		C: SymbolClass<T>,
	{
		let mut nfa = Self::new();
		nfa.add_state(0);
		nfa.add_initial_state(0);

		let mut q = 0;
		for symbol in symbols {
			nfa.add(q, Some(C::from_symbol(symbol)), q + 1);
			q += 1;
		}

		nfa.add_final_state(q);
		nfa
	}

	/// First state identifier unused by the automaton.
	fn next_state_id(&self) -> u32 {
		let t = self
			.transitions
			.keys()
			.next_back()
			.map(|q| q + 1)
			.unwrap_or(0);
		let i = self
			.initial_states
			.iter()
			.next_back()
			.map(|q| q + 1)
			.unwrap_or(0);
		let f = self
			.final_states
			.iter()
			.next_back()
			.map(|q| q + 1)
			.unwrap_or(0);
		t.max(i).max(f)
	}

	/// Disjoint-state sum: accepts the strings of `self` and of `other`.
	pub fn union(mut self, other: Self) -> Self {
		let offset = self.next_state_id();
		self.mapped_union(other, |q| q + offset);
		self
	}

	/// Accepts a string of `self` followed by a string of `other`.
	pub fn concat(mut self, other: Self) -> Self {
		let offset = self.next_state_id();
		let other_initials: Vec<u32> = other.initial_states.iter().map(|q| q + offset).collect();

		// `mapped_union` extends both state sets; the finals of `self` are
		// taken out beforehand and its initials restored afterwards.
		let finals = std::mem::take(&mut self.final_states);
		self.mapped_union(other, |q| q + offset);
		self.initial_states.retain(|q| *q < offset);

		for i in &finals {
			for j in &other_initials {
				self.add(*i, None, *j);
			}
		}

		self
	}

	/// Kleene star: zero or more repetitions of `self`.
	pub fn star(mut self) -> Self {
		let hub = self.next_state_id();
		self.add_state(hub);

		for q in self.initial_states.clone() {
			self.add(hub, None, q);
		}

		for q in self.final_states.clone() {
			self.add(q, None, hub);
		}

		self.initial_states.clear();
		self.initial_states.insert(hub);
		self.final_states.insert(hub);
		self
	}

	/// One or more repetitions of `self`: ε-edges from every final state back
	/// to every initial state.
	pub fn plus(mut self) -> Self {
		for i in self.final_states.clone() {
			for j in self.initial_states.clone() {
				self.add(i, None, j);
			}
		}

		self
	}

	/// Zero or one occurrence of `self`.
	pub fn optional(mut self) -> Self {
		let q = self.next_state_id();
		self.add_state(q);
		self.add_initial_state(q);
		self.add_final_state(q);
		self
	}

	/// Between `min` and `max` repetitions of `self`, unbounded above when
	/// `max` is `None`.
	pub fn repeat(self, min: u32, max: Option<u32>) -> Self {
		match max {
			Some(max) if max < min => Self::empty(),
			Some(max) => {
				let mut result = Self::epsilon();
				for _ in 0..min {
					result = result.concat(self.clone());
				}
				for _ in min..max {
					result = result.concat(self.clone().optional());
				}
				result
			}
			None => {
				let mut result = Self::epsilon();
				for _ in 0..min {
					result = result.concat(self.clone());
				}
				result.concat(self.star())
			}
		}
	}

	/// Applies a sequence homomorphism to the accepted language.
	///
	/// Each rule maps a key (a non-empty symbol sequence) to an image
	/// sequence; symbols matched by no rule map to themselves. When several
	/// keys could start at the same state with the same symbol, the longest
	/// key wins.
	///
	/// Keys longer than one symbol are only rewritten where the automaton
	/// spells them along an unambiguous chain (each intermediate state has
	/// exactly the next key symbol as its single exit and is neither initial
	/// nor final); sites that do not satisfy this are left unchanged.
	pub fn map_symbols<T>(&self, rules: &[(Vec<T>, Vec<T>)]) -> Self
	where
		C: SymbolClass<T>,
		T: Clone + Ord,
	{
		let mut result = self.clone();
		let mut fresh = result.next_state_id();

		let mut sorted: Vec<&(Vec<T>, Vec<T>)> =
			rules.iter().filter(|(key, _)| !key.is_empty()).collect();
		sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

		let states: Vec<u32> = self.transitions.keys().copied().collect();
		let mut consumed: BTreeSet<(u32, T)> = BTreeSet::new();

		for p in states {
			for (key, image) in &sorted {
				let first = &key[0];
				if consumed.contains(&(p, first.clone())) {
					continue;
				}

				let Some(ends) = self.key_path_ends(p, key) else {
					continue;
				};

				consumed.insert((p, first.clone()));
				result.remove_symbol_exits(p, first);

				for end in ends {
					if image.is_empty() {
						result.add(p, None, end);
					} else {
						let mut source = p;
						for (i, symbol) in image.iter().enumerate() {
							let target = if i + 1 == image.len() {
								end
							} else {
								fresh += 1;
								fresh - 1
							};
							result.add(source, Some(C::from_symbol(symbol.clone())), target);
							source = target;
						}
					}
				}
			}
		}

		result
	}

	/// End states of every path spelling `key` from `p`, or `None` when the
	/// key does not start at `p` or some path cannot be rewritten exactly.
	fn key_path_ends<T>(&self, p: u32, key: &[T]) -> Option<Vec<u32>>
	where
		C: SymbolClass<T>,
		T: Clone,
	{
		let transitions = self.transitions.get(&p)?;
		let mut ends = Vec::new();

		for (label, targets) in transitions {
			let Some(label) = label else {
				continue;
			};

			if !label.contains_symbol(&key[0]) {
				continue;
			}

			for t in targets {
				ends.push(self.chain_end(*t, &key[1..])?);
			}
		}

		if ends.is_empty() {
			None
		} else {
			Some(ends)
		}
	}

	fn chain_end<T>(&self, q: u32, rest: &[T]) -> Option<u32>
	where
		C: SymbolClass<T>,
		T: Clone,
	{
		if rest.is_empty() {
			return Some(q);
		}

		if self.initial_states.contains(&q) || self.final_states.contains(&q) {
			return None;
		}

		let transitions = self.transitions.get(&q)?;
		if transitions.len() != 1 {
			return None;
		}

		let (label, targets) = transitions.iter().next().unwrap();
		let label = label.as_ref()?;
		if *label != C::from_symbol(rest[0].clone()) || targets.len() != 1 {
			return None;
		}

		self.chain_end(*targets.first().unwrap(), &rest[1..])
	}

	/// Remove `symbol` from every outgoing class of `p`.
	fn remove_symbol_exits<T>(&mut self, p: u32, symbol: &T)
	where
		C: SymbolClass<T>,
		T: Clone,
	{
		let single = C::from_symbol(symbol.clone());

		if let Some(map) = self.transitions.get_mut(&p) {
			let mut updated: Transitions<C, u32> = BTreeMap::new();
			for (label, targets) in std::mem::take(map) {
				match label {
					Some(class) if class.contains_symbol(symbol) => {
						if let Some(rest) = class.without(&single) {
							updated.entry(Some(rest)).or_default().extend(targets);
						}
					}
					other => {
						updated.entry(other).or_default().extend(targets);
					}
				}
			}
			*map = updated;
		}
	}
}

/// Iterator over the successors of a given state in a [`NFA`].
pub struct Successors<'a, C, Q> {
	inner: Option<std::collections::btree_map::Iter<'a, Option<C>, BTreeSet<Q>>>,
}

impl<'a, C, Q> Successors<'a, C, Q> {
	pub fn new(map: Option<&'a BTreeMap<Option<C>, BTreeSet<Q>>>) -> Self {
		Self {
			inner: map.map(|map| map.iter()),
		}
	}
}

impl<'a, C, Q> Iterator for Successors<'a, C, Q> {
	type Item = (&'a Option<C>, &'a BTreeSet<Q>);

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.as_mut().and_then(|inner| inner.next())
	}
}

impl<T, C: SymbolClass<T>, Q: Ord + Hash> Automaton<T> for NFA<C, Q> {
	type State<'a> = VisitingState<'a, Q> where Self: 'a;

	fn initial_state(&self) -> Option<Self::State<'_>> {
		let mut stack = Vec::new();
		let mut states = HashSet::new();

		for r in &self.initial_states {
			states.insert(r);
			stack.push(r);
		}

		// epsilon-closure.
		while let Some(q) = stack.pop() {
			if let Some(q_transitions) = self.transitions.get(q) {
				if let Some(targets) = q_transitions.get(&None) {
					for r in targets {
						if states.insert(r) {
							stack.push(r);
						}
					}
				}
			}
		}

		if states.is_empty() {
			None
		} else {
			Some(VisitingState {
				states,
				next_states: HashSet::new(),
				stack,
			})
		}
	}

	fn next_state<'a>(
		&'a self,
		VisitingState {
			mut states,
			mut next_states,
			mut stack,
		}: Self::State<'a>,
		token: T,
	) -> Option<Self::State<'_>> {
		for &q in &states {
			if let Some(q_transitions) = self.transitions.get(q) {
				for (label, targets) in q_transitions {
					if let Some(label) = label {
						if label.contains_symbol(&token) {
							for r in targets {
								if next_states.insert(r) {
									stack.push(r);
								}
							}
						}
					}
				}
			}
		}

		// epsilon-closure.
		while let Some(q) = stack.pop() {
			if let Some(q_transitions) = self.transitions.get(q) {
				if let Some(targets) = q_transitions.get(&None) {
					for r in targets {
						if next_states.insert(r) {
							stack.push(r);
						}
					}
				}
			}
		}

		if next_states.is_empty() {
			None
		} else {
			states.clear();
			Some(VisitingState {
				states: next_states,
				next_states: states,
				stack,
			})
		}
	}

	fn is_final_state<'a>(&'a self, VisitingState { states, .. }: &Self::State<'a>) -> bool {
		for &q in states {
			if self.final_states.contains(q) {
				return true;
			}
		}

		false
	}
}

pub struct VisitingState<'a, Q> {
	states: HashSet<&'a Q>,
	next_states: HashSet<&'a Q>,
	stack: Vec<&'a Q>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::class::Single;
	use btree_range_map::RangeSet;

	type CharNfa = NFA<Single<char>>;

	fn accepts<C: SymbolClass<char>>(nfa: &NFA<C>, input: &str) -> bool {
		let mut state = match nfa.initial_state() {
			Some(state) => state,
			None => return false,
		};

		for c in input.chars() {
			state = match nfa.next_state(state, c) {
				Some(state) => state,
				None => return false,
			};
		}

		nfa.is_final_state(&state)
	}

	#[test]
	fn empty_accepts_nothing() {
		let nfa = CharNfa::empty();
		assert!(!accepts(&nfa, ""));
		assert!(!accepts(&nfa, "a"));
	}

	#[test]
	fn epsilon_accepts_empty_string() {
		let nfa = CharNfa::epsilon();
		assert!(accepts(&nfa, ""));
		assert!(!accepts(&nfa, "a"));
		assert!(nfa.recognizes_empty());
	}

	#[test]
	fn verbatim_accepts_exactly_its_word() {
		let nfa = CharNfa::verbatim("abc".chars());
		assert!(accepts(&nfa, "abc"));
		assert!(!accepts(&nfa, "ab"));
		assert!(!accepts(&nfa, "abcd"));
		assert_eq!(nfa.to_singleton(), Some(vec!['a', 'b', 'c']));
	}

	#[test]
	fn union_accepts_both() {
		let nfa = CharNfa::verbatim("ab".chars()).union(CharNfa::verbatim("cd".chars()));
		assert!(accepts(&nfa, "ab"));
		assert!(accepts(&nfa, "cd"));
		assert!(!accepts(&nfa, "abcd"));
		assert!(nfa.to_singleton().is_none());
	}

	#[test]
	fn concat_joins_languages() {
		let nfa = CharNfa::verbatim("ab".chars()).concat(CharNfa::verbatim("cd".chars()));
		assert!(accepts(&nfa, "abcd"));
		assert!(!accepts(&nfa, "ab"));
		assert!(!accepts(&nfa, "cd"));
	}

	#[test]
	fn star_accepts_repetitions() {
		let nfa = CharNfa::verbatim("ab".chars()).star();
		assert!(accepts(&nfa, ""));
		assert!(accepts(&nfa, "ab"));
		assert!(accepts(&nfa, "abab"));
		assert!(!accepts(&nfa, "aba"));
	}

	#[test]
	fn plus_requires_one_occurrence() {
		let nfa = CharNfa::symbol('c').plus();
		assert!(!accepts(&nfa, ""));
		assert!(accepts(&nfa, "c"));
		assert!(accepts(&nfa, "ccc"));
	}

	#[test]
	fn repeat_bounded() {
		let nfa = CharNfa::symbol('x').repeat(2, Some(4));
		assert!(!accepts(&nfa, "x"));
		assert!(accepts(&nfa, "xx"));
		assert!(accepts(&nfa, "xxx"));
		assert!(accepts(&nfa, "xxxx"));
		assert!(!accepts(&nfa, "xxxxx"));
	}

	#[test]
	fn repeat_unbounded() {
		let nfa = CharNfa::symbol('x').repeat(2, None);
		assert!(!accepts(&nfa, "x"));
		assert!(accepts(&nfa, "xx"));
		assert!(accepts(&nfa, "xxxxxx"));
	}

	#[test]
	fn repeat_inverted_bounds_is_empty() {
		let nfa = CharNfa::symbol('x').repeat(3, Some(2));
		assert!(!accepts(&nfa, ""));
		assert!(!accepts(&nfa, "xx"));
		assert!(!accepts(&nfa, "xxx"));
	}

	#[test]
	fn epsilon_closure_handles_cycles() {
		let mut nfa = CharNfa::new();
		nfa.add(0, None, 1);
		nfa.add(1, None, 2);
		nfa.add(2, None, 0);
		nfa.add_initial_state(0);

		let closure = nfa.epsilon_closure([&0].into_iter());
		assert_eq!(closure.len(), 3);
	}

	#[test]
	fn range_class_transitions() {
		let mut digits = RangeSet::new();
		digits.insert('0'..='9');
		let nfa: NFA<RangeSet<char>> = NFA::from_class(digits);

		assert!(accepts(&nfa, "5"));
		assert!(!accepts(&nfa, "a"));
		assert!(!accepts(&nfa, "55"));
	}

	#[test]
	fn map_symbols_single_key() {
		let nfa = CharNfa::verbatim("ab".chars());
		let mapped = nfa.map_symbols(&[(vec!['a'], vec!['x', 'y'])]);
		assert!(accepts(&mapped, "xyb"));
		assert!(!accepts(&mapped, "ab"));
	}

	#[test]
	fn map_symbols_longest_key_wins() {
		let nfa = CharNfa::verbatim("abc".chars());
		let mapped = nfa.map_symbols(&[
			(vec!['a'], vec!['1']),
			(vec!['a', 'b'], vec!['2']),
		]);
		assert!(accepts(&mapped, "2c"));
		assert!(!accepts(&mapped, "1bc"));
	}

	#[test]
	fn map_symbols_erasing_key() {
		let nfa = CharNfa::verbatim("ab".chars());
		let mapped = nfa.map_symbols(&[(vec!['b'], vec![])]);
		assert!(accepts(&mapped, "a"));
		assert!(!accepts(&mapped, "ab"));
	}

	#[test]
	fn try_from_parts_rejects_unknown_initial() {
		let mut transitions: BTreeMap<u32, Transitions<Single<char>, u32>> = BTreeMap::new();
		transitions.insert(0, BTreeMap::new());

		let initial: BTreeSet<u32> = [7].into_iter().collect();
		assert_eq!(
			NFA::try_from_parts(transitions, initial, BTreeSet::new()),
			Err(InvalidAutomaton::InitialOutOfRange)
		);
	}
}
