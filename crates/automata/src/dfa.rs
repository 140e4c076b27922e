use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::ops::RangeInclusive;

use btree_range_map::RangeSet;
use range_traits::{Measure, PartialEnum};

use crate::alphabet::Alphabet;
use crate::class::{ClassAlgebra, SymbolClass};
use crate::nfa::NFA;
use crate::{Automaton, InvalidAutomaton};

/// Deterministic state transitions.
///
/// Every state maps each of its (pairwise-disjoint) transition classes to a
/// single target state. A missing class denotes a transition to an implicit
/// rejecting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetTransitions<C, Q>(BTreeMap<Q, BTreeMap<C, Q>>);

impl<C, Q> Default for DetTransitions<C, Q> {
	fn default() -> Self {
		Self(BTreeMap::new())
	}
}

impl<C, Q> From<BTreeMap<Q, BTreeMap<C, Q>>> for DetTransitions<C, Q> {
	fn from(map: BTreeMap<Q, BTreeMap<C, Q>>) -> Self {
		Self(map)
	}
}

impl<C, Q> DetTransitions<C, Q> {
	pub fn iter(&self) -> std::collections::btree_map::Iter<Q, BTreeMap<C, Q>> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<C, Q: Ord> DetTransitions<C, Q> {
	pub fn get(&self, q: &Q) -> Option<&BTreeMap<C, Q>> {
		self.0.get(q)
	}
}

/// Deterministic finite automaton over the class type `C`.
///
/// The transition function may be partial: a symbol matched by no class of
/// the current state rejects the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA<C, Q = u32> {
	initial_state: Q,
	final_states: BTreeSet<Q>,
	transitions: DetTransitions<C, Q>,
}

impl<C, Q> DFA<C, Q> {
	pub fn from_parts(
		initial_state: Q,
		final_states: BTreeSet<Q>,
		transitions: DetTransitions<C, Q>,
	) -> Self {
		Self {
			initial_state,
			final_states,
			transitions,
		}
	}

	pub fn initial_state(&self) -> &Q {
		&self.initial_state
	}

	pub fn final_states(&self) -> &BTreeSet<Q> {
		&self.final_states
	}

	pub fn transitions(&self) -> &DetTransitions<C, Q> {
		&self.transitions
	}
}

impl<C: ClassAlgebra, Q: Clone + Ord> DFA<C, Q> {
	/// Assemble an automaton from raw parts, checking its structure.
	pub fn try_from_parts(
		initial_state: Q,
		final_states: BTreeSet<Q>,
		transitions: DetTransitions<C, Q>,
	) -> Result<Self, InvalidAutomaton> {
		let mut states: BTreeSet<&Q> = transitions.0.keys().collect();
		for row in transitions.0.values() {
			states.extend(row.values());
		}

		if !states.contains(&initial_state) {
			return Err(InvalidAutomaton::InitialOutOfRange);
		}

		if !final_states.iter().all(|q| states.contains(q)) {
			return Err(InvalidAutomaton::FinalOutOfRange);
		}

		for row in transitions.0.values() {
			let classes: Vec<&C> = row.keys().collect();
			for (i, a) in classes.iter().enumerate() {
				if a.is_void() {
					return Err(InvalidAutomaton::EmptyClass);
				}

				for b in &classes[i + 1..] {
					if a.meet(b).is_some() {
						return Err(InvalidAutomaton::OverlappingClasses);
					}
				}
			}
		}

		Ok(Self::from_parts(initial_state, final_states, transitions))
	}

	/// Checks if the given state is a final state.
	pub fn is_final_state(&self, q: &Q) -> bool {
		self.final_states.contains(q)
	}

	/// Every state of the automaton.
	pub fn states(&self) -> BTreeSet<&Q> {
		let mut states: BTreeSet<&Q> = self.transitions.0.keys().collect();
		for row in self.transitions.0.values() {
			states.extend(row.values());
		}
		states.insert(&self.initial_state);
		states.extend(&self.final_states);
		states
	}

	/// Number of states.
	pub fn state_count(&self) -> usize {
		self.states().len()
	}

	/// The outgoing transitions of `q`, in class order.
	pub fn successors(&self, q: &Q) -> impl Iterator<Item = (&C, &Q)> {
		self.transitions
			.get(q)
			.into_iter()
			.flat_map(|row| row.iter())
	}

	/// The state reached from `q` by reading `symbol`, if any.
	pub fn next_state<T>(&self, q: &Q, symbol: &T) -> Option<&Q>
	where
		C: SymbolClass<T>,
	{
		self.transitions
			.get(q)?
			.iter()
			.find(|(class, _)| class.contains_symbol(symbol))
			.map(|(_, target)| target)
	}

	/// Checks if the automaton accepts the given input.
	pub fn contains<T>(&self, input: impl IntoIterator<Item = T>) -> bool
	where
		C: SymbolClass<T>,
	{
		let mut q = &self.initial_state;

		for symbol in input {
			match self.next_state(q, &symbol) {
				Some(r) => q = r,
				None => return false,
			}
		}

		self.final_states.contains(q)
	}

	/// Greedy prefix match: splits `input` into the longest accepted prefix
	/// and the remainder.
	///
	/// Returns `None` when no prefix (not even the empty one) is accepted.
	pub fn match_prefix<'i, T>(&self, input: &'i [T]) -> Option<(&'i [T], &'i [T])>
	where
		C: SymbolClass<T>,
	{
		let mut q = &self.initial_state;
		let mut best = self.final_states.contains(q).then_some(0);
		let mut len = 0;

		for symbol in input {
			match self.next_state(q, symbol) {
				Some(r) => {
					q = r;
					len += 1;
					if self.final_states.contains(q) {
						best = Some(len);
					}
				}
				None => break,
			}
		}

		best.map(|n| input.split_at(n))
	}

	/// The partition of the symbol universe induced by the transition labels.
	pub fn alphabet(&self) -> Alphabet<C> {
		let mut alphabet = Alphabet::new();
		for row in self.transitions.0.values() {
			for class in row.keys() {
				alphabet.insert(class.clone());
			}
		}
		alphabet
	}

	/// States reachable from the initial state.
	fn reachable_states(&self) -> BTreeSet<&Q> {
		let mut visited = BTreeSet::new();
		let mut stack = vec![&self.initial_state];

		while let Some(q) = stack.pop() {
			if visited.insert(q) {
				for (_, target) in self.successors(q) {
					stack.push(target);
				}
			}
		}

		visited
	}

	/// Checks if some final state is reachable from the initial state, i.e.
	/// if the language is non-empty.
	pub fn has_reachable_final(&self) -> bool {
		self.reachable_states()
			.into_iter()
			.any(|q| self.final_states.contains(q))
	}

	/// Converts the automaton into an equivalent NFA.
	pub fn to_nfa(&self) -> NFA<C, Q> {
		let mut nfa = NFA::new();

		for (q, row) in self.transitions.iter() {
			nfa.add_state(q.clone());
			for (class, target) in row {
				nfa.add(q.clone(), Some(class.clone()), target.clone());
			}
		}

		nfa.add_state(self.initial_state.clone());
		nfa.add_initial_state(self.initial_state.clone());

		for q in &self.final_states {
			nfa.add_state(q.clone());
			nfa.add_final_state(q.clone());
		}

		nfa
	}

	/// The NFA accepting the mirror image of the language.
	pub fn reverse(&self) -> NFA<C, Q> {
		let mut nfa = NFA::new();

		for (q, row) in self.transitions.iter() {
			nfa.add_state(q.clone());
			for (class, target) in row {
				nfa.add(target.clone(), Some(class.clone()), q.clone());
			}
		}

		nfa.add_state(self.initial_state.clone());
		nfa.add_final_state(self.initial_state.clone());

		for q in &self.final_states {
			nfa.add_state(q.clone());
			nfa.add_initial_state(q.clone());
		}

		nfa
	}

	/// Product construction.
	///
	/// The result runs `self` and `other` in lockstep over the conjunction of
	/// their alphabets; `rule` decides finality from the two component
	/// finality flags. A component that has fallen off its transition table
	/// keeps running as a non-final sink, so non-intersection products are
	/// computed correctly over partial tables.
	pub fn product<Qb: Clone + Ord + std::hash::Hash>(
		&self,
		other: &DFA<C, Qb>,
		rule: impl Fn(bool, bool) -> bool,
	) -> DFA<C, u32>
	where
		Q: std::hash::Hash,
	{
		type Pair<'a, 'b, Q, Qb> = (Option<&'a Q>, Option<&'b Qb>);

		fn intern<'a, 'b, Q: Ord + std::hash::Hash, Qb: Ord + std::hash::Hash>(
			pair: Pair<'a, 'b, Q, Qb>,
			ids: &mut HashMap<Pair<'a, 'b, Q, Qb>, u32>,
			stack: &mut Vec<(u32, Pair<'a, 'b, Q, Qb>)>,
			n: &mut u32,
		) -> u32 {
			match ids.get(&pair) {
				Some(id) => *id,
				None => {
					let id = *n;
					*n += 1;
					ids.insert(pair, id);
					stack.push((id, pair));
					id
				}
			}
		}

		let mut ids: HashMap<Pair<Q, Qb>, u32> = HashMap::new();
		let mut stack: Vec<(u32, Pair<Q, Qb>)> = Vec::new();
		let mut n = 0u32;

		let initial = intern(
			(Some(&self.initial_state), Some(&other.initial_state)),
			&mut ids,
			&mut stack,
			&mut n,
		);

		let mut transitions: BTreeMap<u32, BTreeMap<C, u32>> = BTreeMap::new();
		let mut final_states = BTreeSet::new();

		while let Some((id, (qa, qb))) = stack.pop() {
			let fa = qa.map(|q| self.final_states.contains(q)).unwrap_or(false);
			let fb = qb.map(|q| other.final_states.contains(q)).unwrap_or(false);
			if rule(fa, fb) {
				final_states.insert(id);
			}

			let a_row: Vec<(&C, &Q)> = qa.map(|q| self.successors(q).collect()).unwrap_or_default();
			let b_row: Vec<(&C, &Qb)> =
				qb.map(|q| other.successors(q).collect()).unwrap_or_default();

			let mut row = BTreeMap::new();

			for (ca, ta) in &a_row {
				let mut residual = Some((*ca).clone());

				for (cb, tb) in &b_row {
					if let Some(common) = ca.meet(cb) {
						residual = residual.and_then(|r| r.without(&common));
						let target = intern((Some(*ta), Some(*tb)), &mut ids, &mut stack, &mut n);
						row.insert(common, target);
					}
				}

				if let Some(rest) = residual {
					let target = intern((Some(*ta), None), &mut ids, &mut stack, &mut n);
					row.insert(rest, target);
				}
			}

			for (cb, tb) in &b_row {
				let mut residual = Some((*cb).clone());

				for (ca, _) in &a_row {
					if let Some(common) = cb.meet(ca) {
						residual = residual.and_then(|r| r.without(&common));
					}
				}

				if let Some(rest) = residual {
					let target = intern((None, Some(*tb)), &mut ids, &mut stack, &mut n);
					row.insert(rest, target);
				}
			}

			transitions.insert(id, row);
		}

		DFA::from_parts(initial, final_states, DetTransitions::from(transitions))
	}

	/// Accepts the strings of `self` or `other`.
	pub fn union<Qb: Clone + Ord + Hash>(&self, other: &DFA<C, Qb>) -> DFA<C, u32>
	where
		Q: Hash,
	{
		self.product(other, |a, b| a || b)
	}

	/// Accepts the strings of both `self` and `other`.
	pub fn intersection<Qb: Clone + Ord + Hash>(&self, other: &DFA<C, Qb>) -> DFA<C, u32>
	where
		Q: Hash,
	{
		self.product(other, |a, b| a && b)
	}

	/// Accepts the strings of `self` that `other` rejects.
	pub fn difference<Qb: Clone + Ord + Hash>(&self, other: &DFA<C, Qb>) -> DFA<C, u32>
	where
		Q: Hash,
	{
		self.product(other, |a, b| a && !b)
	}

	/// Accepts the strings of exactly one of `self` and `other`.
	pub fn symmetric_difference<Qb: Clone + Ord + Hash>(&self, other: &DFA<C, Qb>) -> DFA<C, u32>
	where
		Q: Hash,
	{
		self.product(other, |a, b| a != b)
	}

	/// Checks if both automata accept the same language.
	pub fn is_equivalent<Qb: Clone + Ord + Hash>(&self, other: &DFA<C, Qb>) -> bool
	where
		Q: Hash,
	{
		!self.symmetric_difference(other).has_reachable_final()
	}

	/// The automaton accepting every input equivalent to `input`: every
	/// string driving the automaton to the same final state.
	///
	/// Returns `None` when `input` is not accepted.
	pub fn equivalent_inputs<T>(&self, input: impl IntoIterator<Item = T>) -> Option<Self>
	where
		C: SymbolClass<T>,
	{
		let mut q = &self.initial_state;

		for symbol in input {
			q = self.next_state(q, &symbol)?;
		}

		if !self.final_states.contains(q) {
			return None;
		}

		let mut final_states = BTreeSet::new();
		final_states.insert(q.clone());

		Some(Self::from_parts(
			self.initial_state.clone(),
			final_states,
			self.transitions.clone(),
		))
	}

	/// The states reachable from `from` by reading any string accepted by
	/// `pattern`.
	pub fn next_states<'a, Qb: Clone + Ord>(
		&'a self,
		from: &'a Q,
		pattern: &DFA<C, Qb>,
	) -> BTreeSet<&'a Q> {
		let mut result = BTreeSet::new();
		let mut visited = BTreeSet::new();
		let mut stack = vec![(from, &pattern.initial_state)];

		while let Some((q, p)) = stack.pop() {
			if visited.insert((q, p)) {
				if pattern.final_states.contains(p) {
					result.insert(q);
				}

				for (cq, tq) in self.successors(q) {
					for (cp, tp) in pattern.successors(p) {
						if cq.meet(cp).is_some() {
							stack.push((tq, tp));
						}
					}
				}
			}
		}

		result
	}

	/// Groups the transition classes by observational equivalence: two
	/// classes land in the same group when every state transitions
	/// identically under both.
	pub fn natural_partition(&self) -> Vec<Vec<C>> {
		let alphabet = self.alphabet();
		let states: Vec<&Q> = self.states().into_iter().collect();

		let mut groups: Vec<(Vec<Option<&Q>>, Vec<C>)> = Vec::new();

		for atom in alphabet.classes() {
			let signature: Vec<Option<&Q>> = states
				.iter()
				.map(|&q| self.atom_target(q, atom))
				.collect();

			match groups.iter_mut().find(|(s, _)| *s == signature) {
				Some((_, classes)) => classes.push(atom.clone()),
				None => groups.push((signature, vec![atom.clone()])),
			}
		}

		groups.into_iter().map(|(_, classes)| classes).collect()
	}

	/// The target of `q` under an atom known to refine the state's classes.
	fn atom_target(&self, q: &Q, atom: &C) -> Option<&Q> {
		self.transitions
			.get(q)?
			.iter()
			.find(|(class, _)| class.meet(atom).is_some())
			.map(|(_, target)| target)
	}

	/// Minimal equivalent automaton.
	///
	/// Unreachable and dead states are removed, then observationally
	/// equivalent states are merged by partition refinement. The result is
	/// numbered in traversal order from the initial state.
	pub fn minimize(&self) -> DFA<C, u32> {
		self.minimize_with(&[])
	}

	/// Like [`Self::minimize`], but starts from a caller-supplied partition:
	/// states listed in different groups are never merged, even when
	/// observationally equivalent. States absent from every group share one
	/// implicit group.
	pub fn minimize_with(&self, groups: &[BTreeSet<Q>]) -> DFA<C, u32> {
		// trim to states that are both reachable and alive.
		let reachable = self.reachable_states();

		let mut predecessors: BTreeMap<&Q, BTreeSet<&Q>> = BTreeMap::new();
		for &q in &reachable {
			for (_, target) in self.successors(q) {
				if reachable.contains(target) {
					predecessors.entry(target).or_default().insert(q);
				}
			}
		}

		let mut live: BTreeSet<&Q> = BTreeSet::new();
		let mut stack: Vec<&Q> = self
			.final_states
			.iter()
			.filter(|q| reachable.contains(q))
			.collect();

		while let Some(q) = stack.pop() {
			if live.insert(q) {
				if let Some(preds) = predecessors.get(q) {
					stack.extend(preds);
				}
			}
		}

		if !live.contains(&self.initial_state) {
			// empty language.
			let mut transitions = BTreeMap::new();
			transitions.insert(0, BTreeMap::new());
			return DFA::from_parts(0, BTreeSet::new(), DetTransitions::from(transitions));
		}

		let states: Vec<&Q> = live.iter().copied().collect();
		let index: BTreeMap<&Q, usize> = states.iter().enumerate().map(|(i, q)| (*q, i)).collect();

		// refine over the atoms of the whole transition alphabet so that
		// states keying their tables differently stay comparable.
		let mut alphabet = Alphabet::new();
		for &q in &states {
			for (class, target) in self.successors(q) {
				if live.contains(target) {
					alphabet.insert(class.clone());
				}
			}
		}
		let atoms = alphabet.classes();

		// initial partition: finality refined by the caller's groups.
		let mut block: Vec<usize> = Vec::with_capacity(states.len());
		{
			let mut keys: Vec<(bool, Option<usize>)> = Vec::new();
			for &q in &states {
				let key = (
					self.final_states.contains(q),
					groups.iter().position(|g| g.contains(q)),
				);
				let id = match keys.iter().position(|k| *k == key) {
					Some(id) => id,
					None => {
						keys.push(key);
						keys.len() - 1
					}
				};
				block.push(id);
			}
		}

		// Moore refinement until stable.
		loop {
			let mut signatures: Vec<(usize, Vec<Option<usize>>)> = Vec::with_capacity(states.len());
			for &q in &states {
				let row: Vec<Option<usize>> = atoms
					.iter()
					.map(|atom| {
						self.atom_target(q, atom)
							.filter(|t| live.contains(t))
							.map(|t| block[index[t]])
					})
					.collect();
				signatures.push((block[index[q]], row));
			}

			let mut keys: Vec<&(usize, Vec<Option<usize>>)> = Vec::new();
			let mut next: Vec<usize> = Vec::with_capacity(states.len());
			for signature in &signatures {
				let id = match keys.iter().position(|k| *k == signature) {
					Some(id) => id,
					None => {
						keys.push(signature);
						keys.len() - 1
					}
				};
				next.push(id);
			}

			let stable = keys.len() == block.iter().collect::<BTreeSet<_>>().len();
			block = next;
			if stable {
				break;
			}
		}

		// rebuild, numbering blocks in traversal order from the initial one.
		let mut numbering: BTreeMap<usize, u32> = BTreeMap::new();
		let mut stack = vec![block[index[&self.initial_state]]];
		numbering.insert(block[index[&self.initial_state]], 0);
		let mut n = 1u32;

		let mut transitions: BTreeMap<u32, BTreeMap<C, u32>> = BTreeMap::new();
		let mut final_states = BTreeSet::new();

		while let Some(b) = stack.pop() {
			let id = numbering[&b];
			if transitions.contains_key(&id) {
				continue;
			}

			// any member state works as representative: equivalent states
			// agree on target blocks.
			let representative = states[block.iter().position(|x| *x == b).unwrap()];
			if self.final_states.contains(representative) {
				final_states.insert(id);
			}

			let mut row = BTreeMap::new();
			for (class, target) in self.successors(representative) {
				if live.contains(target) {
					let tb = block[index[target]];
					let tid = *numbering.entry(tb).or_insert_with(|| {
						let id = n;
						n += 1;
						stack.push(tb);
						id
					});
					row.insert(class.clone(), tid);
				}
			}

			transitions.insert(id, row);
		}

		DFA::from_parts(0, final_states, DetTransitions::from(transitions))
	}

	/// Lazy iterator over the accepted strings, in depth-first order by
	/// transition index (classes in ascending order). Each transition
	/// contributes the canonical representative of its class; use
	/// [`Self::paths`] to observe whole classes.
	///
	/// The iterator is infinite when the language is infinite. Dead cyclic
	/// states can stall it between two items; minimize first when the
	/// automaton is untrimmed.
	pub fn strings<T>(&self) -> Strings<C, Q, T>
	where
		C: SymbolClass<T>,
	{
		Strings {
			dfa: self,
			stack: Vec::new(),
			path: Vec::new(),
			started: false,
		}
	}

	/// Lazy iterator over the accepted transition paths. `filter` prunes the
	/// search: a path (prefix) it rejects is neither yielded nor extended.
	/// Pruning revisited states makes the enumeration finite on any
	/// automaton.
	pub fn paths<'a, F>(&'a self, filter: F) -> Paths<'a, C, Q, F>
	where
		F: FnMut(&[Segment<'a, C, Q>]) -> bool,
	{
		Paths {
			dfa: self,
			stack: Vec::new(),
			path: Vec::new(),
			filter,
			started: false,
		}
	}
}

impl<C: ClassAlgebra> DFA<C, u32> {
	/// The automaton accepting no string at all.
	pub fn empty() -> Self {
		let mut transitions = BTreeMap::new();
		transitions.insert(0, BTreeMap::new());
		Self::from_parts(0, BTreeSet::new(), DetTransitions::from(transitions))
	}

	/// The automaton accepting exactly the empty string.
	pub fn epsilon() -> Self {
		let mut transitions = BTreeMap::new();
		transitions.insert(0, BTreeMap::new());
		let mut final_states = BTreeSet::new();
		final_states.insert(0);
		Self::from_parts(0, final_states, DetTransitions::from(transitions))
	}

	/// The automaton accepting exactly the one-symbol strings of `class`.
	pub fn from_class(class: C) -> Self {
		if class.is_void() {
			return Self::empty();
		}

		let mut transitions = BTreeMap::new();
		let mut row = BTreeMap::new();
		row.insert(class, 1);
		transitions.insert(0, row);
		transitions.insert(1, BTreeMap::new());

		let mut final_states = BTreeSet::new();
		final_states.insert(1);
		Self::from_parts(0, final_states, DetTransitions::from(transitions))
	}

	/// The automaton accepting exactly the one-symbol string `symbol`.
	pub fn symbol<T>(symbol: T) -> Self
	where
		C: SymbolClass<T>,
	{
		Self::from_class(C::from_symbol(symbol))
	}

	/// The automaton accepting exactly the given symbol sequence.
	pub fn verbatim<T>(symbols: impl IntoIterator<Item = T>) -> Self
	where
		C: SymbolClass<T>,
	{
		let mut transitions: BTreeMap<u32, BTreeMap<C, u32>> = BTreeMap::new();
		let mut q = 0u32;

		for symbol in symbols {
			let mut row = BTreeMap::new();
			row.insert(C::from_symbol(symbol), q + 1);
			transitions.insert(q, row);
			q += 1;
		}

		transitions.insert(q, BTreeMap::new());

		let mut final_states = BTreeSet::new();
		final_states.insert(q);
		Self::from_parts(0, final_states, DetTransitions::from(transitions))
	}

	/// Determinizes `nfa` using the subset construction, numbering the state
	/// sets in discovery order.
	pub fn from_nfa<Q: Clone + Ord + Hash>(nfa: &NFA<C, Q>) -> Self {
		let mut map = HashMap::new();
		let mut n = 0u32;

		nfa.determinize(|q| {
			*map.entry(q.clone()).or_insert_with(|| {
				let i = n;
				n += 1;
				i
			})
		})
	}

	/// Accepts a string of `self` followed by a string of `other`.
	///
	/// NFA-mediated; the result is not minimized.
	pub fn concat(&self, other: &Self) -> Self {
		Self::from_nfa(&self.to_nfa().concat(other.to_nfa()))
	}

	/// Kleene star. NFA-mediated; the result is not minimized.
	pub fn star(&self) -> Self {
		Self::from_nfa(&self.to_nfa().star())
	}

	/// One or more repetitions. NFA-mediated; the result is not minimized.
	pub fn plus(&self) -> Self {
		Self::from_nfa(&self.to_nfa().plus())
	}

	/// Zero or one occurrence. NFA-mediated; the result is not minimized.
	pub fn optional(&self) -> Self {
		Self::from_nfa(&self.to_nfa().optional())
	}

	/// Between `min` and `max` repetitions, unbounded above when `max` is
	/// `None`. NFA-mediated; the result is not minimized.
	pub fn repeat(&self, min: u32, max: Option<u32>) -> Self {
		Self::from_nfa(&self.to_nfa().repeat(min, max))
	}
}

impl<T: Clone + Ord + Measure + PartialEnum> DFA<RangeSet<T>, u32> {
	/// The automaton accepting exactly the one-symbol strings of the closed
	/// range `range`.
	pub fn range(range: RangeInclusive<T>) -> Self {
		let mut class = RangeSet::new();
		class.insert(range);
		Self::from_class(class)
	}
}

/// One transition step along a path of a [`DFA`].
#[derive(Debug)]
pub struct Segment<'a, C, Q> {
	/// State the transition leaves.
	pub source: &'a Q,
	/// Index of the transition in the class order of `source`.
	pub index: usize,
	/// Class labeling the transition.
	pub class: &'a C,
	/// State the transition enters.
	pub target: &'a Q,
}

impl<'a, C, Q> Clone for Segment<'a, C, Q> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<'a, C, Q> Copy for Segment<'a, C, Q> {}

struct Frame<'a, C, Q> {
	state: &'a Q,
	edges: Vec<(&'a C, &'a Q)>,
	next: usize,
}

impl<'a, C: ClassAlgebra, Q: Clone + Ord> Frame<'a, C, Q> {
	fn new(dfa: &'a DFA<C, Q>, state: &'a Q) -> Self {
		Self {
			state,
			edges: dfa.successors(state).collect(),
			next: 0,
		}
	}
}

/// Iterator over the strings accepted by a [`DFA`].
pub struct Strings<'a, C, Q, T> {
	dfa: &'a DFA<C, Q>,
	stack: Vec<Frame<'a, C, Q>>,
	path: Vec<T>,
	started: bool,
}

impl<'a, C, Q, T> Iterator for Strings<'a, C, Q, T>
where
	C: SymbolClass<T>,
	Q: Clone + Ord,
	T: Clone,
{
	type Item = Vec<T>;

	fn next(&mut self) -> Option<Self::Item> {
		if !self.started {
			self.started = true;
			let initial = self.dfa.initial_state();
			self.stack.push(Frame::new(self.dfa, initial));
			if self.dfa.is_final_state(initial) {
				return Some(Vec::new());
			}
		}

		loop {
			let frame = self.stack.last_mut()?;

			if frame.next < frame.edges.len() {
				let (class, target) = frame.edges[frame.next];
				frame.next += 1;
				self.path.push(class.label());
				self.stack.push(Frame::new(self.dfa, target));

				if self.dfa.is_final_state(target) {
					return Some(self.path.clone());
				}
			} else {
				self.stack.pop();
				self.path.pop();
			}
		}
	}
}

/// Iterator over the accepted transition paths of a [`DFA`].
pub struct Paths<'a, C, Q, F> {
	dfa: &'a DFA<C, Q>,
	stack: Vec<Frame<'a, C, Q>>,
	path: Vec<Segment<'a, C, Q>>,
	filter: F,
	started: bool,
}

impl<'a, C, Q, F> Iterator for Paths<'a, C, Q, F>
where
	C: ClassAlgebra,
	Q: Clone + Ord,
	F: FnMut(&[Segment<'a, C, Q>]) -> bool,
{
	type Item = Vec<Segment<'a, C, Q>>;

	fn next(&mut self) -> Option<Self::Item> {
		if !self.started {
			self.started = true;
			let initial = self.dfa.initial_state();
			self.stack.push(Frame::new(self.dfa, initial));
			if self.dfa.is_final_state(initial) {
				return Some(Vec::new());
			}
		}

		loop {
			let frame = self.stack.last_mut()?;

			if frame.next < frame.edges.len() {
				let index = frame.next;
				let (class, target) = frame.edges[index];
				let source = frame.state;
				frame.next += 1;

				self.path.push(Segment {
					source,
					index,
					class,
					target,
				});

				if !(self.filter)(&self.path) {
					self.path.pop();
					continue;
				}

				self.stack.push(Frame::new(self.dfa, target));

				if self.dfa.is_final_state(target) {
					return Some(self.path.clone());
				}
			} else {
				self.stack.pop();
				self.path.pop();
			}
		}
	}
}

impl<T, C: SymbolClass<T>, Q: Clone + Ord> Automaton<T> for DFA<C, Q> {
	type State<'a> = &'a Q where Self: 'a;

	fn initial_state(&self) -> Option<Self::State<'_>> {
		Some(&self.initial_state)
	}

	fn next_state<'a>(
		&'a self,
		current_state: Self::State<'a>,
		token: T,
	) -> Option<Self::State<'_>> {
		DFA::next_state(self, current_state, &token)
	}

	fn is_final_state<'a>(&'a self, state: &Self::State<'a>) -> bool {
		self.final_states.contains(*state)
	}
}
