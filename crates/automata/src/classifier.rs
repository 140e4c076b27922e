//! Language partitions: families of pairwise-disjoint automata used as
//! string classifiers.
use crate::class::{ClassAlgebra, SymbolClass};
use crate::dfa::DFA;

/// A list of pairwise-disjoint DFAs interpreted as a partition of the
/// accepted string space.
///
/// Built greedily: each language is reduced by everything already in the
/// partition, so `parts[i]` accepts `L_i ∖ (L_0 ∪ … ∪ L_{i-1})`. Languages
/// left empty by the reduction are dropped. Iteration follows construction
/// order.
#[derive(Debug, Clone)]
pub struct DfaPartition<C> {
	parts: Vec<DFA<C, u32>>,
}

impl<C> Default for DfaPartition<C> {
	fn default() -> Self {
		Self { parts: Vec::new() }
	}
}

impl<C> DfaPartition<C> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.parts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parts.is_empty()
	}

	pub fn parts(&self) -> &[DFA<C, u32>] {
		&self.parts
	}

	pub fn iter(&self) -> std::slice::Iter<DFA<C, u32>> {
		self.parts.iter()
	}
}

impl<C: ClassAlgebra> DfaPartition<C> {
	/// Build a partition from arbitrary, possibly overlapping languages.
	pub fn from_languages<Q: Clone + Ord>(languages: impl IntoIterator<Item = DFA<C, Q>>) -> Self {
		let mut partition = Self::new();
		for language in languages {
			partition.push(&language);
		}
		partition
	}

	/// Add the part of `language` not yet covered by the partition.
	///
	/// Returns `false` when the language was already fully covered and
	/// nothing was added.
	pub fn push<Q: Clone + Ord>(&mut self, language: &DFA<C, Q>) -> bool {
		let mut part = language.minimize();
		for existing in &self.parts {
			part = part.difference(existing).minimize();
		}

		if part.has_reachable_final() {
			self.parts.push(part);
			true
		} else {
			false
		}
	}

	/// Index of the partition element containing `input`.
	pub fn index_of<T: Clone>(&self, input: &[T]) -> Option<usize>
	where
		C: SymbolClass<T>,
	{
		self.parts
			.iter()
			.position(|part| part.contains(input.iter().cloned()))
	}

	/// The partition element containing `input`: the language of every
	/// string classified together with it.
	pub fn siblings<T: Clone>(&self, input: &[T]) -> Option<&DFA<C, u32>>
	where
		C: SymbolClass<T>,
	{
		self.index_of(input).map(|i| &self.parts[i])
	}

	/// Common refinement: the non-empty pairwise intersections of both
	/// partitions, in `self`-major order.
	pub fn conjunction(&self, other: &Self) -> Self {
		let mut parts = Vec::new();

		for a in &self.parts {
			for b in &other.parts {
				let common = a.intersection(b).minimize();
				if common.has_reachable_final() {
					parts.push(common);
				}
			}
		}

		Self { parts }
	}
}

/// A labeled classifier: a [`DfaPartition`] tagging each partition element
/// with a value.
///
/// Lookup yields the value of the class containing the input. Languages
/// fully shadowed by earlier entries are dropped together with their value.
#[derive(Debug, Clone)]
pub struct Classifier<C, V> {
	partition: DfaPartition<C>,
	values: Vec<V>,
}

impl<C, V> Default for Classifier<C, V> {
	fn default() -> Self {
		Self {
			partition: DfaPartition::new(),
			values: Vec::new(),
		}
	}
}

impl<C, V> Classifier<C, V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn partition(&self) -> &DfaPartition<C> {
		&self.partition
	}

	/// The partition elements with their values, in construction order.
	pub fn iter(&self) -> impl Iterator<Item = (&DFA<C, u32>, &V)> {
		self.partition.iter().zip(&self.values)
	}
}

impl<C: ClassAlgebra, V> Classifier<C, V> {
	/// Build a classifier from language/value pairs.
	pub fn from_pairs<Q: Clone + Ord>(
		pairs: impl IntoIterator<Item = (DFA<C, Q>, V)>,
	) -> Self {
		let mut classifier = Self::new();
		for (language, value) in pairs {
			classifier.insert(&language, value);
		}
		classifier
	}

	/// Tag the not-yet-covered part of `language` with `value`.
	///
	/// Returns `false` (dropping `value`) when the language was already
	/// fully covered.
	pub fn insert<Q: Clone + Ord>(&mut self, language: &DFA<C, Q>, value: V) -> bool {
		if self.partition.push(language) {
			self.values.push(value);
			true
		} else {
			false
		}
	}

	/// The value tagged on the class containing `input`.
	pub fn get<T: Clone>(&self, input: &[T]) -> Option<&V>
	where
		C: SymbolClass<T>,
	{
		self.partition.index_of(input).map(|i| &self.values[i])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::class::Single;
	use crate::nfa::NFA;

	type CharDfa = DFA<Single<char>>;

	fn words(list: &[&str]) -> CharDfa {
		let mut nfa = NFA::empty();
		for word in list {
			nfa = nfa.union(NFA::verbatim(word.chars()));
		}
		DFA::from_nfa(&nfa)
	}

	#[test]
	fn partition_disjointifies_overlaps() {
		let partition = DfaPartition::from_languages([
			words(&["a", "b"]),
			words(&["b", "c"]),
		]);

		assert_eq!(partition.len(), 2);
		assert_eq!(partition.index_of(&['a']), Some(0));
		assert_eq!(partition.index_of(&['b']), Some(0));
		assert_eq!(partition.index_of(&['c']), Some(1));
		assert_eq!(partition.index_of(&['d']), None);
	}

	#[test]
	fn fully_covered_language_is_dropped() {
		let mut partition = DfaPartition::new();
		assert!(partition.push(&words(&["a", "b"])));
		assert!(!partition.push(&words(&["a"])));
		assert_eq!(partition.len(), 1);
	}

	#[test]
	fn siblings_is_the_containing_part() {
		let partition = DfaPartition::from_languages([words(&["a", "b"]), words(&["c"])]);
		let part = partition.siblings(&['b']).unwrap();
		assert!(part.contains(['a'].into_iter()));
		assert!(!part.contains(['c'].into_iter()));
	}

	#[test]
	fn conjunction_refines_both() {
		let a = DfaPartition::from_languages([words(&["a", "b"]), words(&["c"])]);
		let b = DfaPartition::from_languages([words(&["b", "c"]), words(&["a"])]);

		let both = a.conjunction(&b);
		assert_eq!(both.len(), 3);
		// every element separates: a, b and c land in distinct classes.
		let ia = both.index_of(&['a']).unwrap();
		let ib = both.index_of(&['b']).unwrap();
		let ic = both.index_of(&['c']).unwrap();
		assert_ne!(ia, ib);
		assert_ne!(ib, ic);
		assert_ne!(ia, ic);
	}

	#[test]
	fn classifier_lookup() {
		let classifier = Classifier::from_pairs([
			(words(&["cat", "dog"]), "animal"),
			(words(&["oak"]), "tree"),
		]);

		let cat: Vec<char> = "cat".chars().collect();
		let oak: Vec<char> = "oak".chars().collect();
		let nope: Vec<char> = "rock".chars().collect();

		assert_eq!(classifier.get(&cat), Some(&"animal"));
		assert_eq!(classifier.get(&oak), Some(&"tree"));
		assert_eq!(classifier.get(&nope), None);
	}
}
