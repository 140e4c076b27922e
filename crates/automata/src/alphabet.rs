//! Alphabet partitions.
//!
//! An [`Alphabet`] is an ordered collection of pairwise-disjoint non-empty
//! symbol classes. It is the unit of alphabet compression: automata over a
//! partitioned alphabet key their transitions by class instead of by symbol.
use crate::class::{ClassAlgebra, Single, SymbolClass};
use btree_range_map::RangeSet;
use std::collections::BTreeSet;

/// Partition whose classes each hold a single symbol.
pub type SymbolAlphabet<T> = Alphabet<Single<T>>;

/// Partition whose classes are finite symbol sets.
pub type SetAlphabet<T> = Alphabet<BTreeSet<T>>;

/// Partition whose classes are unions of closed symbol ranges.
pub type ClosedRangeAlphabet<T> = Alphabet<RangeSet<T>>;

/// A partition of (a subset of) the symbol universe into disjoint classes.
///
/// Classes are kept sorted. Inserting a class that overlaps existing ones
/// refines the partition: every existing class is split at the boundaries of
/// the inserted class, so disjointness is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet<C> {
	classes: Vec<C>,
}

impl<C> Default for Alphabet<C> {
	fn default() -> Self {
		Self {
			classes: Vec::new(),
		}
	}
}

impl<C> Alphabet<C> {
	/// Create a new alphabet with no classes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of classes in the partition.
	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Returns the classes in ascending order.
	pub fn classes(&self) -> &[C] {
		&self.classes
	}

	pub fn iter(&self) -> std::slice::Iter<C> {
		self.classes.iter()
	}
}

impl<C: ClassAlgebra> Alphabet<C> {
	/// Build an alphabet by inserting every class of `iter`.
	pub fn from_classes(iter: impl IntoIterator<Item = C>) -> Self {
		let mut alphabet = Self::new();
		for class in iter {
			alphabet.insert(class);
		}
		alphabet
	}

	/// Insert a class, refining the partition.
	///
	/// Existing classes split into their part inside and their part outside
	/// the inserted class; the part of the inserted class covered by no
	/// existing class becomes a class of its own. Inserting an empty class is
	/// a no-op.
	pub fn insert(&mut self, class: C) {
		if class.is_void() {
			return;
		}

		let mut rest = Some(class);
		let mut classes = Vec::with_capacity(self.classes.len() + 2);

		for existing in self.classes.drain(..) {
			let common = match &rest {
				Some(r) => existing.meet(r),
				None => None,
			};

			match common {
				None => classes.push(existing),
				Some(common) => {
					if let Some(outside) = existing.without(&common) {
						classes.push(outside);
					}

					rest = rest.and_then(|r| r.without(&common));
					classes.push(common);
				}
			}
		}

		if let Some(rest) = rest {
			classes.push(rest);
		}

		classes.sort();
		self.classes = classes;
	}

	/// Common refinement of two partitions.
	///
	/// The result is the coarsest partition refining both `self` and `other`;
	/// it covers the union of both universes.
	pub fn conjunction(&self, other: &Self) -> Self {
		let mut result = self.clone();
		for class in &other.classes {
			result.insert(class.clone());
		}
		result
	}
}

impl<C: ClassAlgebra> Alphabet<C> {
	/// Checks if `symbol` is covered by the partition.
	pub fn contains<T>(&self, symbol: &T) -> bool
	where
		C: SymbolClass<T>,
	{
		self.classes.iter().any(|c| c.contains_symbol(symbol))
	}

	/// The canonical representative of the class containing `symbol`.
	pub fn partition_label<T>(&self, symbol: &T) -> Option<T>
	where
		C: SymbolClass<T>,
	{
		self.classes
			.iter()
			.find(|c| c.contains_symbol(symbol))
			.map(C::label)
	}

	/// Checks if `a` and `b` belong to the same class.
	pub fn is_equivalent<T>(&self, a: &T, b: &T) -> bool
	where
		C: SymbolClass<T>,
	{
		self.classes
			.iter()
			.any(|c| c.contains_symbol(a) && c.contains_symbol(b))
	}
}

impl<'a, C> IntoIterator for &'a Alphabet<C> {
	type Item = &'a C;
	type IntoIter = std::slice::Iter<'a, C>;

	fn into_iter(self) -> Self::IntoIter {
		self.classes.iter()
	}
}

impl<C: ClassAlgebra> FromIterator<C> for Alphabet<C> {
	fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
		Self::from_classes(iter)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ranges(list: &[&[(u32, u32)]]) -> ClosedRangeAlphabet<u32> {
		list.iter()
			.map(|class| {
				let mut set = RangeSet::new();
				for (a, b) in class.iter() {
					set.insert(*a..=*b);
				}
				set
			})
			.collect()
	}

	fn range(a: u32, b: u32) -> RangeSet<u32> {
		let mut set = RangeSet::new();
		set.insert(a..=b);
		set
	}

	#[test]
	fn insert_refines_at_boundaries() {
		let mut alphabet = ranges(&[&[(0, 9)]]);
		alphabet.insert(range(0, 0));
		alphabet.insert(range(0, 1));
		assert_eq!(alphabet, ranges(&[&[(0, 0)], &[(1, 1)], &[(2, 9)]]));
	}

	#[test]
	fn insert_empty_is_noop() {
		let mut alphabet = ranges(&[&[(0, 9)]]);
		alphabet.insert(RangeSet::new());
		assert_eq!(alphabet, ranges(&[&[(0, 9)]]));
	}

	#[test]
	fn insert_saturated_range() {
		// each insert splits the full-universe class itself; the second
		// split sits at the top of the symbol universe and must not
		// overflow.
		let mut alphabet = ranges(&[&[(0, u32::MAX)]]);

		alphabet.insert(range(0, 0));
		assert_eq!(alphabet, ranges(&[&[(0, 0)], &[(1, u32::MAX)]]));

		alphabet.insert(range(u32::MAX, u32::MAX));
		assert_eq!(
			alphabet,
			ranges(&[
				&[(0, 0)],
				&[(1, u32::MAX - 1)],
				&[(u32::MAX, u32::MAX)]
			])
		);
	}

	#[test]
	fn conjunction_common_refinement() {
		let a = ranges(&[&[(10, 13)], &[(20, 23)]]);
		let b = ranges(&[&[(10, 21)], &[(12, 23)]]);
		assert_eq!(
			a.conjunction(&b),
			ranges(&[
				&[(10, 11)],
				&[(12, 13)],
				&[(14, 19)],
				&[(20, 21)],
				&[(22, 23)]
			])
		);
	}

	#[test]
	fn partition_label_is_class_representative() {
		let alphabet = ranges(&[&[(10, 13)], &[(20, 23)]]);
		assert_eq!(alphabet.partition_label(&12), Some(10));
		assert_eq!(alphabet.partition_label(&23), Some(20));
		assert_eq!(alphabet.partition_label(&14), None);
	}

	#[test]
	fn equivalence_within_class() {
		let alphabet = ranges(&[&[(10, 13)], &[(20, 23)]]);
		assert!(alphabet.is_equivalent(&10, &13));
		assert!(!alphabet.is_equivalent(&13, &20));
	}

	#[test]
	fn symbol_alphabet_classes_are_singletons() {
		let alphabet: SymbolAlphabet<char> =
			['a', 'b', 'c'].into_iter().map(Single).collect();
		assert_eq!(alphabet.len(), 3);
		assert_eq!(alphabet.partition_label(&'b'), Some('b'));
	}
}
