use std::iter::repeat;

const BITS: usize = 64;

/// A dynamically sized bit-field, used as a component or tag signature.
///
/// Trailing zero words are never kept around, so two [BitFields](BitField)
/// holding the same set bits always compare and hash equal regardless of how
/// they were built.
#[derive(Default, Clone, Debug, Hash, Eq, PartialEq)]
pub struct BitField {
	values: Vec<u64>,
}

impl BitField {
	/// Create a new, empty [BitField].
	pub fn new() -> Self {
		Self::default()
	}

	/// Get the value of the bit at index `i`.
	///
	/// # Arguments
	/// * `i` - The index of the element to retrieve
	#[inline(always)]
	pub fn get(&self, i: usize) -> bool {
		let (position, shift) = Self::pos_shift(i);
		match self.values.get(position) {
			Some(value) => value & (1u64 << shift) != 0,
			None => false,
		}
	}

	/// Set the value of the bit at index `i`.
	///
	/// # Arguments
	/// * `i` - The index of the element to modify
	pub fn set(&mut self, i: usize, value: bool) {
		let (position, shift) = Self::pos_shift(i);
		if value {
			if self.values.len() <= position {
				let count = position + 1 - self.values.len();
				self.values.extend(repeat(0).take(count));
			}
			self.values[position] |= 1u64 << shift;
		} else if let Some(bits) = self.values.get_mut(position) {
			*bits &= !(1u64 << shift);
			self.trim();
		}
	}

	/// Check if every bit set in this [BitField] is also set in `other`.
	/// The empty set is a subset of everything.
	///
	/// # Arguments
	/// * `other` - The bitfield to check against
	pub fn is_subset_of(&self, other: &BitField) -> bool {
		self.values.iter().enumerate().all(|(i, mask)| {
			let bits = other.values.get(i).copied().unwrap_or(0);
			bits & mask == *mask
		})
	}

	/// Check if no bit is set.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Count the set bits.
	pub fn count_ones(&self) -> usize {
		self.values.iter().map(|v| v.count_ones() as usize).sum()
	}

	/// Set all bits to 0.
	pub fn clear(&mut self) {
		self.values.clear();
	}

	/// Iterate over the indices of the set bits in ascending order.
	pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
		self.values.iter().enumerate().flat_map(|(position, value)| {
			(0..BITS).filter(move |shift| value & (1u64 << shift) != 0).map(move |shift| position * BITS + shift)
		})
	}

	fn trim(&mut self) {
		while let Some(0) = self.values.last() {
			self.values.pop();
		}
	}

	#[inline(always)]
	fn pos_shift(i: usize) -> (usize, usize) {
		(i / BITS, i % BITS)
	}
}

impl FromIterator<usize> for BitField {
	fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
		let mut bitfield = BitField::new();
		for i in iter {
			bitfield.set(i, true);
		}
		bitfield
	}
}
