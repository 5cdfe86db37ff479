use crate::archetypes::ArchetypeId;
use std::fmt;

/// A unique handle to an entity.
///
/// The index is recycled once the entity is destroyed; the version tells the old handle
/// apart from the new one. Versions start at 1, so `Entity::default()` is never alive.
#[derive(Default, Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Entity {
	pub(crate) index: u32,
	pub(crate) version: u32,
}

impl Entity {
	pub const fn new(index: u32, version: u32) -> Self {
		Self { index, version }
	}

	pub const fn index(&self) -> u32 {
		self.index
	}

	pub const fn version(&self) -> u32 {
		self.version
	}

	/// Pack the handle into a single integer, version in the high half.
	pub const fn to_bits(&self) -> u64 {
		(self.version as u64) << 32 | self.index as u64
	}

	pub const fn from_bits(bits: u64) -> Self {
		Self {
			index: bits as u32,
			version: (bits >> 32) as u32,
		}
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}v{}", self.index, self.version)
	}
}

/// Where the data of an entity lives.
#[derive(Default, Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct EntityLocation {
	pub archetype: ArchetypeId,
	pub chunk: usize,
	pub row: usize,
}

/// Per-index bookkeeping of an [EntityStore](crate::entities::EntityStore), stored as parallel vectors.
#[derive(Default)]
pub(crate) struct EntityInstanceVec {
	pub(crate) locations: Vec<EntityLocation>,
	pub(crate) versions: Vec<u32>,
	free: Vec<u32>,
	retired: usize,
}

impl EntityInstanceVec {
	/// Take a free index, or grow by one, and return the handle for it.
	pub fn allocate(&mut self) -> Entity {
		match self.free.pop() {
			Some(index) => Entity {
				index,
				version: self.versions[index as usize],
			},
			None => {
				let index = self.versions.len() as u32;
				self.locations.push(EntityLocation::default());
				self.versions.push(1);
				Entity { index, version: 1 }
			},
		}
	}

	/// Invalidate every handle to `index` and make it reusable.
	/// An index whose version is exhausted is retired for good instead.
	pub fn release(&mut self, index: u32) {
		let version = &mut self.versions[index as usize];
		match version.checked_add(1) {
			Some(next) => {
				*version = next;
				self.free.push(index);
			},
			None => {
				*version = 0;
				self.retired += 1;
			},
		}
	}

	pub fn reserve(&mut self, count: usize) {
		self.locations.reserve(count);
		self.versions.reserve(count);
	}

	#[inline(always)]
	pub fn is_alive(&self, entity: Entity) -> bool {
		entity.version != 0 && self.versions.get(entity.index as usize) == Some(&entity.version)
	}

	pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
		if self.is_alive(entity) {
			Some(self.locations[entity.index as usize])
		} else {
			None
		}
	}

	pub fn set_location(&mut self, entity: Entity, location: EntityLocation) {
		self.locations[entity.index as usize] = location;
	}

	pub fn set_row(&mut self, entity: Entity, row: usize) {
		self.locations[entity.index as usize].row = row;
	}

	pub fn alive_count(&self) -> usize {
		self.versions.len() - self.free.len() - self.retired
	}
}
