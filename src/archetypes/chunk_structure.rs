use crate::components::{Component, ComponentId, ComponentType, Tag, TagId, TypeInfoTable};
use std::collections::{HashMap, HashSet};
use crate::data_structures::BitField;
use std::hash::BuildHasherDefault;
use crate::error::ArchetypeError;
use nohash_hasher::NoHashHasher;

type Hasher = BuildHasherDefault<NoHashHasher<usize>>;

/// Byte budget of one archetype chunk.
pub const ARCHETYPE_CHUNK_SIZE: usize = 128 * 1024;

/// Upper bound on the number of rows in one archetype chunk.
pub const MAX_ENTITIES_IN_CHUNK: usize = 1024;

/// Sizing parameters shared by every chunk of an archetype store.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChunkBudget {
	chunk_size: usize,
	max_entities: usize,
}

impl ChunkBudget {
	/// # Arguments
	/// * `chunk_size` - The byte budget a chunk's rows should fit in
	/// * `max_entities` - The maximum number of rows per chunk
	pub fn new(chunk_size: usize, max_entities: usize) -> Result<Self, ArchetypeError> {
		if chunk_size == 0 || max_entities == 0 {
			return Err(ArchetypeError::InvalidBudget { chunk_size, max_entities });
		}
		Ok(Self { chunk_size, max_entities })
	}

	pub const fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	pub const fn max_entities(&self) -> usize {
		self.max_entities
	}

	/// Number of rows of `row_width` bytes that fit in one chunk.
	/// Rows without data (tag-only archetypes) are only bounded by `max_entities`.
	pub fn entities_per_chunk(&self, row_width: usize) -> usize {
		if row_width == 0 {
			return self.max_entities;
		}
		(self.chunk_size / row_width).clamp(1, self.max_entities)
	}
}

impl Default for ChunkBudget {
	fn default() -> Self {
		Self {
			chunk_size: ARCHETYPE_CHUNK_SIZE,
			max_entities: MAX_ENTITIES_IN_CHUNK,
		}
	}
}

/// The component and tag ids an [archetype](crate::archetypes::Archetype) is built from.
/// Order and repetitions don't matter.
#[derive(Default, Clone, Debug)]
pub struct ArchetypeCreationContext {
	components: Vec<ComponentId>,
	tags: Vec<TagId>,
}

impl ArchetypeCreationContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuild the context an existing structure was created from.
	pub fn from_structure(structure: &ChunkStructure) -> Self {
		Self {
			components: structure.component_ids().to_vec(),
			tags: structure.tag_ids().to_vec(),
		}
	}

	pub fn with_component<T: Component>(self) -> Self {
		self.with_component_id(T::component_id())
	}

	pub fn with_component_id(mut self, id: ComponentId) -> Self {
		self.add_component_id(id);
		self
	}

	pub fn with_tag<T: Tag>(self) -> Self {
		self.with_tag_id(T::tag_id())
	}

	pub fn with_tag_id(mut self, id: TagId) -> Self {
		self.add_tag_id(id);
		self
	}

	pub fn add_component_id(&mut self, id: ComponentId) {
		self.components.push(id);
	}

	pub fn remove_component_id(&mut self, id: ComponentId) {
		self.components.retain(|c| *c != id);
	}

	pub fn add_tag_id(&mut self, id: TagId) {
		self.tags.push(id);
	}

	pub fn remove_tag_id(&mut self, id: TagId) {
		self.tags.retain(|t| *t != id);
	}

	pub fn component_ids(&self) -> &[ComponentId] {
		&self.components
	}

	pub fn tag_ids(&self) -> &[TagId] {
		&self.tags
	}
}

/// Placement of one component column inside a chunk.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ColumnLayout {
	pub component_id: ComponentId,
	/// Size of one instance in bytes.
	pub size: usize,
	pub align: usize,
	/// Byte offset of the column from the start of the chunk.
	pub offset: usize,
	/// Size of the whole column in bytes.
	pub column_size: usize,
}

/// The column layout shared by every chunk of one archetype.
///
/// Columns are ordered by ascending [ComponentId], which makes the layout a pure function
/// of the component and tag *sets*: two archetypes built from the same sets in any order
/// end up with identical offsets and capacity.
#[derive(Debug, Clone)]
pub struct ChunkStructure {
	columns: Vec<ColumnLayout>,
	column_lookup: HashMap<ComponentId, usize, Hasher>,
	component_ids: Vec<ComponentId>,
	tag_ids: Vec<TagId>,
	tag_set: HashSet<TagId, Hasher>,
	num_entities_per_chunk: usize,
	row_width: usize,
	chunk_size: usize,
	chunk_align: usize,
}

impl ChunkStructure {
	/// Build the layout for a set of component and tag ids, resolving component sizes
	/// through the [TypeInfoTable].
	pub fn new(context: &ArchetypeCreationContext, budget: ChunkBudget) -> Result<Self, ArchetypeError> {
		let types = context
			.component_ids()
			.iter()
			.map(|id| TypeInfoTable::component_info(*id).ok_or(ArchetypeError::UnregisteredComponent(*id)))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self::from_types(types, context.tag_ids().to_vec(), budget))
	}

	/// Build the layout from explicit component descriptors.
	pub fn from_types(mut types: Vec<ComponentType>, mut tag_ids: Vec<TagId>, budget: ChunkBudget) -> Self {
		let requested = types.len() + tag_ids.len();
		types.sort_unstable_by_key(|t| t.id());
		types.dedup_by_key(|t| t.id());
		tag_ids.sort_unstable();
		tag_ids.dedup();

		if requested != types.len() + tag_ids.len() {
			tracing::warn!(
				requested,
				distinct = types.len() + tag_ids.len(),
				"duplicate ids collapsed while building chunk structure"
			);
		}

		let row_width = types.iter().map(|t| t.size()).sum();
		let num_entities_per_chunk = budget.entities_per_chunk(row_width);

		let mut offset = 0;
		let mut chunk_align = 1;
		let columns: Vec<_> = types
			.iter()
			.map(|t| {
				offset = align_up(offset, t.align());
				chunk_align = chunk_align.max(t.align());

				let column = ColumnLayout {
					component_id: t.id(),
					size: t.size(),
					align: t.align(),
					offset,
					column_size: num_entities_per_chunk * t.size(),
				};
				offset += column.column_size;
				column
			})
			.collect();

		Self {
			column_lookup: columns.iter().enumerate().map(|(i, c)| (c.component_id, i)).collect(),
			component_ids: columns.iter().map(|c| c.component_id).collect(),
			tag_set: tag_ids.iter().copied().collect(),
			chunk_size: align_up(offset, chunk_align),
			num_entities_per_chunk,
			chunk_align,
			row_width,
			columns,
			tag_ids,
		}
	}

	/// The component ids in canonical column order.
	pub fn component_ids(&self) -> &[ComponentId] {
		&self.component_ids
	}

	/// The tag ids in ascending order.
	pub fn tag_ids(&self) -> &[TagId] {
		&self.tag_ids
	}

	pub fn columns(&self) -> &[ColumnLayout] {
		&self.columns
	}

	pub fn column(&self, id: ComponentId) -> Option<&ColumnLayout> {
		self.column_lookup.get(&id).map(|i| &self.columns[*i])
	}

	/// Iterate over `(component id, instance size)` pairs in ascending id order.
	pub fn size_by_component_id(&self) -> impl Iterator<Item = (ComponentId, usize)> + '_ {
		self.columns.iter().map(|c| (c.component_id, c.size))
	}

	pub fn component_size(&self, id: ComponentId) -> Option<usize> {
		self.column(id).map(|c| c.size)
	}

	/// Size in bytes of the column holding `id` in one chunk.
	pub fn size_of_one_column(&self, id: ComponentId) -> Option<usize> {
		self.column(id).map(|c| c.column_size)
	}

	#[inline(always)]
	pub fn has_component(&self, id: ComponentId) -> bool {
		self.column_lookup.contains_key(&id)
	}

	#[inline(always)]
	pub fn has_tag(&self, id: TagId) -> bool {
		self.tag_set.contains(&id)
	}

	/// True iff every required component and tag is present.
	pub fn check_requirements_match(&self, required_components: &[ComponentId], required_tags: &[TagId]) -> bool {
		required_components.iter().all(|id| self.has_component(*id)) && required_tags.iter().all(|id| self.has_tag(*id))
	}

	pub fn num_entities_per_chunk(&self) -> usize {
		self.num_entities_per_chunk
	}

	/// Sum of the component sizes of one row.
	pub fn row_width(&self) -> usize {
		self.row_width
	}

	/// Size in bytes of one chunk's buffer, column padding included.
	pub fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	pub fn chunk_align(&self) -> usize {
		self.chunk_align
	}

	pub fn component_bitfield(&self) -> BitField {
		BitField::from(self.component_ids.as_slice())
	}

	pub fn tag_bitfield(&self) -> BitField {
		BitField::from(self.tag_ids.as_slice())
	}
}

impl Eq for ChunkStructure {}

impl PartialEq<Self> for ChunkStructure {
	fn eq(&self, other: &Self) -> bool {
		self.columns == other.columns
			&& self.tag_ids == other.tag_ids
			&& self.num_entities_per_chunk == other.num_entities_per_chunk
			&& self.chunk_size == other.chunk_size
			&& self.chunk_align == other.chunk_align
	}
}

#[inline(always)]
fn align_up(offset: usize, align: usize) -> usize {
	(offset + align - 1) & !(align - 1)
}
