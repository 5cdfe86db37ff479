use crate::archetypes::{
	ArchetypeChunk, ArchetypeCreationContext, ChunkBudget, ChunkStructure, FetchComponents, IterateArchetype,
	IterateArchetypeParallel, Subchunk, SubchunkMut,
};
use crate::components::{Component, ComponentId, ComponentSet, Tag, TagId};
use std::collections::{BTreeSet, HashMap};
use crate::entities::{Entity, EntityCreationContext};
use crate::error::ArchetypeError;
use std::sync::Arc;
use std::fmt;

/// Handle to an [Archetype] inside an [ArchetypeStore](crate::archetypes::ArchetypeStore).
/// The default handle refers to the archetype without components or tags.
#[derive(Default, Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ArchetypeId {
	pub(crate) index: usize,
}

impl ArchetypeId {
	pub const fn index(&self) -> usize {
		self.index
	}
}

impl fmt::Display for ArchetypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "archetype#{}", self.index)
	}
}

/// What swap-compaction did to the rest of the chunk after a removal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RowRemap {
	/// The removed row was the chunk's last one; no other entity moved.
	NoSwap,
	/// `entity` was moved from the chunk's last row into `row`.
	Moved { entity: Entity, row: usize },
}

/// Storage for every entity sharing one set of components and tags.
///
/// Entities live in fixed-size [chunks](ArchetypeChunk) sharing one [ChunkStructure].
/// The archetype knows which chunk holds each entity, while the row inside that chunk is
/// handed back to the caller by [add_entity](Archetype::add_entity) and must be passed back in.
/// Rows stay dense: removal moves the chunk's last row into the hole and reports it as a [RowRemap].
///
/// Empty chunks are recycled: new entities go to the lowest-index chunk with free rows,
/// and at most one empty chunk is kept at the end of the chunk list.
pub struct Archetype {
	id: ArchetypeId,
	structure: Arc<ChunkStructure>,
	chunks: Vec<ArchetypeChunk>,
	entity_to_chunk: HashMap<Entity, usize>,
	free_chunks: BTreeSet<usize>,
	entity_count: usize,
}

impl Archetype {
	/// Create a standalone archetype with the default [ChunkBudget].
	pub fn new(context: &ArchetypeCreationContext) -> Result<Self, ArchetypeError> {
		Self::with_budget(context, ChunkBudget::default())
	}

	pub fn with_budget(context: &ArchetypeCreationContext, budget: ChunkBudget) -> Result<Self, ArchetypeError> {
		let structure = ChunkStructure::new(context, budget)?;
		Ok(Self::from_structure(ArchetypeId::default(), Arc::new(structure)))
	}

	pub(crate) fn from_structure(id: ArchetypeId, structure: Arc<ChunkStructure>) -> Self {
		Self {
			id,
			structure,
			chunks: Vec::new(),
			entity_to_chunk: HashMap::new(),
			free_chunks: BTreeSet::new(),
			entity_count: 0,
		}
	}

	pub fn id(&self) -> ArchetypeId {
		self.id
	}

	pub fn structure(&self) -> &ChunkStructure {
		&self.structure
	}

	/// Add a row for `entity` and return its index inside the entity's chunk.
	/// The new row's component bytes are zeroed until written.
	///
	/// # Panics
	/// If `entity` is already stored in this archetype.
	pub fn add_entity(&mut self, entity: Entity) -> usize {
		self.insert_entity(entity).1
	}

	/// Same as [add_entity](Archetype::add_entity), but returns `(chunk, row)`.
	pub fn insert_entity(&mut self, entity: Entity) -> (usize, usize) {
		assert!(
			!self.entity_to_chunk.contains_key(&entity),
			"Entity {entity} is already stored in {}",
			self.id
		);

		let chunk_index = match self.free_chunks.first() {
			Some(index) => *index,
			None => self.allocate_chunk(),
		};

		let chunk = &mut self.chunks[chunk_index];
		let row = match chunk.add_instance() {
			Ok(row) => row,
			Err(err) => panic!("Chunk {chunk_index} of {} was listed as free: {err}", self.id),
		};

		chunk.set_owner(row, entity);
		if chunk.is_full() {
			self.free_chunks.remove(&chunk_index);
		}

		self.entity_to_chunk.insert(entity, chunk_index);
		self.entity_count += 1;
		(chunk_index, row)
	}

	/// Remove the row of `entity`, moving the chunk's last row into its place.
	/// On error nothing is modified.
	pub fn destroy_entity(&mut self, entity: Entity, row: usize) -> Result<RowRemap, ArchetypeError> {
		let chunk_index = self.locate(entity, row)?;
		let chunk = &mut self.chunks[chunk_index];

		let last = chunk.len() - 1;
		let remap = if row == last {
			RowRemap::NoSwap
		} else {
			let moved = chunk.entity_at(last).ok_or(ArchetypeError::RowOutOfBounds {
				row: last,
				count: chunk.len(),
			})?;
			chunk.copy_row(last, row)?;
			tracing::trace!(archetype = %self.id, %moved, from = last, to = row, "row moved by swap-remove");
			RowRemap::Moved { entity: moved, row }
		};

		chunk.remove_instance()?;
		let now_empty = chunk.is_empty();

		self.entity_to_chunk.remove(&entity);
		self.free_chunks.insert(chunk_index);
		self.entity_count -= 1;

		if now_empty {
			self.reclaim_empty_chunks();
		}
		Ok(remap)
	}

	/// Release every empty chunk at the end of the chunk list.
	pub fn shrink_to_fit(&mut self) {
		while self.chunks.last().map_or(false, |c| c.is_empty()) {
			self.pop_chunk();
		}
		self.chunks.shrink_to_fit();
	}

	/// Typed access to one component of an entity.
	pub fn get_entity_component<T: Component>(&self, entity: Entity, row: usize) -> Result<&T, ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.chunks[chunk].get::<T>(row)
	}

	pub fn get_entity_component_mut<T: Component>(
		&mut self, entity: Entity, row: usize,
	) -> Result<&mut T, ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.chunks[chunk].get_mut::<T>(row)
	}

	/// Typed access to several components of an entity at once.
	/// `Q` is a tuple of `&T` / `&mut T`, or a single one of them; repeated types are rejected.
	///
	/// The references borrow the archetype, so they can't outlive it:
	///
	/// ```compile_fail
	/// use chunk_ecs::prelude::*;
	///
	/// #[derive(Copy, Clone, Component)]
	/// struct Health(u32);
	///
	/// let mut archetype = Archetype::new(&ArchetypeCreationContext::new().with_component::<Health>()).unwrap();
	/// let entity = Entity::new(0, 1);
	/// let row = archetype.add_entity(entity);
	/// let health: &'static Health = archetype.get_entity_components::<&Health>(entity, row).unwrap();
	/// drop(archetype);
	/// assert_eq!(health.0, 0);
	/// ```
	pub fn get_entity_components<'a, Q>(&'a mut self, entity: Entity, row: usize) -> Result<Q, ArchetypeError>
	where
		Self: FetchComponents<'a, Q>,
	{
		FetchComponents::fetch_components(self, entity, row)
	}

	pub fn set_component<T: Component>(&mut self, entity: Entity, row: usize, value: T) -> Result<(), ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.chunks[chunk].write(row, value)
	}

	/// Copy the raw bytes of one component into an entity's row.
	pub fn set_component_bytes(
		&mut self, entity: Entity, row: usize, id: ComponentId, bytes: &[u8],
	) -> Result<(), ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.chunks[chunk].set_component(row, id, bytes)
	}

	/// Copy every component of `context` into an entity's row.
	/// The whole context is validated first, so a failure leaves the row untouched.
	pub fn set_components(
		&mut self, entity: Entity, row: usize, context: &EntityCreationContext,
	) -> Result<(), ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.check_components(context)?;

		let chunk = &mut self.chunks[chunk];
		for (id, bytes) in context.components() {
			chunk.set_component(row, id, bytes)?;
		}
		Ok(())
	}

	/// Check that every component of `context` is part of this archetype with a matching size.
	pub fn check_components(&self, context: &EntityCreationContext) -> Result<(), ArchetypeError> {
		for (id, bytes) in context.components() {
			let expected = self.structure.component_size(id).ok_or(ArchetypeError::MissingComponent(id))?;
			if expected != bytes.len() {
				return Err(ArchetypeError::SizeMismatch {
					component: id,
					expected,
					actual: bytes.len(),
				});
			}
		}
		Ok(())
	}

	/// The bytes of one component of an entity, looked up by runtime id.
	pub fn get_component_by_type_id(&self, entity: Entity, row: usize, id: ComponentId) -> Result<&[u8], ArchetypeError> {
		let chunk = self.locate(entity, row)?;
		self.chunks[chunk].get_entity_component(row, id)
	}

	/// Copy the bytes of one component of an entity into `out`, which must be exactly as large.
	pub fn copy_component_by_type_id(
		&self, entity: Entity, row: usize, id: ComponentId, out: &mut [u8],
	) -> Result<(), ArchetypeError> {
		let bytes = self.get_component_by_type_id(entity, row, id)?;
		if bytes.len() != out.len() {
			return Err(ArchetypeError::SizeMismatch {
				component: id,
				expected: bytes.len(),
				actual: out.len(),
			});
		}

		out.copy_from_slice(bytes);
		Ok(())
	}

	/// One view per requested component per chunk, indexed `[chunk][component]`.
	pub fn get_subchunks<Q: ComponentSet>(&self) -> Result<Vec<Vec<Subchunk<'_>>>, ArchetypeError> {
		self.get_subchunks_by_ids(Q::info().ids())
	}

	pub fn get_subchunks_by_ids(&self, ids: &[ComponentId]) -> Result<Vec<Vec<Subchunk<'_>>>, ArchetypeError> {
		self.check_components_present(ids)?;

		self.chunks
			.iter()
			.map(|chunk| ids.iter().map(|id| chunk.get_subchunk(*id)).collect::<Result<Vec<_>, _>>())
			.collect()
	}

	/// Mutable counterpart of [get_subchunks_by_ids](Archetype::get_subchunks_by_ids); ids must be distinct.
	pub fn get_subchunks_mut_by_ids(
		&mut self, ids: &[ComponentId],
	) -> Result<Vec<Vec<SubchunkMut<'_>>>, ArchetypeError> {
		self.validate_query(ids)?;
		self.chunks.iter_mut().map(|chunk| chunk.get_subchunks_mut(ids)).collect()
	}

	/// One view per chunk over the column of `T`.
	pub fn get_subchunks_of_one_type<T: Component>(&self) -> Result<Vec<Subchunk<'_>>, ArchetypeError> {
		let id = T::component_id();
		self.check_components_present(&[id])?;
		self.chunks.iter().map(|chunk| chunk.get_subchunk(id)).collect()
	}

	/// Run `func` on every entity, chunk by chunk.
	pub fn for_each<'a, Q>(&'a mut self, mut func: impl FnMut(Q)) -> Result<(), ArchetypeError>
	where
		Self: IterateArchetype<'a, Q>,
	{
		IterateArchetype::for_each_mut(self, &mut func)
	}

	/// Run `func` on every entity, with chunks processed in parallel.
	pub fn par_for_each<'a, Q>(&'a mut self, func: impl Fn(Q) + Send + Sync) -> Result<(), ArchetypeError>
	where
		Self: IterateArchetypeParallel<'a, Q>,
	{
		IterateArchetypeParallel::par_for_each_mut(self, &func)
	}

	pub fn check_requirements_match(&self, required_components: &[ComponentId], required_tags: &[TagId]) -> bool {
		self.structure.check_requirements_match(required_components, required_tags)
	}

	#[inline(always)]
	pub fn has_component<T: Component>(&self) -> bool {
		self.structure.has_component(T::component_id())
	}

	#[inline(always)]
	pub fn has_component_id(&self, id: ComponentId) -> bool {
		self.structure.has_component(id)
	}

	#[inline(always)]
	pub fn has_tag<T: Tag>(&self) -> bool {
		self.structure.has_tag(T::tag_id())
	}

	#[inline(always)]
	pub fn has_tag_id(&self, id: TagId) -> bool {
		self.structure.has_tag(id)
	}

	/// Row capacity of one chunk.
	pub fn get_chunk_size(&self) -> usize {
		self.structure.num_entities_per_chunk()
	}

	pub fn get_chunks_count(&self) -> usize {
		self.chunks.len()
	}

	/// Number of live rows in a chunk.
	pub fn get_entities_count_per_chunk(&self, chunk: usize) -> Option<usize> {
		self.chunks.get(chunk).map(|c| c.len())
	}

	pub fn entity_count(&self) -> usize {
		self.entity_count
	}

	pub fn is_empty(&self) -> bool {
		self.entity_count == 0
	}

	/// Every entity in (chunk, row) order.
	pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
		self.chunks.iter().flat_map(|chunk| (0..chunk.len()).filter_map(move |row| chunk.entity_at(row)))
	}

	/// The index of the chunk holding `entity`.
	pub fn chunk_of(&self, entity: Entity) -> Option<usize> {
		self.entity_to_chunk.get(&entity).copied()
	}

	pub fn chunks(&self) -> &[ArchetypeChunk] {
		&self.chunks
	}

	pub fn chunk(&self, index: usize) -> Option<&ArchetypeChunk> {
		self.chunks.get(index)
	}

	pub(crate) fn chunks_mut(&mut self) -> &mut [ArchetypeChunk] {
		&mut self.chunks
	}

	/// Check that every id is present and none is repeated.
	pub(crate) fn validate_query(&self, ids: &[ComponentId]) -> Result<(), ArchetypeError> {
		for (i, id) in ids.iter().enumerate() {
			if ids[..i].contains(id) {
				return Err(ArchetypeError::DuplicateComponent(*id));
			}
		}
		self.check_components_present(ids)
	}

	/// Resolve the chunk of `entity` and check that `row` holds it.
	pub(crate) fn locate(&self, entity: Entity, row: usize) -> Result<usize, ArchetypeError> {
		let chunk = self.chunk_of(entity).ok_or(ArchetypeError::EntityNotFound(entity))?;
		if self.chunks[chunk].entity_at(row) != Some(entity) {
			return Err(ArchetypeError::RowMismatch { entity, row });
		}
		Ok(chunk)
	}

	fn check_components_present(&self, ids: &[ComponentId]) -> Result<(), ArchetypeError> {
		match ids.iter().find(|id| !self.structure.has_component(**id)) {
			Some(id) => Err(ArchetypeError::MissingComponent(*id)),
			None => Ok(()),
		}
	}

	fn allocate_chunk(&mut self) -> usize {
		let index = self.chunks.len();
		self.chunks.push(ArchetypeChunk::new(self.structure.clone()));
		self.free_chunks.insert(index);

		tracing::debug!(
			archetype = %self.id,
			chunk = index,
			bytes = self.structure.chunk_size(),
			rows = self.structure.num_entities_per_chunk(),
			"allocated chunk"
		);
		index
	}

	/// Keep at most one empty chunk at the end of the list.
	/// Empty chunks before a live one stay, since dropping them would shift chunk indices.
	fn reclaim_empty_chunks(&mut self) {
		while let [.., before_last, last] = self.chunks.as_slice() {
			if !(before_last.is_empty() && last.is_empty()) {
				break;
			}
			self.pop_chunk();
		}
	}

	fn pop_chunk(&mut self) {
		if self.chunks.pop().is_some() {
			let index = self.chunks.len();
			self.free_chunks.remove(&index);
			tracing::debug!(archetype = %self.id, chunk = index, "released empty chunk");
		}
	}
}
