use crate::archetypes::{
	Archetype, ArchetypeCreationContext, ArchetypeId, ArchetypeStore, ArchetypeTransition, ChunkBudget,
	FetchComponents, IterateArchetype, IterateArchetypeParallel, RowRemap,
};
use crate::entities::{Entity, EntityCreationContext, EntityInstanceVec, EntityLocation};
use crate::components::{Component, Tag};
use crate::error::{ArchetypeError, EntityError};

/// Owns every entity and the single authoritative record of where its data lives.
///
/// Archetypes only ever see `(entity, row)` pairs handed to them by the store;
/// row changes caused by swap-compaction are applied here as soon as they're reported.
pub struct EntityStore {
	instances: EntityInstanceVec,
	archetypes: ArchetypeStore,
}

impl EntityStore {
	pub fn new() -> Self {
		Self::with_budget(ChunkBudget::default())
	}

	pub fn with_budget(budget: ChunkBudget) -> Self {
		Self {
			instances: EntityInstanceVec::default(),
			archetypes: ArchetypeStore::with_budget(budget),
		}
	}

	pub fn archetypes(&self) -> &ArchetypeStore {
		&self.archetypes
	}

	/// See [ArchetypeStore::create_archetype].
	pub fn create_archetype(&mut self, context: &ArchetypeCreationContext) -> Result<ArchetypeId, ArchetypeError> {
		self.archetypes.create_archetype(context)
	}

	/// Create an entity whose archetype is picked from the components and tags in `context`.
	pub fn spawn(&mut self, context: &EntityCreationContext) -> Result<Entity, EntityError> {
		let archetype = self.archetypes.create_archetype(&context.archetype_context())?;
		self.create_entity(archetype, context)
	}

	/// Create an entity in `archetype`, initialising the components provided by `context`.
	/// Components not in `context` are zeroed.
	pub fn create_entity(
		&mut self, archetype: ArchetypeId, context: &EntityCreationContext,
	) -> Result<Entity, EntityError> {
		let target = self.archetypes.get_mut(archetype).ok_or(ArchetypeError::UnknownArchetype(archetype))?;
		target.check_components(context)?;

		let entity = self.instances.allocate();
		let (chunk, row) = target.insert_entity(entity);
		target.set_components(entity, row, context)?;

		self.instances.set_location(entity, EntityLocation { archetype, chunk, row });
		Ok(entity)
	}

	/// Fill `entities` with new zero-initialised entities belonging to `archetype`.
	pub fn create_entities(&mut self, archetype: ArchetypeId, entities: &mut [Entity]) -> Result<(), EntityError> {
		let target = self.archetypes.get_mut(archetype).ok_or(ArchetypeError::UnknownArchetype(archetype))?;
		self.instances.reserve(entities.len());

		for slot in entities.iter_mut() {
			let entity = self.instances.allocate();
			let (chunk, row) = target.insert_entity(entity);
			self.instances.set_location(entity, EntityLocation { archetype, chunk, row });
			*slot = entity;
		}
		Ok(())
	}

	pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EntityError> {
		let location = self.location(entity)?;
		let archetype = self.archetype_mut(location.archetype)?;
		let remap = archetype.destroy_entity(entity, location.row)?;

		self.apply_remap(remap);
		self.instances.release(entity.index);
		Ok(())
	}

	/// Destroy several entities, stopping at the first stale one.
	pub fn destroy_entities(&mut self, entities: &[Entity]) -> Result<(), EntityError> {
		entities.iter().try_for_each(|entity| self.destroy_entity(*entity))
	}

	pub fn is_alive(&self, entity: Entity) -> bool {
		self.instances.is_alive(entity)
	}

	pub fn location(&self, entity: Entity) -> Result<EntityLocation, EntityError> {
		self.instances.location(entity).ok_or(EntityError::Stale(entity))
	}

	/// Number of live entities.
	pub fn len(&self) -> usize {
		self.instances.alive_count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, EntityError> {
		let location = self.location(entity)?;
		let archetype = self
			.archetypes
			.get(location.archetype)
			.ok_or(ArchetypeError::UnknownArchetype(location.archetype))?;
		Ok(archetype.get_entity_component::<T>(entity, location.row)?)
	}

	pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EntityError> {
		let location = self.location(entity)?;
		let archetype = self.archetype_mut(location.archetype)?;
		Ok(archetype.get_entity_component_mut::<T>(entity, location.row)?)
	}

	/// Typed access to several components of one entity; see [Archetype::get_entity_components].
	pub fn get_components<'a, Q>(&'a mut self, entity: Entity) -> Result<Q, EntityError>
	where
		Archetype: FetchComponents<'a, Q>,
	{
		let location = self.location(entity)?;
		let archetype = self.archetype_mut(location.archetype)?;
		Ok(archetype.get_entity_components::<Q>(entity, location.row)?)
	}

	/// Overwrite a component the entity already has.
	pub fn set_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EntityError> {
		let location = self.location(entity)?;
		let archetype = self.archetype_mut(location.archetype)?;
		Ok(archetype.set_component(entity, location.row, value)?)
	}

	/// Attach a component, moving the entity to the matching archetype.
	/// If the entity already has one, its value is overwritten.
	pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EntityError> {
		let location = self.migrate(entity, ArchetypeTransition::AddComponent(T::component_id()))?;
		let archetype = self.archetype_mut(location.archetype)?;
		Ok(archetype.set_component(entity, location.row, value)?)
	}

	pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<(), EntityError> {
		let id = T::component_id();
		if !self.archetype_of(entity)?.has_component_id(id) {
			return Err(ArchetypeError::MissingComponent(id).into());
		}
		self.migrate(entity, ArchetypeTransition::RemoveComponent(id)).map(|_| ())
	}

	pub fn add_tag<T: Tag>(&mut self, entity: Entity) -> Result<(), EntityError> {
		self.migrate(entity, ArchetypeTransition::AddTag(T::tag_id())).map(|_| ())
	}

	pub fn remove_tag<T: Tag>(&mut self, entity: Entity) -> Result<(), EntityError> {
		let id = T::tag_id();
		if !self.archetype_of(entity)?.has_tag_id(id) {
			return Err(ArchetypeError::MissingTag(id).into());
		}
		self.migrate(entity, ArchetypeTransition::RemoveTag(id)).map(|_| ())
	}

	pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool, EntityError> {
		Ok(self.archetype_of(entity)?.has_component::<T>())
	}

	pub fn has_tag<T: Tag>(&self, entity: Entity) -> Result<bool, EntityError> {
		Ok(self.archetype_of(entity)?.has_tag::<T>())
	}

	/// Run `func` on every entity holding the requested components.
	///
	/// References handed to `func` may be kept, but only while the store stays borrowed:
	///
	/// ```compile_fail
	/// use chunk_ecs::prelude::*;
	///
	/// #[derive(Copy, Clone, Component)]
	/// struct Health(u32);
	///
	/// let mut store = EntityStore::new();
	/// let entity = store.spawn(&EntityCreationContext::new().with(Health(7))).unwrap();
	/// let mut seen: Vec<&Health> = Vec::new();
	/// store.for_each::<&Health>(|health| seen.push(health)).unwrap();
	/// store.destroy_entity(entity).unwrap();
	/// assert_eq!(seen[0].0, 7);
	/// ```
	pub fn for_each<'a, Q>(&'a mut self, mut func: impl FnMut(Q)) -> Result<(), EntityError>
	where
		Archetype: IterateArchetype<'a, Q>,
	{
		let ids = <Archetype as IterateArchetype<'a, Q>>::component_ids();
		for archetype in self.archetypes.matching_mut(&ids, &[]) {
			IterateArchetype::for_each_mut(archetype, &mut func)?;
		}
		Ok(())
	}

	/// Like [for_each](EntityStore::for_each), with the chunks of each archetype processed in parallel.
	pub fn par_for_each<'a, Q>(&'a mut self, func: impl Fn(Q) + Send + Sync) -> Result<(), EntityError>
	where
		Archetype: IterateArchetype<'a, Q> + IterateArchetypeParallel<'a, Q>,
	{
		let ids = <Archetype as IterateArchetype<'a, Q>>::component_ids();
		for archetype in self.archetypes.matching_mut(&ids, &[]) {
			IterateArchetypeParallel::par_for_each_mut(archetype, &func)?;
		}
		Ok(())
	}

	/// Move `entity` along `transition`, copying the components both archetypes share.
	/// Returns the entity's new location. On error the entity stays where it was.
	fn migrate(&mut self, entity: Entity, transition: ArchetypeTransition) -> Result<EntityLocation, EntityError> {
		let location = self.location(entity)?;
		let destination = self.archetypes.transition(location.archetype, transition)?;
		if destination == location.archetype {
			return Ok(location);
		}

		let (src, dst) = self
			.archetypes
			.get_pair_mut(location.archetype, destination)
			.ok_or(ArchetypeError::UnknownArchetype(destination))?;

		src.locate(entity, location.row)?;
		let (chunk, row) = dst.insert_entity(entity);
		let moved = Self::copy_shared_components(src, dst, entity, location.row, row)
			.and_then(|()| src.destroy_entity(entity, location.row));
		let remap = match moved {
			Ok(remap) => remap,
			Err(error) => {
				let undo = dst.destroy_entity(entity, row)?;
				self.apply_remap(undo);
				return Err(error.into());
			},
		};
		tracing::trace!(%entity, from = %location.archetype, to = %destination, "migrated entity");

		let new_location = EntityLocation {
			archetype: destination,
			chunk,
			row,
		};
		self.apply_remap(remap);
		self.instances.set_location(entity, new_location);
		Ok(new_location)
	}

	fn copy_shared_components(
		src: &Archetype, dst: &mut Archetype, entity: Entity, src_row: usize, dst_row: usize,
	) -> Result<(), ArchetypeError> {
		for id in src.structure().component_ids() {
			if dst.has_component_id(*id) {
				let bytes = src.get_component_by_type_id(entity, src_row, *id)?;
				dst.set_component_bytes(entity, dst_row, *id, bytes)?;
			}
		}
		Ok(())
	}

	/// Overwrite the recorded location of `entity`, bypassing the archetypes.
	#[cfg(test)]
	pub(crate) fn relocate(&mut self, entity: Entity, location: EntityLocation) {
		self.instances.set_location(entity, location);
	}

	fn apply_remap(&mut self, remap: RowRemap) {
		if let RowRemap::Moved { entity, row } = remap {
			self.instances.set_row(entity, row);
		}
	}

	fn archetype_of(&self, entity: Entity) -> Result<&Archetype, EntityError> {
		let location = self.location(entity)?;
		Ok(self
			.archetypes
			.get(location.archetype)
			.ok_or(ArchetypeError::UnknownArchetype(location.archetype))?)
	}

	fn archetype_mut(&mut self, id: ArchetypeId) -> Result<&mut Archetype, EntityError> {
		Ok(self.archetypes.get_mut(id).ok_or(ArchetypeError::UnknownArchetype(id))?)
	}
}

impl Default for EntityStore {
	fn default() -> Self {
		Self::new()
	}
}
