use crate::archetypes::{Archetype, ArchetypeCreationContext, ArchetypeId, ChunkBudget, ChunkStructure};
use crate::components::{ComponentId, TagId};
use crate::data_structures::BitField;
use crate::error::ArchetypeError;
use std::collections::HashMap;
use std::sync::Arc;

/// The component and tag masks identifying an archetype or a query.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
struct Signature {
	components: BitField,
	tags: BitField,
}

impl Signature {
	fn new(components: &[ComponentId], tags: &[TagId]) -> Self {
		Self {
			components: BitField::from(components),
			tags: BitField::from(tags),
		}
	}

	fn is_subset_of(&self, other: &Signature) -> bool {
		self.components.is_subset_of(&other.components) && self.tags.is_subset_of(&other.tags)
	}
}

/// A single structural change to an archetype's signature.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ArchetypeTransition {
	AddComponent(ComponentId),
	RemoveComponent(ComponentId),
	AddTag(TagId),
	RemoveTag(TagId),
}

/// Owns every [Archetype] and guarantees there is exactly one per (component set, tag set).
///
/// The archetype at [ArchetypeId::default()] has no components nor tags and always exists.
pub struct ArchetypeStore {
	budget: ChunkBudget,
	archetypes: Vec<Archetype>,
	map: HashMap<Signature, ArchetypeId>,
	queries: HashMap<Signature, Vec<ArchetypeId>>,
	transitions: HashMap<(ArchetypeId, ArchetypeTransition), ArchetypeId>,
}

impl ArchetypeStore {
	pub fn new() -> Self {
		Self::with_budget(ChunkBudget::default())
	}

	/// Create a store whose archetypes size their chunks after `budget`.
	pub fn with_budget(budget: ChunkBudget) -> Self {
		let empty = ChunkStructure::from_types(Vec::new(), Vec::new(), budget);
		let id = ArchetypeId::default();

		Self {
			budget,
			archetypes: vec![Archetype::from_structure(id, Arc::new(empty))],
			map: HashMap::from([(Signature::default(), id)]),
			queries: HashMap::new(),
			transitions: HashMap::new(),
		}
	}

	pub fn budget(&self) -> ChunkBudget {
		self.budget
	}

	/// Returns the archetype holding exactly the context's components and tags, creating it if needed.
	pub fn create_archetype(&mut self, context: &ArchetypeCreationContext) -> Result<ArchetypeId, ArchetypeError> {
		let signature = Signature::new(context.component_ids(), context.tag_ids());
		if let Some(id) = self.map.get(&signature) {
			return Ok(*id);
		}

		let structure = ChunkStructure::new(context, self.budget)?;
		let id = ArchetypeId {
			index: self.archetypes.len(),
		};

		// Match archetype against all cached queries
		for (query, results) in self.queries.iter_mut() {
			if query.is_subset_of(&signature) {
				results.push(id);
			}
		}

		tracing::debug!(
			archetype = %id,
			components = structure.component_ids().len(),
			tags = structure.tag_ids().len(),
			rows_per_chunk = structure.num_entities_per_chunk(),
			"created archetype"
		);

		self.archetypes.push(Archetype::from_structure(id, Arc::new(structure)));
		self.map.insert(signature, id);
		Ok(id)
	}

	pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
		self.archetypes.get(id.index)
	}

	pub fn get_mut(&mut self, id: ArchetypeId) -> Option<&mut Archetype> {
		self.archetypes.get_mut(id.index)
	}

	/// Mutable access to two distinct archetypes at once.
	pub fn get_pair_mut(&mut self, a: ArchetypeId, b: ArchetypeId) -> Option<(&mut Archetype, &mut Archetype)> {
		if a == b || a.index >= self.archetypes.len() || b.index >= self.archetypes.len() {
			return None;
		}

		if a.index < b.index {
			let (left, right) = self.archetypes.split_at_mut(b.index);
			Some((&mut left[a.index], &mut right[0]))
		} else {
			let (left, right) = self.archetypes.split_at_mut(a.index);
			Some((&mut right[0], &mut left[b.index]))
		}
	}

	pub fn len(&self) -> usize {
		self.archetypes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.archetypes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
		self.archetypes.iter()
	}

	/// Every archetype containing all the required components and tags, in creation order.
	/// Results are cached and kept up to date as archetypes get created.
	pub fn matching(&mut self, required_components: &[ComponentId], required_tags: &[TagId]) -> Vec<ArchetypeId> {
		let query = Signature::new(required_components, required_tags);
		if let Some(results) = self.queries.get(&query) {
			return results.clone();
		}

		let results: Vec<_> = self
			.archetypes
			.iter()
			.filter(|a| a.check_requirements_match(required_components, required_tags))
			.map(|a| a.id())
			.collect();

		self.queries.insert(query, results.clone());
		results
	}

	/// Like [matching](ArchetypeStore::matching), borrowing every match mutably at once.
	pub fn matching_mut(
		&mut self, required_components: &[ComponentId], required_tags: &[TagId],
	) -> impl Iterator<Item = &mut Archetype> {
		// Matches come out in creation order, which is also storage order.
		let mut matches = self.matching(required_components, required_tags).into_iter().peekable();
		self.archetypes.iter_mut().filter(move |archetype| matches.next_if_eq(&archetype.id()).is_some())
	}

	/// The archetype reached from `source` by applying `transition`.
	/// Adding something already present, or removing something absent, leads back to `source`.
	pub fn transition(
		&mut self, source: ArchetypeId, transition: ArchetypeTransition,
	) -> Result<ArchetypeId, ArchetypeError> {
		if let Some(destination) = self.transitions.get(&(source, transition)) {
			return Ok(*destination);
		}

		let src = self.get(source).ok_or(ArchetypeError::UnknownArchetype(source))?;
		let mut context = ArchetypeCreationContext::from_structure(src.structure());
		match transition {
			ArchetypeTransition::AddComponent(id) if !src.has_component_id(id) => context.add_component_id(id),
			ArchetypeTransition::RemoveComponent(id) if src.has_component_id(id) => context.remove_component_id(id),
			ArchetypeTransition::AddTag(id) if !src.has_tag_id(id) => context.add_tag_id(id),
			ArchetypeTransition::RemoveTag(id) if src.has_tag_id(id) => context.remove_tag_id(id),
			_ => return Ok(source),
		}

		let destination = self.create_archetype(&context)?;
		self.transitions.insert((source, transition), destination);
		Ok(destination)
	}
}

impl Default for ArchetypeStore {
	fn default() -> Self {
		Self::new()
	}
}
