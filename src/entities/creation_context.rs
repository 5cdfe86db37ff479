use crate::components::{bytes_of, Component, ComponentId, Tag, TagId, TypeInfoTable};
use crate::archetypes::ArchetypeCreationContext;
use crate::error::ArchetypeError;
use std::ops::Range;

/// The initial components and tags of an entity, stored as raw bytes.
///
/// Setting the same component twice keeps the last value.
#[derive(Default, Clone, Debug)]
pub struct EntityCreationContext {
	components: Vec<(ComponentId, Range<usize>)>,
	data: Vec<u8>,
	tags: Vec<TagId>,
}

impl EntityCreationContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with<T: Component>(mut self, value: T) -> Self {
		self.insert(value);
		self
	}

	/// Add a component from its raw bytes, checked against the size registered for `id`.
	pub fn with_bytes(mut self, id: ComponentId, bytes: &[u8]) -> Result<Self, ArchetypeError> {
		self.insert_bytes(id, bytes)?;
		Ok(self)
	}

	pub fn with_tag<T: Tag>(self) -> Self {
		self.with_tag_id(T::tag_id())
	}

	pub fn with_tag_id(mut self, id: TagId) -> Self {
		if !self.tags.contains(&id) {
			self.tags.push(id);
		}
		self
	}

	pub fn insert<T: Component>(&mut self, value: T) {
		self.put(T::component_id(), bytes_of(&value));
	}

	pub fn insert_bytes(&mut self, id: ComponentId, bytes: &[u8]) -> Result<(), ArchetypeError> {
		let expected = TypeInfoTable::component_size(id).ok_or(ArchetypeError::UnregisteredComponent(id))?;
		if expected != bytes.len() {
			return Err(ArchetypeError::SizeMismatch {
				component: id,
				expected,
				actual: bytes.len(),
			});
		}

		self.put(id, bytes);
		Ok(())
	}

	/// Every component as `(id, bytes)`, in insertion order.
	pub fn components(&self) -> impl Iterator<Item = (ComponentId, &[u8])> + '_ {
		self.components.iter().map(|(id, range)| (*id, &self.data[range.clone()]))
	}

	pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
		self.components.iter().map(|(id, _)| *id)
	}

	pub fn tag_ids(&self) -> &[TagId] {
		&self.tags
	}

	pub fn len(&self) -> usize {
		self.components.len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.is_empty() && self.tags.is_empty()
	}

	/// The archetype an entity built from this context belongs to.
	pub fn archetype_context(&self) -> ArchetypeCreationContext {
		let mut context = ArchetypeCreationContext::new();
		for id in self.component_ids() {
			context.add_component_id(id);
		}
		for id in &self.tags {
			context.add_tag_id(*id);
		}
		context
	}

	fn put(&mut self, id: ComponentId, bytes: &[u8]) {
		if let Some((_, range)) = self.components.iter().find(|(c, _)| *c == id) {
			self.data[range.clone()].copy_from_slice(bytes);
			return;
		}

		let start = self.data.len();
		self.data.extend_from_slice(bytes);
		self.components.push((id, start..self.data.len()));
	}
}
