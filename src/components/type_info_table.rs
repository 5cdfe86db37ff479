use crate::components::component_id::{next_component_id, next_tag_id};
use crate::components::{Component, ComponentId, ComponentType, Tag, TagId};
use std::mem::{align_of, size_of};
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::any::type_name;

type Hasher = BuildHasherDefault<NoHashHasher<usize>>;

lazy_static! {
	static ref COMPONENTS: RwLock<HashMap<ComponentId, ComponentType, Hasher>> = RwLock::new(HashMap::default());
	static ref TAGS: RwLock<HashMap<TagId, &'static str, Hasher>> = RwLock::new(HashMap::default());
}

/// Process-wide registry mapping component and tag ids to their layout.
///
/// `#[derive(Component)]` and `#[derive(Tag)]` register types lazily the first time their
/// id is requested. Components that only exist at runtime (a serializer or a script host)
/// can be registered with [register_raw](TypeInfoTable::register_raw).
pub struct TypeInfoTable;

impl TypeInfoTable {
	/// Allocate a new [ComponentId] for `T` and record its layout.
	/// **Should only be called once per type**, which the derive macros guarantee.
	pub fn register<T: 'static>() -> ComponentId {
		Self::register_raw(type_name::<T>(), size_of::<T>(), align_of::<T>())
	}

	/// Allocate a new [ComponentId] for a component described only by its layout.
	///
	/// # Arguments
	/// * `name` - A human readable name, used in diagnostics
	/// * `size` - The size in bytes of one instance
	/// * `align` - The alignment of one instance, must be a power of two
	pub fn register_raw(name: &'static str, size: usize, align: usize) -> ComponentId {
		assert!(align.is_power_of_two(), "Component {name} has an invalid alignment of {align}");

		let id = next_component_id();
		COMPONENTS.write().insert(id, ComponentType::new(id, name, size, align));
		tracing::trace!(component = %id, name, size, align, "registered component");
		id
	}

	/// Allocate a new [TagId].
	pub fn register_tag(name: &'static str) -> TagId {
		let id = next_tag_id();
		TAGS.write().insert(id, name);
		tracing::trace!(tag = %id, name, "registered tag");
		id
	}

	#[inline(always)]
	pub fn component_id<T: Component>() -> ComponentId {
		T::component_id()
	}

	#[inline(always)]
	pub fn tag_id<T: Tag>() -> TagId {
		T::tag_id()
	}

	/// Look up the layout registered for a component id.
	pub fn component_info(id: ComponentId) -> Option<ComponentType> {
		COMPONENTS.read().get(&id).copied()
	}

	/// Look up the size in bytes of one instance of a component.
	pub fn component_size(id: ComponentId) -> Option<usize> {
		COMPONENTS.read().get(&id).map(|t| t.size())
	}

	pub fn tag_name(id: TagId) -> Option<&'static str> {
		TAGS.read().get(&id).copied()
	}
}
