use crate::components::{ComponentId, TagId, TypeInfoTable};
use std::hash::{Hash, Hasher};
use std::mem::{align_of, size_of};
use std::any::type_name;

/// A runtime representation of a component's layout.
#[derive(Copy, Clone, Debug)]
pub struct ComponentType {
	id: ComponentId,
	name: &'static str,
	size: usize,
	align: usize,
}

impl ComponentType {
	pub(crate) const fn new(id: ComponentId, name: &'static str, size: usize, align: usize) -> Self {
		Self { id, name, size, align }
	}

	/// Returns the [ComponentType] of T.
	pub fn of<T: Component>() -> Self {
		Self::new(T::component_id(), type_name::<T>(), size_of::<T>(), align_of::<T>())
	}

	/// Returns the [ComponentType] registered under `id`, if any.
	pub fn from_id(id: ComponentId) -> Option<Self> {
		TypeInfoTable::component_info(id)
	}

	pub const fn id(&self) -> ComponentId {
		self.id
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}

	pub const fn size(&self) -> usize {
		self.size
	}

	pub const fn align(&self) -> usize {
		self.align
	}
}

impl Eq for ComponentType {}

impl PartialEq<Self> for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Hash for ComponentType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state)
	}
}

/// Plain data that can live in an archetype chunk.
///
/// Components are copied around as raw bytes (on insertion, swap-compaction and migration
/// between archetypes), hence the [Copy] bound. Use #\[derive([Component])] to implement it.
pub trait Component: 'static + Copy + Send + Sync {
	fn component_id() -> ComponentId;
}

/// A zero-sized marker contributing to an archetype's identity but not to its storage.
/// Use #\[derive([Tag])] to implement it.
pub trait Tag: 'static {
	fn tag_id() -> TagId;
}

/// It provides a unified way to access a component's id and type through its base type and all derived ref types.
/// Implemented by #\[derive([Component])] for the base type.
pub trait ComponentTypeInfo {
	type ComponentType: Component;
	fn component_id() -> ComponentId;
}

/// Conversion from a raw column pointer into the value handed to iteration callbacks.
/// Implemented for `&'a T` and `&'a mut T`, where `'a` is the borrow of the storage the pointer comes from.
pub trait ComponentFrom<'a, T> {
	/// # Safety
	/// `value` must point to an initialized component inside a chunk that outlives `'a`,
	/// and the caller must guarantee no other reference to it is alive while a `&mut` exists.
	unsafe fn convert(value: T) -> Self;
}

impl<T: ComponentTypeInfo> ComponentTypeInfo for &T {
	type ComponentType = T::ComponentType;
	fn component_id() -> ComponentId {
		T::component_id()
	}
}

impl<T: ComponentTypeInfo> ComponentTypeInfo for &mut T {
	type ComponentType = T::ComponentType;
	fn component_id() -> ComponentId {
		T::component_id()
	}
}

impl<'a, T: Component> ComponentFrom<'a, *mut T> for &'a T {
	#[inline(always)]
	unsafe fn convert(value: *mut T) -> Self {
		&*value
	}
}

impl<'a, T: Component> ComponentFrom<'a, *mut T> for &'a mut T {
	#[inline(always)]
	unsafe fn convert(value: *mut T) -> Self {
		&mut *value
	}
}

/// View a component instance as its raw bytes.
pub(crate) fn bytes_of<T: Component>(value: &T) -> &[u8] {
	// SAFETY: `T` is plain `Copy` data and the slice covers exactly one instance.
	unsafe { std::slice::from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}
