//! Unique runtime identifiers tied to [Component] and [Tag] types.
//!
//! Identifiers are handed out from process-wide counters the first time a type is used,
//! so they are stable for the lifetime of the process but not between program re-runs.
//! Storage only ever deals in these ids, never in concrete types.

use std::sync::atomic::Ordering::Relaxed;
use crate::components::{Component, Tag};
use crate::data_structures::BitField;
use std::sync::atomic::AtomicUsize;
use std::fmt;

static NEXT_COMPONENT_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_TAG_ID: AtomicUsize = AtomicUsize::new(1);

/// A globally unique identifier for a component type.
///
/// Ids are totally ordered; that order is the canonical column order of every
/// [ChunkStructure](crate::archetypes::ChunkStructure).
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct ComponentId {
	value: usize,
}

impl ComponentId {
	/// Get the [ComponentId] of the type `T`.
	#[inline(always)]
	pub fn of<T: Component>() -> ComponentId {
		T::component_id()
	}

	#[inline(always)]
	pub const fn value(&self) -> usize {
		self.value
	}
}

/// A globally unique identifier for a zero-sized [Tag] type.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct TagId {
	value: usize,
}

impl TagId {
	/// Get the [TagId] of the type `T`.
	#[inline(always)]
	pub fn of<T: Tag>() -> TagId {
		T::tag_id()
	}

	#[inline(always)]
	pub const fn value(&self) -> usize {
		self.value
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.value)
	}
}

impl fmt::Display for TagId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "tag#{}", self.value)
	}
}

impl From<&[ComponentId]> for BitField {
	fn from(ids: &[ComponentId]) -> Self {
		ids.iter().map(|id| id.value()).collect()
	}
}

impl From<&[TagId]> for BitField {
	fn from(ids: &[TagId]) -> Self {
		ids.iter().map(|id| id.value()).collect()
	}
}

pub(crate) fn next_component_id() -> ComponentId {
	let value = NEXT_COMPONENT_ID.fetch_add(1, Relaxed);
	debug_assert!(
		value <= u32::MAX as usize,
		"This is an insane number of components. Please seek help."
	);
	ComponentId { value }
}

pub(crate) fn next_tag_id() -> TagId {
	TagId {
		value: NEXT_TAG_ID.fetch_add(1, Relaxed),
	}
}
