//! Archetype based entity storage.
//!
//! Entities sharing the same set of [components](components::Component) and [tags](components::Tag)
//! are stored together in an [Archetype](archetypes::Archetype), split into fixed-size chunks with
//! one densely packed column per component.

extern crate self as chunk_ecs;

pub mod data_structures;
pub mod components;
pub mod archetypes;
pub mod entities;
mod error;

pub use error::*;
pub use lazy_static::lazy_static;

pub mod prelude {
	pub use crate::components::*;
	pub use crate::create_archetype;
	pub use crate::error::{ArchetypeError, EntityError};
	pub use crate::archetypes::{
		Archetype, ArchetypeChunk, ArchetypeCreationContext, ArchetypeId, ArchetypeStore, ArchetypeTransition,
		ChunkBudget, ChunkStructure, RowRemap, Subchunk, SubchunkMut,
	};
	pub use crate::entities::{Entity, EntityCreationContext, EntityLocation, EntityStore};
}

#[cfg(test)]
mod tests;
