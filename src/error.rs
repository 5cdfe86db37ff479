use crate::archetypes::ArchetypeId;
use crate::components::{ComponentId, TagId};
use crate::entities::Entity;
use thiserror::Error;

/// Errors raised by [archetype](crate::archetypes::Archetype) storage and its chunks.
///
/// "Not found" ([EntityNotFound](ArchetypeError::EntityNotFound)) is kept distinct from
/// "found but the component is absent" ([MissingComponent](ArchetypeError::MissingComponent))
/// so callers probing the wrong archetype can branch on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchetypeError {
	#[error("chunk capacity exceeded: {requested} rows requested but only {available} available")]
	ChunkFull { requested: usize, available: usize },

	#[error("cannot remove {requested} rows from a chunk holding {count}")]
	ChunkUnderflow { requested: usize, count: usize },

	#[error("component {0} is not part of this archetype")]
	MissingComponent(ComponentId),

	#[error("tag {0} is not part of this archetype")]
	MissingTag(TagId),

	#[error("component {0} is not registered in the type info table")]
	UnregisteredComponent(ComponentId),

	#[error("component {0} was requested more than once")]
	DuplicateComponent(ComponentId),

	#[error("component {component} occupies {expected} bytes but {actual} were provided")]
	SizeMismatch { component: ComponentId, expected: usize, actual: usize },

	#[error("entity {0} is not stored in this archetype")]
	EntityNotFound(Entity),

	#[error("row {row} is out of bounds for a chunk holding {count} entities")]
	RowOutOfBounds { row: usize, count: usize },

	#[error("row {row} does not hold entity {entity}")]
	RowMismatch { entity: Entity, row: usize },

	#[error("archetype {0} does not exist")]
	UnknownArchetype(ArchetypeId),

	#[error("invalid chunk budget: {chunk_size} bytes for at most {max_entities} entities")]
	InvalidBudget { chunk_size: usize, max_entities: usize },
}

/// Errors raised by the [EntityStore](crate::entities::EntityStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
	#[error("entity {0} has already been destroyed")]
	Stale(Entity),

	#[error(transparent)]
	Archetype(#[from] ArchetypeError),
}
