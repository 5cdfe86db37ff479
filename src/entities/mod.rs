//! [Entities](Entity) represent the individual "things" in your game or application.
//!
//! An [Entity] doesn't store any data and has no associated behaviour;
//! instead, it identifies which pieces of data ([Components](crate::components::Component)) belong together.
//! The [EntityStore] keeps track of the archetype, chunk and row each entity's data lives in.

mod creation_context;
mod entity;
mod entity_store;

pub use creation_context::*;
pub use entity::{Entity, EntityLocation};
pub use entity_store::*;

pub(crate) use entity::EntityInstanceVec;
