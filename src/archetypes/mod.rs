//! [Archetypes](Archetype) store every entity sharing one set of [components](crate::components::Component)
//! and [tags](crate::components::Tag).
//!
//! An archetype's data is split into fixed-size [chunks](ArchetypeChunk), each holding one column per
//! component, laid out as described by the archetype's [ChunkStructure].
//! [Subchunks](Subchunk) are views over one column of one chunk and are the unit of bulk iteration.

mod archetype;
mod archetype_chunk;
mod archetype_iter;
mod archetype_macros;
mod archetype_registry;
mod chunk_structure;

pub use archetype::*;
pub use archetype_chunk::*;
pub use archetype_iter::*;
pub use archetype_registry::*;
pub use chunk_structure::*;
