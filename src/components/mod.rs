//! Component and tag identity.
//!
//! Every [Component] and [Tag] type is assigned a numeric id the first time it is used,
//! and the [TypeInfoTable] records the layout (size and alignment) behind each component id.
//! Archetype storage works exclusively on those ids and raw bytes.

pub mod component_id;
mod component_set;
mod component_type;
mod type_info_table;

pub use component_id::{ComponentId, TagId};
pub use component_set::*;
pub use component_type::*;
pub use type_info_table::*;

pub(crate) use component_type::bytes_of;
pub use chunk_ecs_derive::{Component, Tag};
