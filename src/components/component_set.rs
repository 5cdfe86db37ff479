use crate::components::{ComponentId, ComponentTypeInfo};
use crate::data_structures::BitField;
use std::collections::HashMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;

lazy_static! {
	static ref EMPTY_SET: Arc<ComponentSetInfo> = Arc::new(ComponentSetInfo::new(Vec::new()));
	static ref TYPE_TO_SET: RwLock<HashMap<TypeId, Arc<ComponentSetInfo>>> = RwLock::new(HashMap::default());
}

/// The ids described by a [ComponentSet], computed once per tuple type.
#[derive(Debug)]
pub struct ComponentSetInfo {
	ids: Vec<ComponentId>,
	sorted: Vec<ComponentId>,
	bitfield: BitField,
	has_repeats: bool,
}

impl ComponentSetInfo {
	fn new(ids: Vec<ComponentId>) -> Self {
		let mut sorted = ids.clone();
		sorted.sort_unstable();
		sorted.dedup();

		Self {
			has_repeats: sorted.len() != ids.len(),
			bitfield: BitField::from(sorted.as_slice()),
			sorted,
			ids,
		}
	}

	/// The ids in declaration order.
	pub fn ids(&self) -> &[ComponentId] {
		&self.ids
	}

	/// The distinct ids in canonical (ascending) order.
	pub fn sorted_ids(&self) -> &[ComponentId] {
		&self.sorted
	}

	pub fn bitfield(&self) -> &BitField {
		&self.bitfield
	}

	/// Whether a type appears more than once in the set.
	pub fn has_repeats(&self) -> bool {
		self.has_repeats
	}
}

/// A tuple of component types (`T`, `&T` or `&mut T`) requested together,
/// e.g. by [get_subchunks](crate::archetypes::Archetype::get_subchunks).
pub trait ComponentSet {
	fn info() -> Arc<ComponentSetInfo>;
}

impl ComponentSet for () {
	fn info() -> Arc<ComponentSetInfo> {
		EMPTY_SET.clone()
	}
}

macro_rules! impl_component_set {
    ($($t: ident),*) => {
        impl <$($t: ComponentTypeInfo),*> ComponentSet for ($($t),*,) {
            fn info() -> Arc<ComponentSetInfo> {
                // &T and &mut T share the cache entry of their base type
                let key = TypeId::of::<($(<$t as ComponentTypeInfo>::ComponentType),*,)>();
                if let Some(info) = TYPE_TO_SET.read().get(&key) {
                    return info.clone();
                }

                let info = Arc::new(ComponentSetInfo::new(vec![$(<$t>::component_id()),*]));
                TYPE_TO_SET.write().entry(key).or_insert(info).clone()
            }
        }
    };
}

impl_component_set!(T0);
impl_component_set!(T0, T1);
impl_component_set!(T0, T1, T2);
impl_component_set!(T0, T1, T2, T3);
impl_component_set!(T0, T1, T2, T3, T4);
impl_component_set!(T0, T1, T2, T3, T4, T5);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6, T7);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6, T7, T8);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_component_set!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
