use crate::components::{ComponentFrom, ComponentId, ComponentTypeInfo};
use rayon::prelude::{IntoParallelRefMutIterator, ParallelIterator};
use crate::archetypes::Archetype;
use crate::error::ArchetypeError;
use crate::entities::Entity;
use paste::paste;

/// Sequential iteration over every row of an archetype.
/// `T` is a tuple of `&'a C` / `&'a mut C`, or a single one of them.
/// The references handed to `func` live as long as the borrow of the archetype.
pub trait IterateArchetype<'a, T> {
	/// The component ids `T` asks for, in declaration order.
	fn component_ids() -> Vec<ComponentId>;
	fn for_each_mut(&'a mut self, func: &mut impl FnMut(T)) -> Result<(), ArchetypeError>;
}

/// Like [IterateArchetype], with chunks handed out to the rayon thread pool.
pub trait IterateArchetypeParallel<'a, T> {
	fn par_for_each_mut(&'a mut self, func: &(impl Fn(T) + Send + Sync)) -> Result<(), ArchetypeError>;
}

/// Typed access to several components of one row.
pub trait FetchComponents<'a, T> {
	fn fetch_components(&'a mut self, entity: Entity, row: usize) -> Result<T, ArchetypeError>;
}

macro_rules! impl_archetype_iter {
    ($($t: ident),*) => {
        paste! {
            #[allow(unused_parens)]
            impl<'a, $($t: ComponentTypeInfo + ComponentFrom<'a, *mut $t::ComponentType>),*> IterateArchetype<'a, ($($t),*)> for Archetype {
                fn component_ids() -> Vec<ComponentId> {
                    vec![$(<$t>::component_id()),*]
                }

                fn for_each_mut(&'a mut self, func: &mut impl FnMut(($($t),*))) -> Result<(), ArchetypeError> {
                    self.validate_query(&[$(<$t>::component_id()),*])?;

                    for chunk in self.chunks_mut() {
                        $(let [<$t:lower>] = chunk.typed_column_ptr::<$t::ComponentType>();)*
                        for i in 0..chunk.len() {
                            unsafe { func(($($t::convert([<$t:lower>].add(i))),*)); }
                        }
                    }
                    Ok(())
                }
            }

            #[allow(unused_parens)]
            impl<'a, $($t: ComponentTypeInfo + ComponentFrom<'a, *mut $t::ComponentType> + Send + Sync),*> IterateArchetypeParallel<'a, ($($t),*)> for Archetype {
                fn par_for_each_mut(&'a mut self, func: &(impl Fn(($($t),*)) + Send + Sync)) -> Result<(), ArchetypeError> {
                    self.validate_query(&[$(<$t>::component_id()),*])?;

                    // Chunks are disjoint, so each one can go to its own thread.
                    self.chunks_mut().par_iter_mut().for_each(|chunk| {
                        $(let [<$t:lower>] = chunk.typed_column_ptr::<$t::ComponentType>();)*
                        for i in 0..chunk.len() {
                            unsafe { func(($($t::convert([<$t:lower>].add(i))),*)); }
                        }
                    });
                    Ok(())
                }
            }

            #[allow(unused_parens)]
            impl<'a, $($t: ComponentTypeInfo + ComponentFrom<'a, *mut $t::ComponentType>),*> FetchComponents<'a, ($($t),*)> for Archetype {
                fn fetch_components(&'a mut self, entity: Entity, row: usize) -> Result<($($t),*), ArchetypeError> {
                    self.validate_query(&[$(<$t>::component_id()),*])?;

                    let chunk = &self.chunks()[self.locate(entity, row)?];
                    unsafe { Ok(($($t::convert(chunk.typed_column_ptr::<$t::ComponentType>().add(row))),*)) }
                }
            }
        }
    };
}

impl_archetype_iter!(T0);
impl_archetype_iter!(T0, T1);
impl_archetype_iter!(T0, T1, T2);
impl_archetype_iter!(T0, T1, T2, T3);
impl_archetype_iter!(T0, T1, T2, T3, T4);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6, T7);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6, T7, T8);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_archetype_iter!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
