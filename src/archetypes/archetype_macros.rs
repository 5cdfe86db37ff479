/// Create (or fetch) the [Archetype](crate::archetypes::Archetype) holding the listed components and tags.
/// Works with anything exposing `create_archetype(&ArchetypeCreationContext)`, such as an
/// [ArchetypeStore](crate::archetypes::ArchetypeStore) or an [EntityStore](crate::entities::EntityStore).
///
/// ```ignore
/// let moving = create_archetype!(store, [Position, Velocity])?;
/// let frozen = create_archetype!(store, [Position], tags: [Frozen])?;
/// ```
#[macro_export]
macro_rules! create_archetype {
    ($store: expr, [$($t: ty),* $(,)?]) => {
		$store.create_archetype(
			&$crate::archetypes::ArchetypeCreationContext::new()
				$(.with_component::<$t>())*
		)
	};
    ($store: expr, [$($t: ty),* $(,)?], tags: [$($tag: ty),* $(,)?]) => {
		$store.create_archetype(
			&$crate::archetypes::ArchetypeCreationContext::new()
				$(.with_component::<$t>())*
				$(.with_tag::<$tag>())*
		)
	};
}
