use crate::archetypes::{ArchetypeCreationContext, ArchetypeId, ArchetypeStore, ArchetypeTransition, ChunkBudget};
use crate::tests::{Frozen, Health, Mass, Player, Position, Velocity};
use crate::components::{Component, Tag};
use crate::create_archetype;

#[test]
pub fn one_archetype_per_signature() {
	let mut store = ArchetypeStore::new();
	assert_eq!(store.len(), 1, "The empty archetype always exists");

	let a = create_archetype!(store, [Position, Velocity]).expect("Components are registered");
	let b = create_archetype!(store, [Velocity, Position, Velocity]).expect("Components are registered");
	let c = create_archetype!(store, [Position, Velocity], tags: [Player]).expect("Components are registered");
	let empty = store.create_archetype(&ArchetypeCreationContext::new()).expect("Nothing to resolve");

	assert_eq!(a, b);
	assert_ne!(a, c, "Tags are part of an archetype's identity");
	assert_eq!(empty, ArchetypeId::default());
	assert_eq!(store.len(), 3);

	let archetype = store.get(c).expect("Archetype was just created");
	assert_eq!(archetype.id(), c);
	assert!(archetype.has_tag::<Player>());
	assert_eq!(store.iter().map(|a| a.id()).collect::<Vec<_>>(), vec![empty, a, c]);
}

#[test]
pub fn matching_cache_tracks_new_archetypes() {
	let mut store = ArchetypeStore::new();
	let moving = create_archetype!(store, [Position, Velocity]).expect("Components are registered");
	let _static = create_archetype!(store, [Position]).expect("Components are registered");

	let query = [Position::component_id(), Velocity::component_id()];
	assert_eq!(store.matching(&query, &[]), vec![moving]);

	let tagged = create_archetype!(store, [Position, Velocity, Health], tags: [Player]).expect("Registered");
	assert_eq!(store.matching(&query, &[]), vec![moving, tagged], "Cached results must include new archetypes");
	assert_eq!(store.matching(&query, &[Player::tag_id()]), vec![tagged]);
	assert!(store.matching(&[Mass::component_id()], &[]).is_empty());
	assert_eq!(store.matching(&[], &[]).len(), store.len());
}

#[test]
pub fn transitions() {
	let mut store = ArchetypeStore::new();
	let position = create_archetype!(store, [Position]).expect("Registered");
	let both = create_archetype!(store, [Position, Velocity]).expect("Registered");

	let added = store
		.transition(position, ArchetypeTransition::AddComponent(Velocity::component_id()))
		.expect("Known archetype");
	assert_eq!(added, both);

	let removed = store
		.transition(both, ArchetypeTransition::RemoveComponent(Velocity::component_id()))
		.expect("Known archetype");
	assert_eq!(removed, position);

	let frozen = store
		.transition(position, ArchetypeTransition::AddTag(Frozen::tag_id()))
		.expect("Known archetype");
	assert!(store.get(frozen).map_or(false, |a| a.has_tag::<Frozen>() && a.has_component::<Position>()));
	assert_eq!(
		store.transition(frozen, ArchetypeTransition::RemoveTag(Frozen::tag_id())),
		Ok(position)
	);

	// No-ops lead back to the source.
	assert_eq!(
		store.transition(position, ArchetypeTransition::AddComponent(Position::component_id())),
		Ok(position)
	);
	assert_eq!(
		store.transition(position, ArchetypeTransition::RemoveComponent(Mass::component_id())),
		Ok(position)
	);
	assert!(store
		.transition(ArchetypeId { index: 99 }, ArchetypeTransition::AddTag(Player::tag_id()))
		.is_err());
}

#[test]
pub fn pair_access() {
	let mut store = ArchetypeStore::new();
	let a = create_archetype!(store, [Health]).expect("Registered");
	let b = create_archetype!(store, [Mass]).expect("Registered");

	let (first, second) = store.get_pair_mut(b, a).expect("Distinct archetypes");
	assert_eq!((first.id(), second.id()), (b, a));
	assert!(store.get_pair_mut(a, a).is_none());
	assert!(store.get_pair_mut(a, ArchetypeId { index: 42 }).is_none());
}

#[test]
pub fn store_budget_applies_to_archetypes() {
	let mut store = ArchetypeStore::with_budget(ChunkBudget::new(64, 8).expect("Valid budget"));
	let id = create_archetype!(store, [Health]).expect("Registered");
	assert_eq!(store.get(id).map(|a| a.get_chunk_size()), Some(8));
	assert_eq!(store.budget().chunk_size(), 64);
}
