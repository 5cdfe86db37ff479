use crate::archetypes::{
	ArchetypeCreationContext, ChunkBudget, ChunkStructure, ARCHETYPE_CHUNK_SIZE, MAX_ENTITIES_IN_CHUNK,
};
use crate::tests::{Flag, Frozen, Health, Mass, Player, Position, Velocity};
use crate::components::{Component, Tag, TypeInfoTable};
use crate::error::ArchetypeError;

fn structure(context: &ArchetypeCreationContext) -> ChunkStructure {
	ChunkStructure::new(context, ChunkBudget::default()).expect("All components are registered")
}

#[test]
pub fn twelve_byte_rows_are_capped() {
	let structure = structure(&ArchetypeCreationContext::new().with_component::<Health>().with_component::<Mass>());

	assert_eq!(structure.row_width(), 12);
	assert!(ARCHETYPE_CHUNK_SIZE / 12 > MAX_ENTITIES_IN_CHUNK);
	assert_eq!(structure.num_entities_per_chunk(), MAX_ENTITIES_IN_CHUNK);
	assert_eq!(structure.size_of_one_column(Health::component_id()), Some(1024 * 4));
	assert_eq!(structure.size_of_one_column(Mass::component_id()), Some(1024 * 8));
	assert_eq!(structure.size_of_one_column(Position::component_id()), None);
}

#[test]
pub fn layout_is_deterministic() {
	let a = structure(
		&ArchetypeCreationContext::new()
			.with_component::<Position>()
			.with_component::<Flag>()
			.with_component::<Mass>()
			.with_tag::<Player>(),
	);
	let b = structure(
		&ArchetypeCreationContext::new()
			.with_tag::<Player>()
			.with_component::<Mass>()
			.with_component::<Position>()
			.with_component::<Flag>()
			.with_component::<Mass>(),
	);

	assert_eq!(a, b);
	assert_eq!(a.columns(), b.columns());
	assert_eq!(a.component_ids(), b.component_ids());

	let mut sorted = a.component_ids().to_vec();
	sorted.sort();
	assert_eq!(a.component_ids(), sorted.as_slice(), "Columns must be ordered by component id");
	assert_eq!(
		a.size_by_component_id().map(|(id, _)| id).collect::<Vec<_>>(),
		sorted,
		"Size iteration must follow the column order"
	);
}

#[test]
pub fn columns_are_aligned_and_disjoint() {
	let structure = structure(
		&ArchetypeCreationContext::new()
			.with_component::<Flag>()
			.with_component::<Mass>()
			.with_component::<Health>()
			.with_component::<Velocity>(),
	);

	let columns = structure.columns();
	for column in columns {
		assert_eq!(column.offset % column.align, 0, "Column {} is misaligned", column.component_id);
		assert_eq!(column.column_size, column.size * structure.num_entities_per_chunk());
	}
	for pair in columns.windows(2) {
		assert!(pair[0].offset + pair[0].column_size <= pair[1].offset, "Columns overlap");
	}

	let last = columns.last().expect("Four columns");
	assert!(structure.chunk_size() >= last.offset + last.column_size);
	assert_eq!(structure.chunk_size() % structure.chunk_align(), 0);
	assert_eq!(structure.chunk_align(), 8);
}

#[test]
pub fn tag_only_structure() {
	let structure = structure(&ArchetypeCreationContext::new().with_tag::<Player>().with_tag::<Frozen>());

	assert_eq!(structure.row_width(), 0);
	assert_eq!(structure.num_entities_per_chunk(), MAX_ENTITIES_IN_CHUNK);
	assert_eq!(structure.chunk_size(), 0);
	assert!(structure.has_tag(Player::tag_id()));
	assert!(structure.columns().is_empty());
}

#[test]
pub fn capacity_follows_budget() {
	for k in [1, 2, 3, 4, 7, 16] {
		let id = TypeInfoTable::register_raw("test::Slab", ARCHETYPE_CHUNK_SIZE / k, 1);
		let structure = structure(&ArchetypeCreationContext::new().with_component_id(id));
		assert_eq!(structure.num_entities_per_chunk(), k);
	}

	// Rows wider than the whole budget still get one row per chunk.
	let id = TypeInfoTable::register_raw("test::Huge", ARCHETYPE_CHUNK_SIZE * 2, 1);
	assert_eq!(structure(&ArchetypeCreationContext::new().with_component_id(id)).num_entities_per_chunk(), 1);
}

#[test]
pub fn custom_budget() {
	assert_eq!(
		ChunkBudget::new(0, 16),
		Err(ArchetypeError::InvalidBudget {
			chunk_size: 0,
			max_entities: 16
		})
	);

	let budget = ChunkBudget::new(64, 10).expect("Valid budget");
	assert_eq!(budget.entities_per_chunk(4), 10);
	assert_eq!(budget.entities_per_chunk(16), 4);
	assert_eq!(budget.entities_per_chunk(0), 10);

	let structure = ChunkStructure::new(&ArchetypeCreationContext::new().with_component::<Position>(), budget)
		.expect("Position is registered");
	assert_eq!(structure.num_entities_per_chunk(), 5);
}

#[test]
pub fn requirements_are_a_subset_test() {
	let structure = structure(
		&ArchetypeCreationContext::new()
			.with_component::<Position>()
			.with_component::<Velocity>()
			.with_tag::<Player>(),
	);

	let position = Position::component_id();
	let velocity = Velocity::component_id();
	assert!(structure.check_requirements_match(&[], &[]));
	assert!(structure.check_requirements_match(&[position], &[]));
	assert!(structure.check_requirements_match(&[velocity, position], &[Player::tag_id()]));
	assert!(!structure.check_requirements_match(&[position, Health::component_id()], &[]));
	assert!(!structure.check_requirements_match(&[position], &[Frozen::tag_id()]));
}

#[test]
pub fn round_trip_through_context() {
	let original = structure(&ArchetypeCreationContext::new().with_component::<Mass>().with_tag::<Frozen>());
	let rebuilt = structure(&ArchetypeCreationContext::from_structure(&original));
	assert_eq!(original, rebuilt);
}
