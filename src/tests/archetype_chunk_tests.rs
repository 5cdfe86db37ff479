use crate::archetypes::{ArchetypeChunk, ArchetypeCreationContext, ChunkBudget, ChunkState, ChunkStructure};
use crate::tests::{Health, Mass, Player, Position, Velocity};
use crate::components::{bytes_of, Component};
use crate::error::ArchetypeError;
use crate::entities::Entity;
use std::sync::Arc;

/// A chunk of 4 rows holding `Position` and `Health`.
fn small_chunk() -> ArchetypeChunk {
	let context = ArchetypeCreationContext::new().with_component::<Position>().with_component::<Health>();
	let budget = ChunkBudget::new(64, 4).expect("Valid budget");
	let structure = ChunkStructure::new(&context, budget).expect("Components are registered");
	ArchetypeChunk::new(Arc::new(structure))
}

#[test]
pub fn state_transitions() {
	let mut chunk = small_chunk();
	assert_eq!(chunk.capacity(), 4);
	assert_eq!(chunk.state(), ChunkState::Empty);

	assert_eq!(chunk.add_instance(), Ok(0));
	assert_eq!(chunk.state(), ChunkState::Partial);

	assert_eq!(chunk.add_several_instances(3), Ok(1..4));
	assert_eq!(chunk.state(), ChunkState::Full);
	assert!(chunk.is_full());

	assert_eq!(chunk.remove_several_instances(4), Ok(()));
	assert_eq!(chunk.state(), ChunkState::Empty);
}

#[test]
pub fn capacity_violations_leave_chunk_untouched() {
	let mut chunk = small_chunk();
	chunk.add_several_instances(3).expect("Three rows fit");

	assert_eq!(
		chunk.add_several_instances(2),
		Err(ArchetypeError::ChunkFull {
			requested: 2,
			available: 1
		})
	);
	assert_eq!(chunk.get_elements_count(), 3);

	assert_eq!(
		chunk.remove_several_instances(5),
		Err(ArchetypeError::ChunkUnderflow { requested: 5, count: 3 })
	);
	assert_eq!(chunk.get_elements_count(), 3);
}

#[test]
pub fn byte_round_trip() {
	let mut chunk = small_chunk();
	chunk.add_several_instances(4).expect("Four rows fit");

	for row in 0..4 {
		let position = Position::new(row as f32, 2.0 * row as f32, -1.0);
		chunk.set_component(row, Position::component_id(), bytes_of(&position)).expect("Row is live");
		chunk.write(row, Health(100 + row as u32)).expect("Row is live");
	}

	for row in 0..4 {
		let expected = Position::new(row as f32, 2.0 * row as f32, -1.0);
		assert_eq!(chunk.get_entity_component(row, Position::component_id()), Ok(bytes_of(&expected)));
		assert_eq!(chunk.get::<Position>(row), Ok(&expected));
		assert_eq!(chunk.get::<Health>(row), Ok(&Health(100 + row as u32)));
	}
}

#[test]
pub fn accessor_errors() {
	let mut chunk = small_chunk();
	chunk.add_instance().expect("Empty chunk");

	assert_eq!(
		chunk.get_entity_component(0, Velocity::component_id()).err(),
		Some(ArchetypeError::MissingComponent(Velocity::component_id()))
	);
	assert_eq!(
		chunk.get::<Health>(1).err(),
		Some(ArchetypeError::RowOutOfBounds { row: 1, count: 1 })
	);
	assert_eq!(
		chunk.set_component(0, Health::component_id(), &[0u8; 8]),
		Err(ArchetypeError::SizeMismatch {
			component: Health::component_id(),
			expected: 4,
			actual: 8
		})
	);
	assert!(chunk.get_subchunk(Mass::component_id()).is_err());
}

#[test]
pub fn copy_row_moves_every_column() {
	let mut chunk = small_chunk();
	chunk.add_several_instances(3).expect("Three rows fit");
	for row in 0..3 {
		chunk.set_owner(row, Entity::new(row as u32, 1));
		chunk.write(row, Health(row as u32)).expect("Row is live");
		chunk.write(row, Position::new(row as f32, 0.0, 0.0)).expect("Row is live");
	}

	chunk.copy_row(2, 0).expect("Both rows are live");
	assert_eq!(chunk.get::<Health>(0), Ok(&Health(2)));
	assert_eq!(chunk.get::<Position>(0), Ok(&Position::new(2.0, 0.0, 0.0)));
	assert_eq!(chunk.entity_at(0), Some(Entity::new(2, 1)));
	assert_eq!(chunk.get::<Health>(1), Ok(&Health(1)), "Other rows are untouched");

	chunk.remove_instance().expect("Three rows");
	assert_eq!(chunk.entity_at(2), None);
	assert!(chunk.copy_row(2, 0).is_err());
}

#[test]
pub fn subchunk_views() {
	let mut chunk = small_chunk();
	chunk.add_several_instances(3).expect("Three rows fit");
	for row in 0..3 {
		chunk.write(row, Health(row as u32 * 10)).expect("Row is live");
	}

	let view = chunk.get_subchunk(Health::component_id()).expect("Health is present");
	assert_eq!(view.len(), 3);
	assert_eq!(view.element_size(), 4);
	assert_eq!(view.column_size(), 16);
	assert_eq!(view.as_slice::<Health>(), Ok([Health(0), Health(10), Health(20)].as_slice()));
	assert_eq!(view.element(1), Some(bytes_of(&Health(10))));
	assert_eq!(view.element(3), None);
	assert_eq!(view.element(usize::MAX / 4), None);
	assert_eq!(view.element(usize::MAX), None);
	assert!(view.as_slice::<Position>().is_err(), "Views are checked against their component");

	let mut views = chunk
		.get_subchunks_mut(&[Position::component_id(), Health::component_id()])
		.expect("Both components are present");
	for health in views[1].as_mut_slice::<Health>().expect("Second view is Health") {
		health.0 += 1;
	}
	for position in views[0].as_mut_slice::<Position>().expect("First view is Position") {
		position.y = 5.0;
	}
	assert_eq!(views[1].element(usize::MAX / 4), None);
	assert_eq!(views[1].element(2), Some(bytes_of(&Health(21))));
	assert_eq!(chunk.get::<Health>(2), Ok(&Health(21)));
	assert_eq!(chunk.get::<Position>(0).map(|p| p.y), Ok(5.0));

	assert_eq!(
		chunk.get_subchunks_mut(&[Health::component_id(), Health::component_id()]).err(),
		Some(ArchetypeError::DuplicateComponent(Health::component_id()))
	);
}

#[test]
pub fn tag_only_chunk_allocates_nothing() {
	let context = ArchetypeCreationContext::new().with_tag::<Player>();
	let structure = ChunkStructure::new(&context, ChunkBudget::default()).expect("No components to resolve");
	let mut chunk = ArchetypeChunk::new(Arc::new(structure));

	assert!(chunk.as_bytes().is_empty());
	assert_eq!(chunk.add_several_instances(1024), Ok(0..1024));
	assert!(chunk.add_instance().is_err());
}
