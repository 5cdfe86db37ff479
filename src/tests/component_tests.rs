use crate::components::{Component, ComponentId, ComponentSet, ComponentType, Tag, TagId, TypeInfoTable};
use crate::tests::{Flag, Frozen, Health, Mass, Player, Position, Velocity};
use std::mem::{align_of, size_of};

#[test]
pub fn ids_are_stable_and_distinct() {
	assert_eq!(Position::component_id(), Position::component_id());
	assert_ne!(Position::component_id(), Velocity::component_id());
	assert_ne!(Player::tag_id(), Frozen::tag_id());
	assert_eq!(ComponentId::of::<Health>(), Health::component_id());
	assert_eq!(TagId::of::<Player>(), Player::tag_id());
}

#[test]
pub fn type_info_is_registered() {
	let info = TypeInfoTable::component_info(Mass::component_id()).expect("Mass should be registered");
	assert_eq!(info.size(), size_of::<Mass>());
	assert_eq!(info.align(), align_of::<Mass>());
	assert_eq!(info, ComponentType::of::<Mass>());
	assert!(info.name().ends_with("Mass"));

	assert_eq!(TypeInfoTable::component_size(Flag::component_id()), Some(1));
	assert!(TypeInfoTable::tag_name(Frozen::tag_id()).map_or(false, |n| n.ends_with("Frozen")));
}

#[test]
pub fn raw_registration() {
	let a = TypeInfoTable::register_raw("script::Blob", 24, 8);
	let b = TypeInfoTable::register_raw("script::Blob", 24, 8);
	assert_ne!(a, b, "Every registration allocates a new id");

	let info = ComponentType::from_id(a).expect("Raw component should be registered");
	assert_eq!((info.size(), info.align(), info.name()), (24, 8, "script::Blob"));
}

#[test]
#[should_panic]
pub fn raw_registration_rejects_bad_alignment() {
	TypeInfoTable::register_raw("script::Broken", 4, 3);
}

#[test]
pub fn component_set_info() {
	let info = <(&mut Velocity, &Position, Health)>::info();
	assert_eq!(
		info.ids(),
		&[Velocity::component_id(), Position::component_id(), Health::component_id()]
	);
	assert!(!info.has_repeats());

	let mut sorted = info.ids().to_vec();
	sorted.sort();
	assert_eq!(info.sorted_ids(), sorted.as_slice());

	let repeated = <(&Position, &mut Position)>::info();
	assert!(repeated.has_repeats());
	assert_eq!(repeated.sorted_ids(), &[Position::component_id()]);
}
