use crate::components::{Component, Tag};

mod component_tests;
mod chunk_structure_tests;
mod archetype_chunk_tests;
mod archetype_store_tests;

#[derive(Component, Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

#[derive(Component, Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

/// 4 bytes.
#[derive(Component, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Health(pub u32);

/// 8 bytes, 8-aligned.
#[derive(Component, Copy, Clone, Debug, Default, PartialEq)]
pub struct Mass(pub f64);

#[derive(Component, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flag(pub u8);

#[derive(Tag)]
pub struct Player;

#[derive(Tag)]
pub struct Frozen;

impl Position {
	pub fn new(x: f32, y: f32, z: f32) -> Self {
		Self { x, y, z }
	}
}

impl Velocity {
	pub fn new(x: f32, y: f32, z: f32) -> Self {
		Self { x, y, z }
	}
}
