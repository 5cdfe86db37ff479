use crate::components::{Component, ComponentId};
use crate::archetypes::{ChunkStructure, ColumnLayout};
use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use crate::error::ArchetypeError;
use crate::entities::Entity;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ptr::NonNull;
use std::ops::Range;
use std::sync::Arc;

/// Occupancy of an [ArchetypeChunk].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ChunkState {
	/// No live rows; eligible for reclamation.
	Empty,
	/// Some rows are live and more can be added.
	Partial,
	/// Every row is live; inserts must go elsewhere.
	Full,
}

/// Raw zero-initialised storage of one chunk.
struct ChunkBuffer {
	ptr: NonNull<u8>,
	layout: Layout,
}

impl ChunkBuffer {
	fn new(size: usize, align: usize) -> Self {
		let layout = match Layout::from_size_align(size, align) {
			Ok(layout) => layout,
			Err(_) => panic!("Chunk layout of {size} bytes aligned to {align} is invalid"),
		};

		if size == 0 {
			// Aligned, never dereferenced for more than zero bytes.
			let ptr = unsafe { NonNull::new_unchecked(align as *mut u8) };
			return Self { ptr, layout };
		}

		let ptr = unsafe { alloc_zeroed(layout) };
		match NonNull::new(ptr) {
			Some(ptr) => Self { ptr, layout },
			None => handle_alloc_error(layout),
		}
	}

	#[inline(always)]
	fn as_ptr(&self) -> *mut u8 {
		self.ptr.as_ptr()
	}
}

impl Drop for ChunkBuffer {
	fn drop(&mut self) {
		if self.layout.size() != 0 {
			unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
		}
	}
}

// The buffer is uniquely owned by its chunk; access goes through `&`/`&mut` of the chunk.
unsafe impl Send for ChunkBuffer {}
unsafe impl Sync for ChunkBuffer {}

/// A fixed-size block holding the columns of up to
/// [num_entities_per_chunk](ChunkStructure::num_entities_per_chunk) rows of one archetype.
///
/// Rows `[0, len)` are live. The chunk only grows and shrinks at the end:
/// filling holes is left to the owning [Archetype](crate::archetypes::Archetype).
pub struct ArchetypeChunk {
	buffer: ChunkBuffer,
	structure: Arc<ChunkStructure>,
	owners: Box<[Option<Entity>]>,
	elements_count: usize,
}

impl ArchetypeChunk {
	pub fn new(structure: Arc<ChunkStructure>) -> Self {
		let buffer = ChunkBuffer::new(structure.chunk_size(), structure.chunk_align());
		let owners = vec![None; structure.num_entities_per_chunk()].into_boxed_slice();

		Self {
			buffer,
			owners,
			structure,
			elements_count: 0,
		}
	}

	pub fn structure(&self) -> &ChunkStructure {
		&self.structure
	}

	/// Reserve the next row.
	/// Returns the index of the new row.
	pub fn add_instance(&mut self) -> Result<usize, ArchetypeError> {
		self.add_several_instances(1).map(|rows| rows.start)
	}

	/// Reserve the next `count` rows.
	/// Fails without side effects if the chunk can't hold them all.
	pub fn add_several_instances(&mut self, count: usize) -> Result<Range<usize>, ArchetypeError> {
		let available = self.capacity() - self.elements_count;
		if count > available {
			return Err(ArchetypeError::ChunkFull { requested: count, available });
		}

		let start = self.elements_count;
		self.elements_count += count;
		Ok(start..self.elements_count)
	}

	/// Release the last row.
	pub fn remove_instance(&mut self) -> Result<(), ArchetypeError> {
		self.remove_several_instances(1)
	}

	/// Release the last `count` rows. Their contents are left as is.
	pub fn remove_several_instances(&mut self, count: usize) -> Result<(), ArchetypeError> {
		if count > self.elements_count {
			return Err(ArchetypeError::ChunkUnderflow {
				requested: count,
				count: self.elements_count,
			});
		}

		self.elements_count -= count;
		self.owners[self.elements_count..self.elements_count + count].fill(None);
		Ok(())
	}

	#[inline(always)]
	pub fn get_elements_count(&self) -> usize {
		self.elements_count
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.elements_count
	}

	#[inline(always)]
	pub fn is_empty(&self) -> bool {
		self.elements_count == 0
	}

	#[inline(always)]
	pub fn capacity(&self) -> usize {
		self.owners.len()
	}

	#[inline(always)]
	pub fn is_full(&self) -> bool {
		self.elements_count == self.capacity()
	}

	pub fn state(&self) -> ChunkState {
		match self.elements_count {
			0 => ChunkState::Empty,
			n if n == self.capacity() => ChunkState::Full,
			_ => ChunkState::Partial,
		}
	}

	/// The entity occupying a live row.
	pub fn entity_at(&self, row: usize) -> Option<Entity> {
		self.owners[..self.elements_count].get(row).copied().flatten()
	}

	pub(crate) fn set_owner(&mut self, row: usize, entity: Entity) {
		self.owners[row] = Some(entity);
	}

	/// A read-only view over the live part of a column.
	pub fn get_subchunk(&self, id: ComponentId) -> Result<Subchunk<'_>, ArchetypeError> {
		let column = self.column(id)?;
		Ok(Subchunk {
			component_id: id,
			ptr: unsafe { self.buffer.as_ptr().add(column.offset) },
			column_size: column.column_size,
			element_size: column.size,
			len: self.elements_count,
			_phantom: PhantomData,
		})
	}

	/// A mutable view over the live part of a column.
	pub fn get_subchunk_mut(&mut self, id: ComponentId) -> Result<SubchunkMut<'_>, ArchetypeError> {
		let column = *self.column(id)?;
		Ok(unsafe { self.subchunk_mut_unchecked(&column) })
	}

	/// Mutable views over several distinct columns at once.
	pub fn get_subchunks_mut(&mut self, ids: &[ComponentId]) -> Result<Vec<SubchunkMut<'_>>, ArchetypeError> {
		for (i, id) in ids.iter().enumerate() {
			if ids[..i].contains(id) {
				return Err(ArchetypeError::DuplicateComponent(*id));
			}
		}

		let this: &Self = self;
		let columns = ids.iter().map(|id| this.column(*id).copied()).collect::<Result<Vec<_>, _>>()?;

		// Columns don't overlap, so the views are disjoint.
		Ok(columns.iter().map(|c| unsafe { this.subchunk_mut_unchecked(c) }).collect())
	}

	/// The bytes of one component of a live row.
	pub fn get_entity_component(&self, row: usize, id: ComponentId) -> Result<&[u8], ArchetypeError> {
		let column = self.column(id)?;
		self.check_row(row)?;

		unsafe {
			let ptr = self.buffer.as_ptr().add(column.offset + row * column.size);
			Ok(std::slice::from_raw_parts(ptr, column.size))
		}
	}

	pub fn get_entity_component_mut(&mut self, row: usize, id: ComponentId) -> Result<&mut [u8], ArchetypeError> {
		let column = *self.column(id)?;
		self.check_row(row)?;

		unsafe {
			let ptr = self.buffer.as_ptr().add(column.offset + row * column.size);
			Ok(std::slice::from_raw_parts_mut(ptr, column.size))
		}
	}

	/// Copy the raw bytes of one component instance into a live row.
	pub fn set_component(&mut self, row: usize, id: ComponentId, bytes: &[u8]) -> Result<(), ArchetypeError> {
		let expected = self.column(id)?.size;
		if expected != bytes.len() {
			return Err(ArchetypeError::SizeMismatch {
				component: id,
				expected,
				actual: bytes.len(),
			});
		}

		self.get_entity_component_mut(row, id)?.copy_from_slice(bytes);
		Ok(())
	}

	pub fn get<T: Component>(&self, row: usize) -> Result<&T, ArchetypeError> {
		let ptr = self.get_entity_component(row, T::component_id())?.as_ptr();
		Ok(unsafe { &*(ptr as *const T) })
	}

	pub fn get_mut<T: Component>(&mut self, row: usize) -> Result<&mut T, ArchetypeError> {
		let ptr = self.get_entity_component_mut(row, T::component_id())?.as_mut_ptr();
		Ok(unsafe { &mut *(ptr as *mut T) })
	}

	pub fn write<T: Component>(&mut self, row: usize, value: T) -> Result<(), ArchetypeError> {
		let ptr = self.get_entity_component_mut(row, T::component_id())?.as_mut_ptr();
		unsafe { std::ptr::write(ptr as *mut T, value) };
		Ok(())
	}

	/// Copy every column of row `from` over row `to`, owner included.
	/// Both rows must be live.
	pub fn copy_row(&mut self, from: usize, to: usize) -> Result<(), ArchetypeError> {
		self.check_row(from)?;
		self.check_row(to)?;
		if from == to {
			return Ok(());
		}

		let base = self.buffer.as_ptr();
		for column in self.structure.columns() {
			unsafe {
				let src = base.add(column.offset + from * column.size);
				let dst = base.add(column.offset + to * column.size);
				std::ptr::copy_nonoverlapping(src, dst, column.size);
			}
		}

		self.owners[to] = self.owners[from];
		Ok(())
	}

	/// The whole buffer, dead rows and padding included.
	pub fn as_bytes(&self) -> &[u8] {
		unsafe { std::slice::from_raw_parts(self.buffer.as_ptr(), self.buffer.layout.size()) }
	}

	/// Start of the column of `id`, if present.
	pub(crate) fn column_ptr(&self, id: ComponentId) -> Option<*mut u8> {
		let column = self.structure.column(id)?;
		Some(unsafe { self.buffer.as_ptr().add(column.offset) })
	}

	/// Start of the column of `T`, typed.
	/// Panics if the column is missing; typed iteration checks membership up front.
	pub(crate) fn typed_column_ptr<T: Component>(&self) -> *mut T {
		debug_assert_eq!(self.structure.component_size(T::component_id()), Some(size_of::<T>()));
		match self.column_ptr(T::component_id()) {
			Some(ptr) => ptr as *mut T,
			None => panic!("Component {} is not part of this chunk", T::component_id()),
		}
	}

	fn column(&self, id: ComponentId) -> Result<&ColumnLayout, ArchetypeError> {
		self.structure.column(id).ok_or(ArchetypeError::MissingComponent(id))
	}

	#[inline(always)]
	fn check_row(&self, row: usize) -> Result<(), ArchetypeError> {
		if row >= self.elements_count {
			return Err(ArchetypeError::RowOutOfBounds {
				row,
				count: self.elements_count,
			});
		}
		Ok(())
	}

	/// # Safety
	/// `column` must belong to this chunk's structure and no other view over it may be alive.
	unsafe fn subchunk_mut_unchecked(&self, column: &ColumnLayout) -> SubchunkMut<'_> {
		SubchunkMut {
			component_id: column.component_id,
			ptr: self.buffer.as_ptr().add(column.offset),
			column_size: column.column_size,
			element_size: column.size,
			len: self.elements_count,
			_phantom: PhantomData,
		}
	}
}

/// A non-owning, read-only view over one component column of one chunk.
///
/// The view borrows the chunk, so it cannot outlive any call that changes the chunk's row count.
#[derive(Copy, Clone)]
pub struct Subchunk<'l> {
	component_id: ComponentId,
	ptr: *const u8,
	column_size: usize,
	element_size: usize,
	len: usize,
	_phantom: PhantomData<&'l [u8]>,
}

/// A non-owning, mutable view over one component column of one chunk.
pub struct SubchunkMut<'l> {
	component_id: ComponentId,
	ptr: *mut u8,
	column_size: usize,
	element_size: usize,
	len: usize,
	_phantom: PhantomData<&'l mut [u8]>,
}

unsafe impl Send for Subchunk<'_> {}
unsafe impl Sync for Subchunk<'_> {}
unsafe impl Send for SubchunkMut<'_> {}
unsafe impl Sync for SubchunkMut<'_> {}

macro_rules! impl_subchunk_common {
	($name: ident) => {
		impl<'l> $name<'l> {
			pub fn component_id(&self) -> ComponentId {
				self.component_id
			}

			pub fn ptr(&self) -> *const u8 {
				self.ptr
			}

			/// Size of one element, which is also the distance between two rows.
			pub fn element_size(&self) -> usize {
				self.element_size
			}

			/// Size of the whole column, dead rows included.
			pub fn column_size(&self) -> usize {
				self.column_size
			}

			/// Number of live rows.
			pub fn len(&self) -> usize {
				self.len
			}

			pub fn is_empty(&self) -> bool {
				self.len == 0
			}

			/// The live rows as raw bytes.
			pub fn bytes(&self) -> &[u8] {
				unsafe { std::slice::from_raw_parts(self.ptr, self.len * self.element_size) }
			}

			pub fn element(&self, row: usize) -> Option<&[u8]> {
				if row >= self.len {
					return None;
				}
				let start = row.checked_mul(self.element_size)?;
				let end = start.checked_add(self.element_size)?;
				self.bytes().get(start..end)
			}

			fn check_type<T: Component>(&self) -> Result<(), ArchetypeError> {
				if T::component_id() != self.component_id {
					return Err(ArchetypeError::MissingComponent(T::component_id()));
				}
				Ok(())
			}
		}
	};
}

impl_subchunk_common!(Subchunk);
impl_subchunk_common!(SubchunkMut);

impl<'l> Subchunk<'l> {
	/// The live rows as a typed slice; fails if `T` isn't this column's component.
	pub fn as_slice<T: Component>(&self) -> Result<&'l [T], ArchetypeError> {
		self.check_type::<T>()?;
		Ok(unsafe { std::slice::from_raw_parts(self.ptr as *const T, self.len) })
	}
}

impl<'l> SubchunkMut<'l> {
	pub fn as_slice<T: Component>(&self) -> Result<&[T], ArchetypeError> {
		self.check_type::<T>()?;
		Ok(unsafe { std::slice::from_raw_parts(self.ptr as *const T, self.len) })
	}

	pub fn as_mut_slice<T: Component>(&mut self) -> Result<&mut [T], ArchetypeError> {
		self.check_type::<T>()?;
		Ok(unsafe { std::slice::from_raw_parts_mut(self.ptr as *mut T, self.len) })
	}

	/// The live rows as mutable raw bytes.
	pub fn bytes_mut(&mut self) -> &mut [u8] {
		unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len * self.element_size) }
	}

	pub fn as_subchunk(&self) -> Subchunk<'_> {
		Subchunk {
			component_id: self.component_id,
			ptr: self.ptr,
			column_size: self.column_size,
			element_size: self.element_size,
			len: self.len,
			_phantom: PhantomData,
		}
	}
}
