//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x16x16 neighborhood of block
//! states plus the per-cell face-visibility bookkeeping the mesher reads.
//!
//! ## Memory Optimization
//!
//! Block states live in a [`PalettedBlockArray`], so a chunk with at most 15
//! distinct non-air states costs 4 bits per cell. The visibility masks cost one
//! byte per cell.
//!
//! ## Lifecycle
//!
//! A chunk starts out `Loading`. While loading, [`Chunk::set_block`] only writes
//! raw state; this is how world generators populate it. Once the
//! [`WorldManager`](super::world::WorldManager) takes ownership it calls
//! [`Chunk::on_loaded`], and from then on every edit goes through
//! [`WorldManager::set_block`] so visibility is recomputed and neighbors are
//! notified. A direct `set_block` on a `Ready` chunk is refused.
//!
//! ## Coordinate Range
//!
//! Chunk coordinates are limited to `±MAX_CHUNK_COORDINATE` on every axis, so
//! every cell of a chunk and every cell next to it has a world position that
//! fits in `i32`.
//!
//! ## Cell Layout
//!
//! Cells are indexed `x * 256 + y * 16 + z`.

use std::fmt;
use std::rc::Rc;

use cgmath::{EuclideanSpace, Point3};

use crate::error::{Result, VoxelError};

use super::block::block_face::{BlockFace, FaceMask};
use super::block::{BlockRegistry, BlockState};
use super::storage::PalettedBlockArray;
use super::world::WorldManager;

pub mod chunk_iteration;

use chunk_iteration::ChunkBlockIterator;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// Largest absolute chunk coordinate on any axis.
pub const MAX_CHUNK_COORDINATE: i32 = i32::MAX / CHUNK_DIMENSION - 1;
/// Palette width a fresh chunk starts at.
pub const DEFAULT_PALETTE_BITS: u8 = 4;

/// Receives notifications whenever a chunk's geometry goes stale.
///
/// The world and its chunks only hold this as a non-owning handle; whoever
/// implements it decides when the affected meshes actually get rebuilt.
pub trait ChunkRenderer {
    /// A chunk was loaded and needs its first mesh.
    fn chunk_loaded(&self, chunk: Point3<i32>);

    /// A block inside `chunk` changed from `old` to `new`.
    fn block_updated(&self, chunk: Point3<i32>, local: Point3<i32>, old: BlockState, new: BlockState);

    /// Visibility inside `chunk` changed because of something outside it.
    fn chunk_invalidated(&self, chunk: Point3<i32>);

    /// The chunk is gone; any mesh built for it can be released.
    fn chunk_unloaded(&self, chunk: Point3<i32>);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Being populated. Writes are raw.
    Loading,
    /// Owned by the world. Writes propagate.
    Ready,
}

/// Represents a 16x16x16 collection of blocks in the world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    position: Point3<i32>,
    blocks: PalettedBlockArray<BlockState>,
    visible_faces: Box<[FaceMask]>,
    block_count: u32,
    state: ChunkState,
    renderer: Option<Rc<dyn ChunkRenderer>>,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("block_count", &self.block_count)
            .field("state", &self.state)
            .field("bits_per_value", &self.blocks.bits_per_value())
            .finish()
    }
}

impl Chunk {
    /// Creates a new, completely empty chunk in the `Loading` state.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    pub fn new(position: Point3<i32>) -> Result<Self> {
        Self::with_palette_bits(position, DEFAULT_PALETTE_BITS)
    }

    /// Creates an empty chunk whose block array starts at `min_bits` per cell.
    ///
    /// # Errors
    /// `ChunkOutOfRange` if any axis of `position` exceeds `MAX_CHUNK_COORDINATE`.
    pub fn with_palette_bits(position: Point3<i32>, min_bits: u8) -> Result<Self> {
        if !Self::is_valid_position(position) {
            return Err(VoxelError::ChunkOutOfRange(position));
        }

        Ok(Chunk {
            position,
            blocks: PalettedBlockArray::new(CHUNK_SIZE as usize, min_bits)?,
            visible_faces: vec![FaceMask::NONE; CHUNK_SIZE as usize].into_boxed_slice(),
            block_count: 0,
            state: ChunkState::Loading,
            renderer: None,
        })
    }

    /// Whether a chunk may exist at chunk coordinate `position`.
    pub fn is_valid_position(position: Point3<i32>) -> bool {
        let range = -MAX_CHUNK_COORDINATE..=MAX_CHUNK_COORDINATE;
        range.contains(&position.x) && range.contains(&position.y) && range.contains(&position.z)
    }

    /// Chunk coordinates of this chunk.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// World-space position of the chunk's (0, 0, 0) cell.
    pub fn world_position(&self) -> Point3<i32> {
        self.position * CHUNK_DIMENSION
    }

    /// Number of non-air cells.
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ChunkState::Ready
    }

    /// Bits per cell currently used by the block array.
    pub fn bits_per_value(&self) -> u8 {
        self.blocks.bits_per_value()
    }

    /// Chunk coordinate containing `world_position`, flooring negative values.
    ///
    /// World position `(-1, 0, 0)` lies in chunk `(-1, 0, 0)`, not `(0, 0, 0)`.
    pub fn get_chunk_position(world_position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            world_position.x.div_euclid(CHUNK_DIMENSION),
            world_position.y.div_euclid(CHUNK_DIMENSION),
            world_position.z.div_euclid(CHUNK_DIMENSION),
        )
    }

    /// Position of `world_position` inside its chunk, always in `[0, 16)³`.
    pub fn get_local_position(world_position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            world_position.x.rem_euclid(CHUNK_DIMENSION),
            world_position.y.rem_euclid(CHUNK_DIMENSION),
            world_position.z.rem_euclid(CHUNK_DIMENSION),
        )
    }

    pub fn contains_local(local: Point3<i32>) -> bool {
        (0..CHUNK_DIMENSION).contains(&local.x)
            && (0..CHUNK_DIMENSION).contains(&local.y)
            && (0..CHUNK_DIMENSION).contains(&local.z)
    }

    /// Flat cell index of a local position.
    pub fn index(local: Point3<i32>) -> Result<usize> {
        if !Self::contains_local(local) {
            return Err(VoxelError::PositionOutOfChunk(local));
        }
        Ok((local.x * CHUNK_PLANE_SIZE + local.y * CHUNK_DIMENSION + local.z) as usize)
    }

    /// Inverse of [`Chunk::index`].
    pub fn local_from_index(index: usize) -> Point3<i32> {
        let index = index as i32;
        Point3::new(
            index / CHUNK_PLANE_SIZE,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            index % CHUNK_DIMENSION,
        )
    }

    /// Local positions on the side of the chunk that `face` points out of.
    pub fn boundary_cells(face: BlockFace) -> impl Iterator<Item = Point3<i32>> {
        let normal = face.normal();
        let fixed = if face.is_positive() { CHUNK_DIMENSION - 1 } else { 0 };

        (0..CHUNK_DIMENSION).flat_map(move |a| {
            (0..CHUNK_DIMENSION).map(move |b| {
                if normal.x != 0 {
                    Point3::new(fixed, a, b)
                } else if normal.y != 0 {
                    Point3::new(a, fixed, b)
                } else {
                    Point3::new(a, b, fixed)
                }
            })
        })
    }

    /// Block state at `local`. Air is returned as the all-zero state.
    pub fn get_block(&self, local: Point3<i32>) -> Result<BlockState> {
        self.blocks.get(Self::index(local)?)
    }

    /// Block state at a position that may lie outside this chunk.
    ///
    /// Positions outside `[0, 16)³` are resolved through `world`; unloaded
    /// neighbors read as air.
    pub fn get_relative_block(&self, world: &WorldManager, local: Point3<i32>) -> Result<BlockState> {
        if Self::contains_local(local) {
            return self.get_block(local);
        }
        world.get_block(self.world_position() + local.to_vec())
    }

    /// Writes a block state into a `Loading` chunk and returns the one it replaced.
    ///
    /// This performs no visibility work. Once the chunk is loaded, edits go
    /// through [`WorldManager::set_block`].
    ///
    /// # Errors
    /// - `ChunkReady` if the chunk is already loaded
    /// - `PositionOutOfChunk` if `local` is outside `[0, 16)³`
    pub fn set_block(&mut self, local: Point3<i32>, state: BlockState) -> Result<BlockState> {
        if self.state == ChunkState::Ready {
            return Err(VoxelError::ChunkReady(self.position));
        }
        self.write_block(local, state)
    }

    /// Raw write regardless of state. The air sentinel is stored as the
    /// all-zero state so that air always sits in palette slot 0.
    pub(crate) fn write_block(
        &mut self,
        local: Point3<i32>,
        state: BlockState,
    ) -> Result<BlockState> {
        let index = Self::index(local)?;
        let state = state.canonical();
        let old = self.blocks.replace(index, state)?;

        match (old.is_air(), state.is_air()) {
            (true, false) => self.block_count += 1,
            (false, true) => self.block_count -= 1,
            _ => {}
        }

        if state.is_air() {
            self.visible_faces[index] = FaceMask::NONE;
        }

        Ok(old)
    }

    /// Faces of the cell at `local` that currently face a non-opaque neighbor.
    pub fn visible_faces(&self, local: Point3<i32>) -> Result<FaceMask> {
        Ok(self.visible_faces[Self::index(local)?])
    }

    pub(crate) fn set_visible_faces(&mut self, local: Point3<i32>, mask: FaceMask) -> Result<()> {
        let index = Self::index(local)?;
        self.visible_faces[index] = mask;
        Ok(())
    }

    /// Runs the block's neighbor hook for the cell at `local`.
    ///
    /// Returns whether the visibility bit for `direction` flipped. Air cells
    /// are left alone.
    pub(crate) fn neighbor_updated(
        &mut self,
        registry: &BlockRegistry,
        local: Point3<i32>,
        direction: BlockFace,
        neighbor_opaque: bool,
    ) -> Result<bool> {
        let index = Self::index(local)?;
        let state = self.blocks.get(index)?;

        let Some(block_type) = registry.block_type_of(&state) else {
            return Ok(false);
        };

        Ok(block_type.on_neighbor_updated(&mut self.visible_faces[index], direction, neighbor_opaque))
    }

    /// Transitions `Loading` to `Ready`.
    ///
    /// # Errors
    /// `AlreadyLoaded` if the chunk is already `Ready`.
    pub fn on_loaded(&mut self) -> Result<()> {
        if self.state == ChunkState::Ready {
            return Err(VoxelError::AlreadyLoaded(self.position));
        }
        self.state = ChunkState::Ready;
        Ok(())
    }

    pub fn renderer(&self) -> Option<&Rc<dyn ChunkRenderer>> {
        self.renderer.as_ref()
    }

    pub fn set_renderer(&mut self, renderer: Option<Rc<dyn ChunkRenderer>>) {
        self.renderer = renderer;
    }

    /// Tells the renderer a block in this chunk changed.
    pub(crate) fn block_updated(&self, local: Point3<i32>, old: BlockState, new: BlockState) {
        if let Some(renderer) = &self.renderer {
            renderer.block_updated(self.position, local, old, new);
        }
    }

    /// Tells the renderer this chunk's geometry changed from the outside.
    pub(crate) fn invalidate(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.chunk_invalidated(self.position);
        }
    }

    /// Iterates over all non-air cells with their local positions.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(&self.blocks)
    }

    /// Chunk coordinate of the neighbor in `face` direction.
    pub fn neighbor_position(&self, face: BlockFace) -> Point3<i32> {
        self.position + face.normal()
    }
}

/// World-space offset of a local cell.
pub fn local_to_world(chunk: Point3<i32>, local: Point3<i32>) -> Point3<i32> {
    chunk * CHUNK_DIMENSION + local.to_vec()
}
