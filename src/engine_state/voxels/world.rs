//! # World Module
//!
//! This module provides the `WorldManager` which owns every loaded chunk and
//! mediates block access across chunk boundaries.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only loaded chunks are kept, keyed by chunk
//! coordinate. Reads from unloaded space return air, writes to unloaded space
//! are dropped. Nothing is ever allocated on read.
//!
//! ## Visibility Propagation
//!
//! Every loaded chunk keeps a face-visibility mask per cell. The world keeps
//! those masks consistent:
//!
//! * `set_block` recomputes the edited cell and updates the facing bit of each
//!   of its six neighbors, which may live in adjacent chunks.
//! * `load_chunk` computes the new chunk against whatever is loaded, then lets
//!   adjacent chunks hide the boundary faces that now touch opaque blocks.
//! * `unload_chunk` does the inverse and reopens those boundary faces.
//!
//! Any chunk whose visibility changed is reported to the attached
//! [`ChunkRenderer`], which queues the remesh.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - A block edit touches at most seven cells in at most four chunks
//! - Loading a chunk touches its 4096 cells plus six boundary planes

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info};

use crate::error::{Result, VoxelError};

use super::block::block_face::{BlockFace, FaceMask};
use super::block::{BlockRegistry, BlockState};
use super::chunk::{local_to_world, Chunk, ChunkRenderer, DEFAULT_PALETTE_BITS};
use super::world_generator::WorldGenerator;

/// Lowest world-space y that counts as a valid position.
pub const MIN_WORLD_HEIGHT: i32 = 0;
/// Highest world-space y that counts as a valid position.
pub const MAX_WORLD_HEIGHT: i32 = 32;

/// Owns the loaded chunks and the block registry they refer to.
pub struct WorldManager {
    registry: Arc<BlockRegistry>,
    chunks: HashMap<Point3<i32>, Chunk>,
    /// Loaded chunk coordinates in load order.
    loaded_chunks: Vec<Point3<i32>>,
    renderer: Option<Rc<dyn ChunkRenderer>>,
    palette_bits: u8,
}

impl WorldManager {
    /// Creates an empty world over a locked registry.
    ///
    /// # Errors
    /// `RegistryNotLocked` if block types could still be registered.
    pub fn new(registry: Arc<BlockRegistry>) -> Result<Self> {
        Self::with_palette_bits(registry, DEFAULT_PALETTE_BITS)
    }

    /// Like [`WorldManager::new`], with the starting palette width for chunks
    /// created through [`WorldManager::create_chunk`].
    pub fn with_palette_bits(registry: Arc<BlockRegistry>, palette_bits: u8) -> Result<Self> {
        if !registry.is_locked() {
            return Err(VoxelError::RegistryNotLocked);
        }

        Ok(WorldManager {
            registry,
            chunks: HashMap::new(),
            loaded_chunks: Vec::new(),
            renderer: None,
            palette_bits,
        })
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Attaches the render collaborator to the world and every loaded chunk.
    pub fn set_renderer(&mut self, renderer: Rc<dyn ChunkRenderer>) {
        for chunk in self.chunks.values_mut() {
            chunk.set_renderer(Some(Rc::clone(&renderer)));
        }
        self.renderer = Some(renderer);
    }

    /// A fresh `Loading` chunk sized by this world's palette settings.
    pub fn create_chunk(&self, position: Point3<i32>) -> Result<Chunk> {
        Chunk::with_palette_bits(position, self.palette_bits)
    }

    pub fn get_chunk(&self, position: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    pub fn is_loaded(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.loaded_chunks.len()
    }

    /// Loaded chunks in load order.
    pub fn get_loaded_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.loaded_chunks
            .iter()
            .filter_map(move |position| self.chunks.get(position))
    }

    /// Whether `position` is inside the vertical world bounds and loaded.
    pub fn is_valid_position(&self, position: Point3<i32>) -> bool {
        (MIN_WORLD_HEIGHT..=MAX_WORLD_HEIGHT).contains(&position.y)
            && self.is_loaded(Chunk::get_chunk_position(position))
    }

    /// Block state at a world position. Unloaded space reads as air.
    pub fn get_block(&self, position: Point3<i32>) -> Result<BlockState> {
        match self.chunks.get(&Chunk::get_chunk_position(position)) {
            Some(chunk) => chunk.get_block(Chunk::get_local_position(position)),
            None => Ok(BlockState::AIR),
        }
    }

    /// Block state relative to a chunk's origin; `local` may leave `[0, 16)³`.
    pub fn get_relative_block(&self, chunk: Point3<i32>, local: Point3<i32>) -> Result<BlockState> {
        self.get_block(local_to_world(chunk, local))
    }

    fn is_opaque_at(&self, position: Point3<i32>) -> Result<bool> {
        Ok(self.registry.is_opaque(&self.get_block(position)?))
    }

    /// Visibility mask for `state` placed at `position`, against current neighbors.
    fn compute_visible_faces(&self, position: Point3<i32>, state: &BlockState) -> Result<FaceMask> {
        let Some(block_type) = self.registry.block_type_of(state) else {
            return Ok(FaceMask::NONE);
        };

        let mut opaque = [false; 6];
        for face in BlockFace::all() {
            opaque[face.index()] = self.is_opaque_at(position + face.normal())?;
        }

        Ok(block_type.on_created(|face| opaque[face.index()]))
    }

    /// Writes a block and keeps visibility consistent around it.
    ///
    /// Writes into unloaded chunks are silently dropped. Positions outside the
    /// chunk coordinate range can never be loaded, so their neighbors always
    /// fit in `i32`. Adjacent chunks whose
    /// boundary visibility flipped are invalidated, then the edited chunk is
    /// reported as updated.
    pub fn set_block(&mut self, position: Point3<i32>, state: BlockState) -> Result<()> {
        let chunk_position = Chunk::get_chunk_position(position);
        let local = Chunk::get_local_position(position);
        let state = state.canonical();

        let Some(chunk) = self.chunks.get_mut(&chunk_position) else {
            return Ok(());
        };
        let old = chunk.write_block(local, state)?;
        if old == state {
            return Ok(());
        }

        let mask = self.compute_visible_faces(position, &state)?;
        if let Some(chunk) = self.chunks.get_mut(&chunk_position) {
            chunk.set_visible_faces(local, mask)?;
        }

        let opaque = self.registry.is_opaque(&state);
        let registry = Arc::clone(&self.registry);

        for face in BlockFace::all() {
            let neighbor = position + face.normal();
            let neighbor_chunk = Chunk::get_chunk_position(neighbor);

            let Some(chunk) = self.chunks.get_mut(&neighbor_chunk) else {
                continue;
            };
            let flipped = chunk.neighbor_updated(
                &registry,
                Chunk::get_local_position(neighbor),
                face.opposite(),
                opaque,
            )?;

            if flipped && neighbor_chunk != chunk_position {
                chunk.invalidate();
            }
        }

        if let Some(chunk) = self.chunks.get(&chunk_position) {
            chunk.block_updated(local, old, state);
        }

        Ok(())
    }

    /// Takes ownership of a populated chunk and makes it part of the world.
    ///
    /// # Errors
    /// `AlreadyLoaded` if the coordinate is taken or the chunk was loaded before.
    /// Out-of-range coordinates are rejected earlier, by [`Chunk::new`].
    pub fn load_chunk(&mut self, mut chunk: Chunk) -> Result<()> {
        let position = chunk.position();
        if self.chunks.contains_key(&position) {
            return Err(VoxelError::AlreadyLoaded(position));
        }

        chunk.on_loaded()?;
        chunk.set_renderer(self.renderer.clone());

        let cells: Vec<_> = chunk.iter_blocks().collect();
        self.chunks.insert(position, chunk);
        self.loaded_chunks.push(position);

        for (local, state) in cells {
            let mask = self.compute_visible_faces(local_to_world(position, local), &state)?;
            if let Some(chunk) = self.chunks.get_mut(&position) {
                chunk.set_visible_faces(local, mask)?;
            }
        }

        self.refresh_neighbor_boundaries(position)?;

        if let Some(renderer) = &self.renderer {
            renderer.chunk_loaded(position);
        }
        debug!("Loaded chunk {:?}", position);

        Ok(())
    }

    /// Removes a chunk, reopening the boundary faces of its neighbors.
    ///
    /// # Errors
    /// `ChunkNotLoaded` if nothing is loaded at `position`.
    pub fn unload_chunk(&mut self, position: Point3<i32>) -> Result<()> {
        let chunk = self
            .chunks
            .remove(&position)
            .ok_or(VoxelError::ChunkNotLoaded(position))?;
        self.loaded_chunks.retain(|loaded| *loaded != position);

        self.refresh_neighbor_boundaries(position)?;

        if let Some(renderer) = &self.renderer {
            renderer.chunk_unloaded(position);
        }
        debug!("Unloaded chunk {:?} ({} blocks)", position, chunk.block_count());

        Ok(())
    }

    /// Re-evaluates the cells of every loaded neighbor of `position` that face
    /// it, invalidating each neighbor whose visibility changed.
    fn refresh_neighbor_boundaries(&mut self, position: Point3<i32>) -> Result<()> {
        let registry = Arc::clone(&self.registry);

        for face in BlockFace::all() {
            let neighbor_position = position + face.normal();
            if !self.chunks.contains_key(&neighbor_position) {
                continue;
            }

            let toward_us = face.opposite();
            let mut updates = Vec::new();
            for local in Chunk::boundary_cells(toward_us) {
                let across = local_to_world(neighbor_position, local) + toward_us.normal();
                updates.push((local, self.is_opaque_at(across)?));
            }

            let Some(neighbor) = self.chunks.get_mut(&neighbor_position) else {
                continue;
            };
            let mut changed = false;
            for (local, opaque) in updates {
                changed |= neighbor.neighbor_updated(&registry, local, toward_us, opaque)?;
            }
            if changed {
                neighbor.invalidate();
            }
        }

        Ok(())
    }

    /// Generates and loads every chunk in the inclusive range `min..=max`.
    ///
    /// # Returns
    /// The number of chunks loaded. Coordinates already loaded are skipped.
    pub fn load_initial_chunks(
        &mut self,
        generator: &dyn WorldGenerator,
        min: Point3<i32>,
        max: Point3<i32>,
    ) -> Result<usize> {
        let mut loaded = 0;

        for x in min.x..=max.x {
            for z in min.z..=max.z {
                for y in min.y..=max.y {
                    let position = Point3::new(x, y, z);
                    if self.is_loaded(position) {
                        continue;
                    }
                    let registry = Arc::clone(&self.registry);
                    let chunk = generator.generate(&registry, self, position)?;
                    self.load_chunk(chunk)?;
                    loaded += 1;
                }
            }
        }

        info!(
            "Loaded {} chunks between {:?} and {:?}",
            loaded, min, max
        );

        Ok(loaded)
    }
}
