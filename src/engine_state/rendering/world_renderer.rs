//! # World Renderer
//!
//! Keeps one mesh per loaded chunk and rebuilds stale meshes on a budget.
//!
//! The world reports stale chunks through a [`RenderHandle`], which only
//! enqueues them. Every `mesh_rebuild_interval_ticks` ticks
//! [`WorldRenderer::update`] pops chunks off the queue and remeshes them until
//! the wall-clock budget runs out. A rebuild that has started always finishes,
//! so the budget is a soft ceiling, and each drain rebuilds at least one chunk.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::config::EngineConfig;
use crate::core::StResource;
use crate::engine_state::buffer_state::BufferAllocator;
use crate::engine_state::voxels::block::BlockState;
use crate::engine_state::voxels::chunk::ChunkRenderer;
use crate::engine_state::voxels::world::WorldManager;
use crate::error::Result;

use super::meshing::{ChunkMesh, GreedyMeshGenerator, MeshStats};
use super::texture::TextureRegistry;

/// FIFO of chunk coordinates where each coordinate is queued at most once.
#[derive(Debug, Default)]
pub struct DirtyChunkQueue {
    queue: VecDeque<Point3<i32>>,
    pending: HashSet<Point3<i32>>,
}

impl DirtyChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `position` unless it is already waiting. Returns whether it was added.
    pub fn push(&mut self, position: Point3<i32>) -> bool {
        if !self.pending.insert(position) {
            return false;
        }
        self.queue.push_back(position);
        true
    }

    pub fn pop(&mut self) -> Option<Point3<i32>> {
        let position = self.queue.pop_front()?;
        self.pending.remove(&position);
        Some(position)
    }

    /// Drops `position` from the queue. Returns whether it was queued.
    pub fn remove(&mut self, position: Point3<i32>) -> bool {
        if !self.pending.remove(&position) {
            return false;
        }
        self.queue.retain(|queued| *queued != position);
        true
    }

    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.pending.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// State shared between the renderer and the world's notifications.
struct RenderState<B> {
    dirty: DirtyChunkQueue,
    meshes: HashMap<Point3<i32>, ChunkMesh<B>>,
}

impl<B> Default for RenderState<B> {
    fn default() -> Self {
        RenderState {
            dirty: DirtyChunkQueue::new(),
            meshes: HashMap::new(),
        }
    }
}

/// The [`ChunkRenderer`] the world and its chunks call back into.
pub struct RenderHandle<B> {
    state: StResource<RenderState<B>>,
}

impl<B> ChunkRenderer for RenderHandle<B> {
    fn chunk_loaded(&self, chunk: Point3<i32>) {
        self.state.get_mut().dirty.push(chunk);
    }

    fn block_updated(&self, chunk: Point3<i32>, _local: Point3<i32>, _old: BlockState, _new: BlockState) {
        self.state.get_mut().dirty.push(chunk);
    }

    fn chunk_invalidated(&self, chunk: Point3<i32>) {
        self.state.get_mut().dirty.push(chunk);
    }

    fn chunk_unloaded(&self, chunk: Point3<i32>) {
        let mut state = self.state.get_mut();
        state.dirty.remove(chunk);
        state.meshes.remove(&chunk);
    }
}

/// Owns chunk meshes and schedules their rebuilds.
pub struct WorldRenderer<A: BufferAllocator> {
    allocator: A,
    textures: TextureRegistry,
    state: StResource<RenderState<A::Buffer>>,
    rebuild_interval: u64,
    time_budget: Duration,
    line_meshes: bool,
    tick: u64,
}

impl<A: BufferAllocator> WorldRenderer<A>
where
    A::Buffer: 'static,
{
    /// Creates a renderer meshing through `allocator` with a locked texture registry.
    pub fn new(allocator: A, textures: TextureRegistry, config: &EngineConfig) -> Self {
        WorldRenderer {
            allocator,
            textures,
            state: StResource::default(),
            rebuild_interval: u64::from(config.mesh_rebuild_interval_ticks.max(1)),
            time_budget: config.mesh_time_budget(),
            line_meshes: config.generate_line_meshes,
            tick: 0,
        }
    }

    /// Handle to pass to [`WorldManager::set_renderer`].
    pub fn handle(&self) -> Rc<dyn ChunkRenderer> {
        Rc::new(RenderHandle {
            state: self.state.clone(),
        })
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn set_time_budget(&mut self, budget: Duration) {
        self.time_budget = budget;
    }

    /// Number of chunks waiting for a rebuild.
    pub fn pending_count(&self) -> usize {
        self.state.get().dirty.len()
    }

    pub fn is_pending(&self, position: Point3<i32>) -> bool {
        self.state.get().dirty.contains(position)
    }

    /// Queues `position` for a rebuild.
    pub fn mark_dirty(&self, position: Point3<i32>) -> bool {
        self.state.get_mut().dirty.push(position)
    }

    pub fn mesh_count(&self) -> usize {
        self.state.get().meshes.len()
    }

    pub fn has_mesh(&self, position: Point3<i32>) -> bool {
        self.state.get().meshes.contains_key(&position)
    }

    pub fn mesh_stats(&self, position: Point3<i32>) -> Option<MeshStats> {
        self.with_mesh(position, ChunkMesh::stats)
    }

    /// Runs `f` on the current mesh of `position`, if one has been built.
    pub fn with_mesh<R>(&self, position: Point3<i32>, f: impl FnOnce(&ChunkMesh<A::Buffer>) -> R) -> Option<R> {
        self.state.get().meshes.get(&position).map(f)
    }

    /// Advances one tick, draining the dirty queue on every rebuild interval.
    ///
    /// # Returns
    /// The number of meshes rebuilt this tick.
    pub fn update(&mut self, world: &WorldManager) -> Result<usize> {
        self.tick += 1;
        if self.tick % self.rebuild_interval != 0 {
            return Ok(0);
        }
        self.rebuild_dirty(world)
    }

    /// Rebuilds queued meshes until the time budget is spent, regardless of
    /// the tick interval.
    pub fn rebuild_dirty(&mut self, world: &WorldManager) -> Result<usize> {
        let start = Instant::now();
        let mut rebuilt = 0;

        loop {
            let next = self.state.get_mut().dirty.pop();
            let Some(position) = next else {
                break;
            };

            // Unloaded since it was queued
            if !world.is_loaded(position) {
                continue;
            }

            self.rebuild_chunk(world, position)?;
            rebuilt += 1;

            if start.elapsed() >= self.time_budget {
                break;
            }
        }

        if rebuilt > 0 {
            debug!(
                "Rebuilt {} chunk meshes in {:?}, {} still queued",
                rebuilt,
                start.elapsed(),
                self.pending_count()
            );
        }

        Ok(rebuilt)
    }

    /// Remeshes one loaded chunk right away, replacing its previous mesh.
    pub fn rebuild_chunk(&mut self, world: &WorldManager, position: Point3<i32>) -> Result<()> {
        let Some(chunk) = world.get_chunk(position) else {
            return Ok(());
        };

        let mesh = GreedyMeshGenerator::create(
            chunk,
            world.registry(),
            &self.textures,
            &self.allocator,
            self.line_meshes,
        )?;
        self.state.get_mut().meshes.insert(position, mesh);

        Ok(())
    }
}
