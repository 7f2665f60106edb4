//! # Engine State Module
//!
//! The core engine module that manages the state of the voxel world and its
//! meshes.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the world, the renderer and the configuration
//! * `buffer_state` - buffer allocation behind the [`BufferAllocator`] trait
//! * `rendering` - textures, meshing and the dirty-chunk scheduler
//! * `voxels` - blocks, chunk storage, the world and world generation
//!
//! ## Architecture
//!
//! The world never owns its renderer. It holds a notification handle, and
//! `EngineState::update` lets the renderer catch up once per tick.

use std::sync::Arc;

use log::info;

use crate::config::EngineConfig;
use crate::error::Result;

use buffer_state::BufferAllocator;
use rendering::texture::TextureRegistry;
use rendering::world_renderer::WorldRenderer;
use voxels::block::BlockRegistry;
use voxels::world::WorldManager;
use voxels::world_generator::WorldGenerator;

pub mod buffer_state;
pub mod rendering;
pub mod voxels;

/// The world, its renderer and the settings they were built from.
pub struct EngineState<A: BufferAllocator> {
    pub config: EngineConfig,
    pub world: WorldManager,
    pub renderer: WorldRenderer<A>,
}

impl<A: BufferAllocator> EngineState<A>
where
    A::Buffer: 'static,
{
    /// Builds an engine over `blocks`, locking it and registering the
    /// textures its block types use.
    pub fn new(config: EngineConfig, mut blocks: BlockRegistry, allocator: A) -> Result<Self> {
        config.validate()?;
        blocks.lock();

        let mut textures = TextureRegistry::new();
        textures.register_block_textures(&blocks)?;
        textures.lock()?;

        let mut world = WorldManager::with_palette_bits(Arc::new(blocks), config.min_palette_bits)?;
        let renderer = WorldRenderer::new(allocator, textures, &config);
        world.set_renderer(renderer.handle());

        info!(
            "Engine state initialized (rebuild every {} ticks, {:?} budget)",
            config.mesh_rebuild_interval_ticks,
            config.mesh_time_budget()
        );

        Ok(EngineState {
            config,
            world,
            renderer,
        })
    }

    /// Builds an engine over the default block set.
    pub fn with_default_blocks(config: EngineConfig, allocator: A) -> Result<Self> {
        let mut blocks = BlockRegistry::new();
        blocks.register_defaults()?;
        Self::new(config, blocks, allocator)
    }

    /// Loads the configured initial chunk range through `generator`.
    pub fn load_initial_chunks(&mut self, generator: &dyn WorldGenerator) -> Result<usize> {
        let (min, max) = self.config.initial_load_range();
        self.world.load_initial_chunks(generator, min, max)
    }

    /// Runs one tick. Returns the number of chunk meshes rebuilt.
    pub fn update(&mut self) -> Result<usize> {
        self.renderer.update(&self.world)
    }
}
