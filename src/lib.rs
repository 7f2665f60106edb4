#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A chunked voxel world with compact block storage and greedy meshing, built
//! with Rust and WGPU.
//!
//! ## Key Modules
//!
//! * `core` - shared resource handles used throughout the engine
//! * `engine_state` - blocks, chunks and the world, plus meshing and the
//!   mesh rebuild scheduler
//! * `config` - engine settings loadable from JSON
//! * `error` - the crate-wide error type
//!
//! ## Architecture
//!
//! Block states are stored palette-compressed per 16x16x16 chunk. Every edit
//! goes through the [`WorldManager`], which keeps per-cell face visibility up
//! to date across chunk borders and reports stale chunks to the renderer. The
//! renderer rebuilds stale meshes a few at a time, bounded by a time budget.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_world::{EngineConfig, EngineState, FlatWorldGenerator, HostBufferAllocator};
//!
//! let config = EngineConfig {
//!     initial_load_min: [0, 0, 0],
//!     initial_load_max: [0, 0, 0],
//!     ..EngineConfig::default()
//! };
//! let mut engine = EngineState::with_default_blocks(config, HostBufferAllocator::new()).unwrap();
//! engine.load_initial_chunks(&FlatWorldGenerator::default()).unwrap();
//!
//! let stone = engine.world.registry().state("stone").unwrap();
//! engine.world.set_block(Point3::new(1, 8, 1), stone).unwrap();
//! engine.renderer.rebuild_dirty(&engine.world).unwrap();
//!
//! assert!(engine.renderer.has_mesh(Point3::new(0, 0, 0)));
//! ```

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::EngineConfig;
pub use engine_state::buffer_state::{BufferAllocator, HostBufferAllocator};
pub use engine_state::rendering::meshing::{ChunkMesh, GreedyMeshGenerator};
pub use engine_state::rendering::texture::TextureRegistry;
pub use engine_state::rendering::world_renderer::WorldRenderer;
pub use engine_state::voxels::block::block_face::BlockFace;
pub use engine_state::voxels::block::{BlockRegistry, BlockState};
pub use engine_state::voxels::chunk::Chunk;
pub use engine_state::voxels::world::WorldManager;
pub use engine_state::voxels::world_generator::{FlatWorldGenerator, WorldGenerator};
pub use engine_state::EngineState;
pub use error::{Result, VoxelError};

/// Installs the stdout logger, filtered by `RUST_LOG`.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}
