//! # Voxel World Demo
//!
//! Loads a flat world into host memory, meshes it, edits a few blocks and
//! logs what the scheduler did. Settings are read from the JSON file given as
//! the first argument, or `voxel_world.json` if present.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- settings.json
//! ```

use std::path::PathBuf;

use cgmath::Point3;
use log::info;
use web_time::Instant;

use voxel_world::config::CONFIG_FILE_NAME;
use voxel_world::{
    BlockState, EngineConfig, EngineState, FlatWorldGenerator, HostBufferAllocator, Result,
};

/// Upper bound on ticks spent waiting for the queue to drain.
const MAX_TICKS: u32 = 10_000;

fn load_config() -> Result<EngineConfig> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() {
        info!("Reading settings from {}", path.display());
        EngineConfig::from_file(&path)
    } else {
        Ok(EngineConfig::default())
    }
}

fn run_until_idle(engine: &mut EngineState<HostBufferAllocator>) -> Result<u32> {
    let mut ticks = 0;
    while engine.renderer.pending_count() > 0 && ticks < MAX_TICKS {
        engine.update()?;
        ticks += 1;
    }
    Ok(ticks)
}

fn main() -> Result<()> {
    voxel_world::init_logger();
    info!("Logger initialized");

    let config = load_config()?;
    let mut engine = EngineState::with_default_blocks(config, HostBufferAllocator::new())?;

    let start = Instant::now();
    let loaded = engine.load_initial_chunks(&FlatWorldGenerator::default())?;
    let ticks = run_until_idle(&mut engine)?;
    info!(
        "Meshed {} of {} chunks in {} ticks ({:?})",
        engine.renderer.mesh_count(),
        loaded,
        ticks,
        start.elapsed()
    );

    let stone = engine.world.registry().state("stone")?;
    for x in -2..=2 {
        engine.world.set_block(Point3::new(x, 4, 0), stone)?;
    }
    engine.world.set_block(Point3::new(0, 3, 0), BlockState::AIR)?;
    let ticks = run_until_idle(&mut engine)?;

    let quads: u32 = engine
        .world
        .get_loaded_chunks()
        .filter_map(|chunk| engine.renderer.mesh_stats(chunk.position()))
        .map(|stats| stats.quad_count())
        .sum();
    let analytics = engine.renderer.allocator().analytics();

    info!("Edits remeshed in {} ticks", ticks);
    info!(
        "{} quads across {} meshes, {} bytes in {} vertex and {} index buffers",
        quads,
        engine.renderer.mesh_count(),
        analytics.allocated_memory,
        analytics.vertex_buffers,
        analytics.index_buffers
    );

    Ok(())
}
