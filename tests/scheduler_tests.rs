use std::time::Duration;

use cgmath::Point3;
use voxel_world::{
    BlockState, EngineConfig, EngineState, FlatWorldGenerator, HostBufferAllocator,
};

fn engine(config: EngineConfig) -> EngineState<HostBufferAllocator> {
    EngineState::with_default_blocks(config, HostBufferAllocator::new()).unwrap()
}

fn row_of_chunks(count: i32, interval: u32) -> EngineState<HostBufferAllocator> {
    let mut engine = engine(EngineConfig {
        mesh_rebuild_interval_ticks: interval,
        mesh_time_budget_ms: 1000.0,
        initial_load_min: [0, 0, 0],
        initial_load_max: [count - 1, 0, 0],
        ..EngineConfig::default()
    });
    engine
        .load_initial_chunks(&FlatWorldGenerator::default())
        .unwrap();
    engine
}

#[test]
fn loaded_chunks_are_queued_once() {
    let engine = row_of_chunks(3, 1);
    assert_eq!(engine.renderer.pending_count(), 3);
    assert_eq!(engine.renderer.mesh_count(), 0);
}

#[test]
fn repeated_edits_queue_a_chunk_once() {
    let mut engine = row_of_chunks(1, 1);
    engine.update().unwrap();
    assert_eq!(engine.renderer.pending_count(), 0);

    let stone = engine.world.registry().state("stone").unwrap();
    for x in 2..10 {
        engine.world.set_block(Point3::new(x, 8, 8), stone).unwrap();
    }
    assert_eq!(engine.renderer.pending_count(), 1);
}

#[test]
fn edits_that_change_nothing_queue_nothing() {
    let mut engine = row_of_chunks(1, 1);
    engine.update().unwrap();

    let grass = engine.world.registry().state("grass").unwrap();
    engine.world.set_block(Point3::new(3, 3, 3), grass).unwrap();
    engine.world.set_block(Point3::new(3, 12, 3), BlockState::AIR).unwrap();
    engine.world.set_block(Point3::new(3, 40, 3), grass).unwrap();

    assert_eq!(engine.renderer.pending_count(), 0);
}

#[test]
fn queue_drains_on_the_tick_interval() {
    let mut engine = row_of_chunks(2, 3);

    assert_eq!(engine.update().unwrap(), 0);
    assert_eq!(engine.update().unwrap(), 0);
    assert_eq!(engine.renderer.pending_count(), 2);
    assert_eq!(engine.update().unwrap(), 2);
    assert_eq!(engine.renderer.pending_count(), 0);
    assert_eq!(engine.renderer.tick_count(), 3);
}

#[test]
fn exhausted_budget_still_rebuilds_one_chunk() {
    let mut engine = row_of_chunks(3, 1);
    engine.renderer.set_time_budget(Duration::ZERO);

    assert_eq!(engine.update().unwrap(), 1);
    assert_eq!(engine.renderer.pending_count(), 2);
    assert!(engine.renderer.has_mesh(Point3::new(0, 0, 0)));

    assert_eq!(engine.update().unwrap(), 1);
    assert_eq!(engine.update().unwrap(), 1);
    assert_eq!(engine.update().unwrap(), 0);
    assert_eq!(engine.renderer.mesh_count(), 3);
}

#[test]
fn rebuilt_mesh_replaces_the_old_one() {
    let mut engine = row_of_chunks(1, 1);
    engine.update().unwrap();
    let before = engine.renderer.mesh_stats(Point3::new(0, 0, 0)).unwrap();

    let stone = engine.world.registry().state("stone").unwrap();
    engine.world.set_block(Point3::new(2, 12, 2), stone).unwrap();
    engine.update().unwrap();
    let after = engine.renderer.mesh_stats(Point3::new(0, 0, 0)).unwrap();

    assert_eq!(engine.renderer.mesh_count(), 1);
    assert_eq!(after.quad_count(), before.quad_count() + 6);
}

#[test]
fn unloading_drops_the_mesh_and_the_queue_entry() {
    let mut engine = row_of_chunks(2, 1);
    engine.update().unwrap();
    assert_eq!(engine.renderer.mesh_count(), 2);

    let stone = engine.world.registry().state("stone").unwrap();
    engine.world.set_block(Point3::new(20, 10, 4), stone).unwrap();
    assert!(engine.renderer.is_pending(Point3::new(1, 0, 0)));

    engine.world.unload_chunk(Point3::new(1, 0, 0)).unwrap();
    assert!(!engine.renderer.has_mesh(Point3::new(1, 0, 0)));
    assert!(!engine.renderer.is_pending(Point3::new(1, 0, 0)));
    assert!(engine.renderer.is_pending(Point3::new(0, 0, 0)));

    assert_eq!(engine.update().unwrap(), 1);
    assert_eq!(engine.renderer.mesh_count(), 1);
}

#[test]
fn empty_chunks_get_empty_meshes() {
    let mut engine = engine(EngineConfig {
        mesh_rebuild_interval_ticks: 1,
        initial_load_min: [0, 1, 0],
        initial_load_max: [0, 1, 0],
        ..EngineConfig::default()
    });
    engine
        .load_initial_chunks(&FlatWorldGenerator::default())
        .unwrap();
    engine.update().unwrap();

    let empty = engine
        .renderer
        .with_mesh(Point3::new(0, 1, 0), |mesh| mesh.is_empty())
        .unwrap();
    assert!(empty);
    assert_eq!(engine.renderer.allocator().analytics().vertex_buffers, 0);
}

#[test]
fn line_meshes_follow_configuration() {
    let mut engine = engine(EngineConfig {
        mesh_rebuild_interval_ticks: 1,
        generate_line_meshes: true,
        initial_load_min: [0, 0, 0],
        initial_load_max: [0, 0, 0],
        ..EngineConfig::default()
    });
    engine
        .load_initial_chunks(&FlatWorldGenerator::default())
        .unwrap();
    engine.update().unwrap();

    let line_parts = engine
        .renderer
        .with_mesh(Point3::new(0, 0, 0), |mesh| {
            mesh.built().map(|built| built.line_parts.len()).unwrap_or(0)
        })
        .unwrap();
    assert!(line_parts > 0);
}
