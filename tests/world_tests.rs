use std::sync::Arc;

use cgmath::{EuclideanSpace, Point3};
use voxel_world::engine_state::voxels::block::block_face::FaceMask;
use voxel_world::engine_state::voxels::block::{BlockDefinition, BlockTextures};
use voxel_world::engine_state::voxels::chunk::{local_to_world, CHUNK_SIZE};
use voxel_world::{
    BlockFace, BlockRegistry, BlockState, Chunk, EngineConfig, EngineState, FlatWorldGenerator,
    HostBufferAllocator, WorldGenerator, WorldManager,
};

fn registry() -> Arc<BlockRegistry> {
    let mut registry = BlockRegistry::new();
    registry.register_defaults().unwrap();
    registry.lock();
    Arc::new(registry)
}

/// Defaults plus a transparent `glass` block.
fn registry_with_glass() -> Arc<BlockRegistry> {
    let mut registry = BlockRegistry::new();
    registry.register_defaults().unwrap();
    registry
        .register(BlockDefinition::transparent("glass", BlockTextures::uniform("glass")))
        .unwrap();
    registry.lock();
    Arc::new(registry)
}

fn floor() -> FlatWorldGenerator {
    FlatWorldGenerator {
        height: 2,
        landmarks: false,
    }
}

fn load(world: &mut WorldManager, generator: &dyn WorldGenerator, position: Point3<i32>) {
    let registry = Arc::clone(world.registry());
    let chunk = generator.generate(&registry, world, position).unwrap();
    world.load_chunk(chunk).unwrap();
}

fn mask_at(world: &WorldManager, position: Point3<i32>) -> FaceMask {
    world
        .get_chunk(Chunk::get_chunk_position(position))
        .unwrap()
        .visible_faces(Chunk::get_local_position(position))
        .unwrap()
}

/// Every face of every solid cell is visible exactly when its neighbor is not opaque.
fn assert_visibility_consistent(world: &WorldManager) {
    let registry = world.registry();

    for chunk in world.get_loaded_chunks() {
        for index in 0..CHUNK_SIZE as usize {
            let local = Chunk::local_from_index(index);
            let position = local_to_world(chunk.position(), local);
            let state = chunk.get_block(local).unwrap();
            let mask = chunk.visible_faces(local).unwrap();

            if state.is_air() {
                assert!(mask.is_empty(), "air at {:?} has visible faces", position);
                continue;
            }

            for face in BlockFace::all() {
                let neighbor = world.get_block(position + face.normal()).unwrap();
                assert_eq!(
                    mask.contains(face),
                    !registry.is_opaque(&neighbor),
                    "{:?} face of {:?}",
                    face,
                    position
                );
            }
        }
    }
}

#[test]
fn negative_coordinates_floor_to_their_chunk() {
    assert_eq!(
        Chunk::get_chunk_position(Point3::new(-1, 0, 0)),
        Point3::new(-1, 0, 0)
    );
    assert_eq!(
        Chunk::get_chunk_position(Point3::new(-16, 15, 16)),
        Point3::new(-1, 0, 1)
    );
    assert_eq!(
        Chunk::get_chunk_position(Point3::new(-17, -1, 0)),
        Point3::new(-2, -1, 0)
    );
    assert_eq!(
        Chunk::get_local_position(Point3::new(-1, -17, 33)),
        Point3::new(15, 15, 1)
    );
}

#[test]
fn unloaded_chunks_read_as_air() {
    let mut world = WorldManager::new(registry()).unwrap();
    load(&mut world, &floor(), Point3::origin());

    assert_ne!(world.get_block(Point3::new(3, 0, 3)).unwrap(), BlockState::AIR);
    assert_eq!(world.get_block(Point3::new(-1, 0, 3)).unwrap(), BlockState::AIR);
    assert_eq!(
        world.get_block(Point3::new(i32::MIN, i32::MIN, i32::MAX)).unwrap(),
        BlockState::AIR
    );
    assert_eq!(
        world
            .get_relative_block(Point3::origin(), Point3::new(-1, 0, 0))
            .unwrap(),
        BlockState::AIR
    );
    assert_eq!(world.loaded_chunk_count(), 1);
}

#[test]
fn relative_reads_cross_chunk_borders() {
    let mut world = WorldManager::new(registry()).unwrap();
    load(&mut world, &floor(), Point3::origin());
    load(&mut world, &floor(), Point3::new(1, 0, 0));
    let dirt = world.registry().state("dirt").unwrap();

    let chunk = world.get_chunk(Point3::origin()).unwrap();
    assert_eq!(
        chunk.get_relative_block(&world, Point3::new(16, 0, 4)).unwrap(),
        dirt
    );
    assert_eq!(
        chunk.get_relative_block(&world, Point3::new(-1, 0, 4)).unwrap(),
        BlockState::AIR
    );
}

#[test]
fn hole_in_floor_opens_exactly_the_adjacent_faces() {
    let config = EngineConfig {
        initial_load_min: [0, 0, 0],
        initial_load_max: [1, 0, 0],
        ..EngineConfig::default()
    };
    let mut engine = EngineState::with_default_blocks(config, HostBufferAllocator::new()).unwrap();
    engine.load_initial_chunks(&floor()).unwrap();
    while engine.renderer.rebuild_dirty(&engine.world).unwrap() > 0 {}
    assert_eq!(engine.renderer.pending_count(), 0);

    let hole = Point3::new(5, 1, 5);
    let neighbors: Vec<_> = BlockFace::all()
        .into_iter()
        .filter(|face| *face != BlockFace::Top)
        .map(|face| (face, hole + face.normal()))
        .collect();
    let before: Vec<_> = neighbors
        .iter()
        .map(|(_, position)| mask_at(&engine.world, *position))
        .collect();

    engine.world.set_block(hole, BlockState::AIR).unwrap();

    for ((face, position), before) in neighbors.iter().zip(before) {
        assert_eq!(
            mask_at(&engine.world, *position),
            before.with(face.opposite()),
            "neighbor {:?}",
            position
        );
    }
    assert!(mask_at(&engine.world, hole).is_empty());
    assert!(engine.renderer.is_pending(Point3::new(0, 0, 0)));
    assert!(!engine.renderer.is_pending(Point3::new(1, 0, 0)));
    assert_eq!(engine.renderer.pending_count(), 1);
    assert_visibility_consistent(&engine.world);
}

#[test]
fn hole_on_a_border_dirties_both_chunks() {
    let config = EngineConfig {
        initial_load_min: [0, 0, 0],
        initial_load_max: [1, 0, 0],
        ..EngineConfig::default()
    };
    let mut engine = EngineState::with_default_blocks(config, HostBufferAllocator::new()).unwrap();
    engine.load_initial_chunks(&floor()).unwrap();
    while engine.renderer.rebuild_dirty(&engine.world).unwrap() > 0 {}

    let across = Point3::new(16, 1, 5);
    assert!(!mask_at(&engine.world, across).contains(BlockFace::West));

    engine.world.set_block(Point3::new(15, 1, 5), BlockState::AIR).unwrap();

    assert!(mask_at(&engine.world, across).contains(BlockFace::West));
    assert!(engine.renderer.is_pending(Point3::new(0, 0, 0)));
    assert!(engine.renderer.is_pending(Point3::new(1, 0, 0)));
    assert_visibility_consistent(&engine.world);
}

#[test]
fn no_seam_remains_after_loading_a_neighbor() {
    let mut world = WorldManager::new(registry()).unwrap();
    load(&mut world, &floor(), Point3::origin());

    let edge = Point3::new(15, 0, 7);
    assert!(mask_at(&world, edge).contains(BlockFace::East));

    load(&mut world, &floor(), Point3::new(1, 0, 0));
    assert!(!mask_at(&world, edge).contains(BlockFace::East));
    assert!(!mask_at(&world, Point3::new(16, 0, 7)).contains(BlockFace::West));
    assert_visibility_consistent(&world);

    world.unload_chunk(Point3::new(1, 0, 0)).unwrap();
    assert!(mask_at(&world, edge).contains(BlockFace::East));
    assert_visibility_consistent(&world);
}

#[test]
fn loading_invalidates_neighbors_before_announcing_the_new_chunk() {
    let config = EngineConfig {
        initial_load_min: [0, 0, 0],
        initial_load_max: [0, 0, 0],
        ..EngineConfig::default()
    };
    let mut engine = EngineState::with_default_blocks(config, HostBufferAllocator::new()).unwrap();
    engine.load_initial_chunks(&floor()).unwrap();
    while engine.renderer.rebuild_dirty(&engine.world).unwrap() > 0 {}

    load(&mut engine.world, &floor(), Point3::new(0, 0, 1));
    assert_eq!(engine.renderer.pending_count(), 2);

    engine.renderer.set_time_budget(std::time::Duration::ZERO);
    engine.renderer.rebuild_dirty(&engine.world).unwrap();
    assert!(engine.renderer.is_pending(Point3::new(0, 0, 1)));
    assert!(!engine.renderer.is_pending(Point3::new(0, 0, 0)));
}

#[test]
fn glass_shows_the_faces_behind_it() {
    let mut world = WorldManager::new(registry_with_glass()).unwrap();
    load(&mut world, &floor(), Point3::new(0, 0, 0));

    let stone = world.registry().state("stone").unwrap();
    let glass = world.registry().state("glass").unwrap();
    assert!(!world.registry().is_opaque(&glass));

    world.set_block(Point3::new(4, 5, 4), stone).unwrap();
    world.set_block(Point3::new(5, 5, 4), glass).unwrap();
    world.set_block(Point3::new(6, 5, 4), glass).unwrap();

    assert!(mask_at(&world, Point3::new(4, 5, 4)).contains(BlockFace::East));
    assert!(!mask_at(&world, Point3::new(5, 5, 4)).contains(BlockFace::West));
    assert!(mask_at(&world, Point3::new(5, 5, 4)).contains(BlockFace::East));
    assert!(mask_at(&world, Point3::new(6, 5, 4)).contains(BlockFace::West));

    // Glass resting on the floor keeps the grass below it visible.
    world.set_block(Point3::new(8, 2, 8), glass).unwrap();
    assert!(mask_at(&world, Point3::new(8, 1, 8)).contains(BlockFace::Top));
    assert!(!mask_at(&world, Point3::new(8, 2, 8)).contains(BlockFace::Bottom));

    assert_visibility_consistent(&world);
}

#[test]
fn random_edits_keep_visibility_consistent() {
    let mut world = WorldManager::new(registry_with_glass()).unwrap();
    for x in -1..=0 {
        for z in -1..=0 {
            load(&mut world, &floor(), Point3::new(x, 0, z));
        }
    }

    let states = [
        BlockState::AIR,
        world.registry().state("stone").unwrap(),
        world.registry().state("grass").unwrap(),
        world.registry().state("cobblestone").unwrap(),
        world.registry().state("glass").unwrap(),
    ];

    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..2000 {
        let position = Point3::new(rng.i32(-20..20), rng.i32(-2..18), rng.i32(-20..20));
        let state = states[rng.usize(..states.len())];
        world.set_block(position, state).unwrap();
    }

    assert_visibility_consistent(&world);
}

#[test]
fn initial_load_covers_the_inclusive_range() {
    let mut world = WorldManager::new(registry()).unwrap();
    let loaded = world
        .load_initial_chunks(&FlatWorldGenerator::default(), Point3::new(-1, 0, -1), Point3::new(1, 1, 1))
        .unwrap();
    assert_eq!(loaded, 18);
    assert_eq!(world.loaded_chunk_count(), 18);
    assert!(world.get_loaded_chunks().all(Chunk::is_loaded));

    let again = world
        .load_initial_chunks(&FlatWorldGenerator::default(), Point3::new(-1, 0, -1), Point3::new(1, 1, 1))
        .unwrap();
    assert_eq!(again, 0);
    assert_visibility_consistent(&world);
}
