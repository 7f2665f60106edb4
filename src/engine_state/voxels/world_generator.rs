//! # World Generation
//!
//! Pluggable chunk generators. A generator fills a `Loading` chunk with raw
//! block states; the world computes visibility once the chunk is loaded.

use cgmath::Point3;

use crate::error::Result;

use super::block::BlockRegistry;
use super::chunk::{Chunk, CHUNK_DIMENSION};
use super::world::WorldManager;

/// Produces the initial contents of a chunk.
pub trait WorldGenerator {
    /// Builds the chunk at `position`. The result must still be `Loading`.
    fn generate(
        &self,
        registry: &BlockRegistry,
        world: &WorldManager,
        position: Point3<i32>,
    ) -> Result<Chunk>;
}

/// Flat terrain: a few layers of dirt capped with grass in the `y == 0` chunk
/// layer, air everywhere else.
#[derive(Debug, Clone)]
pub struct FlatWorldGenerator {
    /// Number of filled layers, the top one being grass.
    pub height: i32,
    /// Whether to place a few marker blocks in the origin chunk.
    pub landmarks: bool,
}

impl Default for FlatWorldGenerator {
    fn default() -> Self {
        FlatWorldGenerator {
            height: 4,
            landmarks: true,
        }
    }
}

impl WorldGenerator for FlatWorldGenerator {
    fn generate(
        &self,
        registry: &BlockRegistry,
        world: &WorldManager,
        position: Point3<i32>,
    ) -> Result<Chunk> {
        let mut chunk = world.create_chunk(position)?;
        if position.y != 0 {
            return Ok(chunk);
        }

        let grass = registry.state("grass")?;
        let dirt = registry.state("dirt")?;
        let height = self.height.clamp(0, CHUNK_DIMENSION);

        for x in 0..CHUNK_DIMENSION {
            for y in 0..height {
                let state = if y == height - 1 { grass } else { dirt };
                for z in 0..CHUNK_DIMENSION {
                    chunk.set_block(Point3::new(x, y, z), state)?;
                }
            }
        }

        if self.landmarks && position == Point3::new(0, 0, 0) {
            let cobblestone = registry.state("cobblestone")?;
            chunk.set_block(Point3::new(7, 3, 7), cobblestone)?;
            chunk.set_block(Point3::new(7, 7, 7), cobblestone)?;
            for z in 8..=10 {
                chunk.set_block(Point3::new(7, 7, z), dirt)?;
            }
        }

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::voxels::block::BlockState;

    fn world() -> WorldManager {
        let mut registry = BlockRegistry::new();
        registry.register_defaults().unwrap();
        registry.lock();
        WorldManager::new(Arc::new(registry)).unwrap()
    }

    #[test]
    fn ground_layer_is_dirt_under_grass() {
        let world = world();
        let registry = Arc::clone(world.registry());
        let generator = FlatWorldGenerator {
            height: 4,
            landmarks: false,
        };

        let chunk = generator
            .generate(&registry, &world, Point3::new(2, 0, -1))
            .unwrap();
        assert!(!chunk.is_loaded());
        assert_eq!(chunk.block_count(), 4 * 256);
        assert_eq!(
            chunk.get_block(Point3::new(0, 3, 0)).unwrap(),
            registry.state("grass").unwrap()
        );
        assert_eq!(
            chunk.get_block(Point3::new(9, 0, 4)).unwrap(),
            registry.state("dirt").unwrap()
        );
        assert_eq!(chunk.get_block(Point3::new(9, 4, 4)).unwrap(), BlockState::AIR);
    }

    #[test]
    fn other_layers_are_empty() {
        let world = world();
        let registry = Arc::clone(world.registry());
        let chunk = FlatWorldGenerator::default()
            .generate(&registry, &world, Point3::new(0, 1, 0))
            .unwrap();
        assert!(chunk.is_empty());
    }

    #[test]
    fn origin_chunk_has_landmarks() {
        let world = world();
        let registry = Arc::clone(world.registry());
        let chunk = FlatWorldGenerator::default()
            .generate(&registry, &world, Point3::new(0, 0, 0))
            .unwrap();
        assert_eq!(
            chunk.get_block(Point3::new(7, 3, 7)).unwrap(),
            registry.state("cobblestone").unwrap()
        );
        assert_eq!(chunk.block_count(), 4 * 256 + 4);
    }
}
