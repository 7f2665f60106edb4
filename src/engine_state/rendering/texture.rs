//! Texture registry and atlas references for the rendering pipeline.
//!
//! Block textures are referred to by name. Once every name is registered the
//! registry is locked, which lays the textures out into atlases of
//! `ATLAS_WIDTH_IN_TILES` x `ATLAS_WIDTH_IN_TILES` square tiles and fixes each
//! texture's atlas region. Pixel data is not handled here; whoever uploads the
//! atlas images follows the same layout.

use std::collections::HashMap;

use log::{info, trace};

use crate::engine_state::voxels::block::{BlockRegistry, DEFAULT_TEXTURE};
use crate::error::{Result, VoxelError};

/// Number of tiles per atlas row (and rows per atlas).
pub const ATLAS_WIDTH_IN_TILES: usize = 16;
/// Number of tiles a single atlas can hold.
pub const TILES_PER_ATLAS: usize = ATLAS_WIDTH_IN_TILES * ATLAS_WIDTH_IN_TILES;

/// Identifies one tile: which atlas it lives in and its slot within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId {
    pub atlas: u32,
    pub tile: u32,
}

/// Where a texture lives inside its atlas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    pub id: TextureId,
    /// Top-left corner of the tile in normalized atlas coordinates.
    pub uv: [f32; 2],
    /// Size of one tile in normalized atlas coordinates.
    pub uv_size: [f32; 2],
}

/// Name to atlas region table.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    names: Vec<String>,
    regions: HashMap<String, AtlasRegion>,
    atlas_count: usize,
    locked: bool,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture name. Registering a name twice is a no-op.
    ///
    /// # Errors
    /// `RegistryLocked` once the atlas layout is fixed.
    pub fn register(&mut self, name: &str) -> Result<()> {
        if self.locked {
            return Err(VoxelError::RegistryLocked);
        }
        if !self.names.iter().any(|registered| registered == name) {
            self.names.push(name.to_string());
        }
        Ok(())
    }

    /// Registers every texture referenced by the block types in `blocks`.
    pub fn register_block_textures(&mut self, blocks: &BlockRegistry) -> Result<()> {
        for block_type in blocks.get_block_types() {
            for name in block_type.textures().names() {
                self.register(name)?;
            }
        }
        Ok(())
    }

    /// Fixes the atlas layout. The fallback texture is always included.
    pub fn lock(&mut self) -> Result<()> {
        if self.locked {
            return Ok(());
        }
        self.register(DEFAULT_TEXTURE)?;
        self.locked = true;

        self.atlas_count = self.names.len().div_ceil(TILES_PER_ATLAS);

        for (atlas, names) in self.names.chunks(TILES_PER_ATLAS).enumerate() {
            let columns = names.len().min(ATLAS_WIDTH_IN_TILES);
            let rows = names.len().div_ceil(ATLAS_WIDTH_IN_TILES);
            let uv_size = [1.0 / columns as f32, 1.0 / rows as f32];

            for (tile, name) in names.iter().enumerate() {
                let column = tile % ATLAS_WIDTH_IN_TILES;
                let row = tile / ATLAS_WIDTH_IN_TILES;

                self.regions.insert(
                    name.clone(),
                    AtlasRegion {
                        id: TextureId {
                            atlas: atlas as u32,
                            tile: tile as u32,
                        },
                        uv: [column as f32 * uv_size[0], row as f32 * uv_size[1]],
                        uv_size,
                    },
                );
            }
        }

        info!(
            "Texture registry locked with {} textures in {} atlases",
            self.names.len(),
            self.atlas_count
        );

        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of atlases the registered textures were laid out into.
    pub fn atlas_count(&self) -> usize {
        self.atlas_count
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Atlas region of `name`, or of the fallback texture if `name` is unknown.
    ///
    /// # Errors
    /// `RegistryNotLocked` before [`TextureRegistry::lock`].
    pub fn get(&self, name: &str) -> Result<&AtlasRegion> {
        if !self.locked {
            return Err(VoxelError::RegistryNotLocked);
        }

        if let Some(region) = self.regions.get(name) {
            return Ok(region);
        }

        trace!("Texture {:?} not registered, using {:?}", name, DEFAULT_TEXTURE);
        self.regions
            .get(DEFAULT_TEXTURE)
            .ok_or_else(|| VoxelError::MissingTexture(DEFAULT_TEXTURE.to_string()))
    }
}
