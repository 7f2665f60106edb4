//! # Block Registry
//!
//! Write-once name to [`BlockType`] table. Types are registered during start-up,
//! then the registry is locked and shared (usually behind an `Arc`) by the
//! world, the generators and the mesher.

use std::collections::HashMap;

use log::info;
use phf::phf_map;

use crate::error::{Result, VoxelError};

use super::{
    block_face::BlockFace, BlockDefinition, BlockState, BlockTextures, BlockType, BlockTypeId,
};

/// Name of the sentinel air type, registered by [`BlockRegistry::new`].
pub const AIR_NAME: &str = "air";

/// Texture layout of a built-in block.
enum DefaultTextures {
    Uniform(&'static str),
    Sided {
        top: &'static str,
        bottom: &'static str,
        side: &'static str,
    },
}

/// Built-in block set used by the flat world generator and the demo.
static DEFAULT_BLOCKS: phf::Map<&'static str, DefaultTextures> = phf_map! {
    "stone" => DefaultTextures::Uniform("stone"),
    "dirt" => DefaultTextures::Uniform("dirt"),
    "cobblestone" => DefaultTextures::Uniform("cobblestone"),
    "grass" => DefaultTextures::Sided {
        top: "grass_top",
        bottom: "dirt",
        side: "dirt_grass",
    },
};

#[derive(Debug)]
pub struct BlockRegistry {
    types: Vec<BlockType>,
    by_name: HashMap<String, BlockTypeId>,
    locked: bool,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Creates an unlocked registry holding only the air sentinel.
    pub fn new() -> Self {
        let air = BlockType::from_definition(
            BlockTypeId::AIR,
            BlockDefinition::transparent(AIR_NAME, BlockTextures::None),
        );

        let mut by_name = HashMap::new();
        by_name.insert(AIR_NAME.to_string(), BlockTypeId::AIR);

        BlockRegistry {
            types: vec![air],
            by_name,
            locked: false,
        }
    }

    /// Registers a block type and returns its id.
    ///
    /// # Errors
    /// - `RegistryLocked` after [`BlockRegistry::lock`]
    /// - `DuplicateBlockType` if the name is taken
    /// - `RegistryFull` once every `u16` id is in use
    pub fn register(&mut self, definition: BlockDefinition) -> Result<BlockTypeId> {
        if self.locked {
            return Err(VoxelError::RegistryLocked);
        }
        if self.by_name.contains_key(&definition.name) {
            return Err(VoxelError::DuplicateBlockType(definition.name));
        }

        let id = BlockTypeId::from_index(self.types.len()).ok_or(VoxelError::RegistryFull)?;
        self.by_name.insert(definition.name.clone(), id);
        self.types.push(BlockType::from_definition(id, definition));

        Ok(id)
    }

    /// Registers stone, dirt, grass and cobblestone.
    pub fn register_defaults(&mut self) -> Result<()> {
        let mut names: Vec<&&str> = DEFAULT_BLOCKS.keys().collect();
        names.sort();

        for name in names {
            let textures = match DEFAULT_BLOCKS[*name] {
                DefaultTextures::Uniform(texture) => BlockTextures::uniform(texture),
                DefaultTextures::Sided { top, bottom, side } => {
                    BlockTextures::sided(top, bottom, side)
                }
            };
            self.register(BlockDefinition::solid(name, textures))?;
        }

        Ok(())
    }

    /// Freezes the registry. Further registration fails.
    pub fn lock(&mut self) {
        if !self.locked {
            info!("Block registry locked with {} block types", self.types.len());
        }
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Looks up a block type by name.
    pub fn get_block(&self, name: &str) -> Result<&BlockType> {
        self.by_name
            .get(name)
            .map(|id| &self.types[id.index()])
            .ok_or_else(|| VoxelError::UnknownBlockType(name.to_string()))
    }

    /// Default state (no secondary data) of the named type.
    pub fn state(&self, name: &str) -> Result<BlockState> {
        Ok(BlockState::new(self.get_block(name)?.id()).canonical())
    }

    pub fn get_by_id(&self, id: BlockTypeId) -> Option<&BlockType> {
        self.types.get(id.index())
    }

    /// Type of a state, `None` for air.
    pub fn block_type_of(&self, state: &BlockState) -> Option<&BlockType> {
        state
            .block_type
            .and_then(|id| self.get_by_id(id))
            .filter(|block_type| !block_type.is_air())
    }

    /// All registered types, the air sentinel included, in id order.
    pub fn get_block_types(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `state` hides the faces of its neighbors. Air and unknown ids do not.
    pub fn is_opaque(&self, state: &BlockState) -> bool {
        self.block_type_of(state)
            .map(BlockType::is_opaque)
            .unwrap_or(false)
    }

    /// Texture name of `state` on `face`.
    pub fn texture(&self, state: &BlockState, face: BlockFace) -> Option<&str> {
        self.block_type_of(state)?.texture(face)
    }
}
