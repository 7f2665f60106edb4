//! # Block Module
//!
//! Block types, per-cell block state, and the registry that owns the types.
//!
//! A [`BlockType`] is an immutable descriptor owned by the [`BlockRegistry`]. A
//! [`BlockState`] is the small value stored per cell: a type id plus one byte
//! of secondary data. The all-zero state is air, which is what lets the
//! palette keep air in its reserved slot 0.

use std::num::NonZeroU16;

pub mod block_face;
pub mod registry;

use block_face::{BlockFace, FaceMask};

pub use registry::BlockRegistry;

/// Texture used whenever a block or face has no texture of its own.
pub const DEFAULT_TEXTURE: &str = "notex";

/// Stable id of a registered block type. Id 1 is always the air sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockTypeId(NonZeroU16);

impl BlockTypeId {
    /// The sentinel air type.
    pub const AIR: BlockTypeId = BlockTypeId(NonZeroU16::MIN);

    /// Id of the type stored at `index` in the registry, `None` once the id
    /// space is exhausted.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        let raw = u16::try_from(index.checked_add(1)?).ok()?;
        NonZeroU16::new(raw).map(BlockTypeId)
    }

    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }
}

/// The value stored in each chunk cell.
///
/// `block_type == None` is air. Two states are equal iff both the type and the
/// secondary data match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct BlockState {
    pub block_type: Option<BlockTypeId>,
    pub data: u8,
}

impl BlockState {
    /// Air with no secondary data.
    pub const AIR: BlockState = BlockState {
        block_type: None,
        data: 0,
    };

    pub fn new(block_type: BlockTypeId) -> Self {
        BlockState {
            block_type: Some(block_type),
            data: 0,
        }
    }

    pub fn with_data(block_type: BlockTypeId, data: u8) -> Self {
        BlockState {
            block_type: Some(block_type),
            data,
        }
    }

    /// Whether the state is air, either as `None` or as the explicit sentinel.
    pub fn is_air(&self) -> bool {
        matches!(self.block_type, None | Some(BlockTypeId::AIR))
    }

    /// Maps the explicit air sentinel onto the all-zero state.
    pub fn canonical(self) -> Self {
        if self.block_type == Some(BlockTypeId::AIR) {
            BlockState {
                block_type: None,
                ..self
            }
        } else {
            self
        }
    }
}

/// How a block type picks a texture per face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockTextures {
    /// No texture at all (air).
    None,
    /// Same texture on every face.
    Uniform(String),
    /// Separate top and bottom textures, one texture for the four sides.
    Sided {
        top: String,
        bottom: String,
        side: String,
    },
    /// One texture per face, indexed by [`BlockFace::index`].
    PerFace([String; 6]),
}

impl BlockTextures {
    pub fn uniform(name: &str) -> Self {
        BlockTextures::Uniform(name.to_string())
    }

    pub fn sided(top: &str, bottom: &str, side: &str) -> Self {
        BlockTextures::Sided {
            top: top.to_string(),
            bottom: bottom.to_string(),
            side: side.to_string(),
        }
    }

    pub fn texture(&self, face: BlockFace) -> Option<&str> {
        match self {
            BlockTextures::None => None,
            BlockTextures::Uniform(name) => Some(name.as_str()),
            BlockTextures::Sided { top, bottom, side } => Some(match face {
                BlockFace::Top => top.as_str(),
                BlockFace::Bottom => bottom.as_str(),
                _ => side.as_str(),
            }),
            BlockTextures::PerFace(names) => Some(names[face.index()].as_str()),
        }
    }

    /// Every distinct texture name referenced.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = BlockFace::all()
            .into_iter()
            .filter_map(|face| self.texture(face))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// What a caller hands to [`BlockRegistry::register`].
#[derive(Clone, Debug)]
pub struct BlockDefinition {
    pub name: String,
    pub opaque: bool,
    pub textures: BlockTextures,
}

impl BlockDefinition {
    /// An opaque block.
    pub fn solid(name: &str, textures: BlockTextures) -> Self {
        BlockDefinition {
            name: name.to_string(),
            opaque: true,
            textures,
        }
    }

    /// A block that does not hide the faces of its neighbors.
    pub fn transparent(name: &str, textures: BlockTextures) -> Self {
        BlockDefinition {
            name: name.to_string(),
            opaque: false,
            textures,
        }
    }
}

/// A registered block type.
#[derive(Clone, Debug)]
pub struct BlockType {
    id: BlockTypeId,
    name: String,
    opaque: bool,
    textures: BlockTextures,
}

impl BlockType {
    pub(crate) fn from_definition(id: BlockTypeId, definition: BlockDefinition) -> Self {
        BlockType {
            id,
            name: definition.name,
            opaque: definition.opaque,
            textures: definition.textures,
        }
    }

    pub fn id(&self) -> BlockTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn is_air(&self) -> bool {
        self.id == BlockTypeId::AIR
    }

    pub fn textures(&self) -> &BlockTextures {
        &self.textures
    }

    /// Texture name for `face`. Air has none; every other type falls back to
    /// [`DEFAULT_TEXTURE`].
    pub fn texture(&self, face: BlockFace) -> Option<&str> {
        if self.is_air() {
            return None;
        }
        Some(self.textures.texture(face).unwrap_or(DEFAULT_TEXTURE))
    }

    /// Hook run when a block of this type is placed: a face is visible iff the
    /// neighbor on that side is not opaque.
    pub fn on_created(&self, neighbor_opaque: impl Fn(BlockFace) -> bool) -> FaceMask {
        if self.is_air() {
            return FaceMask::NONE;
        }

        BlockFace::all()
            .into_iter()
            .filter(|face| !neighbor_opaque(*face))
            .fold(FaceMask::NONE, FaceMask::with)
    }

    /// Hook run when the neighbor in `direction` changed. Updates that one face
    /// bit and reports whether it flipped.
    pub fn on_neighbor_updated(
        &self,
        visible_faces: &mut FaceMask,
        direction: BlockFace,
        neighbor_opaque: bool,
    ) -> bool {
        if self.is_air() {
            return false;
        }
        visible_faces.set(direction, !neighbor_opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_state_is_air() {
        assert_eq!(BlockState::default(), BlockState::AIR);
        assert!(BlockState::AIR.is_air());
        assert!(BlockState::new(BlockTypeId::AIR).is_air());
        assert_eq!(BlockState::new(BlockTypeId::AIR).canonical(), BlockState::AIR);
    }

    #[test]
    fn states_compare_type_and_data() {
        let id = BlockTypeId::from_index(3).unwrap();
        assert_eq!(BlockState::new(id), BlockState::with_data(id, 0));
        assert_ne!(BlockState::new(id), BlockState::with_data(id, 1));
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn ids_stop_at_the_u16_range() {
        assert_eq!(BlockTypeId::from_index(0), Some(BlockTypeId::AIR));
        assert_eq!(BlockTypeId::from_index(65534).map(BlockTypeId::get), Some(u16::MAX));
        assert_eq!(BlockTypeId::from_index(65535), None);
        assert_eq!(BlockTypeId::from_index(usize::MAX), None);
    }

    #[test]
    fn sided_textures() {
        let textures = BlockTextures::sided("grass_top", "dirt", "dirt_grass");
        assert_eq!(textures.texture(BlockFace::Top), Some("grass_top"));
        assert_eq!(textures.texture(BlockFace::Bottom), Some("dirt"));
        assert_eq!(textures.texture(BlockFace::North), Some("dirt_grass"));
        assert_eq!(textures.names(), vec!["dirt", "dirt_grass", "grass_top"]);
    }

    #[test]
    fn created_hook_marks_faces_next_to_transparent_neighbors() {
        let stone = BlockType::from_definition(
            BlockTypeId::from_index(1).unwrap(),
            BlockDefinition::solid("stone", BlockTextures::uniform("stone")),
        );
        let mask = stone.on_created(|face| face != BlockFace::Top);
        assert_eq!(mask, FaceMask::NONE.with(BlockFace::Top));

        let mut mask = FaceMask::ALL;
        assert!(stone.on_neighbor_updated(&mut mask, BlockFace::East, true));
        assert!(!stone.on_neighbor_updated(&mut mask, BlockFace::East, true));
        assert!(!mask.contains(BlockFace::East));
    }
}
