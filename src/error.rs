//! # Error Module
//!
//! Crate-wide error type. Everything in here is a programmer-error class
//! condition (bad index, bad registry usage, bad configuration). Expected
//! streaming-world states such as an unloaded neighbor chunk are not errors and
//! never show up here.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cgmath::Point3;

/// Errors raised by storage, registry, chunk and world operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// An index outside `[0, len)` of a packed array or palette.
    IndexOutOfBounds { index: usize, len: usize },
    /// A bit width outside `[1, 32]`.
    InvalidBitWidth(u8),
    /// A value that does not fit in the current bit width.
    ValueTooLarge { value: u32, bits: u8 },
    /// A local position outside `[0, 16)³`.
    PositionOutOfChunk(Point3<i32>),
    /// Registration attempted after a registry was locked.
    RegistryLocked,
    /// Every block type id is in use.
    RegistryFull,
    /// A lookup that requires a locked registry was made before `lock()`.
    RegistryNotLocked,
    /// A block type with this name is already registered.
    DuplicateBlockType(String),
    /// No block type with this name is registered.
    UnknownBlockType(String),
    /// The fallback texture is missing from a locked texture registry.
    MissingTexture(String),
    /// `on_loaded` called twice, or a chunk coordinate loaded twice.
    AlreadyLoaded(Point3<i32>),
    /// A direct write to a chunk that is already owned by the world.
    ChunkReady(Point3<i32>),
    /// A chunk coordinate whose world-space blocks do not fit in `i32`.
    ChunkOutOfRange(Point3<i32>),
    /// Unloading a chunk coordinate that is not loaded.
    ChunkNotLoaded(Point3<i32>),
    /// Invalid engine configuration.
    Config(String),
}

impl Display for VoxelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VoxelError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for length {}", index, len)
            }
            VoxelError::InvalidBitWidth(bits) => {
                write!(f, "bit width {} outside of [1, 32]", bits)
            }
            VoxelError::ValueTooLarge { value, bits } => {
                write!(f, "value {} does not fit in {} bits", value, bits)
            }
            VoxelError::PositionOutOfChunk(pos) => {
                write!(f, "local position {:?} outside of chunk bounds", pos)
            }
            VoxelError::RegistryLocked => write!(f, "registry is locked"),
            VoxelError::RegistryFull => write!(f, "registry has no free block type ids"),
            VoxelError::RegistryNotLocked => write!(f, "registry is not locked yet"),
            VoxelError::DuplicateBlockType(name) => {
                write!(f, "duplicate block type with name {}", name)
            }
            VoxelError::UnknownBlockType(name) => write!(f, "unknown block type {}", name),
            VoxelError::MissingTexture(name) => write!(f, "texture {} is not registered", name),
            VoxelError::AlreadyLoaded(pos) => write!(f, "chunk {:?} is already loaded", pos),
            VoxelError::ChunkReady(pos) => {
                write!(f, "chunk {:?} is loaded, edit it through the world", pos)
            }
            VoxelError::ChunkOutOfRange(pos) => {
                write!(f, "chunk coordinate {:?} is outside of the world bounds", pos)
            }
            VoxelError::ChunkNotLoaded(pos) => write!(f, "chunk {:?} is not loaded", pos),
            VoxelError::Config(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl Error for VoxelError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VoxelError>;
