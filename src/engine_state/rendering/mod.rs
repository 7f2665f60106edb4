//! Rendering system for the voxel engine.
//!
//! This module turns loaded chunks into GPU-ready meshes. It does not own a
//! surface or draw anything itself; buffers are created through a
//! [`BufferAllocator`](super::buffer_state::BufferAllocator), which is either
//! a `wgpu::Device` or a host-memory stand-in.
//!
//! ## Key Components
//!
//! * `texture` - texture names to atlas regions
//! * `vertex` - the vertex format and its `wgpu` layout
//! * `meshing` - greedy meshing and buffer generation
//! * `world_renderer` - per-chunk meshes and the dirty-chunk scheduler

pub mod meshing;
pub mod texture;
pub mod vertex;
pub mod world_renderer;

pub use texture::{AtlasRegion, TextureId, TextureRegistry};
pub use vertex::BlockFaceVertex;
pub use world_renderer::{DirtyChunkQueue, RenderHandle, WorldRenderer};
