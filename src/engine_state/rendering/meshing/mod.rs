//! Mesh generation for voxel rendering.
//!
//! This module turns chunk contents into GPU-friendly geometry:
//! 1. [`GreedyMeshGenerator`] merges visible faces into as few quads as it can
//! 2. [`BufferGenerator`] turns quads into vertex and index lists
//! 3. A [`BufferAllocator`](crate::engine_state::buffer_state::BufferAllocator)
//!    uploads them, giving a [`ChunkMesh`]
//!
//! # Architecture
//! - `greedy`: the per-slice sweep and quad placement
//! - `buffer_generator`: vertex/index accumulation for triangles and outlines
//! - `mesh`: the built mesh, its per-atlas parts and statistics
//!
//! # Performance Considerations
//! - Visibility is precomputed per cell, so a sweep only reads bitmasks
//! - Geometry is grouped per atlas, one draw per group
//! - Merged quads tile their texture instead of stretching it

pub mod buffer_generator;
pub mod greedy;
pub mod mesh;

pub use buffer_generator::{BufferGenerator, Topology};
pub use greedy::GreedyMeshGenerator;
pub use mesh::{BuiltMesh, ChunkMesh, MeshPart, MeshQuad, MeshStats};
