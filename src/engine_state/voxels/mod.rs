//! # Voxel World Core
//!
//! This module contains the block model, compact block storage, chunks and
//! the world that owns them.
//!
//! ## Architecture
//!
//! * **Block**: block types, the registry that owns them, per-cell block state
//!   and face helpers
//! * **Storage**: bit-packed, palette-compressed per-cell storage
//! * **Chunk**: a 16x16x16 grid of block states plus face-visibility masks
//! * **World**: loaded chunks, cross-chunk block access and neighbor propagation
//! * **World generation**: pluggable strategies that populate new chunks
//!
//! ## Data Flow
//!
//! 1. A generator populates a chunk while it is still loading
//! 2. The world takes ownership and computes visibility
//! 3. Edits go through the world, which updates neighbors across chunk borders
//! 4. Stale chunks are reported to the renderer, which rebuilds their meshes
//!
//! ## Thread Safety
//!
//! Everything here is single-threaded. The registry is shared through an
//! `Arc` because it is immutable once locked; chunks and the world are not
//! `Send`.

pub mod block;
pub mod chunk;
pub mod storage;
pub mod world;
pub mod world_generator;
