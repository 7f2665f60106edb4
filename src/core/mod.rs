//! # Core Module
//!
//! Shared resource handles used across the engine.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted resource with interior mutability
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::StResource;
//!
//! let counter = StResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod st_resource;

pub use st_resource::StResource;
