//! # Buffer State Module
//!
//! Buffer allocation behind a small trait so that meshing never depends on a
//! concrete rendering device.
//!
//! ## Key Features
//!
//! * [`BufferAllocator`] - the opaque device handle the mesher allocates through
//! * An implementation for `wgpu::Device` creating initialized GPU buffers
//! * [`HostBufferAllocator`] - keeps CPU copies, used headless and in tests
//! * Allocation analytics for the host allocator
//!
//! ## Performance Considerations
//!
//! * Buffers are created once per mesh part with their final contents; nothing
//!   is mapped or rewritten afterwards
//! * Index data is always `u32`

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::core::StResource;

/// What a buffer will be bound as.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl BufferKind {
    fn usage(self) -> wgpu::BufferUsages {
        match self {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        }
    }
}

/// Creates buffers initialized with the given bytes.
pub trait BufferAllocator {
    /// Handle of a created buffer.
    type Buffer;

    /// Creates a buffer of `kind` holding `contents`.
    fn allocate(&self, label: &str, kind: BufferKind, contents: &[u8]) -> Self::Buffer;
}

impl BufferAllocator for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn allocate(&self, label: &str, kind: BufferKind, contents: &[u8]) -> Self::Buffer {
        self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: kind.usage(),
        })
    }
}

/// Analytics data for the buffers created by a [`HostBufferAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory handed out, in bytes
    pub allocated_memory: u64,
    /// Number of vertex buffers created
    pub vertex_buffers: u64,
    /// Number of index buffers created
    pub index_buffers: u64,
}

/// A buffer living in host memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBuffer {
    pub label: String,
    pub kind: BufferKind,
    pub contents: Vec<u8>,
}

impl HostBuffer {
    /// Reinterprets the contents as a slice of `T`, copying to fix alignment.
    pub fn to_vec<T: Pod>(&self) -> Vec<T> {
        self.contents
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Allocator that keeps every buffer in host memory.
#[derive(Clone, Default)]
pub struct HostBufferAllocator {
    analytics: StResource<BufferAnalytics>,
}

impl HostBufferAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what has been allocated so far.
    pub fn analytics(&self) -> BufferAnalytics {
        *self.analytics.get()
    }
}

impl BufferAllocator for HostBufferAllocator {
    type Buffer = HostBuffer;

    fn allocate(&self, label: &str, kind: BufferKind, contents: &[u8]) -> Self::Buffer {
        {
            let mut analytics = self.analytics.get_mut();
            analytics.allocated_memory += contents.len() as u64;
            match kind {
                BufferKind::Vertex => analytics.vertex_buffers += 1,
                BufferKind::Index => analytics.index_buffers += 1,
            }
        }

        HostBuffer {
            label: label.to_string(),
            kind,
            contents: contents.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_buffers_round_trip_pod_data() {
        let allocator = HostBufferAllocator::new();
        let indices: Vec<u32> = vec![0, 1, 2, 2, 1, 3];

        let buffer = allocator.allocate(
            "indices",
            BufferKind::Index,
            bytemuck::cast_slice(&indices),
        );
        assert_eq!(buffer.len(), 24);
        assert_eq!(buffer.to_vec::<u32>(), indices);

        let analytics = allocator.analytics();
        assert_eq!(analytics.allocated_memory, 24);
        assert_eq!(analytics.index_buffers, 1);
        assert_eq!(analytics.vertex_buffers, 0);
    }
}
