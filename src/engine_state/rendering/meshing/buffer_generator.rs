//! Accumulates quad geometry for one atlas and turns it into buffers.
//!
//! Quads are given as four corners:
//!
//! ```text
//! a - b
//! |   |
//! c - d
//! ```
//!
//! Filled quads become the triangles `a b c` and `c b d` (counter-clockwise
//! seen from the front). Outline quads become five line segments: the four
//! edges plus the `b c` diagonal the triangles share.

use crate::engine_state::buffer_state::{BufferAllocator, BufferKind};
use crate::engine_state::rendering::vertex::BlockFaceVertex;

/// How the indices of a [`BufferGenerator`] are meant to be drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

impl Topology {
    /// Primitives emitted per quad.
    pub fn primitives_per_quad(self) -> u32 {
        match self {
            Topology::Triangles => 2,
            Topology::Lines => 5,
        }
    }

    /// Indices emitted per quad.
    pub fn indices_per_quad(self) -> usize {
        match self {
            Topology::Triangles => 6,
            Topology::Lines => 10,
        }
    }

    pub fn primitive_topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

/// Vertex and index lists under construction.
#[derive(Debug, Clone)]
pub struct BufferGenerator {
    topology: Topology,
    vertices: Vec<BlockFaceVertex>,
    indices: Vec<u32>,
    primitive_count: u32,
}

impl BufferGenerator {
    pub fn new(topology: Topology) -> Self {
        BufferGenerator {
            topology,
            vertices: Vec::new(),
            indices: Vec::new(),
            primitive_count: 0,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Adds one quad in this generator's topology.
    pub fn add_quad(
        &mut self,
        a: BlockFaceVertex,
        b: BlockFaceVertex,
        c: BlockFaceVertex,
        d: BlockFaceVertex,
    ) {
        match self.topology {
            Topology::Triangles => self.add_face(a, b, c, d),
            Topology::Lines => self.add_face_lines(a, b, c, d),
        }
    }

    fn push_corners(&mut self, corners: [BlockFaceVertex; 4]) -> u32 {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        start
    }

    fn add_face(&mut self, a: BlockFaceVertex, b: BlockFaceVertex, c: BlockFaceVertex, d: BlockFaceVertex) {
        let start = self.push_corners([a, b, c, d]);
        self.indices
            .extend([0, 1, 2, 2, 1, 3].map(|offset| start + offset));
        self.primitive_count += 2;
    }

    fn add_face_lines(
        &mut self,
        a: BlockFaceVertex,
        b: BlockFaceVertex,
        c: BlockFaceVertex,
        d: BlockFaceVertex,
    ) {
        let start = self.push_corners([a, b, c, d]);
        self.indices
            .extend([0, 1, 1, 3, 3, 2, 2, 0, 1, 2].map(|offset| start + offset));
        self.primitive_count += 5;
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn primitive_count(&self) -> u32 {
        self.primitive_count
    }

    pub fn vertices(&self) -> &[BlockFaceVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.primitive_count = 0;
    }

    /// Uploads the accumulated data through `allocator`.
    ///
    /// # Returns
    /// `(vertex_buffer, index_buffer)`
    pub fn build<A: BufferAllocator>(&self, allocator: &A, label: &str) -> (A::Buffer, A::Buffer) {
        let vertex_buffer = allocator.allocate(
            &format!("{} Vertex Buffer", label),
            BufferKind::Vertex,
            bytemuck::cast_slice(&self.vertices),
        );
        let index_buffer = allocator.allocate(
            &format!("{} Index Buffer", label),
            BufferKind::Index,
            bytemuck::cast_slice(&self.indices),
        );
        (vertex_buffer, index_buffer)
    }
}
