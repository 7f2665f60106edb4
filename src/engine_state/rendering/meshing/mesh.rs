//! Built chunk meshes.

use cgmath::Point3;

use crate::engine_state::rendering::texture::AtlasRegion;
use crate::engine_state::voxels::block::block_face::BlockFace;

use super::buffer_generator::Topology;

/// One merged rectangle of visible faces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshQuad {
    pub face: BlockFace,
    /// Chunk-local cell the rectangle starts at.
    pub origin: Point3<i32>,
    /// Extent along the sweep's `i` and `j` axes, in blocks.
    pub size: [i32; 2],
    pub region: AtlasRegion,
}

impl MeshQuad {
    /// Number of unit faces the quad covers.
    pub fn area(&self) -> i32 {
        self.size[0] * self.size[1]
    }

    /// Chunk-local cells the quad covers.
    pub fn cells(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        let [len_i, len_j] = self.size;
        (0..len_j).flat_map(move |j| {
            (0..len_i).map(move |i| {
                let offset = plane_offset(self.face, i, j);
                Point3::new(
                    self.origin.x + offset[0],
                    self.origin.y + offset[1],
                    self.origin.z + offset[2],
                )
            })
        })
    }
}

/// Maps sweep plane coordinates onto the axes perpendicular to `face`'s normal.
pub(crate) fn plane_offset(face: BlockFace, i: i32, j: i32) -> [i32; 3] {
    let normal = face.normal();
    if normal.x != 0 {
        [0, j, i]
    } else if normal.y != 0 {
        [i, 0, j]
    } else {
        [i, j, 0]
    }
}

/// Buffers for all quads textured from one atlas.
#[derive(Debug)]
pub struct MeshPart<B> {
    pub atlas: u32,
    /// Size of one atlas tile, for the shader to wrap tiled coordinates.
    pub uv_size: [f32; 2],
    pub topology: Topology,
    pub vertex_buffer: B,
    pub index_buffer: B,
    pub index_count: u32,
    pub primitive_count: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MeshStats {
    /// Quads emitted per face, indexed by [`BlockFace::index`].
    pub quads_per_face: [u32; 6],
    /// Triangles across all filled parts.
    pub primitive_count: u32,
}

impl MeshStats {
    pub fn quad_count(&self) -> u32 {
        self.quads_per_face.iter().sum()
    }
}

/// Renderable geometry of one chunk.
#[derive(Debug)]
pub struct BuiltMesh<B> {
    /// Chunk coordinate.
    pub position: Point3<i32>,
    /// World position of the chunk's `(0, 0, 0)` cell. Vertex positions are
    /// relative to it.
    pub world_origin: Point3<i32>,
    pub parts: Vec<MeshPart<B>>,
    /// Outline geometry, only present when line meshes were requested.
    pub line_parts: Vec<MeshPart<B>>,
    pub quads: Vec<MeshQuad>,
    pub stats: MeshStats,
}

/// Result of meshing a chunk.
#[derive(Debug)]
pub enum ChunkMesh<B> {
    /// Nothing to draw.
    Empty,
    Built(BuiltMesh<B>),
}

impl<B> ChunkMesh<B> {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChunkMesh::Empty)
    }

    pub fn built(&self) -> Option<&BuiltMesh<B>> {
        match self {
            ChunkMesh::Empty => None,
            ChunkMesh::Built(mesh) => Some(mesh),
        }
    }

    pub fn quads(&self) -> &[MeshQuad] {
        self.built().map(|mesh| mesh.quads.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> MeshStats {
        self.built().map(|mesh| mesh.stats).unwrap_or_default()
    }
}
