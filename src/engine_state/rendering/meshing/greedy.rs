//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same texture into larger quads, significantly reducing the number of
//! vertices and draw calls needed to render a voxel world.
//!
//! Each chunk is swept once per depth slice and face direction. Within a sweep the
//! slice is a 16x16 grid of `(i, j)` cells; rectangles grow along `i` first, then
//! row by row along `j`, and stop at the first hidden face or texture change.

use std::collections::BTreeMap;

use bitvec::prelude::*;
use cgmath::{ElementWise, EuclideanSpace, Point3};
use log::trace;

use crate::engine_state::buffer_state::BufferAllocator;
use crate::engine_state::rendering::texture::{AtlasRegion, TextureRegistry};
use crate::engine_state::rendering::vertex::BlockFaceVertex;
use crate::engine_state::voxels::block::block_face::BlockFace;
use crate::engine_state::voxels::block::{BlockRegistry, DEFAULT_TEXTURE};
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};
use crate::error::Result;

use super::buffer_generator::{BufferGenerator, Topology};
use super::mesh::{plane_offset, BuiltMesh, ChunkMesh, MeshPart, MeshQuad, MeshStats};

const SLICE_CELLS: usize = CHUNK_PLANE_SIZE as usize;

/// Texture of every face drawn in one sweep, `None` where the face is hidden.
type Slice = [Option<AtlasRegion>; SLICE_CELLS];

fn cell(i: i32, j: i32) -> usize {
    (i + j * CHUNK_DIMENSION) as usize
}

/// Chunk-local cell at sweep coordinates `(i, j)` in the slice `depth` of `face`.
fn get_position(face: BlockFace, depth: i32, i: i32, j: i32) -> Point3<i32> {
    let [x, y, z] = plane_offset(face, i, j);
    let normal = face.normal().map(i32::abs);
    Point3::new(x + normal.x * depth, y + normal.y * depth, z + normal.z * depth)
}

/// Corners of `quad` in the order `a b c d`:
///
/// ```text
/// a - b
/// |   |
/// c - d
/// ```
///
/// seen from outside the face, with `a b` along the face's up edge.
fn quad_vertices(quad: &MeshQuad) -> [BlockFaceVertex; 4] {
    let face = quad.face;
    let normal = face.normal();
    let up = face.up();
    let cross = normal.cross(up);
    let abs_cross = cross.map(i32::abs);

    let [len_i, len_j] = quad.size;
    let size = get_position(face, 0, len_i, len_j).to_vec();

    let mut top_right = quad.origin + ((abs_cross + cross) / 2 + up).mul_element_wise(size);
    if face.is_positive() {
        top_right = top_right + normal;
    }

    let corner = |u: i32, v: i32| {
        let offset = (cross * -(1 - u) + up * -v).mul_element_wise(size);
        BlockFaceVertex::new(
            top_right + offset,
            [((1 - u) * len_i) as f32, (v * len_j) as f32],
            quad.region.uv,
        )
    };

    [corner(0, 0), corner(1, 0), corner(0, 1), corner(1, 1)]
}

/// Turns chunks into renderable meshes.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMeshGenerator;

impl GreedyMeshGenerator {
    /// Builds the mesh of `chunk`, allocating its buffers through `allocator`.
    ///
    /// Chunks without blocks, or without any visible face, produce
    /// [`ChunkMesh::Empty`]. With `lines` set the same rectangles are also
    /// emitted as outlines into [`BuiltMesh::line_parts`].
    pub fn create<A: BufferAllocator>(
        chunk: &Chunk,
        blocks: &BlockRegistry,
        textures: &TextureRegistry,
        allocator: &A,
        lines: bool,
    ) -> Result<ChunkMesh<A::Buffer>> {
        if chunk.is_empty() {
            return Ok(ChunkMesh::Empty);
        }

        let quads = Self::compute_quads(chunk, blocks, textures)?;
        if quads.is_empty() {
            return Ok(ChunkMesh::Empty);
        }

        let mut stats = MeshStats::default();
        let mut fills: BTreeMap<u32, (BufferGenerator, [f32; 2])> = BTreeMap::new();
        let mut outlines: BTreeMap<u32, (BufferGenerator, [f32; 2])> = BTreeMap::new();

        for quad in &quads {
            stats.quads_per_face[quad.face.index()] += 1;
            let [a, b, c, d] = quad_vertices(quad);
            let atlas = quad.region.id.atlas;

            fills
                .entry(atlas)
                .or_insert_with(|| (BufferGenerator::new(Topology::Triangles), quad.region.uv_size))
                .0
                .add_quad(a, b, c, d);

            if lines {
                outlines
                    .entry(atlas)
                    .or_insert_with(|| (BufferGenerator::new(Topology::Lines), quad.region.uv_size))
                    .0
                    .add_quad(a, b, c, d);
            }
        }

        let position = chunk.position();
        let parts = Self::build_parts(fills, allocator, position);
        let line_parts = Self::build_parts(outlines, allocator, position);
        stats.primitive_count = parts.iter().map(|part| part.primitive_count).sum();

        trace!(
            "Meshed chunk {:?}: {} quads in {} parts",
            position,
            quads.len(),
            parts.len()
        );

        Ok(ChunkMesh::Built(BuiltMesh {
            position,
            world_origin: chunk.world_position(),
            parts,
            line_parts,
            quads,
            stats,
        }))
    }

    fn build_parts<A: BufferAllocator>(
        generators: BTreeMap<u32, (BufferGenerator, [f32; 2])>,
        allocator: &A,
        position: Point3<i32>,
    ) -> Vec<MeshPart<A::Buffer>> {
        generators
            .into_iter()
            .filter(|(_, (generator, _))| !generator.is_empty())
            .map(|(atlas, (generator, uv_size))| {
                let label = format!(
                    "Chunk ({}, {}, {}) Atlas {} {:?}",
                    position.x,
                    position.y,
                    position.z,
                    atlas,
                    generator.topology()
                );
                let (vertex_buffer, index_buffer) = generator.build(allocator, &label);
                MeshPart {
                    atlas,
                    uv_size,
                    topology: generator.topology(),
                    vertex_buffer,
                    index_buffer,
                    index_count: generator.indices().len() as u32,
                    primitive_count: generator.primitive_count(),
                }
            })
            .collect()
    }

    /// Runs every sweep and returns the merged rectangles, without touching
    /// any buffers.
    pub fn compute_quads(
        chunk: &Chunk,
        blocks: &BlockRegistry,
        textures: &TextureRegistry,
    ) -> Result<Vec<MeshQuad>> {
        let mut quads = Vec::new();
        if chunk.is_empty() {
            return Ok(quads);
        }

        let mut visited = bitvec![u64, Lsb0; 0; SLICE_CELLS];

        for depth in 0..CHUNK_DIMENSION {
            for face in BlockFace::all() {
                let slice = Self::slice(chunk, blocks, textures, face, depth)?;
                visited.fill(false);
                Self::sweep(&slice, &mut visited, face, depth, &mut quads);
            }
        }

        Ok(quads)
    }

    fn slice(
        chunk: &Chunk,
        blocks: &BlockRegistry,
        textures: &TextureRegistry,
        face: BlockFace,
        depth: i32,
    ) -> Result<Slice> {
        let mut slice: Slice = [None; SLICE_CELLS];

        for j in 0..CHUNK_DIMENSION {
            for i in 0..CHUNK_DIMENSION {
                let position = get_position(face, depth, i, j);
                if !chunk.visible_faces(position)?.contains(face) {
                    continue;
                }

                let state = chunk.get_block(position)?;
                let name = blocks.texture(&state, face).unwrap_or(DEFAULT_TEXTURE);
                slice[cell(i, j)] = Some(*textures.get(name)?);
            }
        }

        Ok(slice)
    }

    fn sweep(
        slice: &Slice,
        visited: &mut BitVec<u64, Lsb0>,
        face: BlockFace,
        depth: i32,
        quads: &mut Vec<MeshQuad>,
    ) {
        for j in 0..CHUNK_DIMENSION {
            for i in 0..CHUNK_DIMENSION {
                let index = cell(i, j);
                if visited[index] {
                    continue;
                }

                let Some(seed) = slice[index] else {
                    visited.set(index, true);
                    continue;
                };

                let mut max_i = i;
                while max_i + 1 < CHUNK_DIMENSION {
                    let next = cell(max_i + 1, j);
                    if visited[next] {
                        break;
                    }
                    match slice[next] {
                        None => {
                            visited.set(next, true);
                            break;
                        }
                        Some(region) if region.id != seed.id => break,
                        Some(_) => max_i += 1,
                    }
                }

                let mut max_j = j;
                'rows: while max_j + 1 < CHUNK_DIMENSION {
                    let row = max_j + 1;
                    for column in i..=max_i {
                        let next = cell(column, row);
                        if visited[next] {
                            break 'rows;
                        }
                        match slice[next] {
                            None => {
                                visited.set(next, true);
                                break 'rows;
                            }
                            Some(region) if region.id != seed.id => break 'rows,
                            Some(_) => {}
                        }
                    }
                    max_j = row;
                }

                for row in j..=max_j {
                    for column in i..=max_i {
                        visited.set(cell(column, row), true);
                    }
                }

                quads.push(MeshQuad {
                    face,
                    origin: get_position(face, depth, i, j),
                    size: [max_i - i + 1, max_j - j + 1],
                    region: seed,
                });
            }
        }
    }
}
