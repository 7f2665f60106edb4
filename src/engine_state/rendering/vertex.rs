//! Vertex data structures and layouts for chunk meshes.
//!
//! This module defines the vertex format emitted by the greedy mesher and the
//! `wgpu` layout describing it to a vertex shader.

use cgmath::Point3;

/// A vertex of a block face quad.
///
/// Texture coordinates are in tile units, so a merged 3x2 quad spans `0..3` by
/// `0..2` and the shader repeats the tile found at `texture_base` instead of
/// stretching it.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Base: [f32; 2] (8 bytes)
///
/// Total size: 28 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockFaceVertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Tile-unit texture coordinates
    pub tex_coord: [f32; 2],
    /// Top-left of the tile inside its atlas (normalized)
    pub texture_base: [f32; 2],
}

impl BlockFaceVertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local position of the vertex
    /// * `tex_coord` - Texture coordinates in tile units
    /// * `texture_base` - Atlas origin of the tile
    pub fn new(position: Point3<i32>, tex_coord: [f32; 2], texture_base: [f32; 2]) -> Self {
        BlockFaceVertex {
            position: [position.x as f32, position.y as f32, position.z as f32],
            tex_coord,
            texture_base,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coord (vec2<f32>)
    /// - `location = 2`: texture_base (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlockFaceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
