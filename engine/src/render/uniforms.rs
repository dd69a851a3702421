//! GPU Data Layout
//!
//! Pod structs shared with the WGSL shaders plus the canonical quad
//! geometry for tile faces and billboards. Struct layouts must match the
//! shader structs exactly.

use crate::render::walls::{ATLAS_CELL_H, ATLAS_CELL_W};

/// One corner of a tile face or billboard quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl FaceVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FaceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-instance payload for the wall pipeline: world offset of the tile
/// plus the atlas cell origin.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileInstance {
    pub offset: [f32; 3],
    pub tex_offset: [f32; 2],
}

impl TileInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Uniforms for the wall pipeline.
///
/// WGSL layout: mat4x4 (64 bytes) + vec4 (16 bytes) = 80 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WallUniforms {
    pub projection_view: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

/// Per-billboard uniforms, written at a dynamic offset per draw.
///
/// WGSL layout: mat4x4 + vec4 + vec4 = 96 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardUniforms {
    pub projection_view_model: [[f32; 4]; 4],
    /// UV rectangle origin (xy) and signed extent (zw).
    pub uv_rect: [f32; 4],
    pub tint: [f32; 4],
}

/// Two triangles over a four-vertex quad.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const fn v(x: f32, y: f32, z: f32, u_cells: f32, v_cells: f32) -> FaceVertex {
    FaceVertex {
        position: [x, y, z],
        tex_coords: [u_cells * ATLAS_CELL_W, v_cells * ATLAS_CELL_H],
    }
}

/// Tile face quads in tile-local space. Positions were hand-verified
/// against the atlas orientation; the base tex coords address one atlas
/// cell and instances shift them to the right cell.
pub const FLOOR_FACE: [FaceVertex; 4] = [
    v(-32.0, 32.0, -32.0, 0.0, 2.0),
    v(-32.0, 32.0, 32.0, 1.0, 2.0),
    v(32.0, 32.0, 32.0, 1.0, 3.0),
    v(32.0, 32.0, -32.0, 0.0, 3.0),
];

pub const NORTH_FACE: [FaceVertex; 4] = [
    v(-32.0, -32.0, 32.0, 0.0, 0.0),
    v(-32.0, 32.0, 32.0, 0.0, 1.0),
    v(32.0, 32.0, 32.0, 1.0, 1.0),
    v(32.0, -32.0, 32.0, 1.0, 0.0),
];

pub const SOUTH_FACE: [FaceVertex; 4] = [
    v(-32.0, -32.0, 32.0, 0.0, 0.0),
    v(32.0, -32.0, 32.0, 1.0, 0.0),
    v(32.0, 32.0, 32.0, 1.0, 1.0),
    v(-32.0, 32.0, 32.0, 0.0, 1.0),
];

pub const EAST_FACE: [FaceVertex; 4] = [
    v(32.0, -32.0, -32.0, 0.0, 0.0),
    v(32.0, 32.0, -32.0, 0.0, 1.0),
    v(32.0, 32.0, 32.0, 1.0, 1.0),
    v(32.0, -32.0, 32.0, 1.0, 0.0),
];

pub const WEST_FACE: [FaceVertex; 4] = [
    v(32.0, -32.0, -32.0, 0.0, 0.0),
    v(32.0, -32.0, 32.0, 1.0, 0.0),
    v(32.0, 32.0, 32.0, 1.0, 1.0),
    v(32.0, 32.0, -32.0, 0.0, 1.0),
];

/// Billboard quad with unit UVs; the shader maps them through the
/// per-entity UV rectangle.
pub const BILLBOARD_FACE: [FaceVertex; 4] = [
    FaceVertex { position: [-32.0, -32.0, 0.0], tex_coords: [0.0, 0.0] },
    FaceVertex { position: [32.0, -32.0, 0.0], tex_coords: [1.0, 0.0] },
    FaceVertex { position: [32.0, 32.0, 0.0], tex_coords: [1.0, 1.0] },
    FaceVertex { position: [-32.0, 32.0, 0.0], tex_coords: [0.0, 1.0] },
];
