//! Rendering
//!
//! CPU side: wall instance extraction and the per-frame draw list.
//! GPU side: the wgpu pipelines that consume them. Everything above this
//! module is renderer-agnostic; only [`pipeline`] touches the GPU.

pub mod draw_list;
pub mod pipeline;
pub mod uniforms;
pub mod walls;

pub use draw_list::{BillboardDraw, DrawList};
pub use pipeline::{RenderState, SheetImage};
pub use walls::{WallInstances, extract_wall_instances};
