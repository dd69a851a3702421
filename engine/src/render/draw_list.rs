//! Draw List
//!
//! The per-frame snapshot of everything the GPU backend needs: the camera's
//! projection-view matrix for the walls, and a depth-sorted billboard list.
//!
//! Billboards blend with alpha, so they draw farthest-first. The key is the
//! camera-space depth baked into the projection-view-model matrix; sorting
//! happens here so the backend stays a dumb executor.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::entity::{Entity, SpriteSheet};

/// One billboard to draw this frame.
#[derive(Debug, Clone, Copy)]
pub struct BillboardDraw {
    pub projection_view_model: Mat4,
    pub uv: Vec4,
    pub tint: Vec3,
    pub sheet: SpriteSheet,
}

/// Everything the renderer consumes for one frame.
#[derive(Default)]
pub struct DrawList {
    pub projection_view: Mat4,
    pub billboards: Vec<BillboardDraw>,
}

impl DrawList {
    /// Rebuild the list in place, reusing the billboard allocation.
    pub fn rebuild(&mut self, camera: &Camera, entities: &[Entity]) {
        self.projection_view = camera.projection_view;
        self.billboards.clear();
        self.billboards.extend(entities.iter().map(|e| BillboardDraw {
            projection_view_model: e.projection_view_model,
            uv: e.uv,
            tint: e.tint,
            sheet: e.sheet,
        }));
        // Farthest first. The projected depth lives in the w-axis z of the
        // combined matrix.
        self.billboards.sort_by(|a, b| {
            b.projection_view_model
                .w_axis
                .z
                .total_cmp(&a.projection_view_model.w_axis.z)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;
    use crate::world::tilemap::{TileMap, data_offset};

    fn open_map(width: u32, height: u32) -> TileMap {
        let size = (width * height * 4) as usize;
        let mut tiles = vec![0u8; size];
        for y in 0..height {
            for x in 0..width {
                tiles[data_offset(x, y, width)] = 0x01;
            }
        }
        TileMap::new(width, height, tiles, vec![0u8; size], vec![0u8; size])
    }

    #[test]
    fn test_billboards_sorted_farthest_first() {
        let map = open_map(16, 16);
        let mut camera = Camera::new(Vec3::new(-8.0 * 64.0, 0.0, -8.0 * 64.0), 0.0);
        camera.update(&Input::default(), &map);

        // Camera looks toward -Z; the prop at higher grid y is farther.
        let mut near = Entity::new_prop(8, 10, 2);
        let mut far = Entity::new_prop(8, 14, 3);
        for e in [&mut near, &mut far] {
            e.model = Mat4::from_translation(e.position) * camera.rotation;
            e.projection_view_model = camera.projection_view * e.model;
        }

        let mut list = DrawList::default();
        list.rebuild(&camera, &[near.clone(), far.clone()]);
        assert_eq!(list.billboards.len(), 2);
        assert_eq!(list.billboards[0].uv, far.uv);
        assert_eq!(list.billboards[1].uv, near.uv);

        // Input order does not matter.
        list.rebuild(&camera, &[far.clone(), near.clone()]);
        assert_eq!(list.billboards[0].uv, far.uv);
    }
}
