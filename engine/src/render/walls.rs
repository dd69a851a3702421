//! Wall Extraction
//!
//! Walks the tile grid once at load time and produces per-face instance
//! lists (floor, north, south, west, east) for the instanced wall pipeline.
//! Each instance is a world offset plus a texture-atlas cell offset.
//!
//! A wall bit always emits the face pair for both sides of the edge; which
//! atlas cell each side samples depends on whether the two adjacent tiles
//! are interior or exterior. Out-of-bounds neighbors read as byte 0, i.e.
//! interior, which is what seals the map rim.

use crate::world::tilemap::{
    TILE_SIZE, TileMap, has_north_wall, has_west_wall, is_exterior, is_interior,
};

/// One cell of the 320x384 wall texture atlas (5 columns; outside rows on
/// top, inside rows from row 3 down).
pub const ATLAS_CELL_W: f32 = 64.0 / 320.0;
pub const ATLAS_CELL_H: f32 = 64.0 / 384.0;
const ATLAS_COLUMNS: i32 = 5;
const INSIDE_ROW_OFFSET: f32 = 3.0;

/// Atlas cells for the two parapet variants.
const PARAPET_TILE_FULL: i32 = 0x0b;
const PARAPET_TILE_HALF: i32 = 0x05;

/// Instance data for one face orientation.
#[derive(Debug, Default)]
pub struct FaceInstances {
    pub offsets: Vec<[f32; 3]>,
    pub tex_offsets: Vec<[f32; 2]>,
}

impl FaceInstances {
    fn push(&mut self, offset: [f32; 3], tex: [f32; 2]) {
        self.offsets.push(offset);
        self.tex_offsets.push(tex);
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// The five instance lists the wall pipeline draws.
#[derive(Debug, Default)]
pub struct WallInstances {
    pub floor: FaceInstances,
    pub north: FaceInstances,
    pub south: FaceInstances,
    pub west: FaceInstances,
    pub east: FaceInstances,
}

impl WallInstances {
    pub fn total(&self) -> usize {
        self.floor.len() + self.north.len() + self.south.len() + self.west.len() + self.east.len()
    }
}

/// Atlas cell origin for an outside-face tile index.
fn outside_uv(tile: i32) -> [f32; 2] {
    [
        (tile % ATLAS_COLUMNS) as f32 * ATLAS_CELL_W,
        (tile as f32 / ATLAS_COLUMNS as f32).floor() * ATLAS_CELL_H,
    ]
}

/// Atlas cell origin for an inside-face tile index (rows shifted down).
fn inside_uv(tile: i32) -> [f32; 2] {
    [
        (tile % ATLAS_COLUMNS) as f32 * ATLAS_CELL_W,
        (INSIDE_ROW_OFFSET + (tile as f32 / ATLAS_COLUMNS as f32).floor()) * ATLAS_CELL_H,
    ]
}

/// Extract every wall/floor instance from the map.
pub fn extract_wall_instances(map: &TileMap) -> WallInstances {
    let mut out = WallInstances::default();

    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let current = map.tile(x, y).unwrap_or(0);
            let up = map.tile(x, y - 1).unwrap_or(0);
            let left = map.tile(x - 1, y).unwrap_or(0);
            let texture = map.texture(x, y).unwrap_or(0);
            let height = map.height_bits(x, y).unwrap_or(0);

            let ground = [-(x as f32) * TILE_SIZE, 0.0, -(y as f32) * TILE_SIZE];
            let upper = [ground[0], -TILE_SIZE, ground[2]];

            let outside = (texture & 0x0f) as i32;
            let inside = ((texture >> 4) & 0x0f) as i32;
            let tile_o = outside - 1;
            let tile_i = inside - 1;
            let tile_h = if height & 0x01 != 0 && height & 0x02 != 0 {
                tile_o
            } else if height & 0x02 != 0 {
                PARAPET_TILE_FULL
            } else {
                PARAPET_TILE_HALF
            };

            let uv_o = outside_uv(tile_o);
            let uv_i = inside_uv(tile_i);
            let uv_h = outside_uv(tile_h);

            // Floor, skipped for cells flagged open-to-below; interior
            // cells also get a ceiling-level copy.
            if current & 0x03 != 2 {
                let floor_uv = [
                    if is_exterior(current) { 0.0 } else { 4.0 * ATLAS_CELL_W },
                    0.0,
                ];
                out.floor.push(ground, floor_uv);
                if current & 0x01 == 0 {
                    out.floor.push(upper, floor_uv);
                }
            }

            if has_north_wall(current) {
                let open = (is_exterior(current) && outside == 0)
                    || (is_interior(current) && inside == 0 && !is_exterior(up));
                if !open {
                    let (n_uv, s_uv) = match (is_exterior(current), is_exterior(up)) {
                        (true, false) => (uv_i, uv_o),
                        (true, true) => (uv_o, uv_o),
                        (false, true) => (uv_o, uv_i),
                        (false, false) => (uv_i, uv_i),
                    };
                    out.north.push(ground, n_uv);
                    out.south.push(ground, s_uv);
                }
                if height & 0x03 != 0 {
                    out.north.push(upper, uv_h);
                    out.south.push(upper, uv_h);
                }
            }

            if has_west_wall(current) {
                let open = (is_exterior(current) && outside == 0)
                    || (is_interior(current) && inside == 0 && !is_exterior(left));
                if !open {
                    let (w_uv, e_uv) = match (is_exterior(current), is_exterior(left)) {
                        (true, false) => (uv_i, uv_o),
                        (true, true) => (uv_o, uv_o),
                        (false, true) => (uv_o, uv_i),
                        (false, false) => (uv_i, uv_i),
                    };
                    out.west.push(ground, w_uv);
                    out.east.push(ground, e_uv);
                }
                if height & 0x03 != 0 {
                    out.west.push(upper, uv_h);
                    out.east.push(upper, uv_h);
                }
            }
        }
    }

    tracing::debug!(
        floor = out.floor.len(),
        north = out.north.len(),
        west = out.west.len(),
        "extracted wall instances"
    );
    out
}
