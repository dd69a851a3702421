//! Map Atlas Decoder
//!
//! The town ships as one RGBA image holding three equally sized grids side
//! by side: tiles, wall textures, heights. Decoding slices the three grids
//! apart (keeping the RGBA stride) and emits a prop entity for every cell
//! whose tile byte carries a sprite kind.

use thiserror::Error;

use crate::entity::Entity;
use crate::world::tilemap::{TileMap, data_offset, sprite_kind};

/// Number of side-by-side channel grids in the atlas.
const CHANNEL_GRIDS: u32 = 3;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map atlas is {atlas_w}x{atlas_h}, need at least {need_w}x{need_h} for a {tiles_w}x{tiles_h} grid")]
    AtlasTooSmall {
        atlas_w: u32,
        atlas_h: u32,
        need_w: u32,
        need_h: u32,
        tiles_w: u32,
        tiles_h: u32,
    },
    #[error("map atlas pixel data is {actual} bytes, expected {expected} for {atlas_w}x{atlas_h} RGBA")]
    PixelDataTruncated {
        actual: usize,
        expected: usize,
        atlas_w: u32,
        atlas_h: u32,
    },
}

/// Result of decoding the atlas: the grid plus the props embedded in it.
#[derive(Debug)]
pub struct DecodedMap {
    pub map: TileMap,
    pub props: Vec<Entity>,
}

/// Decode a `width x height` tile grid out of an RGBA atlas image.
///
/// The atlas lays the tile grid, the texture grid and the height grid left
/// to right, so it must be at least `3 * width` pixels wide. Only the red
/// component of each pixel is meaningful, but the full RGBA stride is kept
/// so cell offsets match the source image.
pub fn decode_ground_atlas(
    pixels: &[u8],
    atlas_w: u32,
    atlas_h: u32,
    width: u32,
    height: u32,
) -> Result<DecodedMap, MapError> {
    let need_w = width * CHANNEL_GRIDS;
    if atlas_w < need_w || atlas_h < height {
        return Err(MapError::AtlasTooSmall {
            atlas_w,
            atlas_h,
            need_w,
            need_h: height,
            tiles_w: width,
            tiles_h: height,
        });
    }
    let expected = (atlas_w * atlas_h * 4) as usize;
    if pixels.len() != expected {
        return Err(MapError::PixelDataTruncated {
            actual: pixels.len(),
            expected,
            atlas_w,
            atlas_h,
        });
    }

    let mut tiles = vec![0u8; (width * height * 4) as usize];
    let mut textures = tiles.clone();
    let mut heights = tiles.clone();
    let mut props = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let dst = data_offset(x, y, width);
            let src = |grid: u32| ((y * atlas_w + grid * width + x) * 4) as usize;

            tiles[dst..dst + 4].copy_from_slice(&pixels[src(0)..src(0) + 4]);
            textures[dst..dst + 4].copy_from_slice(&pixels[src(1)..src(1) + 4]);
            heights[dst..dst + 4].copy_from_slice(&pixels[src(2)..src(2) + 4]);

            let sprite = sprite_kind(tiles[dst]);
            if sprite > 0 {
                props.push(Entity::new_prop(x as i32, y as i32, sprite));
            }
        }
    }

    tracing::debug!(
        width,
        height,
        props = props.len(),
        "decoded map atlas"
    );

    Ok(DecodedMap {
        map: TileMap::new(width, height, tiles, textures, heights),
        props,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PROP_CELL_H;

    /// Atlas with three 4x2 grids; `cells` writes red bytes as
    /// `(grid, x, y, value)`.
    fn atlas(cells: &[(u32, u32, u32, u8)]) -> Vec<u8> {
        let (w, h) = (12u32, 2u32);
        let mut pixels = vec![0u8; (w * h * 4) as usize];
        for &(grid, x, y, value) in cells {
            pixels[((y * w + grid * 4 + x) * 4) as usize] = value;
        }
        pixels
    }

    #[test]
    fn test_decode_splits_channel_grids() {
        let pixels = atlas(&[(0, 1, 0, 0x01), (1, 1, 0, 0x25), (2, 1, 0, 0x03)]);
        let decoded = decode_ground_atlas(&pixels, 12, 2, 4, 2).unwrap();
        assert_eq!(decoded.map.tile(1, 0), Some(0x01));
        assert_eq!(decoded.map.texture(1, 0), Some(0x25));
        assert_eq!(decoded.map.height_bits(1, 0), Some(0x03));
        // Neighboring cells stay untouched.
        assert_eq!(decoded.map.tile(2, 0), Some(0));
        assert_eq!(decoded.map.texture(2, 0), Some(0));
    }

    #[test]
    fn test_decode_emits_props_for_sprite_cells() {
        // Sprite kind 3 (bits 2-4) on an exterior tile at (2, 1).
        let tile = 0x01 | (3 << 2);
        let pixels = atlas(&[(0, 2, 1, tile)]);
        let decoded = decode_ground_atlas(&pixels, 12, 2, 4, 2).unwrap();
        assert_eq!(decoded.props.len(), 1);
        let prop = &decoded.props[0];
        assert_eq!((prop.grid_x, prop.grid_y), (2, 1));
        // Kind 3 maps to sheet row 1.
        assert!((prop.uv.y - PROP_CELL_H).abs() < 1e-6);
        assert_eq!(prop.position.x, -2.0 * 64.0);
        assert_eq!(prop.position.z, -1.0 * 64.0);
    }

    #[test]
    fn test_decode_rejects_narrow_atlas() {
        let pixels = vec![0u8; 8 * 2 * 4];
        let err = decode_ground_atlas(&pixels, 8, 2, 4, 2).unwrap_err();
        assert!(matches!(err, MapError::AtlasTooSmall { need_w: 12, .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_pixels() {
        let pixels = vec![0u8; 10];
        let err = decode_ground_atlas(&pixels, 12, 2, 4, 2).unwrap_err();
        assert!(matches!(err, MapError::PixelDataTruncated { .. }));
    }
}
