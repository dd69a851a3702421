//! Tile Map
//!
//! The town is a grid of packed bytes decoded from the map atlas image.
//! Three parallel channels describe each cell:
//!
//! - `tiles`:    bit0 = exterior, bit1 = no-floor marker, bits2-4 = prop
//!   sprite kind, bit5 = north wall, bit6 = west wall
//! - `textures`: low nibble = outside wall texture index + 1, high nibble =
//!   inside wall texture index + 1, 0 = open (no wall texture)
//! - `heights`:  bit0 / bit1 = second-floor and parapet flags
//!
//! Each channel keeps the RGBA layout of the source image, so a cell's byte
//! lives at `(y * width + x) * 4` and only the red component matters. The
//! map is immutable once decoded; the simulation only reads it.

/// World-space edge length of one tile.
pub const TILE_SIZE: f32 = 64.0;
/// Half a tile; the rounding offset when converting world to grid space.
pub const HALF_TILE: f32 = 32.0;

/// Convert one world-space coordinate to a tile coordinate.
///
/// Grid coordinates grow as world coordinates shrink; the map was authored
/// with tiles at `(-x * TILE_SIZE, -y * TILE_SIZE)`.
#[inline]
pub fn tile_coord(world: f32) -> i32 {
    ((-world + HALF_TILE) / TILE_SIZE).floor() as i32
}

/// Byte offset of a cell inside an RGBA channel grid.
#[inline]
pub fn data_offset(x: u32, y: u32, width: u32) -> usize {
    ((y * width + x) * 4) as usize
}

/// Is the cell an exterior (street) tile?
#[inline]
pub fn is_exterior(tile: u8) -> bool {
    tile & 0x01 != 0
}

/// Is the cell an interior (building) tile?
#[inline]
pub fn is_interior(tile: u8) -> bool {
    !is_exterior(tile)
}

/// Does the cell carry a wall on its north edge?
#[inline]
pub fn has_north_wall(tile: u8) -> bool {
    (tile >> 5) & 0x01 != 0
}

/// Does the cell carry a wall on its west edge?
#[inline]
pub fn has_west_wall(tile: u8) -> bool {
    (tile >> 6) & 0x01 != 0
}

/// Prop sprite kind occupying the cell; 0 means none, otherwise the sprite
/// sheet row is `kind - 2`.
#[inline]
pub fn sprite_kind(tile: u8) -> u8 {
    (tile >> 2) & 0x07
}

/// Decoded inside-face wall texture index; -1 means "no texture" (open).
#[inline]
pub fn inside_texture(texture: u8) -> i32 {
    (((texture >> 4) & 0x0f) as i32) - 1
}

/// Decoded outside-face wall texture index; -1 means "no texture" (open).
#[inline]
pub fn outside_texture(texture: u8) -> i32 {
    ((texture & 0x0f) as i32) - 1
}

/// Immutable tile grid shared by collision, AI and wall extraction.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
    textures: Vec<u8>,
    heights: Vec<u8>,
}

impl TileMap {
    /// Build a map from three RGBA channel grids of `width * height` cells.
    ///
    /// The decode layer validates lengths before constructing; the invariant
    /// is asserted here in debug builds only.
    pub fn new(
        width: u32,
        height: u32,
        tiles: Vec<u8>,
        textures: Vec<u8>,
        heights: Vec<u8>,
    ) -> Self {
        let expected = (width * height * 4) as usize;
        debug_assert_eq!(tiles.len(), expected);
        debug_assert_eq!(textures.len(), expected);
        debug_assert_eq!(heights.len(), expected);
        Self {
            width,
            height,
            tiles,
            textures,
            heights,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn cell(&self, channel: &[u8], x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(channel[data_offset(x as u32, y as u32, self.width)])
    }

    /// Packed tile byte at a grid cell, `None` when out of bounds.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<u8> {
        self.cell(&self.tiles, x, y)
    }

    /// Packed texture byte at a grid cell, `None` when out of bounds.
    #[inline]
    pub fn texture(&self, x: i32, y: i32) -> Option<u8> {
        self.cell(&self.textures, x, y)
    }

    /// Packed height byte at a grid cell, `None` when out of bounds.
    #[inline]
    pub fn height_bits(&self, x: i32, y: i32) -> Option<u8> {
        self.cell(&self.heights, x, y)
    }

    /// Tile and texture bytes together; collision reads both per lookup.
    #[inline]
    pub fn tile_and_texture(&self, x: i32, y: i32) -> Option<(u8, u8)> {
        Some((self.tile(x, y)?, self.texture(x, y)?))
    }
}
