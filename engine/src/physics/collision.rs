//! Grid Collision Resolver
//!
//! Axis-aligned collision of a moving point-with-footprint against the tile
//! grid. There is no geometric projection: a desired displacement is tested
//! as-is, then progressively constrained to X-only, Z-only and finally to a
//! full stop. Diagonal movement into a wall therefore degrades to sliding
//! along the clear axis before it ever becomes a dead stop.
//!
//! Wall ownership is asymmetric: a wall bit belongs to the tile on the
//! north/west side of the edge, so crossing an edge toward lower X checks
//! the *current* tile's west wall while crossing toward higher X checks the
//! *neighbor's* west wall (and likewise for Z with north walls).

use glam::Vec3;

use crate::world::tilemap::{TileMap, has_north_wall, has_west_wall, is_exterior, tile_coord};

/// Half extent of the collision footprint around the moving position.
///
/// Deliberately smaller than the half-tile rounding offset (32); the
/// narrower box is part of the tuned movement feel and must not be
/// reconciled with the tile size.
pub const COLLIDER_HALF_EXTENT: f32 = 16.0;

/// Axes along which movement is still permitted during a resolution pass.
///
/// The discriminants are the loop counter of the downgrade sequence:
/// `Both` (3) → `XOnly` (2) → `ZOnly` (1) → `Blocked` (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionAxes {
    Blocked = 0,
    ZOnly = 1,
    XOnly = 2,
    Both = 3,
}

impl CollisionAxes {
    fn from_mode(mode: u8) -> Self {
        match mode {
            3 => CollisionAxes::Both,
            2 => CollisionAxes::XOnly,
            1 => CollisionAxes::ZOnly,
            _ => CollisionAxes::Blocked,
        }
    }
}

/// Outcome of a resolution pass: the surviving axes and the displacement
/// that may actually be applied this frame.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMovement {
    pub axes: CollisionAxes,
    pub displacement: Vec3,
}

/// Does stepping from tile `(cx, cy)` into tile `(nx, ny)` cross a solid
/// X (west/east) boundary?
///
/// Out-of-bounds neighbors always collide. A wall bit with texture nibble 0
/// is an open boundary and does not collide.
pub fn collides_with_x(map: &TileMap, nx: i32, ny: i32, cx: i32, cy: i32) -> bool {
    let Some((ntile, ntex)) = map.tile_and_texture(nx, ny) else {
        return true;
    };
    if nx < cx {
        let Some((ctile, ctex)) = map.tile_and_texture(cx, cy) else {
            return true;
        };
        !is_exterior(ntile) || (has_west_wall(ctile) && ctex & 0x0f != 0)
    } else if nx > cx {
        !is_exterior(ntile) || (has_west_wall(ntile) && ntex & 0x0f != 0)
    } else {
        !is_exterior(ntile)
    }
}

/// Does stepping from tile `(cx, cy)` into tile `(nx, ny)` cross a solid
/// Z (north/south) boundary?
pub fn collides_with_z(map: &TileMap, nx: i32, ny: i32, cx: i32, cy: i32) -> bool {
    let Some((ntile, ntex)) = map.tile_and_texture(nx, ny) else {
        return true;
    };
    if ny < cy {
        let Some((ctile, ctex)) = map.tile_and_texture(cx, cy) else {
            return true;
        };
        !is_exterior(ntile) || (has_north_wall(ctile) && ctex & 0x0f != 0)
    } else if ny > cy {
        !is_exterior(ntile) || (has_north_wall(ntile) && ntex & 0x0f != 0)
    } else {
        !is_exterior(ntile)
    }
}

/// Constrain `velocity` applied at `position` against the tile grid.
///
/// The candidate footprint is a square of `COLLIDER_HALF_EXTENT` around the
/// would-be position; any corner whose tile differs from the current tile is
/// tested for an edge crossing. All four X tests run before any Z test, and
/// the first hit downgrades the axis set and restarts the pass. The loop is
/// structurally bounded at four iterations.
pub fn resolve_movement(position: Vec3, velocity: Vec3, map: &TileMap) -> ResolvedMovement {
    let cx = tile_coord(position.x);
    let cz = tile_coord(position.z);

    let mut mode: u8 = CollisionAxes::Both as u8;
    while mode != 0 {
        let step = match CollisionAxes::from_mode(mode) {
            CollisionAxes::Both => velocity,
            CollisionAxes::XOnly => Vec3::new(velocity.x, 0.0, 0.0),
            CollisionAxes::ZOnly => Vec3::new(0.0, 0.0, velocity.z),
            CollisionAxes::Blocked => break,
        };
        let next = position + step;

        let corners = [
            (next.x - COLLIDER_HALF_EXTENT, next.z - COLLIDER_HALF_EXTENT),
            (next.x + COLLIDER_HALF_EXTENT, next.z - COLLIDER_HALF_EXTENT),
            (next.x - COLLIDER_HALF_EXTENT, next.z + COLLIDER_HALF_EXTENT),
            (next.x + COLLIDER_HALF_EXTENT, next.z + COLLIDER_HALF_EXTENT),
        ];
        let tiles = corners.map(|(x, z)| (tile_coord(x), tile_coord(z)));

        let mut hit = false;
        for &(tx, tz) in &tiles {
            if tx != cx && collides_with_x(map, tx, tz, cx, cz) {
                hit = true;
                break;
            }
        }
        if !hit {
            for &(tx, tz) in &tiles {
                if tz != cz && collides_with_z(map, tx, tz, cx, cz) {
                    hit = true;
                    break;
                }
            }
        }
        if hit {
            mode -= 1;
            continue;
        }
        break;
    }

    let axes = CollisionAxes::from_mode(mode);
    let displacement = match axes {
        CollisionAxes::Both => velocity,
        CollisionAxes::XOnly => Vec3::new(velocity.x, 0.0, 0.0),
        CollisionAxes::ZOnly => Vec3::new(0.0, 0.0, velocity.z),
        CollisionAxes::Blocked => Vec3::ZERO,
    };
    ResolvedMovement { axes, displacement }
}
