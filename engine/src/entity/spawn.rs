//! Character Spawning
//!
//! Populates the town with its walking crowd: one idle greeter at a fixed
//! spot plus a batch of randomized wanderers. Spawn cells are drawn by
//! rejection sampling so no two entities start on the same cell.

use rand::Rng;

use crate::entity::{Entity, simulator::roll_time_to_turn};

/// Fixed greeter cell near the town gate.
pub const GREETER_CELL: (i32, i32) = (80, 56);

/// Default wanderer head count.
pub const CHARACTER_COUNT: usize = 200;

/// Spawn band: the crowd keeps off the map fringes.
pub const SPAWN_MAX_X: i32 = 80;
pub const SPAWN_MIN_Y: i32 = 4;
pub const SPAWN_MAX_Y: i32 = 124;

/// Number of distinct character rows on the sheet.
pub const CHARACTER_KINDS: u8 = 9;

/// Append the greeter and `count` wanderers to `entities`.
///
/// Existing entities (props from the map decode) block spawn cells too.
pub fn spawn_characters<R: Rng>(entities: &mut Vec<Entity>, count: usize, now_ms: u64, rng: &mut R) {
    entities.push(Entity::new_idle_character(
        GREETER_CELL.0,
        GREETER_CELL.1,
        0,
        now_ms,
    ));

    for _ in 0..count {
        let (x, y) = loop {
            let x = rng.gen_range(0..=SPAWN_MAX_X);
            let y = rng.gen_range(SPAWN_MIN_Y..=SPAWN_MAX_Y);
            if !entities.iter().any(|e| e.grid_x == x && e.grid_y == y) {
                break (x, y);
            }
        };

        let kind = rng.gen_range(0..CHARACTER_KINDS);
        // Start on the quarter-turn lattice: facing north or south.
        let rotation = rng.gen_range(-1i32..=1) as f32 * std::f32::consts::PI;
        let preference = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        let time_to_turn = roll_time_to_turn(rng);

        entities.push(Entity::new_character(
            x,
            y,
            kind,
            rotation,
            preference,
            time_to_turn,
            now_ms,
        ));
    }

    tracing::info!(count, total = entities.len(), "spawned characters");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_spawn_counts_and_greeter() {
        let mut entities = Vec::new();
        let mut rng = StdRng::seed_from_u64(42);
        spawn_characters(&mut entities, 50, 0, &mut rng);
        assert_eq!(entities.len(), 51);
        assert_eq!((entities[0].grid_x, entities[0].grid_y), GREETER_CELL);
        assert!(entities.iter().all(Entity::is_character));
    }

    #[test]
    fn test_spawn_cells_are_unique_and_in_band() {
        let mut entities = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        spawn_characters(&mut entities, 200, 0, &mut rng);

        let mut cells: Vec<_> = entities.iter().map(|e| (e.grid_x, e.grid_y)).collect();
        cells.sort_unstable();
        let before = cells.len();
        cells.dedup();
        assert_eq!(cells.len(), before, "duplicate spawn cell");

        for e in &entities[1..] {
            assert!((0..=SPAWN_MAX_X).contains(&e.grid_x));
            assert!((SPAWN_MIN_Y..=SPAWN_MAX_Y).contains(&e.grid_y));
        }
    }

    #[test]
    fn test_spawn_respects_occupied_cells() {
        let mut entities = vec![Entity::new_prop(10, 20, 3)];
        let mut rng = StdRng::seed_from_u64(9);
        spawn_characters(&mut entities, 200, 0, &mut rng);
        let on_prop = entities[1..]
            .iter()
            .filter(|e| (e.grid_x, e.grid_y) == (10, 20))
            .count();
        assert_eq!(on_prop, 0);
    }

    #[test]
    fn test_spawn_headings_on_quarter_turn_lattice() {
        let mut entities = Vec::new();
        let mut rng = StdRng::seed_from_u64(3);
        spawn_characters(&mut entities, 100, 0, &mut rng);
        for e in &entities {
            let quarter = e.rotation / std::f32::consts::FRAC_PI_2;
            assert!((quarter - quarter.round()).abs() < 1e-6, "rotation {}", e.rotation);
        }
    }
}
