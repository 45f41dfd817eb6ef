#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic food placement system.
//!
//! Listens for the events that leave the board without food and responds with
//! a [`Command::PlaceFood`] for a freshly sampled cell. Sampling is seeded per
//! spawn from the configured base seed, the active level, and a per-level
//! sequence number, so identical runs place identical food.

use std::collections::{HashSet, VecDeque};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use snake3d_core::{
    ActiveLevelView, Cell, Command, Event, FoodKind, GridBounds, LevelIndex, SnakeView, WallView,
};

/// Domain separator mixed into every spawn seed derivation.
const RNG_STREAM_FOOD: &str = "food-spawn";

/// Rejection-sampling attempts before the wall-margin constraint is dropped.
const MAX_MARGIN_TRIES: u32 = 500;

/// Configuration consumed by [`FoodSpawner::new`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
}

impl Config {
    /// Creates a config with the provided base seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Pure system that keeps exactly one food item in play.
#[derive(Debug)]
pub struct FoodSpawner {
    config: Config,
    level: Option<LevelIndex>,
    sequence: u32,
}

impl FoodSpawner {
    /// Creates a spawner with no active level.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            level: None,
            sequence: 0,
        }
    }

    /// Consumes world events and emits placement commands for empty boards.
    pub fn handle(
        &mut self,
        events: &[Event],
        level: &ActiveLevelView,
        snake: &SnakeView,
        walls: &WallView<'_>,
        out_commands: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { index, .. } => {
                    self.level = Some(*index);
                    self.sequence = 0;
                    self.respawn(None, level, snake, walls, out_commands);
                }
                Event::FoodEaten { .. } | Event::FoodPlacementRejected { .. } => {
                    self.respawn(None, level, snake, walls, out_commands);
                }
                // Timed food that ran out is replaced by a plain item.
                Event::FoodExpired { .. } => {
                    self.respawn(Some(FoodKind::Normal), level, snake, walls, out_commands);
                }
                _ => {}
            }
        }
    }

    fn respawn(
        &mut self,
        forced: Option<FoodKind>,
        level: &ActiveLevelView,
        snake: &SnakeView,
        walls: &WallView<'_>,
        out_commands: &mut Vec<Command>,
    ) {
        let Some(active) = self.level else {
            return;
        };
        let sequence = self.sequence;
        self.sequence = self.sequence.saturating_add(1);

        let seed = derive_spawn_seed(self.config.seed, active, sequence);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // Kind is drawn before the cell so both stay stable per seed.
        let kind = forced.unwrap_or_else(|| pick_kind(&mut rng, active));
        if let Some(cell) = pick_cell(&mut rng, level, snake, walls) {
            out_commands.push(Command::PlaceFood { cell, kind });
        }
    }
}

fn derive_spawn_seed(base: u64, level: LevelIndex, sequence: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(RNG_STREAM_FOOD.as_bytes());
    hasher.update(level.get().to_le_bytes());
    hasher.update(sequence.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

/// Golden odds start at 12% and decay towards an 8% floor over the first
/// ten levels; poison odds rise from 6% towards a 10% ceiling.
fn kind_odds(level: LevelIndex) -> (f32, f32) {
    let t = level.get().min(9) as f32 / 9.0;
    let golden = (0.12 - 0.05 * t).max(0.08);
    let poison = (0.06 + 0.03 * t).min(0.10);
    (golden, poison)
}

fn pick_kind(rng: &mut ChaCha8Rng, level: LevelIndex) -> FoodKind {
    let (golden, poison) = kind_odds(level);
    let roll: f32 = rng.gen();
    if roll < golden {
        FoodKind::Golden
    } else if roll < golden + poison {
        FoodKind::Poison
    } else {
        FoodKind::Normal
    }
}

fn pick_cell(
    rng: &mut ChaCha8Rng,
    level: &ActiveLevelView,
    snake: &SnakeView,
    walls: &WallView<'_>,
) -> Option<Cell> {
    let bounds = level.bounds;
    let Some(head) = snake.head() else {
        return None;
    };

    let free = |cell: Cell| !walls.is_wall(cell) && !snake.occupies(cell);

    for _ in 0..MAX_MARGIN_TRIES {
        let candidate = random_cell(rng, bounds);
        if free(candidate)
            && !near_wall(candidate, walls)
            && reachable(head, candidate, bounds, level.wrap, snake, walls)
        {
            return Some(candidate);
        }
    }

    // Cramped layouts can leave every free cell hugging a wall; drop the
    // margin and pick uniformly from the remaining legal cells.
    let half = bounds.half_extent();
    let mut candidates = Vec::new();
    for x in -half..=half {
        for z in -half..=half {
            let cell = Cell::new(x, z);
            if free(cell) && reachable(head, cell, bounds, level.wrap, snake, walls) {
                candidates.push(cell);
            }
        }
    }
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

fn random_cell(rng: &mut ChaCha8Rng, bounds: GridBounds) -> Cell {
    let half = bounds.half_extent();
    Cell::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half))
}

/// A cell is near a wall when any of its eight neighbours is one. Neighbours
/// are probed unwrapped, so edge cells never count walls across the fold.
fn near_wall(cell: Cell, walls: &WallView<'_>) -> bool {
    for dx in -1..=1 {
        for dz in -1..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            if walls.is_wall(Cell::new(cell.x() + dx, cell.z() + dz)) {
                return true;
            }
        }
    }
    false
}

/// Breadth-first flood from the snake head through empty cells, treating
/// walls and the body as blocked, folding across the edge exactly like
/// stepping does, capped at the cell count.
fn reachable(
    head: Cell,
    target: Cell,
    bounds: GridBounds,
    wrap: bool,
    snake: &SnakeView,
    walls: &WallView<'_>,
) -> bool {
    if head == target {
        return true;
    }

    let limit = bounds.cell_count();
    let mut visited = HashSet::new();
    let mut frontier = VecDeque::new();
    let _ = visited.insert(head);
    frontier.push_back(head);

    while let Some(current) = frontier.pop_front() {
        if visited.len() > limit {
            break;
        }
        for direction in [
            snake3d_core::Direction::North,
            snake3d_core::Direction::South,
            snake3d_core::Direction::East,
            snake3d_core::Direction::West,
        ] {
            let Some(next) = bounds.resolve(current.offset(direction), wrap) else {
                continue;
            };
            if walls.is_wall(next) || snake.occupies(next) || !visited.insert(next) {
                continue;
            }
            if next == target {
                return true;
            }
            frontier.push_back(next);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake3d_core::Direction;

    fn open_level(half: i32, wrap: bool) -> ActiveLevelView {
        ActiveLevelView {
            index: LevelIndex::new(0),
            name: "test",
            wrap,
            bounds: GridBounds::new(half),
            target_score: 5,
            tick: std::time::Duration::from_millis(300),
        }
    }

    fn straight_snake() -> SnakeView {
        SnakeView::new(
            vec![Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            vec![Cell::new(-1, 0), Cell::new(-2, 0), Cell::new(-3, 0)],
            Direction::East,
        )
    }

    #[test]
    fn golden_odds_decay_to_the_floor() {
        let (golden_first, poison_first) = kind_odds(LevelIndex::new(0));
        assert!((golden_first - 0.12).abs() < f32::EPSILON);
        assert!((poison_first - 0.06).abs() < f32::EPSILON);

        let (golden_late, poison_late) = kind_odds(LevelIndex::new(9));
        assert!((golden_late - 0.08).abs() < f32::EPSILON);
        assert!((poison_late - 0.09).abs() < f32::EPSILON);

        // Clamped past the ninth level.
        assert_eq!(kind_odds(LevelIndex::new(9)), kind_odds(LevelIndex::new(40)));
    }

    #[test]
    fn odds_stay_within_their_bands() {
        for index in 0..32 {
            let (golden, poison) = kind_odds(LevelIndex::new(index));
            assert!((0.08..=0.12).contains(&golden), "golden at {index}");
            assert!((0.06..=0.10).contains(&poison), "poison at {index}");
        }
    }

    #[test]
    fn identical_seeds_place_identical_food() {
        let level = open_level(10, true);
        let snake = straight_snake();
        let walls = HashSet::new();
        let wall_view = WallView::new(&walls);
        let events = vec![Event::LevelLoaded {
            index: LevelIndex::new(0),
            wrap: true,
        }];

        let mut first = Vec::new();
        let mut spawner = FoodSpawner::new(Config::new(0xfeed));
        spawner.handle(&events, &level, &snake, &wall_view, &mut first);

        let mut second = Vec::new();
        let mut spawner = FoodSpawner::new(Config::new(0xfeed));
        spawner.handle(&events, &level, &snake, &wall_view, &mut second);

        assert_eq!(first, second);
        assert!(matches!(first.as_slice(), [Command::PlaceFood { .. }]));
    }

    #[test]
    fn different_sequences_draw_different_seeds() {
        let base = 0x5eed;
        let level = LevelIndex::new(3);
        assert_ne!(
            derive_spawn_seed(base, level, 0),
            derive_spawn_seed(base, level, 1)
        );
        assert_ne!(
            derive_spawn_seed(base, LevelIndex::new(3), 0),
            derive_spawn_seed(base, LevelIndex::new(4), 0)
        );
    }

    #[test]
    fn placement_avoids_walls_snake_and_margins() {
        let level = open_level(6, false);
        let snake = straight_snake();
        let mut walls = HashSet::new();
        for z in -6..=6 {
            let _ = walls.insert(Cell::new(3, z));
        }
        let wall_view = WallView::new(&walls);

        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cell = pick_cell(&mut rng, &level, &snake, &wall_view)
                .expect("open west half has room");
            assert!(!wall_view.is_wall(cell));
            assert!(!snake.occupies(cell));
            // The eastern half is cut off from the head by the wall line.
            assert!(cell.x() < 3, "unreachable cell {cell:?}");
        }
    }

    #[test]
    fn margin_constraint_is_dropped_when_everything_hugs_a_wall() {
        // 3x3 field with a centre pillar: every free cell touches it.
        let level = open_level(1, false);
        let snake = SnakeView::new(
            vec![Cell::new(-1, -1)],
            vec![Cell::new(-1, -1)],
            Direction::East,
        );
        let mut walls = HashSet::new();
        let _ = walls.insert(Cell::new(0, 0));
        let wall_view = WallView::new(&walls);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cell = pick_cell(&mut rng, &level, &snake, &wall_view)
            .expect("margin fallback keeps the board playable");
        assert!(!wall_view.is_wall(cell));
        assert!(!snake.occupies(cell));
    }

    #[test]
    fn wrap_reachability_crosses_the_edge() {
        // A full wall line splits the field unless the topology wraps.
        let bounds = GridBounds::new(4);
        let mut walls = HashSet::new();
        for z in -4..=4 {
            let _ = walls.insert(Cell::new(0, z));
        }
        let wall_view = WallView::new(&walls);

        let head = Cell::new(-2, 0);
        let snake = SnakeView::new(vec![head], vec![head], Direction::East);
        let target = Cell::new(2, 0);
        assert!(!reachable(head, target, bounds, false, &snake, &wall_view));
        assert!(reachable(head, target, bounds, true, &snake, &wall_view));
    }

    #[test]
    fn body_enclosed_pockets_never_receive_food() {
        // Closed body ring around the origin; only the head's outside of the
        // loop is reachable, so the pocket cell must never be sampled.
        let level = open_level(2, false);
        let ring = vec![
            Cell::new(1, 1),
            Cell::new(0, 1),
            Cell::new(-1, 1),
            Cell::new(-1, 0),
            Cell::new(-1, -1),
            Cell::new(0, -1),
            Cell::new(1, -1),
            Cell::new(1, 0),
        ];
        let snake = SnakeView::new(ring.clone(), ring, Direction::North);
        let walls = HashSet::new();
        let wall_view = WallView::new(&walls);

        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cell = pick_cell(&mut rng, &level, &snake, &wall_view)
                .expect("cells outside the ring remain");
            assert_ne!(
                cell,
                Cell::new(0, 0),
                "seed {seed} sampled the enclosed pocket"
            );
            assert!(!snake.occupies(cell));
        }
    }

    #[test]
    fn wall_margin_ignores_neighbours_across_the_fold() {
        let mut walls = HashSet::new();
        let _ = walls.insert(Cell::new(-4, 0));
        let wall_view = WallView::new(&walls);

        assert!(near_wall(Cell::new(-3, 0), &wall_view));
        // (4, 0) folds next to the wall on a wrapping 9x9 field, but the
        // margin probes raw coordinates only.
        assert!(!near_wall(Cell::new(4, 0), &wall_view));
    }

    #[test]
    fn expired_food_is_replaced_by_a_plain_item() {
        let level = open_level(10, true);
        let snake = straight_snake();
        let walls = HashSet::new();
        let wall_view = WallView::new(&walls);

        let mut spawner = FoodSpawner::new(Config::new(9));
        let mut commands = Vec::new();
        spawner.handle(
            &[Event::LevelLoaded {
                index: LevelIndex::new(0),
                wrap: true,
            }],
            &level,
            &snake,
            &wall_view,
            &mut commands,
        );
        commands.clear();

        spawner.handle(
            &[Event::FoodExpired {
                cell: Cell::new(3, 3),
                kind: FoodKind::Golden,
            }],
            &level,
            &snake,
            &wall_view,
            &mut commands,
        );
        assert!(matches!(
            commands.as_slice(),
            [Command::PlaceFood {
                kind: FoodKind::Normal,
                ..
            }]
        ));
    }

    #[test]
    fn spawner_waits_for_a_level_before_placing() {
        let level = open_level(10, true);
        let snake = straight_snake();
        let walls = HashSet::new();
        let wall_view = WallView::new(&walls);

        let mut commands = Vec::new();
        let mut spawner = FoodSpawner::new(Config::new(1));
        spawner.handle(
            &[Event::FoodEaten {
                cell: Cell::new(2, 2),
                kind: FoodKind::Normal,
            }],
            &level,
            &snake,
            &wall_view,
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
