#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Snake3D.
//!
//! The world owns the snake state machine, the active level's wall index, the
//! single food item, the score, and the frame clock. All mutation flows
//! through [`apply`]; systems observe the resulting [`Event`] stream and the
//! read-only views exposed by [`query`].

use std::{
    collections::{HashSet, VecDeque},
    time::Duration,
};

use snake3d_core::{
    Cell, Command, Direction, Event, FoodKind, GameOverReason, GameplaySettings, GridBounds,
    LevelIndex, SpawnPose, WELCOME_BANNER,
};
use snake3d_level_catalog::Catalog;

/// Number of body segments the snake starts a level with.
const SPAWN_LENGTH: usize = 3;

/// Body length below which `shrink` becomes a no-op.
const SHRINK_FLOOR: usize = 4;

/// Represents the authoritative Snake3D world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: Catalog,
    level: ActiveLevel,
    walls: HashSet<Cell>,
    snake: Snake,
    food: Option<FoodState>,
    score: u32,
    clock: Duration,
    game_over: Option<GameOverReason>,
    completed: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new world with the first catalog level active.
    #[must_use]
    pub fn new() -> Self {
        let catalog = Catalog::new();
        let first = catalog
            .get(LevelIndex::new(0))
            .expect("catalog provides at least one level");
        let level = ActiveLevel::from_descriptor(first, GameplaySettings::default());
        let walls = first.wall_cells();
        let spawn = first.spawn();
        Self {
            banner: WELCOME_BANNER,
            catalog,
            level,
            walls,
            snake: Snake::at(spawn),
            food: None,
            score: 0,
            clock: Duration::ZERO,
            game_over: None,
            completed: false,
        }
    }

    fn load_level(
        &mut self,
        index: LevelIndex,
        settings: GameplaySettings,
        out_events: &mut Vec<Event>,
    ) {
        let Some(descriptor) = self.catalog.get(index) else {
            out_events.push(Event::LevelLoadRejected { index });
            return;
        };

        // The previous wall index is fully discarded; nothing leaks across
        // level transitions.
        self.walls = descriptor.wall_cells();
        self.level = ActiveLevel::from_descriptor(descriptor, settings);
        let spawn = descriptor.spawn();
        self.snake.reset(spawn);
        self.food = None;
        self.score = 0;
        self.clock = Duration::ZERO;
        self.game_over = None;
        self.completed = false;

        out_events.push(Event::LevelLoaded {
            index,
            wrap: self.level.wrap,
        });
    }

    fn step_snake(&mut self, out_events: &mut Vec<Event>) {
        if self.game_over.is_some() || self.completed {
            return;
        }

        match self
            .snake
            .step(self.level.bounds, self.level.wrap, &self.walls)
        {
            Ok((from, to)) => {
                out_events.push(Event::SnakeAdvanced { from, to });
                if let Some(food) = self.food {
                    if food.cell == to {
                        self.food = None;
                        out_events.push(Event::FoodEaten {
                            cell: food.cell,
                            kind: food.kind,
                        });
                    }
                }
            }
            Err(reason) => {
                self.game_over = Some(reason);
                out_events.push(Event::GameOver { reason });
            }
        }
    }

    fn place_food(&mut self, cell: Cell, kind: FoodKind, out_events: &mut Vec<Event>) {
        let valid = self.level.bounds.contains(cell)
            && !self.walls.contains(&cell)
            && !self.snake.occupies(cell);
        if !valid {
            out_events.push(Event::FoodPlacementRejected { cell, kind });
            return;
        }

        self.food = Some(FoodState {
            cell,
            kind,
            expires_at: kind.lifetime().map(|lifetime| self.clock + lifetime),
        });
        out_events.push(Event::FoodPlaced { cell, kind });
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        if let Some(food) = self.food {
            if let Some(deadline) = food.expires_at {
                if self.clock > deadline {
                    self.food = None;
                    out_events.push(Event::FoodExpired {
                        cell: food.cell,
                        kind: food.kind,
                    });
                }
            }
        }
    }

    fn adjust_score(&mut self, delta: i32, out_events: &mut Vec<Event>) {
        self.score = if delta.is_negative() {
            self.score.saturating_sub(delta.unsigned_abs())
        } else {
            self.score.saturating_add(delta.unsigned_abs())
        };
        out_events.push(Event::ScoreChanged {
            score: self.score,
            target: self.level.target_score,
        });

        if !self.completed && self.score >= self.level.target_score {
            self.completed = true;
            out_events.push(Event::LevelCompleted {
                index: self.level.index,
                final_level: self.catalog.is_final(self.level.index),
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { index, settings } => world.load_level(index, settings, out_events),
        Command::QueueDirection { direction } => world.snake.queue_direction(direction),
        Command::StepSnake => world.step_snake(out_events),
        Command::AdvanceClock { dt } => world.advance_clock(dt, out_events),
        Command::PlaceFood { cell, kind } => world.place_food(cell, kind, out_events),
        Command::GrowSnake => world.snake.grow(),
        Command::ShrinkSnake => world.snake.shrink(),
        Command::AdjustScore { delta } => world.adjust_score(delta, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use snake3d_core::{
        ActiveLevelView, FoodView, GameOverReason, SnakeView, WallView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only snapshot of the snake.
    #[must_use]
    pub fn snake_view(world: &World) -> SnakeView {
        SnakeView::new(
            world.snake.body.iter().copied().collect(),
            world.snake.previous.clone(),
            world.snake.heading,
        )
    }

    /// Exposes a membership view over the active level's wall index.
    #[must_use]
    pub fn wall_view(world: &World) -> WallView<'_> {
        WallView::new(&world.walls)
    }

    /// Captures the active food item, if one is placed.
    #[must_use]
    pub fn food_view(world: &World) -> Option<FoodView> {
        world.food.map(|food| FoodView {
            cell: food.cell,
            kind: food.kind,
            expires_at: food.expires_at,
        })
    }

    /// Captures the active level's play parameters.
    #[must_use]
    pub fn level_view(world: &World) -> ActiveLevelView {
        ActiveLevelView {
            index: world.level.index,
            name: world.level.name,
            wrap: world.level.wrap,
            bounds: world.level.bounds,
            target_score: world.level.target_score,
            tick: world.level.tick,
        }
    }

    /// Current score within the active level.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Frame clock used to expire timed food.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Terminal condition that ended the current run, if any.
    #[must_use]
    pub fn game_over(world: &World) -> Option<GameOverReason> {
        world.game_over
    }

    /// Reports whether the active level's target score was reached.
    #[must_use]
    pub fn level_completed(world: &World) -> bool {
        world.completed
    }

    /// Number of levels available in the catalog.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.catalog.len()
    }
}

/// Play parameters of the active level after applying settings.
#[derive(Clone, Copy, Debug)]
struct ActiveLevel {
    index: LevelIndex,
    name: &'static str,
    wrap: bool,
    bounds: GridBounds,
    target_score: u32,
    tick: Duration,
}

impl ActiveLevel {
    fn from_descriptor(
        descriptor: &snake3d_level_catalog::LevelDescriptor,
        settings: GameplaySettings,
    ) -> Self {
        Self {
            index: descriptor.index(),
            name: descriptor.name(),
            wrap: descriptor.wrap() || settings.wrap_override,
            bounds: descriptor.bounds(),
            target_score: descriptor.target_score(),
            tick: descriptor.tick(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct FoodState {
    cell: Cell,
    kind: FoodKind,
    expires_at: Option<Duration>,
}

#[derive(Clone, Debug)]
struct Snake {
    body: VecDeque<Cell>,
    previous: Vec<Cell>,
    heading: Direction,
    pending: Direction,
}

impl Snake {
    fn at(spawn: SpawnPose) -> Self {
        let mut snake = Self {
            body: VecDeque::new(),
            previous: Vec::new(),
            heading: spawn.heading(),
            pending: spawn.heading(),
        };
        snake.reset(spawn);
        snake
    }

    /// Lays out `SPAWN_LENGTH` segments trailing away from the spawn heading.
    fn reset(&mut self, spawn: SpawnPose) {
        self.body.clear();
        let trailing = spawn.heading().opposite();
        let mut cell = spawn.cell();
        for _ in 0..SPAWN_LENGTH {
            self.body.push_back(cell);
            cell = cell.offset(trailing);
        }
        self.previous = self.body.iter().copied().collect();
        self.heading = spawn.heading();
        self.pending = spawn.heading();
    }

    /// Overwrites the pending heading unless it reverses the current one.
    fn queue_direction(&mut self, direction: Direction) {
        if direction == self.heading.opposite() {
            return;
        }
        self.pending = direction;
    }

    fn head(&self) -> Cell {
        *self.body.front().expect("snake body is never empty")
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.body.iter().any(|segment| *segment == cell)
    }

    /// Advances one tick, returning the head's (from, to) cells on success.
    fn step(
        &mut self,
        bounds: GridBounds,
        wrap: bool,
        walls: &HashSet<Cell>,
    ) -> Result<(Cell, Cell), GameOverReason> {
        self.previous = self.body.iter().copied().collect();
        self.heading = self.pending;

        let from = self.head();
        let Some(next) = bounds.resolve(from.offset(self.heading), wrap) else {
            return Err(GameOverReason::OutOfBounds);
        };
        if walls.contains(&next) {
            return Err(GameOverReason::WallCollision);
        }
        // The tail has not been dropped yet, so it still blocks the head.
        if self.occupies(next) {
            return Err(GameOverReason::SelfCollision);
        }

        self.body.push_front(next);
        let _ = self.body.pop_back();
        Ok((from, next))
    }

    /// Appends a duplicate of the tail; the body elongates without moving.
    fn grow(&mut self) {
        if let Some(tail) = self.body.back().copied() {
            self.body.push_back(tail);
        }
    }

    /// Removes the tail while the body stays above the length floor.
    fn shrink(&mut self) {
        if self.body.len() > SHRINK_FLOOR {
            let _ = self.body.pop_back();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(world: &mut World, index: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::LoadLevel {
                index: LevelIndex::new(index),
                settings: GameplaySettings::default(),
            },
            &mut events,
        );
        events
    }

    fn step(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::StepSnake, &mut events);
        events
    }

    #[test]
    fn loading_level_resets_snake_to_three_segments() {
        let mut world = World::new();
        let events = load(&mut world, 0);
        assert_eq!(
            events,
            vec![Event::LevelLoaded {
                index: LevelIndex::new(0),
                wrap: true,
            }]
        );

        let snake = query::snake_view(&world);
        assert_eq!(
            snake.body(),
            &[Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)]
        );
        assert_eq!(snake.heading(), Direction::East);
    }

    #[test]
    fn loading_unknown_level_is_rejected() {
        let mut world = World::new();
        let events = load(&mut world, 42);
        assert_eq!(
            events,
            vec![Event::LevelLoadRejected {
                index: LevelIndex::new(42),
            }]
        );
    }

    #[test]
    fn wrap_override_forces_wrapping_topology() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                index: LevelIndex::new(1),
                settings: GameplaySettings {
                    wrap_override: true,
                    ..GameplaySettings::default()
                },
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::LevelLoaded {
                index: LevelIndex::new(1),
                wrap: true,
            }]
        );
        assert!(query::level_view(&world).wrap);
    }

    #[test]
    fn queueing_opposite_heading_is_ignored() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::QueueDirection {
                direction: Direction::West,
            },
            &mut events,
        );
        let _ = step(&mut world);
        assert_eq!(query::snake_view(&world).heading(), Direction::East);
    }

    #[test]
    fn grow_then_step_nets_one_segment() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(&mut world, Command::GrowSnake, &mut events);
        assert_eq!(query::snake_view(&world).len(), 4);
        let _ = step(&mut world);
        assert_eq!(query::snake_view(&world).len(), 4);
    }

    #[test]
    fn shrink_floors_at_four_segments() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(&mut world, Command::GrowSnake, &mut events);
        apply(&mut world, Command::GrowSnake, &mut events);
        assert_eq!(query::snake_view(&world).len(), 5);
        apply(&mut world, Command::ShrinkSnake, &mut events);
        assert_eq!(query::snake_view(&world).len(), 4);
        apply(&mut world, Command::ShrinkSnake, &mut events);
        assert_eq!(query::snake_view(&world).len(), 4);
    }

    #[test]
    fn food_placed_on_wall_is_rejected() {
        let mut world = World::new();
        let _ = load(&mut world, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceFood {
                cell: Cell::new(10, 0),
                kind: FoodKind::Normal,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::FoodPlacementRejected {
                cell: Cell::new(10, 0),
                kind: FoodKind::Normal,
            }]
        );
        assert!(query::food_view(&world).is_none());
    }

    #[test]
    fn food_placed_on_body_is_rejected() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceFood {
                cell: Cell::new(-1, 0),
                kind: FoodKind::Normal,
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::FoodPlacementRejected { .. }]
        ));
    }

    #[test]
    fn timed_food_expires_strictly_after_its_deadline() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceFood {
                cell: Cell::new(4, 4),
                kind: FoodKind::Golden,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::AdvanceClock {
                dt: Duration::from_millis(8_000),
            },
            &mut events,
        );
        assert!(events.is_empty(), "deadline itself has not elapsed");
        assert!(query::food_view(&world).is_some());

        apply(
            &mut world,
            Command::AdvanceClock {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::FoodExpired {
                cell: Cell::new(4, 4),
                kind: FoodKind::Golden,
            }]
        );
        assert!(query::food_view(&world).is_none());
    }

    #[test]
    fn eating_food_emits_event_and_clears_it() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceFood {
                cell: Cell::new(1, 0),
                kind: FoodKind::Golden,
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::StepSnake, &mut events);
        assert_eq!(
            events,
            vec![
                Event::SnakeAdvanced {
                    from: Cell::new(0, 0),
                    to: Cell::new(1, 0),
                },
                Event::FoodEaten {
                    cell: Cell::new(1, 0),
                    kind: FoodKind::Golden,
                },
            ]
        );
        assert!(query::food_view(&world).is_none());
    }

    #[test]
    fn score_floors_at_zero_and_completion_fires_once() {
        let mut world = World::new();
        let _ = load(&mut world, 0);
        let mut events = Vec::new();

        apply(&mut world, Command::AdjustScore { delta: -1 }, &mut events);
        assert_eq!(
            events,
            vec![Event::ScoreChanged {
                score: 0,
                target: 5,
            }]
        );
        events.clear();

        apply(&mut world, Command::AdjustScore { delta: 5 }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::ScoreChanged {
                    score: 5,
                    target: 5,
                },
                Event::LevelCompleted {
                    index: LevelIndex::new(0),
                    final_level: false,
                },
            ]
        );
        events.clear();

        apply(&mut world, Command::AdjustScore { delta: 1 }, &mut events);
        assert_eq!(
            events,
            vec![Event::ScoreChanged {
                score: 6,
                target: 5,
            }]
        );
    }

    #[test]
    fn final_level_completion_is_flagged() {
        let mut world = World::new();
        let _ = load(&mut world, 9);
        let mut events = Vec::new();
        apply(&mut world, Command::AdjustScore { delta: 30 }, &mut events);
        assert!(events.contains(&Event::LevelCompleted {
            index: LevelIndex::new(9),
            final_level: true,
        }));
    }

    #[test]
    fn steps_after_game_over_are_ignored() {
        let mut world = World::new();
        let _ = load(&mut world, 1);
        // The Box: drive east into the perimeter at x = 10.
        let mut last = Vec::new();
        for _ in 0..30 {
            last = step(&mut world);
            if query::game_over(&world).is_some() {
                break;
            }
        }
        assert_eq!(
            last.last(),
            Some(&Event::GameOver {
                reason: GameOverReason::WallCollision,
            })
        );
        let head = query::snake_view(&world).head();
        let ignored = step(&mut world);
        assert!(ignored.is_empty());
        assert_eq!(query::snake_view(&world).head(), head);
    }
}
