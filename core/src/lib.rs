#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake3D engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Snake3D.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Loads the level with the provided catalog index, rebuilding all state.
    LoadLevel {
        /// Catalog index of the level to activate.
        index: LevelIndex,
        /// Player settings affecting wrap behaviour for this play-through.
        settings: GameplaySettings,
    },
    /// Queues a heading change to take effect atomically at the next tick.
    QueueDirection {
        /// Desired cardinal heading resolved by the input collaborator.
        direction: Direction,
    },
    /// Advances the snake by exactly one discrete simulation tick.
    StepSnake,
    /// Advances the frame clock used to expire timed food.
    AdvanceClock {
        /// Wall-clock duration elapsed since the previous frame.
        dt: Duration,
    },
    /// Places a new food item at the provided cell.
    PlaceFood {
        /// Cell the food should occupy.
        cell: Cell,
        /// Kind of food to place, which determines scoring and expiry.
        kind: FoodKind,
    },
    /// Appends a duplicate of the current tail segment to the snake.
    GrowSnake,
    /// Removes the tail segment while the body stays above the length floor.
    ShrinkSnake,
    /// Applies a signed score delta, floored at zero.
    AdjustScore {
        /// Signed change to the score.
        delta: i32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level finished loading and play may begin.
    LevelLoaded {
        /// Catalog index of the activated level.
        index: LevelIndex,
        /// Effective wrap-around topology after applying settings.
        wrap: bool,
    },
    /// Reports that a level load referenced an index outside the catalog.
    LevelLoadRejected {
        /// Index that failed to resolve.
        index: LevelIndex,
    },
    /// Confirms that the snake head advanced between two cells.
    SnakeAdvanced {
        /// Cell the head occupied before the tick.
        from: Cell,
        /// Cell the head occupies after the tick.
        to: Cell,
    },
    /// Confirms that a food item was placed into the level.
    FoodPlaced {
        /// Cell the food occupies.
        cell: Cell,
        /// Kind of the placed food.
        kind: FoodKind,
    },
    /// Reports that a food placement request was rejected.
    FoodPlacementRejected {
        /// Cell provided in the placement request.
        cell: Cell,
        /// Kind provided in the placement request.
        kind: FoodKind,
    },
    /// Announces that the snake head reached the active food cell.
    FoodEaten {
        /// Cell the food occupied.
        cell: Cell,
        /// Kind of the consumed food.
        kind: FoodKind,
    },
    /// Announces that a timed food item outlived its expiry deadline.
    FoodExpired {
        /// Cell the food occupied.
        cell: Cell,
        /// Kind of the expired food.
        kind: FoodKind,
    },
    /// Reports the score after an adjustment was applied.
    ScoreChanged {
        /// Score after the adjustment.
        score: u32,
        /// Target score of the active level.
        target: u32,
    },
    /// Announces that the active level's target score was reached.
    LevelCompleted {
        /// Catalog index of the completed level.
        index: LevelIndex,
        /// Whether the completed level is the last one in the catalog.
        final_level: bool,
    },
    /// Announces that the current run ended.
    GameOver {
        /// Terminal condition that ended the run.
        reason: GameOverReason,
    },
}

/// Location of a single grid cell expressed as signed x/z coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    x: i32,
    z: i32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Signed x coordinate of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Signed z coordinate of the cell.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the neighbouring cell one step along the provided heading.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        Self {
            x: self.x + direction.dx(),
            z: self.z + direction.dz(),
        }
    }
}

/// Cardinal movement directions available to the snake on the x/z plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing z.
    North,
    /// Movement toward increasing x.
    East,
    /// Movement toward increasing z.
    South,
    /// Movement toward decreasing x.
    West,
}

impl Direction {
    /// Unit x component of the heading.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Self::East => 1,
            Self::West => -1,
            Self::North | Self::South => 0,
        }
    }

    /// Unit z component of the heading.
    #[must_use]
    pub const fn dz(self) -> i32 {
        match self {
            Self::South => 1,
            Self::North => -1,
            Self::East | Self::West => 0,
        }
    }

    /// Returns the exact opposite heading.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Square play-field bounds expressed as a half-extent around the origin.
///
/// Both the movement rule and the food spawner's reachability search resolve
/// candidate cells through [`GridBounds::resolve`], so the wrap topology is a
/// single shared fold rather than two implementations that could drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    half_extent: i32,
}

impl GridBounds {
    /// Creates bounds covering the cells with coordinates in `-half..=half`.
    #[must_use]
    pub const fn new(half_extent: i32) -> Self {
        Self { half_extent }
    }

    /// Half-extent of the playable square.
    #[must_use]
    pub const fn half_extent(&self) -> i32 {
        self.half_extent
    }

    /// Reports whether the cell lies inside the bounds on both axes.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x() >= -self.half_extent
            && cell.x() <= self.half_extent
            && cell.z() >= -self.half_extent
            && cell.z() <= self.half_extent
    }

    /// Folds a coordinate that exited one edge onto the opposite edge.
    #[must_use]
    pub const fn fold(&self, cell: Cell) -> Cell {
        let half = self.half_extent;
        let mut x = cell.x();
        let mut z = cell.z();
        if x < -half {
            x = half;
        } else if x > half {
            x = -half;
        }
        if z < -half {
            z = half;
        } else if z > half {
            z = -half;
        }
        Cell::new(x, z)
    }

    /// Resolves a candidate cell against the bounds and wrap topology.
    ///
    /// Returns the in-bounds cell (folded when `wrap` is enabled) or `None`
    /// when the candidate left a non-wrapping play field.
    #[must_use]
    pub const fn resolve(&self, cell: Cell, wrap: bool) -> Option<Cell> {
        if self.contains(cell) {
            Some(cell)
        } else if wrap {
            Some(self.fold(cell))
        } else {
            None
        }
    }

    /// Number of cells covered by the bounds, `(2·half + 1)²`.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        let side = (2 * self.half_extent + 1) as usize;
        side * side
    }
}

/// Zero-based index of a level within the catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Creates a new level index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of food encountered in a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    /// Standard food worth one point.
    Normal,
    /// Bonus food worth three points, expiring after eight seconds.
    Golden,
    /// Penalty food costing one point, expiring after four seconds.
    Poison,
}

impl FoodKind {
    /// Duration after which the food degrades to a fresh normal item, if any.
    #[must_use]
    pub const fn lifetime(self) -> Option<Duration> {
        match self {
            Self::Normal => None,
            Self::Golden => Some(Duration::from_millis(8_000)),
            Self::Poison => Some(Duration::from_millis(4_000)),
        }
    }
}

/// Terminal conditions that end a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// The head left a non-wrapping play field.
    OutOfBounds,
    /// The head entered an obstacle cell.
    WallCollision,
    /// The head entered a cell occupied by the body.
    SelfCollision,
}

/// Difficulty presets scaling the base tick duration of every level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slower ticks for a relaxed pace.
    Casual,
    /// The levels' authored tick durations.
    #[default]
    Classic,
    /// Faster ticks for experienced players.
    Pro,
}

impl Difficulty {
    /// Multiplier applied to a level's base tick duration.
    ///
    /// A larger multiplier means slower ticks.
    #[must_use]
    pub const fn tick_multiplier(self) -> f32 {
        match self {
            Self::Casual => 1.25,
            Self::Classic => 1.0,
            Self::Pro => 0.85,
        }
    }
}

/// Player-facing gameplay settings consumed as read-only inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameplaySettings {
    /// Difficulty preset scaling every level's tick duration.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Forces wrap-around topology even on levels authored without it.
    #[serde(default)]
    pub wrap_override: bool,
    /// Requests reduced presentation motion from rendering collaborators.
    #[serde(default)]
    pub reduce_motion: bool,
}

/// Initial head cell and heading used when (re)setting the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnPose {
    cell: Cell,
    heading: Direction,
}

impl SpawnPose {
    /// Creates a spawn pose at the provided cell and heading.
    #[must_use]
    pub const fn new(cell: Cell, heading: Direction) -> Self {
        Self { cell, heading }
    }

    /// Cell the head occupies at spawn.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Heading the snake travels at spawn.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }
}

/// Immutable snapshot of the snake used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnakeView {
    body: Vec<Cell>,
    previous: Vec<Cell>,
    heading: Direction,
}

impl SnakeView {
    /// Creates a new snake view from captured body state.
    #[must_use]
    pub fn new(body: Vec<Cell>, previous: Vec<Cell>, heading: Direction) -> Self {
        Self {
            body,
            previous,
            heading,
        }
    }

    /// Body segments ordered head first.
    #[must_use]
    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    /// Body segments captured at the previous tick, for interpolation.
    #[must_use]
    pub fn previous(&self) -> &[Cell] {
        &self.previous
    }

    /// Current heading of the snake.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Cell occupied by the head, when the body is non-empty.
    #[must_use]
    pub fn head(&self) -> Option<Cell> {
        self.body.first().copied()
    }

    /// Number of body segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Reports whether the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Reports whether any segment occupies the provided cell.
    #[must_use]
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}

/// Read-only membership view over the active level's obstacle cells.
#[derive(Clone, Copy, Debug)]
pub struct WallView<'a> {
    cells: &'a HashSet<Cell>,
}

impl<'a> WallView<'a> {
    /// Captures a new wall view backed by the provided cell set.
    #[must_use]
    pub const fn new(cells: &'a HashSet<Cell>) -> Self {
        Self { cells }
    }

    /// Reports whether the provided cell is an obstacle.
    #[must_use]
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of obstacle cells in the active level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the level has no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the obstacle cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + 'a {
        self.cells.iter().copied()
    }
}

/// Immutable snapshot of the active food item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoodView {
    /// Cell the food occupies.
    pub cell: Cell,
    /// Kind of the active food.
    pub kind: FoodKind,
    /// Frame-clock deadline after which the food degrades, if timed.
    pub expires_at: Option<Duration>,
}

/// Immutable snapshot of the active level's play parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveLevelView {
    /// Catalog index of the active level.
    pub index: LevelIndex,
    /// Display name of the active level.
    pub name: &'static str,
    /// Effective wrap topology after applying settings.
    pub wrap: bool,
    /// Play-field bounds of the active level.
    pub bounds: GridBounds,
    /// Score required to complete the level.
    pub target_score: u32,
    /// Authored tick duration before difficulty scaling.
    pub tick: Duration,
}
