#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable level catalog and deterministic wall-layout generation.
//!
//! Every level is a pure descriptor; its obstacle layout is a tagged
//! [`WallLayout`] variant rather than a generator closure, so level data stays
//! serializable and each layout is a deterministic function of the play-field
//! half-extent.

use std::{collections::HashSet, collections::VecDeque, error::Error, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use snake3d_core::{Cell, Direction, GridBounds, LevelIndex, SpawnPose};

/// Half-extent shared by the first eight levels (a 21×21 play field).
const BASE_HALF_EXTENT: i32 = 10;

/// Tagged obstacle layout, a pure function of the play-field half-extent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallLayout {
    /// No obstacles.
    Open,
    /// Solid box along the outermost ring of cells.
    Perimeter,
    /// Plus shape along both axes with an open gap around the origin.
    Cross {
        /// Arm length measured from the origin.
        arm: i32,
        /// Coordinates with absolute value at most `gap` stay open.
        gap: i32,
    },
    /// Two vertical and two horizontal wall lines with central gaps.
    Maze {
        /// Distance of each wall line from the origin.
        offset: i32,
        /// Half-width of the opening carved through each line.
        gap: i32,
    },
    /// Four square pillars placed symmetrically around the origin.
    Pillars {
        /// Distance of each pillar centre from the origin on both axes.
        offset: i32,
        /// Half-side of each square pillar.
        radius: i32,
    },
    /// Outer perimeter plus an inner ring pierced by four gates.
    RingWithGates {
        /// Half-extent of the inner ring.
        inner: i32,
        /// Half-width of each gate opening.
        gate_half: i32,
    },
    /// Evenly spaced vertical lanes with periodic gaps.
    Corridors {
        /// Number of lanes the play field is divided into.
        lanes: i32,
    },
    /// Union of layouts, each generated at a reduced half-extent.
    Union(Vec<InsetLayout>),
}

/// A layout generated at `half_extent - inset`, for composing unions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsetLayout {
    /// Amount subtracted from the half-extent before generating.
    pub inset: i32,
    /// Layout to generate at the reduced half-extent.
    pub layout: WallLayout,
}

impl WallLayout {
    /// Generates the obstacle cells for the provided half-extent.
    #[must_use]
    pub fn cells(&self, half_extent: i32) -> Vec<Cell> {
        match self {
            Self::Open => Vec::new(),
            Self::Perimeter => perimeter(half_extent),
            Self::Cross { arm, gap } => cross(*arm, *gap),
            Self::Maze { offset, gap } => maze(half_extent, *offset, *gap),
            Self::Pillars { offset, radius } => pillars(*offset, *radius),
            Self::RingWithGates { inner, gate_half } => {
                ring_with_gates(half_extent, *inner, *gate_half)
            }
            Self::Corridors { lanes } => corridors(half_extent, *lanes),
            Self::Union(parts) => {
                let mut cells = Vec::new();
                for part in parts {
                    cells.extend(part.layout.cells(half_extent - part.inset));
                }
                cells
            }
        }
    }
}

fn perimeter(half: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    for x in -half..=half {
        cells.push(Cell::new(x, -half));
        cells.push(Cell::new(x, half));
    }
    for z in (-half + 1)..=(half - 1) {
        cells.push(Cell::new(-half, z));
        cells.push(Cell::new(half, z));
    }
    cells
}

fn cross(arm: i32, gap: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    for d in -arm..=arm {
        if d == 0 || d.abs() <= gap {
            continue;
        }
        cells.push(Cell::new(d, 0));
        cells.push(Cell::new(0, d));
    }
    cells
}

fn maze(half: i32, offset: i32, gap: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    for line in [-offset, offset] {
        for d in -half..=half {
            if d.abs() <= gap {
                continue;
            }
            // vertical line at x = line, horizontal line at z = line
            if !in_spawn_zone(line, d) {
                cells.push(Cell::new(line, d));
            }
            if !in_spawn_zone(d, line) {
                cells.push(Cell::new(d, line));
            }
        }
    }
    cells
}

fn pillars(offset: i32, radius: i32) -> Vec<Cell> {
    let centres = [
        Cell::new(-offset, -offset),
        Cell::new(offset, -offset),
        Cell::new(-offset, offset),
        Cell::new(offset, offset),
    ];
    let mut cells = Vec::new();
    for centre in centres {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let x = centre.x() + dx;
                let z = centre.z() + dz;
                if in_spawn_zone(x, z) {
                    continue;
                }
                cells.push(Cell::new(x, z));
            }
        }
    }
    cells
}

fn ring_with_gates(half: i32, inner: i32, gate_half: i32) -> Vec<Cell> {
    let mut cells = perimeter(half);

    let mut gates: HashSet<Cell> = HashSet::new();
    for d in -gate_half..=gate_half {
        let _ = gates.insert(Cell::new(d, -inner));
        let _ = gates.insert(Cell::new(d, inner));
        let _ = gates.insert(Cell::new(-inner, d));
        let _ = gates.insert(Cell::new(inner, d));
    }

    for x in -inner..=inner {
        for z in [-inner, inner] {
            let cell = Cell::new(x, z);
            if !gates.contains(&cell) {
                cells.push(cell);
            }
        }
    }
    for z in (-inner + 1)..=(inner - 1) {
        for x in [-inner, inner] {
            let cell = Cell::new(x, z);
            if !gates.contains(&cell) {
                cells.push(cell);
            }
        }
    }

    cells.retain(|cell| !in_spawn_zone(cell.x(), cell.z()));
    cells
}

fn corridors(half: i32, lanes: i32) -> Vec<Cell> {
    let mut cells = Vec::new();
    let spacing = ((2 * half + 1) / lanes).max(2);
    let mut x = -half + spacing;
    while x <= half - spacing {
        for z in -half..=half {
            if z % 4 == 0 {
                continue;
            }
            cells.push(Cell::new(x, z));
        }
        x += spacing;
    }
    cells
}

/// The 3×3 cell block around the origin that generators keep clear.
const fn in_spawn_zone(x: i32, z: i32) -> bool {
    x.abs() <= 1 && z.abs() <= 1
}

/// Immutable descriptor of a single level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelDescriptor {
    index: LevelIndex,
    name: &'static str,
    wrap: bool,
    bounds: GridBounds,
    target_score: u32,
    tick: Duration,
    spawn: SpawnPose,
    layout: WallLayout,
}

impl LevelDescriptor {
    /// Catalog index of the level.
    #[must_use]
    pub const fn index(&self) -> LevelIndex {
        self.index
    }

    /// Display name of the level.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the level's play field wraps around its bounds.
    #[must_use]
    pub const fn wrap(&self) -> bool {
        self.wrap
    }

    /// Play-field bounds of the level.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Score required to complete the level.
    #[must_use]
    pub const fn target_score(&self) -> u32 {
        self.target_score
    }

    /// Authored tick duration before difficulty scaling.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Initial head cell and heading for the level.
    #[must_use]
    pub const fn spawn(&self) -> SpawnPose {
        self.spawn
    }

    /// Obstacle layout of the level.
    #[must_use]
    pub const fn layout(&self) -> &WallLayout {
        &self.layout
    }

    /// Materializes the obstacle layout into a fresh cell set.
    #[must_use]
    pub fn wall_cells(&self) -> HashSet<Cell> {
        self.layout
            .cells(self.bounds.half_extent())
            .into_iter()
            .collect()
    }
}

/// Reasons a level descriptor fails construction-time validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The spawn head cell lies outside the play field.
    SpawnOutOfBounds,
    /// The spawn body cells are covered by an obstacle.
    SpawnInsideWall,
    /// The cell one step ahead of the spawn pose is an obstacle.
    FirstStepBlocked,
    /// Too few empty cells are reachable from the spawn head.
    InsufficientReachableCells,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnOutOfBounds => write!(formatter, "spawn cell outside play field"),
            Self::SpawnInsideWall => write!(formatter, "spawn body covered by a wall"),
            Self::FirstStepBlocked => write!(formatter, "first step from spawn is walled off"),
            Self::InsufficientReachableCells => {
                write!(formatter, "too few empty cells reachable from spawn")
            }
        }
    }
}

impl Error for ValidationError {}

/// Minimum number of empty cells a playable level must expose from spawn.
const MIN_REACHABLE_CELLS: usize = 16;

/// The ordered set of playable levels.
#[derive(Clone, Debug)]
pub struct Catalog {
    levels: Vec<LevelDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Builds the catalog of all ten levels.
    ///
    /// Debug builds assert that every descriptor passes [`Catalog::validate`].
    #[must_use]
    pub fn new() -> Self {
        let base = BASE_HALF_EXTENT;
        let spawn_east = |x: i32| SpawnPose::new(Cell::new(x, 0), Direction::East);
        let level = |index: u32,
                     name: &'static str,
                     wrap: bool,
                     half: i32,
                     target: u32,
                     tick_ms: u64,
                     spawn: SpawnPose,
                     layout: WallLayout| LevelDescriptor {
            index: LevelIndex::new(index),
            name,
            wrap,
            bounds: GridBounds::new(half),
            target_score: target,
            tick: Duration::from_millis(tick_ms),
            spawn,
            layout,
        };

        let compact = (base * 7 / 10).max(6);
        let gauntlet = (base * 13 / 20).max(5);

        let levels = vec![
            level(0, "Open Field", true, base, 5, 300, spawn_east(0), WallLayout::Open),
            level(1, "The Box", false, base, 7, 290, spawn_east(0), WallLayout::Perimeter),
            level(
                2,
                "Cross",
                false,
                base,
                9,
                280,
                spawn_east(0),
                WallLayout::Cross {
                    arm: base * 4 / 5,
                    gap: 1,
                },
            ),
            level(
                3,
                "Simple Maze",
                false,
                base,
                6,
                360,
                spawn_east(0),
                WallLayout::Maze {
                    offset: (base / 2).max(3),
                    gap: 2,
                },
            ),
            level(4, "Speed Run", true, base, 12, 300, spawn_east(0), WallLayout::Open),
            level(
                5,
                "Four Pillars",
                false,
                base,
                10,
                300,
                spawn_east(0),
                WallLayout::Pillars {
                    offset: (base / 2).max(3),
                    radius: 1,
                },
            ),
            level(
                6,
                "Ring w/ Gates",
                false,
                base,
                14,
                270,
                spawn_east(0),
                WallLayout::RingWithGates {
                    inner: base / 2,
                    gate_half: 2,
                },
            ),
            level(
                7,
                "Corridors",
                false,
                base,
                22,
                230,
                spawn_east(-(base / 2)),
                WallLayout::Corridors { lanes: 3 },
            ),
            level(8, "Small & Fast", false, compact, 25, 220, spawn_east(0), WallLayout::Perimeter),
            level(
                9,
                "Gauntlet",
                false,
                gauntlet,
                30,
                210,
                spawn_east(0),
                WallLayout::Union(vec![
                    InsetLayout {
                        inset: 0,
                        layout: WallLayout::Perimeter,
                    },
                    InsetLayout {
                        inset: 1,
                        layout: WallLayout::Cross {
                            arm: (gauntlet - 1) * 9 / 10,
                            gap: 1,
                        },
                    },
                    // Three lanes keep the corridor columns off the spawn
                    // zone; a fourth would seal the snake into a pocket.
                    InsetLayout {
                        inset: 1,
                        layout: WallLayout::Corridors { lanes: 3 },
                    },
                ]),
            ),
        ];

        let catalog = Self { levels };
        debug_assert_eq!(catalog.validate(), Ok(()), "authored level fails validation");
        catalog
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Retrieves the descriptor for the provided index, if it exists.
    #[must_use]
    pub fn get(&self, index: LevelIndex) -> Option<&LevelDescriptor> {
        self.levels.get(index.get() as usize)
    }

    /// Reports whether the provided index names the final level.
    #[must_use]
    pub fn is_final(&self, index: LevelIndex) -> bool {
        index.get() as usize + 1 == self.levels.len()
    }

    /// Iterator over the descriptors in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelDescriptor> {
        self.levels.iter()
    }

    /// Validates every descriptor, surfacing the first authoring defect.
    pub fn validate(&self) -> Result<(), (LevelIndex, ValidationError)> {
        for descriptor in &self.levels {
            validate_descriptor(descriptor).map_err(|error| (descriptor.index(), error))?;
        }
        Ok(())
    }
}

fn validate_descriptor(descriptor: &LevelDescriptor) -> Result<(), ValidationError> {
    let bounds = descriptor.bounds();
    let spawn = descriptor.spawn();
    let walls = descriptor.wall_cells();

    if !bounds.contains(spawn.cell()) {
        return Err(ValidationError::SpawnOutOfBounds);
    }
    // Head plus the two trailing body cells laid out behind it.
    let trailing = spawn.heading().opposite();
    let mut body = spawn.cell();
    for _ in 0..3 {
        if walls.contains(&body) {
            return Err(ValidationError::SpawnInsideWall);
        }
        body = body.offset(trailing);
    }

    let first_step = spawn.cell().offset(spawn.heading());
    match bounds.resolve(first_step, descriptor.wrap()) {
        Some(cell) if !walls.contains(&cell) => {}
        _ => return Err(ValidationError::FirstStepBlocked),
    }

    if reachable_cells(spawn.cell(), bounds, descriptor.wrap(), &walls) < MIN_REACHABLE_CELLS {
        return Err(ValidationError::InsufficientReachableCells);
    }
    Ok(())
}

/// Counts empty cells reachable from `start` via orthogonal moves.
fn reachable_cells(start: Cell, bounds: GridBounds, wrap: bool, walls: &HashSet<Cell>) -> usize {
    let mut seen: HashSet<Cell> = HashSet::new();
    let mut queue: VecDeque<Cell> = VecDeque::new();
    let _ = seen.insert(start);
    queue.push_back(start);

    let limit = bounds.cell_count();
    let mut expanded = 0;
    while let Some(cell) = queue.pop_front() {
        expanded += 1;
        if expanded > limit {
            break;
        }
        for direction in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            let Some(next) = bounds.resolve(cell.offset(direction), wrap) else {
                continue;
            };
            if walls.contains(&next) || !seen.insert(next) {
                continue;
            }
            queue.push_back(next);
        }
    }
    seen.len()
}
