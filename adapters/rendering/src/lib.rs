#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Snake3D adapters.
//!
//! The simulation exposes a linear interpolation alpha between discrete
//! ticks; all visual easing lives here so backends see eased positions while
//! the simulation stays linear and deterministic.

use anyhow::Result as AnyResult;
use glam::Vec3;
use snake3d_core::{Cell, Event, FoodKind, GameOverReason, GridBounds, SnakeView};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Body color used for snake segments.
pub const SNAKE_COLOR: Color = Color::from_rgb_u8(0x4c, 0xaf, 0x50);

/// Colors food items by their kind.
#[must_use]
pub const fn food_color(kind: FoodKind) -> Color {
    match kind {
        FoodKind::Normal => Color::from_rgb_u8(0xe5, 0x39, 0x35),
        FoodKind::Golden => Color::from_rgb_u8(0xff, 0xc1, 0x07),
        FoodKind::Poison => Color::from_rgb_u8(0x8e, 0x24, 0xaa),
    }
}

/// Cubic smoothstep over `0.0..=1.0`.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eases the simulation's linear alpha for presentation.
///
/// With reduced motion requested, segments snap to their tick positions.
#[must_use]
pub fn eased_alpha(alpha: f32, reduce_motion: bool) -> f32 {
    if reduce_motion {
        return 1.0;
    }
    smoothstep(alpha)
}

/// Maps a grid cell onto the ground plane of the 3D scene.
#[must_use]
pub fn cell_to_world(cell: Cell) -> Vec3 {
    Vec3::new(cell.x() as f32, 0.0, cell.z() as f32)
}

/// Interpolates one segment between its previous and current tick cells.
///
/// A segment that folded across the play-field edge during the tick would
/// otherwise sweep across the whole board; jumps longer than one cell snap to
/// the current position instead.
#[must_use]
pub fn segment_position(previous: Cell, current: Cell, alpha: f32) -> Vec3 {
    let dx = (current.x() - previous.x()).abs();
    let dz = (current.z() - previous.z()).abs();
    if dx > 1 || dz > 1 {
        return cell_to_world(current);
    }
    cell_to_world(previous).lerp(cell_to_world(current), alpha.clamp(0.0, 1.0))
}

/// Interpolated snake body ready for a backend to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakePresentation {
    /// Head-first world-space segment positions.
    pub segments: Vec<Vec3>,
    /// Body color shared by every segment.
    pub color: Color,
}

/// Builds the snake's presentation from a world snapshot and eased alpha.
///
/// Segments without a previous-tick counterpart (freshly grown tail clones)
/// stay at their current cell.
#[must_use]
pub fn snake_presentation(snake: &SnakeView, eased: f32) -> SnakePresentation {
    let previous = snake.previous();
    let segments = snake
        .body()
        .iter()
        .enumerate()
        .map(|(index, current)| match previous.get(index) {
            Some(prev) => segment_position(*prev, *current, eased),
            None => cell_to_world(*current),
        })
        .collect();
    SnakePresentation {
        segments,
        color: SNAKE_COLOR,
    }
}

/// A food item positioned in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodPresentation {
    /// World-space position on the ground plane.
    pub position: Vec3,
    /// Kind-specific fill color.
    pub color: Color,
    /// Time left before the item retires, for pulsing effects.
    pub time_left: Option<Duration>,
}

impl FoodPresentation {
    /// Creates a presentation for a food item at the provided cell.
    #[must_use]
    pub fn new(cell: Cell, kind: FoodKind, time_left: Option<Duration>) -> Self {
        Self {
            position: cell_to_world(cell),
            color: food_color(kind),
            time_left,
        }
    }
}

/// Heads-up display content shown alongside the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Display name of the active level.
    pub level_name: String,
    /// Current score within the level.
    pub score: u32,
    /// Score required to complete the level.
    pub target: u32,
    /// Seconds left on the pre-play countdown, if one is showing.
    pub countdown: Option<Duration>,
    /// Formatted run timer shown during play.
    pub run_time: String,
}

/// Scene description combining the board, snake, food, and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Play-field bounds used to size the ground plane.
    pub bounds: GridBounds,
    /// Whether the play field wraps at its edges.
    pub wrap: bool,
    /// World-space positions of every wall block.
    pub walls: Vec<Vec3>,
    /// Interpolated snake body.
    pub snake: SnakePresentation,
    /// The single active food item, if placed.
    pub food: Option<FoodPresentation>,
    /// HUD content for the frame.
    pub hud: Hud,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Snake3D scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The `update_scene` closure receives the frame delta and may mutate the
    /// scene before it is rendered, letting adapters animate world snapshots.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Discrete feedback cue mapped from a simulation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    /// A plain food item was eaten.
    AteNormal,
    /// A golden food item was eaten.
    AteGolden,
    /// A poison food item was eaten.
    AtePoison,
    /// The active level's target score was reached.
    LevelComplete,
    /// The run ended with the given reason.
    GameOver(GameOverReason),
}

/// Maps a frame's event batch to the cues a backend should play.
pub fn collect_audio_cues(events: &[Event], out: &mut Vec<AudioCue>) {
    for event in events {
        match event {
            Event::FoodEaten { kind, .. } => out.push(match kind {
                FoodKind::Normal => AudioCue::AteNormal,
                FoodKind::Golden => AudioCue::AteGolden,
                FoodKind::Poison => AudioCue::AtePoison,
            }),
            Event::LevelCompleted { .. } => out.push(AudioCue::LevelComplete),
            Event::GameOver { reason } => out.push(AudioCue::GameOver(*reason)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake3d_core::Direction;

    #[test]
    fn smoothstep_hits_its_endpoints() {
        assert!((smoothstep(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((smoothstep(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((smoothstep(0.5) - 0.5).abs() < f32::EPSILON);
        // Monotone between endpoints.
        assert!(smoothstep(0.25) < smoothstep(0.75));
    }

    #[test]
    fn reduced_motion_snaps_to_tick_positions() {
        assert!((eased_alpha(0.3, true) - 1.0).abs() < f32::EPSILON);
        assert!(eased_alpha(0.3, false) < 0.3);
    }

    #[test]
    fn adjacent_cells_interpolate_linearly_at_the_midpoint() {
        let position = segment_position(Cell::new(0, 0), Cell::new(1, 0), 0.5);
        assert_eq!(position, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn wrap_teleports_snap_instead_of_sweeping() {
        let position = segment_position(Cell::new(10, 0), Cell::new(-10, 0), 0.5);
        assert_eq!(position, Vec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn fresh_tail_clones_stay_put() {
        let snake = SnakeView::new(
            vec![
                Cell::new(1, 0),
                Cell::new(0, 0),
                Cell::new(-1, 0),
                Cell::new(-1, 0),
            ],
            vec![Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            Direction::East,
        );
        let presentation = snake_presentation(&snake, 0.5);
        assert_eq!(presentation.segments.len(), 4);
        assert_eq!(presentation.segments[3], Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn events_map_to_their_cues() {
        let events = vec![
            Event::FoodEaten {
                cell: Cell::new(0, 0),
                kind: FoodKind::Golden,
            },
            Event::GameOver {
                reason: GameOverReason::SelfCollision,
            },
        ];
        let mut cues = Vec::new();
        collect_audio_cues(&events, &mut cues);
        assert_eq!(
            cues,
            vec![
                AudioCue::AteGolden,
                AudioCue::GameOver(GameOverReason::SelfCollision),
            ]
        );
    }
}
