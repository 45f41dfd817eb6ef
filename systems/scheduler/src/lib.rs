#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep scheduler driving the simulation from wall-clock frames.
//!
//! Frames of arbitrary length are folded into an accumulator; whole tick
//! durations are handed out one at a time through [`Scheduler::consume_tick`]
//! so the caller can stop mid-frame when a tick ends the run. The leftover
//! fraction is exposed as an interpolation alpha for rendering.

use std::time::Duration;

use snake3d_core::{Difficulty, Event};

/// Countdown shown before play begins on every level.
pub const COUNTDOWN: Duration = Duration::from_secs(3);

/// Lifecycle phase the scheduler is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Pre-play countdown; the accumulator stays empty.
    Countdown,
    /// Normal play; frames accumulate into ticks.
    Running,
    /// Play suspended by the player; no ticks and no run time accrue.
    Paused,
    /// The active level's target score was reached.
    LevelComplete,
    /// The run ended in a collision.
    GameOver,
}

/// Configuration consumed by [`Scheduler::new`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    difficulty: Difficulty,
}

impl Config {
    /// Creates a config with the provided difficulty preset.
    #[must_use]
    pub const fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }
}

/// Fixed-timestep scheduler with countdown, pause, and terminal phases.
#[derive(Debug)]
pub struct Scheduler {
    difficulty: Difficulty,
    tick: Duration,
    accumulator: Duration,
    countdown_remaining: Duration,
    run_time: Duration,
    phase: Phase,
}

impl Scheduler {
    /// Creates an idle scheduler; call [`Scheduler::start_level`] to arm it.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            difficulty: config.difficulty,
            tick: Duration::ZERO,
            accumulator: Duration::ZERO,
            countdown_remaining: Duration::ZERO,
            run_time: Duration::ZERO,
            phase: Phase::GameOver,
        }
    }

    /// Arms the scheduler for a level, scaling its tick by the difficulty.
    pub fn start_level(&mut self, tick: Duration) {
        let scaled = tick.as_millis() as f64 * f64::from(self.difficulty.tick_multiplier());
        self.tick = Duration::from_millis(scaled.round() as u64);
        self.accumulator = Duration::ZERO;
        self.countdown_remaining = COUNTDOWN;
        self.phase = Phase::Countdown;
    }

    /// Clears the accumulated run time, starting a fresh scoring run.
    pub fn reset_run(&mut self) {
        self.run_time = Duration::ZERO;
    }

    /// Folds a frame's elapsed wall-clock time into the scheduler.
    pub fn begin_frame(&mut self, dt: Duration) {
        match self.phase {
            Phase::Countdown => {
                if let Some(remaining) = self.countdown_remaining.checked_sub(dt) {
                    self.countdown_remaining = remaining;
                } else {
                    self.countdown_remaining = Duration::ZERO;
                    self.phase = Phase::Running;
                }
            }
            Phase::Running => {
                self.accumulator = self.accumulator.saturating_add(dt);
                self.run_time = self.run_time.saturating_add(dt);
            }
            Phase::Paused | Phase::LevelComplete | Phase::GameOver => {}
        }
    }

    /// Hands out one whole tick if enough time has accumulated.
    ///
    /// Callers loop on this and stop early when a tick ends the run, which
    /// discards the remainder of the frame instead of stepping a dead snake.
    pub fn consume_tick(&mut self) -> bool {
        if self.phase != Phase::Running || self.tick.is_zero() {
            return false;
        }
        if self.accumulator < self.tick {
            return false;
        }
        self.accumulator -= self.tick;
        true
    }

    /// Reacts to world events that move the scheduler between phases.
    pub fn notify(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::GameOver { .. } => {
                    self.phase = Phase::GameOver;
                    self.accumulator = Duration::ZERO;
                }
                Event::LevelCompleted { .. } => {
                    self.phase = Phase::LevelComplete;
                    self.accumulator = Duration::ZERO;
                }
                _ => {}
            }
        }
    }

    /// Toggles between `Running` and `Paused`; other phases are unaffected.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };
    }

    /// Fraction of the next tick already elapsed, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        if self.tick.is_zero() {
            return 0.0;
        }
        (self.accumulator.as_secs_f32() / self.tick.as_secs_f32()).min(1.0)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Effective tick duration after difficulty scaling.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Countdown remaining before play begins.
    #[must_use]
    pub const fn countdown_remaining(&self) -> Duration {
        self.countdown_remaining
    }

    /// Wall-clock play time accumulated across the run, pauses excluded.
    #[must_use]
    pub const fn run_time(&self) -> Duration {
        self.run_time
    }
}

/// Formats a run duration as `m:ss` for score displays.
#[must_use]
pub fn format_run_time(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
