//! Headless session driver wiring the world, systems, and scheduler.
//!
//! The driver owns one tick pipeline: frames advance the food-expiry clock
//! unconditionally, then the scheduler hands out whole ticks one at a time.
//! Every event batch is pumped through the systems until they go quiet, so a
//! single frame can cover eating, scoring, growth, and the replacement food.

use std::time::Duration;

use anyhow::bail;
use snake3d_core::{
    Cell, Command, Direction, Event, GameOverReason, GameplaySettings, LevelIndex,
};
use snake3d_rendering::{
    collect_audio_cues, eased_alpha, cell_to_world, snake_presentation, AudioCue,
    FoodPresentation, Hud, Scene,
};
use snake3d_system_food::{Config as FoodConfig, FoodSpawner};
use snake3d_system_progression::Progression;
use snake3d_system_scheduler::{format_run_time, Config as SchedulerConfig, Phase, Scheduler};
use snake3d_world::{self as world, query, World};

/// One headless play-through across consecutive levels.
pub(crate) struct Session {
    world: World,
    spawner: FoodSpawner,
    progression: Progression,
    scheduler: Scheduler,
    settings: GameplaySettings,
    level: LevelIndex,
    cues: Vec<AudioCue>,
}

impl Session {
    /// Starts a session on the given level.
    pub(crate) fn new(
        level: LevelIndex,
        settings: GameplaySettings,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let mut session = Self {
            world: World::new(),
            spawner: FoodSpawner::new(FoodConfig::new(seed)),
            progression: Progression::new(),
            scheduler: Scheduler::new(SchedulerConfig::new(settings.difficulty)),
            settings,
            level,
            cues: Vec::new(),
        };
        session.scheduler.reset_run();
        session.load(level)?;
        Ok(session)
    }

    fn load(&mut self, level: LevelIndex) -> anyhow::Result<()> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::LoadLevel {
                index: level,
                settings: self.settings,
            },
            &mut events,
        );
        if events.contains(&Event::LevelLoadRejected { index: level }) {
            bail!("level {} does not exist", level.get());
        }
        self.level = level;
        self.pump(events);
        self.scheduler
            .start_level(query::level_view(&self.world).tick);
        Ok(())
    }

    /// Runs the systems over an event batch until no commands remain.
    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            self.scheduler.notify(&events);
            collect_audio_cues(&events, &mut self.cues);

            let mut commands = Vec::new();
            {
                let level = query::level_view(&self.world);
                let snake = query::snake_view(&self.world);
                let walls = query::wall_view(&self.world);
                self.spawner
                    .handle(&events, &level, &snake, &walls, &mut commands);
                self.progression.handle(&events, &snake, &mut commands);
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    /// Advances the session by one wall-clock frame.
    pub(crate) fn advance(&mut self, dt: Duration) {
        // Timed food keeps aging through countdowns and pauses.
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::AdvanceClock { dt }, &mut events);
        self.pump(events);

        self.scheduler.begin_frame(dt);
        while self.scheduler.consume_tick() {
            let mut events = Vec::new();
            world::apply(&mut self.world, Command::StepSnake, &mut events);
            // A terminal tick flips the scheduler phase inside this pump,
            // which stops the consume loop with the frame remainder unspent.
            self.pump(events);
        }
    }

    /// Queues a heading change for the next tick.
    pub(crate) fn queue_direction(&mut self, direction: Direction) {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::QueueDirection { direction },
            &mut events,
        );
    }

    /// Toggles between running and paused.
    pub(crate) fn toggle_pause(&mut self) {
        self.scheduler.toggle_pause();
    }

    /// Moves a completed session to the following level.
    ///
    /// Returns `false` when there is no level to advance to, either because
    /// the current one is still in play or because the run finished the
    /// catalog.
    pub(crate) fn next_level(&mut self) -> anyhow::Result<bool> {
        if self.scheduler.phase() != Phase::LevelComplete {
            return Ok(false);
        }
        let next = self.level.get() + 1;
        if next as usize >= query::level_count(&self.world) {
            return Ok(false);
        }
        self.load(LevelIndex::new(next))?;
        Ok(true)
    }

    /// Drains the feedback cues collected since the last call.
    pub(crate) fn take_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    pub(crate) fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub(crate) fn game_over(&self) -> Option<GameOverReason> {
        query::game_over(&self.world)
    }

    /// Whether the run cleared the final catalog level.
    pub(crate) fn won(&self) -> bool {
        query::level_completed(&self.world)
            && (self.level.get() + 1) as usize == query::level_count(&self.world)
    }

    pub(crate) fn level(&self) -> LevelIndex {
        self.level
    }

    pub(crate) fn run_time(&self) -> Duration {
        self.scheduler.run_time()
    }

    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// One-line status suitable for printing after each frame batch.
    pub(crate) fn status_line(&self) -> String {
        let hud = self.scene().hud;
        format!(
            "[{}] {} | score {}/{} | {}",
            self.level.get(),
            hud.level_name,
            hud.score,
            hud.target,
            hud.run_time,
        )
    }

    /// Builds the frame's scene the way a graphical backend would consume it.
    pub(crate) fn scene(&self) -> Scene {
        let level = query::level_view(&self.world);
        let snake = query::snake_view(&self.world);
        let eased = eased_alpha(self.scheduler.alpha(), self.settings.reduce_motion);
        let clock = query::clock(&self.world);
        Scene {
            bounds: level.bounds,
            wrap: level.wrap,
            walls: query::wall_view(&self.world)
                .iter()
                .map(cell_to_world)
                .collect(),
            snake: snake_presentation(&snake, eased),
            food: query::food_view(&self.world).map(|food| {
                FoodPresentation::new(
                    food.cell,
                    food.kind,
                    food.expires_at
                        .map(|deadline| deadline.saturating_sub(clock)),
                )
            }),
            hud: Hud {
                level_name: level.name.to_owned(),
                score: query::score(&self.world),
                target: level.target_score,
                countdown: (self.scheduler.phase() == Phase::Countdown)
                    .then(|| self.scheduler.countdown_remaining()),
                run_time: format_run_time(self.scheduler.run_time()),
            },
        }
    }

    /// Renders the board as ASCII, one row per z coordinate.
    pub(crate) fn render_board(&self) -> String {
        let level = query::level_view(&self.world);
        let snake = query::snake_view(&self.world);
        let walls = query::wall_view(&self.world);
        let food = query::food_view(&self.world);
        let half = level.bounds.half_extent();

        let mut board = String::new();
        for z in -half..=half {
            for x in -half..=half {
                let cell = Cell::new(x, z);
                let glyph = if snake.head() == Some(cell) {
                    'S'
                } else if snake.occupies(cell) {
                    'o'
                } else if food.map(|food| food.cell) == Some(cell) {
                    '*'
                } else if walls.is_wall(cell) {
                    '#'
                } else {
                    '.'
                };
                board.push(glyph);
            }
            board.push('\n');
        }
        board
    }
}
