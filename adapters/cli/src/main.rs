#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Snake3D sessions.

mod leaderboard;
mod session;
mod settings;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use snake3d_core::{Direction, LevelIndex};
use snake3d_system_scheduler::{format_run_time, Phase};

use crate::{
    leaderboard::{Entry, Leaderboard},
    session::Session,
};

/// Headless Snake3D simulation driver.
#[derive(Debug, Parser)]
#[command(name = "snake3d", version, about)]
struct Args {
    /// Catalog index of the level to start on.
    #[arg(long, default_value_t = 0)]
    level: u32,

    /// Base seed for food placement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of wall-clock frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Milliseconds of simulated time per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Settings file read for difficulty and accessibility options.
    #[arg(long, default_value = "snake3d.toml")]
    settings: PathBuf,

    /// Leaderboard file updated when the run ends.
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Name recorded on the leaderboard.
    #[arg(long, default_value = "anonymous")]
    player: String,

    /// Comma-separated actions applied once per second of simulated time:
    /// north, south, east, west, or pause (pause toggles).
    #[arg(long, value_delimiter = ',', value_parser = parse_action)]
    script: Vec<ScriptAction>,
}

/// One scripted input, consumed at one-second intervals.
#[derive(Clone, Copy, Debug)]
enum ScriptAction {
    Turn(Direction),
    Pause,
}

fn parse_action(token: &str) -> Result<ScriptAction, String> {
    match token.trim().to_ascii_lowercase().as_str() {
        "north" | "n" => Ok(ScriptAction::Turn(Direction::North)),
        "south" | "s" => Ok(ScriptAction::Turn(Direction::South)),
        "east" | "e" => Ok(ScriptAction::Turn(Direction::East)),
        "west" | "w" => Ok(ScriptAction::Turn(Direction::West)),
        "pause" => Ok(ScriptAction::Pause),
        other => Err(format!("unknown script action `{other}`")),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = settings::load_or_default(&args.settings);
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut session = Session::new(LevelIndex::new(args.level), settings, seed)?;
    println!("{} (seed {seed})", session.banner());

    let frame = Duration::from_millis(args.frame_ms);
    let mut script = args.script.into_iter();
    let mut elapsed = Duration::ZERO;
    let mut next_action_at = Duration::from_secs(1);
    for _ in 0..args.frames {
        elapsed += frame;
        while elapsed >= next_action_at {
            next_action_at += Duration::from_secs(1);
            match script.next() {
                Some(ScriptAction::Turn(direction)) => session.queue_direction(direction),
                Some(ScriptAction::Pause) => session.toggle_pause(),
                None => {}
            }
        }
        session.advance(frame);
        for cue in session.take_cues() {
            println!("{cue:?}");
        }
        match session.phase() {
            Phase::GameOver => break,
            Phase::LevelComplete => {
                if session.next_level()? {
                    println!("advancing to {}", session.status_line());
                } else {
                    break;
                }
            }
            _ => {}
        }
    }

    println!("{}", session.render_board());
    println!("{}", session.status_line());
    if let Some(reason) = session.game_over() {
        println!("game over: {reason:?}");
    } else if session.won() {
        println!("cleared the catalog in {}", format_run_time(session.run_time()));
    }

    if let Some(path) = args.leaderboard {
        if session.game_over().is_some() || session.won() {
            let mut board = Leaderboard::load(&path)?;
            board.record(Entry {
                player: args.player,
                seconds: session.run_time().as_secs(),
                level: session.level().get(),
            });
            board.save(&path)?;
            println!("recorded run to {}", path.display());
            for (place, entry) in board.entries().iter().take(5).enumerate() {
                println!(
                    "  {}. {} in {} on level {}",
                    place + 1,
                    entry.player,
                    format_run_time(Duration::from_secs(entry.seconds)),
                    entry.level,
                );
            }
        }
    }

    Ok(())
}
