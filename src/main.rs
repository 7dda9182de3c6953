//! Ghost Cursor CLI - inspection and manual moves
//!
//! Loads a recording, reports what the index holds, previews planned
//! moves, and (with the `desktop` feature) moves the real cursor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ghost_cursor::config::Settings;
use ghost_cursor::replay::VirtualPointer;
use ghost_cursor::trajectory::{PathSegmenter, TrajectoryIndex};
use ghost_cursor::{GhostCursor, GhostError};

#[derive(Parser)]
#[command(name = "ghost", version, about = "Replay recorded human cursor paths")]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recording to load, overriding the settings file
    #[arg(long)]
    recording: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show how many paths were accepted and how they spread over distances
    Stats,
    /// Print the positions a move would visit, without moving anything
    Plan {
        /// Start position as X,Y
        #[arg(long, value_parser = parse_point)]
        from: (i32, i32),
        /// Goal position as X,Y
        #[arg(long, value_parser = parse_point)]
        to: (i32, i32),
        /// Seed for path selection
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Move the real cursor (requires the `desktop` feature)
    Move {
        /// Goal position as X,Y
        #[arg(long, value_parser = parse_point)]
        to: (i32, i32),
    },
}

fn parse_point(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("invalid X '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("invalid Y '{}': {}", y, e))?;
    Ok((x, y))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GhostError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(recording) = cli.recording {
        settings.recording_path = recording;
    }

    match cli.command {
        Command::Stats => stats(&settings),
        Command::Plan { from, to, seed } => {
            if seed.is_some() {
                settings.replay.seed = seed;
            }
            plan(settings, from, to)
        }
        Command::Move { to } => move_cursor(settings, to),
    }
}

fn stats(settings: &Settings) -> Result<(), GhostError> {
    settings.validate()?;

    let report = PathSegmenter::from_settings(settings).load(&settings.recording_path)?;
    let (accepted, rejected) = (report.paths.len(), report.rejected());
    let skipped = report.lines_skipped;
    let index = TrajectoryIndex::build(report.paths, settings.max_distance);

    println!("Recording: {}", settings.recording_path.display());
    println!("  - Lines read: {}", report.lines_read);
    println!("  - Lines skipped: {}", skipped);
    println!("  - Paths accepted: {}", accepted);
    println!(
        "  - Paths rejected: {} (duration {}, distance {}, points {})",
        rejected,
        report.rejected_duration,
        report.rejected_displacement,
        report.rejected_point_count
    );
    println!();

    for (distance, count) in index.histogram() {
        println!("There are {} paths of length {}", count, distance);
    }

    Ok(())
}

fn plan(settings: Settings, from: (i32, i32), to: (i32, i32)) -> Result<(), GhostError> {
    let mut cursor = GhostCursor::load(settings, VirtualPointer::at(from.0, from.1))?;
    let plan = cursor.plan(from, to)?;

    println!(
        "Moving from {}, {} to {}, {} ({} px, {:.1} degrees, {} candidates)",
        from.0,
        from.1,
        to.0,
        to.1,
        plan.distance,
        plan.direction.to_degrees(),
        plan.candidates
    );
    for step in &plan.steps {
        println!("{},{} +{}ms", step.x, step.y, step.delay_ms);
    }

    Ok(())
}

#[cfg(feature = "desktop")]
fn move_cursor(settings: Settings, to: (i32, i32)) -> Result<(), GhostError> {
    use ghost_cursor::replay::{DesktopPointer, ReplayError};

    let pointer = DesktopPointer::new().map_err(ReplayError::from)?;
    let mut cursor = GhostCursor::load(settings, pointer)?;
    let plan = cursor.move_to(to.0, to.1)?;

    log::info!(
        "Moved to {}, {} in {} steps over {}ms",
        to.0,
        to.1,
        plan.steps.len(),
        plan.total_delay_ms()
    );
    Ok(())
}

#[cfg(not(feature = "desktop"))]
fn move_cursor(_settings: Settings, _to: (i32, i32)) -> Result<(), GhostError> {
    use ghost_cursor::replay::{PointerError, ReplayError};

    Err(ReplayError::from(PointerError::Unavailable(
        "built without the `desktop` feature".to_string(),
    ))
    .into())
}
