//! Launch Bounce headless runner
//!
//! Loads a campaign of levels, fires the ball with a fixed angle and power at
//! the start of every level, and pumps ticks until the campaign ends or the
//! tick budget runs out.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use launch_bounce::level::load_campaign;
use launch_bounce::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use launch_bounce::{ReflectionMode, Settings};

#[derive(Parser, Debug)]
#[command(about = "Run launch-bounce levels without a window", version)]
struct Args {
    /// Directory holding lvl1.txt, lvl2.txt, ...
    #[arg(long, default_value = ".")]
    levels: PathBuf,
    /// First level to play (1-based)
    #[arg(long, default_value_t = 1)]
    start_level: usize,
    /// Launch angle in degrees (y grows downward)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    angle: i32,
    /// Launch power in percent of the maximum velocity
    #[arg(long, default_value_t = 50.0)]
    power: f64,
    /// Give up after this many ticks in total
    #[arg(long, default_value_t = 5000)]
    max_ticks: u64,
    /// Optional JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Override the reflection mode (consistent | legacy)
    #[arg(long, value_parser = parse_reflection)]
    reflection: Option<ReflectionMode>,
    /// Sleep the tick interval between ticks
    #[arg(long)]
    realtime: bool,
    /// Print the final simulation state as JSON
    #[arg(long)]
    dump_json: bool,
}

fn parse_reflection(s: &str) -> Result<ReflectionMode, String> {
    ReflectionMode::from_str(s).ok_or_else(|| format!("unknown reflection mode {s:?}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if let Some(mode) = args.reflection {
        settings.reflection = mode;
    }
    log::info!("Reflection mode: {}", settings.reflection.as_str());

    let levels = load_campaign(&args.levels)
        .with_context(|| format!("loading levels from {}", args.levels.display()))?;
    if levels.is_empty() {
        bail!("no levels found in {}", args.levels.display());
    }
    if args.start_level == 0 || args.start_level > levels.len() {
        bail!("start level {} is outside 1..={}", args.start_level, levels.len());
    }

    let interval = Duration::from_millis(settings.tick_interval_ms);
    let mut state = GameState::new(levels, args.start_level - 1, settings);
    let mut won = 0;
    let mut ticks = 0;

    while ticks < args.max_ticks && state.phase != GamePhase::GameOver {
        let mut input = TickInput::default();
        if state.phase == GamePhase::Aiming {
            state.launcher.set_angle(args.angle);
            state.launcher.set_power_percent(args.power);
            log::info!("Level {}: {}", state.level_number(), state.launcher.status_line());
            input.launch = true;
        }

        for event in tick(&mut state, &input) {
            match event {
                GameEvent::LevelWon { level } => {
                    println!("Level {level} completed after {ticks} tick(s)");
                    won += 1;
                }
                GameEvent::GameOver => println!("GAME OVER"),
                other => log::debug!("{:?}", other),
            }
        }

        ticks += 1;
        if args.realtime {
            std::thread::sleep(interval);
        }
    }

    println!(
        "{} level(s) won in {} tick(s); {} tick(s) in flight",
        won, ticks, state.flight_ticks
    );
    if let Some(sim) = state.simulation() {
        let ball = sim.ball();
        println!(
            "Level {} ball at ({:.2}, {:.2}) moving ({:.2}, {:.2})",
            state.level_number(),
            ball.center().x,
            ball.center().y,
            ball.vel.x,
            ball.vel.y
        );
        if args.dump_json {
            println!("{}", serde_json::to_string_pretty(sim)?);
        }
    }

    Ok(())
}
