//! Gap Runner headless driver
//!
//! Runs the simulation with a simple autopilot on jittery frame times and
//! reports the distance reached. Stands in for the outer application loop.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use gap_runner::sim::SegmentKind;
use gap_runner::{FrameInput, Game, GameConfig, GameEvent};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless gap runner simulation")]
struct Args {
    /// JSON config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,
    /// Stop a game after this many frames
    #[arg(long, default_value_t = 60 * 120)]
    max_frames: u32,
    /// Nominal frame rate of the outer loop
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Print the default config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Hold jump while the floor a short way ahead is above the runner
fn autopilot(game: &Game, holding: bool) -> FrameInput {
    let runner = game.runner();
    let extents = runner.config().extents;
    let ahead = runner.position().x + extents + runner.speed_x() * 0.25;

    let floor_ahead = game
        .obstacles()
        .segments()
        .filter(|(_, s)| !matches!(s.kind(), SegmentKind::Gap))
        .find(|(_, s)| s.min_x() <= ahead && ahead < s.max_x())
        .map(|(_, s)| s.aperture_y().min);

    let wants_jump = floor_ahead
        .map(|floor| floor + extents > runner.position().y + 0.05)
        .unwrap_or(false);

    FrameInput {
        jump_pressed: wants_jump && !holding,
        jump_released: !wants_jump && holding,
        new_game: false,
    }
}

fn play(game: &mut Game, args: &Args, jitter: &mut Pcg32) -> u32 {
    let nominal = 1.0 / args.fps;
    let mut holding = false;
    let mut frames = 0;

    game.start_new_game();

    while game.is_playing() && frames < args.max_frames {
        let input = autopilot(game, holding);
        holding = (holding || input.jump_pressed) && !input.jump_released;

        let dt = nominal * jitter.random_range(0.5..2.0);
        game.frame(input, dt);
        frames += 1;

        for event in game.drain_events() {
            match event {
                GameEvent::Destroyed { position } => {
                    log::info!("Crashed at ({:.2}, {:.2})", position.x, position.y)
                }
                GameEvent::ItemConsumed { position, .. } => {
                    log::debug!("Slowdown item at ({:.2}, {:.2})", position.x, position.y)
                }
                GameEvent::JumpStarted => log::trace!("Jump"),
            }
        }
        if frames % 600 == 0 {
            log::info!("Distance {}", game.distance());
        }
    }
    frames
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.dump_config {
        println!("{}", GameConfig::default().to_json()?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut jitter = Pcg32::seed_from_u64(config.seed);
    let mut game = Game::new(config)?;
    log::info!("Gap Runner starting...");

    for round in 1..=args.games {
        let frames = play(&mut game, &args, &mut jitter);
        println!(
            "game {round}: distance {} after {frames} frames{}",
            game.distance(),
            if game.is_playing() { " (still running)" } else { "" }
        );
    }
    Ok(())
}
