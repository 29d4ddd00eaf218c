#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Holdout session.
//!
//! The binary drives a [`Session`] against a simulated arena and prints every
//! session event to stdout. Diagnostics go to stderr through `tracing`; set
//! `RUST_LOG` to adjust verbosity.

mod arena;

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use holdout_core::{Command, Event, SessionConfig, SessionState, WaveCatalog, WELCOME_BANNER};
use holdout_session::{apply, query, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arena::{Arena, Skirmish};

const STEP: Duration = Duration::from_millis(100);

/// Options accepted by the `holdout` binary.
#[derive(Debug, Parser)]
#[command(name = "holdout")]
#[command(about = "Headless Holdout survival simulation")]
struct Cli {
    /// Number of simulated players that join at start.
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..=64))]
    players: u64,

    /// Players required before the first countdown starts.
    #[arg(long, default_value_t = 1)]
    required: usize,

    /// Seed shared by the session and the simulated arena.
    #[arg(short, long, default_value_t = 7)]
    seed: u64,

    /// Simulated seconds to run before giving up.
    #[arg(long, default_value_t = 1_200)]
    seconds: u64,

    /// Chance per second that a standing player kills a unit.
    #[arg(long, default_value_t = 0.4)]
    lethality: f64,

    /// Chance per second that a live unit downs a player.
    #[arg(long, default_value_t = 0.002)]
    threat: f64,
}

/// Entry point for the Holdout command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    ensure!(
        (0.0..=1.0).contains(&cli.lethality),
        "--lethality must be between 0 and 1"
    );
    ensure!(
        (0.0..=1.0).contains(&cli.threat),
        "--threat must be between 0 and 1"
    );

    let config = SessionConfig {
        required_players: cli.required,
        rng_seed: cli.seed,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config, WaveCatalog::standard())
        .context("invalid session configuration")?;
    let mut arena = Arena::new(cli.players, cli.seed);
    let odds = Skirmish {
        lethality: cli.lethality,
        threat: cli.threat,
    };

    println!("{WELCOME_BANNER}");
    let mut events = Vec::new();
    for player in arena.player_ids() {
        apply(&mut session, Command::AddPlayer { player }, &mut arena, &mut events);
    }

    let limit = Duration::from_secs(cli.seconds);
    let mut now = Duration::ZERO;
    let mut outcome = None;
    while now <= limit && outcome.is_none() {
        if now.subsec_nanos() == 0 {
            let boss = query::boss(&session).map(|boss| boss.actor());
            arena.skirmish(now, boss, odds);
            for report in arena.take_reports() {
                apply(&mut session, report, &mut arena, &mut events);
            }
        }
        apply(&mut session, Command::Tick { now }, &mut arena, &mut events);

        for event in events.drain(..) {
            if let Event::StateChanged {
                to: to @ (SessionState::PlayersWin | SessionState::AllPlayersDead),
                ..
            } = event
            {
                outcome = Some(to);
            }
            println!("[{:>7.1}s] {event:?}", now.as_secs_f32());
        }
        now += STEP;
    }

    match outcome {
        Some(state) => info!(?state, wave = %query::wave(&session), "session finished"),
        None => info!(wave = %query::wave(&session), "time limit reached"),
    }
    println!("{}", query::objective_text(&session));
    println!("loot containers dropped: {}", arena.containers());
    for row in arena.scoreboard() {
        println!(
            "{:<14} {:>6} scrap {:>4} kills {:>4} deaths",
            row.display_name, row.currency, row.kills, row.deaths
        );
    }

    apply(&mut session, Command::Shutdown, &mut arena, &mut events);
    for event in events.drain(..) {
        println!("[{:>7.1}s] {event:?}", now.as_secs_f32());
    }
    Ok(())
}
