//! Othello engine binary
//!
//! Speaks the referee line protocol on stdin/stdout. Logs go to stderr or,
//! with `--log-file`, to a file so they never mix with protocol replies.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use othello::{Coordinator, EngineConfig, PassPolicy, Session, Side};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Colour {
    Black,
    White,
}

impl From<Colour> for Side {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Black => Side::Black,
            Colour::White => Side::White,
        }
    }
}

/// Parallel Othello engine for tournament referees
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of search worker threads
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Search depth in plies
    #[arg(short, long, default_value_t = 5)]
    depth: u8,

    /// Search higher-weight cells first
    #[arg(long)]
    order_moves: bool,

    /// Keep searching through passes instead of evaluating there
    #[arg(long)]
    pass_continues: bool,

    /// Stop waiting for worker reports after this many milliseconds
    #[arg(long, value_name = "MS")]
    collect_timeout: Option<u64>,

    /// Play this colour instead of inferring it from the first command
    #[arg(long, value_enum)]
    color: Option<Colour>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let pass_policy = if self.pass_continues {
            PassPolicy::Continue
        } else {
            PassPolicy::Evaluate
        };
        let config = EngineConfig::default()
            .with_workers(self.workers)
            .with_max_depth(self.depth)
            .with_order_moves(self.order_moves)
            .with_pass_policy(pass_policy);
        match self.collect_timeout {
            Some(ms) => config.with_collect_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let mut engine =
        Coordinator::new(args.engine_config()).context("failed to start the engine")?;

    let mut session = Session::new(&mut engine);
    if let Some(colour) = args.color {
        session = session.with_colour(colour.into());
    }
    let summary = session
        .run(io::stdin().lock(), io::stdout().lock())
        .context("referee session failed")?;

    tracing::info!(
        colour = ?summary.colour,
        moves = summary.generated,
        game_over = summary.game_over,
        "session finished"
    );
    engine.shutdown();
    Ok(())
}
