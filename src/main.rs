use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chess_automator::config::Config;
use chess_automator::domain::{Orientation, PositionSet, apply, reconstruct};
use chess_automator::models::{BoardSource, FenBoardSource, GameSession, ScriptedBoardSource, UciEngine};
use chess_automator::CodecError;

#[derive(Parser, Debug)]
#[command(version, about = "Plays chess on a board it can only look at")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Which colour sits nearer the camera
    #[arg(long, global = true, value_enum)]
    nearer: Option<Side>,

    /// UCI engine executable
    #[arg(long, global = true)]
    engine: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Watch a stream of boards (one FEN per line) and print our replies
    Play {
        /// File with one board per line; standard input when omitted
        boards: Option<PathBuf>,
    },
    /// Replay a UCI move list through reconstruction and application
    Replay {
        /// Moves such as `e2e4 e7e5 g1f3`
        #[arg(required = true, num_args = 1..)]
        moves: Vec<String>,
    },
    /// Print the JSON schema of the config file
    Schema,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(side) = cli.nearer {
        config.orientation = Orientation::from_white_nearer(matches!(side, Side::White));
    }
    if let Some(engine) = cli.engine {
        config.engine_path = engine;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Cmd::Play { boards } => {
            let reader: Box<dyn BufRead> = match boards {
                Some(path) => Box::new(BufReader::new(
                    File::open(&path).with_context(|| format!("failed to open {}", path.display()))?,
                )),
                None => Box::new(io::stdin().lock()),
            };
            play(&config, FenBoardSource::new(reader, config.orientation))
        }
        Cmd::Replay { moves } => replay(moves, config.orientation),
        Cmd::Schema => {
            println!("{}", serde_json::to_string_pretty(&Config::schema())?);
            Ok(())
        }
    }
}

/// The polling loop: capture, detect, ask, apply, print
fn play(config: &Config, mut boards: impl BoardSource) -> Result<()> {
    let mut engine = UciEngine::start(&config.engine_path)?;
    let mut session = GameSession::new(config.orientation, config.depths());
    info!(orientation = ?config.orientation, "session started");

    if session.should_open() {
        let opening = session.respond(&mut engine)?;
        println!("{opening}");
    }

    while let Some(observed) = boards.capture()? {
        match session.observe(observed) {
            Ok(Some(_)) => {
                let reply = session.respond(&mut engine)?;
                println!("{reply}");
            }
            Ok(None) => thread::sleep(config.poll_interval()),
            Err(e @ (CodecError::AmbiguousDelta { .. } | CodecError::InvalidDelta(_))) => {
                // Acquisition noise: look again instead of guessing
                warn!(error = %e, "observation rejected");
                thread::sleep(config.poll_interval());
            }
            Err(e) => {
                error!(error = %e, "tracked position is no longer trustworthy");
                return Err(e.into());
            }
        }
    }

    info!(plies = session.history().len(), "board stream ended");
    engine.stop();
    Ok(())
}

/// Reconstruct every transition of a scripted game and apply the rendered
/// move back onto a tracked copy, reporting where the two disagree.
fn replay(moves: Vec<String>, orientation: Orientation) -> Result<()> {
    let mut source = ScriptedBoardSource::new(moves.clone(), orientation);
    let Some(mut prev) = source.capture()? else {
        return Ok(());
    };
    let mut tracked: PositionSet = prev.clone();
    let mut divergences = 0;

    for (ply, played) in moves.iter().enumerate() {
        let Some(curr) = source.capture()? else {
            break;
        };

        match reconstruct(&prev, &curr, orientation) {
            Ok(Some(classified)) => {
                let rendered = classified.to_string();
                let effect = apply(&mut tracked, &rendered, orientation)?;
                let verdict = if classified.uci() == *played { "ok" } else { "renders differently" };
                println!("{:>3}. {played:<6} {rendered:<6} {effect:?} {verdict}", ply + 1);
            }
            Ok(None) => println!("{:>3}. {played:<6} no change seen", ply + 1),
            Err(e) => {
                // Not reconstructible; keep tracking by applying the scripted text
                let effect = apply(&mut tracked, played, orientation)?;
                println!("{:>3}. {played:<6} {e} ({effect:?} applied)", ply + 1);
            }
        }

        if tracked != curr {
            divergences += 1;
            error!(ply = ply + 1, "tracked position diverged\n{tracked}\nobserved\n{curr}");
            tracked = curr.clone();
        }
        prev = curr;
    }

    if divergences > 0 {
        bail!("{divergences} plies diverged");
    }
    Ok(())
}
