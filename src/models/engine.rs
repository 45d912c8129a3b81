//! Decision source model - asks a UCI engine process for counter-moves.
//!
//! Architecture:
//! - Engine I/O runs on OS threads (reader/writer)
//! - The caller blocks on the event channel until the line it waits for arrives
//! - Exactly one request is outstanding at a time

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, trace, warn};

use crate::domain::uci::{UciCommand, UciOutputKind};

/// Something that picks the next move given the game so far
pub trait DecisionSource {
    /// Best move after `history` (UCI moves from the starting position),
    /// searched to `depth`
    fn best_move(&mut self, history: &[String], depth: u32) -> Result<String>;
}

/// Messages sent from the engine reader thread
#[derive(Debug)]
pub enum EngineEvent {
    /// A line of output from the engine
    Output(String),
    /// Engine process exited
    Exited,
    /// Error occurred
    Error(String),
}

/// A running UCI engine process
pub struct UciEngine {
    /// Whether the engine is currently running
    running: bool,
    /// Channel receiver for engine events
    event_receiver: Option<Receiver<EngineEvent>>,
    /// Channel sender for commands to engine writer thread
    command_sender: Option<Sender<String>>,
    /// Handle to the engine process
    process: Option<Child>,
}

impl UciEngine {
    /// Start the engine at `path` and complete the UCI handshake
    pub fn start(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::spawn(Command::new(path))
            .with_context(|| format!("failed to start engine at {}", path.display()))
    }

    /// Start the engine described by `command` and complete the UCI handshake
    pub fn spawn(mut command: Command) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn engine process")?;

        // Take ownership of stdin/stdout
        let stdin = child.stdin.take().context("failed to open engine stdin")?;
        let stdout = child.stdout.take().context("failed to open engine stdout")?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<String>();

        // Reader thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if event_tx.send(EngineEvent::Output(text)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(EngineEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = event_tx.send(EngineEvent::Exited);
        });

        // Writer thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let mut writer = stdin;
            while let Ok(cmd) = cmd_rx.recv() {
                if writeln!(writer, "{}", cmd).is_err() {
                    break;
                }
                if writer.flush().is_err() {
                    break;
                }
            }
        });

        let mut engine = Self {
            running: true,
            event_receiver: Some(event_rx),
            command_sender: Some(cmd_tx),
            process: Some(child),
        };

        engine.send_command(UciCommand::Uci);
        engine.wait_for(|kind| matches!(kind, UciOutputKind::UciOk).then_some(()))?;
        engine.new_game()?;
        info!("engine started");

        Ok(engine)
    }

    /// Check if the engine is currently running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tell the engine a new game begins and wait until it is ready
    pub fn new_game(&mut self) -> Result<()> {
        self.send_command(UciCommand::UciNewGame);
        self.send_command(UciCommand::IsReady);
        self.wait_for(|kind| matches!(kind, UciOutputKind::ReadyOk).then_some(()))
    }

    /// Stop the engine process
    pub fn stop(&mut self) {
        if self.process.is_none() {
            return;
        }

        if self.running {
            self.send_command(UciCommand::Quit);
        }

        // Dropping the sender ends the writer thread
        self.command_sender = None;
        self.event_receiver = None;

        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
        }

        self.running = false;
        info!("engine stopped");
    }

    /// Send a UCI command to the engine
    fn send_command(&self, cmd: UciCommand) {
        let cmd_str = cmd.to_uci_string();
        debug!(command = %cmd_str, "to engine");
        if let Some(tx) = &self.command_sender {
            let _ = tx.send(cmd_str);
        }
    }

    /// Block until `accept` picks a value out of an engine line.
    ///
    /// There is no timeout; an engine that stays alive without answering
    /// blocks the caller. An engine that exits is an error.
    fn wait_for<T>(&mut self, accept: impl Fn(&UciOutputKind) -> Option<T>) -> Result<T> {
        let rx = self
            .event_receiver
            .as_ref()
            .ok_or_else(|| anyhow!("engine is not running"))?;

        loop {
            let event = match rx.recv() {
                Ok(event) => event,
                Err(_) => {
                    self.running = false;
                    bail!("engine output channel closed");
                }
            };
            match event {
                EngineEvent::Output(line) => {
                    trace!(%line, "from engine");
                    if let Some(value) = accept(&UciOutputKind::parse(&line)) {
                        return Ok(value);
                    }
                }
                EngineEvent::Error(e) => warn!(error = %e, "engine read error"),
                EngineEvent::Exited => {
                    self.running = false;
                    bail!("engine exited before answering");
                }
            }
        }
    }
}

impl DecisionSource for UciEngine {
    fn best_move(&mut self, history: &[String], depth: u32) -> Result<String> {
        if !self.running {
            bail!("engine is not running");
        }

        self.send_command(UciCommand::Position {
            moves: history.to_vec(),
        });
        self.send_command(UciCommand::GoDepth(depth));

        let best = self.wait_for(|kind| match kind {
            UciOutputKind::BestMove(best) => Some(best.clone()),
            _ => None,
        })?;
        let best = best.ok_or_else(|| anyhow!("engine has no move after {} plies", history.len()))?;
        info!(%best, depth, "engine answered");
        Ok(best)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
