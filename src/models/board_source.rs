//! Acquisition seam: where observed positions come from.
//!
//! Whatever looks at the physical board only has to hand back one
//! de-duplicated [`PositionSet`] per capture. Two sources ship here: one
//! reading FEN lines from a stream and one replaying a scripted game.

use std::io::BufRead;

use anyhow::{Context, Result, anyhow};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position};
use tracing::debug;

use crate::domain::chess::{Orientation, PositionSet};

/// Produces the currently observed position, one capture per call
pub trait BoardSource {
    /// The next observation, or `None` once the source is exhausted
    fn capture(&mut self) -> Result<Option<PositionSet>>;
}

/// Reads one FEN per line; only the board field is used.
///
/// Blank lines are skipped.
pub struct FenBoardSource<R> {
    reader: R,
    orientation: Orientation,
    line: String,
}

impl<R: BufRead> FenBoardSource<R> {
    pub fn new(reader: R, orientation: Orientation) -> Self {
        Self {
            reader,
            orientation,
            line: String::new(),
        }
    }
}

impl<R: BufRead> BoardSource for FenBoardSource<R> {
    fn capture(&mut self) -> Result<Option<PositionSet>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).context("failed to read board")? == 0 {
                return Ok(None);
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            let fen: Fen = text
                .parse()
                .with_context(|| format!("invalid FEN line: {text}"))?;
            let board = fen.into_setup().board;
            return Ok(Some(PositionSet::from_board(&board, self.orientation)?));
        }
    }
}

/// Replays a UCI move list from the starting position.
///
/// The first capture is the starting position; each later capture is the
/// board after one more move.
pub struct ScriptedBoardSource {
    position: Chess,
    moves: std::vec::IntoIter<String>,
    orientation: Orientation,
    started: bool,
}

impl ScriptedBoardSource {
    pub fn new(moves: Vec<String>, orientation: Orientation) -> Self {
        Self {
            position: Chess::default(),
            moves: moves.into_iter(),
            orientation,
            started: false,
        }
    }

    /// Split a whitespace separated move list such as `"e2e4 e7e5 g1f3"`
    pub fn from_move_list(moves: &str, orientation: Orientation) -> Self {
        Self::new(moves.split_whitespace().map(str::to_string).collect(), orientation)
    }

    fn play(&mut self, text: &str) -> Result<()> {
        let uci: UciMove = text
            .parse()
            .with_context(|| format!("malformed scripted move {text}"))?;
        let m = uci
            .to_move(&self.position)
            .with_context(|| format!("illegal scripted move {text}"))?;
        debug!(%text, "scripted move");
        self.position = self
            .position
            .clone()
            .play(m)
            .map_err(|_| anyhow!("scripted move {text} cannot be played"))?;
        Ok(())
    }

    /// UCI text of a legal move, in the standard castling notation
    pub fn uci_of(m: &shakmaty::Move) -> String {
        m.to_uci(CastlingMode::Standard).to_string()
    }
}

impl BoardSource for ScriptedBoardSource {
    fn capture(&mut self) -> Result<Option<PositionSet>> {
        if self.started {
            match self.moves.next() {
                Some(text) => self.play(&text)?,
                None => return Ok(None),
            }
        }
        self.started = true;
        Ok(Some(PositionSet::from_board(self.position.board(), self.orientation)?))
    }
}
