//! One game against the observed board.
//!
//! The session owns the tracked position and the move history sent to the
//! decision source. Nothing here is global, so several sessions can run side
//! by side.

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::apply::{AppliedEffect, apply};
use crate::domain::chess::{Orientation, PositionSet};
use crate::domain::moves::ClassifiedMove;
use crate::domain::reconstruct::reconstruct;
use crate::error::CodecResult;
use crate::models::engine::DecisionSource;

/// Search depths used when asking for moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Depths {
    /// Depth for the very first move of the game
    pub opening: u32,
    /// Depth for every reply after that
    pub reply: u32,
}

pub struct GameSession {
    orientation: Orientation,
    /// Best knowledge of the board, including our own moves not yet seen
    tracked: PositionSet,
    /// Every move of the game in UCI text, in play order
    history: Vec<String>,
    depths: Depths,
}

impl GameSession {
    pub fn new(orientation: Orientation, depths: Depths) -> Self {
        Self {
            orientation,
            tracked: PositionSet::starting(orientation),
            history: Vec::new(),
            depths,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn tracked(&self) -> &PositionSet {
        &self.tracked
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether the nearer player moves first and nothing has been played
    pub fn should_open(&self) -> bool {
        self.orientation.is_white_nearer() && self.history.is_empty()
    }

    /// Compare an observation against the tracked position.
    ///
    /// A detected move is recorded and the observation becomes the tracked
    /// position. No move leaves the session unchanged.
    pub fn observe(&mut self, observed: PositionSet) -> CodecResult<Option<ClassifiedMove>> {
        let detected = reconstruct(&self.tracked, &observed, self.orientation)?;
        if let Some(classified) = &detected {
            info!(ply = self.history.len() + 1, mv = %classified, "opponent moved");
            self.history.push(classified.uci());
            self.tracked = observed;
        }
        Ok(detected)
    }

    /// Ask `source` for a move, apply it to the tracked position and record it
    pub fn respond(&mut self, source: &mut dyn DecisionSource) -> Result<String> {
        let depth = if self.history.is_empty() {
            self.depths.opening
        } else {
            self.depths.reply
        };
        let best = source
            .best_move(&self.history, depth)
            .context("decision source failed")?;
        let effect = apply(&mut self.tracked, &best, self.orientation)
            .with_context(|| format!("cannot apply {best} to the tracked position"))?;
        log_effect(&best, effect);
        self.history.push(best.to_ascii_lowercase());
        Ok(best)
    }

    /// One polling cycle: detect the opponent's move and answer it.
    ///
    /// Returns the counter-move to play, if any.
    pub fn step(
        &mut self,
        observed: PositionSet,
        source: &mut dyn DecisionSource,
    ) -> Result<Option<String>> {
        match self.observe(observed)? {
            Some(_) => self.respond(source).map(Some),
            None => Ok(None),
        }
    }
}

fn log_effect(text: &str, effect: AppliedEffect) {
    match effect {
        AppliedEffect::Relocation => info!(mv = text, "move applied"),
        AppliedEffect::Capture { victim } => info!(mv = text, %victim, "capture applied"),
        AppliedEffect::Castling { rook } => info!(mv = text, %rook, "castling applied"),
        AppliedEffect::EnPassant { victim } => info!(mv = text, %victim, "en passant applied"),
        AppliedEffect::Promotion { promoted, .. } => info!(mv = text, %promoted, "promotion applied"),
    }
}
