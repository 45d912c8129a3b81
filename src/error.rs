//! Error types for the move codec.
//!
//! Every failure carries the squares and pieces involved so the caller can
//! decide whether to re-acquire, abort the session, or ask a human.

use thiserror::Error;

use crate::domain::chess::{Piece, Placement, Square};

/// Errors produced by the pure domain layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Coordinate outside the 8x8 board
    #[error("Invalid square: ({x}, {y}) (both must be 0-7)")]
    InvalidSquare { x: i32, y: i32 },

    /// Malformed algebraic cell name
    #[error("Invalid cell name: {cell:?}")]
    InvalidCell { cell: String },

    /// Move text that is not 4 characters, or 5 with a promotion letter
    #[error("Invalid move text {text:?}: {reason}")]
    InvalidMoveText { text: String, reason: &'static str },

    /// More than one move's worth of placements vanished between observations
    #[error("Detected more than two alterations: {}", describe(.removed))]
    AmbiguousDelta { removed: Vec<Placement> },

    /// The delta contradicts the single-move invariant
    #[error("Invalid delta: {0}")]
    InvalidDelta(DeltaFault),

    /// The tracked set cannot carry out the requested move
    #[error("Illegal move {text:?}: {fault}")]
    IllegalMove { text: String, fault: MoveFault },
}

/// Why an observed delta could not be classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeltaFault {
    #[error("expected exactly one placement to appear, found {}", describe(.added))]
    UnmatchedAddition { added: Vec<Placement> },

    #[error("{removed} vanished but {added} appeared")]
    PieceMismatch { removed: Placement, added: Placement },

    #[error("multiple additions: {}", describe(.candidates))]
    MultipleAdditions { candidates: Vec<Placement> },

    #[error("promotion to {0} is not on the far rank")]
    PromotionOffFarRank(Placement),

    #[error("expected exactly one pawn behind {addition}, found {}", describe(.pawns))]
    PromotionOrigin { addition: Placement, pawns: Vec<Placement> },

    #[error("{0} is not a piece a pawn can promote to")]
    PromotionPiece(Piece),

    #[error("neither {first} nor {second} reappears at the other's square")]
    NoCapturePair { first: Placement, second: Placement },

    #[error("{attacker} cannot capture its own side's {victim}")]
    SelfCapture { attacker: Piece, victim: Piece },

    #[error("{piece} cannot reach {to} from {from}")]
    Unreachable { piece: Piece, from: Square, to: Square },

    #[error("{king} and {rook} do not form a castling pair")]
    Castling { king: Placement, rook: Placement },
}

/// Why a move text could not be carried out on the tracked set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveFault {
    #[error("no piece stands on the origin {0}")]
    EmptyOrigin(Square),

    #[error("{king} has no rook in the corner it castles towards")]
    MissingCastlingRook { king: Placement },
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

impl From<DeltaFault> for CodecError {
    fn from(fault: DeltaFault) -> Self {
        CodecError::InvalidDelta(fault)
    }
}

fn describe(placements: &[Placement]) -> String {
    placements
        .iter()
        .map(|p| format!("-- {p} --"))
        .collect::<Vec<_>>()
        .join("")
}
