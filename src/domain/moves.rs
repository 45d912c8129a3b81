//! Classified moves.
//!
//! A closed set of move shapes. Each variant checks its own geometry and
//! rank rules when built, so an invalid combination is never representable,
//! and each one knows how to render itself as move text.

use std::fmt;

use crate::domain::chess::{Orientation, Piece, PieceColor, PieceKind, Placement, Square};
use crate::domain::geometry::can_reach;
use crate::domain::notation::square_to_cell;
use crate::error::{CodecResult, DeltaFault};

/// A piece moving to an empty square
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SimpleMove {
    piece: Piece,
    from: Square,
    to: Square,
    orientation: Orientation,
}

impl SimpleMove {
    pub fn new(piece: Piece, from: Square, to: Square, orientation: Orientation) -> CodecResult<Self> {
        if !can_reach(piece, from, to, orientation) {
            return Err(DeltaFault::Unreachable { piece, from, to }.into());
        }
        Ok(Self {
            piece,
            from,
            to,
            orientation,
        })
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }
}

/// A simple move that also removes the victim standing on the destination
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CaptureMove {
    movement: SimpleMove,
    victim: Piece,
}

impl CaptureMove {
    pub fn new(
        attacker: Piece,
        victim: Piece,
        from: Square,
        to: Square,
        orientation: Orientation,
    ) -> CodecResult<Self> {
        if attacker.color == victim.color {
            return Err(DeltaFault::SelfCapture { attacker, victim }.into());
        }
        let movement = SimpleMove::new(attacker, from, to, orientation)?;
        Ok(Self { movement, victim })
    }

    pub fn attacker(&self) -> Piece {
        self.movement.piece
    }

    pub fn victim(&self) -> Piece {
        self.victim
    }

    pub fn from(&self) -> Square {
        self.movement.from
    }

    pub fn to(&self) -> Square {
        self.movement.to
    }
}

/// King and rook leaving their back-rank squares together
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CastlingMove {
    king: Placement,
    rook: Placement,
    orientation: Orientation,
}

impl CastlingMove {
    pub fn new(king: Placement, rook: Placement, orientation: Orientation) -> CodecResult<Self> {
        let fault = || DeltaFault::Castling { king, rook };

        if king.piece.kind != PieceKind::King
            || rook.piece.kind != PieceKind::Rook
            || king.piece.color != rook.piece.color
        {
            return Err(fault().into());
        }

        let back_rank = orientation.back_rank(king.piece.color);
        if king.square.y() != rook.square.y() || rook.square.y() != back_rank {
            return Err(fault().into());
        }

        if !(3..=4).contains(&king.square.file_delta(rook.square).abs()) {
            return Err(fault().into());
        }

        Ok(Self {
            king,
            rook,
            orientation,
        })
    }

    pub fn king(&self) -> Placement {
        self.king
    }

    pub fn rook(&self) -> Placement {
        self.rook
    }

    /// Files the king travels: two towards the rook
    fn step(&self) -> i32 {
        if self.king.square.file_delta(self.rook.square) > 0 {
            1
        } else {
            -1
        }
    }

    pub fn king_destination(&self) -> Square {
        let step = self.step();
        self.king
            .square
            .offset(2 * step, 0)
            .unwrap_or(self.king.square)
    }

    /// The rook lands beside the king, on the side it came from
    pub fn rook_destination(&self) -> Square {
        let step = self.step();
        self.king.square.offset(step, 0).unwrap_or(self.rook.square)
    }
}

/// A pawn replaced by a new piece on its far rank
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PromotionMove {
    promoted: Piece,
    from: Square,
    to: Square,
    orientation: Orientation,
}

impl PromotionMove {
    pub fn new(promoted: Piece, from: Square, to: Square, orientation: Orientation) -> CodecResult<Self> {
        let color = promoted.color;
        let addition = Placement::new(promoted, to);

        if !promoted.kind.is_promotion_target() {
            return Err(DeltaFault::PromotionPiece(promoted).into());
        }
        if to.y() != orientation.far_rank(color) {
            return Err(DeltaFault::PromotionOffFarRank(addition).into());
        }

        let pawn = Piece::new(PieceKind::Pawn, color);
        if from.y() != orientation.promotion_origin_rank(color) || !can_reach(pawn, from, to, orientation) {
            return Err(DeltaFault::Unreachable { piece: pawn, from, to }.into());
        }

        Ok(Self {
            promoted,
            from,
            to,
            orientation,
        })
    }

    pub fn promoted(&self) -> Piece {
        self.promoted
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    /// The promotion letter: upper-case for White, lower-case for Black
    pub fn letter(&self) -> String {
        let notation = self.promoted.kind.notation();
        match self.promoted.color {
            PieceColor::White => notation.to_uppercase(),
            PieceColor::Black => notation.to_lowercase(),
        }
    }
}

/// One opponent move reconstructed from two observations
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClassifiedMove {
    Simple(SimpleMove),
    Capture(CaptureMove),
    Castling(CastlingMove),
    Promotion(PromotionMove),
}

impl ClassifiedMove {
    pub fn orientation(&self) -> Orientation {
        match self {
            ClassifiedMove::Simple(m) => m.orientation,
            ClassifiedMove::Capture(m) => m.movement.orientation,
            ClassifiedMove::Castling(m) => m.orientation,
            ClassifiedMove::Promotion(m) => m.orientation,
        }
    }

    /// Origin and destination of the piece the move text names
    pub fn squares(&self) -> (Square, Square) {
        match self {
            ClassifiedMove::Simple(m) => (m.from, m.to),
            ClassifiedMove::Capture(m) => (m.from(), m.to()),
            ClassifiedMove::Castling(m) => (m.king.square, m.king_destination()),
            ClassifiedMove::Promotion(m) => (m.from, m.to),
        }
    }

    /// Move text in UCI form: the promotion letter is always lower-case
    pub fn uci(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl fmt::Display for ClassifiedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orientation = self.orientation();
        let (from, to) = self.squares();
        write!(
            f,
            "{}{}",
            square_to_cell(from, orientation),
            square_to_cell(to, orientation)
        )?;
        if let ClassifiedMove::Promotion(m) = self {
            write!(f, "{}", m.letter())?;
        }
        Ok(())
    }
}

impl From<SimpleMove> for ClassifiedMove {
    fn from(m: SimpleMove) -> Self {
        ClassifiedMove::Simple(m)
    }
}

impl From<CaptureMove> for ClassifiedMove {
    fn from(m: CaptureMove) -> Self {
        ClassifiedMove::Capture(m)
    }
}

impl From<CastlingMove> for ClassifiedMove {
    fn from(m: CastlingMove) -> Self {
        ClassifiedMove::Castling(m)
    }
}

impl From<PromotionMove> for ClassifiedMove {
    fn from(m: PromotionMove) -> Self {
        ClassifiedMove::Promotion(m)
    }
}
