//! Applying decision-source moves to the tracked position.
//!
//! The mirror image of reconstruction: given move text, update the tracked
//! set with every side effect of the move. The whole edit is worked out
//! first and committed only when it is complete, so a failure leaves the
//! tracked set untouched.

use tracing::{debug, warn};

use crate::domain::chess::{Orientation, Piece, PieceKind, Placement, PositionSet};
use crate::domain::notation::MoveText;
use crate::error::{CodecError, CodecResult, MoveFault};

/// Which rule the applied move followed
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppliedEffect {
    /// Plain move to an empty square
    Relocation,
    /// Move onto an occupied square, removing the occupant
    Capture { victim: Placement },
    /// King moved two files, the rook jumped over it
    Castling { rook: Placement },
    /// Pawn moved diagonally to an empty square, taking the pawn beside it
    EnPassant { victim: Placement },
    /// Pawn replaced on arrival, possibly capturing on the way
    Promotion { promoted: Piece, victim: Option<Placement> },
}

struct Edit {
    remove: Vec<Placement>,
    insert: Vec<Placement>,
    effect: AppliedEffect,
}

/// Apply `move_text` (e.g. `"e2e4"`, `"e7e8q"`) to the tracked set
pub fn apply(
    tracked: &mut PositionSet,
    move_text: &str,
    orientation: Orientation,
) -> CodecResult<AppliedEffect> {
    let parsed = MoveText::parse(move_text, orientation)?;
    let illegal = |fault| CodecError::IllegalMove {
        text: move_text.to_string(),
        fault,
    };

    let mover = tracked
        .at(parsed.from)
        .ok_or_else(|| illegal(MoveFault::EmptyOrigin(parsed.from)))?;

    let edit = match tracked.at(parsed.to) {
        None => onto_empty(tracked, mover, &parsed).map_err(illegal)?,
        Some(occupant) => onto_occupied(mover, occupant, &parsed),
    };

    for placement in &edit.remove {
        tracked.remove(placement);
    }
    for placement in edit.insert {
        tracked.insert(placement);
    }

    debug!(move_text, effect = ?edit.effect, "move applied");
    Ok(edit.effect)
}

fn onto_empty(tracked: &PositionSet, mover: Placement, parsed: &MoveText) -> Result<Edit, MoveFault> {
    let color = mover.piece.color;
    let file_delta = mover.square.file_delta(parsed.to);
    let arrive = |piece| Placement::new(piece, parsed.to);

    if mover.piece.kind == PieceKind::King && file_delta.abs() == 2 {
        let step = file_delta.signum();
        let rook_file = if step > 0 { 7 } else { 0 };
        let rook = mover
            .square
            .offset(rook_file - mover.square.x() as i32, 0)
            .map(|sq| Placement::new(Piece::new(PieceKind::Rook, color), sq))
            .filter(|p| tracked.contains(p));
        let Some(rook) = rook else {
            return Err(MoveFault::MissingCastlingRook { king: mover });
        };
        let rook_landing = parsed.to.offset(-step, 0).unwrap_or(mover.square);

        return Ok(Edit {
            remove: vec![mover, rook],
            insert: vec![arrive(mover.piece), Placement::new(rook.piece, rook_landing)],
            effect: AppliedEffect::Castling { rook },
        });
    }

    if mover.piece.kind == PieceKind::Pawn && file_delta != 0 {
        let beside = parsed.to.offset(0, mover.square.y() as i32 - parsed.to.y() as i32);
        let victim = beside
            .map(|sq| Placement::new(Piece::new(PieceKind::Pawn, color.opposite()), sq))
            .filter(|p| tracked.contains(p));
        if let Some(victim) = victim {
            return Ok(Edit {
                remove: vec![mover, victim],
                insert: vec![arrive(mover.piece)],
                effect: AppliedEffect::EnPassant { victim },
            });
        }
    }

    if mover.piece.kind == PieceKind::Pawn {
        if let Some(kind) = parsed.promotion {
            let promoted = Piece::new(kind, color);
            return Ok(Edit {
                remove: vec![mover],
                insert: vec![arrive(promoted)],
                effect: AppliedEffect::Promotion {
                    promoted,
                    victim: None,
                },
            });
        }
    }

    Ok(Edit {
        remove: vec![mover],
        insert: vec![arrive(mover.piece)],
        effect: AppliedEffect::Relocation,
    })
}

fn onto_occupied(mover: Placement, occupant: Placement, parsed: &MoveText) -> Edit {
    if occupant.piece.color == mover.piece.color {
        warn!(%mover, %occupant, "destination holds a piece of the mover's own colour");
    }

    let (piece, effect) = match parsed.promotion {
        Some(kind) => {
            let promoted = Piece::new(kind, mover.piece.color);
            (
                promoted,
                AppliedEffect::Promotion {
                    promoted,
                    victim: Some(occupant),
                },
            )
        }
        None => (mover.piece, AppliedEffect::Capture { victim: occupant }),
    };

    Edit {
        remove: vec![mover, occupant],
        insert: vec![Placement::new(piece, parsed.to)],
        effect,
    }
}
