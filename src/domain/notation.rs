//! Algebraic cell names and move text.
//!
//! Cell names are absolute (`a1` is always White's queen-side corner) while
//! squares are board-relative, so every conversion goes through the
//! session's orientation.

use crate::domain::chess::{Orientation, PieceKind, Square};
use crate::error::{CodecError, CodecResult};

/// File (0 = `a`) and rank (0 = `1`) of a board-relative square
pub fn file_rank_of(square: Square, orientation: Orientation) -> (u8, u8) {
    match orientation {
        Orientation::WhiteNearer => (square.x(), 7 - square.y()),
        Orientation::BlackNearer => (7 - square.x(), square.y()),
    }
}

/// Render a square as its cell name, e.g. `(4, 6)` -> `"e2"` when White is nearer
pub fn square_to_cell(square: Square, orientation: Orientation) -> String {
    let (file, rank) = file_rank_of(square, orientation);
    let mut cell = String::with_capacity(2);
    cell.push((b'a' + file) as char);
    cell.push((b'1' + rank) as char);
    cell
}

/// Parse a cell name back into a board-relative square
pub fn cell_to_square(cell: &str, orientation: Orientation) -> CodecResult<Square> {
    let invalid = || CodecError::InvalidCell {
        cell: cell.to_string(),
    };

    let &[file, rank] = cell.as_bytes() else {
        return Err(invalid());
    };
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(invalid());
    }

    let file = (file - b'a') as i32;
    let rank = (rank - b'1') as i32;
    match orientation {
        Orientation::WhiteNearer => Square::new(file, 7 - rank),
        Orientation::BlackNearer => Square::new(7 - file, rank),
    }
}

/// A parsed move string: origin cell, destination cell, optional promotion letter
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveText {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveText {
    /// Parse `"e2e4"` or `"e7e8q"` (promotion letter in either case)
    pub fn parse(text: &str, orientation: Orientation) -> CodecResult<Self> {
        let invalid = |reason| CodecError::InvalidMoveText {
            text: text.to_string(),
            reason,
        };

        if !text.is_ascii() {
            return Err(invalid("not ascii"));
        }
        if text.len() != 4 && text.len() != 5 {
            return Err(invalid("expected 4 or 5 characters"));
        }

        let from = cell_to_square(&text[0..2], orientation)?;
        let to = cell_to_square(&text[2..4], orientation)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(letter) => match PieceKind::from_notation(letter) {
                Some(kind) if kind.is_promotion_target() => Some(kind),
                _ => return Err(invalid("unknown promotion letter")),
            },
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}
