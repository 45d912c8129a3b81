//! Reachability oracle.
//!
//! Answers "could this piece, standing here, land there in one move" while
//! ignoring every other piece on the board. It validates a single observed
//! from/to pair; it is not a move generator.

use std::collections::BTreeSet;

use crate::domain::chess::{Orientation, Piece, PieceKind, Square};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (1, -2),
    (2, -1),
    (-1, 2),
    (-2, 1),
    (-1, -2),
    (-2, -1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const STRAIGHT_RAYS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const DIAGONAL_RAYS: [(i32, i32); 4] = [(-1, -1), (1, 1), (-1, 1), (1, -1)];

/// Squares `piece` could reach from `at`, blocking ignored
pub fn reachable_squares(piece: Piece, at: Square, orientation: Orientation) -> BTreeSet<Square> {
    match piece.kind {
        PieceKind::Pawn => pawn_squares(piece, at, orientation),
        PieceKind::Knight => offsets(at, &KNIGHT_OFFSETS),
        PieceKind::Bishop => rays(at, &DIAGONAL_RAYS),
        PieceKind::Rook => rays(at, &STRAIGHT_RAYS),
        PieceKind::Queen => {
            let mut squares = rays(at, &STRAIGHT_RAYS);
            squares.extend(rays(at, &DIAGONAL_RAYS));
            squares
        }
        PieceKind::King => offsets(at, &KING_OFFSETS),
    }
}

/// Whether `piece` could move from `from` to `to`
pub fn can_reach(piece: Piece, from: Square, to: Square, orientation: Orientation) -> bool {
    reachable_squares(piece, from, orientation).contains(&to)
}

fn offsets(at: Square, deltas: &[(i32, i32)]) -> BTreeSet<Square> {
    deltas
        .iter()
        .filter_map(|&(dx, dy)| at.offset(dx, dy))
        .collect()
}

fn rays(at: Square, directions: &[(i32, i32)]) -> BTreeSet<Square> {
    let mut squares = BTreeSet::new();
    for &(dx, dy) in directions {
        let mut current = at;
        while let Some(next) = current.offset(dx, dy) {
            squares.insert(next);
            current = next;
        }
    }
    squares
}

fn pawn_squares(piece: Piece, at: Square, orientation: Orientation) -> BTreeSet<Square> {
    let forward = orientation.forward(piece.color);

    let mut squares = offsets(at, &[(0, forward), (-1, forward), (1, forward)]);
    if at.y() == orientation.pawn_start_rank(piece.color) {
        squares.extend(at.offset(0, 2 * forward));
    }
    squares
}
