//! Move reconstruction from two observations.
//!
//! Given the placements seen before and after the opponent's physical move,
//! work out which single move explains the difference. The tests run in a
//! fixed order (castling, promotion, plain move, capture) and the first one
//! that matches wins.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::chess::{Orientation, Piece, PieceColor, PieceKind, Placement, PositionSet, Square};
use crate::domain::moves::{CaptureMove, CastlingMove, ClassifiedMove, PromotionMove, SimpleMove};
use crate::error::{CodecError, CodecResult, DeltaFault};

/// Classify the move that turned `prev` into `curr`.
///
/// Returns `Ok(None)` when nothing vanished, i.e. no move has been made yet.
pub fn reconstruct(
    prev: &PositionSet,
    curr: &PositionSet,
    orientation: Orientation,
) -> CodecResult<Option<ClassifiedMove>> {
    let removed = prev.difference(curr);

    if removed.is_empty() {
        return Ok(None);
    }
    if removed.len() > 2 {
        return Err(CodecError::AmbiguousDelta { removed });
    }

    if let Some(castling) = castling_if_present(&removed, orientation)? {
        debug!(king = %castling.king(), rook = %castling.rook(), "castling detected");
        return Ok(Some(castling.into()));
    }

    if let Some(promotion) = promotion_if_present(prev, curr, &removed, orientation)? {
        debug!(promoted = %promotion.promoted(), to = %promotion.to(), "promotion detected");
        return Ok(Some(promotion.into()));
    }

    let classified = match removed.as_slice() {
        [moved] => single_removal(*moved, prev, curr, orientation)?,
        [first, second] => double_removal(*first, *second, curr, orientation)?,
        _ => return Err(CodecError::AmbiguousDelta { removed: removed.clone() }),
    };
    debug!(classified = %classified, "move reconstructed");
    Ok(Some(classified))
}

/// A king and a rook of one colour vanishing together. White is tried first.
fn castling_if_present(removed: &[Placement], orientation: Orientation) -> CodecResult<Option<CastlingMove>> {
    for color in [PieceColor::White, PieceColor::Black] {
        let find = |kind| {
            removed
                .iter()
                .find(|p| p.piece == Piece::new(kind, color))
                .copied()
        };
        if let (Some(king), Some(rook)) = (find(PieceKind::King), find(PieceKind::Rook)) {
            return CastlingMove::new(king, rook, orientation).map(Some);
        }
    }
    Ok(None)
}

/// Squares of every non-pawn, non-king piece, grouped by piece
fn officer_groups(set: &PositionSet) -> BTreeMap<Piece, Vec<Square>> {
    let mut groups: BTreeMap<Piece, Vec<Square>> = BTreeMap::new();
    for placement in set {
        if !matches!(placement.piece.kind, PieceKind::Pawn | PieceKind::King) {
            groups.entry(placement.piece).or_default().push(placement.square);
        }
    }
    groups
}

/// A piece group that grew between observations means a pawn was promoted
fn promotion_if_present(
    prev: &PositionSet,
    curr: &PositionSet,
    removed: &[Placement],
    orientation: Orientation,
) -> CodecResult<Option<PromotionMove>> {
    let before = officer_groups(prev);
    let after = officer_groups(curr);

    let mut candidates = Vec::new();
    for (piece, squares) in &after {
        match before.get(piece) {
            Some(previous) if previous.len() >= squares.len() => {}
            Some(previous) => candidates.extend(
                squares
                    .iter()
                    .filter(|sq| !previous.contains(sq))
                    .map(|&sq| Placement::new(*piece, sq)),
            ),
            None => candidates.extend(squares.iter().map(|&sq| Placement::new(*piece, sq))),
        }
    }

    let addition = match candidates.as_slice() {
        [] => return Ok(None),
        [addition] => *addition,
        _ => return Err(DeltaFault::MultipleAdditions { candidates }.into()),
    };

    let color = addition.piece.color;
    if addition.square.y() != orientation.far_rank(color) {
        return Err(DeltaFault::PromotionOffFarRank(addition).into());
    }

    let origin_rank = orientation.promotion_origin_rank(color);
    let pawns: Vec<Placement> = removed
        .iter()
        .filter(|p| {
            p.piece == Piece::new(PieceKind::Pawn, color)
                && p.square.y() == origin_rank
                && p.square.file_delta(addition.square).abs() <= 1
        })
        .copied()
        .collect();

    let &[pawn] = pawns.as_slice() else {
        return Err(DeltaFault::PromotionOrigin { addition, pawns }.into());
    };

    PromotionMove::new(addition.piece, pawn.square, addition.square, orientation).map(Some)
}

fn single_removal(
    moved: Placement,
    prev: &PositionSet,
    curr: &PositionSet,
    orientation: Orientation,
) -> CodecResult<ClassifiedMove> {
    let added = curr.difference(prev);
    let &[arrived] = added.as_slice() else {
        return Err(DeltaFault::UnmatchedAddition { added }.into());
    };
    if arrived.piece != moved.piece {
        return Err(DeltaFault::PieceMismatch {
            removed: moved,
            added: arrived,
        }
        .into());
    }

    Ok(SimpleMove::new(moved.piece, moved.square, arrived.square, orientation)?.into())
}

/// Two placements vanished: whichever piece now stands on the other's
/// square is the attacker.
fn double_removal(
    first: Placement,
    second: Placement,
    curr: &PositionSet,
    orientation: Orientation,
) -> CodecResult<ClassifiedMove> {
    let (attacker, victim) = if curr.contains(&Placement::new(first.piece, second.square)) {
        (first, second)
    } else if curr.contains(&Placement::new(second.piece, first.square)) {
        (second, first)
    } else {
        return Err(DeltaFault::NoCapturePair { first, second }.into());
    };

    Ok(CaptureMove::new(
        attacker.piece,
        victim.piece,
        attacker.square,
        victim.square,
        orientation,
    )?
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WN: Orientation = Orientation::WhiteNearer;
    const BN: Orientation = Orientation::BlackNearer;

    fn sq(x: i32, y: i32) -> Square {
        Square::new(x, y).unwrap()
    }

    fn at(piece: Piece, x: i32, y: i32) -> Placement {
        Placement::new(piece, sq(x, y))
    }

    fn set(placements: &[Placement]) -> PositionSet {
        placements.iter().copied().collect()
    }

    fn wp() -> Piece {
        Piece::white(PieceKind::Pawn)
    }

    fn bp() -> Piece {
        Piece::black(PieceKind::Pawn)
    }

    #[test]
    fn test_no_move_when_unchanged() {
        let position = PositionSet::starting(WN);
        assert_eq!(reconstruct(&position, &position, WN), Ok(None));
        assert_eq!(reconstruct(&PositionSet::new(), &PositionSet::new(), BN), Ok(None));
    }

    #[test]
    fn test_simple_pawn_push() {
        let prev = PositionSet::starting(WN);
        let mut curr = prev.clone();
        curr.remove(&at(wp(), 4, 6));
        curr.insert(at(wp(), 4, 4));

        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert!(matches!(mv, ClassifiedMove::Simple(_)));
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_simple_move_black_nearer() {
        let knight = Piece::black(PieceKind::Knight);
        let prev = PositionSet::starting(BN);
        let mut curr = prev.clone();
        // the b8 knight sits on (6, 7) when Black is nearer; c6 is (5, 5)
        curr.remove(&at(knight, 6, 7));
        curr.insert(at(knight, 5, 5));
        let mv = reconstruct(&prev, &curr, BN).unwrap().unwrap();
        assert_eq!(mv.to_string(), "b8c6");
    }

    #[test]
    fn test_single_removal_needs_single_addition() {
        let prev = set(&[at(wp(), 4, 6)]);
        let curr = set(&[at(wp(), 4, 5), at(wp(), 4, 4)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidDelta(DeltaFault::UnmatchedAddition { .. })
        ));

        let vanished = reconstruct(&prev, &PositionSet::new(), WN).unwrap_err();
        assert!(matches!(
            vanished,
            CodecError::InvalidDelta(DeltaFault::UnmatchedAddition { .. })
        ));
    }

    #[test]
    fn test_single_removal_rejects_changed_piece() {
        let prev = set(&[at(Piece::white(PieceKind::Queen), 3, 7), at(wp(), 0, 6)]);
        let curr = set(&[at(wp(), 3, 5), at(wp(), 0, 6)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::PieceMismatch { .. })));
    }

    #[test]
    fn test_single_removal_rejects_unreachable() {
        let rook = Piece::white(PieceKind::Rook);
        let prev = set(&[at(rook, 0, 7)]);
        let curr = set(&[at(rook, 1, 6)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::Unreachable { .. })));
    }

    #[test]
    fn test_three_removals_always_ambiguous() {
        let prev = PositionSet::starting(WN);
        let mut curr = prev.clone();
        curr.remove(&at(wp(), 0, 6));
        curr.remove(&at(wp(), 1, 6));
        curr.remove(&at(bp(), 2, 1));
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        match err {
            CodecError::AmbiguousDelta { removed } => assert_eq!(removed.len(), 3),
            other => panic!("expected ambiguous delta, got {other:?}"),
        }
    }

    #[test]
    fn test_castling_king_side_renders_king_two_files() {
        let king = Piece::white(PieceKind::King);
        let rook = Piece::white(PieceKind::Rook);
        let prev = set(&[at(king, 4, 7), at(rook, 7, 7), at(rook, 0, 7)]);
        let curr = set(&[at(king, 6, 7), at(rook, 5, 7), at(rook, 0, 7)]);

        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        let ClassifiedMove::Castling(castling) = mv else {
            panic!("expected castling, got {mv:?}");
        };
        assert_eq!(castling.king_destination(), sq(6, 7));
        assert_eq!(mv.to_string(), "e1g1");
    }

    #[test]
    fn test_castling_queen_side() {
        let king = Piece::black(PieceKind::King);
        let rook = Piece::black(PieceKind::Rook);
        let prev = set(&[at(king, 4, 0), at(rook, 0, 0)]);
        let curr = set(&[at(king, 2, 0), at(rook, 3, 0)]);

        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert_eq!(mv.squares(), (sq(4, 0), sq(2, 0)));
        assert_eq!(mv.to_string(), "e8c8");
    }

    #[test]
    fn test_castling_read_from_removals_alone() {
        let prev = set(&[
            at(Piece::white(PieceKind::King), 4, 7),
            at(Piece::white(PieceKind::Rook), 7, 7),
        ]);
        let curr = PositionSet::new();
        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert_eq!(mv.to_string(), "e1g1");
    }

    #[test]
    fn test_castling_off_back_rank_fails() {
        let king = Piece::white(PieceKind::King);
        let rook = Piece::white(PieceKind::Rook);
        let prev = set(&[at(king, 4, 5), at(rook, 7, 5)]);
        let curr = set(&[at(king, 6, 5), at(rook, 5, 5)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::Castling { .. })));
    }

    #[test]
    fn test_promotion_white() {
        let queen = Piece::white(PieceKind::Queen);
        let prev = set(&[at(wp(), 3, 1), at(Piece::black(PieceKind::King), 7, 7)]);
        let curr = set(&[at(queen, 3, 0), at(Piece::black(PieceKind::King), 7, 7)]);

        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert!(matches!(mv, ClassifiedMove::Promotion(_)));
        assert_eq!(mv.to_string(), "d7d8Q");
    }

    #[test]
    fn test_promotion_black_lower_case() {
        let rook = Piece::black(PieceKind::Rook);
        let prev = set(&[at(bp(), 6, 6), at(rook, 0, 0)]);
        let curr = set(&[at(rook, 6, 7), at(rook, 0, 0)]);
        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert_eq!(mv.to_string(), "g2g1r");
    }

    #[test]
    fn test_promotion_with_capture() {
        let prev = set(&[at(wp(), 3, 1), at(Piece::black(PieceKind::Knight), 4, 0)]);
        let curr = set(&[at(Piece::white(PieceKind::Knight), 4, 0)]);
        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        assert_eq!(mv.to_string(), "d7e8N");
    }

    #[test]
    fn test_promotion_black_nearer() {
        // White promotes on y = 7 when Black is nearer: d7d8 is (4, 6) -> (4, 7)
        let prev = set(&[at(wp(), 4, 6)]);
        let curr = set(&[at(Piece::white(PieceKind::Queen), 4, 7)]);
        let mv = reconstruct(&prev, &curr, BN).unwrap().unwrap();
        assert_eq!(mv.to_string(), "d7d8Q");
    }

    #[test]
    fn test_promotion_off_far_rank_fails() {
        let prev = set(&[at(wp(), 3, 3)]);
        let curr = set(&[at(Piece::white(PieceKind::Queen), 3, 2)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::PromotionOffFarRank(_))));
    }

    #[test]
    fn test_promotion_without_pawn_fails() {
        let prev = set(&[at(wp(), 0, 1)]);
        let curr = set(&[at(Piece::white(PieceKind::Queen), 5, 0)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::PromotionOrigin { .. })));
    }

    #[test]
    fn test_multiple_additions_fail() {
        let prev = set(&[at(wp(), 3, 1), at(wp(), 5, 1)]);
        let curr = set(&[
            at(Piece::white(PieceKind::Queen), 3, 0),
            at(Piece::white(PieceKind::Rook), 5, 0),
        ]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::MultipleAdditions { .. })));
    }

    #[test]
    fn test_capture_attacker_is_piece_reappearing_on_victim_square() {
        let bishop = Piece::white(PieceKind::Bishop);
        let knight = Piece::black(PieceKind::Knight);
        let prev = set(&[at(bishop, 5, 7), at(knight, 2, 4)]);
        let curr = set(&[at(bishop, 2, 4)]);

        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        let ClassifiedMove::Capture(capture) = mv else {
            panic!("expected capture, got {mv:?}");
        };
        assert_eq!(capture.attacker(), bishop);
        assert_eq!(capture.victim(), knight);
        assert_eq!(capture.from(), sq(5, 7));
        assert_eq!(capture.to(), sq(2, 4));
    }

    #[test]
    fn test_capture_resolved_in_either_iteration_order() {
        // The attacker here sorts after the victim.
        let prev = set(&[at(wp(), 4, 4), at(bp(), 3, 3)]);
        let curr = set(&[at(bp(), 4, 4)]);
        let mv = reconstruct(&prev, &curr, WN).unwrap().unwrap();
        let ClassifiedMove::Capture(capture) = mv else {
            panic!("expected capture, got {mv:?}");
        };
        assert_eq!(capture.attacker(), bp());
        assert_eq!(capture.from(), sq(3, 3));
        assert_eq!(mv.to_string(), "d5e4");
    }

    #[test]
    fn test_capture_without_pair_fails() {
        // en passant leaves the captured pawn's square empty
        let prev = set(&[at(wp(), 4, 3), at(bp(), 3, 3)]);
        let curr = set(&[at(wp(), 3, 2)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::NoCapturePair { .. })));
    }

    #[test]
    fn test_capture_unreachable_fails() {
        let knight = Piece::white(PieceKind::Knight);
        let prev = set(&[at(knight, 1, 7), at(bp(), 1, 4)]);
        let curr = set(&[at(knight, 1, 4)]);
        let err = reconstruct(&prev, &curr, WN).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDelta(DeltaFault::Unreachable { .. })));
    }
}
