//! Pure chess domain types.
//! No process or I/O dependencies - this is the domain layer.
//!
//! A position is never held as a dense 8x8 array. It is a sparse set of
//! (piece, square) facts, so comparing two observations is set algebra.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shakmaty::{Color as SColor, Role};

use crate::domain::notation::{cell_to_square, file_rank_of};
use crate::error::{CodecError, CodecResult};

/// A board-relative square. `(0, 0)` is the cell in the far-left corner as
/// seen by the observer, `y` grows towards the observer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Square {
    x: u8,
    y: u8,
}

impl Square {
    /// Create a square, failing when either coordinate leaves 0..=7
    pub fn new(x: i32, y: i32) -> CodecResult<Self> {
        if (0..8).contains(&x) && (0..8).contains(&y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(CodecError::InvalidSquare { x, y })
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// The square shifted by `(dx, dy)`, if it is still on the board
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Self::new(self.x as i32 + dx, self.y as i32 + dy).ok()
    }

    /// Signed file distance from `self` to `other`
    pub fn file_delta(self, other: Square) -> i32 {
        other.x as i32 - self.x as i32
    }

    /// All 64 squares, row by row
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|y| (0..8u8).map(move |x| Square { x, y }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Pieces a pawn may turn into, in the order a promotion picker lists them
    pub const PROMOTION_TARGETS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Knight,
        PieceKind::Rook,
        PieceKind::Bishop,
    ];

    /// One-letter notation. The pawn has none.
    pub fn notation(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    /// Look up a kind by its notation letter, ignoring case
    pub fn from_notation(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTION_TARGETS.contains(&self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    pub const fn white(kind: PieceKind) -> Self {
        Self::new(kind, PieceColor::White)
    }

    pub const fn black(kind: PieceKind) -> Self {
        Self::new(kind, PieceColor::Black)
    }

    /// FEN-style letter: upper-case for White, lower-case for Black
    pub fn fen_char(self) -> char {
        let letter = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            PieceColor::White => letter.to_ascii_uppercase(),
            PieceColor::Black => letter,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.color, self.kind)
    }
}

/// An observed or tracked fact: this piece stands on this square
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Placement {
    pub piece: Piece,
    pub square: Square,
}

impl Placement {
    pub const fn new(piece: Piece, square: Square) -> Self {
        Self { piece, square }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.piece, self.square)
    }
}

/// Which side sits nearer the observer. Fixed for a whole session.
///
/// Every rank rule below is spelled out for all four (orientation, colour)
/// pairs rather than derived from a sign.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    WhiteNearer,
    BlackNearer,
}

impl Orientation {
    pub fn from_white_nearer(white_nearer: bool) -> Self {
        if white_nearer {
            Orientation::WhiteNearer
        } else {
            Orientation::BlackNearer
        }
    }

    pub fn is_white_nearer(self) -> bool {
        self == Orientation::WhiteNearer
    }

    /// The colour of the player nearer the observer
    pub fn near_color(self) -> PieceColor {
        match self {
            Orientation::WhiteNearer => PieceColor::White,
            Orientation::BlackNearer => PieceColor::Black,
        }
    }

    /// Direction of a pawn step along `y`
    pub fn forward(self, color: PieceColor) -> i32 {
        match (self, color) {
            (Orientation::WhiteNearer, PieceColor::White) => -1,
            (Orientation::WhiteNearer, PieceColor::Black) => 1,
            (Orientation::BlackNearer, PieceColor::White) => 1,
            (Orientation::BlackNearer, PieceColor::Black) => -1,
        }
    }

    /// Row holding the colour's king and rooks at the start
    pub fn back_rank(self, color: PieceColor) -> u8 {
        match (self, color) {
            (Orientation::WhiteNearer, PieceColor::White) => 7,
            (Orientation::WhiteNearer, PieceColor::Black) => 0,
            (Orientation::BlackNearer, PieceColor::White) => 0,
            (Orientation::BlackNearer, PieceColor::Black) => 7,
        }
    }

    /// Row on which the colour's pawns promote
    pub fn far_rank(self, color: PieceColor) -> u8 {
        match (self, color) {
            (Orientation::WhiteNearer, PieceColor::White) => 0,
            (Orientation::WhiteNearer, PieceColor::Black) => 7,
            (Orientation::BlackNearer, PieceColor::White) => 7,
            (Orientation::BlackNearer, PieceColor::Black) => 0,
        }
    }

    /// Row from which the colour's pawns may advance two squares
    pub fn pawn_start_rank(self, color: PieceColor) -> u8 {
        match (self, color) {
            (Orientation::WhiteNearer, PieceColor::White) => 6,
            (Orientation::WhiteNearer, PieceColor::Black) => 1,
            (Orientation::BlackNearer, PieceColor::White) => 1,
            (Orientation::BlackNearer, PieceColor::Black) => 6,
        }
    }

    /// Row a pawn stands on one step before promoting
    pub fn promotion_origin_rank(self, color: PieceColor) -> u8 {
        match (self, color) {
            (Orientation::WhiteNearer, PieceColor::White) => 1,
            (Orientation::WhiteNearer, PieceColor::Black) => 6,
            (Orientation::BlackNearer, PieceColor::White) => 6,
            (Orientation::BlackNearer, PieceColor::Black) => 1,
        }
    }
}

/// The sole board representation: a set of placements, unique by value.
///
/// Backed by an ordered set so that every scan over it (and therefore every
/// first-match tie-break) is deterministic.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PositionSet {
    placements: BTreeSet<Placement>,
}

impl PositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial position laid out for the given orientation
    pub fn starting(orientation: Orientation) -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        Square::all()
            .filter_map(|square| {
                let (file, rank) = file_rank_of(square, orientation);
                let piece = match rank {
                    0 => Piece::white(BACK_RANK[file as usize]),
                    1 => Piece::white(PieceKind::Pawn),
                    6 => Piece::black(PieceKind::Pawn),
                    7 => Piece::black(BACK_RANK[file as usize]),
                    _ => return None,
                };
                Some(Placement::new(piece, square))
            })
            .collect()
    }

    /// Convert a shakmaty board into placements seen under `orientation`
    pub fn from_board(board: &shakmaty::Board, orientation: Orientation) -> CodecResult<Self> {
        let mut set = Self::new();
        for sq in board.occupied() {
            if let Some(piece) = board.piece_at(sq) {
                let square = cell_to_square(&sq.to_string(), orientation)?;
                set.insert(Placement::new(shakmaty_to_piece(piece), square));
            }
        }
        Ok(set)
    }

    pub fn insert(&mut self, placement: Placement) -> bool {
        self.placements.insert(placement)
    }

    pub fn remove(&mut self, placement: &Placement) -> bool {
        self.placements.remove(placement)
    }

    pub fn contains(&self, placement: &Placement) -> bool {
        self.placements.contains(placement)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    /// The placement standing on `square`, if any
    pub fn at(&self, square: Square) -> Option<Placement> {
        self.placements.iter().find(|p| p.square == square).copied()
    }

    /// Placements in `self` that are absent from `other`
    pub fn difference(&self, other: &PositionSet) -> Vec<Placement> {
        self.placements.difference(&other.placements).copied().collect()
    }
}

impl FromIterator<Placement> for PositionSet {
    fn from_iter<I: IntoIterator<Item = Placement>>(iter: I) -> Self {
        Self {
            placements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PositionSet {
    type Item = &'a Placement;
    type IntoIter = std::collections::btree_set::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// Board-relative picture, row 0 first, `.` for empty cells
impl fmt::Display for PositionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..8 {
            for x in 0..8 {
                let cell = Square::new(x, y)
                    .ok()
                    .and_then(|sq| self.at(sq))
                    .map(|p| p.piece.fen_char())
                    .unwrap_or('.');
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Convert shakmaty piece to our domain Piece
pub fn shakmaty_to_piece(piece: shakmaty::Piece) -> Piece {
    let kind = match piece.role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    };
    let color = match piece.color {
        SColor::White => PieceColor::White,
        SColor::Black => PieceColor::Black,
    };
    Piece { kind, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(x: i32, y: i32) -> Square {
        Square::new(x, y).unwrap()
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_ok());
        assert!(Square::new(7, 7).is_ok());
        assert_eq!(Square::new(8, 0), Err(CodecError::InvalidSquare { x: 8, y: 0 }));
        assert_eq!(Square::new(3, -1), Err(CodecError::InvalidSquare { x: 3, y: -1 }));
    }

    #[test]
    fn test_square_offset() {
        assert_eq!(sq(3, 3).offset(1, -2), Some(sq(4, 1)));
        assert_eq!(sq(0, 0).offset(-1, 0), None);
        assert_eq!(sq(7, 7).offset(0, 1), None);
    }

    #[test]
    fn test_all_squares() {
        let all: BTreeSet<_> = Square::all().collect();
        assert_eq!(all.len(), 64);
    }

    #[test]
    fn test_notation_letters() {
        assert_eq!(PieceKind::Pawn.notation(), "");
        assert_eq!(PieceKind::Knight.notation(), "N");
        assert_eq!(PieceKind::from_notation('q'), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_notation('N'), Some(PieceKind::Knight));
        assert_eq!(PieceKind::from_notation('x'), None);
        assert!(!PieceKind::King.is_promotion_target());
        assert!(!PieceKind::Pawn.is_promotion_target());
        assert!(PieceKind::Bishop.is_promotion_target());
    }

    #[test]
    fn test_orientation_ranks_are_mirrored() {
        for color in [PieceColor::White, PieceColor::Black] {
            let wn = Orientation::WhiteNearer;
            let bn = Orientation::BlackNearer;
            assert_eq!(wn.back_rank(color), 7 - bn.back_rank(color));
            assert_eq!(wn.far_rank(color), 7 - bn.far_rank(color));
            assert_eq!(wn.forward(color), -bn.forward(color));
            assert_eq!(
                wn.promotion_origin_rank(color) as i32 + wn.forward(color),
                wn.far_rank(color) as i32
            );
        }
        assert_eq!(Orientation::WhiteNearer.near_color(), PieceColor::White);
        assert_eq!(Orientation::from_white_nearer(false), Orientation::BlackNearer);
    }

    #[test]
    fn test_starting_position_white_nearer() {
        let set = PositionSet::starting(Orientation::WhiteNearer);
        assert_eq!(set.len(), 32);
        assert_eq!(
            set.at(sq(4, 7)),
            Some(Placement::new(Piece::white(PieceKind::King), sq(4, 7)))
        );
        assert_eq!(
            set.at(sq(3, 0)),
            Some(Placement::new(Piece::black(PieceKind::Queen), sq(3, 0)))
        );
        assert_eq!(set.at(sq(0, 6)).map(|p| p.piece), Some(Piece::white(PieceKind::Pawn)));
        assert_eq!(set.at(sq(4, 4)), None);
    }

    #[test]
    fn test_starting_position_black_nearer() {
        let set = PositionSet::starting(Orientation::BlackNearer);
        assert_eq!(set.len(), 32);
        // King and queen files mirror when Black sits nearer.
        assert_eq!(set.at(sq(3, 0)).map(|p| p.piece), Some(Piece::white(PieceKind::King)));
        assert_eq!(set.at(sq(3, 7)).map(|p| p.piece), Some(Piece::black(PieceKind::King)));
        assert_eq!(set.at(sq(4, 7)).map(|p| p.piece), Some(Piece::black(PieceKind::Queen)));
        assert_eq!(set.at(sq(5, 6)).map(|p| p.piece), Some(Piece::black(PieceKind::Pawn)));
    }

    #[test]
    fn test_from_board_matches_starting() {
        let board = shakmaty::Board::new();
        for orientation in [Orientation::WhiteNearer, Orientation::BlackNearer] {
            let set = PositionSet::from_board(&board, orientation).unwrap();
            assert_eq!(set, PositionSet::starting(orientation));
        }
    }

    #[test]
    fn test_difference_is_directional() {
        let pawn = Piece::white(PieceKind::Pawn);
        let prev: PositionSet = [Placement::new(pawn, sq(4, 6))].into_iter().collect();
        let curr: PositionSet = [Placement::new(pawn, sq(4, 4))].into_iter().collect();
        assert_eq!(prev.difference(&curr), vec![Placement::new(pawn, sq(4, 6))]);
        assert_eq!(curr.difference(&prev), vec![Placement::new(pawn, sq(4, 4))]);
        assert!(prev.difference(&prev).is_empty());
    }

    #[test]
    fn test_display_grid() {
        let rendered = PositionSet::starting(Orientation::WhiteNearer).to_string();
        let rows: Vec<_> = rendered.lines().collect();
        assert_eq!(rows[0], "rnbqkbnr");
        assert_eq!(rows[4], "........");
        assert_eq!(rows[7], "RNBQKBNR");
    }
}
