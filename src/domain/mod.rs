pub mod apply;
pub mod chess;
pub mod geometry;
pub mod moves;
pub mod notation;
pub mod reconstruct;
pub mod uci;

pub use apply::{AppliedEffect, apply};
pub use chess::{Orientation, Piece, PieceColor, PieceKind, Placement, PositionSet, Square};
pub use moves::ClassifiedMove;
pub use notation::{cell_to_square, square_to_cell};
pub use reconstruct::reconstruct;
