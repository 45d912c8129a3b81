//! Bidirectional chess move codec for a board that is only ever observed.
//!
//! The tracked position is a sparse set of (piece, square) facts. Moves seen
//! between two observations are reconstructed into classified moves, and
//! moves chosen by an engine are applied back onto the tracked set.

pub mod config;
pub mod domain;
pub mod error;
pub mod models;

pub use error::{CodecError, CodecResult};
