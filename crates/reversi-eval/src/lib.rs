//! Incremental pattern-feature evaluation core for Reversi.
//!
//! This crate maintains the base-3 pattern encodings a positional evaluator
//! consumes, updating them disc by disc as moves are played instead of
//! rescanning the board. The entry points are [`eval::Accumulator`] for the
//! feature state itself and [`board::Board`] / [`move_list::MoveList`] for
//! the position and move types that feed it.

pub mod bitboard;
pub mod board;
mod constants;
pub mod disc;
pub mod eval;
pub mod flip;
pub mod move_list;
pub mod square;
