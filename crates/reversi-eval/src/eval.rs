//! Pattern-based positional evaluation features.
//!
//! The evaluation of a position is driven by a fixed family of board
//! patterns (rows, columns, diagonals, corner regions). Each pattern's
//! occupancy state is encoded as one base-3 integer, and the full set of
//! encodings is what a weight lookup consumes to score the position.
//!
//! This module keeps those encodings correct as a game is played:
//! [`pattern`] defines the pattern family and the precomputed per-square
//! contribution tables, and [`Accumulator`] maintains the encoded vector
//! incrementally, move by move, without rescanning the board.

pub mod accumulator;
pub mod pattern;

pub use accumulator::Accumulator;
