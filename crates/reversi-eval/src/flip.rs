//! Disc flip calculation for move execution.

use crate::bitboard::{Bitboard, DIRECTION_SHIFTS};
use crate::square::Square;

/// Calculates which opponent discs would be flipped by placing a disc at the given square.
///
/// For each of the eight ray directions, the contiguous run of opponent discs
/// starting next to `sq` is collected; the run flips only when it is capped
/// by one of the player's own discs.
///
/// # Arguments
///
/// * `sq` - The square where the disc is being placed
/// * `p` - Bitboard representing the current player's discs
/// * `o` - Bitboard representing the opponent's discs
///
/// # Returns
///
/// A bitboard representing all opponent discs that would be flipped by this move.
/// Returns an empty bitboard if no discs would be flipped (invalid move).
#[inline]
pub fn flip(sq: Square, p: Bitboard, o: Bitboard) -> Bitboard {
    let bit = sq.bitboard().bits();
    let (p, o) = (p.bits(), o.bits());
    let mut flipped = 0u64;

    for shift in DIRECTION_SHIFTS {
        let mut run = shift(bit) & o;
        run |= shift(run) & o;
        run |= shift(run) & o;
        run |= shift(run) & o;
        run |= shift(run) & o;
        run |= shift(run) & o;
        if shift(run) & p != 0 {
            flipped |= run;
        }
    }

    Bitboard::new(flipped)
}
