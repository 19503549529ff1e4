//! Incremental maintenance of the pattern feature vector.
//!
//! The accumulator holds one base-3 encoding per pattern plus the number of
//! empty squares left in the position. The encoding is anchored to a single
//! color for the whole game: because the side to move alternates every ply
//! and exactly one disc is placed per move, the parity of the empty-square
//! count recovers which color that is, and no explicit side-to-move field
//! is needed.
//!
//! Playing a move changes the vector in O(flips) time. Two digit moves
//! occur: the placed square goes from empty (digit 2) to a disc, and each
//! captured square trades one disc digit for the other. With the anchored
//! color written as digit 0, a move by the anchored side shifts the placed
//! square's digit by two steps and each captured digit by one step down,
//! while a move by the other side shifts the placed digit one step down and
//! each captured digit one step up. The parity of `empty_count` before the
//! move selects between the two cases.
//!
//! The arithmetic runs over all 48 lanes at once on targets with wide
//! registers (AVX2, wasm simd128); the scalar path walks the sparse
//! square-to-lane table instead and is kept compiled everywhere as the
//! bit-exact reference.

use cfg_if::cfg_if;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::eval::pattern::{ALL_OPPONENT, CONTRIBUTION, FeatureVector, NUM_LANES, SQUARE_PATTERNS};
use crate::square::Square;

/// Pattern feature state of a single position.
///
/// Create one with [`Accumulator::new`] at the root of a search, then keep
/// it current with [`Accumulator::update`] along the line actually played,
/// or branch off with [`Accumulator::update_leaf`] to score a candidate
/// move without disturbing the parent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    /// Base-3 pattern encodings, one lane per pattern.
    features: FeatureVector,
    /// Number of empty squares in the encoded position.
    empty_count: u32,
}

impl Accumulator {
    /// Builds the feature state of a position from scratch.
    ///
    /// Starts from the all-opponent baseline, removes the contribution of
    /// every disc owned by the color the parity of `empty_count` selects,
    /// and adds the contribution of every empty square. The third square
    /// state needs no correction: a square that is neither selected nor
    /// empty is already represented by the baseline digit.
    ///
    /// This is O(board size) and intended for roots and consistency checks,
    /// not for the per-move hot path.
    ///
    /// # Arguments
    ///
    /// * `board` - The position, viewed from the side to move.
    /// * `empty_count` - Number of empty squares on `board`.
    ///
    /// # Returns
    ///
    /// A new `Accumulator` for the position.
    pub fn new(board: &Board, empty_count: u32) -> Accumulator {
        debug_assert_eq!(empty_count, board.get_empty_count());

        let mut features = ALL_OPPONENT;
        let anchored = if empty_count & 1 == 1 {
            board.player
        } else {
            board.opponent
        };

        for sq in anchored.iter() {
            let contribution = &CONTRIBUTION[sq.index()];
            for lane in 0..NUM_LANES {
                features[lane] = features[lane].wrapping_sub(contribution[lane]);
            }
        }

        for sq in board.get_empty().iter() {
            let contribution = &CONTRIBUTION[sq.index()];
            for lane in 0..NUM_LANES {
                features[lane] = features[lane].wrapping_add(contribution[lane]);
            }
        }

        Accumulator {
            features,
            empty_count,
        }
    }

    /// Returns the pattern encodings as a plain lane array.
    #[inline(always)]
    pub fn features(&self) -> &[i16; NUM_LANES] {
        self.features.as_array()
    }

    /// Returns the number of empty squares in the encoded position.
    #[inline(always)]
    pub fn empty_count(&self) -> u32 {
        self.empty_count
    }

    /// Advances this state in place to reflect the move just played.
    ///
    /// Used while descending the line actually being searched; the caller
    /// keeps one state per stack frame, so the overwritten value is the
    /// frame's own copy.
    ///
    /// No validation is performed: a flip set that does not follow from the
    /// game rules produces a silently inconsistent state.
    ///
    /// # Arguments
    ///
    /// * `sq` - The square where the disc is placed.
    /// * `flipped` - Bitboard of discs captured by the move.
    #[inline(always)]
    pub fn update(&mut self, sq: Square, flipped: Bitboard) {
        debug_assert!(sq != Square::None);
        debug_assert!(!flipped.is_empty());
        debug_assert!(self.empty_count > 0);

        self.features = self.advanced(sq, flipped);
        self.empty_count -= 1;
    }

    /// Produces the feature state after a move without mutating this one.
    ///
    /// Search uses this to look one ply deeper at many candidate moves from
    /// the same parent state; the parent remains valid afterwards.
    ///
    /// # Arguments
    ///
    /// * `sq` - The square where the disc is placed.
    /// * `flipped` - Bitboard of discs captured by the move.
    ///
    /// # Returns
    ///
    /// The `Accumulator` of the resulting position.
    #[inline(always)]
    pub fn update_leaf(&self, sq: Square, flipped: Bitboard) -> Accumulator {
        debug_assert!(sq != Square::None);
        debug_assert!(self.empty_count > 0);

        Accumulator {
            features: self.advanced(sq, flipped),
            empty_count: self.empty_count - 1,
        }
    }

    /// Computes the lane vector after a move. Shared by [`Self::update`]
    /// and [`Self::update_leaf`]; the parity of the current `empty_count`
    /// selects the digit arithmetic.
    #[inline(always)]
    fn advanced(&self, sq: Square, flipped: Bitboard) -> FeatureVector {
        cfg_if! {
            if #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))] {
                return unsafe { self.advanced_avx2(sq, flipped) };
            } else if #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))] {
                return self.advanced_wasm_simd(sq, flipped);
            } else {
                return self.advanced_scalar(sq, flipped);
            }
        }
    }

    /// Scalar implementation of the move arithmetic.
    ///
    /// Walks the sparse square-to-lane table so only the touched lanes are
    /// rewritten. Always compiled: it is the fallback on targets without
    /// wide registers and the reference the SIMD paths are checked against.
    #[allow(dead_code)]
    fn advanced_scalar(&self, sq: Square, flipped: Bitboard) -> FeatureVector {
        let mut out = self.features;
        let placed = &SQUARE_PATTERNS[sq.index()];

        if self.empty_count & 1 == 1 {
            for &[lane, weight] in placed.entries() {
                let lane = lane as usize;
                out[lane] = out[lane].wrapping_sub((weight as i16) << 1);
            }
            for x in flipped.iter() {
                for &[lane, weight] in SQUARE_PATTERNS[x.index()].entries() {
                    let lane = lane as usize;
                    out[lane] = out[lane].wrapping_sub(weight as i16);
                }
            }
        } else {
            for &[lane, weight] in placed.entries() {
                let lane = lane as usize;
                out[lane] = out[lane].wrapping_sub(weight as i16);
            }
            for x in flipped.iter() {
                for &[lane, weight] in SQUARE_PATTERNS[x.index()].entries() {
                    let lane = lane as usize;
                    out[lane] = out[lane].wrapping_add(weight as i16);
                }
            }
        }

        out
    }

    /// AVX2 implementation of the move arithmetic: the 48 lanes live in
    /// three 256-bit registers while the flip mask is scanned bit by bit.
    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    #[target_feature(enable = "avx2")]
    fn advanced_avx2(&self, sq: Square, flipped: Bitboard) -> FeatureVector {
        use std::arch::x86_64::*;

        unsafe {
            let ct = &CONTRIBUTION;
            let placed = ct.get_unchecked(sq.index()).as_m256_ptr();
            let src = self.features.as_m256_ptr();

            let mut f0;
            let mut f1;
            let mut f2;
            let mut bits = flipped.bits();

            if self.empty_count & 1 == 1 {
                f0 = _mm256_sub_epi16(
                    _mm256_load_si256(src),
                    _mm256_slli_epi16(_mm256_load_si256(placed), 1),
                );
                f1 = _mm256_sub_epi16(
                    _mm256_load_si256(src.add(1)),
                    _mm256_slli_epi16(_mm256_load_si256(placed.add(1)), 1),
                );
                f2 = _mm256_sub_epi16(
                    _mm256_load_si256(src.add(2)),
                    _mm256_slli_epi16(_mm256_load_si256(placed.add(2)), 1),
                );

                while bits != 0 {
                    let x = bits.trailing_zeros() as usize;
                    bits = _blsr_u64(bits);
                    let cp = ct.get_unchecked(x).as_m256_ptr();
                    f0 = _mm256_sub_epi16(f0, _mm256_load_si256(cp));
                    f1 = _mm256_sub_epi16(f1, _mm256_load_si256(cp.add(1)));
                    f2 = _mm256_sub_epi16(f2, _mm256_load_si256(cp.add(2)));
                }
            } else {
                f0 = _mm256_sub_epi16(_mm256_load_si256(src), _mm256_load_si256(placed));
                f1 = _mm256_sub_epi16(_mm256_load_si256(src.add(1)), _mm256_load_si256(placed.add(1)));
                f2 = _mm256_sub_epi16(_mm256_load_si256(src.add(2)), _mm256_load_si256(placed.add(2)));

                while bits != 0 {
                    let x = bits.trailing_zeros() as usize;
                    bits = _blsr_u64(bits);
                    let cp = ct.get_unchecked(x).as_m256_ptr();
                    f0 = _mm256_add_epi16(f0, _mm256_load_si256(cp));
                    f1 = _mm256_add_epi16(f1, _mm256_load_si256(cp.add(1)));
                    f2 = _mm256_add_epi16(f2, _mm256_load_si256(cp.add(2)));
                }
            }

            let mut out = FeatureVector::new();
            let out_ptr = out.as_mut_m256_ptr();
            _mm256_store_si256(out_ptr, f0);
            _mm256_store_si256(out_ptr.add(1), f1);
            _mm256_store_si256(out_ptr.add(2), f2);
            out
        }
    }

    /// WebAssembly SIMD implementation of the move arithmetic: the 48 lanes
    /// live in six 128-bit registers.
    #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
    #[target_feature(enable = "simd128")]
    fn advanced_wasm_simd(&self, sq: Square, flipped: Bitboard) -> FeatureVector {
        use core::arch::wasm32::*;

        unsafe {
            let ct = &CONTRIBUTION;
            let placed = ct.get_unchecked(sq.index()).as_v128_ptr();
            let src = self.features.as_v128_ptr();

            let mut f = [
                v128_load(src),
                v128_load(src.add(1)),
                v128_load(src.add(2)),
                v128_load(src.add(3)),
                v128_load(src.add(4)),
                v128_load(src.add(5)),
            ];
            let mut bits = flipped.bits();

            if self.empty_count & 1 == 1 {
                for (i, lane) in f.iter_mut().enumerate() {
                    *lane = i16x8_sub(*lane, i16x8_shl(v128_load(placed.add(i)), 1));
                }
                while bits != 0 {
                    let x = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    let cp = ct.get_unchecked(x).as_v128_ptr();
                    for (i, lane) in f.iter_mut().enumerate() {
                        *lane = i16x8_sub(*lane, v128_load(cp.add(i)));
                    }
                }
            } else {
                for (i, lane) in f.iter_mut().enumerate() {
                    *lane = i16x8_sub(*lane, v128_load(placed.add(i)));
                }
                while bits != 0 {
                    let x = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    let cp = ct.get_unchecked(x).as_v128_ptr();
                    for (i, lane) in f.iter_mut().enumerate() {
                        *lane = i16x8_add(*lane, v128_load(cp.add(i)));
                    }
                }
            }

            let mut out = FeatureVector::new();
            let out_ptr = out.as_mut_v128_ptr();
            for (i, lane) in f.iter().enumerate() {
                v128_store(out_ptr.add(i), *lane);
            }
            out
        }
    }
}
