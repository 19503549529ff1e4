//! Global constants

/// Number of squares on the Reversi board.
pub const BOARD_SQUARES: usize = 64;

/// Number of empty squares in the standard starting position.
pub const INITIAL_EMPTIES: u32 = 60;
