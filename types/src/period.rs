//! Block heights and voting-period arithmetic.

/// Height of a finalized block.
pub type BlockHeight = u64;

/// Whether `height` is the last block of a period of `period` blocks.
///
/// Heights are zero-based for this purpose: with a period of 5, blocks
/// 4, 9, 14, ... close a period. A zero period never closes.
pub fn is_period_last_block(height: BlockHeight, period: u64) -> bool {
    if period == 0 {
        return false;
    }
    height
        .checked_add(1)
        .is_some_and(|next| next % period == 0)
}

/// Index of the voting period containing `height`.
pub fn voting_period_of(height: BlockHeight, vote_period: u64) -> u64 {
    height.checked_div(vote_period).unwrap_or(0)
}
