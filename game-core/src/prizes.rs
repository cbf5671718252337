//! Rank-based prize split over a room's entry-fee pool.
//!
//! Each table is keyed by the number of seats that paid in. Shares sum to
//! at most 1.0; payouts are floored, so any residual stays unallocated.

/// Share tables for 2 through 8 seats. Seat counts outside the range use
/// the seven-entry split.
const SHARES_2: &[f64] = &[1.0];
const SHARES_3: &[f64] = &[0.6, 0.4];
const SHARES_4: &[f64] = &[0.5, 0.3, 0.2];
const SHARES_5: &[f64] = &[0.45, 0.25, 0.2, 0.1];
const SHARES_6: &[f64] = &[0.4, 0.25, 0.15, 0.1, 0.1];
const SHARES_7: &[f64] = &[0.4, 0.25, 0.15, 0.1, 0.05, 0.05];
const SHARES_FALLBACK: &[f64] = &[0.35, 0.25, 0.15, 0.1, 0.05, 0.05, 0.05];

pub fn prize_shares(total_seats: usize) -> &'static [f64] {
    match total_seats {
        2 => SHARES_2,
        3 => SHARES_3,
        4 => SHARES_4,
        5 => SHARES_5,
        6 => SHARES_6,
        7 => SHARES_7,
        _ => SHARES_FALLBACK,
    }
}

/// The pool is fixed at room-fill time: every seat paid the entry fee and
/// resignations do not refund it.
pub fn prize_pool(total_seats: i64, entry_fee: i64) -> i64 {
    total_seats * entry_fee
}

/// Floored payout for the player finishing at `rank` (0-based). Ranks past
/// the table length earn nothing.
pub fn rank_payout(pool: i64, shares: &[f64], rank: usize) -> i64 {
    shares
        .get(rank)
        .map(|share| (pool as f64 * share).floor() as i64)
        .unwrap_or(0)
}

/// Indices of `items` ordered by score descending. The sort is stable, so
/// equal scores keep seat order.
pub fn rank_indices<T, F>(items: &[T], score: F) -> Vec<usize>
where
    F: Fn(&T) -> i32,
{
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by_key(|&i| std::cmp::Reverse(score(&items[i])));
    indices
}
