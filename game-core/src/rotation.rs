use game_types::PlayerStatus;

/// Resolves the seat that plays next.
///
/// `statuses` is the room's non-resigned seat list in join order; `current`
/// is the index of the seat whose turn just ended. The scan starts at the
/// seat after `current` and wraps, returning the first `Waiting` seat.
///
/// `Resigned` seats never appear in the list and `TimeUp` seats are skipped
/// outright: a timed-out player has forfeited every future turn. When no
/// `Waiting` seat exists the rotation yields `None`, which ends the game.
pub fn next_seat(current: usize, statuses: &[PlayerStatus]) -> Option<usize> {
    if statuses.is_empty() {
        return None;
    }
    next_seat_from((current + 1) % statuses.len(), statuses)
}

/// Like [`next_seat`], but the scan includes `start` itself. Used when the
/// seat whose turn ended is no longer in the list (a resigned turn holder):
/// the scan picks up at the departed seat's successor in seat order.
pub fn next_seat_from(start: usize, statuses: &[PlayerStatus]) -> Option<usize> {
    if statuses.is_empty() {
        return None;
    }

    let len = statuses.len();
    let mut idx = start % len;
    for _ in 0..len {
        if statuses[idx] == PlayerStatus::Waiting {
            return Some(idx);
        }
        idx = (idx + 1) % len;
    }

    None
}
