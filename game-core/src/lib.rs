pub mod codes;
pub mod prizes;
pub mod rotation;

pub use codes::generate_room_code;
pub use prizes::{prize_pool, prize_shares, rank_indices, rank_payout};
pub use rotation::{next_seat, next_seat_from};
