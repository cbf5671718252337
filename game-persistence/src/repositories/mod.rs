pub mod ledger_repository;
pub mod player_repository;
pub mod room_repository;

pub use ledger_repository::LedgerRepository;
pub use player_repository::PlayerRepository;
pub use room_repository::RoomRepository;
