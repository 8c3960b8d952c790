pub mod session_players;
pub mod sessions;
pub mod turns;

pub use session_players::Entity as SessionPlayers;
pub use session_players::Model as SessionPlayer;
pub use sessions::Entity as Sessions;
pub use sessions::Model as Session;
pub use turns::Entity as Turns;
pub use turns::Model as TurnRow;
