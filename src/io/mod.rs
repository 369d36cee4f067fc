pub mod board_io;
pub mod card_store;
pub mod comment_store;
pub mod config_io;
pub mod lock;
pub mod worker;
