pub mod board;
pub mod card;
pub mod comment;
pub mod config;

pub use board::*;
pub use card::*;
pub use comment::*;
pub use config::*;
