pub mod cli;
pub mod feed;
pub mod io;
pub mod logging;
pub mod model;
pub mod tui;
pub mod util;
