//! Command handling module.
//!
//! Processes user commands that manage the watchlist and the recurring
//! scan schedule. Commands use a configurable prefix, "/" by default.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{BotCommand, CommandResult, FetchArgs};
