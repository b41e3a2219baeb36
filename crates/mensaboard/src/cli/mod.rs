//! CLI module for Mensaboard commands

pub mod cache;
pub mod print;

pub use cache::{CacheCommand, CacheError};
pub use print::PrintCommand;
