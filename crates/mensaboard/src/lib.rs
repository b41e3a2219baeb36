//! Mensaboard - canteen menus and weather forecast for TU Braunschweig.
//!
//! Two independent feeds are normalized into tables:
//! - [`menu`]: meal offers per canteen location for one day
//! - [`weather`]: hourly and daily forecast variables on a generated time axis
//!
//! [`dashboard`] loads both into independent sections, which are shown by the
//! terminal UI ([`tui`]) or printed by the CLI ([`cli`]).

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod menu;
pub mod transport;
pub mod tui;
pub mod weather;

pub use config::{ConfigError, DashboardConfig, Location};
pub use dashboard::{Dashboard, Section};
pub use transport::{CachedClient, Fetch, FetchError};
