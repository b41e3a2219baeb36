//! Response cache maintenance

use std::time::Duration;

use argh::FromArgs;
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::transport::{self, ResponseCache};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Cache(#[from] transport::CacheError),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Inspect or clean the HTTP response cache
#[derive(FromArgs)]
#[argh(subcommand, name = "cache")]
pub struct CacheCommand {
    #[argh(subcommand)]
    action: Option<CacheAction>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum CacheAction {
    Info(InfoArgs),
    Clear(ClearArgs),
    Purge(PurgeArgs),
}

/// Show cache location and entry count
#[derive(FromArgs)]
#[argh(subcommand, name = "info")]
struct InfoArgs {}

/// Delete every cached response
#[derive(FromArgs)]
#[argh(subcommand, name = "clear")]
struct ClearArgs {}

/// Delete cached responses older than the configured TTL
#[derive(FromArgs)]
#[argh(subcommand, name = "purge")]
struct PurgeArgs {}

impl CacheCommand {
    pub fn run(self, config: &DashboardConfig) -> Result<()> {
        let Some(action) = self.action else {
            Self::print_help();
            return Ok(());
        };

        let path = config.cache_path();
        let cache = ResponseCache::open(&path)?;
        match action {
            CacheAction::Info(_) => {
                println!("cache:   {}", path.display());
                println!("entries: {}", cache.len()?);
                println!("ttl:     {}s", config.transport.ttl_secs);
            }
            CacheAction::Clear(_) => {
                let removed = cache.clear()?;
                println!("Removed {} cached response(s)", removed);
            }
            CacheAction::Purge(_) => {
                let removed =
                    cache.purge_expired(Duration::from_secs(config.transport.ttl_secs))?;
                println!("Removed {} expired response(s)", removed);
            }
        }
        Ok(())
    }

    fn print_help() {
        eprintln!("Response cache maintenance\n");
        eprintln!("Usage: mensaboard cache <command>\n");
        eprintln!("Commands:");
        eprintln!("  info     Show cache location and entry count");
        eprintln!("  clear    Delete every cached response");
        eprintln!("  purge    Delete responses older than the TTL");
    }
}
