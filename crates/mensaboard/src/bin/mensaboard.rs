//! Mensaboard CLI
//!
//! Usage:
//!   mensaboard                          # Interactive dashboard (today)
//!   mensaboard tui -d 2024-05-13        # Interactive dashboard for a date
//!   mensaboard print [-f table|json]    # Print menus and forecast to stdout
//!   mensaboard cache info|clear|purge   # Inspect or clean the response cache
//!
//! Global options:
//!   -c, --config <path>   YAML config (default: ~/.mensaboard/config.yaml)
//!   --no-cache            Bypass the response cache

use std::path::PathBuf;

use argh::FromArgs;
use mensaboard::cli::{CacheCommand, PrintCommand};
use mensaboard::config::app_dir;
use mensaboard::transport::RetryPolicy;
use mensaboard::{CachedClient, DashboardConfig};

/// Mensaboard - canteen menus and weather for TU Braunschweig
#[derive(FromArgs)]
struct Args {
    /// show version information
    #[argh(switch, short = 'V')]
    version: bool,

    /// path to the YAML config file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// bypass the HTTP response cache
    #[argh(switch)]
    no_cache: bool,

    #[argh(subcommand)]
    command: Option<Command>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Tui(TuiArgs),
    Print(PrintCommand),
    Cache(CacheCommand),
}

/// Interactive terminal dashboard (default)
#[derive(FromArgs)]
#[argh(subcommand, name = "tui")]
struct TuiArgs {
    /// menu date as YYYY-MM-DD (default: today)
    #[argh(option, short = 'd')]
    date: Option<String>,
}

/// Send logs to ~/.mensaboard/mensaboard.log so they don't tear the TUI.
fn init_file_logging() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    let log_path = dir.join("mensaboard.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to open log file {}: {}", log_path.display(), e))?;
    drop(
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .try_init(),
    );
    Ok(log_path)
}

fn init_stderr_logging() {
    drop(
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Stderr)
            .try_init(),
    );
}

fn build_client(config: &DashboardConfig, no_cache: bool) -> CachedClient {
    if no_cache {
        log::info!("Response cache disabled");
        return CachedClient::uncached(RetryPolicy {
            retries: config.transport.retries,
            backoff_factor: config.transport.backoff_factor,
        });
    }
    CachedClient::from_config(&config.transport, &config.cache_path())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    // Handle --version flag
    if args.version {
        println!("mensaboard {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let command = args
        .command
        .unwrap_or(Command::Tui(TuiArgs { date: None }));

    match &command {
        Command::Tui(_) => {
            let log_path = init_file_logging()?;
            log::info!("Mensaboard starting (logs in {})", log_path.display());
        }
        _ => init_stderr_logging(),
    }

    let config_path = args.config.map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref())?;
    log::debug!(
        "Loaded config: {} location(s), forecast for {}",
        config.locations.len(),
        config.weather.place
    );

    match command {
        Command::Tui(tui_args) => {
            let date = mensaboard::cli::print::parse_date(tui_args.date.as_deref())?;
            let client = build_client(&config, args.no_cache);
            mensaboard::tui::run(&client, config, date).await?;
        }
        Command::Print(cmd) => {
            let client = build_client(&config, args.no_cache);
            cmd.run(&client, &config).await?;
        }
        Command::Cache(cmd) => {
            cmd.run(&config)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;
        }
    }

    Ok(())
}
