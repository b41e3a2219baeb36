//! Terminal dashboard
//!
//! Two columns: canteen menus on the left, forecast charts on the right.
//! Sections load sequentially before the next key is read; `r` reloads.

use std::io;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self as crossterm_event, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub mod app;
pub mod ui;

use crate::config::DashboardConfig;
use crate::transport::Fetch;
use app::App;

/// Run the TUI application
pub async fn run<F: Fetch + ?Sized>(
    fetcher: &F,
    config: DashboardConfig,
    date: NaiveDate,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, date);
    let result = run_app(&mut terminal, &mut app, fetcher).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend, F: Fetch + ?Sized>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    fetcher: &F,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.reload_requested {
            app.reload(fetcher).await;
            continue;
        }

        if crossterm_event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = crossterm_event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C for exit
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    if app.handle_exit_request() {
                        break;
                    }
                    continue;
                }

                if app.handle_key(key) {
                    break;
                }
            }
        }

        app.check_exit_timeout();
    }

    Ok(())
}
