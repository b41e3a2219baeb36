use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::transport::Fetch;

/// How long the "press Ctrl+C again" warning stays up
const EXIT_WARNING_TIMEOUT: Duration = Duration::from_secs(2);

/// Application state
pub struct App {
    pub config: DashboardConfig,

    /// Menu date
    pub date: NaiveDate,

    /// Loaded sections (None until the first load finishes)
    pub dashboard: Option<Dashboard>,

    /// A load was requested and runs before the next key is read
    pub reload_requested: bool,
    pub last_loaded: Option<Instant>,

    /// Focused menu panel and its scroll offsets
    pub focused_menu: usize,
    pub menu_scroll: Vec<usize>,

    /// Exit warning state (double Ctrl+C)
    pub exit_warning: bool,
    pub exit_warning_time: Option<Instant>,
}

impl App {
    pub fn new(config: DashboardConfig, date: NaiveDate) -> Self {
        let locations = config.locations.len();
        Self {
            config,
            date,
            dashboard: None,
            reload_requested: true,
            last_loaded: None,
            focused_menu: 0,
            menu_scroll: vec![0; locations],
            exit_warning: false,
            exit_warning_time: None,
        }
    }

    /// Load every section for the current date.
    pub async fn reload<F: Fetch + ?Sized>(&mut self, fetcher: &F) {
        log::info!("Loading dashboard for {}", self.date);
        let dashboard = Dashboard::load(fetcher, &self.config, self.date).await;
        self.dashboard = Some(dashboard);
        self.menu_scroll = vec![0; self.config.locations.len()];
        self.reload_requested = false;
        self.last_loaded = Some(Instant::now());
    }

    /// Handle a key press. Returns true if the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.exit_warning = false;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.reload_requested = true,
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1),
            KeyCode::Left => self.shift_date(-1),
            KeyCode::Right => self.shift_date(1),
            KeyCode::Char('t') => {
                let today = crate::dashboard::today();
                if today != self.date {
                    self.date = today;
                    self.reload_requested = true;
                }
            }
            _ => {}
        }
        false
    }

    /// First Ctrl+C arms a warning, a second one within the timeout exits.
    pub fn handle_exit_request(&mut self) -> bool {
        if self.exit_warning {
            return true;
        }
        self.exit_warning = true;
        self.exit_warning_time = Some(Instant::now());
        false
    }

    pub fn check_exit_timeout(&mut self) {
        if let Some(time) = self.exit_warning_time {
            if time.elapsed() > EXIT_WARNING_TIMEOUT {
                self.exit_warning = false;
                self.exit_warning_time = None;
            }
        }
    }

    fn focus_next(&mut self) {
        let n = self.config.locations.len();
        if n > 0 {
            self.focused_menu = (self.focused_menu + 1) % n;
        }
    }

    fn focus_prev(&mut self) {
        let n = self.config.locations.len();
        if n > 0 {
            self.focused_menu = (self.focused_menu + n - 1) % n;
        }
    }

    fn scroll(&mut self, delta: isize) {
        let rows = self
            .dashboard
            .as_ref()
            .and_then(|d| d.menus.get(self.focused_menu))
            .and_then(|m| m.menu.data())
            .map(|t| t.len())
            .unwrap_or(0);
        if let Some(offset) = self.menu_scroll.get_mut(self.focused_menu) {
            let next = offset.saturating_add_signed(delta);
            *offset = next.min(rows.saturating_sub(1));
        }
    }

    fn shift_date(&mut self, days: i64) {
        let shifted = if days >= 0 {
            self.date.checked_add_days(Days::new(days as u64))
        } else {
            self.date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.date = date;
            self.reload_requested = true;
        }
    }
}
