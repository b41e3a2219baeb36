//! Loads every section of the dashboard.
//!
//! Sections are independent: a failed menu or forecast is kept as an error
//! for that section only, and the rest still loads.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{DashboardConfig, Location};
use crate::menu::{fetch_menu, MenuTable};
use crate::transport::Fetch;
use crate::weather::{fetch_forecast, Forecast};

/// Content of one section, or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Section<T> {
    Loaded { data: T },
    Failed { error: String },
}

impl<T> Section<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Loaded { data },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded { data } => Some(data),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Menu of one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSection {
    pub location: Location,
    pub menu: Section<MenuTable>,
}

/// Everything shown on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub menus: Vec<MenuSection>,
    pub place: String,
    pub forecast: Section<Forecast>,
    /// Hourly variables drawn on their own chart
    pub hourly_focus: Vec<String>,
}

impl Dashboard {
    /// Load all menus for `date`, then the forecast, one request at a time.
    pub async fn load<F: Fetch + ?Sized>(
        fetcher: &F,
        config: &DashboardConfig,
        date: NaiveDate,
    ) -> Self {
        let mut menus = Vec::with_capacity(config.locations.len());
        for location in &config.locations {
            let result = fetch_menu(fetcher, &config.menu_base_url, &location.id, date).await;
            if let Err(e) = &result {
                log::error!("menu for {} ({}) failed: {}", location.label, location.id, e);
            }
            menus.push(MenuSection {
                location: location.clone(),
                menu: Section::from_result(result),
            });
        }

        let result = fetch_forecast(fetcher, &config.weather).await;
        if let Err(e) = &result {
            log::error!("forecast for {} failed: {}", config.weather.place, e);
        }

        Self {
            date,
            menus,
            place: config.weather.place.clone(),
            forecast: Section::from_result(result),
            hourly_focus: config.weather.hourly_focus.clone(),
        }
    }

    pub fn failed_sections(&self) -> usize {
        self.menus.iter().filter(|m| !m.menu.is_loaded()).count()
            + usize::from(!self.forecast.is_loaded())
    }
}

/// Today's date in the local timezone of the machine.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
