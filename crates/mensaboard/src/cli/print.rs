//! Print command for a non-interactive dashboard
//!
//! Loads the same sections as the TUI and writes them to stdout:
//! - one menu table per location
//! - hourly and daily forecast tables
//!
//! Supports `-f json` for machine-readable output.

use std::fmt::Write as _;

use anyhow::{anyhow, Result};
use argh::FromArgs;
use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::dashboard::{today, Dashboard, MenuSection, Section};
use crate::menu::format_price;
use crate::transport::Fetch;
use crate::weather::{Forecast, TimeTable};

const NAME_WIDTH: usize = 48;
const VALUE_WIDTH: usize = 12;

/// Print menus and forecast to stdout (non-interactive)
#[derive(FromArgs)]
#[argh(subcommand, name = "print")]
pub struct PrintCommand {
    /// output format: table, json (default: table)
    #[argh(option, short = 'f', default = "String::from(\"table\")")]
    format: String,

    /// menu date as YYYY-MM-DD (default: today)
    #[argh(option, short = 'd')]
    date: Option<String>,

    /// hourly forecast rows to print (default: 24)
    #[argh(option, default = "24")]
    hours: usize,
}

impl PrintCommand {
    pub async fn run<F: Fetch + ?Sized>(self, fetcher: &F, config: &DashboardConfig) -> Result<()> {
        let format = OutputFormat::parse(&self.format)?;
        let date = parse_date(self.date.as_deref())?;
        let dashboard = Dashboard::load(fetcher, config, date).await;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
            OutputFormat::Table => print!("{}", render_text(&dashboard, self.hours)),
        }

        if dashboard.failed_sections() > 0 {
            log::warn!("{} section(s) failed to load", dashboard.failed_sections());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(anyhow!(
                "unknown output format '{}' (expected: table, json)",
                other
            )),
        }
    }
}

pub fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        None => Ok(today()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("invalid date '{}': {} (expected YYYY-MM-DD)", s, e)),
    }
}

/// Plain-text rendering of the whole dashboard.
pub fn render_text(dashboard: &Dashboard, hours: usize) -> String {
    let mut out = String::new();

    heading(&mut out, &format!("Essenspläne TU Braunschweig ({})", dashboard.date));
    for section in &dashboard.menus {
        render_menu(&mut out, section);
    }

    heading(&mut out, &format!("Wettervorhersage {}", dashboard.place));
    match &dashboard.forecast {
        Section::Loaded { data } => render_forecast(&mut out, data, hours),
        Section::Failed { error } => {
            let _ = writeln!(out, "✗ {}\n", error);
        }
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}\n", "=".repeat(title.chars().count()));
}

fn render_menu(out: &mut String, section: &MenuSection) {
    let _ = writeln!(out, "{}", section.location.label);
    match &section.menu {
        Section::Failed { error } => {
            let _ = writeln!(out, "  ✗ {}", error);
        }
        Section::Loaded { data } if data.is_empty() && data.skipped.is_empty() => {
            let _ = writeln!(out, "  (no offers)");
        }
        Section::Loaded { data } => {
            let _ = writeln!(out, "  {:<NAME_WIDTH$} {:>VALUE_WIDTH$}", "Name", "Price");
            for offer in &data.rows {
                let _ = writeln!(
                    out,
                    "  {:<NAME_WIDTH$} {:>VALUE_WIDTH$}",
                    truncate(&offer.name, NAME_WIDTH),
                    format_price(offer.student_price)
                );
            }
            if !data.skipped.is_empty() {
                let _ = writeln!(out, "  ({} offer(s) skipped)", data.skipped.len());
            }
        }
    }
    out.push('\n');
}

fn render_forecast(out: &mut String, forecast: &Forecast, hours: usize) {
    let _ = writeln!(out, "Stündlich");
    render_time_table(out, &forecast.hourly, hours);
    let _ = writeln!(out, "Täglich");
    render_time_table(out, &forecast.daily, forecast.daily.len());
}

fn render_time_table(out: &mut String, table: &TimeTable, max_rows: usize) {
    let _ = write!(out, "  {:<14}", "date");
    for name in table.names() {
        let _ = write!(out, " {:>w$}", truncate(name, name_width(name)), w = name_width(name));
    }
    out.push('\n');

    for row in 0..table.len().min(max_rows) {
        let _ = write!(out, "  {:<14}", table.label(row).unwrap_or_default());
        for variable in &table.variables {
            let w = name_width(&variable.name);
            match variable.values[row] {
                v if v.is_finite() => {
                    let _ = write!(out, " {:>w$.1}", v);
                }
                _ => {
                    let _ = write!(out, " {:>w$}", "-");
                }
            }
        }
        out.push('\n');
    }
    out.push('\n');
}

fn name_width(name: &str) -> usize {
    name.chars().count().max(VALUE_WIDTH)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let keep = max_chars.saturating_sub(1);
        format!("{}…", s.chars().take(keep).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Location;
    use crate::menu::{MealOffer, MenuTable};

    fn dashboard(forecast: Section<Forecast>) -> Dashboard {
        Dashboard {
            date: NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            menus: vec![
                MenuSection {
                    location: Location::new("Mensa 1 TU Braunschweig", "101"),
                    menu: Section::Loaded {
                        data: MenuTable {
                            rows: vec![MealOffer {
                                name: "Pasta".into(),
                                student_price: 3.5,
                            }],
                            skipped: vec![],
                        },
                    },
                },
                MenuSection {
                    location: Location::new("Mensa 360 Grad", "111"),
                    menu: Section::Failed {
                        error: "HTTP status 503".into(),
                    },
                },
            ],
            place: "Braunschweig".into(),
            forecast,
            hourly_focus: vec![],
        }
    }

    #[test]
    fn output_format_is_checked() {
        assert_eq!(OutputFormat::parse("table").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);

        let err = OutputFormat::parse("yaml").unwrap_err().to_string();
        assert!(err.contains("'yaml'"), "{err}");
        assert!(err.contains("table, json"), "{err}");
    }

    #[tokio::test]
    async fn unknown_format_fails_before_loading() {
        let command = PrintCommand {
            format: "csv".into(),
            date: None,
            hours: 24,
        };
        let result = command
            .run(&crate::transport::StaticFetcher::new(), &DashboardConfig::default())
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn text_contains_every_section() {
        let text = render_text(
            &dashboard(Section::Failed {
                error: "no hourly block".into(),
            }),
            24,
        );
        assert!(text.contains("Essenspläne TU Braunschweig (2024-05-13)"));
        assert!(text.contains("Mensa 1 TU Braunschweig"));
        assert!(text.contains("3.50 €"));
        assert!(text.contains("✗ HTTP status 503"));
        assert!(text.contains("Wettervorhersage Braunschweig"));
        assert!(text.contains("✗ no hourly block"));
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(
            parse_date(Some("2024-05-13")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
        );
        assert!(parse_date(Some("13.05.2024")).is_err());
        assert!(parse_date(None).is_ok());
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Spätzle", 10), "Spätzle");
        assert_eq!(truncate("Gemüsepfanne", 6), "Gemüs…");
    }
}
