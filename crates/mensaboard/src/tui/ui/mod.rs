mod components;
mod menu;
mod weather;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::App;
use components::{colors, header_line};

/// Main render function
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(8),    // Columns
            Constraint::Length(1), // Hints / exit warning
        ])
        .split(area);

    let subtitle = match app.dashboard {
        Some(_) if app.reload_requested => format!("{} · loading…", app.date),
        Some(ref d) if d.failed_sections() > 0 => {
            format!("{} · {} section(s) failed", app.date, d.failed_sections())
        }
        Some(_) => app.date.format("%A, %d.%m.%Y").to_string(),
        None => "loading…".to_string(),
    };
    f.render_widget(
        Paragraph::new(header_line("Mensaboard", &subtitle, area.width as usize)),
        chunks[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    menu::render(f, app, columns[0]);
    weather::render(f, app, columns[1]);
    render_hints(f, app, chunks[2]);
}

fn render_hints(f: &mut Frame, app: &App, area: Rect) {
    if app.exit_warning {
        let warning = Line::from(Span::styled(
            "Press Ctrl+C again to exit",
            Style::default().fg(colors::ERROR),
        ));
        f.render_widget(Paragraph::new(warning), area);
        return;
    }

    let key = |k: &'static str| Span::styled(k, Style::default().fg(colors::PRIMARY));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(colors::DIMMED));
    let hints = Line::from(vec![
        key("tab"),
        text(" menu • "),
        key("↑↓"),
        text(" scroll • "),
        key("←→"),
        text(" day • "),
        key("t"),
        text(" today • "),
        key("r"),
        text(" reload • "),
        key("q"),
        text(" quit"),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}
