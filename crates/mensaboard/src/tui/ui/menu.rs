use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Row, Table},
    Frame,
};

use super::components::{colors, error_panel, panel, section_title};
use crate::dashboard::{MenuSection, Section};
use crate::menu::{format_price, MenuTable};
use crate::tui::app::App;

const PRICE_WIDTH: u16 = 9;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    f.render_widget(
        Paragraph::new(section_title("Essenspläne TU Braunschweig", area.width)),
        chunks[0],
    );

    let Some(dashboard) = &app.dashboard else {
        f.render_widget(
            Paragraph::new(Span::styled("Loading menus…", Style::default().fg(colors::DIMMED))),
            chunks[1],
        );
        return;
    };

    if dashboard.menus.is_empty() {
        return;
    }

    let n = dashboard.menus.len() as u32;
    let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(chunks[1]);

    for (i, (section, panel_area)) in dashboard.menus.iter().zip(panels.iter()).enumerate() {
        let scroll = app.menu_scroll.get(i).copied().unwrap_or(0);
        render_section(f, section, *panel_area, i == app.focused_menu, scroll);
    }
}

fn render_section(
    f: &mut Frame,
    section: &MenuSection,
    area: Rect,
    focused: bool,
    scroll: usize,
) {
    match &section.menu {
        Section::Failed { error } => {
            f.render_widget(error_panel(&section.location.label, error), area);
        }
        Section::Loaded { data } => {
            render_table(f, &section.location.label, data, area, focused, scroll)
        }
    }
}

fn render_table(
    f: &mut Frame,
    title: &str,
    table: &MenuTable,
    area: Rect,
    focused: bool,
    scroll: usize,
) {
    let block = panel(title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if table.is_empty() {
        let text = if table.skipped.is_empty() {
            "No offers today.".to_string()
        } else {
            format!("No usable offers ({} skipped).", table.skipped.len())
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(text, Style::default().fg(colors::DIMMED)))),
            inner,
        );
        return;
    }

    let header_style = Style::default()
        .fg(colors::PRIMARY)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Line::from(Span::styled("Name", header_style)),
        Line::from(Span::styled("Price", header_style)).right_aligned(),
    ])
    .height(1);

    let mut rows: Vec<Row> = table
        .rows
        .iter()
        .skip(scroll)
        .map(|offer| {
            Row::new(vec![
                Line::from(Span::styled(
                    offer.name.clone(),
                    Style::default().fg(colors::TEXT),
                )),
                Line::from(Span::styled(
                    format_price(offer.student_price),
                    Style::default().fg(colors::TEXT),
                ))
                .right_aligned(),
            ])
        })
        .collect();

    if !table.skipped.is_empty() {
        rows.push(Row::new(vec![Line::from(Span::styled(
            format!("{} offer(s) without name or student price", table.skipped.len()),
            Style::default().fg(colors::WARNING),
        ))]));
    }

    let widths = [Constraint::Min(10), Constraint::Length(PRICE_WIDTH)];
    let widget = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(widget, inner);
}
