use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use super::components::{colors, error_panel, panel, section_title};
use crate::dashboard::Section;
use crate::tui::app::App;
use crate::weather::axis::format_timestamp;
use crate::weather::table::value_bounds;
use crate::weather::{partition, Forecast, TimeSeriesVariable, TimeTable};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let place = app
        .dashboard
        .as_ref()
        .map(|d| d.place.as_str())
        .unwrap_or(&app.config.weather.place);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    f.render_widget(
        Paragraph::new(section_title(&format!("Wettervorhersage {}", place), area.width)),
        chunks[0],
    );

    match app.dashboard.as_ref().map(|d| (&d.forecast, &d.hourly_focus)) {
        None => f.render_widget(
            Paragraph::new(Span::styled(
                "Loading forecast…",
                Style::default().fg(colors::DIMMED),
            )),
            chunks[1],
        ),
        Some((Section::Failed { error }, _)) => {
            f.render_widget(error_panel("Forecast", error), chunks[1]);
        }
        Some((Section::Loaded { data }, focus)) => render_forecast(f, data, focus, chunks[1]),
    }
}

fn render_forecast(f: &mut Frame, forecast: &Forecast, focus: &[String], area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let groups = partition(&forecast.hourly, focus);
    render_chart(f, "Stündlich", &forecast.hourly, &groups.shared, rows[0]);
    render_chart(
        f,
        &format!("Stündlich · {}", focus.join(", ")),
        &forecast.hourly,
        &groups.focus,
        rows[1],
    );

    let daily: Vec<&TimeSeriesVariable> = forecast.daily.variables.iter().collect();
    render_chart(f, "Täglich", &forecast.daily, &daily, rows[2]);
}

/// One layered line chart: every series on a shared, auto-scaled y axis.
fn render_chart(
    f: &mut Frame,
    title: &str,
    table: &TimeTable,
    series: &[&TimeSeriesVariable],
    area: Rect,
) {
    let block = panel(title, false);

    let (Some(first), Some(last)) = (table.timestamps.first(), table.timestamps.last()) else {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(Span::styled("No data.", Style::default().fg(colors::DIMMED))),
            inner,
        );
        return;
    };
    if series.is_empty() {
        f.render_widget(block, area);
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = series.iter().map(|v| table.points(v)).collect();
    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (variable, data))| {
            Dataset::default()
                .name(variable.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors::series(i)))
                .data(data)
        })
        .collect();

    let (lo, hi) = value_bounds(series.iter().copied()).unwrap_or((0.0, 1.0));
    let (lo, hi) = padded(lo, hi);

    let mid = first + (last - first) / 2;
    let x_labels = vec![
        Span::raw(format_timestamp(*first, table.granularity)),
        Span::raw(format_timestamp(mid, table.granularity)),
        Span::raw(format_timestamp(*last, table.granularity)),
    ];
    let label_style = Style::default().fg(colors::DIMMED);
    let y_labels = vec![
        Span::styled(format!("{:.1}", lo), label_style),
        Span::styled(format!("{:.1}", (lo + hi) / 2.0), label_style),
        Span::styled(format!("{:.1}", hi), label_style),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(label_style)
                .bounds([*first as f64, (*last).max(*first + 1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(label_style)
                .bounds([lo, hi])
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)))
        .style(Style::default().fg(colors::TEXT));
    f.render_widget(chart, area);
}

/// Widen flat ranges so a constant series still gets a visible line.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_widens_ranges() {
        assert_eq!(padded(2.0, 2.0), (1.0, 3.0));
        let (lo, hi) = padded(0.0, 10.0);
        assert!(lo < 0.0 && hi > 10.0);
    }
}
