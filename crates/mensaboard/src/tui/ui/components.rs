use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

/// Color palette
pub mod colors {
    use ratatui::style::Color;

    pub const PRIMARY: Color = Color::Rgb(78, 205, 196); // #4ECDC4
    pub const ACCENT: Color = Color::Rgb(46, 160, 67); // #2EA043, section dividers
    pub const WARNING: Color = Color::Rgb(255, 217, 61); // #FFD93D
    pub const ERROR: Color = Color::Rgb(255, 107, 107); // #FF6B6B
    pub const DIMMED: Color = Color::Rgb(136, 136, 136); // #888
    pub const TEXT: Color = Color::Rgb(204, 204, 204); // #CCC
    pub const BORDER: Color = Color::Rgb(68, 68, 68); // #444

    /// Line colors, assigned to chart series in declaration order
    pub const SERIES: [Color; 6] = [
        Color::Rgb(255, 107, 107), // red
        Color::Rgb(107, 181, 255), // blue
        Color::Rgb(78, 205, 196),  // teal
        Color::Rgb(255, 217, 61),  // yellow
        Color::Rgb(199, 146, 234), // violet
        Color::Rgb(255, 159, 67),  // orange
    ];

    pub fn series(index: usize) -> Color {
        SERIES[index % SERIES.len()]
    }
}

/// Top line: `╭─── title subtitle ──────╮`
pub fn header_line(title: &str, subtitle: &str, width: usize) -> Line<'static> {
    let title_part = format!("─── {} ", title);
    let subtitle_part = format!("{} ", subtitle);
    let used = title_part.chars().count() + subtitle_part.chars().count() + 2;
    let remaining = width.saturating_sub(used);

    Line::from(vec![
        Span::styled("╭", Style::default().fg(colors::PRIMARY)),
        Span::styled(title_part, Style::default().fg(colors::PRIMARY)),
        Span::styled(subtitle_part, Style::default().fg(colors::DIMMED)),
        Span::styled("─".repeat(remaining), Style::default().fg(colors::PRIMARY)),
        Span::styled("╮", Style::default().fg(colors::PRIMARY)),
    ])
}

/// Bold section title with a divider underneath
pub fn section_title(title: &str, width: u16) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(colors::TEXT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "─".repeat(width as usize),
            Style::default().fg(colors::ACCENT),
        )),
    ]
}

/// Bordered block, highlighted when focused
pub fn panel(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { colors::PRIMARY } else { colors::BORDER };
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

/// Error panel shown in place of a section that failed to load
pub fn error_panel(title: &str, error: &str) -> Paragraph<'static> {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::ERROR)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::ERROR));

    Paragraph::new(vec![
        Line::from(Span::styled("✗ failed to load", Style::default().fg(colors::ERROR))),
        Line::from(Span::styled(error.to_string(), Style::default().fg(colors::TEXT))),
    ])
    .wrap(Wrap { trim: true })
    .block(block)
}
