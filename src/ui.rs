use ratatui::{
    prelude::*,
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

pub mod build;
pub mod dump;
pub mod research;
pub mod resources;
pub mod tree;

use crate::app::{App, Panel};

pub struct Theme {
    pub accent_a: Color,
    pub accent_b: Color,
    pub border: Color,
    pub muted: Color,
    pub danger: Color,
    pub ok: Color,
}

pub const THEME: Theme = Theme {
    accent_a: Color::LightCyan,
    accent_b: Color::LightYellow,
    border: Color::DarkGray,
    muted: Color::Gray,
    danger: Color::LightRed,
    ok: Color::LightGreen,
};

pub fn render(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, main_layout[0], app);
    resources::render_resource_panel(frame, main_layout[1], app);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[2]);

    render_tree_panel(frame, content_layout[0], app);
    match app.panel() {
        Panel::Tree => render_help_panel(frame, content_layout[1]),
        Panel::Build(flow) => build::render_build_panel(frame, content_layout[1], flow, app.build_snapshot()),
        Panel::Research => research::render_research_panel(frame, content_layout[1], &app.state.research),
    }

    frame.render_widget(
        Paragraph::new(hotkeys(app.panel())).style(Style::default().fg(THEME.muted)),
        main_layout[3],
    );
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let ledger = &app.state.time_warp;
    let mut spans = vec![
        Span::styled(" SPACE EMPIRE ", Style::default().bold()),
        Span::raw(" | "),
        Span::styled(
            format!("Sector {}", app.coordinate()),
            Style::default().fg(THEME.accent_a),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Warped {}h", ledger.total_seconds() / 3600),
            Style::default().fg(THEME.accent_b),
        ),
    ];
    if let Some(err) = ledger.last_error() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Warp failed: {err}"),
            Style::default().fg(THEME.danger),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::new().borders(Borders::TOP | Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_tree_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel_block(" SYSTEM ");
    let lines = match (app.tree(), app.state.entity.error()) {
        (_, Some(err)) => vec![Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(THEME.danger),
        ))],
        (Some(view), None) => {
            let selected = matches!(app.panel(), Panel::Tree).then_some(app.selection());
            view.styled_lines(selected)
        }
        (None, None) => vec![Line::from(Span::styled(
            "Scanning sector…",
            Style::default().fg(THEME.muted),
        ))],
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_panel(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Arrows move between sectors."),
        Line::from("j/k pick an entity marked [build], Enter opens it."),
        Line::from("Structures load for each entity when first shown."),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel_block(" COMMAND ")),
        area,
    );
}

pub(crate) fn panel_block(title: &str) -> Block<'_> {
    Block::bordered()
        .title(title)
        .title_style(Style::default().fg(THEME.accent_a).bold())
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.border))
}

fn hotkeys(panel: &Panel) -> &'static str {
    match panel {
        Panel::Tree => " ←↑↓→ move  j/k select  Enter build  r research  w warp  R refresh  q quit",
        Panel::Build(_) => " ↑↓ select  Enter build/upgrade  u upgrade  x destroy  Esc back  q quit",
        Panel::Research => " Esc back  q quit",
    }
}

/// `█░` gauge of `value` against `max`, `width` cells wide.
pub fn heat_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    let mut bar = "█".repeat(filled.min(width));
    bar.push_str(&"░".repeat(width.saturating_sub(filled)));
    bar
}
