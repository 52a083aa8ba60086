//! Resource bar: the global snapshot projected to the current tick.

use ratatui::{
    prelude::*,
    style::Stylize,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{THEME, heat_bar, panel_block};
use crate::app::App;
use crate::game::{
    ResourceDescriptor, ResourceType, ResourcesData, format_capacity, format_change, format_number,
    title_case,
};

const GAUGE_WIDTH: usize = 12;

pub fn render_resource_panel(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.state.resources.is_refreshing() {
        " RESOURCES ⟳ "
    } else {
        " RESOURCES "
    };
    let lines = resource_lines(app.projected_resources().unwrap_or_default());
    frame.render_widget(Paragraph::new(lines).block(panel_block(title)), area);
}

/// `"{amount} ({change}) / {capacity}"`.
pub fn resource_entry(descriptor: &ResourceDescriptor) -> String {
    format!(
        "{} ({}) / {}",
        format_number(descriptor.amount),
        format_change(descriptor.change),
        format_capacity(descriptor.capacity)
    )
}

pub fn resource_lines(data: ResourcesData) -> Vec<Line<'static>> {
    data.iter()
        .map(|(kind, descriptor)| {
            let gauge = match descriptor.capacity {
                Some(capacity) => heat_bar(descriptor.amount, capacity, GAUGE_WIDTH),
                None => " ".repeat(GAUGE_WIDTH),
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<11}", title_case(kind.key())),
                    Style::default().fg(color_for(kind)).bold(),
                ),
                Span::styled(gauge, Style::default().fg(color_for(kind))),
                Span::raw(" "),
                Span::styled(resource_entry(descriptor), change_style(descriptor.change)),
            ])
        })
        .collect()
}

fn color_for(kind: ResourceType) -> Color {
    match kind {
        ResourceType::Energy => Color::Yellow,
        ResourceType::Minerals => Color::LightRed,
        ResourceType::Alloys => Color::Magenta,
        ResourceType::Antimatter => Color::LightMagenta,
        ResourceType::Research => Color::LightBlue,
        ResourceType::Authority => Color::LightGreen,
    }
}

fn change_style(change: f64) -> Style {
    if change < 0.0 {
        Style::default().fg(THEME.danger)
    } else {
        Style::default().fg(Color::White)
    }
}
