//! Build surface for one (entity, coordinate) target.

use ratatui::{
    prelude::*,
    style::Stylize,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::{THEME, panel_block};
use crate::app::{BuildFlow, FlowStatus};
use crate::game::{ProductionComponent, RequirementComponent, StructuresData, format_quantity};

pub fn render_build_panel(frame: &mut Frame, area: Rect, flow: &BuildFlow, snapshot: Option<&StructuresData>) {
    let title = format!(" BUILD {} ", flow.target());
    let paragraph = Paragraph::new(build_lines(flow, snapshot))
        .wrap(Wrap { trim: false })
        .block(panel_block(&title));
    frame.render_widget(paragraph, area);
}

pub fn status_line(status: &FlowStatus) -> Option<Line<'static>> {
    match status {
        FlowStatus::Idle => None,
        FlowStatus::Loading(action) => Some(Line::from(Span::styled(
            format!("{action}…"),
            Style::default().fg(THEME.accent_b),
        ))),
        FlowStatus::Success(action) => Some(Line::from(Span::styled(
            format!("{action}: done"),
            Style::default().fg(THEME.ok),
        ))),
        FlowStatus::Error(message) => Some(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(THEME.danger).bold(),
        ))),
    }
}

pub fn production_text(component: &ProductionComponent) -> String {
    match component {
        ProductionComponent::ResourceProduction {
            title,
            value,
            slot_usage,
            ..
        } => format!(
            "{title}: {} (uses {} slots)",
            format_quantity(*value),
            format_quantity(*slot_usage)
        ),
    }
}

pub fn requirement_text(component: &RequirementComponent) -> String {
    match component {
        RequirementComponent::ResourceRequirement { title, value } => {
            format!("{title}: {}", format_quantity(*value))
        }
        RequirementComponent::ResearchRequirement { title } => title.clone(),
    }
}

pub fn build_lines(flow: &BuildFlow, snapshot: Option<&StructuresData>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(status) = status_line(flow.status()) {
        lines.push(status);
        lines.push(Line::default());
    }
    let Some(data) = snapshot else {
        lines.push(Line::from(Span::styled("Loading structures…", Style::default().fg(THEME.muted))));
        return lines;
    };

    let mut row = 0;
    let mut marker = |lines: &mut Vec<Line<'static>>, text: String| {
        let style = if row == flow.selection {
            Style::default().fg(Color::Black).bg(THEME.accent_a).bold()
        } else {
            Style::default().bold()
        };
        lines.push(Line::from(Span::styled(text, style)));
        row += 1;
    };

    section(&mut lines, "Built");
    for built in &data.built_structures {
        marker(&mut lines, format!("{} (lv {})", built.title(), built.level));
        detail(&mut lines, &built.template.description);
        for production in &built.template.production_components {
            detail(&mut lines, &production_text(production));
        }
        requirements(&mut lines, "Upgrade requires", &built.template.requirement_components);
    }

    section(&mut lines, "Available");
    for template in &data.structure_templates {
        marker(&mut lines, template.title.clone());
        detail(&mut lines, &template.description);
        for production in &template.production_components {
            detail(&mut lines, &production_text(production));
        }
        requirements(&mut lines, "Requires", &template.requirement_components);
    }

    if !data.other_templates.is_empty() {
        section(&mut lines, "Unbuildable");
        for (structure_type, reason) in &data.other_templates {
            lines.push(Line::from(Span::styled(
                format!("{structure_type}: {reason}"),
                Style::default().fg(THEME.muted),
            )));
        }
    }
    lines
}

fn section(lines: &mut Vec<Line<'static>>, title: &str) {
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(THEME.accent_b).underlined(),
    )));
}

fn detail(lines: &mut Vec<Line<'static>>, text: &str) {
    if !text.is_empty() {
        lines.push(Line::from(format!("  {text}")));
    }
}

fn requirements(lines: &mut Vec<Line<'static>>, label: &str, components: &[RequirementComponent]) {
    if components.is_empty() {
        return;
    }
    let listed: Vec<String> = components.iter().map(requirement_text).collect();
    lines.push(Line::from(Span::styled(
        format!("  {label}: {}", listed.join(", ")),
        Style::default().fg(THEME.muted),
    )));
}
