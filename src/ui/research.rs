use ratatui::{
    prelude::*,
    style::Stylize,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::{THEME, panel_block};
use crate::game::ResearchForest;
use crate::store::ResearchStore;

pub fn render_research_panel(frame: &mut Frame, area: Rect, research: &ResearchStore) {
    let lines = match (research.forest(), research.error()) {
        (_, Some(err)) => vec![Line::from(Span::styled(err.to_string(), Style::default().fg(THEME.danger)))],
        (Some(forest), None) => research_lines(forest),
        (None, None) => vec![Line::from(Span::styled("Loading research…", Style::default().fg(THEME.muted)))],
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel_block(" RESEARCH ")),
        area,
    );
}

/// Nodes grouped by rank, each with status and prerequisites.
pub fn research_lines(forest: &ResearchForest) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (rank, indices) in forest.layers() {
        lines.push(Line::from(Span::styled(
            format!("Tier {rank}"),
            Style::default().fg(THEME.accent_b).bold(),
        )));
        for index in indices {
            let node = &forest.nodes[index];
            let color = if node.is_unlocked() { THEME.ok } else { THEME.muted };
            let mut spans = vec![
                Span::raw(format!("  {} lv {} ", node.title, node.level)),
                Span::styled(format!("[{}]", node.status), Style::default().fg(color)),
            ];
            let prerequisites: Vec<&str> = forest
                .prerequisites(index)
                .into_iter()
                .map(|node| node.title.as_str())
                .collect();
            if !prerequisites.is_empty() {
                spans.push(Span::styled(
                    format!(" ← {}", prerequisites.join(", ")),
                    Style::default().fg(THEME.muted),
                ));
            }
            lines.push(Line::from(spans));
        }
    }
    lines
}
