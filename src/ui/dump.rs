//! Plain-text rendering for `--dump`.

use colored::{Color, Colorize};

use crate::game::{ResourcesData, title_case};
use crate::ui::resources::resource_entry;
use crate::ui::tree::{TreeLineKind, TreeView};

fn badge(label: &str, color: Color) -> String {
    format!("[{}]", label).color(color).to_string()
}

pub fn dump_tree(view: &TreeView) -> String {
    let mut out = format!("{} {}\n", badge("SECTOR", Color::BrightCyan), view.coordinate);
    for line in &view.lines {
        let indent = "  ".repeat(line.depth);
        let text = line.text();
        let rendered = match &line.kind {
            TreeLineKind::Entity { build, .. } => {
                let mut entity = text.bold().to_string();
                if build.is_some() {
                    entity.push(' ');
                    entity.push_str(&badge("build", Color::BrightGreen));
                }
                entity
            }
            TreeLineKind::Resource { .. } => text.cyan().to_string(),
            TreeLineKind::Group { .. } => text.yellow().to_string(),
            TreeLineKind::Slot { .. } | TreeLineKind::Pool { .. } => text.magenta().to_string(),
            TreeLineKind::Structure { .. } => text.dimmed().to_string(),
        };
        out.push_str(&indent);
        out.push_str(&rendered);
        out.push('\n');
    }
    out
}

pub fn dump_resources(data: &ResourcesData) -> String {
    let mut out = String::new();
    for (kind, descriptor) in data.iter() {
        out.push_str(&format!(
            "{} {}\n",
            badge(&title_case(kind.key()), Color::BrightYellow),
            resource_entry(descriptor)
        ));
    }
    out
}
