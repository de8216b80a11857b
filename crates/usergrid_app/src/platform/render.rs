use chrono::{DateTime, Utc};
use usergrid_core::{CounterViewModel, LoadPhase, StatusViewModel, UsersViewModel};

const SELECTED_MARKER: &str = "*";
const MAX_CELL_WIDTH: usize = 28;

pub struct Frame<'a> {
    pub label: &'a str,
    pub rendered_at: DateTime<Utc>,
    pub status: StatusViewModel,
    pub counter: CounterViewModel,
    pub users: &'a UsersViewModel,
}

pub fn render(frame: &Frame<'_>) -> Vec<String> {
    let users = frame.users;
    let phase_label = match users.phase {
        LoadPhase::Idle => "Idle",
        LoadPhase::Loading => "Loading",
        LoadPhase::Loaded => "Loaded",
        LoadPhase::Failed => "Failed",
    };

    let mut lines = Vec::new();
    lines.push(format!(
        "== {} @ {} ==",
        frame.label,
        frame.rendered_at.to_rfc3339()
    ));
    lines.push(format!(
        "Status: {} | renders {}",
        if frame.status.busy { "Loading..." } else { "Ready" },
        frame.status.renders
    ));
    lines.push(format!(
        "Counter: {}{} | renders {}",
        frame.counter.count,
        if frame.counter.busy { " (busy)" } else { "" },
        frame.counter.renders
    ));
    lines.push(format!(
        "Users: {} | rows {} | attempts {}{}",
        phase_label,
        users.row_count,
        users.attempts,
        if users.local_loading { " | fetching" } else { "" }
    ));

    if let Some(banner) = &users.error {
        let retry = banner
            .retry_label
            .map(|label| format!(" [{label}]"))
            .unwrap_or_default();
        lines.push(format!("Error: {}{}", banner.message, retry));
    }

    if !users.rows.is_empty() {
        lines.extend(render_table(users));
    }

    if !users.selected_names.is_empty() {
        lines.push(format!("Selected: {}", users.selected_names.join(", ")));
    }
    if let Some(name) = &users.last_clicked {
        lines.push(format!("Last clicked: {name}"));
    }
    lines
}

fn render_table(users: &UsersViewModel) -> Vec<String> {
    let mut widths: Vec<usize> = users.headers.iter().map(|h| h.chars().count()).collect();
    for row in &users.rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count().min(MAX_CELL_WIDTH));
        }
    }

    let mut lines = Vec::with_capacity(users.rows.len() + 2);
    let header: Vec<String> = users
        .headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(header, *width))
        .collect();
    lines.push(format!("  {}", header.join(" | ")).trim_end().to_string());
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    lines.push(format!("  {}", rule.join("-+-")));

    for row in &users.rows {
        let marker = if row.selected { SELECTED_MARKER } else { " " };
        let cells: Vec<String> = row
            .cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        lines.push(format!("{marker} {}", cells.join(" | ")).trim_end().to_string());
    }
    lines
}

fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}
