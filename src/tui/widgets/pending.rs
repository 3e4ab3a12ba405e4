// ABOUTME: Pending approvals widget — the Approvals view list with inline actions.
// ABOUTME: Entries are drawn in server order; an empty list shows the all-clear state.

use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::state::{ApprovalState, PendingList};
use crate::tui::widgets::approval::approval_controls;
use crate::tui::widgets::sanitize;

pub const EMPTY_TITLE: &str = "No Pending Approvals";
pub const EMPTY_HINT: &str = "All operations have been processed.";

/// Render the Approvals view body.
pub fn pending_lines(
    pending: &PendingList,
    selected: usize,
    approvals: &HashMap<String, ApprovalState>,
) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);

    let list = match pending {
        PendingList::NotLoaded => return vec![],
        PendingList::Loading => {
            return vec![Line::from(Span::styled("⠋ Loading approvals...", dim))];
        }
        PendingList::Failed(err) => {
            return vec![Line::from(Span::styled(
                format!("⚠ Error loading approvals: {}", sanitize(err)),
                Style::default().fg(Color::Red),
            ))];
        }
        PendingList::Loaded(list) => list,
    };

    if list.is_empty() {
        return vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("✔ {EMPTY_TITLE}"),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(EMPTY_HINT, dim)),
        ];
    }

    let mut lines = Vec::new();
    for (i, entry) in list.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        let marker = if i == selected { "▶ " } else { "  " };
        let title_style = if i == selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{} Operation", sanitize(&entry.operation).to_uppercase()),
                title_style,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("   Query: ", dim),
            Span::raw(sanitize(&entry.query)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   Request ID: {}", sanitize(&entry.request_id)),
            dim,
        )));
        let state = approvals
            .get(&entry.request_id)
            .copied()
            .unwrap_or(ApprovalState::Pending);
        lines.push(approval_controls(state));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑/↓ select · a approve · r reject · F5 reload",
        dim,
    )));
    lines
}
