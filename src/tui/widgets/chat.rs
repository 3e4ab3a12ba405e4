// ABOUTME: Chat widget — renders the transcript into styled ratatui Lines.
// ABOUTME: Bot replies carry an operation badge, an optional result table, and approval controls.

use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::{Map, Value};

use crate::api::OperationKind;
use crate::tui::state::{ApprovalState, ChatMessage, ChatMessageKind};
use crate::tui::widgets::approval::approval_controls;
use crate::tui::widgets::results::{cell_text, result_table_lines};
use crate::tui::widgets::sanitize;

/// Badge color for an operation kind.
pub fn badge_color(kind: &OperationKind) -> Color {
    match kind {
        OperationKind::Read => Color::Green,
        OperationKind::Create => Color::Blue,
        OperationKind::Update => Color::Yellow,
        OperationKind::Delete => Color::Red,
        OperationKind::Other(_) => Color::Gray,
    }
}

fn badge(label: String, bg: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", label),
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render a slice of chat messages into styled Lines for display.
pub fn render_chat_lines(
    messages: &[ChatMessage],
    approvals: &HashMap<String, ApprovalState>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        let content = sanitize(&msg.content);

        match &msg.kind {
            ChatMessageKind::User => {
                let prefix = Span::styled(
                    "❯ ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                );
                push_prefixed(&mut lines, prefix, &content, Style::default());
            }
            ChatMessageKind::Bot {
                operation,
                requires_approval,
                rows,
                proposed_changes,
                ..
            } => {
                let mut badges = Vec::new();
                if let Some(op) = operation {
                    badges.push(badge(op.label(), badge_color(op)));
                }
                if *requires_approval {
                    if !badges.is_empty() {
                        badges.push(Span::raw(" "));
                    }
                    badges.push(badge("⏱ Approval Required".to_string(), Color::Yellow));
                }
                if !badges.is_empty() {
                    badges.insert(0, Span::raw("  "));
                    lines.push(Line::from(badges));
                }

                let prefix = Span::styled(
                    "⏺ ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
                push_prefixed(&mut lines, prefix, &content, Style::default());

                if let Some(changes) = proposed_changes {
                    lines.extend(proposed_change_lines(changes));
                }

                if !rows.is_empty() {
                    lines.extend(result_table_lines(rows));
                }

                if let Some(id) = msg.approval_request_id() {
                    let state = approvals
                        .get(id)
                        .copied()
                        .unwrap_or(ApprovalState::Pending);
                    lines.push(approval_controls(state));
                }
            }
            ChatMessageKind::Pending => {
                lines.push(Line::from(vec![
                    Span::styled("⠋ ", Style::default().fg(Color::Cyan)),
                    Span::styled(content, Style::default().fg(Color::DarkGray)),
                ]));
            }
            ChatMessageKind::Error => {
                let prefix = Span::styled(
                    "⚠ ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                );
                push_prefixed(&mut lines, prefix, &content, Style::default().fg(Color::Red));
            }
            ChatMessageKind::System => {
                lines.push(Line::from(Span::styled(
                    format!("[system] {}", content),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines
}

/// First line gets the prefix, continuation lines are indented to match.
fn push_prefixed(lines: &mut Vec<Line<'static>>, prefix: Span<'static>, text: &str, style: Style) {
    for (i, part) in text.split('\n').enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                prefix.clone(),
                Span::styled(part.to_string(), style),
            ]));
        } else {
            lines.push(Line::from(Span::styled(format!("  {}", part), style)));
        }
    }
}

fn proposed_change_lines(changes: &Map<String, Value>) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    changes
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("   {}: ", sanitize(key)), dim),
                Span::raw(cell_text(Some(value))),
            ])
        })
        .collect()
}
