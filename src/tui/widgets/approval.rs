// ABOUTME: Approval prompt widget — inline prompt for a staged backend operation.
// ABOUTME: Shows the request description and two selectable options: Approve, Reject.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::state::{ApprovalState, Decision};
use crate::tui::widgets::sanitize;

/// The options presented to the user, in selection order.
pub const APPROVAL_OPTIONS: &[&str] = &["Approve", "Reject"];

/// Map a selection index to a decision.
pub fn decision_for(selected: usize) -> Decision {
    if selected == 0 {
        Decision::Approve
    } else {
        Decision::Reject
    }
}

/// Render the approval prompt as two Lines: description + selectable options.
pub fn approval_line(description: &str, selected: usize) -> Vec<Line<'static>> {
    let header = Line::from(vec![
        Span::styled(
            "APPROVE? ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(sanitize(description), Style::default().fg(Color::White)),
    ]);

    let mut option_spans = Vec::new();
    for (i, option) in APPROVAL_OPTIONS.iter().enumerate() {
        if i > 0 {
            option_spans.push(Span::raw("  "));
        }

        let label = format!(" [{}] {} ", i + 1, option);
        if i == selected {
            option_spans.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            option_spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
        }
    }
    option_spans.push(Span::styled(
        "   Esc: later",
        Style::default().fg(Color::DarkGray),
    ));

    vec![header, Line::from(option_spans)]
}

/// Inline controls attached to an approval-bearing chat message or pending entry.
pub fn approval_controls(state: ApprovalState) -> Line<'static> {
    match state {
        ApprovalState::Pending => Line::from(vec![
            Span::raw("   "),
            Span::styled(
                "[✔ Approve]",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                "[✖ Reject]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        ApprovalState::Submitting(decision) => {
            let verb = if decision.approved() { "approving" } else { "rejecting" };
            Line::from(Span::styled(
                format!("   … {verb}"),
                Style::default().fg(Color::DarkGray),
            ))
        }
        ApprovalState::Approved => Line::from(Span::styled(
            "   ✔ approved",
            Style::default().fg(Color::Green),
        )),
        ApprovalState::Rejected => Line::from(Span::styled(
            "   ✖ rejected",
            Style::default().fg(Color::Red),
        )),
    }
}
