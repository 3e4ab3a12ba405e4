// ABOUTME: Summary panel widget — user and project totals with category breakdowns.
// ABOUTME: Shown beside the chat on the Home view.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::summary::{Breakdown, DataSummary};
use crate::tui::widgets::sanitize;

fn breakdown_lines(label: &str, breakdown: &Breakdown) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{label}:"),
        Style::default().fg(Color::DarkGray),
    ))];
    for (key, count) in breakdown.entries() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!(" {}: {} ", sanitize(key), count),
                Style::default().fg(Color::Black).bg(Color::Gray),
            ),
        ]));
    }
    lines
}

fn total_line(label: &str, total: usize) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(
            total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Render the summary panel body. `None` means nothing has loaded yet.
pub fn summary_lines(summary: Option<&DataSummary>) -> Vec<Line<'static>> {
    let Some(summary) = summary else {
        return vec![Line::from(Span::styled(
            "Loading summary...",
            Style::default().fg(Color::DarkGray),
        ))];
    };

    let mut lines = vec![total_line("Total Users", summary.users_total)];
    lines.extend(breakdown_lines("Departments", &summary.departments));
    lines.push(Line::from(""));
    lines.push(total_line("Total Projects", summary.projects_total));
    lines.extend(breakdown_lines("Status", &summary.statuses));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("updated {}", summary.fetched_at.format("%H:%M:%S")),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}
