// ABOUTME: Status bar widget — server, health, pending approval badge, and session time.
// ABOUTME: Displayed at the bottom of the TUI as a single-line summary.

use std::time::{Duration, Instant};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::controller::Health;

/// Inputs for the status bar.
pub struct StatusBarParams<'a> {
    pub server_url: &'a str,
    pub health: &'a Health,
    pub badge: usize,
    pub in_flight: usize,
    pub session_start: Instant,
}

/// Badge text for the pending approval count; `None` hides the badge.
pub fn approval_badge_text(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 Approval Required".to_string()),
        n => Some(format!("{n} Approvals Required")),
    }
}

/// Format a session duration as `Xm YYs` or `Xh YYm`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let (health_text, health_color) = match params.health {
        Health::Unknown => ("● connecting".to_string(), Color::DarkGray),
        Health::Online(status) if status.is_healthy() => (
            format!(
                "● online ({} users, {} projects)",
                status.users_count, status.projects_count
            ),
            Color::Green,
        ),
        Health::Online(status) => (format!("● {}", status.status), Color::Yellow),
        Health::Offline => ("● offline".to_string(), Color::Red),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", params.server_url), Style::default().fg(Color::Cyan)),
        Span::styled("| ", dim),
        Span::styled(format!("{health_text} "), Style::default().fg(health_color)),
    ];

    if let Some(badge) = approval_badge_text(params.badge) {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            format!(" {badge} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }

    if params.in_flight > 0 {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            "thinking... ",
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::styled("| ", dim));
    spans.push(Span::styled(
        format!("{} ", format_elapsed(params.session_start.elapsed())),
        dim,
    ));

    Line::from(spans)
}
