// ABOUTME: Main TUI rendering function — assembles header, body, prompt, input, and status bar.
// ABOUTME: The body depends on the active view: chat with summary, chat alone, or the pending list.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::controller::ViewController;
use crate::tui::state::View;
use crate::tui::widgets::approval::approval_line;
use crate::tui::widgets::chat::render_chat_lines;
use crate::tui::widgets::pending::pending_lines;
use crate::tui::widgets::status::{StatusBarParams, status_line};
use crate::tui::widgets::summary::summary_lines;

/// Maximum height the input area can grow to (in terminal rows).
const MAX_INPUT_HEIGHT: u16 = 8;
/// Width of the summary panel on the Home view.
const SUMMARY_WIDTH: u16 = 32;

/// Render the full TUI screen layout to the given frame.
pub fn render(frame: &mut Frame, ctrl: &mut ViewController) {
    let area = frame.area();

    let has_input = ctrl.view != View::Approvals;
    let has_prompt = has_input && ctrl.focus.is_some();

    // +2 accounts for top and bottom borders
    let input_height = if has_prompt {
        3
    } else {
        (ctrl.input.line_count() as u16 + 2).clamp(3, MAX_INPUT_HEIGHT)
    };

    let mut constraints = vec![Constraint::Length(1), Constraint::Min(3)];
    if has_prompt {
        constraints.push(Constraint::Length(3));
    }
    if has_input {
        constraints.push(Constraint::Length(input_height));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(Paragraph::new(header_line(ctrl.view)), chunks[0]);

    match ctrl.view {
        View::Home => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(20), Constraint::Length(SUMMARY_WIDTH)])
                .split(chunks[1]);
            render_chat(frame, ctrl, columns[0]);
            let panel = Paragraph::new(summary_lines(ctrl.summary.as_ref()))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::LEFT)
                        .border_style(Style::default().fg(Color::DarkGray))
                        .title(" Data Summary "),
                );
            frame.render_widget(panel, columns[1]);
        }
        View::Chat => render_chat(frame, ctrl, chunks[1]),
        View::Approvals => {
            let list = Paragraph::new(pending_lines(
                &ctrl.pending,
                ctrl.pending_selected,
                &ctrl.approvals,
            ))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Pending Approvals "),
            );
            frame.render_widget(list, chunks[1]);
        }
    }

    let mut next = 2;
    if has_prompt {
        if let Some(focus) = &ctrl.focus {
            let prompt = Paragraph::new(approval_line(&focus.description, focus.selected));
            frame.render_widget(prompt, chunks[next]);
        }
        next += 1;
    }
    if has_input {
        render_input(frame, ctrl, chunks[next], has_prompt);
        next += 1;
    }

    let status = status_line(&StatusBarParams {
        server_url: &ctrl.server_url,
        health: &ctrl.health,
        badge: ctrl.badge,
        in_flight: ctrl.transcript.pending_count(),
        session_start: ctrl.session_start,
    });
    frame.render_widget(Paragraph::new(status), chunks[next]);
}

fn header_line(active: View) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " minibot ",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    for view in [View::Home, View::Chat, View::Approvals] {
        let style = if view == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }
    spans.push(Span::styled(
        "  Tab: switch view",
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

fn render_chat(frame: &mut Frame, ctrl: &mut ViewController, area: Rect) {
    let chat_paragraph = Paragraph::new(render_chat_lines(
        ctrl.transcript.messages(),
        &ctrl.approvals,
    ))
    .wrap(Wrap { trim: false });

    // Use ratatui's own line_count() so the scroll math matches its wrapping.
    let total_lines = chat_paragraph.line_count(area.width) as u16;
    let max_scroll = total_lines.saturating_sub(area.height);
    if ctrl.scroll_offset > max_scroll {
        ctrl.scroll_offset = max_scroll;
    }

    // scroll_offset is lines scrolled up from the bottom (0 = at bottom)
    let scroll = max_scroll.saturating_sub(ctrl.scroll_offset);
    frame.render_widget(chat_paragraph.scroll((scroll, 0)), area);
}

fn render_input(frame: &mut Frame, ctrl: &mut ViewController, area: Rect, has_prompt: bool) {
    let border_style = if has_prompt {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(border_style);

    let in_flight = ctrl.transcript.pending_count();
    if in_flight > 0 {
        block = block.title(Span::styled(
            " waiting for response... ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let (text, style) = if has_prompt {
        (
            "(approve or reject the request above)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (ctrl.input.text.clone(), Style::default())
    };
    frame.render_widget(Paragraph::new(text).style(style).block(block), area);

    if !has_prompt && area.width > 0 && area.height > 1 {
        ctrl.input.clamp_cursor();
        let (line, tail) = ctrl.input.before_cursor_on_line();
        let visual_col = UnicodeWidthStr::width(tail.as_str()).min(area.width.saturating_sub(1) as usize);
        let x = area.x.saturating_add(visual_col as u16);
        // +1 for the top border
        let y = area.y.saturating_add(1 + line as u16);
        frame.set_cursor_position(Position::new(x, y));
    }
}
