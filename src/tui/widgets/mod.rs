// ABOUTME: TUI widget sub-modules for chat, result tables, approvals, summary, and status bar.
// ABOUTME: Each widget is a pure function from view state to styled ratatui Lines.

pub mod approval;
pub mod chat;
pub mod pending;
pub mod results;
pub mod status;
pub mod summary;

/// Replace control characters so server text cannot move the cursor or restyle the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() && c != '\n' => '\u{fffd}',
            c => c,
        })
        .collect()
}
