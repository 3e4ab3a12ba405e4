// ABOUTME: Result table widget — lays out query_results rows as aligned text columns.
// ABOUTME: Columns come from the first row's keys, in the order the server sent them.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::api::ResultRow;
use crate::tui::widgets::sanitize;

/// Widest a single column may grow, in terminal cells.
const MAX_COLUMN_WIDTH: usize = 28;

/// Column headers of a result set: the keys of the first row.
pub fn columns(rows: &[ResultRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Display text for a single cell. Missing keys and nulls render empty.
pub fn cell_text(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    sanitize(&raw).replace('\n', " ")
}

fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    let text_width = UnicodeWidthStr::width(text);
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if text_width > width && used + w + 1 > width {
            out.push('…');
            used += 1;
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Render rows as a header line, a rule, and one line per row.
pub fn result_table_lines(rows: &[ResultRow]) -> Vec<Line<'static>> {
    let headers = columns(rows);
    if headers.is_empty() {
        return Vec::new();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell_text(row.get(h))).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| UnicodeWidthStr::width(r[i].as_str()))
                .chain(std::iter::once(UnicodeWidthStr::width(h.as_str())))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let border = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let mut header_spans = vec![Span::styled("   │", border)];
    for (h, w) in headers.iter().zip(&widths) {
        header_spans.push(Span::styled(format!(" {} ", fit(&sanitize(h), *w)), header_style));
        header_spans.push(Span::styled("│", border));
    }
    lines.push(Line::from(header_spans));

    let rule: String = widths
        .iter()
        .map(|w| "─".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("┼");
    lines.push(Line::from(Span::styled(format!("   ├{}┤", rule), border)));

    for row in &cells {
        let mut spans = vec![Span::styled("   │", border)];
        for (cell, w) in row.iter().zip(&widths) {
            spans.push(Span::raw(format!(" {} ", fit(cell, *w))));
            spans.push(Span::styled("│", border));
        }
        lines.push(Line::from(spans));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<ResultRow> {
        serde_json::from_value(value).unwrap()
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn three_rows_single_column() {
        let rows = rows(json!([{"name": "A"}, {"name": "B"}, {"name": "C"}]));
        let lines = result_table_lines(&rows);
        // header + rule + 3 rows
        assert_eq!(lines.len(), 5);
        assert!(line_text(&lines[0]).contains("name"));
        assert!(line_text(&lines[2]).contains('A'));
        assert!(line_text(&lines[4]).contains('C'));
    }

    #[test]
    fn columns_follow_first_row_order() {
        let rows = rows(json!([
            {"id": 1, "name": "John Doe", "department": "Engineering"},
            {"department": "Sales", "id": 3, "name": "Bob"}
        ]));
        assert_eq!(columns(&rows), ["id", "name", "department"]);
        let text = line_text(&result_table_lines(&rows)[3]);
        let id = text.find('3').unwrap();
        let name = text.find("Bob").unwrap();
        let dept = text.find("Sales").unwrap();
        assert!(id < name && name < dept);
    }

    #[test]
    fn empty_rows_render_nothing() {
        assert!(result_table_lines(&[]).is_empty());
    }

    #[test]
    fn cell_text_formats_values() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(50000))), "50000");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(100);
        let rows = rows(json!([{ "note": long }]));
        let text = line_text(&result_table_lines(&rows)[2]);
        assert!(text.contains('…'));
        assert!(UnicodeWidthStr::width(text.as_str()) < 50);
    }

    #[test]
    fn fit_pads_short_text() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
    }
}
