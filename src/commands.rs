// ABOUTME: One-shot CLI subcommands — query, list, decide, and summarize without the TUI.
// ABOUTME: Output is plain text built from the same line renderers the TUI uses.

use std::io::Write;

use clap::Subcommand;
use ratatui::text::Line;

use crate::api::{Backend, BotResponse};
use crate::summary;
use crate::tui::widgets::pending::{EMPTY_HINT, EMPTY_TITLE};
use crate::tui::widgets::results::{cell_text, result_table_lines};
use crate::tui::widgets::summary::summary_lines;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a natural-language query and print the reply
    Query {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List requests awaiting approval
    Pending,
    /// Approve (or reject) a staged request
    Approve {
        request_id: String,
        /// Reject instead of approve
        #[arg(long)]
        reject: bool,
    },
    /// Print user and project totals with their breakdowns
    Summary,
    /// Check that the backend is reachable
    Health,
}

/// Run one subcommand against `backend`, writing its output to `out`.
pub async fn run(command: Command, backend: &dyn Backend, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::Query { text } => {
            let query = text.join(" ");
            if query.trim().is_empty() {
                anyhow::bail!("query is empty");
            }
            let response = backend.query(query.trim()).await?;
            write_response(&response, out)?;
        }
        Command::Pending => {
            let pending = backend.pending_approvals().await?;
            if pending.is_empty() {
                writeln!(out, "{EMPTY_TITLE}")?;
                writeln!(out, "{EMPTY_HINT}")?;
            }
            for entry in pending.iter() {
                writeln!(
                    out,
                    "{}  {}  {}",
                    entry.request_id,
                    entry.operation.to_uppercase(),
                    entry.query
                )?;
            }
        }
        Command::Approve { request_id, reject } => {
            let result = backend.approve(&request_id, !reject).await?;
            writeln!(out, "{}", result.message)?;
        }
        Command::Summary => {
            let summary = summary::fetch_summary(backend).await?;
            for line in summary_lines(Some(&summary)) {
                writeln!(out, "{}", plain(&line))?;
            }
        }
        Command::Health => {
            let health = backend.health().await?;
            writeln!(
                out,
                "{} ({}): {} users, {} projects",
                health.status, health.service, health.users_count, health.projects_count
            )?;
            if !health.is_healthy() {
                anyhow::bail!("backend reported status {}", health.status);
            }
        }
    }
    Ok(())
}

fn write_response(response: &BotResponse, out: &mut dyn Write) -> anyhow::Result<()> {
    if let Some(op) = &response.operation {
        writeln!(out, "[{}]", op.label())?;
    }
    writeln!(out, "{}", response.response)?;

    if let Some(changes) = &response.proposed_changes {
        for (key, value) in changes {
            writeln!(out, "  {key}: {}", cell_text(Some(value)))?;
        }
    }
    for line in result_table_lines(&response.rows) {
        writeln!(out, "{}", plain(&line))?;
    }

    if response.requires_approval {
        match &response.request_id {
            Some(id) => writeln!(
                out,
                "Approval required. Run `minibot approve {id}` or `minibot approve {id} --reject`."
            )?,
            None => writeln!(out, "Approval required, but no request id was returned.")?,
        }
    }
    Ok(())
}

/// Flatten a styled line into its text, trimming the padding used for alignment.
fn plain(line: &Line) -> String {
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    text.trim_end().to_string()
}
