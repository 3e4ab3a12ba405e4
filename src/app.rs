// ABOUTME: App orchestrator — wires the HTTP backend, view controller, and terminal together.
// ABOUTME: Owns the terminal loop: draw, wait for one event, apply it, repeat.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
    EventStream, KeyEventKind, MouseEventKind,
};
use crossterm::execute;
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::api::HttpBackend;
use crate::config::Config;
use crate::tui::controller::ViewController;
use crate::tui::events::ViewEvent;
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{ApprovalState, View};
use crate::tui::subscriptions::{UiEvent, ui_events};
use crate::tui::ui;
use crate::tui::widgets::status::format_elapsed;

const MOUSE_SCROLL_STEP: u16 = 3;
/// Redraw interval so the session clock keeps moving while idle.
const TICK: Duration = Duration::from_secs(1);

/// Top-level interactive application.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the backend and controller, then drive the TUI until the user quits.
    pub async fn run(self) -> anyhow::Result<()> {
        let server = &self.config.server;
        let backend = HttpBackend::new(&server.base_url, &server.user_id, server.timeout())?;
        tracing::info!(
            base_url = backend.base_url(),
            user_id = backend.user_id(),
            "starting interactive session"
        );

        let (view_tx, view_rx) = mpsc::channel::<ViewEvent>(64);
        let mut ctrl = ViewController::new(Arc::new(backend), view_tx, server.base_url.clone());
        ctrl.start(self.config.ui.start_view, self.config.ui.greeting);

        let mut terminal = ratatui::init();
        if let Err(e) = execute!(std::io::stdout(), EnableMouseCapture, EnableBracketedPaste) {
            tracing::warn!(error = %e, "enabling mouse capture failed");
        }

        let result = run_loop(&mut terminal, &mut ctrl, view_rx).await;

        if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture, DisableBracketedPaste) {
            tracing::warn!(error = %e, "disabling mouse capture failed");
        }
        ratatui::restore();

        print_exit_screen(&ctrl);
        result
    }
}

async fn run_loop(
    terminal: &mut DefaultTerminal,
    ctrl: &mut ViewController,
    view_rx: mpsc::Receiver<ViewEvent>,
) -> anyhow::Result<()> {
    let mut events = ui_events(EventStream::new(), view_rx);
    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| ui::render(frame, ctrl))?;

        tokio::select! {
            event = events.next() => match event {
                Some(UiEvent::Terminal(event)) => {
                    if handle_event(ctrl, event) == InputResult::Quit {
                        break;
                    }
                }
                Some(UiEvent::View(event)) => ctrl.apply(event),
                Some(UiEvent::TerminalError(e)) => {
                    tracing::error!(error = %e, "terminal event stream failed");
                    return Err(e.into());
                }
                None => break,
            },
            _ = tick.tick() => {}
        }
    }
    Ok(())
}

/// Dispatch a raw terminal event. Resize and focus changes only need a redraw.
fn handle_event(ctrl: &mut ViewController, event: Event) -> InputResult {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(ctrl, key),
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => {
                    ctrl.scroll_offset = ctrl.scroll_offset.saturating_add(MOUSE_SCROLL_STEP);
                }
                MouseEventKind::ScrollDown => {
                    ctrl.scroll_offset = ctrl.scroll_offset.saturating_sub(MOUSE_SCROLL_STEP);
                }
                _ => {}
            }
            InputResult::None
        }
        Event::Paste(text) => {
            if ctrl.view != View::Approvals && ctrl.focus.is_none() {
                ctrl.input.insert_str(&text.replace('\r', ""));
            }
            InputResult::None
        }
        _ => InputResult::None,
    }
}

/// Print a farewell screen after the TUI exits.
fn print_exit_screen(ctrl: &ViewController) {
    let elapsed = format_elapsed(ctrl.session_start.elapsed());
    let msg_count = ctrl.transcript.len();
    let decided = ctrl
        .approvals
        .values()
        .filter(|state| state.is_terminal())
        .count();
    let approved = ctrl
        .approvals
        .values()
        .filter(|state| **state == ApprovalState::Approved)
        .count();

    println!();
    println!("  \x1b[1mminibot session closed\x1b[0m");
    println!();
    println!("  Session lasted {elapsed} with {msg_count} messages.");
    if decided > 0 {
        println!(
            "  {decided} request(s) decided: {approved} approved, {} rejected.",
            decided - approved
        );
    }
    if ctrl.badge > 0 {
        println!(
            "  {} request(s) still awaiting approval on {}.",
            ctrl.badge, ctrl.server_url
        );
    }
    println!();
}
