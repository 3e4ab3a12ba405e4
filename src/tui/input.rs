// ABOUTME: Keyboard input handling for the TUI — translates key events into controller calls.
// ABOUTME: Routes keys to the inline approval prompt, the Approvals list, or the input buffer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::controller::ViewController;
use crate::tui::state::{Decision, View};
use crate::tui::widgets::approval::{APPROVAL_OPTIONS, decision_for};

/// Lines moved by PageUp/PageDown.
const PAGE_STEP: u16 = 10;

/// The result of processing a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    /// No action needed.
    None,
    /// A query was posted.
    Submitted,
    /// An approval decision was sent.
    Decided(Decision),
    /// User wants to quit.
    Quit,
}

/// Process a key event against the controller and return the resulting action.
pub fn handle_key(ctrl: &mut ViewController, key: KeyEvent) -> InputResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputResult::Quit;
    }

    match key.code {
        KeyCode::PageUp => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_add(PAGE_STEP);
            return InputResult::None;
        }
        KeyCode::PageDown => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_sub(PAGE_STEP);
            return InputResult::None;
        }
        KeyCode::Tab => {
            ctrl.set_view(ctrl.view.next());
            return InputResult::None;
        }
        KeyCode::BackTab => {
            ctrl.set_view(ctrl.view.prev());
            return InputResult::None;
        }
        KeyCode::F(5) => {
            reload(ctrl);
            return InputResult::None;
        }
        _ => {}
    }

    if ctrl.view == View::Approvals {
        return handle_pending_key(ctrl, key);
    }

    if ctrl.focus.is_some() {
        return handle_focus_key(ctrl, key);
    }

    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            ctrl.input.insert('\n');
            InputResult::None
        }
        KeyCode::Enter => {
            if ctrl.submit_input() {
                InputResult::Submitted
            } else {
                InputResult::None
            }
        }
        KeyCode::Char(c) => {
            ctrl.input.insert(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            ctrl.input.backspace();
            InputResult::None
        }
        KeyCode::Delete => {
            ctrl.input.delete();
            InputResult::None
        }
        KeyCode::Left => {
            ctrl.input.left();
            InputResult::None
        }
        KeyCode::Right => {
            ctrl.input.right();
            InputResult::None
        }
        KeyCode::Home => {
            ctrl.input.home();
            InputResult::None
        }
        KeyCode::End => {
            ctrl.input.end();
            InputResult::None
        }
        KeyCode::Up => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_add(1);
            InputResult::None
        }
        KeyCode::Down => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_sub(1);
            InputResult::None
        }
        KeyCode::Esc => InputResult::Quit,
        _ => InputResult::None,
    }
}

/// Refresh whatever the current view shows.
fn reload(ctrl: &mut ViewController) {
    match ctrl.view {
        View::Home => {
            ctrl.refresh_summary();
            ctrl.refresh_health();
        }
        View::Chat => ctrl.refresh_badge(),
        View::Approvals => ctrl.load_pending(),
    }
}

/// Keys while the inline approve/reject prompt is showing.
fn handle_focus_key(ctrl: &mut ViewController, key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Left => {
            if let Some(focus) = ctrl.focus.as_mut() {
                focus.selected = focus.selected.saturating_sub(1);
            }
            InputResult::None
        }
        KeyCode::Right => {
            if let Some(focus) = ctrl.focus.as_mut()
                && focus.selected < APPROVAL_OPTIONS.len() - 1
            {
                focus.selected += 1;
            }
            InputResult::None
        }
        KeyCode::Char('1') | KeyCode::Char('y') => decide_focus(ctrl, Decision::Approve),
        KeyCode::Char('2') | KeyCode::Char('n') => decide_focus(ctrl, Decision::Reject),
        KeyCode::Enter => match ctrl.focus.as_ref().map(|f| decision_for(f.selected)) {
            Some(decision) => decide_focus(ctrl, decision),
            None => InputResult::None,
        },
        // The request stays pending and can be handled from the Approvals view.
        KeyCode::Esc => {
            ctrl.defer_focus();
            InputResult::None
        }
        KeyCode::Up => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_add(1);
            InputResult::None
        }
        KeyCode::Down => {
            ctrl.scroll_offset = ctrl.scroll_offset.saturating_sub(1);
            InputResult::None
        }
        _ => InputResult::None,
    }
}

fn decide_focus(ctrl: &mut ViewController, decision: Decision) -> InputResult {
    if ctrl.resolve_focus(decision) {
        InputResult::Decided(decision)
    } else {
        InputResult::None
    }
}

/// Keys on the Approvals view. There is no input box here; letters are actions.
fn handle_pending_key(ctrl: &mut ViewController, key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            ctrl.select_prev_pending();
            InputResult::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            ctrl.select_next_pending();
            InputResult::None
        }
        KeyCode::Char('a') | KeyCode::Char('y') => decide_selected(ctrl, Decision::Approve),
        KeyCode::Char('r') | KeyCode::Char('n') => decide_selected(ctrl, Decision::Reject),
        KeyCode::Esc => InputResult::Quit,
        _ => InputResult::None,
    }
}

fn decide_selected(ctrl: &mut ViewController, decision: Decision) -> InputResult {
    if ctrl.resolve_selected(decision) {
        InputResult::Decided(decision)
    } else {
        InputResult::None
    }
}
