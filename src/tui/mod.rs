// ABOUTME: TUI module — ratatui full-screen interface for minibot.
// ABOUTME: Chat display, data summary, pending approvals, input handling, and status bar.

pub mod controller;
pub mod events;
pub mod input;
pub mod state;
pub mod subscriptions;
pub mod ui;
pub mod widgets;

pub use controller::ViewController;
pub use state::*;
