// ABOUTME: Merges terminal input and backend completions into one event stream.
// ABOUTME: The terminal loop selects on this stream and never awaits I/O itself.

use std::io;

use crossterm::event::Event;
use futures::StreamExt;
use futures::stream::{BoxStream, Stream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::tui::events::ViewEvent;

/// Everything the terminal loop reacts to, apart from its redraw tick.
#[derive(Debug)]
pub enum UiEvent {
    Terminal(Event),
    View(ViewEvent),
    /// The terminal event source failed.
    TerminalError(io::Error),
}

/// Build the merged event stream. It ends once both sources have closed.
pub fn ui_events<T>(terminal: T, view_rx: mpsc::Receiver<ViewEvent>) -> BoxStream<'static, UiEvent>
where
    T: Stream<Item = io::Result<Event>> + Send + 'static,
{
    let terminal = terminal.map(|item| match item {
        Ok(event) => UiEvent::Terminal(event),
        Err(e) => UiEvent::TerminalError(e),
    });
    let views = ReceiverStream::new(view_rx).map(UiEvent::View);
    Box::pin(futures::stream::select(terminal, views))
}
