// ABOUTME: TUI state types — chat transcript, approval lifecycle, views, and the input buffer.
// ABOUTME: Plain data owned by the view controller and drawn by the widgets each frame.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::{OperationKind, PendingApprovals, ResultRow};

/// Text of the loading placeholder.
pub const PENDING_TEXT: &str = "Thinking...";
/// Shown when a query fails for any reason.
pub const QUERY_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";
/// Shown when an approval call fails for any reason.
pub const APPROVAL_ERROR_TEXT: &str = "Error processing approval. Please try again.";
/// First message on the landing view.
pub const GREETING_TEXT: &str = "Hello! I'm your Agentic Bot. I can help you manage users and projects. Try asking me to show users or create a new project!";

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Chat plus the data summary panel; the landing view.
    Home,
    Chat,
    Approvals,
}

impl View {
    const ORDER: [View; 3] = [View::Home, View::Chat, View::Approvals];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|v| *v == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|v| *v == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Chat => "Chat",
            View::Approvals => "Approvals",
        }
    }
}

/// Transcript-unique message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

/// The kind of a single chat message displayed in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageKind {
    User,
    Bot {
        operation: Option<OperationKind>,
        requires_approval: bool,
        /// Set when the server staged a request that needs a decision.
        request_id: Option<String>,
        rows: Vec<ResultRow>,
        proposed_changes: Option<Map<String, Value>>,
    },
    /// Loading placeholder for an in-flight query.
    Pending,
    Error,
    System,
}

impl ChatMessageKind {
    /// A bot message with no structured extras.
    pub fn plain_bot() -> Self {
        Self::Bot {
            operation: None,
            requires_approval: false,
            request_id: None,
            rows: Vec::new(),
            proposed_changes: None,
        }
    }
}

/// A single message in the chat history. Immutable once pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub kind: ChatMessageKind,
    pub content: String,
}

impl ChatMessage {
    /// Request id of the approval controls this message carries, if any.
    pub fn approval_request_id(&self) -> Option<&str> {
        match &self.kind {
            ChatMessageKind::Bot {
                requires_approval: true,
                request_id: Some(id),
                ..
            } => Some(id),
            _ => None,
        }
    }
}

/// Ordered chat history. Messages can be appended or removed, never edited.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id.
    pub fn push(&mut self, kind: ChatMessageKind, content: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            kind,
            content: content.into(),
        });
        id
    }

    /// Remove a message by id. Returns whether it was present.
    pub fn remove(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of loading placeholders still in the transcript.
    pub fn pending_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.kind == ChatMessageKind::Pending)
            .count()
    }
}

/// A user's answer to an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn approved(self) -> bool {
        self == Decision::Approve
    }
}

/// Client-side lifecycle of one approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    /// A decision is on the wire.
    Submitting(Decision),
    Approved,
    Rejected,
}

impl ApprovalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ApprovalState::Approved | ApprovalState::Rejected)
    }

    /// Whether a new decision may be sent from this state.
    pub fn accepts_decision(self) -> bool {
        self == ApprovalState::Pending
    }

    /// Terminal state for a decision the server confirmed.
    pub fn resolved(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ApprovalState::Approved,
            Decision::Reject => ApprovalState::Rejected,
        }
    }
}

/// The inline approve/reject prompt shown under the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalFocus {
    pub request_id: String,
    pub description: String,
    /// 0 = Approve, 1 = Reject.
    pub selected: usize,
}

/// What the Approvals view currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingList {
    NotLoaded,
    Loading,
    Loaded(PendingApprovals),
    Failed(String),
}

/// Single-line (Shift+Enter for newlines) input buffer with a char-indexed cursor.
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    pub text: String,
    pub cursor_pos: usize,
}

impl InputBuffer {
    /// Take the trimmed text if non-empty, clearing the buffer.
    /// Whitespace-only input is left untouched.
    pub fn submit(&mut self) -> Option<String> {
        let trimmed = self.text.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.clear();
        Some(trimmed)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_pos = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.char_len());
    }

    pub fn insert(&mut self, c: char) {
        self.clamp_cursor();
        let at = self.byte_index(self.cursor_pos);
        self.text.insert(at, c);
        self.cursor_pos += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }
        let end = self.byte_index(self.cursor_pos);
        let start = self.byte_index(self.cursor_pos - 1);
        self.text.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    pub fn delete(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.char_len() {
            return;
        }
        let start = self.byte_index(self.cursor_pos);
        let end = self.byte_index(self.cursor_pos + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor_pos = (self.cursor_pos + 1).min(self.char_len());
    }

    pub fn home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn end(&mut self) {
        self.cursor_pos = self.char_len();
    }

    /// Text before the cursor on the cursor's line, for cursor placement.
    pub fn before_cursor_on_line(&self) -> (usize, String) {
        let before: String = self.text.chars().take(self.cursor_pos).collect();
        let line = before.matches('\n').count();
        let tail = before.rsplit('\n').next().unwrap_or("").to_string();
        (line, tail)
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}
