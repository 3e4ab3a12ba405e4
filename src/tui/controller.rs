// ABOUTME: View controller — owns the view model and drives every backend interaction.
// ABOUTME: Handlers mutate state synchronously; fetches run as tasks that report ViewEvents.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::api::{ApprovalStatus, Backend, BotResponse, HealthStatus};
use crate::summary::{self, DataSummary};
use crate::tui::events::ViewEvent;
use crate::tui::state::{
    APPROVAL_ERROR_TEXT, ApprovalFocus, ApprovalState, ChatMessageKind, Decision, GREETING_TEXT,
    InputBuffer, MessageId, PENDING_TEXT, PendingList, QUERY_ERROR_TEXT, Transcript, View,
};

/// Last known server health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Online(HealthStatus),
    Offline,
}

/// The chat/approval view controller.
///
/// Owns everything the screen shows. Backend calls never block: each one is
/// spawned onto the runtime and its result comes back through `apply`.
pub struct ViewController {
    backend: Arc<dyn Backend>,
    events: mpsc::Sender<ViewEvent>,
    pub transcript: Transcript,
    pub view: View,
    pub input: InputBuffer,
    /// Lines scrolled up from the bottom of the chat (0 = pinned).
    pub scroll_offset: u16,
    pub approvals: HashMap<String, ApprovalState>,
    pub focus: Option<ApprovalFocus>,
    pub pending: PendingList,
    pub pending_selected: usize,
    pub summary: Option<DataSummary>,
    /// Number of requests awaiting approval on the server.
    pub badge: usize,
    pub health: Health,
    pub server_url: String,
    pub session_start: Instant,
    /// Requests whose inline prompt was put off with Esc.
    deferred: HashSet<String>,
    /// Last sequence number handed to a pending-count fetch.
    count_seq: u64,
    /// Sequence number of the fetch the badge currently reflects.
    badge_seq: u64,
    /// Sequence number of the newest pending-list fetch.
    list_seq: u64,
}

impl ViewController {
    pub fn new(
        backend: Arc<dyn Backend>,
        events: mpsc::Sender<ViewEvent>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            events,
            transcript: Transcript::new(),
            view: View::Home,
            input: InputBuffer::default(),
            scroll_offset: 0,
            approvals: HashMap::new(),
            focus: None,
            pending: PendingList::NotLoaded,
            pending_selected: 0,
            summary: None,
            badge: 0,
            health: Health::Unknown,
            server_url: server_url.into(),
            session_start: Instant::now(),
            deferred: HashSet::new(),
            count_seq: 0,
            badge_seq: 0,
            list_seq: 0,
        }
    }

    /// Initial load: optional greeting, badge, health, and the start view's data.
    pub fn start(&mut self, view: View, greeting: bool) {
        if greeting {
            self.push(ChatMessageKind::plain_bot(), GREETING_TEXT);
        }
        self.refresh_badge();
        self.refresh_health();
        self.set_view(view);
    }

    /// Switch views, loading whatever the new view displays.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
        match view {
            View::Home => self.refresh_summary(),
            View::Approvals => self.load_pending(),
            View::Chat => {}
        }
    }

    /// Submit whatever is in the input buffer. Returns whether a query was sent.
    pub fn submit_input(&mut self) -> bool {
        match self.input.submit() {
            Some(text) => self.submit_query(&text),
            None => false,
        }
    }

    /// Post a query: user message, loading placeholder, then the backend call.
    ///
    /// Blank input is ignored without touching the transcript or the network.
    pub fn submit_query(&mut self, text: &str) -> bool {
        let query = text.trim();
        if query.is_empty() {
            return false;
        }
        self.push(ChatMessageKind::User, query);
        let placeholder = self.push(ChatMessageKind::Pending, PENDING_TEXT);

        let backend = self.backend.clone();
        let query = query.to_string();
        tracing::debug!(%query, "submitting query");
        self.spawn(async move {
            ViewEvent::QueryCompleted {
                placeholder,
                result: backend.query(&query).await,
            }
        });
        true
    }

    /// Current lifecycle state of a request. Unknown ids are treated as pending.
    pub fn approval_state(&self, request_id: &str) -> ApprovalState {
        self.approvals
            .get(request_id)
            .copied()
            .unwrap_or(ApprovalState::Pending)
    }

    /// Send a decision for `request_id`. Returns whether a call was issued.
    ///
    /// A request that is already submitting or resolved is left alone.
    pub fn resolve_approval(&mut self, request_id: &str, decision: Decision) -> bool {
        let state = self.approval_state(request_id);
        if !state.accepts_decision() {
            tracing::debug!(request_id, ?state, "ignoring decision for settled request");
            return false;
        }
        self.approvals
            .insert(request_id.to_string(), ApprovalState::Submitting(decision));

        let backend = self.backend.clone();
        let request_id = request_id.to_string();
        tracing::info!(%request_id, approved = decision.approved(), "submitting approval");
        self.spawn(async move {
            let result = backend.approve(&request_id, decision.approved()).await;
            ViewEvent::ApprovalCompleted {
                request_id,
                decision,
                result,
            }
        });
        true
    }

    /// Resolve the inline approval prompt with its selected option.
    pub fn resolve_focus(&mut self, decision: Decision) -> bool {
        match self.focus.take() {
            Some(focus) => self.resolve_approval(&focus.request_id, decision),
            None => false,
        }
    }

    /// Put off the inline prompt without deciding; the next undecided request takes focus.
    pub fn defer_focus(&mut self) {
        if let Some(focus) = self.focus.take() {
            self.deferred.insert(focus.request_id);
            self.refocus();
        }
    }

    /// Resolve the highlighted entry of the Approvals view.
    pub fn resolve_selected(&mut self, decision: Decision) -> bool {
        let request_id = match &self.pending {
            PendingList::Loaded(list) => list
                .pending_approvals
                .get(self.pending_selected)
                .map(|p| p.request_id.clone()),
            _ => None,
        };
        match request_id {
            Some(id) => self.resolve_approval(&id, decision),
            None => false,
        }
    }

    pub fn select_next_pending(&mut self) {
        if let PendingList::Loaded(list) = &self.pending {
            let max = list.len().saturating_sub(1);
            self.pending_selected = (self.pending_selected + 1).min(max);
        }
    }

    pub fn select_prev_pending(&mut self) {
        self.pending_selected = self.pending_selected.saturating_sub(1);
    }

    /// Fetch the full pending list for the Approvals view.
    pub fn load_pending(&mut self) {
        if !matches!(self.pending, PendingList::Loaded(_)) {
            self.pending = PendingList::Loading;
        }
        let seq = self.next_count_seq();
        self.list_seq = seq;
        let backend = self.backend.clone();
        self.spawn(async move {
            ViewEvent::PendingLoaded {
                seq,
                result: backend.pending_approvals().await,
            }
        });
    }

    /// Fetch the pending count for the status bar badge.
    pub fn refresh_badge(&mut self) {
        let seq = self.next_count_seq();
        let backend = self.backend.clone();
        self.spawn(async move {
            ViewEvent::BadgeLoaded {
                seq,
                result: backend.pending_approvals().await.map(|p| p.len()),
            }
        });
    }

    /// Fetch users and projects together and rebuild the summary.
    pub fn refresh_summary(&mut self) {
        let backend = self.backend.clone();
        self.spawn(async move {
            ViewEvent::SummaryLoaded(summary::fetch_summary(backend.as_ref()).await)
        });
    }

    pub fn refresh_health(&mut self) {
        let backend = self.backend.clone();
        self.spawn(async move { ViewEvent::HealthLoaded(backend.health().await) });
    }

    /// Apply a completed backend call to the view model.
    pub fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::QueryCompleted {
                placeholder,
                result,
            } => {
                self.transcript.remove(placeholder);
                match result {
                    Ok(response) => {
                        self.show_response(response);
                        self.refresh_badge();
                        if self.view == View::Home {
                            self.refresh_summary();
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "query failed");
                        self.push(ChatMessageKind::Error, QUERY_ERROR_TEXT);
                    }
                }
            }
            ViewEvent::ApprovalCompleted {
                request_id,
                decision,
                result,
            } => match result {
                Ok(outcome) => {
                    let state = match outcome.status {
                        Some(ApprovalStatus::Approved) => ApprovalState::Approved,
                        Some(ApprovalStatus::Rejected) => ApprovalState::Rejected,
                        None => ApprovalState::resolved(decision),
                    };
                    tracing::info!(%request_id, ?state, "approval resolved");
                    self.approvals.insert(request_id.clone(), state);
                    self.deferred.remove(&request_id);
                    self.push(ChatMessageKind::System, outcome.message);
                    if self
                        .focus
                        .as_ref()
                        .is_none_or(|f| f.request_id == request_id)
                    {
                        self.refocus();
                    }
                    self.refresh_badge();
                    if self.view == View::Home {
                        self.refresh_summary();
                    }
                    if self.view == View::Approvals {
                        self.load_pending();
                    }
                }
                Err(e) => {
                    tracing::error!(%request_id, error = %e, "approval failed");
                    self.approvals.insert(request_id.clone(), ApprovalState::Pending);
                    self.deferred.remove(&request_id);
                    self.push(ChatMessageKind::Error, APPROVAL_ERROR_TEXT);
                    if self.focus.is_none() {
                        self.focus = self.focus_for(&request_id);
                    }
                }
            },
            ViewEvent::PendingLoaded { seq, result } => {
                if seq < self.list_seq {
                    tracing::debug!(seq, latest = self.list_seq, "dropping stale pending list");
                    return;
                }
                match result {
                    Ok(list) => {
                        self.set_badge(seq, list.len());
                        self.pending_selected =
                            self.pending_selected.min(list.len().saturating_sub(1));
                        self.pending = PendingList::Loaded(list);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "loading pending approvals failed");
                        self.pending = PendingList::Failed(e.to_string());
                    }
                }
            }
            ViewEvent::BadgeLoaded { seq, result } => match result {
                Ok(count) => self.set_badge(seq, count),
                Err(e) => tracing::warn!(error = %e, "updating approval badge failed"),
            },
            ViewEvent::SummaryLoaded(result) => match result {
                Ok(summary) => self.summary = Some(summary),
                Err(e) => tracing::error!(error = %e, "loading data summary failed"),
            },
            ViewEvent::HealthLoaded(result) => {
                self.health = match result {
                    Ok(status) => Health::Online(status),
                    Err(e) => {
                        tracing::warn!(error = %e, "health check failed");
                        Health::Offline
                    }
                };
            }
        }
    }

    fn show_response(&mut self, response: BotResponse) {
        let BotResponse {
            response: text,
            operation,
            requires_approval,
            rows,
            proposed_changes,
            request_id,
        } = response;

        let staged = request_id.clone().filter(|_| requires_approval);
        if requires_approval && staged.is_none() {
            tracing::warn!("approval required but no request id was provided");
        }

        self.push(
            ChatMessageKind::Bot {
                operation,
                requires_approval,
                request_id,
                rows,
                proposed_changes,
            },
            text,
        );

        if let Some(id) = staged {
            self.approvals
                .entry(id.clone())
                .or_insert(ApprovalState::Pending);
            if let Some(focus) = self.focus_for(&id) {
                self.focus = Some(focus);
            }
        }
    }

    /// Inline prompt for a chat request that still awaits a decision.
    fn focus_for(&self, request_id: &str) -> Option<ApprovalFocus> {
        if !self.approval_state(request_id).accepts_decision() {
            return None;
        }
        let message = self
            .transcript
            .messages()
            .iter()
            .rev()
            .find(|m| m.approval_request_id() == Some(request_id))?;
        let description = match &message.kind {
            ChatMessageKind::Bot {
                operation: Some(op),
                ..
            } => format!("{} request {}", op.label(), request_id),
            _ => format!("request {}", request_id),
        };
        Some(ApprovalFocus {
            request_id: request_id.to_string(),
            description,
            selected: 0,
        })
    }

    /// Focus the newest chat request still awaiting a decision, skipping deferred ones.
    fn refocus(&mut self) {
        let next = self
            .transcript
            .messages()
            .iter()
            .rev()
            .filter_map(|m| m.approval_request_id())
            .find(|id| !self.deferred.contains(*id) && self.approval_state(id).accepts_decision())
            .map(str::to_string);
        self.focus = next.and_then(|id| self.focus_for(&id));
    }

    fn next_count_seq(&mut self) -> u64 {
        self.count_seq += 1;
        self.count_seq
    }

    /// Apply a pending count unless a newer fetch already set the badge.
    fn set_badge(&mut self, seq: u64, count: usize) {
        if seq < self.badge_seq {
            tracing::debug!(seq, latest = self.badge_seq, "dropping stale approval count");
            return;
        }
        self.badge_seq = seq;
        self.badge = count;
    }

    fn push(
        &mut self,
        kind: ChatMessageKind,
        content: impl Into<String>,
    ) -> MessageId {
        self.scroll_offset = 0;
        self.transcript.push(kind, content)
    }

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ViewEvent> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let event = fut.await;
            if tx.send(event).await.is_err() {
                tracing::debug!("view closed before backend call completed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::api::{
        ApiError, ApprovalResult, OperationKind, PendingApprovals, ProjectRecord, UserRecord,
    };
    use crate::tui::input::{InputResult, handle_key};

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        query_response: Mutex<Option<serde_json::Value>>,
        /// Per-query replies with a delay in milliseconds; falls back to `query_response`.
        replies: HashMap<&'static str, (u64, serde_json::Value)>,
        fail_approve: bool,
        fail_users: bool,
        pending: serde_json::Value,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn decode_error() -> ApiError {
        ApiError::Decode {
            endpoint: "/test",
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn query(&self, query: &str) -> Result<BotResponse, ApiError> {
            self.record(format!("query:{query}"));
            if let Some((delay_ms, reply)) = self.replies.get(query) {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                return Ok(serde_json::from_value(reply.clone()).unwrap());
            }
            match self.query_response.lock().unwrap().clone() {
                Some(value) => Ok(serde_json::from_value(value).unwrap()),
                None => Err(decode_error()),
            }
        }

        async fn approve(&self, request_id: &str, approved: bool) -> Result<ApprovalResult, ApiError> {
            self.record(format!("approve:{request_id}:{approved}"));
            if self.fail_approve {
                return Err(ApiError::Status {
                    code: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(ApprovalResult {
                message: if approved {
                    "Operation 'update' executed successfully".to_string()
                } else {
                    "Operation was rejected by user".to_string()
                },
                status: None,
                request_id: Some(request_id.to_string()),
            })
        }

        async fn pending_approvals(&self) -> Result<PendingApprovals, ApiError> {
            self.record("pending".to_string());
            let body = if self.pending.is_null() {
                json!({"pending_approvals": {}})
            } else {
                self.pending.clone()
            };
            Ok(serde_json::from_value(body).unwrap())
        }

        async fn users(&self) -> Result<Vec<UserRecord>, ApiError> {
            self.record("users".to_string());
            if self.fail_users {
                return Err(decode_error());
            }
            Ok(serde_json::from_value(json!([
                {"department": "Engineering"},
                {"department": "Sales"},
                {"department": "Engineering"}
            ]))
            .unwrap())
        }

        async fn projects(&self) -> Result<Vec<ProjectRecord>, ApiError> {
            self.record("projects".to_string());
            Ok(serde_json::from_value(json!([{"status": "active"}])).unwrap())
        }

        async fn health(&self) -> Result<HealthStatus, ApiError> {
            self.record("health".to_string());
            Ok(HealthStatus {
                status: "healthy".to_string(),
                service: "Mini Agentic Bot".to_string(),
                users_count: 3,
                projects_count: 1,
            })
        }
    }

    fn controller(backend: Arc<FakeBackend>) -> (ViewController, mpsc::Receiver<ViewEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let mut ctrl = ViewController::new(backend, tx, "http://test");
        ctrl.view = View::Chat;
        (ctrl, rx)
    }

    /// Apply events until the channel has been quiet for a short while.
    async fn settle(ctrl: &mut ViewController, rx: &mut mpsc::Receiver<ViewEvent>) {
        while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
        {
            ctrl.apply(event);
        }
    }

    #[tokio::test]
    async fn blank_query_is_ignored() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend.clone());

        assert!(!ctrl.submit_query("   \t "));
        settle(&mut ctrl, &mut rx).await;

        assert!(ctrl.transcript.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn placeholder_shows_until_response_arrives() {
        let backend = Arc::new(FakeBackend::default());
        *backend.query_response.lock().unwrap() = Some(json!({"response": "ok"}));
        let (mut ctrl, mut rx) = controller(backend);

        ctrl.submit_query("hello");
        assert_eq!(ctrl.transcript.len(), 2);
        assert_eq!(ctrl.transcript.pending_count(), 1);

        settle(&mut ctrl, &mut rx).await;
        let kinds: Vec<&ChatMessageKind> =
            ctrl.transcript.messages().iter().map(|m| &m.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0], &ChatMessageKind::User);
        assert!(matches!(kinds[1], ChatMessageKind::Bot { .. }));
        assert_eq!(ctrl.transcript.pending_count(), 0);
    }

    #[tokio::test]
    async fn failed_query_shows_generic_error() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend);

        ctrl.submit_query("hello");
        settle(&mut ctrl, &mut rx).await;

        let last = ctrl.transcript.last().unwrap();
        assert_eq!(last.kind, ChatMessageKind::Error);
        assert_eq!(last.content, QUERY_ERROR_TEXT);
        assert_eq!(ctrl.transcript.len(), 2);
        assert_eq!(ctrl.transcript.pending_count(), 0);
    }

    #[tokio::test]
    async fn approval_response_focuses_prompt() {
        let backend = Arc::new(FakeBackend::default());
        *backend.query_response.lock().unwrap() = Some(json!({
            "response": "Approval required for update operation. Request ID: 1a2b-3c",
            "operation_type": "update",
            "requires_approval": true
        }));
        let (mut ctrl, mut rx) = controller(backend);

        ctrl.submit_query("update bob");
        settle(&mut ctrl, &mut rx).await;

        let focus = ctrl.focus.clone().expect("approval prompt should be focused");
        assert_eq!(focus.request_id, "1a2b-3c");
        assert_eq!(ctrl.approval_state("1a2b-3c"), ApprovalState::Pending);
        let last = ctrl.transcript.last().unwrap();
        assert_eq!(last.approval_request_id(), Some("1a2b-3c"));
        assert!(matches!(
            &last.kind,
            ChatMessageKind::Bot { operation: Some(OperationKind::Update), .. }
        ));
    }

    #[tokio::test]
    async fn approve_issues_one_call_and_is_terminal() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend.clone());

        assert!(ctrl.resolve_approval("abc", Decision::Approve));
        // A second decision while the first is in flight is refused.
        assert!(!ctrl.resolve_approval("abc", Decision::Reject));
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.approval_state("abc"), ApprovalState::Approved);
        assert!(!ctrl.resolve_approval("abc", Decision::Reject));
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(backend.count("approve:"), 1);
        assert_eq!(backend.calls().iter().filter(|c| *c == "approve:abc:true").count(), 1);
        let last = ctrl.transcript.last().unwrap();
        assert_eq!(last.kind, ChatMessageKind::System);
        assert_eq!(last.content, "Operation 'update' executed successfully");
    }

    #[tokio::test]
    async fn failed_approval_reverts_to_pending() {
        let backend = Arc::new(FakeBackend {
            fail_approve: true,
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend.clone());

        ctrl.resolve_approval("abc", Decision::Reject);
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.approval_state("abc"), ApprovalState::Pending);
        assert_eq!(ctrl.transcript.last().unwrap().content, APPROVAL_ERROR_TEXT);
        assert_eq!(backend.count("approve:"), 1);
    }

    #[tokio::test]
    async fn approval_refreshes_pending_list_on_approvals_view() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend.clone());
        ctrl.view = View::Approvals;

        ctrl.resolve_approval("abc", Decision::Reject);
        settle(&mut ctrl, &mut rx).await;

        assert!(matches!(ctrl.pending, PendingList::Loaded(_)));
        // Once for the badge, once for the list.
        assert_eq!(backend.count("pending"), 2);
        assert_eq!(ctrl.approval_state("abc"), ApprovalState::Rejected);
    }

    #[tokio::test]
    async fn summary_failure_keeps_previous_summary() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend);
        ctrl.set_view(View::Home);
        settle(&mut ctrl, &mut rx).await;
        let before = ctrl.summary.clone().expect("summary loaded");
        assert_eq!(before.departments.get("Engineering"), 2);

        let failing: Arc<dyn Backend> = Arc::new(FakeBackend {
            fail_users: true,
            ..Default::default()
        });
        let (tx, mut rx2) = mpsc::channel(8);
        ctrl.backend = failing;
        ctrl.events = tx;
        ctrl.refresh_summary();
        settle(&mut ctrl, &mut rx2).await;

        assert_eq!(ctrl.summary, Some(before));
    }

    #[tokio::test]
    async fn start_greets_and_loads_landing_data() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, mut rx) = controller(backend.clone());

        ctrl.start(View::Home, true);
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.transcript.messages()[0].content, GREETING_TEXT);
        assert!(ctrl.summary.is_some());
        assert!(matches!(ctrl.health, Health::Online(_)));
        assert_eq!(backend.count("users"), 1);
        assert_eq!(backend.count("projects"), 1);
    }

    #[tokio::test]
    async fn resolve_selected_uses_highlighted_entry() {
        let backend = Arc::new(FakeBackend {
            pending: json!({"pending_approvals": {
                "first": {"operation": "delete", "query": "remove a"},
                "second": {"operation": "update", "query": "edit b"}
            }}),
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend.clone());
        ctrl.set_view(View::Approvals);
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.badge, 2);

        ctrl.select_next_pending();
        ctrl.select_next_pending();
        assert_eq!(ctrl.pending_selected, 1);
        assert!(ctrl.resolve_selected(Decision::Approve));
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(backend.count("approve:second:true"), 1);
    }

    fn approval_reply(op: &str, id: &str) -> serde_json::Value {
        json!({
            "response": format!("Approval required for {op} operation."),
            "operation_type": op,
            "requires_approval": true,
            "request_id": id
        })
    }

    #[tokio::test]
    async fn overlapping_queries_remove_their_own_placeholders() {
        let backend = Arc::new(FakeBackend {
            replies: HashMap::from([
                ("slow", (80, json!({"response": "slow reply"}))),
                ("fast one", (0, json!({"response": "fast reply"}))),
            ]),
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend);

        ctrl.submit_query("slow");
        let slow_placeholder = ctrl.transcript.last().unwrap().id;
        ctrl.submit_query("fast one");
        let fast_placeholder = ctrl.transcript.last().unwrap().id;
        assert_eq!(ctrl.transcript.pending_count(), 2);

        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.transcript.pending_count(), 0);
        let shown: Vec<(&ChatMessageKind, &str)> = ctrl
            .transcript
            .messages()
            .iter()
            .map(|m| (&m.kind, m.content.as_str()))
            .collect();
        let plain = ChatMessageKind::plain_bot();
        assert_eq!(
            shown,
            [
                (&ChatMessageKind::User, "slow"),
                (&ChatMessageKind::User, "fast one"),
                (&plain, "fast reply"),
                (&plain, "slow reply"),
            ]
        );
        assert!(
            ctrl.transcript
                .messages()
                .iter()
                .all(|m| m.id != slow_placeholder && m.id != fast_placeholder)
        );
    }

    #[tokio::test]
    async fn failed_inline_decision_restores_prompt() {
        let backend = Arc::new(FakeBackend {
            replies: HashMap::from([("create user", (0, approval_reply("create", "f00d")))]),
            fail_approve: true,
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend.clone());
        ctrl.submit_query("create user");
        settle(&mut ctrl, &mut rx).await;

        let one = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('1'),
            crossterm::event::KeyModifiers::NONE,
        );
        assert_eq!(handle_key(&mut ctrl, one), InputResult::Decided(Decision::Approve));
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.approval_state("f00d"), ApprovalState::Pending);
        assert_eq!(ctrl.focus.as_ref().map(|f| f.request_id.as_str()), Some("f00d"));
        assert_eq!(ctrl.transcript.last().unwrap().content, APPROVAL_ERROR_TEXT);

        // The retry goes to the prompt, not the input box.
        assert_eq!(handle_key(&mut ctrl, one), InputResult::Decided(Decision::Approve));
        settle(&mut ctrl, &mut rx).await;
        assert!(ctrl.input.is_empty());
        assert_eq!(backend.count("approve:f00d:true"), 2);
    }

    #[tokio::test]
    async fn resolving_newer_request_refocuses_older_one() {
        let backend = Arc::new(FakeBackend {
            replies: HashMap::from([
                ("delete bob", (0, approval_reply("delete", "aa1"))),
                ("update jane", (0, approval_reply("update", "bb2"))),
            ]),
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend.clone());
        ctrl.submit_query("delete bob");
        settle(&mut ctrl, &mut rx).await;
        ctrl.submit_query("update jane");
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.focus.as_ref().unwrap().request_id, "bb2");

        assert!(ctrl.resolve_focus(Decision::Approve));
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.approval_state("bb2"), ApprovalState::Approved);
        let focus = ctrl.focus.clone().expect("older request should take the prompt");
        assert_eq!(focus.request_id, "aa1");
        assert_eq!(focus.description, "Delete request aa1");

        assert!(ctrl.resolve_focus(Decision::Reject));
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.approval_state("aa1"), ApprovalState::Rejected);
        assert!(ctrl.focus.is_none());
        assert_eq!(backend.count("approve:aa1:false"), 1);
    }

    #[tokio::test]
    async fn deferring_moves_prompt_to_next_undecided_request() {
        let backend = Arc::new(FakeBackend {
            replies: HashMap::from([
                ("delete bob", (0, approval_reply("delete", "aa1"))),
                ("update jane", (0, approval_reply("update", "bb2"))),
            ]),
            ..Default::default()
        });
        let (mut ctrl, mut rx) = controller(backend);
        ctrl.submit_query("delete bob");
        settle(&mut ctrl, &mut rx).await;
        ctrl.submit_query("update jane");
        settle(&mut ctrl, &mut rx).await;

        ctrl.defer_focus();
        assert_eq!(ctrl.focus.as_ref().unwrap().request_id, "aa1");
        ctrl.defer_focus();
        assert!(ctrl.focus.is_none());
        assert_eq!(ctrl.approval_state("aa1"), ApprovalState::Pending);
        assert_eq!(ctrl.approval_state("bb2"), ApprovalState::Pending);
    }

    #[tokio::test]
    async fn stale_badge_count_is_dropped() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, _rx) = controller(backend);

        ctrl.refresh_badge();
        let older = ctrl.count_seq;
        ctrl.refresh_badge();
        let newer = ctrl.count_seq;
        assert!(older < newer);

        ctrl.apply(ViewEvent::BadgeLoaded {
            seq: newer,
            result: Ok(5),
        });
        ctrl.apply(ViewEvent::BadgeLoaded {
            seq: older,
            result: Ok(3),
        });
        assert_eq!(ctrl.badge, 5);
    }

    #[tokio::test]
    async fn stale_pending_list_is_dropped() {
        let backend = Arc::new(FakeBackend::default());
        let (mut ctrl, _rx) = controller(backend);

        ctrl.load_pending();
        let older = ctrl.list_seq;
        ctrl.load_pending();
        let newer = ctrl.list_seq;

        let fresh: PendingApprovals = serde_json::from_value(json!({"pending_approvals": {
            "c3": {"operation": "delete", "query": "remove carol"}
        }}))
        .unwrap();
        ctrl.apply(ViewEvent::PendingLoaded {
            seq: newer,
            result: Ok(fresh.clone()),
        });
        ctrl.apply(ViewEvent::PendingLoaded {
            seq: older,
            result: Ok(PendingApprovals::default()),
        });

        assert_eq!(ctrl.pending, PendingList::Loaded(fresh));
        assert_eq!(ctrl.badge, 1);
    }
}
