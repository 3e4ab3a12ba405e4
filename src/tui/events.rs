// ABOUTME: Completion events sent from background backend calls to the view controller.
// ABOUTME: Each spawned fetch reports exactly one ViewEvent over the mpsc channel.

use crate::api::{ApiError, ApprovalResult, BotResponse, HealthStatus, PendingApprovals};
use crate::summary::DataSummary;
use crate::tui::state::{Decision, MessageId};

/// Outcome of an asynchronous backend call, applied on the UI loop.
#[derive(Debug)]
pub enum ViewEvent {
    /// `/query` finished; `placeholder` is the loading message to remove.
    QueryCompleted {
        placeholder: MessageId,
        result: Result<BotResponse, ApiError>,
    },
    /// `/approve` finished for `request_id`.
    ApprovalCompleted {
        request_id: String,
        decision: Decision,
        result: Result<ApprovalResult, ApiError>,
    },
    /// Full pending list for the Approvals view. `seq` orders it against other count fetches.
    PendingLoaded {
        seq: u64,
        result: Result<PendingApprovals, ApiError>,
    },
    /// Pending count for the status bar badge.
    BadgeLoaded {
        seq: u64,
        result: Result<usize, ApiError>,
    },
    SummaryLoaded(Result<DataSummary, ApiError>),
    HealthLoaded(Result<HealthStatus, ApiError>),
}
