// ABOUTME: Wire schemas for the bot backend — request bodies and typed response records.
// ABOUTME: Responses are validated here so the view never touches untyped JSON shapes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Classification of a backend action, used for badge styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Create,
    Update,
    Delete,
    /// Any operation string the client does not recognize.
    Other(String),
}

impl OperationKind {
    /// Wire name of the operation (`read`, `create`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other(s) => s,
        }
    }

    /// Badge label: the wire name with its first letter capitalized.
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for OperationKind {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "read" => Self::Read,
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl Serialize for OperationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// A single record from `query_results`, keys in server order.
pub type ResultRow = Map<String, Value>;

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub user_id: &'a str,
}

/// Body of `POST /approve`.
#[derive(Debug, Clone, Serialize)]
pub struct ApproveRequest<'a> {
    pub request_id: &'a str,
    pub user_id: &'a str,
    pub approved: bool,
}

/// Raw `/query` response as it appears on the wire.
#[derive(Debug, Deserialize)]
struct RawBotResponse {
    response: String,
    #[serde(default)]
    operation_type: Option<OperationKind>,
    #[serde(default)]
    requires_approval: bool,
    #[serde(default)]
    query_results: Option<Vec<Value>>,
    #[serde(default)]
    proposed_changes: Option<Map<String, Value>>,
    #[serde(default)]
    request_id: Option<String>,
}

/// The bot's structured answer to a query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBotResponse")]
pub struct BotResponse {
    pub response: String,
    pub operation: Option<OperationKind>,
    pub requires_approval: bool,
    pub rows: Vec<ResultRow>,
    pub proposed_changes: Option<Map<String, Value>>,
    /// Identifier of the staged request when approval is required.
    pub request_id: Option<String>,
}

impl TryFrom<RawBotResponse> for BotResponse {
    type Error = String;

    fn try_from(raw: RawBotResponse) -> Result<Self, Self::Error> {
        let rows = normalize_rows(raw.query_results.unwrap_or_default())?;
        // Older servers only mention the id inside the message text.
        let request_id = match raw.request_id.filter(|id| !id.is_empty()) {
            Some(id) => Some(id),
            None if raw.requires_approval => legacy_request_id(&raw.response),
            None => None,
        };
        Ok(Self {
            response: raw.response,
            operation: raw.operation_type,
            requires_approval: raw.requires_approval,
            rows,
            proposed_changes: raw.proposed_changes,
            request_id,
        })
    }
}

/// Convert `query_results` into rows. Bare strings become `{"result": s}`.
fn normalize_rows(values: Vec<Value>) -> Result<Vec<ResultRow>, String> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) => Ok(map),
            Value::String(s) => {
                let mut map = Map::new();
                map.insert("result".to_string(), Value::String(s));
                Ok(map)
            }
            other => Err(format!("unexpected query result entry: {other}")),
        })
        .collect()
}

static REQUEST_ID_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)Request ID: ([a-f0-9-]+)").ok());

/// Pull a request id out of a human-readable message, if one is embedded.
pub fn legacy_request_id(message: &str) -> Option<String> {
    REQUEST_ID_RE
        .as_ref()?
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Server verdict on a resolved approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

/// Response of `POST /approve`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApprovalResult {
    pub message: String,
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A request awaiting human confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingApproval {
    #[serde(skip)]
    pub request_id: String,
    pub operation: String,
    pub query: String,
}

/// Response of `GET /pending-approvals`, in the order the server sent it.
/// A body without the `pending_approvals` key means nothing is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PendingApprovals {
    #[serde(default, deserialize_with = "ordered_pending")]
    pub pending_approvals: Vec<PendingApproval>,
}

impl PendingApprovals {
    pub fn len(&self) -> usize {
        self.pending_approvals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_approvals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingApproval> {
        self.pending_approvals.iter()
    }
}

fn ordered_pending<'de, D>(deserializer: D) -> Result<Vec<PendingApproval>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<PendingApproval>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of request id to pending approval")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((request_id, mut entry)) =
                access.next_entry::<String, PendingApproval>()?
            {
                entry.request_id = request_id;
                out.push(entry);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}

/// A user record; only `department` is interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub department: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A project record; only `status` is interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRecord {
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsEnvelope {
    pub projects: Vec<ProjectRecord>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub users_count: usize,
    #[serde(default)]
    pub projects_count: usize,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
