//! Interaction Event - typed record of one user action in the mail UI
//!
//! Wire form: `{ "type": "<kind>", "ts": <epoch ms>, ...payload }`.
//! Payload fields are statically known per kind; see `lenient` for how
//! malformed fields are defaulted.

use serde::{Deserialize, Serialize};

use super::lenient;

// ============================================================================
// EVENT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ClickAction,
    OpenThread,
    BackToInbox,
    ReopenSameThread,
    UndoAction,
    ContextSwitch,
    HoverIndecision,
    TimeToFirstAction,
    DeferThread,
    ManualOverload,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ClickAction => "click_action",
            EventKind::OpenThread => "open_thread",
            EventKind::BackToInbox => "back_to_inbox",
            EventKind::ReopenSameThread => "reopen_same_thread",
            EventKind::UndoAction => "undo_action",
            EventKind::ContextSwitch => "context_switch",
            EventKind::HoverIndecision => "hover_indecision",
            EventKind::TimeToFirstAction => "time_to_first_action",
            EventKind::DeferThread => "defer_thread",
            EventKind::ManualOverload => "manual_overload",
        }
    }

    /// Bookkeeping kinds are not user decisions and don't count towards activity rate
    pub fn is_substantive(&self) -> bool {
        !matches!(
            self,
            EventKind::TimeToFirstAction | EventKind::DeferThread | EventKind::ManualOverload
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PAYLOAD ENUMS
// ============================================================================

/// Click decision. Names outside the known set are kept verbatim so that
/// distinct custom actions stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClickAction {
    Archive,
    Delete,
    Reply,
    ReplyAll,
    Forward,
    Other(String),
}

/// Name used when a label matches no known action
pub const OTHER_ACTION: &str = "other";

impl ClickAction {
    pub fn as_str(&self) -> &str {
        match self {
            ClickAction::Archive => "archive",
            ClickAction::Delete => "delete",
            ClickAction::Reply => "reply",
            ClickAction::ReplyAll => "reply_all",
            ClickAction::Forward => "forward",
            ClickAction::Other(name) => name,
        }
    }

    /// Parse an action name. Empty → None, unknown → `Other(name)`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::from(name.to_string()))
    }

    /// Infer the action from a button label ("Reply all", "Archive", ...)
    pub fn infer_from_label(label: &str) -> Self {
        let s = label.trim().to_lowercase();
        if s.contains("archive") {
            ClickAction::Archive
        } else if s.contains("delete") {
            ClickAction::Delete
        } else if s.contains("reply all") || s == "replyall" {
            ClickAction::ReplyAll
        } else if s.contains("reply") {
            ClickAction::Reply
        } else if s.contains("forward") {
            ClickAction::Forward
        } else {
            ClickAction::Other(OTHER_ACTION.to_string())
        }
    }
}

impl From<String> for ClickAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "archive" => ClickAction::Archive,
            "delete" => ClickAction::Delete,
            "reply" => ClickAction::Reply,
            "reply_all" => ClickAction::ReplyAll,
            "forward" => ClickAction::Forward,
            _ => ClickAction::Other(name),
        }
    }
}

impl From<ClickAction> for String {
    fn from(action: ClickAction) -> Self {
        match action {
            ClickAction::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSwitchKind {
    VisibilityHidden,
    VisibilityVisible,
    Blur,
    Focus,
}

impl ContextSwitchKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "visibility_hidden" => Some(ContextSwitchKind::VisibilityHidden),
            "visibility_visible" => Some(ContextSwitchKind::VisibilityVisible),
            "blur" => Some(ContextSwitchKind::Blur),
            "focus" => Some(ContextSwitchKind::Focus),
            _ => None,
        }
    }
}

// ============================================================================
// EVENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventData {
    ClickAction {
        #[serde(default, deserialize_with = "lenient::click_action", skip_serializing_if = "Option::is_none")]
        action: Option<ClickAction>,
        #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none", alias = "threadId")]
        thread_id: Option<String>,
    },
    OpenThread {
        #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none", alias = "threadId")]
        thread_id: Option<String>,
    },
    BackToInbox,
    ReopenSameThread {
        #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none", alias = "threadId")]
        thread_id: Option<String>,
    },
    UndoAction,
    ContextSwitch {
        #[serde(default, deserialize_with = "lenient::context_switch_kind", skip_serializing_if = "Option::is_none")]
        kind: Option<ContextSwitchKind>,
    },
    HoverIndecision {
        #[serde(default, deserialize_with = "lenient::seconds")]
        seconds: f64,
    },
    TimeToFirstAction {
        #[serde(default, deserialize_with = "lenient::seconds")]
        seconds: f64,
    },
    DeferThread {
        #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    ManualOverload {
        #[serde(default, deserialize_with = "lenient::flag")]
        overloaded: bool,
    },
}

/// One interaction event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Epoch milliseconds
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: i64,
    #[serde(flatten)]
    pub data: EventData,
}

impl Event {
    pub fn new(timestamp: i64, data: EventData) -> Self {
        Self { timestamp, data }
    }

    pub fn kind(&self) -> EventKind {
        match &self.data {
            EventData::ClickAction { .. } => EventKind::ClickAction,
            EventData::OpenThread { .. } => EventKind::OpenThread,
            EventData::BackToInbox => EventKind::BackToInbox,
            EventData::ReopenSameThread { .. } => EventKind::ReopenSameThread,
            EventData::UndoAction => EventKind::UndoAction,
            EventData::ContextSwitch { .. } => EventKind::ContextSwitch,
            EventData::HoverIndecision { .. } => EventKind::HoverIndecision,
            EventData::TimeToFirstAction { .. } => EventKind::TimeToFirstAction,
            EventData::DeferThread { .. } => EventKind::DeferThread,
            EventData::ManualOverload { .. } => EventKind::ManualOverload,
        }
    }

    /// Thread id for thread-scoped kinds
    pub fn thread_id(&self) -> Option<&str> {
        match &self.data {
            EventData::ClickAction { thread_id, .. }
            | EventData::OpenThread { thread_id }
            | EventData::ReopenSameThread { thread_id } => thread_id.as_deref(),
            _ => None,
        }
    }

    // Constructors used by ingestion and the synthetic burst

    pub fn click(timestamp: i64, action: ClickAction) -> Self {
        Self::new(timestamp, EventData::ClickAction { action: Some(action), label: None, thread_id: None })
    }

    pub fn open_thread(timestamp: i64, thread_id: Option<String>) -> Self {
        Self::new(timestamp, EventData::OpenThread { thread_id })
    }

    pub fn reopen(timestamp: i64, thread_id: Option<String>) -> Self {
        Self::new(timestamp, EventData::ReopenSameThread { thread_id })
    }

    pub fn undo(timestamp: i64) -> Self {
        Self::new(timestamp, EventData::UndoAction)
    }

    pub fn context_switch(timestamp: i64, kind: Option<ContextSwitchKind>) -> Self {
        Self::new(timestamp, EventData::ContextSwitch { kind })
    }

    pub fn hover(timestamp: i64, seconds: f64) -> Self {
        Self::new(timestamp, EventData::HoverIndecision { seconds })
    }

    pub fn time_to_first_action(timestamp: i64, seconds: f64) -> Self {
        Self::new(timestamp, EventData::TimeToFirstAction { seconds })
    }
}
