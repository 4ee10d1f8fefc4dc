//! Core domain types for issuescope
//!
//! These types mirror an issue tracker export: one [`Issue`] per tracked issue,
//! each carrying its ordered [`Event`] history. Every field is optional on the
//! wire; partial records load with defaults instead of failing the dataset.
//!
//! Date fields keep their raw shape in [`DateValue`] and are only interpreted by
//! [`crate::temporal::normalize`], so a malformed date is never confused with a
//! missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================
// Dates
// ============================================

/// A date field exactly as it appeared in the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DateValue {
    /// Absent or `null`
    #[default]
    Missing,
    /// A string, not yet parsed
    Text(String),
    /// An already-parsed instant
    Instant(DateTime<Utc>),
    /// Any other JSON value (numbers, booleans, objects)
    Other(serde_json::Value),
}

impl DateValue {
    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DateValue::Missing,
            serde_json::Value::String(s) => DateValue::Text(s),
            other => DateValue::Other(other),
        }
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(ts: DateTime<Utc>) -> Self {
        DateValue::Instant(ts)
    }
}

impl From<&str> for DateValue {
    fn from(s: &str) -> Self {
        DateValue::Text(s.to_string())
    }
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(DateValue::from_json)
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DateValue::Missing => serializer.serialize_none(),
            DateValue::Text(s) => serializer.serialize_str(s),
            DateValue::Instant(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            DateValue::Other(v) => v.serialize(serializer),
        }
    }
}

// ============================================
// Issue state
// ============================================

/// Lifecycle state of an issue (string-valued in exports).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    Other(String),
}

impl IssueState {
    pub fn as_str(&self) -> &str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::Other(s) => s,
        }
    }
}

impl From<String> for IssueState {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "open" => IssueState::Open,
            "closed" => IssueState::Closed,
            _ => IssueState::Other(s),
        }
    }
}

impl From<IssueState> for String {
    fn from(state: IssueState) -> Self {
        state.as_str().to_string()
    }
}

// ============================================
// Events
// ============================================

/// Kind of an issue event.
///
/// The vocabulary is open-ended: kinds no analysis interprets are kept as
/// [`EventKind::Other`] and skipped by every analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Commented,
    Labeled,
    Unlabeled,
    Closed,
    Reopened,
    Assigned,
    #[default]
    Unknown,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Commented => "commented",
            EventKind::Labeled => "labeled",
            EventKind::Unlabeled => "unlabeled",
            EventKind::Closed => "closed",
            EventKind::Reopened => "reopened",
            EventKind::Assigned => "assigned",
            EventKind::Unknown => "",
            EventKind::Other(s) => s,
        }
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "commented" => EventKind::Commented,
            "labeled" => EventKind::Labeled,
            "unlabeled" => EventKind::Unlabeled,
            "closed" => EventKind::Closed,
            "reopened" => EventKind::Reopened,
            "assigned" => EventKind::Assigned,
            "" => EventKind::Unknown,
            _ => EventKind::Other(s),
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        EventKind::from(s.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in an issue's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    #[serde(rename = "event_type", default, deserialize_with = "null_as_default")]
    pub kind: EventKind,
    /// Who did it
    #[serde(default)]
    pub author: Option<String>,
    /// When it happened
    #[serde(default)]
    pub event_date: DateValue,
    /// Label payload of `labeled`/`unlabeled` events
    #[serde(default)]
    pub label: Option<String>,
    /// Body of `commented` events
    #[serde(default)]
    pub comment: Option<String>,
}

impl Event {
    /// Whether `author` wrote this event.
    pub fn is_by(&self, author: &str) -> bool {
        self.author.as_deref() == Some(author)
    }

    /// The label payload, if present and not blank.
    pub fn label_payload(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

// ============================================
// Issues
// ============================================

/// A tracked issue with its event history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number; numeric strings such as `"12"` or `"#12"` are accepted
    #[serde(default, deserialize_with = "lenient_number")]
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creator: String,
    /// A single string loads as a one-element list
    #[serde(default, deserialize_with = "string_or_list")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: IssueState,
    #[serde(default, deserialize_with = "string_or_list")]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub created_date: DateValue,
    #[serde(default)]
    pub updated_date: DateValue,
    #[serde(default)]
    pub closed_time: DateValue,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Events in recorded order (not guaranteed chronological)
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

impl Issue {
    /// Whether the issue carries exactly this label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    /// First event of the given kind in recorded order.
    pub fn first_event(&self, kind: &EventKind) -> Option<&Event> {
        self.events.iter().find(|e| &e.kind == kind)
    }
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a list, a single string, or `null` for list-valued fields.
///
/// Numeric and boolean elements are kept as text; nested values are dropped.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept an unsigned number or a numeric string; anything else is 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or_default(),
        serde_json::Value::String(s) => s
            .trim()
            .trim_start_matches('#')
            .parse()
            .unwrap_or_default(),
        _ => 0,
    })
}
