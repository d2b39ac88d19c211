//! Wire types shared with the scheduling service.
//!
//! Field names serialize in camelCase to match the service contract; the
//! structs carry no behavior beyond construction helpers.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// One calendar day plus the opening and closing time of the event,
/// as `YYYY-MM-DD` / `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A scheduling rule for one group. Every field is optional; a constraint
/// with nothing set carries no information and is dropped during
/// request sanitization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_overlap_with: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_break_minutes: Option<u32>,
}

impl Constraint {
    /// True when no field is set, i.e. the constraint is a no-op.
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none()
            && self.not_overlap_with.is_none()
            && self.earliest_start.is_none()
            && self.latest_end.is_none()
            && self.min_break_minutes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub window: TimeWindow,
    pub courts: Vec<Court>,
    pub groups: Vec<Group>,
    pub slot_minutes: u32,
    pub parallel_limit: u32,
    pub constraints: Vec<Constraint>,
    /// Open-ended extension mapping, forwarded to the service verbatim.
    #[serde(default)]
    pub options: JsonMap<String, JsonValue>,
}

/// One assignment in a produced schedule. Courts and groups are referenced
/// by identifier only; the response never re-embeds the request entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start: String,
    pub end: String,
    pub court_id: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A computed schedule. `id` is the opaque server-assigned plan
/// identifier; slot order is presentation order, not necessarily
/// chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

/// Returned by `POST /upload`. `path` is a server-side reference and is
/// opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    pub upload_id: String,
    pub filename: String,
    pub path: String,
}

/// Shape of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
}
