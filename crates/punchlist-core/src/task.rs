use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo record as it lives in the store and on the wire.
///
/// Serialized camelCase so the JSON shape matches what the frontend
/// expects (`completedAt`, `createdAt`). `completed_at` is present iff
/// `completed` is true; the dispatcher maintains that invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    pub description: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Inline-edit flag. This is UI state, but it rides on the record
    /// because every view is re-derived from the store on each request;
    /// a row in edit mode has to survive the round trip.
    #[serde(default)]
    pub editing: bool,
}

impl Task {
    pub fn new(description: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            completed: false,
            completed_at: None,
            created_at: Some(now),
            editing: false,
        }
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(editing) = patch.editing {
            self.editing = editing;
        }
    }
}

/// Partial update applied by the dispatcher. `None` leaves a field
/// untouched; the nested option on `completed_at` distinguishes
/// "set to this timestamp" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub editing: Option<bool>,
}
