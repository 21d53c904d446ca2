use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::store::{StoreError, TodoStore};
use crate::task::{Task, TaskPatch};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("no task with id {0}")]
    NotFound(Uuid),
    #[error("unknown intent: {0}")]
    UnknownIntent(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {value}")]
    InvalidField {
        field: &'static str,
        value: String,
    },
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::EmptyDescription => Self::EmptyDescription,
            other => Self::Store(other),
        }
    }
}

impl ActionError {
    /// HTTP status class for the embedding layer, so it does not have to
    /// re-derive the taxonomy from error strings.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyDescription | Self::InvalidField { .. } => 422,
            Self::NotFound(_) => 404,
            Self::UnknownIntent(_) | Self::MissingField(_) => 400,
            Self::Store(_) => 500,
        }
    }
}

/// Every mutation the write endpoint accepts, one variant per form intent.
/// A closed enum instead of dispatch-by-string: adding an operation means
/// the compiler walks every match below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateTask { description: String },
    ToggleCompletion { id: Uuid, completed: bool },
    EditTask { id: Uuid },
    SaveTask { id: Uuid, description: String },
    DeleteTask { id: Uuid },
    ClearCompleted,
    DeleteAll,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateTask { .. } => "create task",
            Self::ToggleCompletion { .. } => "toggle completion",
            Self::EditTask { .. } => "edit task",
            Self::SaveTask { .. } => "save task",
            Self::DeleteTask { .. } => "delete task",
            Self::ClearCompleted => "clear completed",
            Self::DeleteAll => "delete all",
        }
    }

    /// Parses the decoded form pairs the HTTP layer hands over. The
    /// `intent` field selects the variant; the rest are its payload.
    #[instrument(skip(fields))]
    pub fn from_form(fields: &[(String, String)]) -> Result<Self, ActionError> {
        let field = |name: &'static str| {
            fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .ok_or(ActionError::MissingField(name))
        };

        let intent = field("intent")?;
        debug!(intent, "parsing submitted intent");

        match intent {
            "create task" => Ok(Self::CreateTask {
                description: field("description")?.to_string(),
            }),
            "toggle completion" => Ok(Self::ToggleCompletion {
                id: parse_id(field("id")?)?,
                completed: parse_completed(field("completed")?)?,
            }),
            "edit task" => Ok(Self::EditTask {
                id: parse_id(field("id")?)?,
            }),
            "save task" => Ok(Self::SaveTask {
                id: parse_id(field("id")?)?,
                description: field("description")?.to_string(),
            }),
            "delete task" => Ok(Self::DeleteTask {
                id: parse_id(field("id")?)?,
            }),
            "clear completed" => Ok(Self::ClearCompleted),
            "delete all" => Ok(Self::DeleteAll),
            other => Err(ActionError::UnknownIntent(other.to_string())),
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(raw).map_err(|_| ActionError::InvalidField {
        field: "id",
        value: raw.to_string(),
    })
}

fn parse_completed(raw: &str) -> Result<bool, ActionError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ActionError::InvalidField {
            field: "completed",
            value: other.to_string(),
        }),
    }
}

/// Applies one intent as a single store operation. Returns the created or
/// updated record where one exists; deletions and bulk intents return
/// `None` and the caller re-reads the full list.
#[instrument(skip(store, intent, now), fields(intent = intent.label()))]
pub fn dispatch(
    store: &TodoStore,
    intent: Intent,
    now: DateTime<Utc>,
) -> Result<Option<Task>, ActionError> {
    match intent {
        Intent::CreateTask { description } => {
            let task = store.create(&description, now)?;
            info!(id = %task.id, "created task");
            Ok(Some(task))
        }
        Intent::ToggleCompletion { id, completed } => {
            let next = !completed;
            let patch = TaskPatch {
                completed: Some(next),
                completed_at: Some(next.then_some(now)),
                ..Default::default()
            };
            let task = store.update(id, &patch)?;
            info!(id = %id, completed = next, "toggled completion");
            Ok(Some(task))
        }
        Intent::EditTask { id } => {
            let patch = TaskPatch {
                editing: Some(true),
                ..Default::default()
            };
            let task = store.update(id, &patch)?;
            info!(id = %id, "entered edit mode");
            Ok(Some(task))
        }
        Intent::SaveTask { id, description } => {
            if description.trim().is_empty() {
                // Rejected before the store is touched; the row stays in
                // edit mode.
                return Err(ActionError::EmptyDescription);
            }
            let patch = TaskPatch {
                description: Some(description.trim().to_string()),
                editing: Some(false),
                ..Default::default()
            };
            let task = store.update(id, &patch)?;
            info!(id = %id, "saved task");
            Ok(Some(task))
        }
        Intent::DeleteTask { id } => {
            store.delete(id)?;
            info!(id = %id, "deleted task");
            Ok(None)
        }
        Intent::ClearCompleted => {
            let removed = store.clear_completed()?;
            info!(removed, "cleared completed");
            Ok(None)
        }
        Intent::DeleteAll => {
            let removed = store.delete_all()?;
            info!(removed, "deleted all");
            Ok(None)
        }
    }
}
