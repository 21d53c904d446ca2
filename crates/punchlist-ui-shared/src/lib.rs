//! View-model layer shared between the core and a (wasm-capable)
//! frontend: the task DTO as it crosses the wire, the table of in-flight
//! submissions, and the projection that turns both into render-ready
//! page state. Nothing here ever writes to the store; the projector only
//! reads outstanding submissions.

use std::collections::{
  BTreeMap,
  BTreeSet
};

use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

pub const CLEAR_COMPLETED_CONFIRM: &str =
  "Are you sure you want to clear all completed tasks?";
pub const DELETE_ALL_CONFIRM: &str =
  "Are you sure you want to delete all tasks?";

/// Task record as served by the read endpoint (camelCase JSON).
/// Timestamps stay opaque strings on this side of the wire.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:          Uuid,
  pub description: String,
  #[serde(default)]
  pub completed:   bool,
  pub completed_at: Option<String>,
  pub created_at:  Option<String>,
  #[serde(default)]
  pub editing:     bool
}

/// The intent shapes the projector cares about. Toggle/edit/save have no
/// optimistic treatment; they land here as `Other` and the row simply
/// waits for the authoritative re-render.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub enum PendingIntent {
  CreateTask,
  DeleteTask { id: Uuid },
  ClearCompleted,
  DeleteAll,
  Other
}

impl PendingIntent {
  pub fn label(&self) -> &'static str {
    match self {
      | Self::CreateTask => "create task",
      | Self::DeleteTask { .. } => "delete task",
      | Self::ClearCompleted => "clear completed",
      | Self::DeleteAll => "delete all",
      | Self::Other => "other"
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub enum SettleOutcome {
  Success,
  Failure
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Submission {
  pub request_id: Uuid,
  pub intent:     PendingIntent
}

/// Outstanding mutation requests, keyed by request id. Each entry lives
/// from `begin` until `settle`; settling removes it in both outcomes, so
/// a failed request falls back to whatever the store still says.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SubmissionTable {
  entries: BTreeMap<Uuid, Submission>
}

impl SubmissionTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin(
    &mut self,
    intent: PendingIntent
  ) -> Uuid {
    let request_id = Uuid::new_v4();
    self.entries.insert(
      request_id,
      Submission {
        request_id,
        intent
      }
    );
    request_id
  }

  /// Removes the entry regardless of outcome. No automatic retry: on
  /// failure the next render shows the record as the store has it,
  /// because no mutation happened.
  pub fn settle(
    &mut self,
    request_id: Uuid,
    _outcome: SettleOutcome
  ) -> Option<Submission> {
    self.entries.remove(&request_id)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = &Submission>
  {
    self.entries.values()
  }
}

/// What the in-flight set means for rendering: which controls are busy
/// and which rows should disappear before the server confirms.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
)]
pub struct Projection {
  pub adding:             bool,
  pub clearing_completed: bool,
  pub deleting_all:       bool,
  pub excluded_ids:       BTreeSet<Uuid>
}

impl Projection {
  pub fn of(
    table: &SubmissionTable
  ) -> Self {
    let mut projection =
      Self::default();

    for submission in table.iter() {
      match &submission.intent {
        | PendingIntent::CreateTask => {
          projection.adding = true;
        }
        | PendingIntent::DeleteTask {
          id
        } => {
          projection
            .excluded_ids
            .insert(*id);
        }
        | PendingIntent::ClearCompleted => {
          projection.clearing_completed =
            true;
        }
        | PendingIntent::DeleteAll => {
          projection.deleting_all = true;
        }
        | PendingIntent::Other => {}
      }
    }

    projection
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskRow {
  pub id:          Uuid,
  pub description: String,
  pub completed:   bool,
  pub completed_at: Option<String>,
  pub editing:     bool
}

/// Add-form state: while a create is in flight the submit control is
/// disabled and relabeled; when `busy` drops back to false the frontend
/// resets and refocuses the input.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct AddFormModel {
  pub busy:  bool,
  pub label: String
}

/// A destructive bulk-action button. `confirm` is the prompt shown
/// before anything is submitted; cancelling it means no submission ever
/// exists, so nothing reaches the dispatcher.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ActionButton {
  pub label:    String,
  pub disabled: bool,
  pub confirm:  String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct FilterTab {
  pub label:  String,
  pub value:  String,
  pub active: bool
}

/// Render-ready page state: store truth, narrowed by the view filter,
/// merged with the pending projection. Deterministic by construction;
/// no reliance on a framework re-rendering behind our back.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct PageModel {
  pub rows:            Vec<TaskRow>,
  pub items_left:      usize,
  pub add_form:        AddFormModel,
  pub clear_completed: ActionButton,
  pub delete_all:      ActionButton,
  pub tabs:            Vec<FilterTab>,
  pub theme:           String
}

impl PageModel {
  pub fn build(
    tasks: &[TaskDto],
    view: &str,
    projection: &Projection,
    theme: &str
  ) -> Self {
    let excluded =
      &projection.excluded_ids;

    let rows: Vec<TaskRow> =
      visible_tasks(tasks, view)
        .into_iter()
        .filter(|task| {
          !excluded.contains(&task.id)
        })
        .map(|task| TaskRow {
          id:           task.id,
          description:  task
            .description
            .clone(),
          completed:    task.completed,
          completed_at: task
            .completed_at
            .clone(),
          editing:      task.editing
        })
        .collect();

    let remaining = tasks
      .iter()
      .filter(|task| {
        !excluded.contains(&task.id)
      })
      .count();

    let any_completed = tasks
      .iter()
      .filter(|task| {
        !excluded.contains(&task.id)
      })
      .any(|task| task.completed);

    let add_form = AddFormModel {
      busy:  projection.adding,
      label: if projection.adding {
        "Adding...".to_string()
      } else {
        "Add".to_string()
      }
    };

    let clear_completed = ActionButton {
      label:    if projection
        .clearing_completed
      {
        "Clearing...".to_string()
      } else {
        "Clear Completed".to_string()
      },
      disabled: !any_completed
        || projection.clearing_completed,
      confirm:
        CLEAR_COMPLETED_CONFIRM
          .to_string()
    };

    let delete_all = ActionButton {
      label:    if projection.deleting_all
      {
        "Deleting...".to_string()
      } else {
        "Delete All".to_string()
      },
      disabled: remaining == 0
        || projection.deleting_all,
      confirm: DELETE_ALL_CONFIRM
        .to_string()
    };

    let tabs = ["all", "active", "completed"]
      .iter()
      .map(|value| FilterTab {
        label:  match *value {
          | "active" => "Active",
          | "completed" => "Completed",
          | _ => "All"
        }
        .to_string(),
        value:  value.to_string(),
        active: *value == view
          || (view != "active"
            && view != "completed"
            && *value == "all")
      })
      .collect();

    Self {
      rows,
      items_left: remaining,
      add_form,
      clear_completed,
      delete_all,
      tabs,
      theme: theme.to_string()
    }
  }
}

/// Order-preserving view narrowing; unknown view values behave as "all",
/// matching the server side.
pub fn visible_tasks<'a>(
  tasks: &'a [TaskDto],
  view: &str
) -> Vec<&'a TaskDto> {
  tasks
    .iter()
    .filter(|task| match view {
      | "active" => !task.completed,
      | "completed" => task.completed,
      | _ => true
    })
    .collect()
}
