use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::task::{Task, TaskPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no task with id {0}")]
    NotFound(Uuid),
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad record in {path} line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode task: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable task list, one JSON record per line, insertion order preserved.
/// Every mutation is a single load, change, atomic-save round trip, so a
/// failed write leaves the previous file contents intact.
#[derive(Debug)]
pub struct TodoStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
}

impl TodoStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::Write {
            path: data_dir.clone(),
            source,
        })?;

        let tasks_path = data_dir.join("tasks.data");
        if !tasks_path.exists() {
            fs::write(&tasks_path, "").map_err(|source| StoreError::Write {
                path: tasks_path.clone(),
                source,
            })?;
        }

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            "opened todo store"
        );

        Ok(Self {
            data_dir,
            tasks_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn read(&self) -> Result<Vec<Task>, StoreError> {
        load_jsonl(&self.tasks_path)
    }

    #[tracing::instrument(skip(self, description))]
    pub fn create(&self, description: &str, now: DateTime<Utc>) -> Result<Task, StoreError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::EmptyDescription);
        }

        let mut tasks = self.read()?;
        let task = Task::new(description.to_string(), now);
        tasks.push(task.clone());
        self.save(&tasks)?;

        debug!(id = %task.id, count = tasks.len(), "task created");
        Ok(task)
    }

    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    pub fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, StoreError> {
        if let Some(description) = &patch.description
            && description.trim().is_empty()
        {
            return Err(StoreError::EmptyDescription);
        }

        let mut tasks = self.read()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;

        task.apply(patch);
        let updated = task.clone();
        self.save(&tasks)?;

        debug!(id = %id, "task updated");
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tasks = self.read()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(StoreError::NotFound(id));
        }

        self.save(&tasks)?;
        debug!(id = %id, remaining = tasks.len(), "task deleted");
        Ok(())
    }

    /// Removes exactly the completed subset; returns how many went away.
    #[tracing::instrument(skip(self))]
    pub fn clear_completed(&self) -> Result<usize, StoreError> {
        let tasks = self.read()?;
        let before = tasks.len();
        let kept: Vec<Task> = tasks.into_iter().filter(|task| !task.completed).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.save(&kept)?;
        }

        info!(removed, remaining = kept.len(), "cleared completed tasks");
        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let removed = self.read()?.len();
        if removed > 0 {
            self.save(&[])?;
        }

        info!(removed, "deleted all tasks");
        Ok(removed)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        save_jsonl_atomic(&self.tasks_path, tasks)
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> Result<Vec<Task>, StoreError> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let task: Task = serde_json::from_str(trimmed).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        out.push(task);
    }

    debug!(count = out.len(), "loaded tasks from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, tasks))]
fn save_jsonl_atomic(path: &Path, tasks: &[Task]) -> Result<(), StoreError> {
    debug!(file = %path.display(), count = tasks.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    for task in tasks {
        let serialized = serde_json::to_string(task)?;
        writeln!(temp, "{serialized}").map_err(write_err)?;
    }
    temp.flush().map_err(write_err)?;

    temp.persist(path)
        .map_err(|err| write_err(err.error))
        .map(|_| ())
}
