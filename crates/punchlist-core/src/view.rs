use serde::{Deserialize, Serialize};

use crate::task::Task;

/// The active filter, derived from the `view` query parameter on every
/// request. Absent or unrecognized values fall back to `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    All,
    Active,
    Completed,
}

impl View {
    pub const ALL: [View; 3] = [View::All, View::Active, View::Completed];

    pub fn parse(param: Option<&str>) -> Self {
        match param {
            Some("active") => Self::Active,
            Some("completed") => Self::Completed,
            _ => Self::All,
        }
    }

    /// Value the filter tabs submit back as the `view` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Order-preserving subsequence of `tasks` satisfying this view.
    pub fn filter<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_tasks() -> Vec<Task> {
        let now = Utc::now();
        let mut tasks = vec![
            Task::new("one".to_string(), now),
            Task::new("two".to_string(), now),
            Task::new("three".to_string(), now),
            Task::new("four".to_string(), now),
        ];
        tasks[1].completed = true;
        tasks[1].completed_at = Some(now);
        tasks[3].completed = true;
        tasks[3].completed_at = Some(now);
        tasks
    }

    #[test]
    fn parse_defaults_to_all() {
        assert_eq!(View::parse(None), View::All);
        assert_eq!(View::parse(Some("bogus")), View::All);
        assert_eq!(View::parse(Some("active")), View::Active);
        assert_eq!(View::parse(Some("completed")), View::Completed);
    }

    #[test]
    fn every_view_yields_an_ordered_subsequence() {
        let tasks = sample_tasks();
        for view in View::ALL {
            let visible = view.filter(&tasks);

            // Every survivor satisfies the predicate.
            assert!(visible.iter().all(|task| view.matches(task)));

            // Original relative order is preserved.
            let positions: Vec<usize> = visible
                .iter()
                .map(|task| tasks.iter().position(|t| t.id == task.id).expect("member"))
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn active_and_completed_partition_the_list() {
        let tasks = sample_tasks();
        let active = View::Active.filter(&tasks);
        let completed = View::Completed.filter(&tasks);

        assert_eq!(active.len() + completed.len(), tasks.len());
        assert_eq!(View::All.filter(&tasks).len(), tasks.len());
        assert!(active.iter().all(|task| !task.completed));
        assert!(completed.iter().all(|task| task.completed));
    }
}
