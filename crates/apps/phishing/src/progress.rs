//! Persisted task progress and its durable snapshot form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use platform_storage::{load_typed, save_typed, KeyValueStore, StorageError};
use training_contract::{EmailId, TaskId};

/// Profile-store key the progress snapshot is written under.
pub const PROGRESS_KEY: &str = "taskProgress";

/// Total number of gated training tasks.
pub const MAX_TASKS: u32 = 5;

/// Singleton progress state for the training session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    /// Cumulative score across completed tasks.
    pub total_score: i32,
    /// Score for the active task attempt.
    pub current_task_score: i32,
    /// Tasks that have been passed.
    pub completed_tasks: BTreeSet<TaskId>,
    /// Emails judged in the active attempt.
    pub completed_emails: BTreeSet<EmailId>,
    /// Whether the task introduction has been shown this profile.
    pub has_seen_intro: bool,
    /// Task count the progress indicator renders against.
    pub max_tasks: u32,
}

impl Default for TaskProgress {
    fn default() -> Self {
        Self {
            total_score: 0,
            current_task_score: 0,
            completed_tasks: BTreeSet::new(),
            completed_emails: BTreeSet::new(),
            has_seen_intro: false,
            max_tasks: MAX_TASKS,
        }
    }
}

impl TaskProgress {
    /// Projects the progress into its serializable snapshot (sets encoded
    /// as sorted sequences).
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_score: self.total_score,
            current_task_score: self.current_task_score,
            completed_tasks: self
                .completed_tasks
                .iter()
                .map(|task| task.as_str().to_string())
                .collect(),
            completed_emails: self.completed_emails.iter().map(|email| email.0).collect(),
            has_seen_intro: self.has_seen_intro,
            max_tasks: self.max_tasks,
        }
    }

    /// Rebuilds progress from a persisted snapshot, pinning `max_tasks` to
    /// the current constant regardless of what was stored.
    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            total_score: snapshot.total_score,
            current_task_score: snapshot.current_task_score,
            completed_tasks: snapshot
                .completed_tasks
                .into_iter()
                .map(TaskId::trusted)
                .collect(),
            completed_emails: snapshot.completed_emails.into_iter().map(EmailId).collect(),
            has_seen_intro: snapshot.has_seen_intro,
            max_tasks: MAX_TASKS,
        }
    }

    /// Loads progress from the profile store, merging the persisted
    /// snapshot over defaults. Absent or malformed data yields defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        load_typed::<ProgressSnapshot>(store, PROGRESS_KEY)
            .map(Self::from_snapshot)
            .unwrap_or_default()
    }

    /// Writes a fresh snapshot to the profile store.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when serialization or the store write
    /// fails; in-memory state is unaffected either way.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_typed(store, PROGRESS_KEY, &self.snapshot())
    }
}

/// Serializable projection of [`TaskProgress`].
///
/// Field names match the durable `taskProgress` profile schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Cumulative score across completed tasks.
    pub total_score: i32,
    /// Score for the active task attempt.
    pub current_task_score: i32,
    /// Passed task ids.
    pub completed_tasks: Vec<String>,
    /// Judged email ids for the active attempt.
    pub completed_emails: Vec<u32>,
    /// Whether the introduction has been shown.
    pub has_seen_intro: bool,
    /// Task count at snapshot time.
    pub max_tasks: u32,
}
