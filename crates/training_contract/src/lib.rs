//! Shared contract types between the desktop window runtime and managed
//! training tasks.
//!
//! The runtime and the task engine never reference each other directly;
//! everything they exchange (panel identifiers, close-guard verdicts,
//! static content records, and the render projections the UI consumes)
//! lives here.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Stable identifier for a desktop panel (`tasks-window`, `task1-window`,
/// `md5-cracker-window`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(String);

impl WindowId {
    /// Returns a window identifier when `raw` conforms to the dashed
    /// lowercase-segment panel id policy (`segment-...-window`).
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_window_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid window id `{raw}`; expected dashed lowercase segments ending in `window`"
            ))
        }
    }

    /// Creates an id without validation for compile-time trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_window_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }
    let mut count = 0usize;
    for part in raw.split('-') {
        count += 1;
        if part.is_empty() {
            return false;
        }
        if !part
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return false;
        }
    }
    count >= 2 && raw.ends_with("-window")
}

/// Stable identifier for a gated training task (`"1"` through `"5"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a raw task identifier. Any non-empty token is addressable;
    /// whether a task is actually available is the engine's concern.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err("task id must not be empty".to_string());
        }
        Ok(Self(raw))
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an email record inside a task dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EmailId(pub u32);

/// Read-only email record supplied by the content collaborator.
///
/// The engine never mutates these; `is_phishing` is the ground-truth label
/// a classification is scored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Dataset-unique id.
    pub id: EmailId,
    /// Subject line.
    pub subject: String,
    /// Sender address as displayed.
    pub from: String,
    /// Plain-text body.
    pub body: String,
    /// Ground-truth label.
    pub is_phishing: bool,
    /// Hint text revealed for a `-1` penalty.
    pub hint: String,
    /// Full solution text revealed on judging or direct reveal.
    pub solution: String,
}

/// One introduction slide (title plus body lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide heading.
    pub title: String,
    /// Body lines, rendered verbatim.
    pub lines: Vec<String>,
}

/// Outcome of consulting a [`CloseGuard`] before closing a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseVerdict {
    /// The close may proceed.
    Allow,
    /// The close is rejected; `warning` is surfaced in place of the state
    /// change.
    Deny {
        /// User-visible warning message.
        warning: String,
    },
}

/// Predicate consulted by the window runtime before a close operation.
///
/// Guards are injected explicitly into the reducer call; there is no global
/// guard registry.
pub trait CloseGuard {
    /// Returns whether `window` may close right now.
    fn check_close(&self, window: &WindowId) -> CloseVerdict;
}

/// Guard that permits every close. Baseline for tests and unguarded shells.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllCloses;

impl CloseGuard for AllowAllCloses {
    fn check_close(&self, _window: &WindowId) -> CloseVerdict {
        CloseVerdict::Allow
    }
}

/// One entry in the exercise email list projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailListItem {
    /// Email id.
    pub id: EmailId,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// Whether this email has been judged this attempt.
    pub judged: bool,
    /// Whether this email is the current selection.
    pub selected: bool,
}

/// Analysis-panel projection shown after a help or judging action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisView {
    /// Hint text for the selected email.
    Hint(String),
    /// Solution text after a direct reveal.
    Solution(String),
    /// Feedback after a classification.
    Verdict {
        /// Whether the classification matched the ground truth.
        correct: bool,
        /// Score delta applied.
        delta: i32,
        /// Solution text shown with the feedback.
        solution: String,
    },
}

/// Full exercise-panel projection for the active attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseView {
    /// Score for the current attempt.
    pub score: i32,
    /// Email list with per-item judged/selected state.
    pub emails: Vec<EmailListItem>,
    /// Currently selected email, if any.
    pub selected: Option<Email>,
    /// Whether the hint control is still available for the selection.
    pub hint_available: bool,
    /// Analysis panel content, if any.
    pub analysis: Option<AnalysisView>,
}

/// Render projection for a task panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskView {
    /// Introduction slide `step` of `total`.
    Intro {
        /// Zero-based slide index.
        step: usize,
        /// Total slide count.
        total: usize,
        /// Slide content.
        slide: Slide,
    },
    /// Active exercise state.
    Exercise(ExerciseView),
    /// Pass/fail dialog after the final email is judged.
    Result {
        /// Whether the attempt passed.
        passed: bool,
        /// Attempt score.
        score: i32,
        /// Maximum possible attempt score.
        max_score: i32,
    },
    /// Placeholder for a task that has already been completed.
    AlreadyCompleted {
        /// Task id.
        task: TaskId,
    },
    /// Placeholder for a task outside the supported set.
    Unavailable {
        /// Task id.
        task: TaskId,
    },
}

/// Task-folder projection for the tasks panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderView {
    /// Task behind the folder.
    pub task: TaskId,
    /// Display title (locked folders carry a locked title).
    pub title: String,
    /// Whether the folder can be opened.
    pub unlocked: bool,
    /// Whether the task behind it has been completed.
    pub completed: bool,
}

/// UI-facing updates emitted by the shell after a state mutation.
///
/// The renderer is a pure projection of these; it is never consulted for
/// decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Transient points-delta popup next to the score display.
    ScoreDelta(i32),
    /// Re-render the score/progress indicators.
    ScoreDisplay {
        /// Current attempt score.
        current: i32,
        /// Cumulative score across completed tasks.
        total: i32,
        /// Completed task count.
        completed_tasks: u32,
        /// Total task count.
        max_tasks: u32,
    },
    /// Re-render a task panel from a fresh projection.
    TaskPanel(TaskView),
    /// Re-render the task-folder list.
    Folders(Vec<FolderView>),
    /// A guarded close was rejected; render the warning in place of the
    /// close.
    CloseWarning {
        /// Window whose close was rejected.
        window: WindowId,
        /// Warning message.
        message: String,
    },
    /// Re-run the panel-specific initialization hook for a window.
    ReinitPanel(WindowId),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn window_id_policy_accepts_known_panels() {
        for raw in [
            "tasks-window",
            "task1-window",
            "tools-window",
            "md5-cracker-window",
            "terminal-window",
            "learning-window",
        ] {
            assert!(WindowId::new(raw).is_ok(), "expected `{raw}` to validate");
        }
    }

    #[test]
    fn window_id_policy_rejects_malformed_ids() {
        for raw in ["", "window", "Tasks-Window", "tasks_window", "tasks-", "-window"] {
            assert!(WindowId::new(raw).is_err(), "expected `{raw}` to be rejected");
        }
    }

    #[test]
    fn task_id_round_trips_through_display() {
        let id = TaskId::new("3").expect("task id");
        assert_eq!(id.to_string(), "3");
        assert_eq!(id.as_str(), "3");
    }

    #[test]
    fn allow_all_guard_always_allows() {
        let guard = AllowAllCloses;
        assert_eq!(
            guard.check_close(&WindowId::trusted("task1-window")),
            CloseVerdict::Allow
        );
    }
}
