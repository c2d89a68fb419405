//! Task progress engine for the phishing-identification exercise.
//!
//! Owns the attempt state machine, the per-email judged state, and the
//! scoring economy. Every mutating operation writes fresh profile and
//! session snapshots before returning, so a forced page close never loses
//! more than the operation in flight.

use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use serde::{Deserialize, Serialize};

use platform_storage::{load_typed, save_typed, StorageScopes};
use training_contract::{
    AnalysisView, CloseGuard, CloseVerdict, Email, EmailId, EmailListItem, ExerciseView,
    FolderView, Slide, TaskId, TaskView, WindowId,
};

use crate::{content, progress::TaskProgress, progress::MAX_TASKS};

/// Session-store key for the in-attempt cursor snapshot.
pub const SESSION_KEY: &str = "terminalState";

/// Task id of the phishing exercise.
pub const PHISHING_TASK_ID: &str = "1";

/// Warning surfaced when a guarded close is rejected.
pub const CLOSE_GUARD_WARNING: &str = "Please complete all emails before closing the window.";

/// Points for a correct classification.
pub const CORRECT_REWARD: i32 = 10;
/// Points for an incorrect classification.
pub const INCORRECT_PENALTY: i32 = -5;
/// Points for revealing a hint (at most once per email per attempt).
pub const HINT_PENALTY: i32 = -1;
/// Points for revealing the solution without classifying.
pub const SOLUTION_PENALTY: i32 = -5;

/// Attempt lifecycle for the active task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    /// No attempt underway.
    NotStarted,
    /// Introduction deck is on screen.
    IntroShown,
    /// Emails are being judged.
    InProgress,
    /// Final email judged and the threshold was met.
    Passed,
    /// Final email judged below the threshold.
    Failed,
}

/// User intent when judging an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The email is legitimate.
    Legitimate,
    /// The email is a phishing attempt.
    Phishing,
}

impl Classification {
    fn as_phishing(self) -> bool {
        matches!(self, Self::Phishing)
    }
}

/// Side effects emitted by engine operations for the shell to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEffect {
    /// Show a transient points-delta popup.
    ScoreDelta(i32),
    /// Re-render the score/progress indicators.
    RefreshScore,
    /// Re-render the task panel from this projection.
    View(TaskView),
    /// A task was passed; unlock this one.
    UnlockTask(TaskId),
}

/// Volatile in-attempt cursor, persisted under [`SESSION_KEY`].
///
/// Field names match the durable `terminalState` session schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Active task id, if any.
    pub current_task: Option<String>,
    /// Introduction slide cursor.
    pub current_slide: u32,
    /// Attempt score at snapshot time.
    pub score: i32,
    /// Index of the selected email in dataset order; `None` when nothing
    /// is selected.
    pub current_email: Option<u32>,
    /// Per-email hint flags in dataset order (`0`/`1`).
    pub hints_used: Vec<u8>,
    /// Passed task ids.
    pub completed_tasks: Vec<String>,
}

/// Stateful scoring engine for the phishing exercise.
pub struct TaskEngine {
    progress: TaskProgress,
    phase: AttemptPhase,
    current_task: Option<TaskId>,
    current_slide: usize,
    selected: Option<EmailId>,
    hints_used: BTreeSet<EmailId>,
    emails: Vec<Email>,
    slides: Vec<Slide>,
    scopes: StorageScopes,
}

impl TaskEngine {
    /// Builds an engine over a content feed and a storage scope pair,
    /// merging any persisted snapshots over defaults. Malformed persisted
    /// data falls back to defaults without failing.
    pub fn new(emails: Vec<Email>, slides: Vec<Slide>, scopes: StorageScopes) -> Self {
        let progress = TaskProgress::load(scopes.profile.as_ref());
        let session = load_typed::<SessionSnapshot>(scopes.session.as_ref(), SESSION_KEY);
        let mut engine = Self {
            progress,
            phase: AttemptPhase::NotStarted,
            current_task: None,
            current_slide: 0,
            selected: None,
            hints_used: BTreeSet::new(),
            emails,
            slides,
            scopes,
        };
        if let Some(session) = session {
            engine.current_slide = session.current_slide as usize;
            let hints: BTreeSet<EmailId> = session
                .hints_used
                .iter()
                .enumerate()
                .filter(|(_, used)| **used != 0)
                .filter_map(|(index, _)| engine.emails.get(index).map(|email| email.id))
                .collect();
            engine.hints_used = hints;
            engine.selected = session
                .current_email
                .and_then(|index| engine.emails.get(index as usize).map(|email| email.id));
            if let Some(raw) = session.current_task {
                let task = TaskId::trusted(raw);
                if !engine.progress.completed_tasks.contains(&task) {
                    engine.phase = if engine.progress.has_seen_intro {
                        AttemptPhase::InProgress
                    } else {
                        AttemptPhase::IntroShown
                    };
                    engine.current_task = Some(task);
                    // A snapshot taken after the final email was judged but
                    // before the result was acknowledged resumes at the
                    // pass/fail decision, not at a dead-end attempt.
                    if engine.phase == AttemptPhase::InProgress && engine.is_attempt_complete() {
                        engine.phase = if engine.passed_threshold() {
                            AttemptPhase::Passed
                        } else {
                            AttemptPhase::Failed
                        };
                    }
                }
            }
        }
        engine
    }

    /// Builds an engine over the canonical task 1 content.
    pub fn with_default_content(scopes: StorageScopes) -> Self {
        Self::new(content::task1_emails(), content::intro_slides(), scopes)
    }

    /// Current attempt phase.
    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Attempt score.
    pub fn current_task_score(&self) -> i32 {
        self.progress.current_task_score
    }

    /// Cumulative score across completed tasks.
    pub fn total_score(&self) -> i32 {
        self.progress.total_score
    }

    /// Number of passed tasks.
    pub fn completed_task_count(&self) -> u32 {
        self.progress.completed_tasks.len() as u32
    }

    /// Total task count for the progress indicator.
    pub fn max_tasks(&self) -> u32 {
        self.progress.max_tasks
    }

    /// Whether `task` has been passed.
    pub fn task_completed(&self, task: &TaskId) -> bool {
        self.progress.completed_tasks.contains(task)
    }

    /// Whether every email in the active dataset has been judged.
    pub fn is_attempt_complete(&self) -> bool {
        self.progress.completed_emails.len() == self.emails.len()
    }

    /// Maximum attainable attempt score.
    pub fn max_possible_score(&self) -> i32 {
        self.emails.len() as i32 * CORRECT_REWARD
    }

    /// Entry point for the task-folder UI.
    ///
    /// Unsupported ids render an unavailable placeholder; completed tasks
    /// render an already-completed notice; task 1 shows the introduction on
    /// first start this profile and otherwise resumes the attempt.
    pub fn start_task(&mut self, task: &TaskId) -> Vec<EngineEffect> {
        if self.progress.completed_tasks.contains(task) {
            return vec![EngineEffect::View(TaskView::AlreadyCompleted {
                task: task.clone(),
            })];
        }
        if task.as_str() != PHISHING_TASK_ID {
            return vec![EngineEffect::View(TaskView::Unavailable { task: task.clone() })];
        }
        self.current_task = Some(task.clone());
        if !self.progress.has_seen_intro {
            if self.slides.is_empty() {
                return self.begin_attempt();
            }
            self.phase = AttemptPhase::IntroShown;
            self.current_slide = 0;
            self.persist();
            return vec![EngineEffect::View(self.intro_view())];
        }
        self.phase = AttemptPhase::InProgress;
        self.persist();
        vec![
            EngineEffect::RefreshScore,
            EngineEffect::View(self.exercise_view(None)),
        ]
    }

    /// Advances the introduction deck; the final step begins the attempt.
    pub fn advance_intro(&mut self) -> Vec<EngineEffect> {
        if self.phase != AttemptPhase::IntroShown {
            return Vec::new();
        }
        self.current_slide += 1;
        if self.current_slide >= self.slides.len() {
            return self.begin_attempt();
        }
        self.persist();
        vec![EngineEffect::View(self.intro_view())]
    }

    /// Selects an email from the list. Judged emails are immutable and
    /// re-selecting one is a no-op.
    pub fn select_email(&mut self, email: EmailId) -> Vec<EngineEffect> {
        if self.phase != AttemptPhase::InProgress {
            return Vec::new();
        }
        if self.progress.completed_emails.contains(&email) {
            return Vec::new();
        }
        if !self.emails.iter().any(|candidate| candidate.id == email) {
            return Vec::new();
        }
        self.selected = Some(email);
        self.persist();
        vec![EngineEffect::View(self.exercise_view(None))]
    }

    /// Judges the selected email against its ground-truth label.
    pub fn classify(&mut self, classification: Classification) -> Vec<EngineEffect> {
        if self.phase != AttemptPhase::InProgress {
            return Vec::new();
        }
        let Some(email) = self.selected_email().cloned() else {
            return Vec::new();
        };
        if self.progress.completed_emails.contains(&email.id) {
            return Vec::new();
        }
        let correct = classification.as_phishing() == email.is_phishing;
        let delta = if correct {
            CORRECT_REWARD
        } else {
            INCORRECT_PENALTY
        };
        self.progress.current_task_score += delta;
        self.progress.completed_emails.insert(email.id);
        let mut effects = vec![
            EngineEffect::ScoreDelta(delta),
            EngineEffect::RefreshScore,
            EngineEffect::View(self.exercise_view(Some(AnalysisView::Verdict {
                correct,
                delta,
                solution: email.solution.clone(),
            }))),
        ];
        self.finish_if_complete(&mut effects);
        self.persist();
        effects
    }

    /// Reveals the hint for the selected email, at most once per email per
    /// attempt. Does not judge the email.
    pub fn request_hint(&mut self) -> Vec<EngineEffect> {
        if self.phase != AttemptPhase::InProgress {
            return Vec::new();
        }
        let Some(email) = self.selected_email().cloned() else {
            return Vec::new();
        };
        if self.progress.completed_emails.contains(&email.id)
            || self.hints_used.contains(&email.id)
        {
            return Vec::new();
        }
        self.hints_used.insert(email.id);
        self.progress.current_task_score += HINT_PENALTY;
        self.persist();
        vec![
            EngineEffect::ScoreDelta(HINT_PENALTY),
            EngineEffect::RefreshScore,
            EngineEffect::View(
                self.exercise_view(Some(AnalysisView::Hint(email.hint.clone()))),
            ),
        ]
    }

    /// Reveals the solution for the selected email, judging it without
    /// testing a classification.
    pub fn reveal_solution(&mut self) -> Vec<EngineEffect> {
        if self.phase != AttemptPhase::InProgress {
            return Vec::new();
        }
        let Some(email) = self.selected_email().cloned() else {
            return Vec::new();
        };
        if self.progress.completed_emails.contains(&email.id) {
            return Vec::new();
        }
        self.progress.current_task_score += SOLUTION_PENALTY;
        self.progress.completed_emails.insert(email.id);
        let mut effects = vec![
            EngineEffect::ScoreDelta(SOLUTION_PENALTY),
            EngineEffect::RefreshScore,
            EngineEffect::View(
                self.exercise_view(Some(AnalysisView::Solution(email.solution.clone()))),
            ),
        ];
        self.finish_if_complete(&mut effects);
        self.persist();
        effects
    }

    /// Acknowledges the pass/fail dialog. Passing folds the attempt score
    /// into the total, promotes the task, and unlocks the next one; failing
    /// starts a fresh attempt with the introduction skipped.
    pub fn acknowledge_result(&mut self) -> Vec<EngineEffect> {
        match self.phase {
            AttemptPhase::Passed => {
                let task = self
                    .current_task
                    .clone()
                    .unwrap_or_else(|| TaskId::trusted(PHISHING_TASK_ID));
                self.progress.total_score += self.progress.current_task_score;
                self.progress.completed_tasks.insert(task.clone());
                self.phase = AttemptPhase::NotStarted;
                self.current_task = None;
                self.selected = None;
                self.persist();
                let mut effects = vec![EngineEffect::RefreshScore];
                if let Some(next) = next_task_id(&task) {
                    effects.push(EngineEffect::UnlockTask(next));
                }
                effects
            }
            AttemptPhase::Failed => self.begin_attempt(),
            _ => Vec::new(),
        }
    }

    /// Restores the engine to its defaults. The caller is responsible for
    /// clearing the storage scopes; this never writes.
    pub fn reset(&mut self) {
        self.progress = TaskProgress::default();
        self.phase = AttemptPhase::NotStarted;
        self.current_task = None;
        self.current_slide = 0;
        self.selected = None;
        self.hints_used.clear();
    }

    /// Task-folder projection: a folder is unlocked when it is the first
    /// task or its predecessor has been passed.
    pub fn folder_views(&self) -> Vec<FolderView> {
        (1..=MAX_TASKS)
            .map(|number| {
                let task = TaskId::trusted(number.to_string());
                let completed = self.progress.completed_tasks.contains(&task);
                let unlocked = number == 1
                    || self
                        .progress
                        .completed_tasks
                        .contains(&TaskId::trusted((number - 1).to_string()));
                FolderView {
                    title: content::folder_title(&task, unlocked),
                    task,
                    unlocked,
                    completed,
                }
            })
            .collect()
    }

    fn begin_attempt(&mut self) -> Vec<EngineEffect> {
        self.progress.has_seen_intro = true;
        self.progress.current_task_score = 0;
        self.progress.completed_emails.clear();
        self.hints_used.clear();
        self.selected = None;
        self.current_task = Some(TaskId::trusted(PHISHING_TASK_ID));
        self.phase = AttemptPhase::InProgress;
        self.persist();
        vec![
            EngineEffect::RefreshScore,
            EngineEffect::View(self.exercise_view(None)),
        ]
    }

    fn passed_threshold(&self) -> bool {
        self.progress.current_task_score >= self.max_possible_score() / 2
    }

    fn finish_if_complete(&mut self, effects: &mut Vec<EngineEffect>) {
        if !self.is_attempt_complete() {
            return;
        }
        let max_score = self.max_possible_score();
        let passed = self.passed_threshold();
        self.phase = if passed {
            AttemptPhase::Passed
        } else {
            AttemptPhase::Failed
        };
        effects.push(EngineEffect::View(TaskView::Result {
            passed,
            score: self.progress.current_task_score,
            max_score,
        }));
    }

    fn selected_email(&self) -> Option<&Email> {
        let id = self.selected?;
        self.emails.iter().find(|email| email.id == id)
    }

    fn intro_view(&self) -> TaskView {
        let step = self.current_slide.min(self.slides.len().saturating_sub(1));
        TaskView::Intro {
            step,
            total: self.slides.len(),
            slide: self.slides[step].clone(),
        }
    }

    fn exercise_view(&self, analysis: Option<AnalysisView>) -> TaskView {
        let emails = self
            .emails
            .iter()
            .map(|email| EmailListItem {
                id: email.id,
                subject: email.subject.clone(),
                from: email.from.clone(),
                judged: self.progress.completed_emails.contains(&email.id),
                selected: self.selected == Some(email.id),
            })
            .collect();
        let hint_available = self.selected.is_some_and(|id| {
            !self.hints_used.contains(&id) && !self.progress.completed_emails.contains(&id)
        });
        TaskView::Exercise(ExerciseView {
            score: self.progress.current_task_score,
            emails,
            selected: self.selected_email().cloned(),
            hint_available,
            analysis,
        })
    }

    fn session_snapshot(&self) -> SessionSnapshot {
        let current_email = self
            .selected
            .and_then(|id| self.emails.iter().position(|email| email.id == id))
            .map(|index| index as u32);
        let hints_used = self
            .emails
            .iter()
            .map(|email| u8::from(self.hints_used.contains(&email.id)))
            .collect();
        SessionSnapshot {
            current_task: self.current_task.as_ref().map(|task| task.as_str().to_string()),
            current_slide: self.current_slide as u32,
            score: self.progress.current_task_score,
            current_email,
            hints_used,
            completed_tasks: self
                .progress
                .completed_tasks
                .iter()
                .map(|task| task.as_str().to_string())
                .collect(),
        }
    }

    fn persist(&self) {
        if let Err(err) = self.progress.save(self.scopes.profile.as_ref()) {
            log::warn!("task progress write failed, keeping in-memory state: {err}");
        }
        if let Err(err) = save_typed(
            self.scopes.session.as_ref(),
            SESSION_KEY,
            &self.session_snapshot(),
        ) {
            log::warn!("session state write failed, keeping in-memory state: {err}");
        }
    }
}

fn next_task_id(task: &TaskId) -> Option<TaskId> {
    let number: u32 = task.as_str().parse().ok()?;
    if number >= MAX_TASKS {
        return None;
    }
    Some(TaskId::trusted((number + 1).to_string()))
}

/// Close guard for the task window: denies closing while the active
/// attempt has unjudged emails.
pub struct AttemptCloseGuard {
    engine: Rc<RefCell<TaskEngine>>,
    window: WindowId,
}

impl AttemptCloseGuard {
    /// Guards `window` against closing before `engine` reports completion.
    pub fn new(engine: Rc<RefCell<TaskEngine>>, window: WindowId) -> Self {
        Self { engine, window }
    }
}

impl CloseGuard for AttemptCloseGuard {
    fn check_close(&self, window: &WindowId) -> CloseVerdict {
        if window != &self.window {
            return CloseVerdict::Allow;
        }
        let engine = self.engine.borrow();
        let task = TaskId::trusted(PHISHING_TASK_ID);
        if engine.task_completed(&task) || engine.is_attempt_complete() {
            CloseVerdict::Allow
        } else {
            CloseVerdict::Deny {
                warning: CLOSE_GUARD_WARNING.to_string(),
            }
        }
    }
}
