//! Phishing-identification training task: content feed, persisted
//! progress, and the scoring/quiz state machine.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod content;
pub mod engine;
pub mod progress;

pub use engine::{
    AttemptCloseGuard, AttemptPhase, Classification, EngineEffect, SessionSnapshot, TaskEngine,
    CLOSE_GUARD_WARNING, CORRECT_REWARD, HINT_PENALTY, INCORRECT_PENALTY, PHISHING_TASK_ID,
    SESSION_KEY, SOLUTION_PENALTY,
};
pub use progress::{ProgressSnapshot, TaskProgress, MAX_TASKS, PROGRESS_KEY};
