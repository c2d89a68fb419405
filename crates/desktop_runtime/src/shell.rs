//! Workstation shell: composes the window reducer, the task engine, and
//! the storage scopes into the surface the renderer drives.
//!
//! The shell owns the only mutable references to desktop and engine state.
//! Every operation returns the list of [`UiUpdate`]s the renderer must
//! apply; the renderer itself holds no authoritative state.

use std::{cell::RefCell, rc::Rc};

use phishing_task::{AttemptCloseGuard, Classification, EngineEffect, TaskEngine};
use platform_storage::StorageScopes;
use training_contract::{CloseGuard, EmailId, TaskId, UiUpdate, WindowId};

use crate::model::{DesktopState, InteractionState, PointerPosition, Position, WindowInit};
use crate::reducer::{reduce_desktop, DesktopAction, RuntimeEffect};

/// Task-folder panel.
pub const TASKS_WINDOW: &str = "tasks-window";
/// Phishing exercise panel, guarded against mid-attempt closes.
pub const TASK1_WINDOW: &str = "task1-window";
/// Placeholder panel registered when task 1 is passed.
pub const TASK2_WINDOW: &str = "task2-window";
/// Terminal panel; its buffer survives window resets.
pub const TERMINAL_WINDOW: &str = "terminal-window";
/// Utilities launcher panel.
pub const TOOLS_WINDOW: &str = "tools-window";
/// Hash-cracking utility panel.
pub const MD5_CRACKER_WINDOW: &str = "md5-cracker-window";
/// Reference-material panel.
pub const LEARNING_WINDOW: &str = "learning-window";

const BASE_PANELS: [&str; 6] = [
    TASKS_WINDOW,
    TASK1_WINDOW,
    TERMINAL_WINDOW,
    TOOLS_WINDOW,
    MD5_CRACKER_WINDOW,
    LEARNING_WINDOW,
];

/// Top-level session object for one signed-in trainee.
pub struct Workstation {
    desktop: DesktopState,
    interaction: InteractionState,
    engine: Rc<RefCell<TaskEngine>>,
    guard: Box<dyn CloseGuard>,
    scopes: StorageScopes,
}

impl Workstation {
    /// Builds a workstation over a storage scope pair, restoring any
    /// persisted progress and registering the fixed panel set.
    ///
    /// Windows unlocked in a previous session are re-registered so a page
    /// reload renders the same desktop.
    pub fn new(scopes: StorageScopes) -> Self {
        let engine = Rc::new(RefCell::new(TaskEngine::with_default_content(
            scopes.clone(),
        )));
        let guard: Box<dyn CloseGuard> = Box::new(AttemptCloseGuard::new(
            Rc::clone(&engine),
            WindowId::trusted(TASK1_WINDOW),
        ));
        let mut shell = Self {
            desktop: DesktopState::default(),
            interaction: InteractionState::default(),
            engine,
            guard,
            scopes,
        };
        for (index, id) in BASE_PANELS.iter().enumerate() {
            shell.register_panel(id, index);
        }
        let restored_unlock = shell
            .engine
            .borrow()
            .task_completed(&TaskId::trusted(phishing_task::PHISHING_TASK_ID));
        if restored_unlock {
            shell.register_panel(TASK2_WINDOW, BASE_PANELS.len());
        }
        shell
    }

    /// Builds a workstation over in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(StorageScopes::in_memory())
    }

    /// Read access to the window state for rendering.
    pub fn desktop(&self) -> &DesktopState {
        &self.desktop
    }

    /// Read access to the task engine for rendering.
    pub fn engine(&self) -> &Rc<RefCell<TaskEngine>> {
        &self.engine
    }

    /// Opens a window, focusing it and re-running its panel hook.
    pub fn open_window(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::Open {
            window_id: window_id.clone(),
        })
    }

    /// Closes a window, subject to its close guard.
    pub fn close_window(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::Close {
            window_id: window_id.clone(),
        })
    }

    /// Minimizes an open window to the taskbar.
    pub fn minimize_window(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::Minimize {
            window_id: window_id.clone(),
        })
    }

    /// Toggles a window's maximized flag.
    pub fn toggle_maximize(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::ToggleMaximize {
            window_id: window_id.clone(),
        })
    }

    /// Focuses a window, raising it above all others.
    pub fn focus_window(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::Focus {
            window_id: window_id.clone(),
        })
    }

    /// Begins a header drag on a window.
    pub fn begin_move(&mut self, window_id: &WindowId, pointer: PointerPosition) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::BeginMove {
            window_id: window_id.clone(),
            pointer,
        })
    }

    /// Forwards a pointer move to the in-flight drag, if any.
    pub fn update_move(&mut self, pointer: PointerPosition) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::UpdateMove { pointer })
    }

    /// Ends the in-flight drag, committing its final position.
    pub fn end_move(&mut self) -> Vec<UiUpdate> {
        self.dispatch(DesktopAction::EndMove)
    }

    /// Opens the task behind a folder. Task 1 routes to the exercise
    /// window; unlocked later tasks route to their placeholder window.
    /// Tasks without a registered window still render the engine's
    /// unavailable placeholder instead of disappearing.
    pub fn start_task(&mut self, task: &TaskId) -> Vec<UiUpdate> {
        let window_id = WindowId::trusted(format!("task{}-window", task.as_str()));
        if self.desktop.window(&window_id).is_none() {
            let effects = self.engine.borrow_mut().start_task(task);
            return self.apply_engine_effects(effects);
        }
        self.open_window(&window_id)
    }

    /// Advances the introduction deck in the exercise panel.
    pub fn advance_intro(&mut self) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().advance_intro();
        self.apply_engine_effects(effects)
    }

    /// Selects an email in the exercise panel.
    pub fn select_email(&mut self, email: EmailId) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().select_email(email);
        self.apply_engine_effects(effects)
    }

    /// Judges the selected email.
    pub fn classify(&mut self, classification: Classification) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().classify(classification);
        self.apply_engine_effects(effects)
    }

    /// Reveals the hint for the selected email.
    pub fn request_hint(&mut self) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().request_hint();
        self.apply_engine_effects(effects)
    }

    /// Reveals the solution for the selected email, judging it.
    pub fn reveal_solution(&mut self) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().reveal_solution();
        self.apply_engine_effects(effects)
    }

    /// Acknowledges the pass/fail dialog.
    pub fn acknowledge_result(&mut self) -> Vec<UiUpdate> {
        let effects = self.engine.borrow_mut().acknowledge_result();
        self.apply_engine_effects(effects)
    }

    /// Wipes both storage scopes and restores the whole workstation to its
    /// first-run state. Bypasses close guards.
    pub fn reset_system(&mut self) -> Vec<UiUpdate> {
        self.scopes.clear_all();
        self.engine.borrow_mut().reset();
        let mut updates = self.dispatch(DesktopAction::CloseAll);
        updates.push(self.score_display());
        updates.push(UiUpdate::Folders(self.engine.borrow().folder_views()));
        updates
    }

    fn register_panel(&mut self, id: &str, index: usize) {
        let window_id = WindowId::trusted(id);
        let mut init = WindowInit::new(format!("panel:{id}"));
        // Registration order cascades default positions down the desktop.
        init.position = Position {
            x: 40 + 24 * index as i32,
            y: 40 + 24 * index as i32,
        };
        if id == TERMINAL_WINDOW {
            init = init.preserve_content();
        }
        // Registration never fails for a fresh id and duplicates are
        // no-ops, so the result carries no information here.
        let _ = reduce_desktop(
            &mut self.desktop,
            &mut self.interaction,
            self.guard.as_ref(),
            DesktopAction::Register { window_id, init },
        );
    }

    fn dispatch(&mut self, action: DesktopAction) -> Vec<UiUpdate> {
        match reduce_desktop(
            &mut self.desktop,
            &mut self.interaction,
            self.guard.as_ref(),
            action,
        ) {
            Ok(effects) => {
                let mut updates = Vec::new();
                for effect in effects {
                    match effect {
                        RuntimeEffect::ReinitPanel(window_id) => {
                            updates.extend(self.reinit_panel(&window_id));
                        }
                        RuntimeEffect::CloseRejected { window_id, warning } => {
                            updates.push(UiUpdate::CloseWarning {
                                window: window_id,
                                message: warning,
                            });
                        }
                    }
                }
                updates
            }
            // Actions referencing unknown windows are dropped without
            // rendering anything.
            Err(err) => {
                log::debug!("desktop action dropped: {err}");
                Vec::new()
            }
        }
    }

    fn reinit_panel(&mut self, window_id: &WindowId) -> Vec<UiUpdate> {
        match window_id.as_str() {
            TASKS_WINDOW => vec![UiUpdate::Folders(self.engine.borrow().folder_views())],
            id if id.starts_with("task") => {
                let task = TaskId::trusted(
                    id.trim_start_matches("task").trim_end_matches("-window"),
                );
                let effects = self.engine.borrow_mut().start_task(&task);
                self.apply_engine_effects(effects)
            }
            _ => vec![UiUpdate::ReinitPanel(window_id.clone())],
        }
    }

    fn apply_engine_effects(&mut self, effects: Vec<EngineEffect>) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        for effect in effects {
            match effect {
                EngineEffect::ScoreDelta(delta) => updates.push(UiUpdate::ScoreDelta(delta)),
                EngineEffect::RefreshScore => updates.push(self.score_display()),
                EngineEffect::View(view) => updates.push(UiUpdate::TaskPanel(view)),
                EngineEffect::UnlockTask(task) => {
                    let id = format!("task{}-window", task.as_str());
                    self.register_panel(&id, self.desktop.windows.len());
                    updates.push(UiUpdate::Folders(self.engine.borrow().folder_views()));
                }
            }
        }
        updates
    }

    fn score_display(&self) -> UiUpdate {
        let engine = self.engine.borrow();
        UiUpdate::ScoreDisplay {
            current: engine.current_task_score(),
            total: engine.total_score(),
            completed_tasks: engine.completed_task_count(),
            max_tasks: engine.max_tasks(),
        }
    }
}

impl std::fmt::Debug for Workstation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workstation")
            .field("desktop", &self.desktop)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}
