//! Reducer actions, side-effect intents, and transition logic for the
//! window lifecycle.

use thiserror::Error;
use training_contract::{CloseGuard, CloseVerdict, WindowId};

use crate::model::{
    DesktopState, DragSession, InteractionState, PointerPosition, Visibility, WindowInit,
    WindowRecord,
};
use crate::window_manager::{raise_window, reset_window};

/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopAction {
    /// Register a window once; duplicates are silent no-ops.
    Register {
        /// Panel id.
        window_id: WindowId,
        /// Registration-time snapshot.
        init: WindowInit,
    },
    /// Open a window, resetting it first when it has no in-progress frame.
    Open {
        /// Window to open.
        window_id: WindowId,
    },
    /// Close a window, subject to its close guard.
    Close {
        /// Window to close.
        window_id: WindowId,
    },
    /// Minimize an open window.
    Minimize {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Flip the maximized flag.
    ToggleMaximize {
        /// Window to toggle.
        window_id: WindowId,
    },
    /// Focus (and raise) a window.
    Focus {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Restore a window to its registration-time snapshot.
    Reset {
        /// Window to reset.
        window_id: WindowId,
    },
    /// Begin a header-drag gesture.
    BeginMove {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at gesture start.
        pointer: PointerPosition,
    },
    /// Update the in-flight drag gesture.
    UpdateMove {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// End the drag gesture, committing its final position.
    EndMove,
    /// Close and reset every window, bypassing guards (system reset).
    CloseAll,
}

/// Side-effect intents emitted by [`reduce_desktop`] for the shell to
/// execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEffect {
    /// Re-run the panel-specific initialization hook for an opened window.
    ReinitPanel(WindowId),
    /// A guarded close was rejected; surface the warning in place of the
    /// state change.
    CloseRejected {
        /// Window whose close was rejected.
        window_id: WindowId,
        /// User-visible warning.
        warning: String,
    },
}

/// Reducer errors for actions referencing a missing window. Callers treat
/// these as silent no-ops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReducerError {
    /// The target window id is not registered.
    #[error("window not found")]
    WindowNotFound,
}

/// Applies a [`DesktopAction`] to the window state and collects resulting
/// side effects.
///
/// This function is the authoritative transition engine for window
/// visibility, stacking, and dragging. Close guards are injected per call;
/// there is no ambient guard registry.
///
/// # Errors
///
/// Returns [`ReducerError::WindowNotFound`] when an action references a
/// window that is not registered.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    guard: &dyn CloseGuard,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::Register { window_id, init } => {
            if state.window(&window_id).is_none() {
                state.windows.push(WindowRecord {
                    id: window_id,
                    visibility: Visibility::Closed,
                    maximized: false,
                    position: init.position,
                    stack_index: 0,
                    content_ref: init.content_ref.clone(),
                    initial: init,
                });
            }
        }
        DesktopAction::Open { window_id } => {
            let visibility = state
                .window(&window_id)
                .map(|window| window.visibility)
                .ok_or(ReducerError::WindowNotFound)?;
            // A window opened from Closed has no in-progress frame and is
            // restored to its initial snapshot first.
            if visibility == Visibility::Closed {
                reset_window(state, &window_id);
            }
            if let Some(window) = state.window_mut(&window_id) {
                window.visibility = Visibility::Open;
            }
            raise_window(state, &window_id);
            effects.push(RuntimeEffect::ReinitPanel(window_id));
        }
        DesktopAction::Close { window_id } => {
            if state.window(&window_id).is_none() {
                return Err(ReducerError::WindowNotFound);
            }
            match guard.check_close(&window_id) {
                CloseVerdict::Deny { warning } => {
                    effects.push(RuntimeEffect::CloseRejected { window_id, warning });
                }
                CloseVerdict::Allow => {
                    if let Some(window) = state.window_mut(&window_id) {
                        window.visibility = Visibility::Closed;
                    }
                    if state.active_window.as_ref() == Some(&window_id) {
                        state.active_window = None;
                    }
                }
            }
        }
        DesktopAction::Minimize { window_id } => {
            let window = state
                .window_mut(&window_id)
                .ok_or(ReducerError::WindowNotFound)?;
            if window.visibility == Visibility::Open {
                window.visibility = Visibility::Minimized;
            }
        }
        DesktopAction::ToggleMaximize { window_id } => {
            let window = state
                .window_mut(&window_id)
                .ok_or(ReducerError::WindowNotFound)?;
            // Un-maximizing renders at the last committed position, which
            // the maximized flag never overwrote.
            window.maximized = !window.maximized;
        }
        DesktopAction::Focus { window_id } => {
            if !raise_window(state, &window_id) {
                return Err(ReducerError::WindowNotFound);
            }
        }
        DesktopAction::Reset { window_id } => {
            if !reset_window(state, &window_id) {
                return Err(ReducerError::WindowNotFound);
            }
        }
        DesktopAction::BeginMove { window_id, pointer } => {
            let position = state
                .window(&window_id)
                .map(|window| window.position)
                .ok_or(ReducerError::WindowNotFound)?;
            raise_window(state, &window_id);
            interaction.dragging = Some(DragSession {
                window_id,
                pointer_start: pointer,
                position_start: position,
                last_position: position,
            });
        }
        DesktopAction::UpdateMove { pointer } => {
            if let Some(session) = interaction.dragging.as_mut() {
                let maximized = state
                    .window(&session.window_id)
                    .map(|window| window.maximized)
                    .unwrap_or(false);
                if !maximized {
                    let dx = pointer.x - session.pointer_start.x;
                    let dy = pointer.y - session.pointer_start.y;
                    session.last_position = session.position_start.offset(dx, dy);
                }
            }
        }
        DesktopAction::EndMove => {
            // Releasing outside any tracked target still commits the last
            // known position; no drag state survives the release.
            if let Some(session) = interaction.dragging.take() {
                if let Some(window) = state.window_mut(&session.window_id) {
                    window.position = session.last_position;
                }
            }
        }
        DesktopAction::CloseAll => {
            interaction.dragging = None;
            let ids: Vec<WindowId> = state.windows.iter().map(|window| window.id.clone()).collect();
            for id in ids {
                reset_window(state, &id);
                if let Some(window) = state.window_mut(&id) {
                    window.visibility = Visibility::Closed;
                }
            }
            state.active_window = None;
        }
    }
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use training_contract::AllowAllCloses;

    use super::*;
    use crate::model::Position;

    struct DenyTaskWindow;

    impl CloseGuard for DenyTaskWindow {
        fn check_close(&self, window: &WindowId) -> CloseVerdict {
            if window.as_str() == "task1-window" {
                CloseVerdict::Deny {
                    warning: "Please complete all emails before closing the window.".to_string(),
                }
            } else {
                CloseVerdict::Allow
            }
        }
    }

    fn register(state: &mut DesktopState, interaction: &mut InteractionState, id: &str) -> WindowId {
        let window_id = WindowId::trusted(id);
        reduce_desktop(
            state,
            interaction,
            &AllowAllCloses,
            DesktopAction::Register {
                window_id: window_id.clone(),
                init: WindowInit::new(format!("panel:{id}")),
            },
        )
        .expect("register window");
        window_id
    }

    fn open(state: &mut DesktopState, interaction: &mut InteractionState, id: &WindowId) {
        reduce_desktop(
            state,
            interaction,
            &AllowAllCloses,
            DesktopAction::Open {
                window_id: id.clone(),
            },
        )
        .expect("open window");
    }

    #[test]
    fn open_makes_the_window_visible_active_and_topmost() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tasks = register(&mut state, &mut interaction, "tasks-window");
        let tools = register(&mut state, &mut interaction, "tools-window");

        open(&mut state, &mut interaction, &tasks);
        open(&mut state, &mut interaction, &tools);

        let record = state.window(&tools).unwrap();
        assert!(record.is_visible());
        assert_eq!(record.stack_index, state.max_stack_index());
        assert_eq!(state.active_window, Some(tools));
    }

    #[test]
    fn open_emits_the_panel_reinit_hook() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tasks = register(&mut state, &mut interaction, "tasks-window");

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Open {
                window_id: tasks.clone(),
            },
        )
        .expect("open");
        assert_eq!(effects, vec![RuntimeEffect::ReinitPanel(tasks)]);
    }

    #[test]
    fn register_is_idempotent() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let id = register(&mut state, &mut interaction, "tasks-window");
        open(&mut state, &mut interaction, &id);
        let before = state.clone();

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Register {
                window_id: id,
                init: WindowInit::new("panel:other"),
            },
        )
        .expect("duplicate register");
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_window_is_an_error_the_caller_discards() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let before = state.clone();
        let result = reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Open {
                window_id: WindowId::trusted("ghost-window"),
            },
        );
        assert_eq!(result, Err(ReducerError::WindowNotFound));
        assert_eq!(state, before);
    }

    #[test]
    fn guarded_close_is_rejected_with_a_warning_and_no_state_change() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let task = register(&mut state, &mut interaction, "task1-window");
        open(&mut state, &mut interaction, &task);
        let before = state.clone();

        let effects = reduce_desktop(
            &mut state,
            &mut interaction,
            &DenyTaskWindow,
            DesktopAction::Close {
                window_id: task.clone(),
            },
        )
        .expect("close attempt");

        assert_eq!(state, before);
        assert_eq!(
            effects,
            vec![RuntimeEffect::CloseRejected {
                window_id: task,
                warning: "Please complete all emails before closing the window.".to_string(),
            }]
        );
    }

    #[test]
    fn unguarded_close_hides_the_window() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tools);

        reduce_desktop(
            &mut state,
            &mut interaction,
            &DenyTaskWindow,
            DesktopAction::Close {
                window_id: tools.clone(),
            },
        )
        .expect("close");
        assert_eq!(state.window(&tools).unwrap().visibility, Visibility::Closed);
        assert_eq!(state.active_window, None);
    }

    #[test]
    fn minimize_only_applies_to_open_windows() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Minimize {
                window_id: tools.clone(),
            },
        )
        .expect("minimize closed window");
        assert_eq!(state.window(&tools).unwrap().visibility, Visibility::Closed);

        open(&mut state, &mut interaction, &tools);
        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Minimize {
                window_id: tools.clone(),
            },
        )
        .expect("minimize open window");
        assert_eq!(
            state.window(&tools).unwrap().visibility,
            Visibility::Minimized
        );
    }

    #[test]
    fn reopening_a_minimized_window_keeps_its_frame() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tools);
        state.window_mut(&tools).unwrap().content_ref = "panel:in-progress".to_string();
        state.window_mut(&tools).unwrap().position = Position { x: 30, y: 40 };

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Minimize {
                window_id: tools.clone(),
            },
        )
        .expect("minimize");
        open(&mut state, &mut interaction, &tools);

        let record = state.window(&tools).unwrap();
        assert_eq!(record.content_ref, "panel:in-progress");
        assert_eq!(record.position, Position { x: 30, y: 40 });
    }

    #[test]
    fn reopening_a_closed_window_restores_its_initial_snapshot() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tools);
        state.window_mut(&tools).unwrap().content_ref = "panel:dirty".to_string();
        state.window_mut(&tools).unwrap().position = Position { x: 30, y: 40 };

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::Close {
                window_id: tools.clone(),
            },
        )
        .expect("close");
        open(&mut state, &mut interaction, &tools);

        let record = state.window(&tools).unwrap();
        assert_eq!(record.content_ref, "panel:tools-window");
        assert_eq!(record.position, Position::default());
    }

    #[test]
    fn maximize_toggles_and_unmaximize_keeps_last_committed_position() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tools);
        state.window_mut(&tools).unwrap().position = Position { x: 25, y: 35 };

        for _ in 0..2 {
            reduce_desktop(
                &mut state,
                &mut interaction,
                &AllowAllCloses,
                DesktopAction::ToggleMaximize {
                    window_id: tools.clone(),
                },
            )
            .expect("toggle");
        }

        let record = state.window(&tools).unwrap();
        assert!(!record.maximized);
        assert_eq!(record.position, Position { x: 25, y: 35 });
    }

    #[test]
    fn drag_updates_are_transient_until_release() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tools);

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::BeginMove {
                window_id: tools.clone(),
                pointer: PointerPosition { x: 10, y: 10 },
            },
        )
        .expect("begin move");
        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 35, y: 50 },
            },
        )
        .expect("update move");

        // Intermediate moves never touch the committed position.
        assert_eq!(state.window(&tools).unwrap().position, Position::default());
        assert_eq!(
            interaction.dragging.as_ref().unwrap().last_position,
            Position { x: 25, y: 40 }
        );

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::EndMove,
        )
        .expect("end move");
        assert_eq!(
            state.window(&tools).unwrap().position,
            Position { x: 25, y: 40 }
        );
        assert_eq!(interaction.dragging, None);
    }

    #[test]
    fn a_gesture_is_bound_to_one_window_and_begin_raises_it() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let tasks = register(&mut state, &mut interaction, "tasks-window");
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &tasks);
        open(&mut state, &mut interaction, &tools);

        reduce_desktop(
            &mut state,
            &mut interaction,
            &AllowAllCloses,
            DesktopAction::BeginMove {
                window_id: tasks.clone(),
                pointer: PointerPosition { x: 0, y: 0 },
            },
        )
        .expect("begin move");
        assert_eq!(state.active_window, Some(tasks.clone()));
        assert_eq!(interaction.dragging.as_ref().unwrap().window_id, tasks);
    }

    #[test]
    fn close_all_closes_and_resets_everything_ignoring_guards() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let task = register(&mut state, &mut interaction, "task1-window");
        let tools = register(&mut state, &mut interaction, "tools-window");
        open(&mut state, &mut interaction, &task);
        open(&mut state, &mut interaction, &tools);
        state.window_mut(&task).unwrap().position = Position { x: 12, y: 18 };

        reduce_desktop(
            &mut state,
            &mut interaction,
            &DenyTaskWindow,
            DesktopAction::CloseAll,
        )
        .expect("close all");

        for window in &state.windows {
            assert_eq!(window.visibility, Visibility::Closed);
            assert_eq!(window.position, Position::default());
        }
        assert_eq!(state.active_window, None);
    }
}
