//! Shared window-manager transition helpers used by the desktop reducer.

use training_contract::WindowId;

use crate::model::{DesktopState, Visibility};

/// Makes `window_id` the active window and raises it above all others by
/// assigning the next value of the monotonic stacking counter.
///
/// Returns `true` when the window exists. Repeated calls are observably
/// idempotent aside from the counter increment.
pub fn raise_window(state: &mut DesktopState, window_id: &WindowId) -> bool {
    let next = state.next_stack_index.saturating_add(1);
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    window.stack_index = next;
    state.next_stack_index = next;
    state.active_window = Some(window_id.clone());
    true
}

/// Restores `window_id` to its registration-time snapshot: default
/// position, cleared minimize/maximize flags, and default content unless
/// the window preserves content across resets.
///
/// Never touches persisted task progress. Returns `true` when the window
/// exists.
pub fn reset_window(state: &mut DesktopState, window_id: &WindowId) -> bool {
    let Some(window) = state.window_mut(window_id) else {
        return false;
    };
    window.position = window.initial.position;
    window.maximized = false;
    if window.visibility == Visibility::Minimized {
        window.visibility = Visibility::Closed;
    }
    if !window.initial.preserve_content {
        window.content_ref = window.initial.content_ref.clone();
    }
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Position, WindowInit, WindowRecord};

    fn state_with(ids: &[&str]) -> DesktopState {
        let mut state = DesktopState::default();
        for id in ids {
            let init = WindowInit::new(format!("panel:{id}"));
            state.windows.push(WindowRecord {
                id: WindowId::trusted(*id),
                visibility: Visibility::Closed,
                maximized: false,
                position: init.position,
                stack_index: 0,
                content_ref: init.content_ref.clone(),
                initial: init,
            });
        }
        state
    }

    #[test]
    fn raising_assigns_a_strictly_increasing_stack_index() {
        let mut state = state_with(&["tasks-window", "tools-window"]);
        let tasks = WindowId::trusted("tasks-window");
        let tools = WindowId::trusted("tools-window");

        assert!(raise_window(&mut state, &tasks));
        let first = state.window(&tasks).unwrap().stack_index;
        assert!(raise_window(&mut state, &tools));
        let second = state.window(&tools).unwrap().stack_index;

        assert!(second > first);
        assert_eq!(state.active_window, Some(tools.clone()));
        assert_eq!(state.max_stack_index(), second);

        // Refocusing the same window still moves the counter forward.
        assert!(raise_window(&mut state, &tools));
        assert!(state.window(&tools).unwrap().stack_index > second);
    }

    #[test]
    fn raising_an_unknown_window_changes_nothing() {
        let mut state = state_with(&["tasks-window"]);
        let before = state.clone();
        assert!(!raise_window(&mut state, &WindowId::trusted("ghost-window")));
        assert_eq!(state, before);
    }

    #[test]
    fn reset_restores_position_and_content() {
        let mut state = state_with(&["tasks-window"]);
        let id = WindowId::trusted("tasks-window");
        {
            let window = state.window_mut(&id).unwrap();
            window.position = Position { x: 40, y: 60 };
            window.maximized = true;
            window.content_ref = "panel:dirty".to_string();
        }

        assert!(reset_window(&mut state, &id));
        let window = state.window(&id).unwrap();
        assert_eq!(window.position, Position::default());
        assert!(!window.maximized);
        assert_eq!(window.content_ref, "panel:tasks-window");
    }

    #[test]
    fn reset_keeps_content_for_preserving_windows() {
        let mut state = state_with(&["terminal-window"]);
        let id = WindowId::trusted("terminal-window");
        {
            let window = state.window_mut(&id).unwrap();
            window.initial.preserve_content = true;
            window.content_ref = "panel:in-progress".to_string();
        }

        assert!(reset_window(&mut state, &id));
        assert_eq!(
            state.window(&id).unwrap().content_ref,
            "panel:in-progress".to_string()
        );
    }
}
