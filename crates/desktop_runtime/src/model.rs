//! Window model for the desktop runtime.

use serde::{Deserialize, Serialize};
use training_contract::WindowId;

/// Stacking counter base; the first focused window lands above this.
pub const INITIAL_STACK_INDEX: u32 = 100;

/// Desktop-relative window position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
    /// Horizontal offset in px.
    pub x: i32,
    /// Vertical offset in px.
    pub y: i32,
}

impl Position {
    /// Returns this position shifted by the given deltas.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Window visibility state. `maximized` is an orthogonal flag on the
/// record, not a visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Visibility {
    /// Not displayed; the default for every window.
    #[default]
    Closed,
    /// Displayed and interactive.
    Open,
    /// Hidden to the taskbar but retaining its in-progress frame.
    Minimized,
}

/// Immutable registration-time snapshot a window is restored from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInit {
    /// Default position.
    pub position: Position,
    /// Default content reference.
    pub content_ref: String,
    /// When set, `reset` restores position only and leaves the content
    /// untouched (the quiz/terminal panel keeps in-progress state).
    pub preserve_content: bool,
}

impl WindowInit {
    /// Builds an initial snapshot at the default position.
    pub fn new(content_ref: impl Into<String>) -> Self {
        Self {
            position: Position::default(),
            content_ref: content_ref.into(),
            preserve_content: false,
        }
    }

    /// Marks the window's content as preserved across resets.
    pub fn preserve_content(mut self) -> Self {
        self.preserve_content = true;
        self
    }
}

/// One managed window. Windows are reusable containers; they are created
/// at registration and never destroyed for the life of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Stable panel id.
    pub id: WindowId,
    /// Visibility state.
    pub visibility: Visibility,
    /// Orthogonal maximized flag.
    pub maximized: bool,
    /// Last committed position.
    pub position: Position,
    /// Stacking index; higher renders above lower.
    pub stack_index: u32,
    /// Current content reference.
    pub content_ref: String,
    /// Registration-time snapshot.
    pub initial: WindowInit,
}

impl WindowRecord {
    /// Whether the window is currently displayed.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Open
    }
}

/// Authoritative window set plus stacking/focus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopState {
    /// Managed windows in registration order.
    pub windows: Vec<WindowRecord>,
    /// The single active window, if any.
    pub active_window: Option<WindowId>,
    /// Monotonic stacking counter; never reused, so stacking order is a
    /// strict total order by recency of focus.
    pub next_stack_index: u32,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            windows: Vec::new(),
            active_window: None,
            next_stack_index: INITIAL_STACK_INDEX,
        }
    }
}

impl DesktopState {
    /// Looks up a window by id.
    pub fn window(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|window| &window.id == id)
    }

    /// Looks up a window mutably by id.
    pub fn window_mut(&mut self, id: &WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|window| &window.id == id)
    }

    /// Highest stacking index currently assigned.
    pub fn max_stack_index(&self) -> u32 {
        self.windows
            .iter()
            .map(|window| window.stack_index)
            .max()
            .unwrap_or(INITIAL_STACK_INDEX)
    }
}

/// Pointer coordinates for drag gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPosition {
    /// Horizontal coordinate in px.
    pub x: i32,
    /// Vertical coordinate in px.
    pub y: i32,
}

/// One in-flight header-drag gesture, bound to exactly one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// Window the gesture is bound to.
    pub window_id: WindowId,
    /// Pointer position at gesture start.
    pub pointer_start: PointerPosition,
    /// Window position at gesture start.
    pub position_start: Position,
    /// Transient position tracking the pointer; committed on release.
    pub last_position: Position,
}

/// Transient interaction state. At most one gesture process-wide; the
/// physical input device is single-pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    /// Active drag gesture, if any.
    pub dragging: Option<DragSession>,
}
