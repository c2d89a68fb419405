//! Desktop window runtime: the window lifecycle reducer, drag handling,
//! and the workstation shell that hosts the training task.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod model;
pub mod reducer;
pub mod shell;
pub mod window_manager;

pub use model::{
    DesktopState, DragSession, InteractionState, PointerPosition, Position, Visibility,
    WindowInit, WindowRecord, INITIAL_STACK_INDEX,
};
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use shell::{
    Workstation, LEARNING_WINDOW, MD5_CRACKER_WINDOW, TASK1_WINDOW, TASK2_WINDOW, TASKS_WINDOW,
    TERMINAL_WINDOW, TOOLS_WINDOW,
};
pub use window_manager::{raise_window, reset_window};
