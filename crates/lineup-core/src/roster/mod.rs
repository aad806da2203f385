// Starting XI / bench management.

pub mod drag;
pub mod state;

pub use drag::{Collection, DragGesture, DragReconciler, DropError, DropTarget, RosterChange};
pub use state::{Assignment, RosterError, RosterState};
