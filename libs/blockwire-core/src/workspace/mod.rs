mod adapter;
mod event;
mod memory;

use super::*;

pub use adapter::{BlockSnapshot, CategoryCallback, ChangeListener, FieldState, ToolboxItem, WorkspaceAdapter, WorkspaceVariable};
pub use event::{ConnectionEvent, EventKind};
pub use memory::MemoryWorkspace;
