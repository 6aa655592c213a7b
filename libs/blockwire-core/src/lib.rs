mod attribute;
mod config;
mod interpreter;
mod registry;
mod session;
mod types;
mod workspace;

pub mod constants;

pub use attribute::{options_for, AttributeOptions};
pub use config::EditorConfig;
pub use interpreter::ConnectionInterpreter;
pub use registry::{
    shade_color, BlockArg, BlockDefinition, BlockMessage, BlockOutput, BlockRegistry, DefinitionKey, SharedRegistry,
};
pub use session::EditorSession;
pub use tracing::{debug, error, info, trace, warn};
pub use types::{
    Attribute, BlockwireError, BlockwireResult, Collection, DomainModel, DropdownOption, LinkType, TypeTag, Variable,
};
pub use workspace::{
    BlockSnapshot, CategoryCallback, ChangeListener, ConnectionEvent, EventKind, FieldState, MemoryWorkspace,
    ToolboxItem, WorkspaceAdapter, WorkspaceVariable,
};
