use serde::{Deserialize, Serialize};

use super::*;

/// Invoked by the host for every connection edit of the workspace graph.
pub type ChangeListener = Box<dyn FnMut(&mut dyn WorkspaceAdapter, &ConnectionEvent)>;

/// Invoked by the host when a toolbox category is opened, returns the
/// category contents.
pub type CategoryCallback = Box<dyn Fn(&dyn WorkspaceAdapter) -> Vec<ToolboxItem>>;

/// Read-only view of a host block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSnapshot {
    pub id: String,
    pub block_type: String,
    /// `None` for statement blocks and for outputs accepting anything
    pub output_check: Option<Vec<String>>,
    pub output_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub name: String,
    pub value: String,
    /// dropdown options, empty for other fields
    pub options: Vec<DropdownOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceVariable {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolboxItem {
    Block {
        block_type: String,
        /// variable preset into the block's `VAR` field
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable: Option<WorkspaceVariable>,
    },
    Separator {
        gap: u32,
    },
}

/// Capabilities of the host block-editing surface.
///
/// Mutations made through this trait are programmatic, a host must not
/// report them back through its change listeners.
pub trait WorkspaceAdapter {
    fn id(&self) -> &str;

    fn get_block(&self, block_id: &str) -> Option<BlockSnapshot>;

    fn create_variable(&mut self, name: &str, var_type: &str, id: Option<&str>) -> WorkspaceVariable;

    fn all_variables(&self) -> Vec<WorkspaceVariable>;

    fn set_variable_type(&mut self, variable_id: &str, var_type: &str) -> BlockwireResult;

    fn set_output_type(&mut self, block_id: &str, tag: &TypeTag) -> BlockwireResult;

    /// Fails with [BlockwireError::AlreadyDisconnected] when the output is
    /// not plugged anywhere.
    fn disconnect_output(&mut self, block_id: &str) -> BlockwireResult;

    /// Fails with [BlockwireError::AlreadyDisconnected] when the input is
    /// empty.
    fn disconnect_input(&mut self, block_id: &str, input: &str) -> BlockwireResult;

    /// Id of the block plugged into `input` of `block_id`.
    fn input_target(&self, block_id: &str, input: &str) -> Option<String>;

    /// Id of the block whose input holds the output of `block_id`.
    fn output_target(&self, block_id: &str) -> Option<String>;

    fn move_by(&mut self, block_id: &str, dx: f64, dy: f64) -> BlockwireResult;

    fn get_field(&self, block_id: &str, name: &str) -> Option<FieldState>;

    fn get_field_options(&self, block_id: &str, name: &str) -> Option<Vec<DropdownOption>> {
        self.get_field(block_id, name).map(|field| field.options)
    }

    fn set_field_value(&mut self, block_id: &str, name: &str, value: &str) -> BlockwireResult;

    fn replace_field_options(&mut self, block_id: &str, name: &str, options: Vec<DropdownOption>) -> BlockwireResult;

    fn register_category_callback(&mut self, name: &str, callback: CategoryCallback);

    fn remove_category_callback(&mut self, name: &str) -> bool;

    /// Returns an id for [WorkspaceAdapter::remove_change_listener].
    fn add_change_listener(&mut self, listener: ChangeListener) -> String;

    fn remove_change_listener(&mut self, listener_id: &str) -> bool;
}
