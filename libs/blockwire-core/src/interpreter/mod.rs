mod toolbox;

use tracing::info_span;

use super::{
    constants::{block, dropdown, socket},
    debug, error, info, options_for, warn, BlockSnapshot, BlockwireError, BlockwireResult, ConnectionEvent,
    DomainModel, DropdownOption, EditorConfig, EventKind, SharedRegistry, TypeTag, WorkspaceAdapter,
};

/// Propagates and validates types across a workspace graph, one
/// [ConnectionEvent] at a time.
///
/// Holds no per-workspace state: everything it knows about blocks is read
/// through the [WorkspaceAdapter] handed to [ConnectionInterpreter::handle].
pub struct ConnectionInterpreter {
    domain: DomainModel,
    registry: SharedRegistry,
    config: EditorConfig,
}

impl ConnectionInterpreter {
    pub fn new(domain: DomainModel, registry: SharedRegistry, config: EditorConfig) -> Self {
        Self {
            domain,
            registry,
            config,
        }
    }

    pub fn domain(&self) -> &DomainModel {
        &self.domain
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Apply one event. Faults are logged and never returned to the host.
    pub fn handle(&self, workspace: &mut dyn WorkspaceAdapter, event: &ConnectionEvent) {
        let span = info_span!("connection_event", workspace = %event.workspace_id, block = %event.block_id);
        let _guard = span.enter();
        info!("{:?}", event);

        let result = match event.kind() {
            EventKind::Connect { parent } => self.on_connect(workspace, &event.block_id, parent),
            EventKind::Disconnect { parent } => self.on_disconnect(workspace, &event.block_id, parent),
            EventKind::Other => Ok(()),
        };

        match result {
            Ok(()) => {}
            Err(e @ BlockwireError::UnresolvedCollection(_)) => warn!("skip refresh: {}", e),
            Err(e) => error!("failed to apply {:?}: {}", event, e),
        }
    }

    fn on_connect(&self, workspace: &mut dyn WorkspaceAdapter, child_id: &str, parent_id: &str) -> BlockwireResult {
        let (Some(child), Some(parent)) = (workspace.get_block(child_id), workspace.get_block(parent_id)) else {
            debug!("connected blocks are gone");
            return Ok(());
        };
        let tag = TypeTag::of(&child);

        if TypeTag::is_link(&parent.block_type) {
            if let TypeTag::Document(collection_id) = &tag {
                self.resolve_link(workspace, &parent, collection_id)?;
            }
        } else if parent.block_type == block::FOREACH_DOCUMENT_ARRAY
            && workspace.input_target(&parent.id, socket::LIST).as_deref() == Some(child.id.as_str())
        {
            self.bind_foreach_source(workspace, &parent, &tag)?;
        }

        if parent.block_type == block::GET_ATTRIBUTE {
            if let Some(collection_id) = tag.collection_id() {
                self.refresh_attributes(workspace, &parent, collection_id)?;
            }
        }

        Ok(())
    }

    fn on_disconnect(&self, workspace: &mut dyn WorkspaceAdapter, child_id: &str, parent_id: &str) -> BlockwireResult {
        let Some(parent) = workspace.get_block(parent_id) else {
            debug!("former parent is gone");
            return Ok(());
        };
        let tag = workspace
            .get_block(child_id)
            .map(|child| TypeTag::of(&child))
            .unwrap_or_default();

        if tag.is_document() && TypeTag::is_link(&parent.block_type) {
            self.reset_link(workspace, &parent)?;
        }

        if parent.block_type == block::GET_ATTRIBUTE {
            self.reset_attributes(workspace, &parent)?;
        }

        Ok(())
    }

    /// A document plugged into one side of a link yields the documents on
    /// the other side.
    fn resolve_link(
        &self,
        workspace: &mut dyn WorkspaceAdapter,
        link: &BlockSnapshot,
        collection_id: &str,
    ) -> BlockwireResult {
        match TypeTag::parse(&link.block_type).counterpart(collection_id) {
            Some(counterpart) => {
                let output = TypeTag::document_array(counterpart);
                debug!("resolve link {} to {}", link.id, output);
                workspace.set_output_type(&link.id, &output)
            }
            None => reject(
                workspace,
                link,
                socket::LINK_INPUT,
                BlockwireError::StructuralMismatch(format!(
                    "collection {collection_id} is not linked by {}",
                    link.block_type
                )),
            ),
        }
    }

    fn bind_foreach_source(
        &self,
        workspace: &mut dyn WorkspaceAdapter,
        foreach: &BlockSnapshot,
        tag: &TypeTag,
    ) -> BlockwireResult {
        let element = match tag {
            TypeTag::DocumentArray(_) => tag.element().unwrap_or_default(),
            _ => {
                return reject(
                    workspace,
                    foreach,
                    socket::LIST,
                    BlockwireError::StructuralMismatch(format!("foreach cannot iterate over {tag}")),
                )
            }
        };

        let variable_id = workspace
            .get_field(&foreach.id, socket::VAR)
            .map(|field| field.value)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| BlockwireError::FieldNotFound {
                block: foreach.id.clone(),
                field: socket::VAR.to_owned(),
            })?;
        debug!("retype loop variable {} to {}", variable_id, element);

        workspace.set_variable_type(&variable_id, &element.to_string())
    }

    fn refresh_attributes(
        &self,
        workspace: &mut dyn WorkspaceAdapter,
        getter: &BlockSnapshot,
        collection_id: &str,
    ) -> BlockwireResult {
        let options = options_for(self.domain.collection(collection_id)?);
        if options.is_empty() {
            debug!("collection {} has no attributes", collection_id);
            return Ok(());
        }

        workspace.replace_field_options(&getter.id, socket::ATTR, options.options)?;
        workspace.set_field_value(&getter.id, socket::ATTR, &options.default)
    }

    fn reset_link(&self, workspace: &mut dyn WorkspaceAdapter, link: &BlockSnapshot) -> BlockwireResult {
        if TypeTag::of(link).is_unknown() || workspace.input_target(&link.id, socket::LINK_INPUT).is_some() {
            return Ok(());
        }

        debug!("reset link {}", link.id);
        let holder = workspace.output_target(&link.id);
        workspace.set_output_type(&link.id, &TypeTag::Unknown)?;
        match workspace.disconnect_output(&link.id) {
            Ok(()) => {
                let offset = self.config.snap_radius;
                workspace.move_by(&link.id, offset, offset)?;
                // the host does not report programmatic disconnects
                match holder {
                    Some(holder) => self.on_disconnect(workspace, &link.id, &holder),
                    None => Ok(()),
                }
            }
            Err(BlockwireError::AlreadyDisconnected(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn reset_attributes(&self, workspace: &mut dyn WorkspaceAdapter, getter: &BlockSnapshot) -> BlockwireResult {
        if workspace.input_target(&getter.id, socket::DOCUMENT).is_some() {
            return Ok(());
        }

        let placeholder = vec![DropdownOption::new(dropdown::PLACEHOLDER, dropdown::PLACEHOLDER)];
        match workspace.get_field(&getter.id, socket::ATTR) {
            Some(field) if field.options == placeholder && field.value == dropdown::NOT_APPLICABLE => Ok(()),
            Some(_) => {
                debug!("reset attributes of {}", getter.id);
                workspace.replace_field_options(&getter.id, socket::ATTR, placeholder)?;
                workspace.set_field_value(&getter.id, socket::ATTR, dropdown::NOT_APPLICABLE)
            }
            None => Err(BlockwireError::FieldNotFound {
                block: getter.id.clone(),
                field: socket::ATTR.to_owned(),
            }),
        }
    }
}

/// Recover from a structural mismatch by emptying `input`.
fn reject(
    workspace: &mut dyn WorkspaceAdapter,
    parent: &BlockSnapshot,
    input: &str,
    reason: BlockwireError,
) -> BlockwireResult {
    warn!("reject connection into {}.{}: {}", parent.id, input, reason);
    match workspace.disconnect_input(&parent.id, input) {
        Ok(()) | Err(BlockwireError::AlreadyDisconnected(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
