use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use super::{
    constants::toolbox, error, info, ConnectionEvent, ConnectionInterpreter, DomainModel, EditorConfig, SharedRegistry,
    TypeTag, WorkspaceAdapter,
};

/// A [ConnectionInterpreter] wired into one workspace.
///
/// Attaching installs the change listener and both toolbox categories and
/// declares the domain's document variables. The session must be detached
/// from the same workspace it was attached to.
pub struct EditorSession {
    interpreter: Arc<ConnectionInterpreter>,
    workspace_id: String,
    listener_id: String,
}

impl EditorSession {
    pub fn attach(
        workspace: &mut dyn WorkspaceAdapter,
        domain: DomainModel,
        registry: SharedRegistry,
        config: EditorConfig,
    ) -> Self {
        let interpreter = Arc::new(ConnectionInterpreter::new(domain, registry, config));

        for variable in &interpreter.domain().variables {
            let var_type = TypeTag::document(&variable.collection_id).to_string();
            workspace.create_variable(&variable.name, &var_type, None);
        }

        let listener_id = {
            let interpreter = interpreter.clone();
            workspace.add_change_listener(Box::new(
                move |workspace: &mut dyn WorkspaceAdapter, event: &ConnectionEvent| {
                    if let Err(e) = catch_unwind(AssertUnwindSafe(|| interpreter.handle(workspace, event))) {
                        error!("panic in change listener: {:?}", e);
                    }
                },
            ))
        };

        {
            let interpreter = interpreter.clone();
            workspace.register_category_callback(
                toolbox::DOCUMENT_VARIABLES,
                Box::new(move |workspace: &dyn WorkspaceAdapter| interpreter.document_variables(workspace)),
            );
        }
        {
            let interpreter = interpreter.clone();
            workspace.register_category_callback(
                toolbox::LINKS,
                Box::new(move |_: &dyn WorkspaceAdapter| interpreter.links()),
            );
        }

        info!(
            "attached to workspace {}, {} document variables",
            workspace.id(),
            interpreter.domain().variables.len()
        );

        Self {
            interpreter,
            workspace_id: workspace.id().to_owned(),
            listener_id,
        }
    }

    pub fn interpreter(&self) -> &ConnectionInterpreter {
        &self.interpreter
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Remove the listener and the toolbox categories installed by
    /// [EditorSession::attach].
    pub fn detach(self, workspace: &mut dyn WorkspaceAdapter) {
        if workspace.id() != self.workspace_id {
            error!(
                "detach session of workspace {} from workspace {}",
                self.workspace_id,
                workspace.id()
            );
            return;
        }

        workspace.remove_change_listener(&self.listener_id);
        workspace.remove_category_callback(toolbox::DOCUMENT_VARIABLES);
        workspace.remove_category_callback(toolbox::LINKS);
        info!("detached from workspace {}", self.workspace_id);
    }
}
