use std::{collections::HashSet, sync::Arc};

use super::{
    super::{constants::toolbox::SEPARATOR_GAP, BlockDefinition, LinkType, ToolboxItem},
    *,
};

impl ConnectionInterpreter {
    pub fn ensure_document_block(&self, collection_id: &str) -> BlockwireResult<Arc<BlockDefinition>> {
        self.registry
            .write()
            .map_err(|_| BlockwireError::RegistryPoisoned)?
            .ensure_document_block(collection_id, &self.domain)
    }

    pub fn ensure_link_block(&self, link_type: &LinkType) -> BlockwireResult<Arc<BlockDefinition>> {
        self.registry
            .write()
            .map_err(|_| BlockwireError::RegistryPoisoned)?
            .ensure_link_block(link_type, &self.domain)
    }

    /// Contents of the document variables category: a getter for every
    /// document variable of the workspace, followed by the attribute getter.
    pub fn document_variables(&self, workspace: &dyn WorkspaceAdapter) -> Vec<ToolboxItem> {
        let mut items = workspace
            .all_variables()
            .into_iter()
            .filter_map(|variable| {
                let TypeTag::Document(collection_id) = TypeTag::parse(&variable.var_type) else {
                    return None;
                };
                match self.ensure_document_block(&collection_id) {
                    Ok(definition) => Some(ToolboxItem::Block {
                        block_type: definition.block_type.clone(),
                        variable: Some(variable),
                    }),
                    Err(e) => {
                        warn!("skip variable {}: {}", variable.name, e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        items.push(ToolboxItem::Separator { gap: SEPARATOR_GAP });
        items.push(ToolboxItem::Block {
            block_type: block::GET_ATTRIBUTE.into(),
            variable: None,
        });

        items
    }

    /// Contents of the links category, one block per linked pair of
    /// collections.
    pub fn links(&self) -> Vec<ToolboxItem> {
        let mut seen = HashSet::new();

        self.domain
            .link_types
            .iter()
            .filter_map(|link_type| match self.ensure_link_block(link_type) {
                Ok(definition) if seen.insert(definition.block_type.clone()) => Some(ToolboxItem::Block {
                    block_type: definition.block_type.clone(),
                    variable: None,
                }),
                Ok(definition) => {
                    debug!("link {} shares block {}", link_type.name, definition.block_type);
                    None
                }
                Err(e) => {
                    warn!("skip link {}: {}", link_type.name, e);
                    None
                }
            })
            .collect()
    }
}
