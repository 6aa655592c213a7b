use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use blockwire_core::{info, MemoryWorkspace, ToolboxItem, WorkspaceAdapter};
use serde::Deserialize;

/// A recorded editing session. Blocks are named by script-local aliases,
/// the workspace assigns the real ids.
#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Drop a new block of a registered type.
    Create {
        id: String,
        #[serde(rename = "type")]
        block_type: String,
        /// name of an existing variable to preset
        #[serde(default)]
        variable: Option<String>,
    },
    Connect {
        child: String,
        parent: String,
        input: String,
    },
    Unplug {
        block: String,
    },
    /// Open a toolbox category, optionally dragging its `take`-th entry
    /// into the workspace as `id`.
    Category {
        name: String,
        #[serde(default)]
        take: Option<usize>,
        #[serde(default)]
        id: Option<String>,
    },
}

pub struct Replay<'a> {
    workspace: &'a mut MemoryWorkspace,
    aliases: HashMap<String, String>,
}

impl<'a> Replay<'a> {
    pub fn new(workspace: &'a mut MemoryWorkspace) -> Self {
        Self {
            workspace,
            aliases: HashMap::new(),
        }
    }

    pub fn run(&mut self, script: &Script) -> Result<()> {
        for (i, step) in script.steps.iter().enumerate() {
            info!("step {i}: {:?}", step);
            self.apply(step).with_context(|| format!("step {i} failed"))?;
        }
        Ok(())
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Create {
                id,
                block_type,
                variable,
            } => {
                let variable_id = match variable {
                    Some(name) => Some(
                        self.workspace
                            .all_variables()
                            .into_iter()
                            .find(|variable| &variable.name == name)
                            .ok_or_else(|| anyhow!("unknown variable {name}"))?
                            .id,
                    ),
                    None => None,
                };
                let block_id = self
                    .workspace
                    .create_block_with_variable(block_type, variable_id.as_deref())?;
                self.alias(id, block_id)
            }
            Step::Connect { child, parent, input } => {
                let (child, parent) = (self.resolve(child)?, self.resolve(parent)?);
                Ok(self.workspace.connect(&child, &parent, input)?)
            }
            Step::Unplug { block } => {
                let block = self.resolve(block)?;
                Ok(self.workspace.unplug(&block)?)
            }
            Step::Category { name, take, id } => {
                let items = self
                    .workspace
                    .open_category(name)
                    .ok_or_else(|| anyhow!("no toolbox category {name}"))?;
                info!("category {name}: {}", serde_json::to_string(&items)?);

                let Some(index) = take else {
                    return Ok(());
                };
                let item = items
                    .get(*index)
                    .ok_or_else(|| anyhow!("category {name} has no entry {index}"))?;
                let block_id = self
                    .workspace
                    .create_from_toolbox(item)?
                    .ok_or_else(|| anyhow!("entry {index} of {name} is not a block"))?;
                match id {
                    Some(id) => self.alias(id, block_id),
                    None => Ok(()),
                }
            }
        }
    }

    fn alias(&mut self, alias: &str, block_id: String) -> Result<()> {
        if self.aliases.insert(alias.to_owned(), block_id).is_some() {
            bail!("block alias {alias} is used twice");
        }
        Ok(())
    }

    fn resolve(&self, alias: &str) -> Result<String> {
        self.aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| anyhow!("unknown block alias {alias}"))
    }

    /// Real block id behind an alias.
    pub fn block_id(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}
