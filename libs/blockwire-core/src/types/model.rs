use serde::{Deserialize, Serialize};

use super::{BlockwireError, BlockwireResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub default_attribute_id: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkType {
    pub name: String,
    pub collection_ids: [String; 2],
}

/// A document variable seeded into every workspace at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub collection_id: String,
}

/// One `(label, value)` entry of a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new<L: Into<String>, V: Into<String>>(label: L, value: V) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Domain records supplied once per session, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainModel {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub link_types: Vec<LinkType>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl DomainModel {
    pub fn from_json<S: AsRef<str>>(json: S) -> BlockwireResult<Self> {
        let model: Self = serde_json::from_str(json.as_ref())?;
        model.validate()?;

        Ok(model)
    }

    /// Link block types join both collection ids with `_`, so an id holding
    /// one cannot be decoded back.
    pub fn validate(&self) -> BlockwireResult {
        match self
            .collections
            .iter()
            .find(|collection| !is_valid_collection_id(&collection.id))
        {
            Some(collection) => Err(BlockwireError::InvalidCollectionId(collection.id.clone())),
            None => Ok(()),
        }
    }

    pub fn collection(&self, id: &str) -> BlockwireResult<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.id == id)
            .ok_or_else(|| BlockwireError::UnresolvedCollection(id.to_owned()))
    }
}

pub(crate) fn is_valid_collection_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('_')
}
