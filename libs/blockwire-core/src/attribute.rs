use super::{Collection, DropdownOption};

/// Dropdown contents of an attribute getter bound to one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    /// `(attribute name, attribute id)` in the collection's attribute order
    pub options: Vec<DropdownOption>,
    /// display name of the default attribute, empty when there are no attributes
    pub default: String,
}

impl AttributeOptions {
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Resolve the attribute options of `collection`.
///
/// The default is the attribute matching the collection's default attribute
/// id, falling back to the first attribute.
pub fn options_for(collection: &Collection) -> AttributeOptions {
    let options = collection
        .attributes
        .iter()
        .map(|attribute| DropdownOption::new(&attribute.name, &attribute.id))
        .collect();

    let default = collection
        .default_attribute_id
        .as_ref()
        .and_then(|id| collection.attributes.iter().find(|attribute| &attribute.id == id))
        .or_else(|| collection.attributes.first())
        .map(|attribute| attribute.name.clone())
        .unwrap_or_default();

    AttributeOptions { options, default }
}
