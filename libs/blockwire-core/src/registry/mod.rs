mod definition;

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{
    constants::{self, socket},
    info,
    types::is_valid_collection_id,
    warn, BlockwireError, BlockwireResult, Collection, DomainModel, DropdownOption, EditorConfig, LinkType, TypeTag,
};

pub use definition::{BlockArg, BlockDefinition, BlockMessage, BlockOutput};

pub type SharedRegistry = Arc<RwLock<BlockRegistry>>;

/// Structural identity of a block definition.
///
/// Link pairs are kept sorted, a link over `(a, b)` and one over `(b, a)`
/// share a single definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionKey {
    Foreach,
    GetAttribute,
    Collection(String),
    Link { a: String, b: String },
}

impl DefinitionKey {
    pub fn collection<S: Into<String>>(collection_id: S) -> Self {
        Self::Collection(collection_id.into())
    }

    pub fn link<A: Into<String>, B: Into<String>>(a: A, b: B) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self::Link { a, b }
        } else {
            Self::Link { a: b, b: a }
        }
    }

    pub fn of_link_type(link_type: &LinkType) -> Self {
        let [a, b] = &link_type.collection_ids;
        Self::link(a, b)
    }

    /// Name of the blocks the host instantiates from this definition.
    pub fn block_type(&self) -> String {
        match self {
            Self::Foreach => constants::block::FOREACH_DOCUMENT_ARRAY.into(),
            Self::GetAttribute => constants::block::GET_ATTRIBUTE.into(),
            Self::Collection(id) => format!("{}{}", constants::block::VARIABLES_GET_PREFIX, TypeTag::document(id)),
            Self::Link { a, b } => TypeTag::link(a, b).to_string(),
        }
    }

    pub fn from_block_type(block_type: &str) -> Option<Self> {
        match block_type {
            constants::block::FOREACH_DOCUMENT_ARRAY => Some(Self::Foreach),
            constants::block::GET_ATTRIBUTE => Some(Self::GetAttribute),
            _ => {
                if let Some(tag) = block_type.strip_prefix(constants::block::VARIABLES_GET_PREFIX) {
                    match TypeTag::parse(tag) {
                        TypeTag::Document(id) => Some(Self::Collection(id)),
                        _ => None,
                    }
                } else {
                    match TypeTag::parse(block_type) {
                        TypeTag::Link(a, b) => Some(Self::link(a, b)),
                        _ => None,
                    }
                }
            }
        }
    }
}

/// Lazily populated cache of block definitions, one per [DefinitionKey].
/// Entries are never replaced or evicted.
pub struct BlockRegistry {
    definitions: HashMap<DefinitionKey, Arc<BlockDefinition>>,
    shade_percent: f64,
}

impl BlockRegistry {
    pub fn new(config: &EditorConfig) -> Self {
        let mut definitions = HashMap::new();
        definitions.insert(
            DefinitionKey::Foreach,
            Arc::new(BlockDefinition::foreach_document_array()),
        );
        definitions.insert(DefinitionKey::GetAttribute, Arc::new(BlockDefinition::get_attribute()));

        Self {
            definitions,
            shade_percent: config.shade_percent,
        }
    }

    pub fn shared(config: &EditorConfig) -> SharedRegistry {
        Arc::new(RwLock::new(Self::new(config)))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<Arc<BlockDefinition>> {
        self.definitions.get(key).cloned()
    }

    /// Definition of a host block type.
    pub fn lookup(&self, block_type: &str) -> Option<Arc<BlockDefinition>> {
        DefinitionKey::from_block_type(block_type).and_then(|key| self.get(&key))
    }

    /// Getter block for documents of `collection_id`, synthesized on first use.
    pub fn ensure_document_block(
        &mut self,
        collection_id: &str,
        domain: &DomainModel,
    ) -> BlockwireResult<Arc<BlockDefinition>> {
        let key = DefinitionKey::collection(collection_id);
        if let Some(definition) = self.definitions.get(&key) {
            return Ok(definition.clone());
        }

        let collection = domain.collection(collection_id)?;
        let definition = Arc::new(BlockDefinition::document_getter(collection, self.shade_percent));
        info!("register block definition: {}", definition.block_type);
        self.definitions.insert(key, definition.clone());

        Ok(definition)
    }

    /// Link block for `link_type`, synthesized on first use.
    pub fn ensure_link_block(
        &mut self,
        link_type: &LinkType,
        domain: &DomainModel,
    ) -> BlockwireResult<Arc<BlockDefinition>> {
        let key = DefinitionKey::of_link_type(link_type);
        if let Some(definition) = self.definitions.get(&key) {
            return Ok(definition.clone());
        }

        let [first, second] = &link_type.collection_ids;
        if let Some(id) = [first, second].into_iter().find(|id| !is_valid_collection_id(id)) {
            return Err(BlockwireError::InvalidCollectionId(id.to_string()));
        }
        let (first, second) = (domain.collection(first)?, domain.collection(second)?);
        let definition = Arc::new(BlockDefinition::link(key.block_type(), link_type, first, second));
        info!("register block definition: {}", definition.block_type);
        self.definitions.insert(key, definition.clone());

        Ok(definition)
    }
}

/// Shade a `#rrggbb` colour towards white by `percent`, or towards black
/// when `percent` is negative. `None` when `color` is not a hex colour.
pub fn shade_color(color: &str, percent: f64) -> Option<String> {
    let hex = color.strip_prefix('#').filter(|hex| hex.len() == 6)?;
    let rgb = u32::from_str_radix(hex, 16).ok()?;

    let (target, percent) = if percent < 0.0 {
        (0.0, -percent)
    } else {
        (255.0, percent)
    };
    // rounds half up, negative halves included
    let shade = |channel: u32| {
        let channel = f64::from(channel);
        (((target - channel) * percent + 0.5).floor() + channel).clamp(0.0, 255.0) as u8
    };

    Some(format!(
        "#{:02x}{:02x}{:02x}",
        shade(rgb >> 16),
        shade((rgb >> 8) & 0xff),
        shade(rgb & 0xff)
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    fn domain() -> DomainModel {
        DomainModel::from_json(
            r##"{
                "collections": [
                    { "id": "c1", "name": "People", "icon": "fa-user", "color": "#336699" },
                    { "id": "c2", "name": "Cars", "icon": "fa-car", "color": "#000000" }
                ],
                "linkTypes": [{ "name": "owns", "collectionIds": ["c2", "c1"] }]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn builtin_definitions() {
        let registry = BlockRegistry::new(&EditorConfig::default());

        assert_eq!(registry.len(), 2);
        let foreach = registry.lookup("foreach_document_array").unwrap();
        assert_eq!(foreach.output, BlockOutput::Statement);
        let getter = registry.lookup("get_attribute").unwrap();
        assert_eq!(getter.output, BlockOutput::Untyped);
        assert!(getter.args().any(|arg| matches!(
            arg,
            BlockArg::FieldDropdown { name, options, value }
                if name == "ATTR"
                    && options == &[DropdownOption::new("?", "?")]
                    && value.as_deref() == Some("N/A")
        )));
    }

    #[test]
    fn ensure_document_block_is_idempotent() {
        let domain = domain();
        let mut registry = BlockRegistry::new(&EditorConfig::default());

        let first = registry.ensure_document_block("c1", &domain).unwrap();
        let second = registry.ensure_document_block("c1", &domain).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 3);
        assert_eq!(first.block_type, "variables_get_c1_document");
        assert_eq!(first.output, BlockOutput::Typed(TypeTag::document("c1")));
        assert_eq!(first.colour, "#99b3cc");
        assert!(Arc::ptr_eq(
            &registry.lookup("variables_get_c1_document").unwrap(),
            &first
        ));
    }

    #[test]
    fn ensure_document_block_unresolved() {
        let mut registry = BlockRegistry::new(&EditorConfig::default());

        assert!(registry.ensure_document_block("missing", &domain()).is_err());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ensure_link_block() {
        let domain = domain();
        let mut registry = BlockRegistry::new(&EditorConfig::default());

        let link = registry.ensure_link_block(&domain.link_types[0], &domain).unwrap();
        assert_eq!(link.block_type, "c1_c2_link");
        assert_eq!(link.output, BlockOutput::Typed(TypeTag::Unknown));
        assert!(link.args().any(|arg| matches!(
            arg,
            BlockArg::InputValue { name, check: Some(check) }
                if name == "NAME" && check == &[TypeTag::document("c2"), TypeTag::document("c1")]
        )));

        let reversed = LinkType {
            name: "owned by".into(),
            collection_ids: ["c1".into(), "c2".into()],
        };
        let again = registry.ensure_link_block(&reversed, &domain).unwrap();
        assert!(Arc::ptr_eq(&link, &again));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn ensure_link_block_rejects_ambiguous_ids() {
        let collection = |id: &str| Collection {
            id: id.into(),
            name: id.into(),
            icon: "fa-box".into(),
            color: "#000000".into(),
            default_attribute_id: None,
            attributes: vec![],
        };
        // built in code, bypassing the checks of `DomainModel::from_json`
        let domain = DomainModel {
            collections: vec![collection("a_b"), collection("c")],
            link_types: vec![LinkType {
                name: "holds".into(),
                collection_ids: ["a_b".into(), "c".into()],
            }],
            variables: vec![],
        };
        let mut registry = BlockRegistry::new(&EditorConfig::default());

        assert!(matches!(
            registry.ensure_link_block(&domain.link_types[0], &domain),
            Err(BlockwireError::InvalidCollectionId(id)) if id == "a_b"
        ));
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a_b_c_link").is_none());
    }

    #[test]
    fn definition_keys() {
        assert_eq!(DefinitionKey::link("b", "a"), DefinitionKey::link("a", "b"));
        assert_eq!(
            DefinitionKey::from_block_type("variables_get_c1_document"),
            Some(DefinitionKey::collection("c1"))
        );
        assert_eq!(
            DefinitionKey::from_block_type("c2_c1_link"),
            Some(DefinitionKey::link("c1", "c2"))
        );
        assert_eq!(DefinitionKey::from_block_type("variables_get_c1_link"), None);
        assert_eq!(DefinitionKey::from_block_type("math_number"), None);
        assert_eq!(DefinitionKey::collection("c1").block_type(), "variables_get_c1_document");
    }

    #[test]
    fn shade() {
        assert_eq!(shade_color("#000000", 0.5).as_deref(), Some("#808080"));
        assert_eq!(shade_color("#336699", 0.5).as_deref(), Some("#99b3cc"));
        assert_eq!(shade_color("#ffffff", -0.5).as_deref(), Some("#808080"));
        assert_eq!(shade_color("#ff0000", 0.0).as_deref(), Some("#ff0000"));
        assert_eq!(shade_color("red", 0.5), None);
        assert_eq!(shade_color("#12345", 0.5), None);
    }
}
