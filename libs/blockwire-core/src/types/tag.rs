use std::fmt;

use serde::{Deserialize, Serialize};

use super::{constants::suffix, BlockSnapshot};

/// Semantic type of a block output, encoded as a flat string on the host.
///
/// `Link` is the encoding of a link block *type*, its output is either
/// `Unknown` or the resolved `DocumentArray` of the counterpart collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TypeTag {
    Document(String),
    DocumentArray(String),
    Link(String, String),
    Array(Box<TypeTag>),
    #[default]
    Unknown,
}

impl TypeTag {
    pub fn document<S: Into<String>>(collection_id: S) -> Self {
        Self::Document(collection_id.into())
    }

    pub fn document_array<S: Into<String>>(collection_id: S) -> Self {
        Self::DocumentArray(collection_id.into())
    }

    pub fn link<A: Into<String>, B: Into<String>>(a: A, b: B) -> Self {
        Self::Link(a.into(), b.into())
    }

    /// Wrap `element` into an array. An array of documents is always a
    /// `DocumentArray`, both encode to the same string.
    pub fn array_of(element: TypeTag) -> Self {
        match element {
            Self::Document(id) => Self::DocumentArray(id),
            element => Self::Array(Box::new(element)),
        }
    }

    /// Parse a flat tag string. The longest suffix wins, `_document_array`
    /// must be matched before both `_document` and `_array`.
    pub fn parse<S: AsRef<str>>(raw: S) -> Self {
        let raw = raw.as_ref();

        if let Some(id) = raw.strip_suffix(suffix::DOCUMENT_ARRAY) {
            if !id.is_empty() {
                return Self::DocumentArray(id.to_owned());
            }
        } else if let Some(id) = raw.strip_suffix(suffix::DOCUMENT) {
            if !id.is_empty() {
                return Self::Document(id.to_owned());
            }
        } else if let Some(pair) = raw.strip_suffix(suffix::LINK) {
            if let Some((a, b)) = pair.split_once('_') {
                if !a.is_empty() && !b.is_empty() {
                    return Self::Link(a.to_owned(), b.to_owned());
                }
            }
        } else if let Some(element) = raw.strip_suffix(suffix::ARRAY) {
            match Self::parse(element) {
                Self::Unknown => {}
                element => return Self::Array(Box::new(element)),
            }
        }

        Self::Unknown
    }

    /// Tag of a block's output: the first entry of its output check.
    pub fn of(block: &BlockSnapshot) -> Self {
        block
            .output_check
            .as_ref()
            .and_then(|check| check.first())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Whether a host block type names a link block.
    pub fn is_link(block_type: &str) -> bool {
        matches!(Self::parse(block_type), Self::Link(..))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    pub fn is_document_array(&self) -> bool {
        matches!(self, Self::DocumentArray(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The collection referenced by a document or document array tag.
    pub fn collection_id(&self) -> Option<&str> {
        match self {
            Self::Document(id) | Self::DocumentArray(id) => Some(id),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<TypeTag> {
        match self {
            Self::DocumentArray(id) => Some(Self::Document(id.clone())),
            Self::Array(element) => Some(element.as_ref().clone()),
            _ => None,
        }
    }

    /// The side of a link opposite to `collection_id`, `None` if the
    /// collection is on neither side.
    pub fn counterpart(&self, collection_id: &str) -> Option<&str> {
        match self {
            Self::Link(a, b) if a == collection_id => Some(b),
            Self::Link(a, b) if b == collection_id => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(id) => write!(f, "{id}{}", suffix::DOCUMENT),
            Self::DocumentArray(id) => write!(f, "{id}{}", suffix::DOCUMENT_ARRAY),
            Self::Link(a, b) => write!(f, "{a}_{b}{}", suffix::LINK),
            Self::Array(element) => write!(f, "{element}{}", suffix::ARRAY),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl From<String> for TypeTag {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for TypeTag {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_longest_suffix_first() {
        assert_eq!(TypeTag::parse("c1_document"), TypeTag::document("c1"));
        assert_eq!(TypeTag::parse("c1_document_array"), TypeTag::document_array("c1"));
        assert_eq!(TypeTag::parse("c1_c2_link"), TypeTag::link("c1", "c2"));
        assert_eq!(
            TypeTag::parse("c1_c2_link_array"),
            TypeTag::Array(Box::new(TypeTag::link("c1", "c2")))
        );
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(TypeTag::parse(""), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("unknown"), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("Number"), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("_document"), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("_link"), TypeTag::Unknown);
        assert_eq!(TypeTag::parse("Number_array"), TypeTag::Unknown);
    }

    #[test]
    fn display() {
        assert_eq!(TypeTag::document("c1").to_string(), "c1_document");
        assert_eq!(TypeTag::document_array("c1").to_string(), "c1_document_array");
        assert_eq!(TypeTag::link("c1", "c2").to_string(), "c1_c2_link");
        assert_eq!(TypeTag::Unknown.to_string(), "unknown");

        let array = TypeTag::array_of(TypeTag::document("c1"));
        assert_eq!(array, TypeTag::document_array("c1"));
        assert_eq!(TypeTag::parse(array.to_string()), array);
    }

    #[test]
    fn predicates() {
        let document = TypeTag::document("c1");
        let array = TypeTag::document_array("c1");

        assert!(document.is_document());
        assert!(!document.is_document_array());
        assert!(array.is_document_array());
        assert_eq!(document.collection_id(), Some("c1"));
        assert_eq!(array.collection_id(), Some("c1"));
        assert_eq!(TypeTag::Unknown.collection_id(), None);
        assert_eq!(array.element(), Some(document.clone()));
        assert_eq!(document.element(), None);

        assert!(TypeTag::is_link("c1_c2_link"));
        assert!(!TypeTag::is_link("get_attribute"));
    }

    #[test]
    fn counterpart() {
        let link = TypeTag::link("c1", "c2");

        assert_eq!(link.counterpart("c1"), Some("c2"));
        assert_eq!(link.counterpart("c2"), Some("c1"));
        assert_eq!(link.counterpart("c3"), None);
        assert_eq!(TypeTag::document("c1").counterpart("c1"), None);
    }

    #[test]
    fn tag_of_block() {
        let mut block = BlockSnapshot {
            id: "b".into(),
            block_type: "variables_get_c1_document".into(),
            output_check: Some(vec!["c1_document".into(), "c2_document".into()]),
            output_connected: false,
        };
        assert_eq!(TypeTag::of(&block), TypeTag::document("c1"));

        block.output_check = None;
        assert_eq!(TypeTag::of(&block), TypeTag::Unknown);

        block.output_check = Some(vec![]);
        assert_eq!(TypeTag::of(&block), TypeTag::Unknown);
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&TypeTag::document_array("c1")).unwrap();
        assert_eq!(json, "\"c1_document_array\"");

        let tag: TypeTag = serde_json::from_str("\"c1_c2_link\"").unwrap();
        assert_eq!(tag, TypeTag::link("c1", "c2"));
    }
}
