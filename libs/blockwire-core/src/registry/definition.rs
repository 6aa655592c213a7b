use serde::Serialize;

use super::*;

/// One argument of a block message, in the order of its `%n` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockArg {
    FieldIcon {
        icon: String,
        icon_color: String,
    },
    FieldLabel {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        class: Option<String>,
    },
    FieldVariable {
        name: String,
        /// Name of the variable created with the block, the host picks one
        /// when absent.
        variable: Option<String>,
        /// Types the picker may offer, any type when `None`.
        variable_types: Option<Vec<TypeTag>>,
        default_type: Option<TypeTag>,
    },
    FieldDropdown {
        name: String,
        options: Vec<DropdownOption>,
        /// Initially selected value, the first option when `None`.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    InputValue {
        name: String,
        /// Accepted output tags, anything connects when `None`.
        check: Option<Vec<TypeTag>>,
    },
    InputStatement {
        name: String,
    },
}

/// Output connection of a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockOutput {
    /// statement block, chained through previous/next connections
    Statement,
    Untyped,
    Typed(TypeTag),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockMessage {
    pub text: String,
    pub args: Vec<BlockArg>,
}

impl BlockMessage {
    pub fn new<S: Into<String>>(text: S, args: Vec<BlockArg>) -> Self {
        Self {
            text: text.into(),
            args,
        }
    }
}

/// Immutable template the host instantiates blocks from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockDefinition {
    pub block_type: String,
    pub messages: Vec<BlockMessage>,
    pub output: BlockOutput,
    pub colour: String,
}

impl BlockDefinition {
    pub fn args(&self) -> impl Iterator<Item = &BlockArg> {
        self.messages.iter().flat_map(|message| message.args.iter())
    }

    pub(super) fn foreach_document_array() -> Self {
        Self {
            block_type: constants::block::FOREACH_DOCUMENT_ARRAY.into(),
            messages: vec![
                BlockMessage::new(
                    "for each document %1 in %2",
                    vec![
                        BlockArg::FieldVariable {
                            name: socket::VAR.into(),
                            variable: None,
                            variable_types: None,
                            default_type: None,
                        },
                        BlockArg::InputValue {
                            name: socket::LIST.into(),
                            check: None,
                        },
                    ],
                ),
                BlockMessage::new(
                    "do this %1",
                    vec![BlockArg::InputStatement {
                        name: socket::DO.into(),
                    }],
                ),
            ],
            output: BlockOutput::Statement,
            colour: constants::colour::FOREACH.into(),
        }
    }

    pub(super) fn get_attribute() -> Self {
        Self {
            block_type: constants::block::GET_ATTRIBUTE.into(),
            messages: vec![BlockMessage::new(
                "get %1 of %2",
                vec![
                    BlockArg::FieldDropdown {
                        name: socket::ATTR.into(),
                        options: vec![DropdownOption::new(
                            constants::dropdown::PLACEHOLDER,
                            constants::dropdown::PLACEHOLDER,
                        )],
                        value: Some(constants::dropdown::NOT_APPLICABLE.into()),
                    },
                    BlockArg::InputValue {
                        name: socket::DOCUMENT.into(),
                        check: None,
                    },
                ],
            )],
            output: BlockOutput::Untyped,
            colour: constants::colour::GET_ATTRIBUTE.into(),
        }
    }

    /// Getter of a document variable of `collection`.
    pub(super) fn document_getter(collection: &Collection, shade_percent: f64) -> Self {
        let tag = TypeTag::document(&collection.id);
        let colour = shade_color(&collection.color, shade_percent).unwrap_or_else(|| {
            warn!("collection {} has invalid color {:?}", collection.id, collection.color);
            collection.color.clone()
        });

        Self {
            block_type: format!("{}{tag}", constants::block::VARIABLES_GET_PREFIX),
            messages: vec![BlockMessage::new(
                "%1 %2 %3",
                vec![
                    BlockArg::FieldIcon {
                        icon: collection.icon.clone(),
                        icon_color: collection.color.clone(),
                    },
                    BlockArg::FieldLabel {
                        text: collection.name.clone(),
                        class: None,
                    },
                    BlockArg::FieldVariable {
                        name: socket::VAR.into(),
                        variable: None,
                        variable_types: Some(vec![tag.clone()]),
                        default_type: Some(tag.clone()),
                    },
                ],
            )],
            output: BlockOutput::Typed(tag),
            colour,
        }
    }

    pub(super) fn link(block_type: String, link_type: &LinkType, first: &Collection, second: &Collection) -> Self {
        Self {
            block_type,
            messages: vec![BlockMessage::new(
                "%1%2 %3 %4",
                vec![
                    BlockArg::FieldIcon {
                        icon: first.icon.clone(),
                        icon_color: first.color.clone(),
                    },
                    BlockArg::FieldIcon {
                        icon: second.icon.clone(),
                        icon_color: second.color.clone(),
                    },
                    BlockArg::FieldLabel {
                        text: link_type.name.clone(),
                        class: Some("text-primary".into()),
                    },
                    BlockArg::InputValue {
                        name: socket::LINK_INPUT.into(),
                        check: Some(vec![TypeTag::document(&first.id), TypeTag::document(&second.id)]),
                    },
                ],
            )],
            output: BlockOutput::Typed(TypeTag::Unknown),
            colour: constants::colour::LINK.into(),
        }
    }
}
