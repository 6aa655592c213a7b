/// Suffixes encoding a [TypeTag](crate::TypeTag) into a flat string.
pub mod suffix {
    /// `_document`
    pub const DOCUMENT: &str = "_document";

    /// `_document_array`
    pub const DOCUMENT_ARRAY: &str = "_document_array";

    /// `_link`
    pub const LINK: &str = "_link";

    /// `_array`
    pub const ARRAY: &str = "_array";
}

/// The built-in block types.
pub mod block {
    /// `foreach_document_array`
    pub const FOREACH_DOCUMENT_ARRAY: &str = "foreach_document_array";

    /// `get_attribute`
    pub const GET_ATTRIBUTE: &str = "get_attribute";

    /// `variables_get_`, followed by the document type of the variable
    pub const VARIABLES_GET_PREFIX: &str = "variables_get_";
}

/// Names of inputs and fields on the built-in blocks.
pub mod socket {
    /// variable picker of the foreach loop and of the document getters
    pub const VAR: &str = "VAR";

    /// list input of the foreach loop
    pub const LIST: &str = "LIST";

    /// statement input of the foreach loop
    pub const DO: &str = "DO";

    /// attribute dropdown of the attribute getter
    pub const ATTR: &str = "ATTR";

    /// document input of the attribute getter
    pub const DOCUMENT: &str = "DOCUMENT";

    /// document input of a link block
    pub const LINK_INPUT: &str = "NAME";
}

pub mod dropdown {
    /// label and value of the placeholder option
    pub const PLACEHOLDER: &str = "?";

    /// value of an attribute getter with nothing plugged in
    pub const NOT_APPLICABLE: &str = "N/A";
}

pub mod toolbox {
    /// `DOCUMENT_VARIABLES`
    pub const DOCUMENT_VARIABLES: &str = "DOCUMENT_VARIABLES";

    /// `LINKS`
    pub const LINKS: &str = "LINKS";

    /// gap in front of the attribute getter in the variables category
    pub const SEPARATOR_GAP: u32 = 48;
}

pub mod colour {
    pub const FOREACH: &str = "#e74c3c";
    pub const GET_ATTRIBUTE: &str = "#18bc9c";
    pub const LINK: &str = "#F7F7F7";
}

/// Environment keys read by [EditorConfig](crate::EditorConfig).
pub mod env {
    /// `BLOCKWIRE_SNAP_RADIUS`
    pub const SNAP_RADIUS: &str = "BLOCKWIRE_SNAP_RADIUS";

    /// `BLOCKWIRE_SHADE_PERCENT`
    pub const SHADE_PERCENT: &str = "BLOCKWIRE_SHADE_PERCENT";
}
