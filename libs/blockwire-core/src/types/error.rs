use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockwireError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("json error")]
    Json(#[from] serde_json::Error),
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
    #[error("block {0} is already disconnected")]
    AlreadyDisconnected(String),
    #[error("collection {0} not found")]
    UnresolvedCollection(String),
    #[error("collection id {0:?} must be non-empty and free of `_`")]
    InvalidCollectionId(String),
    #[error("block {0} not found")]
    BlockNotFound(String),
    #[error("block {block} has no input {input}")]
    InputNotFound { block: String, input: String },
    #[error("block {block} has no field {field}")]
    FieldNotFound { block: String, field: String },
    #[error("variable {0} not found")]
    VariableNotFound(String),
    #[error("block type {0} is not registered")]
    UnknownBlockType(String),
    #[error("cannot connect {child} into {parent}.{input}")]
    IncompatibleConnection { child: String, parent: String, input: String },
    #[error("block registry lock poisoned")]
    RegistryPoisoned,
    #[error("invalid config {key}: {value}")]
    Config { key: &'static str, value: String },
}

pub type BlockwireResult<T = (), E = BlockwireError> = Result<T, E>;
