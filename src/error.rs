use thiserror::Error;

use crate::id::BlockId;

/// Errors that can occur while loading or validating an [`EditorConfig`](crate::config::EditorConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// An image could not be fetched or decoded.
///
/// The engine treats this as "no image yet"; the message is only meant for logs.
#[derive(Debug, Clone, Error)]
#[error("Image source unavailable: {0}")]
pub struct SourceError(pub String);

impl From<image::ImageError> for SourceError {
    fn from(error: image::ImageError) -> Self {
        Self(error.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(error: std::io::Error) -> Self {
        Self(error.to_string())
    }
}

/// Errors that can occur while exporting the composited surface
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Blob sink rejected the export: {0}")]
    Sink(String),
}

/// A document edit referenced a node that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("Node {0} not found")]
    MissingNode(BlockId),

    #[error("Node {0} cannot be moved relative to itself")]
    SelfAnchor(BlockId),

    #[error("Node {0} cannot change its kind")]
    KindMismatch(BlockId),

    #[error("Node {0} has no width")]
    NoWidth(BlockId),
}

/// Errors that abort a block merge. The document is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Block {0} not found")]
    BlockNotFound(BlockId),

    #[error("Block {0} is not an image")]
    NotAnImage(BlockId),

    #[error("Merge edit was rejected: {0}")]
    Conflict(#[from] EditRejected),
}

/// Errors raised when an attribute bag does not fit the node schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Unknown node kind `{0}`")]
    UnknownKind(String),

    #[error("Unsupported schema version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("Invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Invalid attributes: {0}")]
    InvalidAttributes(#[from] serde_json::Error),
}
