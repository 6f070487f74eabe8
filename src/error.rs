//! # Error Types
//!
//! Evaluation itself never fails; these errors come from building a node
//! graph (registry definitions, scene files, textures).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// No factory is registered under this kind name
    #[error("Unknown node kind '{kind}'")]
    UnknownKind { kind: String },

    /// A node was configured without a child it cannot work without
    #[error("Node '{node}' is missing its required child '{key}'")]
    MissingChild { node: String, key: String },

    /// A name was defined twice in the same registry
    #[error("Duplicate node name '{name}'")]
    DuplicateName { name: String },

    /// Lookup of a name that was never defined
    #[error("Unknown node '{name}'")]
    UnknownNode { name: String },

    /// Malformed scene description
    #[error("Scene file error: {0}")]
    SceneFile(String),

    /// Texture loading or decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
