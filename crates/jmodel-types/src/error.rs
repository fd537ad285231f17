use std::sync::Arc;

use thiserror::Error;

pub type Result<T, E = ModelError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("unable to resolve class `{name}`: {reason}")]
    ClassResolution { name: String, reason: Arc<str> },

    #[error("construction of class `{name}` depends on itself")]
    CircularConstruction { name: String },

    #[error("`{declaring}` is reachable from `{viewpoint}` through paths with conflicting type arguments")]
    AmbiguousHierarchyPath { declaring: String, viewpoint: String },

    #[error("invalid array class name: {0}")]
    InvalidArrayName(String),

    #[error("`{class}` declares {expected} type parameter(s) but {found} argument(s) were given")]
    ArityMismatch {
        class: String,
        expected: usize,
        found: usize,
    },

    #[error("class name table is full")]
    NameTableFull,
}

impl ModelError {
    pub fn class_resolution(name: impl Into<String>, reason: impl Into<Arc<str>>) -> Self {
        ModelError::ClassResolution {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The class name this error is about, when there is one.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ModelError::ClassResolution { name, .. }
            | ModelError::CircularConstruction { name } => Some(name),
            ModelError::AmbiguousHierarchyPath { declaring, .. } => Some(declaring),
            ModelError::ArityMismatch { class, .. } => Some(class),
            ModelError::InvalidArgument(_)
            | ModelError::InvalidArrayName(_)
            | ModelError::NameTableFull => None,
        }
    }
}
