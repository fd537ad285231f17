//! Memoizing, thread-safe class directory for the `jmodel` type engine.
//!
//! [`ClassRegistry`] builds classes on demand through a [`ClassDetailsBuilder`], caches them by
//! name, and keeps a direct-subtype index up to date as classes are registered. It implements
//! [`jmodel_types::TypeEnv`], so relative resolution and erasure run directly against it.

#![forbid(unsafe_code)]

pub mod backends;
mod builder;
mod config;
mod names;
mod registry;
mod slot;
mod subtypes;
mod sync;

pub use crate::builder::{BuildError, ChainedBuilder, ClassDetailsBuilder, NoBackend};
pub use crate::config::{ConfigError, ConfigWarning, RegistryConfig};
pub use crate::registry::ClassRegistry;

pub use jmodel_types::{ClassDetails, ClassId, ClassRef, ModelError, Result};
