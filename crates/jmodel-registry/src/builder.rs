use std::fmt;
use std::sync::Arc;

use jmodel_types::{ClassDetails, ModelError};
use thiserror::Error;

use crate::ClassRegistry;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BuildError {
    pub fn message(message: impl Into<String>) -> Self {
        BuildError::Message(message.into())
    }

    pub fn backend(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BuildError::Backend {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Constructs [`ClassDetails`] for a class name from some backend (reflection data, a
/// precomputed index, an ad hoc model, ...).
///
/// The registry invokes a builder at most once per name. Builders may resolve other classes
/// through `registry` (for example to intern supertype names with [`ClassRegistry::class_id`]).
/// A resolution that would wait on the build it is part of, whether on this thread or through
/// builders on other threads, fails with [`ModelError::CircularConstruction`].
///
/// Returning `Ok(None)` means "this backend does not know the class".
pub trait ClassDetailsBuilder: Send + Sync {
    fn build_class_details(
        &self,
        name: &str,
        registry: &ClassRegistry,
    ) -> Result<Option<ClassDetails>, BuildError>;
}

impl<F> ClassDetailsBuilder for F
where
    F: Fn(&str, &ClassRegistry) -> Result<Option<ClassDetails>, BuildError> + Send + Sync,
{
    fn build_class_details(
        &self,
        name: &str,
        registry: &ClassRegistry,
    ) -> Result<Option<ClassDetails>, BuildError> {
        self(name, registry)
    }
}

/// Knows no classes; for registries populated only through
/// [`ClassRegistry::add_class_details`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackend;

impl ClassDetailsBuilder for NoBackend {
    fn build_class_details(
        &self,
        _name: &str,
        _registry: &ClassRegistry,
    ) -> Result<Option<ClassDetails>, BuildError> {
        Ok(None)
    }
}

/// Asks each backend in turn; the first one that knows the class wins. Errors stop the chain.
#[derive(Clone, Default)]
pub struct ChainedBuilder {
    backends: Vec<Arc<dyn ClassDetailsBuilder>>,
}

impl ChainedBuilder {
    pub fn new(backends: Vec<Arc<dyn ClassDetailsBuilder>>) -> Self {
        Self { backends }
    }

    pub fn push(&mut self, backend: Arc<dyn ClassDetailsBuilder>) {
        self.backends.push(backend);
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for ChainedBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedBuilder")
            .field("backends", &self.backends.len())
            .finish()
    }
}

impl ClassDetailsBuilder for ChainedBuilder {
    fn build_class_details(
        &self,
        name: &str,
        registry: &ClassRegistry,
    ) -> Result<Option<ClassDetails>, BuildError> {
        for backend in &self.backends {
            if let Some(details) = backend.build_class_details(name, registry)? {
                return Ok(Some(details));
            }
        }
        Ok(None)
    }
}
