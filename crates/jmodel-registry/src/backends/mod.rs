//! Builders that ship with the registry.
//!
//! Real backends (reflection data, precomputed indexes) live with their callers and implement
//! [`crate::ClassDetailsBuilder`] directly.

mod minimal_jdk;

pub use minimal_jdk::MinimalJdk;
