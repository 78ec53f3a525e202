//! Shared registry infrastructure.

pub mod index;

pub use index::{InsertAction, RegistryIndex};
