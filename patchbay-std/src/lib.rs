//! # patchbay-std
//!
//! Standard implementations for the Patchbay routine patching framework.
//!
//! This crate provides:
//! - **Routine lookup**: [`TypeCatalog`], an in-memory [`RoutineResolver`]
//! - **Containers**: [`PatchClass`], a builder-style [`PatchContainer`]
//! - **Synthesizers**: [`NoopSynthesizer`], [`TracingSynthesizer`]
//! - **Distributed registration**: `submit_container!` (feature `inventory`)
//! - **Testing**: recording and failing synthesizers
//!
//! [`RoutineResolver`]: patchbay_core::RoutineResolver
//! [`PatchContainer`]: patchbay_core::PatchContainer

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use patchbay_core;

// Modules
pub mod catalog;
#[cfg(feature = "inventory")]
pub mod collected;
pub mod container;
pub mod synth;
pub mod testing;

pub use catalog::{TypeBuilder, TypeCatalog, TypeCatalogBuilder};
pub use container::PatchClass;
pub use synth::{NoopSynthesizer, TracingSynthesizer};

#[cfg(feature = "inventory")]
pub use inventory;
