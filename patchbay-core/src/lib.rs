//! # patchbay-core
//!
//! Data model and composition engine for the Patchbay routine patching
//! framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins that declare patches, and by hosts that provide the low-level
//! collaborators (routine lookup, trampoline installation), without pulling
//! in the store and processor.
//!
//! # Model
//!
//! ## Identity ([`RoutineId`], [`OwnerId`])
//!
//! A routine is keyed by declaring type, kind, name and parameter signature.
//! An owner names the plugin that registered an attachment and scopes its
//! removal.
//!
//! ## Records ([`PatchRecord`], [`PatchTable`])
//!
//! A record is one attachment of one owner. A table holds a routine's
//! before, after and override records, with at most one record per owner in
//! each sequence.
//!
//! ## Composition ([`compose`])
//!
//! Pure functions that add and remove records and resolve the deterministic
//! [`DispatchPlan`] handed to a [`Synthesizer`].
//!
//! ## Declarations ([`PatchContainer`], [`LifecycleHooks`])
//!
//! Containers carry layered [`PatchDescriptor`] metadata and optional
//! lifecycle hooks that can veto, retarget or observe registration.
//!
//! # Error Types
//!
//! - [`PatchError`] - Top-level error type
//! - [`ConfigError`] - Declaration errors raised at registration time

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod compose;
mod container;
mod descriptor;
mod error;
mod lifecycle;
mod record;
mod resolver;
mod routine;
mod synth;
mod table;

// Re-exports
pub use container::{DeclaredHook, DeclaredHooks, PatchContainer};
pub use descriptor::{HookMethod, PatchDescriptor, PatchHooks, Receiver, priority};
pub use error::{BoxError, ConfigError, PatchError};
pub use lifecycle::{LifecycleHook, LifecycleHooks, LifecycleKind, LifecycleSlot, ResolvedLifecycle};
pub use record::PatchRecord;
pub use resolver::RoutineResolver;
pub use routine::{OwnerId, RoutineId, RoutineKind};
pub use synth::{DispatchPlan, Synthesizer};
pub use table::{PatchKind, PatchScope, PatchTable, Patches};
