//! # patchbay - Composable Routine Patching
//!
//! `patchbay` lets independent plugins attach **before**, **after** and
//! **override** hooks to the same routine without knowing about each other.
//! Every registration updates a per-routine [`PatchTable`]; the resulting
//! [`DispatchPlan`] is handed to a [`Synthesizer`] that installs the actual
//! trampoline.
//!
//! ## Quick Start
//!
//! ```rust
//! use patchbay::prelude::*;
//! use patchbay::testing::RecordingSynthesizer;
//! use std::sync::Arc;
//!
//! let recorder = RecordingSynthesizer::new();
//! let store = Arc::new(PatchStore::new(recorder.clone()));
//! let catalog = TypeCatalog::builder()
//!     .ty("Game.Player", |t| t.method("Update", ["float"]))
//!     .build();
//!
//! let patcher = Patcher::new(store, Arc::new(catalog), "com.example.mod");
//! let class = PatchClass::new("PlayerPatches")
//!     .target_type("Game.Player")
//!     .member("Update")
//!     .before(HookMethod::new(RoutineId::method(
//!         "PlayerPatches",
//!         "Prefix",
//!         Vec::<&str>::new(),
//!     )));
//!
//! patcher.patch(&class).unwrap();
//!
//! let update = RoutineId::method("Game.Player", "Update", ["float"]);
//! assert_eq!(recorder.installed(&update).unwrap().before.len(), 1);
//! ```
//!
//! ## Crates
//!
//! - `patchbay-core`: data model and the pure composition engine
//! - `patchbay-std`: resolvers, containers and synthesizers
//! - `patchbay` (this crate): the shared store and the processors that drive it

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod patcher;
mod processor;
mod store;

pub use patcher::Patcher;
pub use processor::PatchProcessor;
pub use store::{PatchStore, StoreBuilder, StoreGuard};

pub use patchbay_core::{
    // Errors
    BoxError,
    ConfigError,
    // Declarations
    DeclaredHook,
    DeclaredHooks,
    // Dispatch
    DispatchPlan,
    HookMethod,
    // Lifecycle
    LifecycleHook,
    LifecycleHooks,
    LifecycleKind,
    // Identity
    OwnerId,
    PatchContainer,
    PatchDescriptor,
    PatchError,
    PatchHooks,
    // Tables
    PatchKind,
    PatchRecord,
    PatchScope,
    PatchTable,
    Patches,
    Receiver,
    RoutineId,
    RoutineKind,
    // Collaborators
    RoutineResolver,
    Synthesizer,
    compose,
    priority,
};

pub use patchbay_std::{NoopSynthesizer, PatchClass, TracingSynthesizer, TypeCatalog};

#[cfg(feature = "inventory")]
pub use patchbay_std::{collected::CollectedContainer, submit_container};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use patchbay_std::testing::*;
}

/// Prelude module - common imports for Patchbay.
///
/// # Usage
///
/// ```rust,ignore
/// use patchbay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        HookMethod, LifecycleHook, OwnerId, PatchClass, PatchContainer, PatchDescriptor,
        PatchError, PatchHooks, PatchScope, PatchStore, Patcher, RoutineId, TypeCatalog, priority,
    };
}
