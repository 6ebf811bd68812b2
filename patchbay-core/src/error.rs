//! Error types for Patchbay.
//!
//! - [`PatchError`] - Top-level error type returned by every store and
//!   processor operation
//! - [`ConfigError`] - Declaration problems detected at registration time

use crate::{lifecycle::LifecycleKind, routine::RoutineId};
use thiserror::Error;

/// A boxed error type for collaborator and lifecycle-hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Patchbay operations.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The patch declaration is invalid. Never retried.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A resolved routine list contains an absent entry.
    #[error("null target at position {index} of the routine list")]
    NullTarget {
        /// Position of the absent entry.
        index: usize,
    },

    /// The composition lock was requested by the thread already holding it,
    /// typically from inside a lifecycle hook.
    #[error("composition lock is already held by this thread")]
    Reentrant,

    /// A lifecycle hook returned an error.
    #[error("{kind} hook of `{container}` failed")]
    Lifecycle {
        /// Which lifecycle hook failed.
        kind: LifecycleKind,
        /// Name of the declaring container.
        container: String,
        /// The hook's error.
        #[source]
        source: BoxError,
    },

    /// The trampoline synthesizer failed to install a dispatch plan.
    #[error("failed to regenerate dispatch for {routine}")]
    Synthesis {
        /// The routine whose dispatch could not be regenerated.
        routine: RoutineId,
        /// The synthesizer's error.
        #[source]
        source: BoxError,
    },
}

/// Problems in a patch declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither metadata nor a target-method hook named a routine.
    #[error("no target routine specified for container `{container}`")]
    NoTarget {
        /// Name of the container.
        container: String,
    },

    /// A declared hook routine is bound to an instance.
    #[error("patch method {hook} must be static")]
    NonStaticHook {
        /// Display form of the offending hook.
        hook: String,
    },

    /// A patch-all container did not name the type to patch.
    #[error("container `{container}` patches all members but declares no target type")]
    MissingPatchAllType {
        /// Name of the container.
        container: String,
    },

    /// The resolver does not know the named type.
    #[error("unknown type `{ty}`")]
    UnknownType {
        /// The requested type name.
        ty: String,
    },
}
