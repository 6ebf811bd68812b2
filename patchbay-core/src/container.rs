//! # Declarative Containers
//!
//! A container bundles a patch declaration: which routines to target, which
//! hook routines to attach, and the lifecycle hooks that customize
//! registration. It is the structured form of what an attribute or
//! annotation reader would extract from source declarations.

use crate::{
    descriptor::{HookMethod, PatchDescriptor},
    lifecycle::LifecycleHooks,
};

/// A hook routine declared by a container, with its own metadata layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredHook {
    /// The hook routine.
    pub method: HookMethod,
    /// Hook-level metadata, merged in order over the container's defaults.
    pub attributes: Vec<PatchDescriptor>,
}

impl DeclaredHook {
    /// A hook with no hook-level metadata.
    pub fn new(method: HookMethod) -> Self {
        Self {
            method,
            attributes: Vec::new(),
        }
    }

    /// Add a metadata layer.
    pub fn with_attributes(mut self, attributes: PatchDescriptor) -> Self {
        self.attributes.push(attributes);
        self
    }
}

/// The before/after/override hooks a container declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredHooks {
    /// Before-hook.
    pub before: Option<DeclaredHook>,
    /// After-hook.
    pub after: Option<DeclaredHook>,
    /// Override hook.
    pub overrides: Option<DeclaredHook>,
}

/// A declarative patch container.
///
/// Only [`name`](PatchContainer::name) is required; every other item has an
/// empty default, mirroring a declaration that simply omits it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a patch container",
    label = "missing `PatchContainer` implementation",
    note = "Implement `PatchContainer` (or build a `PatchClass`) to declare patches."
)]
pub trait PatchContainer: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Container-level metadata: target type, member, signature, defaults.
    fn attributes(&self) -> PatchDescriptor {
        PatchDescriptor::default()
    }

    /// Whether every declared constructor and method of the target type is
    /// patched.
    fn patch_all(&self) -> bool {
        false
    }

    /// The hook routines to attach.
    fn hooks(&self) -> DeclaredHooks {
        DeclaredHooks::default()
    }

    /// Lifecycle hooks.
    fn lifecycle(&self) -> LifecycleHooks {
        LifecycleHooks::default()
    }
}
