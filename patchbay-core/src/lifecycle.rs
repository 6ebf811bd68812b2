//! # Lifecycle Hooks
//!
//! A container may customize how it is registered through four optional
//! lifecycle hooks: `prepare`, `cleanup`, `target_method` and
//! `target_methods`. Each is a [`LifecycleSlot`] holding the overloads the
//! container declares.
//!
//! # Overload selection
//!
//! Overloads come in three shapes, tried from richest to poorest:
//!
//! 1. [`LifecycleHook::WithTarget`] - receives the owner and the routine being
//!    processed. Only eligible for per-routine calls.
//! 2. [`LifecycleHook::WithOwner`] - receives the owner.
//! 3. [`LifecycleHook::Bare`] / [`LifecycleHook::Detached`] - no arguments.
//!    A detached hook's result is not usable by the call site, so it runs for
//!    its side effects and the caller's default is returned.
//!
//! Selection happens once, when a processor is built
//! ([`LifecycleHooks::resolve`]), not on every call. If no overload fits, the
//! caller's default is returned and nothing runs.

use crate::{
    error::BoxError,
    routine::{OwnerId, RoutineId},
};
use std::{fmt, sync::Arc};

type TargetFn<R> = dyn Fn(&OwnerId, &RoutineId) -> Result<R, BoxError> + Send + Sync;
type OwnerFn<R> = dyn Fn(&OwnerId) -> Result<R, BoxError> + Send + Sync;
type BareFn<R> = dyn Fn() -> Result<R, BoxError> + Send + Sync;

/// Names the lifecycle hook kinds, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// Decides whether patching proceeds.
    Prepare,
    /// Runs after a routine's patch was installed.
    Cleanup,
    /// Supplies a single target routine.
    TargetMethod,
    /// Supplies the full target routine list.
    TargetMethods,
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleKind::Prepare => "prepare",
            LifecycleKind::Cleanup => "cleanup",
            LifecycleKind::TargetMethod => "target_method",
            LifecycleKind::TargetMethods => "target_methods",
        })
    }
}

/// One overload of a lifecycle hook.
pub enum LifecycleHook<R> {
    /// Takes the owner and the routine being processed.
    WithTarget(Arc<TargetFn<R>>),
    /// Takes the owner.
    WithOwner(Arc<OwnerFn<R>>),
    /// Takes nothing.
    Bare(Arc<BareFn<R>>),
    /// Takes nothing and yields nothing the call site can use.
    Detached(Arc<BareFn<()>>),
}

impl<R> LifecycleHook<R> {
    /// Overload receiving the owner and the current routine.
    pub fn with_target<F>(f: F) -> Self
    where
        F: Fn(&OwnerId, &RoutineId) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        LifecycleHook::WithTarget(Arc::new(f))
    }

    /// Overload receiving the owner.
    pub fn with_owner<F>(f: F) -> Self
    where
        F: Fn(&OwnerId) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        LifecycleHook::WithOwner(Arc::new(f))
    }

    /// Overload with no parameters.
    pub fn bare<F>(f: F) -> Self
    where
        F: Fn() -> Result<R, BoxError> + Send + Sync + 'static,
    {
        LifecycleHook::Bare(Arc::new(f))
    }

    /// Parameterless overload whose result is ignored.
    pub fn detached<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        LifecycleHook::Detached(Arc::new(f))
    }

    fn rank(&self, per_routine: bool) -> Option<u8> {
        match self {
            LifecycleHook::WithTarget(_) if per_routine => Some(0),
            LifecycleHook::WithTarget(_) => None,
            LifecycleHook::WithOwner(_) => Some(1),
            LifecycleHook::Bare(_) => Some(2),
            LifecycleHook::Detached(_) => Some(3),
        }
    }

    /// Run the overload, falling back to `default` where its shape gives no
    /// usable result.
    pub fn invoke(
        &self,
        owner: &OwnerId,
        target: Option<&RoutineId>,
        default: R,
    ) -> Result<R, BoxError> {
        match self {
            LifecycleHook::WithTarget(f) => match target {
                Some(target) => f(owner, target),
                None => Ok(default),
            },
            LifecycleHook::WithOwner(f) => f(owner),
            LifecycleHook::Bare(f) => f(),
            LifecycleHook::Detached(f) => {
                f()?;
                Ok(default)
            }
        }
    }
}

impl<R> Clone for LifecycleHook<R> {
    fn clone(&self) -> Self {
        match self {
            LifecycleHook::WithTarget(f) => LifecycleHook::WithTarget(Arc::clone(f)),
            LifecycleHook::WithOwner(f) => LifecycleHook::WithOwner(Arc::clone(f)),
            LifecycleHook::Bare(f) => LifecycleHook::Bare(Arc::clone(f)),
            LifecycleHook::Detached(f) => LifecycleHook::Detached(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for LifecycleHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            LifecycleHook::WithTarget(_) => "WithTarget",
            LifecycleHook::WithOwner(_) => "WithOwner",
            LifecycleHook::Bare(_) => "Bare",
            LifecycleHook::Detached(_) => "Detached",
        };
        f.debug_tuple("LifecycleHook").field(&shape).finish()
    }
}

/// The overloads a container declares for one lifecycle hook kind.
pub struct LifecycleSlot<R> {
    overloads: Vec<LifecycleHook<R>>,
}

impl<R> LifecycleSlot<R> {
    /// An empty slot.
    pub fn new() -> Self {
        Self {
            overloads: Vec::new(),
        }
    }

    /// Declare an overload.
    pub fn declare(&mut self, hook: LifecycleHook<R>) {
        self.overloads.push(hook);
    }

    /// Whether any overload is declared.
    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Pick the richest overload usable for a container-level call
    /// (`per_routine == false`) or a per-routine call.
    pub fn select(&self, per_routine: bool) -> Option<LifecycleHook<R>> {
        self.overloads
            .iter()
            .filter_map(|hook| hook.rank(per_routine).map(|rank| (rank, hook)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, hook)| hook.clone())
    }
}

impl<R> Default for LifecycleSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for LifecycleSlot<R> {
    fn clone(&self) -> Self {
        Self {
            overloads: self.overloads.clone(),
        }
    }
}

impl<R> fmt::Debug for LifecycleSlot<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.overloads).finish()
    }
}

/// Every lifecycle hook a container declares.
#[derive(Debug, Clone, Default)]
pub struct LifecycleHooks {
    /// Returns whether to patch. Defaults to `true`.
    pub prepare: LifecycleSlot<bool>,
    /// Runs after each routine is patched.
    pub cleanup: LifecycleSlot<()>,
    /// Supplies one target when metadata names none.
    pub target_method: LifecycleSlot<Option<RoutineId>>,
    /// Supplies the complete target list, overriding metadata.
    pub target_methods: LifecycleSlot<Option<Vec<RoutineId>>>,
}

impl LifecycleHooks {
    /// Select the overload for every call site.
    pub fn resolve(&self) -> ResolvedLifecycle {
        ResolvedLifecycle {
            prepare_container: self.prepare.select(false),
            prepare_routine: self.prepare.select(true),
            cleanup: self.cleanup.select(true),
            target_method: self.target_method.select(false),
            target_methods: self.target_methods.select(false),
        }
    }
}

/// Lifecycle overloads selected for each call site of a processor.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLifecycle {
    prepare_container: Option<LifecycleHook<bool>>,
    prepare_routine: Option<LifecycleHook<bool>>,
    cleanup: Option<LifecycleHook<()>>,
    target_method: Option<LifecycleHook<Option<RoutineId>>>,
    target_methods: Option<LifecycleHook<Option<Vec<RoutineId>>>>,
}

impl ResolvedLifecycle {
    /// Container-level `prepare`. Defaults to `true`.
    pub fn prepare_container(&self, owner: &OwnerId) -> Result<bool, BoxError> {
        run(&self.prepare_container, owner, None, true)
    }

    /// Per-routine `prepare`. Defaults to `true`.
    pub fn prepare_routine(&self, owner: &OwnerId, routine: &RoutineId) -> Result<bool, BoxError> {
        run(&self.prepare_routine, owner, Some(routine), true)
    }

    /// Per-routine `cleanup`.
    pub fn cleanup(&self, owner: &OwnerId, routine: &RoutineId) -> Result<(), BoxError> {
        run(&self.cleanup, owner, Some(routine), ())
    }

    /// `target_method`. Defaults to `None`.
    pub fn target_method(&self, owner: &OwnerId) -> Result<Option<RoutineId>, BoxError> {
        run(&self.target_method, owner, None, None)
    }

    /// `target_methods`. Defaults to `None`.
    pub fn target_methods(&self, owner: &OwnerId) -> Result<Option<Vec<RoutineId>>, BoxError> {
        run(&self.target_methods, owner, None, None)
    }
}

fn run<R>(
    hook: &Option<LifecycleHook<R>>,
    owner: &OwnerId,
    target: Option<&RoutineId>,
    default: R,
) -> Result<R, BoxError> {
    match hook {
        Some(hook) => hook.invoke(owner, target, default),
        None => Ok(default),
    }
}
