//! Per-owner entry point.

use crate::{processor::PatchProcessor, store::PatchStore};
use patchbay_core::{
    OwnerId, PatchContainer, PatchError, PatchHooks, PatchScope, RoutineId, RoutineResolver,
    compose,
};
use std::{collections::BTreeSet, sync::Arc};

/// A plugin's handle on a [`PatchStore`].
///
/// Everything a `Patcher` registers is attributed to its owner, and the
/// owner-wide operations ([`unpatch_all`](Self::unpatch_all),
/// [`has_any_patches`](Self::has_any_patches)) act on that attribution.
///
/// # Example
///
/// ```rust
/// use patchbay::{HookMethod, OwnerId, PatchDescriptor, PatchHooks, PatchStore, Patcher, RoutineId};
/// use patchbay::testing::RecordingSynthesizer;
/// use patchbay_std::TypeCatalog;
/// use std::sync::Arc;
///
/// let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
/// let patcher = Patcher::new(store, Arc::new(TypeCatalog::default()), "com.example.mod");
///
/// let update = RoutineId::method("Game.Player", "Update", ["float"]);
/// let prefix = HookMethod::new(RoutineId::method("Patches", "Prefix", Vec::<&str>::new()));
/// patcher
///     .patch_routine(update.clone(), PatchHooks::new().before(PatchDescriptor::hook(prefix)))
///     .unwrap();
///
/// assert!(patcher.has_any_patches(&OwnerId::from("com.example.mod")).unwrap());
/// patcher.unpatch_all(None).unwrap();
/// assert!(patcher.patched_routines().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct Patcher {
    store: Arc<PatchStore>,
    resolver: Arc<dyn RoutineResolver>,
    owner: OwnerId,
}

impl Patcher {
    /// Create a handle for `owner`.
    pub fn new(
        store: Arc<PatchStore>,
        resolver: Arc<dyn RoutineResolver>,
        owner: impl Into<OwnerId>,
    ) -> Self {
        Self {
            store,
            resolver,
            owner: owner.into(),
        }
    }

    /// The owner this handle registers as.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<PatchStore> {
        &self.store
    }

    /// Resolve `container` without applying it.
    pub fn processor(&self, container: &dyn PatchContainer) -> Result<PatchProcessor, PatchError> {
        PatchProcessor::from_container(
            Arc::clone(&self.store),
            self.owner.clone(),
            container,
            self.resolver.as_ref(),
        )
    }

    /// Resolve and apply `container`. The returned processor can later undo
    /// the registration with [`PatchProcessor::remove`].
    pub fn patch(&self, container: &dyn PatchContainer) -> Result<PatchProcessor, PatchError> {
        let processor = self.processor(container)?;
        processor.apply()?;
        Ok(processor)
    }

    /// Attach explicit hook descriptors to one routine.
    pub fn patch_routine(&self, original: RoutineId, hooks: PatchHooks) -> Result<(), PatchError> {
        PatchProcessor::for_routines(Arc::clone(&self.store), self.owner.clone(), [original], hooks).apply()
    }

    /// Remove `owner`'s records within `scope` from one routine.
    pub fn unpatch(&self, original: RoutineId, scope: PatchScope, owner: &OwnerId) -> Result<(), PatchError> {
        PatchProcessor::for_routines(Arc::clone(&self.store), self.owner.clone(), [original], PatchHooks::default())
            .remove(scope, owner)
    }

    /// Remove every record whose hook routine is `hook` from one routine.
    pub fn unpatch_hook(&self, original: RoutineId, hook: &RoutineId) -> Result<(), PatchError> {
        PatchProcessor::for_routines(Arc::clone(&self.store), self.owner.clone(), [original], PatchHooks::default())
            .remove_specific(hook)
    }

    /// Remove every record of `owner` (this handle's owner when `None`) from
    /// every patched routine. Routines the owner never touched are left
    /// alone and their dispatch is not regenerated.
    pub fn unpatch_all(&self, owner: Option<&OwnerId>) -> Result<(), PatchError> {
        let owner = owner.unwrap_or(&self.owner);
        let mut guard = self.store.lock()?;

        let touched: Vec<RoutineId> = guard
            .routines()
            .filter(|routine| {
                guard
                    .get(routine)
                    .is_some_and(|table| table.has_owner(owner))
            })
            .cloned()
            .collect();

        for routine in touched {
            let Some(current) = guard.get(&routine) else {
                continue;
            };
            let mut table = (*current).clone();
            let removed = compose::remove_by_owner(&mut table, PatchScope::ALL, owner);
            #[cfg(feature = "tracing")]
            tracing::debug!(routine = %routine, owner = %owner, removed, "owner unpatched");
            #[cfg(not(feature = "tracing"))]
            let _ = removed;
            guard.commit(&routine, table)?;
        }
        Ok(())
    }

    /// Whether any routine carries a record of `owner`.
    pub fn has_any_patches(&self, owner: &OwnerId) -> Result<bool, PatchError> {
        let guard = self.store.lock()?;
        let found = guard
            .routines()
            .any(|routine| guard.get(routine).is_some_and(|table| table.has_owner(owner)));
        Ok(found)
    }

    /// Every routine with at least one attached record.
    pub fn patched_routines(&self) -> Result<BTreeSet<RoutineId>, PatchError> {
        self.store.patched_routines()
    }

    /// Apply every container submitted with `submit_container!`, in name
    /// order. Stops at the first failure.
    #[cfg(feature = "inventory")]
    pub fn patch_collected(&self) -> Result<usize, PatchError> {
        let entries = patchbay_std::collected::collected_containers();
        for entry in &entries {
            let container = entry.build();
            #[cfg(feature = "tracing")]
            tracing::info!(container = entry.name, owner = %self.owner, "applying collected container");
            self.patch(container.as_ref())?;
        }
        Ok(entries.len())
    }
}

impl std::fmt::Debug for Patcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patcher")
            .field("owner", &self.owner)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
