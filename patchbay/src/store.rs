//! Shared patch state.
//!
//! A [`PatchStore`] is the single source of truth for what is attached to
//! each routine. Every read and write goes through a [`StoreGuard`], which
//! holds the store-wide composition lock for its whole lifetime: one store,
//! one lock, across all routines.
//!
//! Tables are held behind `Arc` and replaced wholesale on write, so a
//! snapshot taken from a guard can never observe a half-written table.

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use patchbay_core::{
    DispatchPlan, PatchError, PatchTable, Patches, RoutineId, Synthesizer, compose,
};
use patchbay_std::NoopSynthesizer;
use std::{
    collections::BTreeSet,
    sync::{Arc, OnceLock},
    thread::{self, ThreadId},
};

static GLOBAL: OnceLock<PatchStore> = OnceLock::new();

type Tables = IndexMap<RoutineId, Arc<PatchTable>>;

/// Process-wide registry of patch tables, keyed by routine.
///
/// # Example
///
/// ```rust
/// use patchbay::{PatchStore, RoutineId};
/// use patchbay_std::testing::RecordingSynthesizer;
///
/// let recorder = RecordingSynthesizer::new();
/// let store = PatchStore::new(recorder.clone());
///
/// let routine = RoutineId::method("Game.Player", "Update", ["float"]);
/// assert!(store.patches_for(&routine).unwrap().is_none());
/// assert!(store.patched_routines().unwrap().is_empty());
/// ```
pub struct PatchStore {
    tables: Mutex<Tables>,
    holder: Mutex<Option<ThreadId>>,
    synthesizer: Box<dyn Synthesizer>,
    prune_empty: bool,
}

impl PatchStore {
    /// Create a store that installs dispatch through `synthesizer`.
    pub fn new<S: Synthesizer + 'static>(synthesizer: S) -> Self {
        Self::builder().synthesizer(synthesizer).build()
    }

    /// Start configuring a store.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// The process-wide store.
    ///
    /// Initialised on first use with a [`NoopSynthesizer`] unless
    /// [`install_global`](Self::install_global) ran first.
    pub fn global() -> &'static PatchStore {
        GLOBAL.get_or_init(|| PatchStore::new(NoopSynthesizer))
    }

    /// Install the process-wide store. Fails, handing the store back, if one
    /// is already installed.
    pub fn install_global(store: PatchStore) -> Result<&'static PatchStore, PatchStore> {
        GLOBAL.set(store)?;
        Ok(Self::global())
    }

    /// Acquire the composition lock.
    ///
    /// Blocks while another thread holds it. Fails with
    /// [`PatchError::Reentrant`] if the calling thread already holds it, for
    /// example from inside a lifecycle hook.
    pub fn lock(&self) -> Result<StoreGuard<'_>, PatchError> {
        let current = thread::current().id();
        if *self.holder.lock() == Some(current) {
            return Err(PatchError::Reentrant);
        }
        let tables = self.tables.lock();
        *self.holder.lock() = Some(current);
        Ok(StoreGuard {
            store: self,
            tables,
        })
    }

    /// Snapshot of the records attached to `routine`, or `None` when nothing
    /// is attached.
    pub fn patches_for(&self, routine: &RoutineId) -> Result<Option<Patches>, PatchError> {
        let guard = self.lock()?;
        Ok(guard
            .get(routine)
            .filter(|table| !table.is_empty())
            .map(|table| table.snapshot()))
    }

    /// Every routine with at least one attached record.
    pub fn patched_routines(&self) -> Result<BTreeSet<RoutineId>, PatchError> {
        let guard = self.lock()?;
        Ok(guard.routines().cloned().collect())
    }
}

impl std::fmt::Debug for PatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchStore")
            .field("prune_empty", &self.prune_empty)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a [`PatchStore`], holding the composition lock.
pub struct StoreGuard<'a> {
    store: &'a PatchStore,
    tables: MutexGuard<'a, Tables>,
}

impl StoreGuard<'_> {
    /// The table stored for `routine`, if any.
    pub fn get(&self, routine: &RoutineId) -> Option<Arc<PatchTable>> {
        self.tables.get(routine).cloned()
    }

    /// Replace the table stored for `routine`.
    ///
    /// With pruning enabled (the default), an empty table removes the entry
    /// so that "empty" and "absent" look the same to every query.
    pub fn put(&mut self, routine: RoutineId, table: PatchTable) {
        if table.is_empty() && self.store.prune_empty {
            self.tables.shift_remove(&routine);
        } else {
            self.tables.insert(routine, Arc::new(table));
        }
    }

    /// Drop the entry for `routine` if its table is empty. Returns whether
    /// an entry was removed.
    pub fn remove_if_empty(&mut self, routine: &RoutineId) -> bool {
        match self.tables.get(routine) {
            Some(table) if table.is_empty() => self.tables.shift_remove(routine).is_some(),
            _ => false,
        }
    }

    /// Routines with a non-empty table, in first-registration order.
    pub fn routines(&self) -> impl Iterator<Item = &RoutineId> + '_ {
        self.tables
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(routine, _)| routine)
    }

    /// Resolve the dispatch plan for `table`, install it for `routine`, then
    /// store the table. Nothing is stored if installation fails.
    pub fn commit(&mut self, routine: &RoutineId, table: PatchTable) -> Result<DispatchPlan, PatchError> {
        let plan = compose::plan(&table);

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                routine = %routine,
                before = plan.before.len(),
                overrides = plan.overrides.len(),
                after = plan.after.len(),
                "regenerating dispatch"
            );
            if plan.is_passthrough() {
                tracing::debug!(routine = %routine, "no hooks left; restoring original dispatch");
            }
            if !plan.forced.is_empty() {
                tracing::warn!(
                    routine = %routine,
                    owners = ?plan.forced,
                    "ordering constraints form a cycle; falling back to priority order"
                );
            }
        }

        self.store
            .synthesizer
            .regenerate(routine, &plan)
            .map_err(|source| PatchError::Synthesis {
                routine: routine.clone(),
                source,
            })?;
        self.put(routine.clone(), table);
        Ok(plan)
    }
}

impl Drop for StoreGuard<'_> {
    fn drop(&mut self) {
        *self.store.holder.lock() = None;
    }
}

/// Builder for [`PatchStore`].
pub struct StoreBuilder {
    synthesizer: Box<dyn Synthesizer>,
    prune_empty: bool,
}

impl StoreBuilder {
    /// Defaults: no-op synthesizer, empty tables pruned.
    pub fn new() -> Self {
        Self {
            synthesizer: Box::new(NoopSynthesizer),
            prune_empty: true,
        }
    }

    /// Set the trampoline synthesizer.
    pub fn synthesizer<S: Synthesizer + 'static>(mut self, synthesizer: S) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    /// Whether tables left empty by a removal are dropped from the store.
    pub fn prune_empty(mut self, prune: bool) -> Self {
        self.prune_empty = prune;
        self
    }

    /// Build the store.
    pub fn build(self) -> PatchStore {
        PatchStore {
            tables: Mutex::new(IndexMap::new()),
            holder: Mutex::new(None),
            synthesizer: self.synthesizer,
            prune_empty: self.prune_empty,
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
