//! # Patch Processor
//!
//! A [`PatchProcessor`] turns one registration request into table updates.
//! It is built either from a declarative [`PatchContainer`] (which resolves
//! target routines and hook descriptors up front) or from an explicit routine
//! list with ready-made descriptors.
//!
//! Processors hold no patch state of their own: [`apply`](PatchProcessor::apply),
//! [`remove`](PatchProcessor::remove) and
//! [`remove_specific`](PatchProcessor::remove_specific) read and write the
//! [`PatchStore`] while holding its composition lock for the whole call.
//!
//! # Failure behavior
//!
//! - The routine list is validated before any table is touched, so a
//!   [`PatchError::NullTarget`] never leaves a call half applied.
//! - A routine whose `prepare` hook returns `false` is skipped without error.
//! - Lifecycle or synthesizer failures abort the call. Routines already
//!   processed in that call keep their new state.

use crate::store::{PatchStore, StoreGuard};
use patchbay_core::{
    ConfigError, DeclaredHook, LifecycleKind, OwnerId, PatchContainer, PatchDescriptor,
    PatchError, PatchHooks, PatchKind, PatchScope, PatchTable, ResolvedLifecycle, RoutineId,
    RoutineResolver, compose,
};
use std::sync::Arc;

/// Registers and removes one owner's hooks on a list of routines.
#[derive(Debug)]
pub struct PatchProcessor {
    store: Arc<PatchStore>,
    owner: OwnerId,
    container: Option<String>,
    lifecycle: ResolvedLifecycle,
    originals: Vec<Option<RoutineId>>,
    hooks: PatchHooks,
}

impl PatchProcessor {
    /// Build a processor from a declarative container.
    ///
    /// Runs the container-level `prepare` hook; if it declines, the processor
    /// targets nothing. Otherwise target routines are taken, in order of
    /// preference, from the `target_methods` hook, from every member of the
    /// target type (patch-all containers), or from the container's metadata
    /// with the `target_method` hook as fallback.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when no target can be found or a declared hook is not
    /// static; [`PatchError::Lifecycle`] when a lifecycle hook fails.
    pub fn from_container(
        store: Arc<PatchStore>,
        owner: OwnerId,
        container: &dyn PatchContainer,
        resolver: &dyn RoutineResolver,
    ) -> Result<Self, PatchError> {
        let name = container.name().to_string();
        let lifecycle = container.lifecycle().resolve();
        let attributes = container.attributes();

        let mut processor = Self {
            store,
            owner,
            container: Some(name.clone()),
            lifecycle,
            originals: Vec::new(),
            hooks: PatchHooks::default(),
        };

        let prepared = processor
            .lifecycle
            .prepare_container(&processor.owner)
            .map_err(|source| processor.lifecycle_error(LifecycleKind::Prepare, source))?;
        if !prepared {
            #[cfg(feature = "tracing")]
            tracing::info!(container = %name, "prepare declined; nothing to patch");
            return Ok(processor);
        }

        processor.originals = processor
            .resolve_targets(container, &attributes, resolver)?
            .into_iter()
            .map(Some)
            .collect();

        let declared = container.hooks();
        processor.hooks = PatchHooks {
            before: finalize(&attributes, declared.before)?,
            after: finalize(&attributes, declared.after)?,
            overrides: finalize(&attributes, declared.overrides)?,
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            container = %name,
            owner = %processor.owner,
            targets = processor.originals.len(),
            "resolved patch container"
        );

        Ok(processor)
    }

    /// Build a processor for already-resolved routines.
    ///
    /// `None` entries are accepted here and rejected by every mutating call
    /// with [`PatchError::NullTarget`].
    pub fn for_routines<I, T>(store: Arc<PatchStore>, owner: OwnerId, originals: I, hooks: PatchHooks) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<RoutineId>>,
    {
        Self {
            store,
            owner,
            container: None,
            lifecycle: ResolvedLifecycle::default(),
            originals: originals.into_iter().map(Into::into).collect(),
            hooks,
        }
    }

    fn resolve_targets(
        &self,
        container: &dyn PatchContainer,
        attributes: &PatchDescriptor,
        resolver: &dyn RoutineResolver,
    ) -> Result<Vec<RoutineId>, PatchError> {
        let custom = self
            .lifecycle
            .target_methods(&self.owner)
            .map_err(|source| self.lifecycle_error(LifecycleKind::TargetMethods, source))?;
        if let Some(routines) = custom {
            return Ok(routines);
        }

        if container.patch_all() {
            let Some(ty) = attributes.target_type.as_deref() else {
                return Err(ConfigError::MissingPatchAllType {
                    container: container.name().to_string(),
                }
                .into());
            };
            if !resolver.contains_type(ty) {
                return Err(ConfigError::UnknownType { ty: ty.to_string() }.into());
            }
            let mut routines = resolver.declared_constructors(ty);
            routines.extend(resolver.declared_methods(ty));
            return Ok(routines);
        }

        let original = match metadata_target(attributes, resolver) {
            Some(original) => Some(original),
            None => self
                .lifecycle
                .target_method(&self.owner)
                .map_err(|source| self.lifecycle_error(LifecycleKind::TargetMethod, source))?,
        };
        match original {
            Some(original) => Ok(vec![original]),
            None => Err(ConfigError::NoTarget {
                container: container.name().to_string(),
            }
            .into()),
        }
    }

    /// The owner whose records this processor adds and removes.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// The routines this processor targets, in processing order.
    pub fn originals(&self) -> &[Option<RoutineId>] {
        &self.originals
    }

    /// The finalized hook descriptors.
    pub fn hooks(&self) -> &PatchHooks {
        &self.hooks
    }

    /// Attach this processor's hooks to every target routine.
    ///
    /// For each routine, in order: run the per-routine `prepare` hook (a
    /// `false` result skips the routine), merge the before/after/override
    /// records into its table (replacing this owner's previous records),
    /// regenerate its dispatch, store the table, then run `cleanup`.
    pub fn apply(&self) -> Result<(), PatchError> {
        let mut guard = self.store.lock()?;
        let originals = self.validated()?;

        for original in originals {
            let prepared = self
                .lifecycle
                .prepare_routine(&self.owner, original)
                .map_err(|source| self.lifecycle_error(LifecycleKind::Prepare, source))?;
            if !prepared {
                #[cfg(feature = "tracing")]
                tracing::debug!(routine = %original, owner = %self.owner, "prepare declined; routine skipped");
                continue;
            }

            let mut table = current_table(&guard, original);
            for kind in PatchKind::ALL {
                let descriptor = self.descriptor(kind);
                if compose::add_record(&mut table, kind, &self.owner, descriptor) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(routine = %original, owner = %self.owner, kind = %kind, "record added");
                }
            }
            guard.commit(original, table)?;

            self.lifecycle
                .cleanup(&self.owner, original)
                .map_err(|source| self.lifecycle_error(LifecycleKind::Cleanup, source))?;
        }
        Ok(())
    }

    /// Strip the records of `owner` within `scope` from every target routine
    /// and regenerate their dispatch.
    pub fn remove(&self, scope: PatchScope, owner: &OwnerId) -> Result<(), PatchError> {
        self.rewrite(|table| compose::remove_by_owner(table, scope, owner))
    }

    /// Strip the records whose hook routine is `hook` from every target
    /// routine and regenerate their dispatch.
    pub fn remove_specific(&self, hook: &RoutineId) -> Result<(), PatchError> {
        self.rewrite(|table| compose::remove_by_hook(table, hook))
    }

    fn rewrite<F>(&self, mut strip: F) -> Result<(), PatchError>
    where
        F: FnMut(&mut PatchTable) -> usize,
    {
        let mut guard = self.store.lock()?;
        let originals = self.validated()?;

        for original in originals {
            let mut table = current_table(&guard, original);
            let removed = strip(&mut table);
            #[cfg(feature = "tracing")]
            tracing::debug!(routine = %original, removed, "records removed");
            #[cfg(not(feature = "tracing"))]
            let _ = removed;
            guard.commit(original, table)?;
        }
        Ok(())
    }

    fn validated(&self) -> Result<Vec<&RoutineId>, PatchError> {
        self.originals
            .iter()
            .enumerate()
            .map(|(index, original)| original.as_ref().ok_or(PatchError::NullTarget { index }))
            .collect()
    }

    fn descriptor(&self, kind: PatchKind) -> &PatchDescriptor {
        match kind {
            PatchKind::Before => &self.hooks.before,
            PatchKind::After => &self.hooks.after,
            PatchKind::Override => &self.hooks.overrides,
        }
    }

    fn lifecycle_error(&self, kind: LifecycleKind, source: patchbay_core::BoxError) -> PatchError {
        PatchError::Lifecycle {
            kind,
            container: self.container.clone().unwrap_or_default(),
            source,
        }
    }
}

fn current_table(guard: &StoreGuard<'_>, routine: &RoutineId) -> PatchTable {
    guard
        .get(routine)
        .map(|table| PatchTable::clone(&table))
        .unwrap_or_default()
}

/// Resolve the single target named by container metadata. A missing member
/// name selects a constructor.
fn metadata_target(attributes: &PatchDescriptor, resolver: &dyn RoutineResolver) -> Option<RoutineId> {
    let ty = attributes.target_type.as_deref()?;
    let parameters = attributes.parameters.as_deref();
    match attributes.member_name.as_deref() {
        Some(name) => resolver.method(ty, name, parameters),
        None => resolver.constructor(ty, parameters),
    }
}

/// Merge a declared hook's own metadata over the container defaults.
fn finalize(attributes: &PatchDescriptor, declared: Option<DeclaredHook>) -> Result<PatchDescriptor, ConfigError> {
    let Some(declared) = declared else {
        return Ok(PatchDescriptor {
            method: None,
            ..attributes.clone()
        });
    };
    if !declared.method.is_static() {
        return Err(ConfigError::NonStaticHook {
            hook: declared.method.to_string(),
        });
    }
    let leaf = PatchDescriptor::merge_all(&declared.attributes);
    let mut descriptor = attributes.merge(&leaf);
    descriptor.method = Some(declared.method);
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchbay_core::{HookMethod, LifecycleHook, priority};
    use patchbay_std::{PatchClass, TypeCatalog, testing::RecordingSynthesizer};

    const NONE: [&str; 0] = [];

    fn catalog() -> TypeCatalog {
        TypeCatalog::builder()
            .ty("Game.Player", |t| {
                t.constructor(NONE)
                    .method("Update", ["float"])
                    .method("Die", NONE)
            })
            .build()
    }

    fn hook(name: &str) -> HookMethod {
        HookMethod::new(RoutineId::method("Patches", name, NONE))
    }

    fn update() -> RoutineId {
        RoutineId::method("Game.Player", "Update", ["float"])
    }

    #[test]
    fn test_metadata_resolves_single_target() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("C")
            .target_type("Game.Player")
            .member("Update")
            .before(hook("Prefix"));
        let processor =
            PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog()).unwrap();
        assert_eq!(processor.originals(), &[Some(update())]);
        assert_eq!(processor.hooks().before.method, Some(hook("Prefix")));
        assert!(processor.hooks().after.method.is_none());
    }

    #[test]
    fn test_missing_member_targets_constructor() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("C").target_type("Game.Player");
        let processor =
            PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog()).unwrap();
        assert_eq!(
            processor.originals(),
            &[Some(RoutineId::constructor("Game.Player", NONE))]
        );
    }

    #[test]
    fn test_target_method_hook_is_fallback() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("C")
            .target_type("Game.Player")
            .member("Missing")
            .target_method(LifecycleHook::bare(|| Ok(Some(update()))));
        let processor =
            PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog()).unwrap();
        assert_eq!(processor.originals(), &[Some(update())]);
    }

    #[test]
    fn test_no_target_is_config_error() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("Orphan").before(hook("Prefix"));
        let err = PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog())
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::Config(ConfigError::NoTarget { ref container }) if container == "Orphan"
        ));
    }

    #[test]
    fn test_patch_all_without_type() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("All").patch_all_members();
        let err = PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog())
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::Config(ConfigError::MissingPatchAllType { .. })
        ));
    }

    #[test]
    fn test_patch_all_unknown_type() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("All").target_type("Game.Ghost").patch_all_members();
        let err = PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog())
            .unwrap_err();
        assert!(matches!(
            err,
            PatchError::Config(ConfigError::UnknownType { ref ty }) if ty == "Game.Ghost"
        ));
    }

    #[test]
    fn test_hook_metadata_overrides_container() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("C")
            .target_type("Game.Player")
            .member("Update")
            .priority(priority::LOW)
            .before_hook(
                DeclaredHook::new(hook("Prefix"))
                    .with_attributes(PatchDescriptor::new().with_priority(priority::HIGH)),
            )
            .after(hook("Postfix"));
        let processor =
            PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog()).unwrap();
        assert_eq!(processor.hooks().before.priority, Some(priority::HIGH));
        assert_eq!(processor.hooks().after.priority, Some(priority::LOW));
    }

    #[test]
    fn test_declined_container_targets_nothing() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let class = PatchClass::new("C")
            .before(hook("Prefix"))
            .prepare(LifecycleHook::with_owner(|_| Ok(false)));
        let processor =
            PatchProcessor::from_container(Arc::clone(&store), OwnerId::from("a"), &class, &catalog()).unwrap();
        assert!(processor.originals().is_empty());
        processor.apply().unwrap();
        assert!(store.patched_routines().unwrap().is_empty());
    }

    #[test]
    fn test_null_target_aborts_before_mutation() {
        let store = Arc::new(PatchStore::new(RecordingSynthesizer::new()));
        let processor = PatchProcessor::for_routines(
            Arc::clone(&store),
            OwnerId::from("a"),
            [Some(update()), None],
            PatchHooks::new().before(PatchDescriptor::hook(hook("Prefix"))),
        );
        let err = processor.apply().unwrap_err();
        assert!(matches!(err, PatchError::NullTarget { index: 1 }));
        assert!(store.patches_for(&update()).unwrap().is_none());
    }
}
