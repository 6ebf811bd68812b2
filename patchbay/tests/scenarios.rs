mod common;

use common::{CATALOG, NONE, die, hook, owners, patcher, postfix, prefix, recording_store, replacement, update};
use patchbay::testing::FailingSynthesizer;
use patchbay::{
    ConfigError, DeclaredHook, HookMethod, LifecycleHook, OwnerId, PatchClass, PatchDescriptor,
    PatchError, PatchHooks, PatchProcessor, PatchScope, PatchStore, Patcher, RoutineId,
};
use std::sync::Arc;

#[test]
fn test_register_then_unregister_before_hook() {
    let (store, _) = recording_store();
    let a = patcher(&store, "A");

    a.patch_routine(update(), PatchHooks::new().before(prefix("A")))
        .unwrap();
    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert_eq!(owners(&patches.before), ["A"]);
    assert_eq!(patches.before[0].hook(), &hook("A", "Prefix"));

    a.unpatch(update(), PatchScope::BEFORE, &OwnerId::from("A"))
        .unwrap();
    assert!(store.patches_for(&update()).unwrap().is_none());
}

#[test]
fn test_second_override_from_same_owner_replaces_first() {
    let (store, _) = recording_store();
    let a = patcher(&store, "A");

    a.patch_routine(update(), PatchHooks::new().overrides(replacement("A")))
        .unwrap();
    let second = PatchDescriptor::hook(hook("A", "BetterReplacement"));
    a.patch_routine(update(), PatchHooks::new().overrides(second))
        .unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert_eq!(patches.overrides.len(), 1);
    assert_eq!(patches.overrides[0].hook(), &hook("A", "BetterReplacement"));
}

#[test]
fn test_patch_all_members_targets_every_routine() {
    let (store, recorder) = recording_store();
    let class = PatchClass::new("Everything")
        .target_type("Game.Player")
        .patch_all_members()
        .before(hook("Everything", "Prefix"))
        .after(hook("Everything", "Postfix"));

    let processor = patcher(&store, "A").patch(&class).unwrap();
    assert_eq!(processor.originals().len(), 4);
    assert_eq!(
        processor.originals()[0],
        Some(RoutineId::constructor("Game.Player", NONE))
    );

    for routine in processor.originals().iter().flatten() {
        let patches = store.patches_for(routine).unwrap().unwrap();
        assert_eq!(patches.before.len(), 1);
        assert_eq!(patches.after.len(), 1);
        assert!(patches.overrides.is_empty());
    }
    assert_eq!(recorder.count(), 4);
}

#[test]
fn test_instance_hook_is_rejected() {
    let (store, recorder) = recording_store();
    let class = PatchClass::new("Broken")
        .target_type("Game.Player")
        .member("Update")
        .before(HookMethod::instance(RoutineId::method("Broken", "Prefix", NONE)));

    let err = patcher(&store, "A").patch(&class).unwrap_err();
    match err {
        PatchError::Config(ConfigError::NonStaticHook { hook }) => {
            assert_eq!(hook, "Broken::Prefix()");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.patched_routines().unwrap().is_empty());
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_reapply_is_idempotent() {
    let (store, recorder) = recording_store();
    let class = PatchClass::new("C")
        .target_type("Game.Player")
        .member("Update")
        .before(hook("C", "Prefix"))
        .after(hook("C", "Postfix"));
    let b = patcher(&store, "B");
    b.patch_routine(update(), PatchHooks::new().before(prefix("B")))
        .unwrap();

    let a = patcher(&store, "A");
    a.patch(&class).unwrap();
    let first = recorder.installed(&update()).unwrap();
    a.patch(&class).unwrap();
    let second = recorder.installed(&update()).unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert_eq!(owners(&patches.before), ["B", "A"]);
    assert_eq!(patches.after.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_owners_are_isolated() {
    let (store, _) = recording_store();
    let x = patcher(&store, "X");
    let y = patcher(&store, "Y");
    x.patch_routine(update(), PatchHooks::new().before(prefix("X")).after(postfix("X")))
        .unwrap();
    y.patch_routine(update(), PatchHooks::new().before(prefix("Y")).after(postfix("Y")))
        .unwrap();

    x.unpatch(update(), PatchScope::ALL, &OwnerId::from("X"))
        .unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert_eq!(owners(&patches.before), ["Y"]);
    assert_eq!(owners(&patches.after), ["Y"]);
    assert!(!x.has_any_patches(&OwnerId::from("X")).unwrap());
    assert!(y.has_any_patches(&OwnerId::from("Y")).unwrap());
}

#[test]
fn test_unpatch_hook_removes_matching_records_only() {
    let (store, _) = recording_store();
    let shared = PatchDescriptor::hook(hook("Shared", "Prefix"));
    patcher(&store, "A")
        .patch_routine(update(), PatchHooks::new().before(shared.clone()))
        .unwrap();
    patcher(&store, "B")
        .patch_routine(update(), PatchHooks::new().before(shared).after(postfix("B")))
        .unwrap();

    patcher(&store, "C")
        .unpatch_hook(update(), hook("Shared", "Prefix").routine())
        .unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert!(patches.before.is_empty());
    assert_eq!(owners(&patches.after), ["B"]);
}

#[test]
fn test_wildcard_owner_clears_scope() {
    let (store, _) = recording_store();
    patcher(&store, "A")
        .patch_routine(update(), PatchHooks::new().before(prefix("A")).after(postfix("A")))
        .unwrap();
    patcher(&store, "B")
        .patch_routine(update(), PatchHooks::new().before(prefix("B")))
        .unwrap();

    patcher(&store, "admin")
        .unpatch(update(), PatchScope::BEFORE, &OwnerId::wildcard())
        .unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    assert!(patches.before.is_empty());
    assert_eq!(owners(&patches.after), ["A"]);
}

#[test]
fn test_unpatch_all_only_touches_owner_routines() {
    let (store, recorder) = recording_store();
    let a = patcher(&store, "A");
    let b = patcher(&store, "B");
    a.patch_routine(update(), PatchHooks::new().before(prefix("A")))
        .unwrap();
    a.patch_routine(die(), PatchHooks::new().after(postfix("A")))
        .unwrap();
    b.patch_routine(die(), PatchHooks::new().before(prefix("B")))
        .unwrap();
    let other = RoutineId::method("Game.Enemy", "Attack", NONE);
    b.patch_routine(other.clone(), PatchHooks::new().before(prefix("B")))
        .unwrap();
    recorder.clear();

    a.unpatch_all(None).unwrap();

    let regenerated: Vec<RoutineId> = recorder.calls().into_iter().map(|(r, _)| r).collect();
    assert_eq!(regenerated, [update(), die()]);
    assert!(store.patches_for(&update()).unwrap().is_none());
    assert_eq!(store.patched_routines().unwrap().len(), 2);
    assert_eq!(
        store.patches_for(&die()).unwrap().unwrap().owners(),
        [OwnerId::from("B")].into_iter().collect()
    );
}

#[test]
fn test_declined_prepare_skips_routine() {
    let (store, recorder) = recording_store();
    let class = PatchClass::new("Picky")
        .target_type("Game.Player")
        .patch_all_members()
        .before(hook("Picky", "Prefix"))
        .prepare(LifecycleHook::with_target(|_, routine: &RoutineId| {
            Ok(routine.name() == "Die")
        }));

    let processor = patcher(&store, "A").patch(&class).unwrap();
    assert_eq!(processor.originals().len(), 4);
    assert_eq!(store.patched_routines().unwrap(), [die()].into_iter().collect());
    assert!(store.patches_for(&update()).unwrap().is_none());
    assert_eq!(recorder.count(), 1);
}

#[test]
fn test_null_target_rejects_whole_call() {
    let (store, recorder) = recording_store();
    let processor = PatchProcessor::for_routines(
        Arc::clone(&store),
        OwnerId::from("A"),
        [Some(update()), None, Some(die())],
        PatchHooks::new().before(prefix("A")),
    );

    assert!(matches!(processor.apply(), Err(PatchError::NullTarget { index: 1 })));
    assert!(matches!(
        processor.remove(PatchScope::ALL, &OwnerId::from("A")),
        Err(PatchError::NullTarget { index: 1 })
    ));
    assert!(matches!(
        processor.remove_specific(hook("A", "Prefix").routine()),
        Err(PatchError::NullTarget { index: 1 })
    ));
    assert!(store.patched_routines().unwrap().is_empty());
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_lifecycle_failure_names_container() {
    let (store, _) = recording_store();
    let class = PatchClass::new("Fragile")
        .target_type("Game.Player")
        .member("Update")
        .before(hook("Fragile", "Prefix"))
        .cleanup(LifecycleHook::with_target(|_, _| Err("cleanup exploded".into())));

    let err = patcher(&store, "A").patch(&class).unwrap_err();
    match &err {
        PatchError::Lifecycle {
            kind, container, ..
        } => {
            assert_eq!(kind.to_string(), "cleanup");
            assert_eq!(container, "Fragile");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        std::error::Error::source(&err).map(ToString::to_string),
        Some("cleanup exploded".to_string())
    );
    // cleanup runs after the table is committed
    assert!(store.patches_for(&update()).unwrap().is_some());
}

#[test]
fn test_failed_routine_keeps_earlier_routines() {
    let store = Arc::new(PatchStore::new(FailingSynthesizer::for_routines([die()])));
    let patcher = Patcher::new(Arc::clone(&store), CATALOG.clone(), "A");
    let processor = PatchProcessor::for_routines(
        Arc::clone(patcher.store()),
        patcher.owner().clone(),
        [update(), die()],
        PatchHooks::new().before(prefix("A")),
    );

    let err = processor.apply().unwrap_err();
    assert!(matches!(err, PatchError::Synthesis { ref routine, .. } if *routine == die()));
    assert!(store.patches_for(&update()).unwrap().is_some());
    assert!(store.patches_for(&die()).unwrap().is_none());
}

#[test]
fn test_container_hook_metadata_feeds_records() {
    let (store, _) = recording_store();
    let class = PatchClass::new("Late")
        .target_type("Game.Player")
        .member("Update")
        .priority(patchbay::priority::LOW)
        .before_hook(
            DeclaredHook::new(hook("Late", "Prefix"))
                .with_attributes(PatchDescriptor::new().run_after("Early")),
        );
    patcher(&store, "Late").patch(&class).unwrap();

    let patches = store.patches_for(&update()).unwrap().unwrap();
    let record = &patches.before[0];
    assert_eq!(record.priority(), patchbay::priority::LOW);
    assert!(record.after().contains(&OwnerId::from("Early")));
}

#[test]
fn test_processor_outlives_its_patcher() {
    let (store, recorder) = recording_store();
    let class = PatchClass::new("Undoable")
        .target_type("Game.Player")
        .member("Update")
        .before(hook("Undoable", "Prefix"));

    let processor = patcher(&store, "A").patch(&class).unwrap();
    assert!(store.patches_for(&update()).unwrap().is_some());

    processor.remove(PatchScope::ALL, processor.owner()).unwrap();
    assert!(store.patches_for(&update()).unwrap().is_none());
    assert!(recorder.installed(&update()).unwrap().is_passthrough());
}
