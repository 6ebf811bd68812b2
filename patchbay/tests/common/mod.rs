#![allow(dead_code)]

use lazy_static::lazy_static;
use patchbay::testing::RecordingSynthesizer;
use patchbay::{HookMethod, PatchDescriptor, PatchStore, Patcher, RoutineId, TypeCatalog};
use std::sync::Arc;

pub const NONE: [&str; 0] = [];

// ============================================================================
// Shared Catalog
// ============================================================================

lazy_static! {
    pub static ref CATALOG: Arc<TypeCatalog> = Arc::new(
        TypeCatalog::builder()
            .ty("Game.Player", |t| {
                t.constructor(NONE)
                    .method("Update", ["float"])
                    .method("Die", NONE)
                    .method("Respawn", ["int"])
            })
            .ty("Game.Enemy", |t| t.constructor(["int"]).method("Attack", NONE))
            .build()
    );
}

pub fn update() -> RoutineId {
    RoutineId::method("Game.Player", "Update", ["float"])
}

pub fn die() -> RoutineId {
    RoutineId::method("Game.Player", "Die", NONE)
}

// ============================================================================
// Hooks
// ============================================================================

pub fn hook(container: &str, name: &str) -> HookMethod {
    HookMethod::new(RoutineId::method(container, name, NONE))
}

pub fn prefix(owner: &str) -> PatchDescriptor {
    PatchDescriptor::hook(hook(owner, "Prefix"))
}

pub fn postfix(owner: &str) -> PatchDescriptor {
    PatchDescriptor::hook(hook(owner, "Postfix"))
}

pub fn replacement(owner: &str) -> PatchDescriptor {
    PatchDescriptor::hook(hook(owner, "Replacement"))
}

// ============================================================================
// Store Setup
// ============================================================================

pub fn recording_store() -> (Arc<PatchStore>, RecordingSynthesizer) {
    let recorder = RecordingSynthesizer::new();
    (Arc::new(PatchStore::new(recorder.clone())), recorder)
}

pub fn patcher(store: &Arc<PatchStore>, owner: &str) -> Patcher {
    Patcher::new(Arc::clone(store), CATALOG.clone(), owner)
}

pub fn owners(records: &[patchbay::PatchRecord]) -> Vec<String> {
    records.iter().map(|r| r.owner().to_string()).collect()
}
