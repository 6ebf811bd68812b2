//! Patch records: one attachment of one owner on one routine.

use crate::{
    descriptor::{HookMethod, PatchDescriptor, priority},
    routine::OwnerId,
};
use std::collections::BTreeSet;

/// A single attachment.
///
/// Records are immutable. Re-registering replaces the whole record; nothing
/// mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    index: u64,
    owner: OwnerId,
    priority: i32,
    before: BTreeSet<OwnerId>,
    after: BTreeSet<OwnerId>,
    hook: HookMethod,
}

impl PatchRecord {
    /// Create a record with explicit ordering metadata.
    pub fn new(
        index: u64,
        owner: OwnerId,
        priority: i32,
        before: BTreeSet<OwnerId>,
        after: BTreeSet<OwnerId>,
        hook: HookMethod,
    ) -> Self {
        Self {
            index,
            owner,
            priority,
            before,
            after,
            hook,
        }
    }

    /// Build a record from a descriptor. Returns `None` when the descriptor
    /// names no hook routine.
    pub fn from_descriptor(index: u64, owner: OwnerId, descriptor: &PatchDescriptor) -> Option<Self> {
        let hook = descriptor.method.clone()?;
        Some(Self {
            index,
            owner,
            priority: descriptor.priority.unwrap_or(priority::NORMAL),
            before: descriptor.before.iter().flatten().cloned().collect(),
            after: descriptor.after.iter().flatten().cloned().collect(),
            hook,
        })
    }

    /// Registration sequence number within the owning table.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The owner that registered this record.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Ordering hint. Higher runs first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Owners this record must run before.
    pub fn before(&self) -> &BTreeSet<OwnerId> {
        &self.before
    }

    /// Owners this record must run after.
    pub fn after(&self) -> &BTreeSet<OwnerId> {
        &self.after
    }

    /// The hook routine.
    pub fn hook(&self) -> &HookMethod {
        &self.hook
    }
}
