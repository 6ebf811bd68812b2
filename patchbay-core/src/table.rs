//! Per-routine patch tables and their read-only snapshots.

use crate::{record::PatchRecord, routine::OwnerId};
use bitflags::bitflags;
use std::{collections::BTreeSet, fmt};

/// Which sequence of a [`PatchTable`] a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    /// Runs before the original body.
    Before,
    /// Runs after the original body.
    After,
    /// Replaces the dispatch target.
    Override,
}

impl PatchKind {
    /// Every kind, in dispatch order.
    pub const ALL: [PatchKind; 3] = [PatchKind::Before, PatchKind::Override, PatchKind::After];

    /// The scope flag selecting this kind.
    pub fn scope(self) -> PatchScope {
        match self {
            PatchKind::Before => PatchScope::BEFORE,
            PatchKind::After => PatchScope::AFTER,
            PatchKind::Override => PatchScope::OVERRIDE,
        }
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatchKind::Before => "before",
            PatchKind::After => "after",
            PatchKind::Override => "override",
        })
    }
}

bitflags! {
    /// Set of record kinds a removal applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PatchScope: u8 {
        /// Before-hooks.
        const BEFORE = 1;
        /// After-hooks.
        const AFTER = 1 << 1;
        /// Override hooks.
        const OVERRIDE = 1 << 2;
        /// Every kind.
        const ALL = Self::BEFORE.bits() | Self::AFTER.bits() | Self::OVERRIDE.bits();
    }
}

impl PatchScope {
    /// Whether `kind` falls inside this scope.
    pub fn includes(self, kind: PatchKind) -> bool {
        self.contains(kind.scope())
    }
}

/// Authoritative patch state for one routine.
///
/// Within each sequence an owner appears at most once. Records keep the
/// order in which they were first registered; ordering for dispatch is
/// computed separately by [`crate::compose::plan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchTable {
    before: Vec<PatchRecord>,
    after: Vec<PatchRecord>,
    overrides: Vec<PatchRecord>,
    next_index: u64,
}

impl PatchTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one kind, in registration order.
    pub fn records(&self, kind: PatchKind) -> &[PatchRecord] {
        match kind {
            PatchKind::Before => &self.before,
            PatchKind::After => &self.after,
            PatchKind::Override => &self.overrides,
        }
    }

    pub(crate) fn records_mut(&mut self, kind: PatchKind) -> &mut Vec<PatchRecord> {
        match kind {
            PatchKind::Before => &mut self.before,
            PatchKind::After => &mut self.after,
            PatchKind::Override => &mut self.overrides,
        }
    }

    pub(crate) fn allocate_index(&mut self) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len() + self.overrides.len()
    }

    /// Whether no record of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `owner` has a record of any kind.
    pub fn has_owner(&self, owner: &OwnerId) -> bool {
        PatchKind::ALL
            .iter()
            .any(|&kind| self.records(kind).iter().any(|r| owner.matches(r.owner())))
    }

    /// Snapshot the three sequences.
    pub fn snapshot(&self) -> Patches {
        Patches {
            before: self.before.clone(),
            after: self.after.clone(),
            overrides: self.overrides.clone(),
        }
    }
}

/// Immutable copy of one routine's records, as returned by store queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patches {
    /// Before-hooks in registration order.
    pub before: Vec<PatchRecord>,
    /// After-hooks in registration order.
    pub after: Vec<PatchRecord>,
    /// Override hooks in registration order.
    pub overrides: Vec<PatchRecord>,
}

impl Patches {
    /// Every owner with at least one record.
    pub fn owners(&self) -> BTreeSet<OwnerId> {
        self.before
            .iter()
            .chain(&self.after)
            .chain(&self.overrides)
            .map(|r| r.owner().clone())
            .collect()
    }

    /// Whether all three sequences are empty.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty() && self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_includes() {
        assert!(PatchScope::ALL.includes(PatchKind::Before));
        assert!(PatchScope::ALL.includes(PatchKind::Override));
        assert!(!PatchScope::AFTER.includes(PatchKind::Before));
        assert!((PatchScope::BEFORE | PatchScope::AFTER).includes(PatchKind::After));
    }

    #[test]
    fn test_index_allocation_is_monotonic() {
        let mut table = PatchTable::new();
        assert_eq!(table.allocate_index(), 0);
        assert_eq!(table.allocate_index(), 1);
        assert!(table.is_empty());
    }
}
