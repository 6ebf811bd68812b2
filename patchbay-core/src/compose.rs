//! # Composition Engine
//!
//! Pure operations over a [`PatchTable`]: adding and removing records, and
//! resolving the effective dispatch order consumed by a
//! [`Synthesizer`](crate::Synthesizer).
//!
//! # Ordering
//!
//! Each sequence is ordered independently:
//!
//! 1. Explicit owner constraints (`before` / `after`) form a precedence
//!    graph that is always respected unless it contains a cycle.
//! 2. Among records whose constraints are satisfied, the highest priority
//!    value runs first.
//! 3. Ties fall back to registration index: ascending for before and
//!    override hooks, descending for after-hooks, so the last attached
//!    after-hook runs first.
//!
//! When the graph is cyclic, the record that would win the tie-break is
//! emitted with its unsatisfied constraints ignored and its owner is listed
//! in [`DispatchPlan::forced`]. The result depends only on the table
//! contents, so regenerating from the same table always gives the same plan.

use crate::{
    descriptor::PatchDescriptor,
    record::PatchRecord,
    routine::{OwnerId, RoutineId},
    synth::DispatchPlan,
    table::{PatchKind, PatchScope, PatchTable},
};
use std::cmp::Reverse;

/// Insert the record described by `descriptor` into the `kind` sequence.
///
/// A descriptor without a hook routine is ignored. If `owner` already has a
/// record of that kind, it is replaced at the same position and keeps its
/// registration index. Returns whether the table changed.
pub fn add_record(
    table: &mut PatchTable,
    kind: PatchKind,
    owner: &OwnerId,
    descriptor: &PatchDescriptor,
) -> bool {
    let existing = table
        .records(kind)
        .iter()
        .position(|r| r.owner() == owner);

    match existing {
        Some(slot) => {
            let index = table.records(kind)[slot].index();
            let Some(record) = PatchRecord::from_descriptor(index, owner.clone(), descriptor) else {
                return false;
            };
            let records = table.records_mut(kind);
            if records[slot] == record {
                return false;
            }
            records[slot] = record;
            true
        }
        None => {
            if descriptor.method.is_none() {
                return false;
            }
            let index = table.allocate_index();
            let Some(record) = PatchRecord::from_descriptor(index, owner.clone(), descriptor) else {
                return false;
            };
            table.records_mut(kind).push(record);
            true
        }
    }
}

/// Strip every record of `owner` in the kinds selected by `scope`.
///
/// The wildcard owner strips every record in scope. Returns the number of
/// records removed.
pub fn remove_by_owner(table: &mut PatchTable, scope: PatchScope, owner: &OwnerId) -> usize {
    let mut removed = 0;
    for kind in PatchKind::ALL {
        if !scope.includes(kind) {
            continue;
        }
        let records = table.records_mut(kind);
        let before = records.len();
        records.retain(|r| !owner.matches(r.owner()));
        removed += before - records.len();
    }
    removed
}

/// Strip the records whose hook routine is `hook`, from whichever sequence
/// holds them. Returns the number of records removed.
pub fn remove_by_hook(table: &mut PatchTable, hook: &RoutineId) -> usize {
    let mut removed = 0;
    for kind in PatchKind::ALL {
        let records = table.records_mut(kind);
        let before = records.len();
        records.retain(|r| r.hook().routine() != hook);
        removed += before - records.len();
    }
    removed
}

/// Resolve the effective dispatch plan for a table.
pub fn plan(table: &PatchTable) -> DispatchPlan {
    let mut forced = Vec::new();
    let before = order(table.records(PatchKind::Before), PatchKind::Before, &mut forced);
    let overrides = order(
        table.records(PatchKind::Override),
        PatchKind::Override,
        &mut forced,
    );
    let after = order(table.records(PatchKind::After), PatchKind::After, &mut forced);
    DispatchPlan {
        before,
        overrides,
        after,
        forced,
    }
}

/// Order one sequence for dispatch. See the module docs for the policy.
pub fn order(records: &[PatchRecord], kind: PatchKind, forced: &mut Vec<OwnerId>) -> Vec<PatchRecord> {
    let n = records.len();
    let key = |i: usize| {
        let r = &records[i];
        let tie = match kind {
            PatchKind::After => u64::MAX - r.index(),
            PatchKind::Before | PatchKind::Override => r.index(),
        };
        (Reverse(r.priority()), tie)
    };

    // successors[i] holds every j that must run after i
    let mut successors = vec![Vec::new(); n];
    let mut pending = vec![0usize; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (&records[i], &records[j]);
            if a.before().contains(b.owner()) || b.after().contains(a.owner()) {
                successors[i].push(j);
                pending[j] += 1;
            }
        }
    }

    let mut emitted = vec![false; n];
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let ready = (0..n)
            .filter(|&i| !emitted[i] && pending[i] == 0)
            .min_by_key(|&i| key(i));
        let next = match ready {
            Some(i) => i,
            None => {
                let Some(i) = (0..n).filter(|&i| !emitted[i]).min_by_key(|&i| key(i)) else {
                    break;
                };
                forced.push(records[i].owner().clone());
                i
            }
        };
        emitted[next] = true;
        for &j in &successors[next] {
            pending[j] = pending[j].saturating_sub(1);
        }
        out.push(records[next].clone());
    }
    out
}
