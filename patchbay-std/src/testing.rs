//! Testing utilities for Patchbay.
//!
//! - [`RecordingSynthesizer`]: records every regeneration and the last plan
//!   installed per routine
//! - [`FailingSynthesizer`]: fails regeneration for selected routines

use indexmap::IndexMap;
use parking_lot::Mutex;
use patchbay_core::{BoxError, DispatchPlan, RoutineId, Synthesizer};
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;

// ============================================================================
// Recording Synthesizer
// ============================================================================

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<(RoutineId, DispatchPlan)>,
    installed: IndexMap<RoutineId, DispatchPlan>,
}

/// A synthesizer that records what it was asked to install.
///
/// Clones share the same record, so keep one clone for inspection and hand
/// the other to the store.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingSynthesizer::new();
/// let store = PatchStore::new(recorder.clone());
///
/// // patch something...
///
/// let plan = recorder.installed(&routine).unwrap();
/// assert_eq!(plan.before.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSynthesizer {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSynthesizer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every regeneration in call order.
    pub fn calls(&self) -> Vec<(RoutineId, DispatchPlan)> {
        self.recorded.lock().calls.clone()
    }

    /// Number of regenerations.
    pub fn count(&self) -> usize {
        self.recorded.lock().calls.len()
    }

    /// The plan most recently installed for `routine`.
    pub fn installed(&self, routine: &RoutineId) -> Option<DispatchPlan> {
        self.recorded.lock().installed.get(routine).cloned()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        let mut recorded = self.recorded.lock();
        recorded.calls.clear();
        recorded.installed.clear();
    }
}

impl Synthesizer for RecordingSynthesizer {
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError> {
        let mut recorded = self.recorded.lock();
        recorded.calls.push((routine.clone(), plan.clone()));
        recorded.installed.insert(routine.clone(), plan.clone());
        Ok(())
    }
}

// ============================================================================
// Failing Synthesizer
// ============================================================================

/// Error returned by [`FailingSynthesizer`].
#[derive(Error, Debug, Clone)]
#[error("refusing to install dispatch for {routine}")]
pub struct InstallError {
    routine: RoutineId,
}

/// A synthesizer that fails for chosen routines and succeeds otherwise.
#[derive(Debug, Clone)]
pub struct FailingSynthesizer {
    targets: Option<HashSet<RoutineId>>,
}

impl FailingSynthesizer {
    /// Fail every regeneration.
    pub fn always() -> Self {
        Self { targets: None }
    }

    /// Fail only for the given routines.
    pub fn for_routines(routines: impl IntoIterator<Item = RoutineId>) -> Self {
        Self {
            targets: Some(routines.into_iter().collect()),
        }
    }
}

impl Synthesizer for FailingSynthesizer {
    fn regenerate(&self, routine: &RoutineId, _plan: &DispatchPlan) -> Result<(), BoxError> {
        let fails = match &self.targets {
            Some(targets) => targets.contains(routine),
            None => true,
        };
        if fails {
            return Err(Box::new(InstallError {
                routine: routine.clone(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine(name: &str) -> RoutineId {
        RoutineId::method("T", name, Vec::<&str>::new())
    }

    #[test]
    fn test_recording_keeps_latest_plan() {
        let recorder = RecordingSynthesizer::new();
        let shared = recorder.clone();
        shared.regenerate(&routine("a"), &DispatchPlan::default()).unwrap();
        shared.regenerate(&routine("a"), &DispatchPlan::default()).unwrap();
        shared.regenerate(&routine("b"), &DispatchPlan::default()).unwrap();

        assert_eq!(recorder.count(), 3);
        assert!(recorder.installed(&routine("b")).is_some());
        assert!(recorder.installed(&routine("c")).is_none());

        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_failing_for_selected_routines() {
        let synth = FailingSynthesizer::for_routines([routine("bad")]);
        assert!(synth.regenerate(&routine("ok"), &DispatchPlan::default()).is_ok());
        let err = synth
            .regenerate(&routine("bad"), &DispatchPlan::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "refusing to install dispatch for T::bad()");
    }
}
