//! # Trampoline Synthesis Boundary
//!
//! Building and installing the redirect that sequences hooks around an
//! original routine is the job of a [`Synthesizer`]. The composition engine
//! only hands it a resolved [`DispatchPlan`].
//!
//! Synthesizers must be idempotent: installing the same plan for the same
//! routine twice leaves the same dispatch behavior in place. The store calls
//! them with the composition lock held, so calls are never interleaved.

use crate::{
    error::BoxError,
    record::PatchRecord,
    routine::{OwnerId, RoutineId},
};
use std::sync::Arc;

/// The effective hook sequence for one routine, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Before-hooks, first to run first.
    pub before: Vec<PatchRecord>,
    /// Override hooks, first to run first.
    pub overrides: Vec<PatchRecord>,
    /// After-hooks, first to run first.
    pub after: Vec<PatchRecord>,
    /// Owners whose ordering constraints were dropped to break a cycle.
    pub forced: Vec<OwnerId>,
}

impl DispatchPlan {
    /// Whether the plan dispatches straight to the original.
    pub fn is_passthrough(&self) -> bool {
        self.before.is_empty() && self.overrides.is_empty() && self.after.is_empty()
    }
}

/// Installs dispatch trampolines.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a trampoline synthesizer",
    label = "missing `Synthesizer` implementation",
    note = "Implement `regenerate` to install a dispatch plan for a routine."
)]
pub trait Synthesizer: Send + Sync {
    /// Install `plan` as the dispatch behavior of `routine`.
    ///
    /// A passthrough plan restores the original routine.
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError>;
}

impl<S: Synthesizer + ?Sized> Synthesizer for Arc<S> {
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError> {
        (**self).regenerate(routine, plan)
    }
}

impl<S: Synthesizer + ?Sized> Synthesizer for Box<S> {
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError> {
        (**self).regenerate(routine, plan)
    }
}
