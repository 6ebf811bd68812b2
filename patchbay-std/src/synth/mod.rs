//! Standard synthesizers.

pub mod traced;

use patchbay_core::{BoxError, DispatchPlan, RoutineId, Synthesizer};

pub use traced::TracingSynthesizer;

/// A synthesizer that installs nothing.
///
/// Useful for hosts that only need the composition bookkeeping, and as the
/// default for the process-wide store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSynthesizer;

impl Synthesizer for NoopSynthesizer {
    fn regenerate(&self, _routine: &RoutineId, _plan: &DispatchPlan) -> Result<(), BoxError> {
        Ok(())
    }
}
