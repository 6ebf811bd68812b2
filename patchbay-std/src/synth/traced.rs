//! Span-instrumented synthesizer wrapper.

use patchbay_core::{BoxError, DispatchPlan, RoutineId, Synthesizer};

/// A synthesizer wrapper that instruments each regeneration with a
/// `tracing` span.
///
/// With the `tracing` feature disabled it simply forwards to the inner
/// synthesizer.
#[derive(Debug, Clone)]
pub struct TracingSynthesizer<S> {
    inner: S,
    name: &'static str,
}

impl<S> TracingSynthesizer<S> {
    /// Wrap a synthesizer.
    pub const fn new(inner: S, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// The wrapped synthesizer.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Synthesizer> Synthesizer for TracingSynthesizer<S> {
    #[cfg(feature = "tracing")]
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError> {
        let span = tracing::info_span!(
            "regenerate",
            synthesizer = %self.name,
            routine = %routine,
            before = plan.before.len(),
            overrides = plan.overrides.len(),
            after = plan.after.len(),
        );
        let _entered = span.enter();

        let result = self.inner.regenerate(routine, plan);
        if let Err(err) = &result {
            tracing::error!(error = %err, "dispatch regeneration failed");
        }
        result
    }

    #[cfg(not(feature = "tracing"))]
    fn regenerate(&self, routine: &RoutineId, plan: &DispatchPlan) -> Result<(), BoxError> {
        let _ = self.name;
        self.inner.regenerate(routine, plan)
    }
}
