//! When to stop the optimization loop.
//!
//! Criteria are checked between steps only, against the driver's
//! [`OptimizerState`].

use crate::optimizer::OptimizerState;

/// Decides whether the optimizer should stop.
pub trait TerminationCriterion: Send {
    /// Returns `true` to stop before the next step.
    fn terminate(&self, state: &OptimizerState) -> bool;
}

impl<T: TerminationCriterion + Sync + ?Sized> TerminationCriterion for std::sync::Arc<T> {
    fn terminate(&self, state: &OptimizerState) -> bool {
        (**self).terminate(state)
    }
}

/// Never stops on its own.
///
/// Only useful together with another criterion inside [`AnyOf`] or when the
/// loop is aborted by an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverTerminate;

impl TerminationCriterion for NeverTerminate {
    fn terminate(&self, _state: &OptimizerState) -> bool {
        false
    }
}

/// Stops after a fixed number of optimization steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxStepsTerminationCriterion {
    max_steps: u64,
}

impl MaxStepsTerminationCriterion {
    /// The default step budget.
    pub const DEFAULT_MAX_STEPS: u64 = 1000;

    /// Stop once `max_steps` steps have run.
    #[must_use]
    pub fn new(max_steps: u64) -> Self {
        Self { max_steps }
    }

    /// The step budget.
    #[must_use]
    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }
}

impl Default for MaxStepsTerminationCriterion {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_STEPS)
    }
}

impl TerminationCriterion for MaxStepsTerminationCriterion {
    fn terminate(&self, state: &OptimizerState) -> bool {
        state.num_optimization_steps >= self.max_steps
    }
}

/// Stops as soon as any inner criterion does.
#[derive(Default)]
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Combine `criteria`. An empty list never terminates.
    #[must_use]
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Add one more criterion.
    #[must_use]
    pub fn or(mut self, criterion: impl TerminationCriterion + 'static) -> Self {
        self.criteria.push(Box::new(criterion));
        self
    }
}

impl core::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnyOf")
            .field("criteria", &self.criteria.len())
            .finish()
    }
}

impl TerminationCriterion for AnyOf {
    fn terminate(&self, state: &OptimizerState) -> bool {
        self.criteria.iter().any(|c| c.terminate(state))
    }
}

/// Stops once the best aggregate reaches a target value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetQualityTerminationCriterion {
    target: f64,
}

impl TargetQualityTerminationCriterion {
    /// Stop once the best aggregate quality is at or below `target`.
    #[must_use]
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl TerminationCriterion for TargetQualityTerminationCriterion {
    fn terminate(&self, state: &OptimizerState) -> bool {
        state
            .best_quality
            .as_ref()
            .is_some_and(|q| q.value() <= self.target)
    }
}
