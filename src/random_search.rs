//! Pure random search.
//!
//! Draws one candidate from the search space per step. Useful as a
//! baseline for comparing against [`DifferentialEvolution`](crate::de::DifferentialEvolution)
//! with the same driver, objective and termination.

use std::sync::Arc;

use crate::candidate::Candidate;
use crate::error::Result;
use crate::objective::Objective;
use crate::optimizer::{SearchStrategy, StepContext};
use crate::search_space::SearchSpace;

/// Samples one candidate per step.
#[derive(Debug)]
pub struct RandomSearch {
    objective: Arc<Objective>,
    space: SearchSpace,
}

impl RandomSearch {
    /// Search `space` under `objective`.
    #[must_use]
    pub fn new(objective: Arc<Objective>, space: SearchSpace) -> Self {
        Self { objective, space }
    }

    /// The search space.
    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.space
    }
}

impl SearchStrategy for RandomSearch {
    fn name(&self) -> &str {
        "random search"
    }

    fn objective(&self) -> &Arc<Objective> {
        &self.objective
    }

    fn seed_candidate(&mut self) -> Candidate {
        self.space.gen_candidate()
    }

    fn step(&mut self, _ctx: &StepContext<'_>) -> Result<Vec<Candidate>> {
        let candidate = self.space.gen_candidate();
        self.objective.quality_of(&candidate)?;
        Ok(vec![candidate])
    }
}
