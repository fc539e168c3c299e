//! Pluggable pieces of a DE step: mutation, crossover, bounding and
//! parameter feedback.

use std::collections::VecDeque;

use super::DeParameters;
use crate::candidate::Candidate;
use crate::search_space::SearchSpace;

/// Builds a donor vector from sampled parents.
pub trait MutationStrategy: Send {
    /// Number of parents (besides the target) consumed per step.
    fn num_parents(&self) -> usize;

    /// Create the donor. `parents` holds exactly
    /// [`num_parents`](Self::num_parents) distinct population members,
    /// none of them the target.
    fn mutate(&self, parents: &[Candidate], best: &Candidate, params: &DeParameters) -> Candidate;
}

/// DE/rand/1: `v = p₃ + F * (p₁ - p₂)`.
///
/// The most robust strategy; keeps the population diverse.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rand1;

impl MutationStrategy for Rand1 {
    fn num_parents(&self) -> usize {
        3
    }

    fn mutate(&self, parents: &[Candidate], _best: &Candidate, params: &DeParameters) -> Candidate {
        parents[2].add_scaled_difference(params.scale_factor, &parents[0], &parents[1])
    }
}

/// DE/best/1: `v = best + F * (p₁ - p₂)`.
///
/// Greedier; converges faster on unimodal landscapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Best1;

impl MutationStrategy for Best1 {
    fn num_parents(&self) -> usize {
        2
    }

    fn mutate(&self, parents: &[Candidate], best: &Candidate, params: &DeParameters) -> Candidate {
        best.add_scaled_difference(params.scale_factor, &parents[0], &parents[1])
    }
}

/// DE/best/2: `v = best + F * (p₁ - p₂) + F * (p₃ - p₄)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Best2;

impl MutationStrategy for Best2 {
    fn num_parents(&self) -> usize {
        4
    }

    fn mutate(&self, parents: &[Candidate], best: &Candidate, params: &DeParameters) -> Candidate {
        let f = params.scale_factor;
        let values: Vec<f64> = best
            .as_slice()
            .iter()
            .enumerate()
            .map(|(j, &b)| {
                b + f * (parents[0][j] - parents[1][j]) + f * (parents[2][j] - parents[3][j])
            })
            .collect();
        Candidate::new(values)
    }
}

/// Mixes the target with the donor into a trial vector.
pub trait CrossoverStrategy: Send {
    /// Produce the trial vector.
    fn crossover(
        &self,
        rng: &mut fastrand::Rng,
        target: &Candidate,
        donor: &Candidate,
        params: &DeParameters,
    ) -> Candidate;
}

/// Binomial crossover: each coordinate comes from the donor with
/// probability `CR`, and one randomly chosen coordinate always does.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binomial;

impl CrossoverStrategy for Binomial {
    fn crossover(
        &self,
        rng: &mut fastrand::Rng,
        target: &Candidate,
        donor: &Candidate,
        params: &DeParameters,
    ) -> Candidate {
        debug_assert_eq!(target.len(), donor.len());
        let forced = rng.usize(0..target.len().max(1));
        let values: Vec<f64> = (0..target.len())
            .map(|j| {
                if j == forced || rng.f64() < params.crossover_rate {
                    donor[j]
                } else {
                    target[j]
                }
            })
            .collect();
        Candidate::new(values)
    }
}

/// Brings an out-of-range trial vector back into the search space.
pub trait BoundingStrategy: Send {
    /// Return an in-range candidate; in-range input is returned unchanged.
    fn bound(&self, space: &mut SearchSpace, candidate: &Candidate) -> Candidate;
}

/// Re-sample every out-of-range coordinate uniformly within its bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRepair;

impl BoundingStrategy for RandomRepair {
    fn bound(&self, space: &mut SearchSpace, candidate: &Candidate) -> Candidate {
        space.bound(candidate)
    }
}

/// Clamp every out-of-range coordinate to the nearest bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clamp;

impl BoundingStrategy for Clamp {
    fn bound(&self, space: &mut SearchSpace, candidate: &Candidate) -> Candidate {
        space.clamp(candidate)
    }
}

/// Adapts DE parameters from selection outcomes.
pub trait FeedbackStrategy: Send {
    /// Called once per step with whether the trial replaced its target.
    fn feedback(&mut self, trial_better: bool, params: &mut DeParameters);
}

/// Leaves the parameters alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeedback;

impl FeedbackStrategy for NoFeedback {
    fn feedback(&mut self, _trial_better: bool, _params: &mut DeParameters) {}
}

/// Success-rate driven scale factor: `F = 0.4 + 0.25 * tanh(5 * SR)`, where
/// `SR` is the fraction of successful trials over a sliding window.
///
/// A high success rate widens the steps; a low one narrows them for local
/// refinement.
#[derive(Clone, Debug)]
pub struct SuccessRateAdaptation {
    window: VecDeque<bool>,
    capacity: usize,
    successes: usize,
}

impl SuccessRateAdaptation {
    /// Default sliding window length, in steps.
    pub const DEFAULT_WINDOW: usize = 40;

    /// Track the last `window` outcomes. A zero window is treated as one.
    #[must_use]
    pub fn new(window: usize) -> Self {
        let capacity = window.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            successes: 0,
        }
    }

    /// Fraction of successes in the current window, `0` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.successes as f64 / self.window.len() as f64
        }
    }
}

impl Default for SuccessRateAdaptation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl FeedbackStrategy for SuccessRateAdaptation {
    fn feedback(&mut self, trial_better: bool, params: &mut DeParameters) {
        if self.window.len() == self.capacity && self.window.pop_front() == Some(true) {
            self.successes -= 1;
        }
        self.window.push_back(trial_better);
        if trial_better {
            self.successes += 1;
        }
        params.scale_factor = 0.4 + 0.25 * (5.0 * self.success_rate()).tanh();
    }
}
