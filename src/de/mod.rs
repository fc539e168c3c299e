//! Steady-state differential evolution.
//!
//! Each step touches at most one population member:
//!
//! 1. **Sample** `k = 1 + parents` distinct members without replacement; the
//!    first is the *target*.
//! 2. **Mutate** the parents into a donor (see [`MutationStrategy`]).
//! 3. **Cross over** target and donor into a trial vector
//!    ([`CrossoverStrategy`]).
//! 4. **Bound** the trial back into the search space ([`BoundingStrategy`]).
//! 5. **Select**: rank `[trial, target]` with the objective's comparator. If
//!    the trial ranks first (ties included) it replaces the target.
//!
//! Selection outcomes are fed to a [`FeedbackStrategy`], which may adapt
//! the scale factor and crossover rate.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `population_size` | 40 | Members kept; must be at least `k` |
//! | `scale_factor` (F) | 0.7 | Difference-vector amplification, `> 0` |
//! | `crossover_rate` (CR) | 0.5 | Probability of taking a donor coordinate, in `[0, 1]` |
//! | `variant` | [`DeVariant::Rand1Bin`] | Mutation preset |
//! | `bounding` | [`RandomRepair`] | Out-of-range handling |
//! | `feedback` | [`NoFeedback`] | Parameter adaptation |
//! | `seed` | random | RNG seed for parent sampling and crossover |
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use diffevo::de::{DeVariant, DifferentialEvolution};
//! use diffevo::optimizer::Optimizer;
//! use diffevo::termination::MaxStepsTerminationCriterion;
//! use diffevo::{Objective, SearchSpace};
//!
//! let objective = Arc::new(
//!     Objective::builder()
//!         .minimize("sphere", |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())
//!         .build()?,
//! );
//! let space = SearchSpace::symmetric(2, -5.0, 5.0)?.with_seed(1);
//! let de = DifferentialEvolution::builder(objective, space)
//!     .variant(DeVariant::Best1Bin)
//!     .population_size(20)
//!     .seed(7)
//!     .build()?;
//!
//! let mut optimizer =
//!     Optimizer::new(de).with_termination(MaxStepsTerminationCriterion::new(500));
//! let best = optimizer.optimize()?;
//! assert!(best.as_slice().iter().all(|v| v.abs() < 1.0));
//! # Ok::<(), diffevo::Error>(())
//! ```

mod strategy;

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::strategy::{
    Best1, Best2, Binomial, BoundingStrategy, Clamp, CrossoverStrategy, FeedbackStrategy,
    MutationStrategy, NoFeedback, Rand1, RandomRepair, SuccessRateAdaptation,
};
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink, NullSink, tags};
use crate::objective::Objective;
use crate::optimizer::{SearchStrategy, StepContext};
use crate::rng_util;
use crate::search_space::SearchSpace;

/// Tunable DE parameters. Feedback strategies may change them between steps.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeParameters {
    /// Scale factor `F` applied to difference vectors.
    pub scale_factor: f64,
    /// Crossover rate `CR`.
    pub crossover_rate: f64,
}

impl Default for DeParameters {
    fn default() -> Self {
        Self {
            scale_factor: 0.7,
            crossover_rate: 0.5,
        }
    }
}

/// Classic `DE/x/y/bin` presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeVariant {
    /// `DE/rand/1/bin`: three random parents.
    #[default]
    Rand1Bin,
    /// `DE/best/1/bin`: best plus one difference.
    Best1Bin,
    /// `DE/best/2/bin`: best plus two differences.
    Best2Bin,
}

impl DeVariant {
    /// Parents sampled per step, excluding the target.
    #[must_use]
    pub fn num_parents(self) -> usize {
        self.mutation().num_parents()
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rand1Bin => "DE/rand/1/bin",
            Self::Best1Bin => "DE/best/1/bin",
            Self::Best2Bin => "DE/best/2/bin",
        }
    }

    fn mutation(self) -> Box<dyn MutationStrategy> {
        match self {
            Self::Rand1Bin => Box::new(Rand1),
            Self::Best1Bin => Box::new(Best1),
            Self::Best2Bin => Box::new(Best2),
        }
    }
}

/// Steady-state differential evolution search strategy.
///
/// Drive it with an [`Optimizer`](crate::optimizer::Optimizer).
pub struct DifferentialEvolution {
    name: String,
    objective: Arc<Objective>,
    space: SearchSpace,
    population: Vec<Candidate>,
    permutation: Vec<usize>,
    params: DeParameters,
    mutation: Box<dyn MutationStrategy>,
    crossover: Box<dyn CrossoverStrategy>,
    bounding: Box<dyn BoundingStrategy>,
    feedback: Box<dyn FeedbackStrategy>,
    rng: fastrand::Rng,
    sink: Arc<dyn EventSink>,
}

impl DifferentialEvolution {
    /// Start configuring a DE strategy.
    #[must_use]
    pub fn builder(objective: Arc<Objective>, space: SearchSpace) -> DifferentialEvolutionBuilder {
        DifferentialEvolutionBuilder::new(objective, space)
    }

    /// `DE/rand/1/bin` with default parameters.
    ///
    /// # Errors
    ///
    /// See [`DifferentialEvolutionBuilder::build`].
    pub fn rand_1_bin(objective: Arc<Objective>, space: SearchSpace) -> Result<Self> {
        Self::builder(objective, space)
            .variant(DeVariant::Rand1Bin)
            .build()
    }

    /// `DE/best/1/bin` with default parameters.
    ///
    /// # Errors
    ///
    /// See [`DifferentialEvolutionBuilder::build`].
    pub fn best_1_bin(objective: Arc<Objective>, space: SearchSpace) -> Result<Self> {
        Self::builder(objective, space)
            .variant(DeVariant::Best1Bin)
            .build()
    }

    /// `DE/best/2/bin` with default parameters.
    ///
    /// # Errors
    ///
    /// See [`DifferentialEvolutionBuilder::build`].
    pub fn best_2_bin(objective: Arc<Objective>, space: SearchSpace) -> Result<Self> {
        Self::builder(objective, space)
            .variant(DeVariant::Best2Bin)
            .build()
    }

    /// Current population.
    #[must_use]
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// Current parameters, after any feedback.
    #[must_use]
    pub fn parameters(&self) -> DeParameters {
        self.params
    }

    /// The search space.
    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.space
    }

    /// Members sampled per step, target included.
    #[must_use]
    pub fn num_sampled(&self) -> usize {
        1 + self.mutation.num_parents()
    }
}

impl SearchStrategy for DifferentialEvolution {
    fn name(&self) -> &str {
        &self.name
    }

    fn objective(&self) -> &Arc<Objective> {
        &self.objective
    }

    fn seed_candidate(&mut self) -> Candidate {
        self.space.gen_candidate()
    }

    fn step(&mut self, ctx: &StepContext<'_>) -> Result<Vec<Candidate>> {
        let k = self.num_sampled();
        rng_util::partial_shuffle(&mut self.rng, &mut self.permutation, k);
        let target_idx = self.permutation[0];
        let target = self.population[target_idx].clone();
        let parents: Vec<Candidate> = self.permutation[1..k]
            .iter()
            .map(|&i| self.population[i].clone())
            .collect();

        let donor = self.mutation.mutate(&parents, ctx.best, &self.params);
        let trial = self
            .crossover
            .crossover(&mut self.rng, &target, &donor, &self.params);
        let trial = self.bounding.bound(&mut self.space, &trial);

        let ranked = self
            .objective
            .rank_candidates(&[trial.clone(), target.clone()])?;
        let trial_better = ranked.first().is_some_and(|c| c.id() == trial.id());

        if trial_better {
            self.population[target_idx] = trial.clone();
            let quality = self.objective.quality_of(&trial)?;
            trace_debug!(
                step = ctx.state.num_optimization_steps,
                target = target_idx,
                value = quality.value(),
                "trial replaced target"
            );
            self.sink.record(
                Event::new(
                    tags::TRIAL_BETTER,
                    format!("trial replaced population member {target_idx}"),
                )
                .with("target", target_idx)
                .with("value", quality.display_value())
                .with("candidate", trial.as_slice()),
            );
        }
        self.feedback.feedback(trial_better, &mut self.params);

        Ok(vec![trial])
    }
}

impl core::fmt::Debug for DifferentialEvolution {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DifferentialEvolution")
            .field("name", &self.name)
            .field("population_size", &self.population.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DifferentialEvolution`].
#[must_use]
pub struct DifferentialEvolutionBuilder {
    objective: Arc<Objective>,
    space: SearchSpace,
    population_size: usize,
    params: DeParameters,
    variant: DeVariant,
    mutation: Option<Box<dyn MutationStrategy>>,
    crossover: Box<dyn CrossoverStrategy>,
    bounding: Box<dyn BoundingStrategy>,
    feedback: Box<dyn FeedbackStrategy>,
    seed: Option<u64>,
    sink: Arc<dyn EventSink>,
}

impl DifferentialEvolutionBuilder {
    /// Default population size.
    pub const DEFAULT_POPULATION_SIZE: usize = 40;

    fn new(objective: Arc<Objective>, space: SearchSpace) -> Self {
        Self {
            objective,
            space,
            population_size: Self::DEFAULT_POPULATION_SIZE,
            params: DeParameters::default(),
            variant: DeVariant::default(),
            mutation: None,
            crossover: Box::new(Binomial),
            bounding: Box::new(RandomRepair),
            feedback: Box::new(NoFeedback),
            seed: None,
            sink: Arc::new(NullSink),
        }
    }

    /// Number of population members.
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Scale factor `F`.
    pub fn scale_factor(mut self, f: f64) -> Self {
        self.params.scale_factor = f;
        self
    }

    /// Crossover rate `CR`.
    pub fn crossover_rate(mut self, cr: f64) -> Self {
        self.params.crossover_rate = cr;
        self
    }

    /// Both parameters at once.
    pub fn parameters(mut self, params: DeParameters) -> Self {
        self.params = params;
        self
    }

    /// Mutation preset. Ignored if a custom [`mutation`](Self::mutation) is set.
    pub fn variant(mut self, variant: DeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Custom mutation strategy.
    pub fn mutation(mut self, mutation: impl MutationStrategy + 'static) -> Self {
        self.mutation = Some(Box::new(mutation));
        self
    }

    /// Crossover strategy.
    pub fn crossover(mut self, crossover: impl CrossoverStrategy + 'static) -> Self {
        self.crossover = Box::new(crossover);
        self
    }

    /// Bounding strategy.
    pub fn bounding(mut self, bounding: impl BoundingStrategy + 'static) -> Self {
        self.bounding = Box::new(bounding);
        self
    }

    /// Feedback strategy.
    pub fn feedback(mut self, feedback: impl FeedbackStrategy + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    /// Seed for parent sampling and crossover.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Where `de.trial_better` events go.
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate the configuration and sample the initial population.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `F` is not positive and
    /// finite, `CR` is outside `[0, 1]`, or the population is smaller than
    /// the number of members sampled per step.
    pub fn build(self) -> Result<DifferentialEvolution> {
        let DeParameters {
            scale_factor,
            crossover_rate,
        } = self.params;
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(Error::invalid_parameter(
                "scale_factor",
                format!("must be positive and finite, got {scale_factor}"),
            ));
        }
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(Error::invalid_parameter(
                "crossover_rate",
                format!("must be in [0, 1], got {crossover_rate}"),
            ));
        }

        let (name, mutation) = match self.mutation {
            Some(m) => ("DE/custom".to_owned(), m),
            None => (self.variant.name().to_owned(), self.variant.mutation()),
        };
        let k = 1 + mutation.num_parents();
        if self.population_size < k {
            return Err(Error::invalid_parameter(
                "population_size",
                format!(
                    "{name} samples {k} members per step but the population has {}",
                    self.population_size
                ),
            ));
        }

        let mut space = self.space;
        let population: Vec<Candidate> = (0..self.population_size)
            .map(|_| space.gen_candidate())
            .collect();
        trace_info!(
            strategy = %name,
            population = population.len(),
            scale_factor,
            crossover_rate,
            "differential evolution initialized"
        );

        Ok(DifferentialEvolution {
            name,
            objective: self.objective,
            space,
            permutation: (0..population.len()).collect(),
            population,
            params: self.params,
            mutation,
            crossover: self.crossover,
            bounding: self.bounding,
            feedback: self.feedback,
            rng: rng_util::seeded(self.seed),
            sink: self.sink,
        })
    }
}

impl core::fmt::Debug for DifferentialEvolutionBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DifferentialEvolutionBuilder")
            .field("population_size", &self.population_size)
            .field("params", &self.params)
            .field("variant", &self.variant)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
