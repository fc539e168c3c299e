//! Settings for the [`convenience`](crate::convenience) entry points.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::de::{DeParameters, DeVariant, DifferentialEvolutionBuilder};
use crate::termination::{MaxStepsTerminationCriterion, TerminationCriterion};

/// Differential evolution settings with a step budget.
///
/// Built with chained setters. Under the `serde` feature it can also be read
/// from JSON; missing fields keep their defaults and a custom termination
/// criterion can only be set in code.
///
/// ```
/// use diffevo::de::DeVariant;
/// use diffevo::options::Options;
///
/// let options = Options::new()
///     .population_size(20)
///     .variant(DeVariant::Best1Bin)
///     .max_num_steps(500)
///     .seed(7);
/// let x = diffevo::convenience::minimize(1, -1.0, 1.0, &options, |x: &[f64]| x[0].abs())?;
/// assert_eq!(x.len(), 1);
/// # Ok::<(), diffevo::Error>(())
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[must_use]
pub struct Options {
    population_size: usize,
    scale_factor: f64,
    crossover_rate: f64,
    variant: DeVariant,
    max_num_steps: u64,
    seed: Option<u64>,
    verbose: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    termination: Option<Arc<dyn TerminationCriterion + Sync>>,
}

impl Default for Options {
    fn default() -> Self {
        let params = DeParameters::default();
        Self {
            population_size: DifferentialEvolutionBuilder::DEFAULT_POPULATION_SIZE,
            scale_factor: params.scale_factor,
            crossover_rate: params.crossover_rate,
            variant: DeVariant::default(),
            max_num_steps: MaxStepsTerminationCriterion::DEFAULT_MAX_STEPS,
            seed: None,
            verbose: false,
            termination: None,
        }
    }
}

impl Options {
    /// Default settings: rand/1/bin, 40 members, `F = 0.7`, `CR = 0.5`, 1000 steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the text is not a
    /// valid settings object.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Population size.
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Scale factor `F`.
    pub fn scale_factor(mut self, f: f64) -> Self {
        self.scale_factor = f;
        self
    }

    /// Crossover rate `CR`.
    pub fn crossover_rate(mut self, cr: f64) -> Self {
        self.crossover_rate = cr;
        self
    }

    /// Mutation preset; decides how many parents are sampled per step.
    pub fn variant(mut self, variant: DeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Step budget, ignored when a custom termination criterion is set.
    pub fn max_num_steps(mut self, steps: u64) -> Self {
        self.max_num_steps = steps;
        self
    }

    /// Seed every random source for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Report progress through the verbose event sink.
    ///
    /// The sink logs through `tracing`. Without the `tracing` feature it is a
    /// [`NullSink`](crate::events::NullSink) and this flag has no effect.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the step budget with a custom criterion.
    pub fn termination(mut self, criterion: impl TerminationCriterion + Sync + 'static) -> Self {
        self.termination = Some(Arc::new(criterion));
        self
    }

    /// Number of population members.
    #[must_use]
    pub(crate) fn get_population_size(&self) -> usize {
        self.population_size
    }

    /// Scale factor and crossover rate as one value.
    #[must_use]
    pub(crate) fn get_parameters(&self) -> DeParameters {
        DeParameters {
            scale_factor: self.scale_factor,
            crossover_rate: self.crossover_rate,
        }
    }

    /// Mutation preset.
    #[must_use]
    pub(crate) fn get_variant(&self) -> DeVariant {
        self.variant
    }

    #[must_use]
    pub(crate) fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub(crate) fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// The criterion a run with these options stops on.
    #[must_use]
    pub fn termination_criterion(&self) -> Box<dyn TerminationCriterion> {
        match &self.termination {
            Some(custom) => Box::new(Arc::clone(custom)),
            None => Box::new(MaxStepsTerminationCriterion::new(self.max_num_steps)),
        }
    }
}

impl core::fmt::Debug for Options {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Options")
            .field("population_size", &self.population_size)
            .field("scale_factor", &self.scale_factor)
            .field("crossover_rate", &self.crossover_rate)
            .field("variant", &self.variant)
            .field("max_num_steps", &self.max_num_steps)
            .field("seed", &self.seed)
            .field("verbose", &self.verbose)
            .field("custom_termination", &self.termination.is_some())
            .finish()
    }
}
