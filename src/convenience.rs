//! One-call optimization of a plain cost function.
//!
//! ```
//! use diffevo::convenience::minimize;
//! use diffevo::options::Options;
//!
//! let options = Options::new().max_num_steps(6000).seed(1);
//! let x = minimize(2, -5.0, 5.0, &options, |x: &[f64]| {
//!     (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)
//! })
//! .unwrap();
//! assert!((x[0] - 1.0).abs() < 0.1 && (x[1] + 2.0).abs() < 0.1);
//! ```

use std::sync::Arc;

use crate::de::DifferentialEvolution;
use crate::error::Result;
use crate::events::EventSink;
use crate::objective::{IntoGoalValue, Objective};
use crate::optimizer::Optimizer;
use crate::options::Options;
use crate::search_space::SearchSpace;
use crate::types::Direction;

/// Minimize `cost` over `[min, max]^num_variables`. Same as [`minimize`].
///
/// # Errors
///
/// Returns an error for invalid bounds or options, or when `cost` reports
/// a failure.
pub fn optimize<F, R>(
    num_variables: usize,
    min: f64,
    max: f64,
    options: &Options,
    cost: F,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> R + Send + Sync + 'static,
    R: IntoGoalValue,
{
    run(num_variables, min, max, options, Direction::Minimize, cost)
}

/// Minimize `cost` over `[min, max]^num_variables`.
///
/// # Errors
///
/// See [`optimize`].
pub fn minimize<F, R>(
    num_variables: usize,
    min: f64,
    max: f64,
    options: &Options,
    cost: F,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> R + Send + Sync + 'static,
    R: IntoGoalValue,
{
    run(num_variables, min, max, options, Direction::Minimize, cost)
}

/// Maximize `fitness` over `[min, max]^num_variables`.
///
/// # Errors
///
/// See [`optimize`].
pub fn maximize<F, R>(
    num_variables: usize,
    min: f64,
    max: f64,
    options: &Options,
    fitness: F,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> R + Send + Sync + 'static,
    R: IntoGoalValue,
{
    run(num_variables, min, max, options, Direction::Maximize, fitness)
}

fn run<F, R>(
    num_variables: usize,
    min: f64,
    max: f64,
    options: &Options,
    direction: Direction,
    f: F,
) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> R + Send + Sync + 'static,
    R: IntoGoalValue,
{
    let sink: Option<Arc<dyn EventSink>> = options.is_verbose().then(crate::events::verbose_sink);

    let mut objective = Objective::builder().goal("f", direction, f);
    if let Some(sink) = &sink {
        objective = objective.event_sink(Arc::clone(sink));
    }
    let objective = Arc::new(objective.build()?);

    let mut space = SearchSpace::symmetric(num_variables, min, max)?;
    if let Some(seed) = options.get_seed() {
        space = space.with_seed(seed);
    }

    let mut de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .population_size(options.get_population_size())
        .parameters(options.get_parameters())
        .variant(options.get_variant());
    if let Some(seed) = options.get_seed() {
        de = de.seed(seed.wrapping_add(1));
    }
    if let Some(sink) = &sink {
        de = de.event_sink(Arc::clone(sink));
    }

    let mut optimizer =
        Optimizer::new(de.build()?).with_boxed_termination(options.termination_criterion());
    if let Some(sink) = sink {
        optimizer = optimizer.with_event_sink(sink);
    }
    let best = optimizer.optimize()?;
    Ok(best.to_vec())
}
