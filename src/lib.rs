#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Steady-state differential evolution for continuous black-box problems,
//! with single- and multi-objective quality models and an elitist archive
//! of notable solutions.
//!
//! # Getting Started
//!
//! ```
//! use diffevo::convenience::minimize;
//! use diffevo::options::Options;
//!
//! let options = Options::new().max_num_steps(6000).seed(42);
//! let x = minimize(2, -5.0, 5.0, &options, |x: &[f64]| x[0] * x[0] + x[1] * x[1]).unwrap();
//! assert!(x.iter().all(|v| v.abs() < 0.1));
//! ```
//!
//! For full control, assemble the pieces yourself:
//!
//! ```
//! use std::sync::Arc;
//!
//! use diffevo::prelude::*;
//!
//! let objective = Arc::new(
//!     Objective::builder()
//!         .minimize("cost", |x: &[f64]| (x[0] - 1.0).powi(2) + x[1].abs())
//!         .maximize("margin", |x: &[f64]| x[1])
//!         .build()
//!         .unwrap(),
//! );
//! let space = SearchSpace::symmetric(2, -3.0, 3.0).unwrap().with_seed(5);
//! let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
//!     .variant(DeVariant::Best1Bin)
//!     .seed(6)
//!     .build()
//!     .unwrap();
//! let archive = Archive::new(Arc::clone(&objective), ArchiveConfig::default()).unwrap();
//!
//! let mut optimizer = Optimizer::new(de)
//!     .with_termination(MaxStepsTerminationCriterion::new(500))
//!     .with_archive(archive);
//! let best = optimizer.optimize().unwrap();
//! assert!(optimizer.archive().unwrap().generalists().len() > 0);
//! assert!(objective.quality_of(&best).is_ok());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Candidate`] | An immutable point in the search space with a stable identity. |
//! | [`SearchSpace`] | Box bounds plus a [`Sampler`](search_space::Sampler) for new points and repairs. |
//! | [`Objective`] | Named goals, cached evaluation, global extremes and the run-wide best. |
//! | [`QualityValue`](objective::QualityValue) | Sub-qualities plus an aggregate; lower is better. |
//! | [`Comparator`](objective::Comparator) | Orders candidates by aggregate or by Pareto dominance. |
//! | [`DifferentialEvolution`](de::DifferentialEvolution) | The strategy engine: mutation, crossover, bounding, feedback. |
//! | [`Optimizer`](optimizer::Optimizer) | Runs a strategy until a [`TerminationCriterion`](termination::TerminationCriterion) stops it. |
//! | [`Archive`](archive::Archive) | Generalists, per-goal specialists and diverse near-best "weirdos". |
//! | [`EventSink`](events::EventSink) | Receives structured progress events. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on configuration and value types, [`Options::from_json`](options::Options::from_json) | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) and [`TracingSink`](events::TracingSink) | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod archive;
pub mod candidate;
pub mod convenience;
pub mod de;
mod error;
pub mod events;
pub mod objective;
pub mod optimizer;
pub mod options;
pub mod pareto;
pub mod random_search;
mod rng_util;
pub mod search_space;
pub mod termination;
mod types;

pub use candidate::{Candidate, CandidateId};
pub use error::{Error, Result};
pub use objective::Objective;
pub use search_space::SearchSpace;
pub use types::Direction;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use diffevo::prelude::*;
/// ```
pub mod prelude {
    pub use crate::archive::{Archive, ArchiveConfig, TopList};
    pub use crate::candidate::{Candidate, CandidateId};
    pub use crate::convenience::{maximize, minimize, optimize};
    pub use crate::de::{
        DeParameters, DeVariant, DifferentialEvolution, DifferentialEvolutionBuilder,
        SuccessRateAdaptation,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{Event, EventSink, MemorySink, NullSink, ThrottledSink};
    pub use crate::objective::{
        Comparator, DominanceComparator, FrontTiebreak, LowerAggregateIsBetter,
        MeanWeightedGlobalRatios, Objective, QualityValue, WeightedSumAggregator,
    };
    pub use crate::optimizer::{Optimizer, OptimizerState, SearchStrategy};
    pub use crate::options::Options;
    pub use crate::random_search::RandomSearch;
    pub use crate::search_space::{LatinHypercubeSampler, SearchSpace, UniformSampler};
    pub use crate::termination::{
        AnyOf, MaxStepsTerminationCriterion, NeverTerminate, TargetQualityTerminationCriterion,
        TerminationCriterion,
    };
    pub use crate::types::Direction;
}
