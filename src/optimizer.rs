//! The optimization driver.
//!
//! [`Optimizer`] runs any [`SearchStrategy`] until a
//! [`TerminationCriterion`] says stop, tracking the best candidate, feeding
//! an optional [`Archive`] and reporting progress to an [`EventSink`].
//!
//! | Event | Important | When |
//! |---|---|---|
//! | `optimizer.start` | yes | before the first step |
//! | `optimizer.step` | no | after every step |
//! | `optimizer.new_best` | yes | the best candidate changed |
//! | `optimizer.end` | yes | the loop stopped, normally or with an error |
//! | `optimizer.aborted` | yes | the loop unwound because of a panic |

use std::sync::Arc;

use crate::archive::Archive;
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink, NullSink, tags};
use crate::objective::{Objective, QualityValue};
use crate::termination::{MaxStepsTerminationCriterion, TerminationCriterion};

/// Run-wide progress visible to termination criteria and strategies.
#[derive(Clone, Debug, Default)]
pub struct OptimizerState {
    /// Steps completed so far.
    pub num_optimization_steps: u64,
    /// How many times the best candidate changed.
    pub num_new_bests: u64,
    /// The best candidate; always an evaluated one.
    pub best: Option<Candidate>,
    /// Quality of [`best`](Self::best) as of the last step.
    pub best_quality: Option<QualityValue>,
}

/// What a strategy sees during one step.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    /// The driver's current best candidate.
    pub best: &'a Candidate,
    /// Driver progress.
    pub state: &'a OptimizerState,
}

/// A search algorithm the [`Optimizer`] can drive.
pub trait SearchStrategy {
    /// Human-readable name used in events.
    fn name(&self) -> &str;

    /// The objective candidates are judged by.
    fn objective(&self) -> &Arc<Objective>;

    /// A fresh candidate used to seed the best before the first step.
    fn seed_candidate(&mut self) -> Candidate;

    /// Run one step and return the candidates it evaluated.
    ///
    /// # Errors
    ///
    /// Propagates goal failures and strategy-specific errors.
    fn step(&mut self, ctx: &StepContext<'_>) -> Result<Vec<Candidate>>;
}

/// Emits `optimizer.aborted` if the loop unwinds.
struct AbortGuard {
    sink: Arc<dyn EventSink>,
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.sink.record(
                Event::new(tags::OPTIMIZATION_ABORTED, "optimization aborted by a panic")
                    .important(),
            );
        }
    }
}

/// Drives a [`SearchStrategy`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use diffevo::events::{MemorySink, tags};
/// use diffevo::optimizer::Optimizer;
/// use diffevo::random_search::RandomSearch;
/// use diffevo::termination::MaxStepsTerminationCriterion;
/// use diffevo::{Objective, SearchSpace};
///
/// let objective = Arc::new(
///     Objective::builder()
///         .minimize("abs", |x: &[f64]| x[0].abs())
///         .build()?,
/// );
/// let space = SearchSpace::symmetric(1, -1.0, 1.0)?.with_seed(3);
/// let sink = Arc::new(MemorySink::new());
///
/// let mut optimizer = Optimizer::new(RandomSearch::new(objective, space))
///     .with_termination(MaxStepsTerminationCriterion::new(50))
///     .with_event_sink(sink.clone());
/// optimizer.optimize()?;
///
/// assert_eq!(optimizer.state().num_optimization_steps, 50);
/// assert_eq!(sink.count(tags::STEP), 50);
/// # Ok::<(), diffevo::Error>(())
/// ```
pub struct Optimizer<S> {
    strategy: S,
    termination: Box<dyn TerminationCriterion>,
    sink: Arc<dyn EventSink>,
    archive: Option<Archive>,
    state: OptimizerState,
}

impl<S: SearchStrategy> Optimizer<S> {
    /// Drive `strategy` for the default 1000 steps, reporting nowhere.
    #[must_use]
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            termination: Box::new(MaxStepsTerminationCriterion::default()),
            sink: Arc::new(NullSink),
            archive: None,
            state: OptimizerState::default(),
        }
    }

    /// Replace the termination criterion.
    #[must_use]
    pub fn with_termination(mut self, termination: impl TerminationCriterion + 'static) -> Self {
        self.termination = Box::new(termination);
        self
    }

    /// Like [`with_termination`](Self::with_termination) for an already boxed criterion.
    #[must_use]
    pub fn with_boxed_termination(mut self, termination: Box<dyn TerminationCriterion>) -> Self {
        self.termination = termination;
        self
    }

    /// Report events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Feed every evaluated candidate into `archive`.
    ///
    /// The archive must be built on the strategy's objective.
    #[must_use]
    pub fn with_archive(mut self, archive: Archive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// The driven strategy.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Mutable access to the driven strategy.
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Progress so far.
    #[must_use]
    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    /// The archive, if one was attached.
    #[must_use]
    pub fn archive(&self) -> Option<&Archive> {
        self.archive.as_ref()
    }

    /// The best candidate found so far.
    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.state.best.as_ref()
    }

    /// Run until the termination criterion fires and return the best candidate.
    ///
    /// Calling it again continues from the current state.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the strategy, the objective or the
    /// archive. The end event is still emitted, carrying the error message.
    pub fn optimize(&mut self) -> Result<Candidate> {
        let name = self.strategy.name().to_owned();
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("optimize", strategy = %name).entered();

        let _guard = AbortGuard {
            sink: Arc::clone(&self.sink),
        };
        self.sink.record(
            Event::new(tags::OPTIMIZATION_START, format!("starting {name}"))
                .important()
                .with("strategy", name.as_str()),
        );

        match self.run() {
            Ok(best) => {
                let mut end = Event::new(
                    tags::OPTIMIZATION_END,
                    format!(
                        "{name} finished after {} steps",
                        self.state.num_optimization_steps
                    ),
                )
                .important()
                .with("steps", self.state.num_optimization_steps)
                .with("new_bests", self.state.num_new_bests)
                .with("best", best.as_slice());
                if let Some(q) = &self.state.best_quality {
                    end = end.with("value", q.display_value());
                }
                self.sink.record(end);
                trace_info!(
                    steps = self.state.num_optimization_steps,
                    new_bests = self.state.num_new_bests,
                    "optimization finished"
                );
                Ok(best)
            }
            Err(e) => {
                self.sink.record(
                    Event::new(tags::OPTIMIZATION_END, format!("{name} failed: {e}"))
                        .important()
                        .with("steps", self.state.num_optimization_steps)
                        .with("error", e.to_string()),
                );
                trace_info!(error = %e, "optimization failed");
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<Candidate> {
        let objective = Arc::clone(self.strategy.objective());
        if let Some(archive) = &self.archive
            && archive.objective().id() != objective.id()
        {
            return Err(Error::ObjectiveMismatch);
        }

        if self.state.best.is_none() {
            let seed = self.strategy.seed_candidate();
            let quality = objective.quality_of(&seed)?;
            if let Some(archive) = &mut self.archive {
                archive.add(&seed)?;
            }
            self.state.best = Some(seed);
            self.state.best_quality = Some(quality);
        }

        while !self.termination.terminate(&self.state) {
            let best = self
                .state
                .best
                .clone()
                .ok_or(Error::Internal("optimizer lost its best candidate"))?;
            let new = self.strategy.step(&StepContext {
                best: &best,
                state: &self.state,
            })?;
            self.state.num_optimization_steps += 1;
            self.sink.record(
                Event::new(
                    tags::STEP,
                    format!("step {}", self.state.num_optimization_steps),
                )
                .with("step", self.state.num_optimization_steps)
                .with("new_candidates", new.len()),
            );

            self.update_best(&objective, &best, &new)?;
            if let Some(archive) = &mut self.archive {
                for candidate in &new {
                    archive.add(candidate)?;
                }
            }
        }

        self.state
            .best
            .clone()
            .ok_or(Error::Internal("optimizer lost its best candidate"))
    }

    fn update_best(
        &mut self,
        objective: &Objective,
        best: &Candidate,
        new: &[Candidate],
    ) -> Result<()> {
        if !new.is_empty() {
            let mut pool = new.to_vec();
            pool.push(best.clone());
            let ranked = objective.rank_candidates(&pool)?;
            if let Some(top) = ranked.first()
                && top.id() != best.id()
                && objective.is_better(top, best)?
            {
                self.state.best = Some(top.clone());
                self.state.num_new_bests += 1;
                let quality = objective.quality_of(top)?;
                trace_info!(
                    step = self.state.num_optimization_steps,
                    value = quality.display_value(),
                    "new best candidate"
                );
                self.sink.record(
                    Event::new(
                        tags::NEW_BEST,
                        format!(
                            "new best at step {}: {}",
                            self.state.num_optimization_steps,
                            quality.display_value()
                        ),
                    )
                    .important()
                    .with("step", self.state.num_optimization_steps)
                    .with("value", quality.display_value())
                    .with("candidate", top.as_slice()),
                );
            }
        }

        // Refresh even without a new best: the objective version may have moved.
        if let Some(current) = &self.state.best {
            self.state.best_quality = Some(objective.quality_of(current)?);
        }
        Ok(())
    }
}

impl<S> core::fmt::Debug for Optimizer<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Optimizer")
            .field("state", &self.state)
            .field("has_archive", &self.archive.is_some())
            .finish_non_exhaustive()
    }
}
