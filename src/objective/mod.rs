//! Objectives: turning candidates into comparable quality values.
//!
//! An [`Objective`] owns a list of named [`Goal`]s, an [`Aggregator`] that
//! folds the per-goal values into one lower-is-better number, and a
//! [`Comparator`] that decides how candidates are ordered. It also keeps
//! run-wide statistics: the global minimum and maximum seen for every goal,
//! the best candidate overall and the best candidate per goal.
//!
//! Every change to those statistics (or to the weights) bumps the
//! objective's *version*. Cached aggregates remember the version they were
//! computed at and are re-aggregated lazily on the next read, so
//! aggregators that depend on global extremes (such as
//! [`MeanWeightedGlobalRatios`]) never hand out stale numbers.
//!
//! Goal functions run at most once per candidate identity: the raw
//! sub-qualities are cached until every clone of the candidate is dropped
//! or the entry is explicitly invalidated.
//!
//! # Example
//!
//! ```
//! use diffevo::{Candidate, Objective};
//!
//! let objective = Objective::builder()
//!     .minimize("sphere", |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())
//!     .build()?;
//!
//! let a = Candidate::new(vec![1.0, 2.0]);
//! let b = Candidate::new(vec![0.5, 0.5]);
//! assert!(objective.is_better(&b, &a)?);
//! assert_eq!(objective.best_candidate().unwrap().id(), b.id());
//! # Ok::<(), diffevo::Error>(())
//! ```

mod aggregator;
mod comparator;
mod goal;
mod quality;

use core::cmp::Ordering;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub use self::aggregator::{
    AggregationContext, Aggregator, MISSING_RATIO_PENALTY, MISSING_SUB_QUALITY_PENALTY,
    MeanWeightedGlobalRatios, WeightedSumAggregator,
};
pub(crate) use self::comparator::min_normalized;
pub use self::comparator::{
    Comparator, DominanceComparator, DominanceCounts, FrontTiebreak, LowerAggregateIsBetter,
};
pub use self::goal::{Goal, IntoGoalValue};
pub use self::quality::{QualityValue, SubQualities};
use crate::candidate::{Candidate, CandidateId};
use crate::error::{Error, Result};
use crate::events::{Event, EventSink, NullSink, tags};
use crate::types::Direction;

static NEXT_OBJECTIVE_ID: AtomicU64 = AtomicU64::new(0);

/// Cache size below which dead entries are never swept.
const MIN_PRUNE_THRESHOLD: usize = 256;

/// Process-unique identity of an [`Objective`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectiveId(u64);

impl ObjectiveId {
    fn next() -> Self {
        Self(NEXT_OBJECTIVE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

struct CacheEntry {
    liveness: Weak<[f64]>,
    sub_qualities: SubQualities,
    aggregate: Option<(u64, f64)>,
}

struct State {
    weights: Vec<f64>,
    global_min: Vec<f64>,
    global_max: Vec<f64>,
    version: u64,
    cache: HashMap<CandidateId, CacheEntry>,
    prune_at: usize,
    best: Option<(Candidate, SubQualities)>,
    best_per_goal: Vec<Option<Candidate>>,
}

/// A tightened global extreme, reported once the state lock is released.
struct Extreme {
    goal: usize,
    bound: &'static str,
    value: f64,
    version: u64,
}

impl State {
    fn new(num_goals: usize, weights: Vec<f64>) -> Self {
        Self {
            weights,
            global_min: vec![f64::INFINITY; num_goals],
            global_max: vec![f64::NEG_INFINITY; num_goals],
            version: 0,
            cache: HashMap::new(),
            prune_at: MIN_PRUNE_THRESHOLD,
            best: None,
            best_per_goal: vec![None; num_goals],
        }
    }

    fn tighten_extremes(
        &mut self,
        directions: &[Direction],
        candidate: &Candidate,
        sub_qualities: &[Option<f64>],
    ) -> Vec<Extreme> {
        let mut tightened = Vec::new();
        for (goal, (value, &direction)) in sub_qualities.iter().zip(directions).enumerate() {
            let Some(value) = *value else { continue };
            if value < self.global_min[goal] {
                self.global_min[goal] = value;
                self.version += 1;
                if direction == Direction::Minimize {
                    self.best_per_goal[goal] = Some(candidate.clone());
                }
                tightened.push(Extreme {
                    goal,
                    bound: "min",
                    value,
                    version: self.version,
                });
            }
            if value > self.global_max[goal] {
                self.global_max[goal] = value;
                self.version += 1;
                if direction == Direction::Maximize {
                    self.best_per_goal[goal] = Some(candidate.clone());
                }
                tightened.push(Extreme {
                    goal,
                    bound: "max",
                    value,
                    version: self.version,
                });
            }
        }
        tightened
    }

    fn insert(&mut self, candidate: &Candidate, sub_qualities: SubQualities) {
        if self.cache.len() >= self.prune_at {
            self.cache.retain(|_, entry| entry.liveness.strong_count() > 0);
            self.prune_at = (self.cache.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }
        self.cache.insert(
            candidate.id(),
            CacheEntry {
                liveness: candidate.downgrade(),
                sub_qualities,
                aggregate: None,
            },
        );
    }
}

/// A set of goals plus the machinery to aggregate and rank their values.
///
/// Objectives are shared between the optimizer, its search strategy and the
/// archive, usually behind an [`Arc`]. All methods take `&self`.
pub struct Objective {
    id: ObjectiveId,
    goals: Vec<Goal>,
    directions: Vec<Direction>,
    aggregator: Box<dyn Aggregator>,
    comparator: Box<dyn Comparator>,
    sink: Arc<dyn EventSink>,
    state: Mutex<State>,
}

impl Objective {
    /// Start declaring an objective.
    #[must_use]
    pub fn builder() -> ObjectiveBuilder {
        ObjectiveBuilder::default()
    }

    /// The objective's identity.
    #[must_use]
    pub fn id(&self) -> ObjectiveId {
        self.id
    }

    /// Number of goals.
    #[must_use]
    pub fn num_goals(&self) -> usize {
        self.goals.len()
    }

    /// The declared goals.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Goal names in declaration order.
    #[must_use]
    pub fn goal_names(&self) -> Vec<&str> {
        self.goals.iter().map(Goal::name).collect()
    }

    /// Goal directions in declaration order.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Current goal weights.
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.state.lock().weights.clone()
    }

    /// Replace the goal weights.
    ///
    /// Bumps the version if any weight actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeightCountMismatch`] if the count differs from the
    /// number of goals, or [`Error::InvalidParameter`] for a negative or
    /// non-finite weight.
    pub fn set_weights(&self, weights: Vec<f64>) -> Result<()> {
        validate_weights(self.num_goals(), &weights)?;
        let mut state = self.state.lock();
        if state.weights != weights {
            state.weights = weights;
            state.version += 1;
            trace_debug!(version = state.version, "objective weights changed");
        }
        Ok(())
    }

    /// The version of the global statistics. Monotonically increasing.
    #[must_use]
    pub fn current_version(&self) -> u64 {
        self.state.lock().version
    }

    /// Lowest value seen for `goal`, `+∞` before any evaluation.
    ///
    /// # Panics
    ///
    /// Panics if `goal` is out of range.
    #[must_use]
    pub fn global_min(&self, goal: usize) -> f64 {
        self.state.lock().global_min[goal]
    }

    /// Highest value seen for `goal`, `−∞` before any evaluation.
    ///
    /// # Panics
    ///
    /// Panics if `goal` is out of range.
    #[must_use]
    pub fn global_max(&self, goal: usize) -> f64 {
        self.state.lock().global_max[goal]
    }

    /// The candidate with the lowest aggregate seen so far.
    #[must_use]
    pub fn best_candidate(&self) -> Option<Candidate> {
        self.state.lock().best.as_ref().map(|(c, _)| c.clone())
    }

    /// Fresh quality of [`best_candidate`](Self::best_candidate).
    ///
    /// # Errors
    ///
    /// Propagates goal failures if the best candidate's cache entry was
    /// invalidated and has to be re-evaluated.
    pub fn best_quality(&self) -> Result<Option<QualityValue>> {
        match self.best_candidate() {
            Some(best) => self.quality_of(&best).map(Some),
            None => Ok(None),
        }
    }

    /// The candidate that set the best extreme of `goal` (lowest for
    /// minimized goals, highest for maximized ones).
    #[must_use]
    pub fn best_for_goal(&self, goal: usize) -> Option<Candidate> {
        self.state.lock().best_per_goal.get(goal).cloned().flatten()
    }

    fn cached_sub_qualities(&self, id: CandidateId) -> Option<SubQualities> {
        self.state
            .lock()
            .cache
            .get(&id)
            .map(|entry| Arc::clone(&entry.sub_qualities))
    }

    /// Raw goal values of `candidate`, evaluating the goals on a cache miss.
    ///
    /// A fresh evaluation tightens the global extremes; every tightening
    /// bumps the version and emits [`tags::NEW_EXTREME`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalEvaluation`] if a goal function fails. Nothing is
    /// cached or updated in that case.
    pub fn sub_qualities_of(&self, candidate: &Candidate) -> Result<SubQualities> {
        if let Some(cached) = self.cached_sub_qualities(candidate.id()) {
            return Ok(cached);
        }

        let values = self
            .goals
            .iter()
            .map(|goal| goal.evaluate(candidate.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        let sub_qualities: SubQualities = values.into();

        let extremes = {
            let mut state = self.state.lock();
            if let Some(entry) = state.cache.get(&candidate.id()) {
                return Ok(Arc::clone(&entry.sub_qualities));
            }
            let extremes = state.tighten_extremes(&self.directions, candidate, &sub_qualities);
            state.insert(candidate, Arc::clone(&sub_qualities));
            extremes
        };

        for extreme in extremes {
            self.report_extreme(candidate, &extreme);
        }
        Ok(sub_qualities)
    }

    fn report_extreme(&self, candidate: &Candidate, extreme: &Extreme) {
        let goal = self.goals[extreme.goal].name();
        trace_debug!(
            goal,
            bound = extreme.bound,
            value = extreme.value,
            version = extreme.version,
            "new global extreme"
        );
        self.sink.record(
            Event::new(
                tags::NEW_EXTREME,
                format!("new global {} for goal '{goal}': {}", extreme.bound, extreme.value),
            )
            .with("goal", goal)
            .with("bound", extreme.bound)
            .with("value", extreme.value)
            .with("version", extreme.version)
            .with("candidate", candidate.as_slice()),
        );
    }

    /// The aggregated quality of `candidate` at the current version.
    ///
    /// Also updates [`best_candidate`](Self::best_candidate) when the
    /// aggregate is strictly lower than the best's fresh aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GoalEvaluation`] if a goal function fails.
    pub fn quality_of(&self, candidate: &Candidate) -> Result<QualityValue> {
        let sub_qualities = self.sub_qualities_of(candidate)?;

        let mut state = self.state.lock();
        let State {
            weights,
            global_min,
            global_max,
            version,
            cache,
            best,
            ..
        } = &mut *state;
        let version = *version;
        let context = AggregationContext {
            directions: &self.directions,
            weights: weights.as_slice(),
            global_min: global_min.as_slice(),
            global_max: global_max.as_slice(),
        };

        let value = match cache.get_mut(&candidate.id()) {
            Some(entry) => match entry.aggregate {
                Some((at, value)) if at == version => value,
                _ => {
                    let value = self.aggregator.aggregate(&entry.sub_qualities, &context);
                    entry.aggregate = Some((version, value));
                    value
                }
            },
            None => self.aggregator.aggregate(&sub_qualities, &context),
        };

        let improved = match best {
            None => true,
            Some((current, _)) if current.id() == candidate.id() => false,
            Some((_, best_sub)) => value < self.aggregator.aggregate(best_sub, &context),
        };
        if improved {
            *best = Some((candidate.clone(), Arc::clone(&sub_qualities)));
        }

        Ok(QualityValue {
            objective: self.id,
            candidate: candidate.clone(),
            sub_qualities,
            version,
            value,
        })
    }

    /// Forget everything cached for `candidate`.
    pub fn invalidate_quality_of(&self, candidate: &Candidate) {
        self.state.lock().cache.remove(&candidate.id());
    }

    /// Forget every cached evaluation.
    ///
    /// Global extremes, weights and the version are kept.
    pub fn invalidate_all(&self) {
        self.state.lock().cache.clear();
    }

    /// The value to show a human: the raw goal value for single-goal
    /// objectives, the aggregate otherwise.
    #[must_use]
    pub fn display_value(&self, quality: &QualityValue) -> f64 {
        quality.display_value()
    }

    /// Order two candidates, `Less` meaning `a` is better.
    ///
    /// # Errors
    ///
    /// Propagates goal failures.
    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Result<Ordering> {
        self.comparator.compare(self, a, b)
    }

    /// Returns `true` if `a` is strictly better than `b`.
    ///
    /// # Errors
    ///
    /// Propagates goal failures.
    pub fn is_better(&self, a: &Candidate, b: &Candidate) -> Result<bool> {
        Ok(self.compare(a, b)? == Ordering::Less)
    }

    /// Sort candidates best first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPopulation`] for an empty slice and propagates
    /// goal failures.
    pub fn rank_candidates(&self, candidates: &[Candidate]) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        self.comparator.rank(self, candidates)
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.state.lock().cache.len()
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Objective")
            .field("id", &self.id)
            .field("goals", &self.goals)
            .field("weights", &state.weights)
            .field("version", &state.version)
            .finish_non_exhaustive()
    }
}

fn validate_weights(num_goals: usize, weights: &[f64]) -> Result<()> {
    if weights.len() != num_goals {
        return Err(Error::WeightCountMismatch {
            expected: num_goals,
            got: weights.len(),
        });
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::invalid_parameter(
            "weights",
            format!("weights must be finite and non-negative, got {w}"),
        ));
    }
    Ok(())
}

/// Builder for [`Objective`].
///
/// Defaults: unit weights, [`WeightedSumAggregator`],
/// [`LowerAggregateIsBetter`], and a [`NullSink`].
#[derive(Default)]
pub struct ObjectiveBuilder {
    goals: Vec<Goal>,
    weights: Option<Vec<f64>>,
    aggregator: Option<Box<dyn Aggregator>>,
    comparator: Option<Box<dyn Comparator>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl ObjectiveBuilder {
    /// Add a goal with an explicit direction.
    #[must_use]
    pub fn goal<F, R>(mut self, name: impl Into<String>, direction: Direction, function: F) -> Self
    where
        F: Fn(&[f64]) -> R + Send + Sync + 'static,
        R: IntoGoalValue,
    {
        self.goals.push(Goal::new(name, direction, function));
        self
    }

    /// Add a goal to minimize.
    #[must_use]
    pub fn minimize<F, R>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[f64]) -> R + Send + Sync + 'static,
        R: IntoGoalValue,
    {
        self.goal(name, Direction::Minimize, function)
    }

    /// Add a goal to maximize.
    #[must_use]
    pub fn maximize<F, R>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[f64]) -> R + Send + Sync + 'static,
        R: IntoGoalValue,
    {
        self.goal(name, Direction::Maximize, function)
    }

    /// Per-goal weights. Defaults to all ones.
    #[must_use]
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the aggregator.
    #[must_use]
    pub fn aggregator(mut self, aggregator: impl Aggregator + 'static) -> Self {
        self.aggregator = Some(Box::new(aggregator));
        self
    }

    /// Set the comparator.
    #[must_use]
    pub fn comparator(mut self, comparator: impl Comparator + 'static) -> Self {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// Where `objective.new_extreme` events go.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the objective.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoGoals`] if no goal was declared, and
    /// [`Error::WeightCountMismatch`] or [`Error::InvalidParameter`] for bad
    /// weights.
    pub fn build(self) -> Result<Objective> {
        if self.goals.is_empty() {
            return Err(Error::NoGoals);
        }
        let num_goals = self.goals.len();
        let weights = self.weights.unwrap_or_else(|| vec![1.0; num_goals]);
        validate_weights(num_goals, &weights)?;

        let directions = self.goals.iter().map(Goal::direction).collect();
        let objective = Objective {
            id: ObjectiveId::next(),
            goals: self.goals,
            directions,
            aggregator: self
                .aggregator
                .unwrap_or_else(|| Box::new(WeightedSumAggregator)),
            comparator: self
                .comparator
                .unwrap_or_else(|| Box::new(LowerAggregateIsBetter)),
            sink: self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            state: Mutex::new(State::new(num_goals, weights)),
        };
        trace_info!(
            id = objective.id.get(),
            goals = num_goals,
            "objective created"
        );
        Ok(objective)
    }
}

impl fmt::Debug for ObjectiveBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectiveBuilder")
            .field("goals", &self.goals)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}
