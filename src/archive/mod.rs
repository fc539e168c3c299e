//! Elitist archive of notable candidates.
//!
//! The archive keeps three kinds of bounded lists, all best first:
//!
//! | List | Holds | Ranked by |
//! |---|---|---|
//! | generalists | overall best candidates | aggregate quality |
//! | specialists (one per goal) | best candidates for a single goal | that goal's value, lower-is-better |
//! | weirdos | near-best candidates far from the best | distance to the best generalist |
//!
//! A candidate is eligible as a weirdo only if its display value lies within
//! a configured fraction of the best generalist's display value. Whenever the
//! best generalist changes, the distance reference moves with it: cached
//! distances are invalidated, weirdos that no longer pass the gate are
//! dropped, and the rest are re-ranked.

mod top_list;

use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::top_list::TopList;
use crate::candidate::{Candidate, CandidateId, euclidean_distance};
use crate::error::{Error, Result};
use crate::objective::{Objective, QualityValue, min_normalized};

/// Capacities and the weirdo gate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArchiveConfig {
    /// Generalists kept.
    pub num_top_aggregate: usize,
    /// Specialists kept per goal.
    pub num_top_per_goal: usize,
    /// Weirdos kept.
    pub num_most_diverse: usize,
    /// Maximum relative distance between a weirdo's display value and the
    /// best display value, e.g. `0.05` for 5%.
    pub max_percent_distance_to_best_for_diversity: f64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            num_top_aggregate: 10,
            num_top_per_goal: 5,
            num_most_diverse: 10,
            max_percent_distance_to_best_for_diversity: 0.05,
        }
    }
}

impl ArchiveConfig {
    fn validate(&self) -> Result<()> {
        for (name, capacity) in [
            ("num_top_aggregate", self.num_top_aggregate),
            ("num_top_per_goal", self.num_top_per_goal),
            ("num_most_diverse", self.num_most_diverse),
        ] {
            if capacity == 0 {
                return Err(Error::invalid_parameter(name, "capacity must be at least 1"));
            }
        }
        let pct = self.max_percent_distance_to_best_for_diversity;
        if !(pct.is_finite() && pct >= 0.0) {
            return Err(Error::invalid_parameter(
                "max_percent_distance_to_best_for_diversity",
                format!("must be finite and non-negative, got {pct}"),
            ));
        }
        Ok(())
    }
}

/// Generalists, specialists and weirdos of one objective.
pub struct Archive {
    objective: Arc<Objective>,
    config: ArchiveConfig,
    generalists: TopList,
    specialists: Vec<TopList>,
    weirdos: TopList,
    diversity: Objective,
    reference: Arc<RwLock<Option<Candidate>>>,
    seen_version: u64,
}

impl Archive {
    /// An empty archive for `objective`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero capacity or a negative
    /// or non-finite diversity gate.
    pub fn new(objective: Arc<Objective>, config: ArchiveConfig) -> Result<Self> {
        config.validate()?;

        let reference: Arc<RwLock<Option<Candidate>>> = Arc::new(RwLock::new(None));
        let distance_to = Arc::clone(&reference);
        let diversity = Objective::builder()
            .maximize("distance_to_best", move |x: &[f64]| {
                distance_to
                    .read()
                    .as_ref()
                    .map(|best| euclidean_distance(x, best.as_slice()))
            })
            .build()?;

        Ok(Self {
            specialists: (0..objective.num_goals())
                .map(|_| TopList::new(config.num_top_per_goal))
                .collect(),
            generalists: TopList::new(config.num_top_aggregate),
            weirdos: TopList::new(config.num_most_diverse),
            seen_version: objective.current_version(),
            objective,
            config,
            diversity,
            reference,
        })
    }

    /// The archived objective.
    #[must_use]
    pub fn objective(&self) -> &Arc<Objective> {
        &self.objective
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Overall best candidates.
    #[must_use]
    pub fn generalists(&self) -> &TopList {
        &self.generalists
    }

    /// Best candidates for `goal`, or `None` if there is no such goal.
    #[must_use]
    pub fn specialists(&self, goal: usize) -> Option<&TopList> {
        self.specialists.get(goal)
    }

    /// Near-best candidates ranked by distance to the best, farthest first.
    #[must_use]
    pub fn weirdos(&self) -> &TopList {
        &self.weirdos
    }

    /// The best generalist.
    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.generalists.best()
    }

    /// The objective ranking weirdos by distance to the best generalist.
    #[must_use]
    pub fn diversity_objective(&self) -> &Objective {
        &self.diversity
    }

    /// Offer `candidate` to every list.
    ///
    /// # Errors
    ///
    /// Propagates goal failures from evaluating the candidate.
    pub fn add(&mut self, candidate: &Candidate) -> Result<()> {
        let quality = self.objective.quality_of(candidate)?;
        let rekeyed = self.refresh_generalists()?;
        self.generalists.insert(quality.value(), candidate.clone());

        let normalized = min_normalized(quality.sub_qualities(), self.objective.directions());
        for ((list, key), raw) in self
            .specialists
            .iter_mut()
            .zip(normalized)
            .zip(quality.sub_qualities())
        {
            if raw.is_some() {
                list.insert(key, candidate.clone());
            }
        }

        // Rekeying can reorder the generalists, and it changes every display value.
        if rekeyed || self.best().map(Candidate::id) != self.reference_id() {
            self.move_reference()?;
        }
        self.consider_weirdo(candidate, &quality)
    }

    /// Re-aggregate generalist keys if the objective version moved.
    /// Returns whether a rekey happened.
    fn refresh_generalists(&mut self) -> Result<bool> {
        let version = self.objective.current_version();
        if version == self.seen_version {
            return Ok(false);
        }
        let objective = &self.objective;
        self.generalists
            .rekey(|c| objective.quality_of(c).map(|q| q.value()))?;
        self.seen_version = objective.current_version();
        Ok(true)
    }

    fn reference_id(&self) -> Option<CandidateId> {
        self.reference.read().as_ref().map(Candidate::id)
    }

    fn best_display_value(&self) -> Result<Option<f64>> {
        self.generalists
            .best()
            .map(|best| self.objective.quality_of(best).map(|q| q.display_value()))
            .transpose()
    }

    fn is_diverse_enough(&self, display: f64, best_display: f64) -> bool {
        if best_display == 0.0 {
            return true;
        }
        (display - best_display).abs() / best_display.abs()
            <= self.config.max_percent_distance_to_best_for_diversity
    }

    fn move_reference(&mut self) -> Result<()> {
        let Some(best) = self.generalists.best().cloned() else {
            return Ok(());
        };
        *self.reference.write() = Some(best.clone());
        self.diversity.invalidate_all();
        trace_debug!(best = ?best.as_slice(), "diversity reference moved");

        let Some(best_display) = self.best_display_value()? else {
            return Ok(());
        };
        let mut keep = Vec::with_capacity(self.weirdos.len());
        for c in self.weirdos.candidates() {
            let display = self.objective.quality_of(c)?.display_value();
            keep.push(c.id() != best.id() && self.is_diverse_enough(display, best_display));
        }
        let mut verdicts = keep.into_iter();
        self.weirdos.retain(|_| verdicts.next().unwrap_or(false));

        let diversity = &self.diversity;
        self.weirdos
            .rekey(|c| diversity.quality_of(c).map(|q| q.value()))
    }

    fn consider_weirdo(&mut self, candidate: &Candidate, quality: &QualityValue) -> Result<()> {
        if self.best().is_some_and(|b| b.id() == candidate.id())
            || self.weirdos.contains(candidate.id())
        {
            return Ok(());
        }
        let Some(best_display) = self.best_display_value()? else {
            return Ok(());
        };
        if !self.is_diverse_enough(quality.display_value(), best_display) {
            return Ok(());
        }
        let key = self.diversity.quality_of(candidate)?.value();
        self.weirdos.insert(key, candidate.clone());
        Ok(())
    }
}

impl core::fmt::Debug for Archive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Archive")
            .field("config", &self.config)
            .field("generalists", &self.generalists.len())
            .field("specialists", &self.specialists.iter().map(TopList::len).collect::<Vec<_>>())
            .field("weirdos", &self.weirdos.len())
            .finish_non_exhaustive()
    }
}
