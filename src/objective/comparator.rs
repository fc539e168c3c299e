//! Candidate ordering.
//!
//! A [`Comparator`] decides which of two candidates is better under an
//! objective, and how a whole set is ranked. Two are provided:
//!
//! - [`LowerAggregateIsBetter`]: a total order on the aggregate value.
//! - [`DominanceComparator`]: Pareto (or epsilon) dominance on the raw
//!   sub-qualities, ranking by non-dominated fronts.

use core::cmp::Ordering;

use parking_lot::Mutex;

use super::Objective;
use crate::candidate::Candidate;
use crate::error::Result;
use crate::pareto;
use crate::types::Direction;

/// Orders candidates under an [`Objective`].
pub trait Comparator: Send + Sync {
    /// `Less` if `a` is better than `b`, `Greater` if worse, `Equal` if
    /// neither is preferred.
    ///
    /// # Errors
    ///
    /// Propagates goal failures from evaluating either candidate.
    fn compare(&self, objective: &Objective, a: &Candidate, b: &Candidate) -> Result<Ordering>;

    /// Sort `candidates` best first.
    ///
    /// # Errors
    ///
    /// Propagates goal failures.
    fn rank(&self, objective: &Objective, candidates: &[Candidate]) -> Result<Vec<Candidate>>;
}

/// Sub-qualities mapped so that lower is better for every goal.
///
/// Maximized goals are negated and unavailable values become `+∞`.
pub(crate) fn min_normalized(sub_qualities: &[Option<f64>], directions: &[Direction]) -> Vec<f64> {
    sub_qualities
        .iter()
        .zip(directions)
        .map(|(q, d)| q.map_or(f64::INFINITY, |v| d.sign() * v))
        .collect()
}

/// Total order on the aggregate value. Ties keep their input order.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowerAggregateIsBetter;

impl Comparator for LowerAggregateIsBetter {
    fn compare(&self, objective: &Objective, a: &Candidate, b: &Candidate) -> Result<Ordering> {
        // Evaluate both before aggregating so both values share one version.
        objective.sub_qualities_of(a)?;
        objective.sub_qualities_of(b)?;
        let qa = objective.quality_of(a)?;
        let qb = objective.quality_of(b)?;
        Ok(qa.value().total_cmp(&qb.value()))
    }

    fn rank(&self, objective: &Objective, candidates: &[Candidate]) -> Result<Vec<Candidate>> {
        for c in candidates {
            objective.sub_qualities_of(c)?;
        }
        let mut scored = candidates
            .iter()
            .map(|c| objective.quality_of(c).map(|q| (q.value(), c.clone())))
            .collect::<Result<Vec<_>>>()?;
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(scored.into_iter().map(|(_, c)| c).collect())
    }
}

/// Per-goal tally of a pairwise dominance check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DominanceCounts {
    /// Goals on which the first vector is better.
    pub first: usize,
    /// Goals on which the second vector is better.
    pub second: usize,
    /// Goals on which the two are tied.
    pub equal: usize,
}

impl DominanceCounts {
    /// Ordering implied by the counts: `Less` if the first vector dominates.
    #[must_use]
    pub fn ordering(self) -> Ordering {
        if self.first > 0 && self.second == 0 {
            Ordering::Less
        } else if self.second > 0 && self.first == 0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// How candidates inside one non-dominated front are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrontTiebreak {
    /// Keep input order.
    #[default]
    None,
    /// Random order from the comparator's seeded RNG.
    Shuffle,
    /// Lower aggregate first.
    AggregateQuality,
    /// Larger crowding distance first; boundary points lead.
    CrowdingDistance,
}

/// Pareto dominance over min-normalized sub-qualities.
///
/// With a positive epsilon, values within `epsilon` of each other count as
/// tied, which coarsens dominance.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use diffevo::objective::DominanceComparator;
///
/// let strict = DominanceComparator::pareto();
/// assert_eq!(strict.compare_sub_qualities(&[1.0, 2.0], &[1.0, 3.0]), Ordering::Less);
///
/// let coarse = DominanceComparator::epsilon(1.0)?;
/// assert_eq!(coarse.compare_sub_qualities(&[1.0, 2.0], &[1.0, 3.0]), Ordering::Equal);
/// # Ok::<(), diffevo::Error>(())
/// ```
#[derive(Debug)]
pub struct DominanceComparator {
    epsilon: f64,
    tiebreak: FrontTiebreak,
    rng: Mutex<fastrand::Rng>,
}

impl DominanceComparator {
    /// Strict Pareto dominance.
    #[must_use]
    pub fn pareto() -> Self {
        Self {
            epsilon: 0.0,
            tiebreak: FrontTiebreak::None,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Epsilon dominance: `|a - b| <= epsilon` is a tie.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`](crate::Error::InvalidParameter)
    /// for a negative or NaN epsilon.
    pub fn epsilon(epsilon: f64) -> Result<Self> {
        if epsilon.is_nan() || epsilon < 0.0 {
            return Err(crate::Error::invalid_parameter(
                "epsilon",
                format!("must be non-negative, got {epsilon}"),
            ));
        }
        Ok(Self {
            epsilon,
            ..Self::pareto()
        })
    }

    /// Set the within-front order.
    #[must_use]
    pub fn with_tiebreak(mut self, tiebreak: FrontTiebreak) -> Self {
        self.tiebreak = tiebreak;
        self
    }

    /// Seed the RNG used by [`FrontTiebreak::Shuffle`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    /// The tie tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.epsilon
    }

    /// The within-front order.
    #[must_use]
    pub fn tiebreak(&self) -> FrontTiebreak {
        self.tiebreak
    }

    /// Count the goals on which each of two min-normalized vectors wins.
    #[must_use]
    pub fn dominance_counts(&self, a: &[f64], b: &[f64]) -> DominanceCounts {
        debug_assert_eq!(a.len(), b.len());
        let mut counts = DominanceCounts::default();
        for (&x, &y) in a.iter().zip(b) {
            #[allow(clippy::float_cmp)]
            let tied = x == y || (x - y).abs() <= self.epsilon;
            if tied {
                counts.equal += 1;
            } else if x < y {
                counts.first += 1;
            } else if y < x {
                counts.second += 1;
            } else {
                counts.equal += 1;
            }
        }
        counts
    }

    /// `Less` if `a` dominates `b`, `Greater` if `b` dominates `a`,
    /// otherwise `Equal`. Both vectors must already be min-normalized.
    #[must_use]
    pub fn compare_sub_qualities(&self, a: &[f64], b: &[f64]) -> Ordering {
        self.dominance_counts(a, b).ordering()
    }

    /// Split `candidates` into non-dominated fronts, best front first.
    ///
    /// # Errors
    ///
    /// Propagates goal failures.
    pub fn group_rank_candidates(
        &self,
        objective: &Objective,
        candidates: &[Candidate],
    ) -> Result<Vec<Vec<Candidate>>> {
        let normalized = candidates
            .iter()
            .map(|c| {
                objective
                    .sub_qualities_of(c)
                    .map(|sq| min_normalized(&sq, objective.directions()))
            })
            .collect::<Result<Vec<_>>>()?;

        let fronts = pareto::peel_fronts(normalized.len(), |i, j| {
            self.compare_sub_qualities(&normalized[i], &normalized[j]) == Ordering::Less
        });

        fronts
            .into_iter()
            .map(|mut front| {
                self.order_front(objective, candidates, &mut front, &normalized)?;
                Ok(front.into_iter().map(|i| candidates[i].clone()).collect())
            })
            .collect()
    }

    fn order_front(
        &self,
        objective: &Objective,
        candidates: &[Candidate],
        front: &mut [usize],
        normalized: &[Vec<f64>],
    ) -> Result<()> {
        match self.tiebreak {
            FrontTiebreak::None => {}
            FrontTiebreak::Shuffle => self.rng.lock().shuffle(front),
            FrontTiebreak::AggregateQuality => {
                // Sub-qualities are already cached, so the version is stable.
                let mut keyed = front
                    .iter()
                    .map(|&i| objective.quality_of(&candidates[i]).map(|q| (q.value(), i)))
                    .collect::<Result<Vec<_>>>()?;
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
                for (slot, (_, i)) in front.iter_mut().zip(keyed) {
                    *slot = i;
                }
            }
            FrontTiebreak::CrowdingDistance => {
                let points: Vec<Vec<f64>> =
                    front.iter().map(|&i| normalized[i].clone()).collect();
                let distances = pareto::crowding_distance(&points);
                let mut keyed: Vec<(f64, usize)> =
                    distances.into_iter().zip(front.iter().copied()).collect();
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
                for (slot, (_, i)) in front.iter_mut().zip(keyed) {
                    *slot = i;
                }
            }
        }
        Ok(())
    }
}

impl Default for DominanceComparator {
    fn default() -> Self {
        Self::pareto()
    }
}

impl Comparator for DominanceComparator {
    fn compare(&self, objective: &Objective, a: &Candidate, b: &Candidate) -> Result<Ordering> {
        let directions = objective.directions();
        let na = min_normalized(&objective.sub_qualities_of(a)?, directions);
        let nb = min_normalized(&objective.sub_qualities_of(b)?, directions);
        Ok(self.compare_sub_qualities(&na, &nb))
    }

    fn rank(&self, objective: &Objective, candidates: &[Candidate]) -> Result<Vec<Candidate>> {
        Ok(self
            .group_rank_candidates(objective, candidates)?
            .into_iter()
            .flatten()
            .collect())
    }
}
