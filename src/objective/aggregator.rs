//! Aggregation of sub-qualities into a single lower-is-better number.
//!
//! | Aggregator | Value | Depends on global extremes |
//! |---|---|---|
//! | [`WeightedSumAggregator`] | `Σ wᵢ·signᵢ·qᵢ` | no |
//! | [`MeanWeightedGlobalRatios`] | weighted mean of per-goal ratios in `[0, 1]` | yes |
//!
//! Neither needs pairwise comparisons: a candidate's aggregate is fully
//! determined by its own sub-qualities plus the objective's running state.

use crate::types::Direction;

/// Contribution of an unavailable sub-quality to a weighted sum.
pub const MISSING_SUB_QUALITY_PENALTY: f64 = 1.0e12;

/// Ratio assigned to an unavailable sub-quality by [`MeanWeightedGlobalRatios`].
pub const MISSING_RATIO_PENALTY: f64 = 1000.0;

/// Objective state an aggregator may read.
#[derive(Clone, Copy, Debug)]
pub struct AggregationContext<'a> {
    /// Direction of each goal.
    pub directions: &'a [Direction],
    /// Weight of each goal.
    pub weights: &'a [f64],
    /// Lowest value seen so far per goal (`+∞` before any evaluation).
    pub global_min: &'a [f64],
    /// Highest value seen so far per goal (`−∞` before any evaluation).
    pub global_max: &'a [f64],
}

/// Turns sub-qualities into an aggregate value. Lower is better.
pub trait Aggregator: Send + Sync {
    /// Aggregate one candidate's sub-qualities.
    fn aggregate(&self, sub_qualities: &[Option<f64>], context: &AggregationContext<'_>) -> f64;
}

/// `Σ weight[i] * sign[i] * sub_quality[i]` with `sign = +1` for minimized
/// goals and `-1` for maximized ones.
///
/// # Examples
///
/// ```
/// use diffevo::objective::{AggregationContext, Aggregator, WeightedSumAggregator};
/// use diffevo::Direction;
///
/// let ctx = AggregationContext {
///     directions: &[Direction::Minimize, Direction::Maximize],
///     weights: &[1.0, 2.0],
///     global_min: &[0.0, 0.0],
///     global_max: &[0.0, 0.0],
/// };
/// let v = WeightedSumAggregator.aggregate(&[Some(3.0), Some(1.0)], &ctx);
/// assert!((v - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedSumAggregator;

impl Aggregator for WeightedSumAggregator {
    fn aggregate(&self, sub_qualities: &[Option<f64>], context: &AggregationContext<'_>) -> f64 {
        sub_qualities
            .iter()
            .zip(context.directions.iter().zip(context.weights))
            .map(|(q, (direction, weight))| match q {
                Some(v) => weight * direction.sign() * v,
                None => weight * MISSING_SUB_QUALITY_PENALTY,
            })
            .sum()
    }
}

/// Weighted mean of how far each goal value sits from the best extreme seen
/// so far, relative to the spread between best and worst extremes.
///
/// Per goal the ratio is `(v - min) / (max - min)` when minimizing and
/// `(max - v) / (max - min)` when maximizing, so `0` is the best value seen
/// and `1` the worst. A goal whose extremes coincide contributes `0`.
/// Unavailable values contribute [`MISSING_RATIO_PENALTY`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanWeightedGlobalRatios;

impl MeanWeightedGlobalRatios {
    fn ratio(value: Option<f64>, direction: Direction, min: f64, max: f64) -> f64 {
        let Some(v) = value else {
            return MISSING_RATIO_PENALTY;
        };
        let range = max - min;
        if !(range.is_finite() && range > 0.0) {
            return 0.0;
        }
        let ratio = match direction {
            Direction::Minimize => (v - min) / range,
            Direction::Maximize => (max - v) / range,
        };
        ratio.clamp(0.0, 1.0)
    }
}

impl Aggregator for MeanWeightedGlobalRatios {
    fn aggregate(&self, sub_qualities: &[Option<f64>], context: &AggregationContext<'_>) -> f64 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (i, &q) in sub_qualities.iter().enumerate() {
            let w = context.weights[i];
            weighted += w * Self::ratio(
                q,
                context.directions[i],
                context.global_min[i],
                context.global_max[i],
            );
            total_weight += w;
        }
        if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        }
    }
}
