use std::sync::Arc;

use diffevo::objective::{MISSING_RATIO_PENALTY, MISSING_SUB_QUALITY_PENALTY};
use diffevo::prelude::*;

fn point(x: f64, y: f64) -> Candidate {
    Candidate::new(vec![x, y])
}

#[test]
fn weighted_sum_respects_direction_and_weight() {
    let objective = Objective::builder()
        .minimize("cost", |x: &[f64]| x[0])
        .maximize("gain", |x: &[f64]| x[1])
        .weights(vec![2.0, 0.5])
        .build()
        .unwrap();
    let q = objective.quality_of(&point(3.0, 4.0)).unwrap();
    assert!((q.value() - (2.0 * 3.0 - 0.5 * 4.0)).abs() < 1e-12);
    assert!((objective.display_value(&q) - q.value()).abs() < 1e-12);
}

#[test]
fn unavailable_goals_are_penalized() {
    let objective = Objective::builder()
        .minimize("x", |x: &[f64]| x[0])
        .minimize("sometimes", |x: &[f64]| (x[1] > 0.0).then_some(x[1]))
        .build()
        .unwrap();
    let missing = objective.quality_of(&point(1.0, -1.0)).unwrap();
    assert_eq!(missing.sub_qualities(), &[Some(1.0), None]);
    assert!((missing.value() - (1.0 + MISSING_SUB_QUALITY_PENALTY)).abs() < 1.0);

    let present = point(100.0, 100.0);
    assert!(objective.is_better(&present, &point(1.0, -1.0)).unwrap());
}

#[test]
fn global_ratios_move_with_the_extremes() {
    let objective = Objective::builder()
        .minimize("x", |x: &[f64]| x[0])
        .maximize("y", |x: &[f64]| (x[1] >= 0.0).then_some(x[1]))
        .aggregator(MeanWeightedGlobalRatios)
        .build()
        .unwrap();
    let c = point(5.0, 5.0);
    objective.quality_of(&point(0.0, 0.0)).unwrap();
    objective.quality_of(&point(10.0, 10.0)).unwrap();

    let q = objective.quality_of(&c).unwrap();
    assert!((q.value() - 0.5).abs() < 1e-12);

    // A wider range on x shrinks its ratio; the stale value is refreshed on read.
    objective.quality_of(&point(20.0, 5.0)).unwrap();
    let refreshed = objective.quality_of(&c).unwrap();
    assert!(refreshed.version() > q.version());
    assert!((refreshed.value() - (0.25 + 0.5) / 2.0).abs() < 1e-12);

    let missing = objective.quality_of(&point(5.0, -1.0)).unwrap();
    assert!((missing.value() - (0.25 + MISSING_RATIO_PENALTY) / 2.0).abs() < 1e-12);
}

#[test]
fn zero_weights_everywhere_aggregate_to_zero() {
    let objective = Objective::builder()
        .minimize("x", |x: &[f64]| x[0])
        .aggregator(MeanWeightedGlobalRatios)
        .weights(vec![0.0])
        .build()
        .unwrap();
    objective.quality_of(&point(1.0, 0.0)).unwrap();
    let q = objective.quality_of(&point(7.0, 0.0)).unwrap();
    assert!(q.value().abs() < f64::EPSILON);
}

#[test]
fn shared_objective_tracks_a_single_best() {
    let objective = Arc::new(
        Objective::builder()
            .minimize("x", |x: &[f64]| x[0].abs())
            .build()
            .unwrap(),
    );
    let other = Arc::clone(&objective);
    for v in [4.0, -2.0, 3.0, 0.5, -0.5] {
        other.quality_of(&point(v, 0.0)).unwrap();
    }
    let best = objective.best_candidate().unwrap();
    assert!((best[0] - 0.5).abs() < f64::EPSILON);
    assert!((objective.best_quality().unwrap().unwrap().value() - 0.5).abs() < f64::EPSILON);
}
