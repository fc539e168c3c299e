use std::sync::Arc;

use diffevo::prelude::*;

fn config(top: usize, per_goal: usize, diverse: usize) -> ArchiveConfig {
    ArchiveConfig {
        num_top_aggregate: top,
        num_top_per_goal: per_goal,
        num_most_diverse: diverse,
        ..ArchiveConfig::default()
    }
}

#[test]
fn generalists_are_the_three_lowest_aggregates() {
    let objective = Arc::new(
        Objective::builder()
            .minimize("value", |x: &[f64]| x[0])
            .aggregator(WeightedSumAggregator)
            .build()
            .unwrap(),
    );
    let mut archive = Archive::new(Arc::clone(&objective), config(3, 5, 10)).unwrap();
    for v in [10.0, 12.0, 5.0, 35.0, 7.0] {
        archive.add(&Candidate::new(vec![v])).unwrap();
    }
    let keys: Vec<f64> = archive.generalists().keys().collect();
    assert_eq!(keys, vec![5.0, 7.0, 10.0]);
    let values: Vec<f64> = archive.generalists().candidates().map(|c| c[0]).collect();
    assert_eq!(values, vec![5.0, 7.0, 10.0]);
}

#[test]
fn optimizer_feeds_the_archive() {
    let objective = Arc::new(
        Objective::builder()
            .minimize("sphere", |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())
            .minimize("shifted", |x: &[f64]| (x[0] - 1.0).powi(2) + x[1] * x[1])
            .build()
            .unwrap(),
    );
    let space = SearchSpace::symmetric(2, -3.0, 3.0).unwrap().with_seed(13);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .seed(14)
        .build()
        .unwrap();
    let archive = Archive::new(Arc::clone(&objective), config(4, 3, 6)).unwrap();
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(600))
        .with_archive(archive);
    let best = optimizer.optimize().unwrap();

    let archive = optimizer.archive().unwrap();
    assert_eq!(archive.generalists().len(), 4);
    assert_eq!(archive.best().unwrap().id(), best.id());

    let generalist_keys: Vec<f64> = archive.generalists().keys().collect();
    assert!(generalist_keys.windows(2).all(|w| w[0] <= w[1]));
    for (key, c) in generalist_keys.iter().zip(archive.generalists().candidates()) {
        assert!((objective.quality_of(c).unwrap().value() - key).abs() < 1e-9);
    }

    for goal in 0..2 {
        let specialists = archive.specialists(goal).unwrap();
        assert_eq!(specialists.len(), 3);
        let keys: Vec<f64> = specialists.keys().collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
    // No specialist can be worse on its own goal than the overall best.
    let best_goals = objective.sub_qualities_of(&best).unwrap();
    for (goal, best_value) in best_goals.iter().enumerate() {
        let specialist = archive.specialists(goal).unwrap().best().unwrap();
        let own = objective.sub_qualities_of(specialist).unwrap()[goal].unwrap();
        assert!(own <= best_value.unwrap());
    }

    assert!(archive.weirdos().len() <= 6);
    assert!(!archive.weirdos().contains(best.id()));
}
