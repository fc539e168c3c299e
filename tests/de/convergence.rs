use std::sync::Arc;

use diffevo::prelude::*;

use crate::test_functions::{rastrigin, rosenbrock, sphere};

fn minimize_with(
    variant: DeVariant,
    f: fn(&[f64]) -> f64,
    dims: usize,
    (min, max): (f64, f64),
    steps: u64,
    seed: u64,
) -> (Vec<f64>, f64) {
    let objective = Arc::new(Objective::builder().minimize("f", f).build().unwrap());
    let space = SearchSpace::symmetric(dims, min, max).unwrap().with_seed(seed);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .variant(variant)
        .seed(seed + 1)
        .build()
        .unwrap();
    let mut optimizer =
        Optimizer::new(de).with_termination(MaxStepsTerminationCriterion::new(steps));
    let best = optimizer.optimize().unwrap();
    let value = objective.quality_of(&best).unwrap().value();
    (best.to_vec(), value)
}

#[test]
fn rosenbrock_converges_to_one_one() {
    let (x, value) = minimize_with(DeVariant::Rand1Bin, rosenbrock, 2, (0.0, 2.0), 10_000, 42);
    assert!(
        (x[0] - 1.0).abs() < 0.05 && (x[1] - 1.0).abs() < 0.05,
        "expected (1, 1), got {x:?} with f = {value}"
    );
}

#[test]
fn sphere_with_every_variant() {
    for variant in [DeVariant::Rand1Bin, DeVariant::Best1Bin, DeVariant::Best2Bin] {
        let (_, value) = minimize_with(variant, sphere, 3, (-5.0, 5.0), 8000, 7);
        assert!(value < 0.05, "{} reached only {value}", variant.name());
    }
}

#[test]
fn rastrigin_gets_close_in_two_dimensions() {
    let (_, value) = minimize_with(DeVariant::Rand1Bin, rastrigin, 2, (-5.12, 5.12), 8000, 3);
    assert!(value < 2.5, "rastrigin best {value}");
}

#[test]
fn success_rate_adaptation_still_converges() {
    let objective = Arc::new(Objective::builder().minimize("sphere", sphere).build().unwrap());
    let space = SearchSpace::symmetric(3, -5.0, 5.0).unwrap().with_seed(11);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .feedback(SuccessRateAdaptation::default())
        .seed(12)
        .build()
        .unwrap();
    let mut optimizer =
        Optimizer::new(de).with_termination(MaxStepsTerminationCriterion::new(8000));
    let best = optimizer.optimize().unwrap();
    assert!(objective.quality_of(&best).unwrap().value() < 0.05);

    let f = optimizer.strategy().parameters().scale_factor;
    assert!((0.4..=0.65).contains(&f), "adapted F = {f}");
}

#[test]
fn same_seeds_reproduce_the_run() {
    let a = minimize_with(DeVariant::Best1Bin, rosenbrock, 2, (-2.0, 2.0), 300, 5);
    let b = minimize_with(DeVariant::Best1Bin, rosenbrock, 2, (-2.0, 2.0), 300, 5);
    assert_eq!(a.0, b.0);
}

#[test]
fn options_drive_the_convenience_entry_point() {
    let options = Options::new()
        .population_size(20)
        .scale_factor(0.6)
        .crossover_rate(0.9)
        .variant(DeVariant::Best2Bin)
        .max_num_steps(6000)
        .seed(17);
    let x = minimize(2, 0.0, 2.0, &options, rosenbrock).unwrap();
    assert!((x[0] - 1.0).abs() < 0.1 && (x[1] - 1.0).abs() < 0.1, "got {x:?}");
}
