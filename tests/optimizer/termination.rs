use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use diffevo::prelude::*;

fn abs_objective() -> Arc<Objective> {
    Arc::new(
        Objective::builder()
            .minimize("abs", |x: &[f64]| x[0].abs())
            .build()
            .unwrap(),
    )
}

#[test]
fn target_quality_stops_early() {
    let objective = abs_objective();
    let space = SearchSpace::symmetric(1, -10.0, 10.0).unwrap().with_seed(2);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .seed(3)
        .build()
        .unwrap();
    let mut optimizer = Optimizer::new(de).with_termination(
        AnyOf::default()
            .or(TargetQualityTerminationCriterion::new(1e-3))
            .or(MaxStepsTerminationCriterion::new(100_000)),
    );
    let best = optimizer.optimize().unwrap();
    assert!(objective.quality_of(&best).unwrap().value() <= 1e-3);
    assert!(optimizer.state().num_optimization_steps < 100_000);
}

#[test]
fn an_exhausted_budget_runs_no_steps() {
    let objective = abs_objective();
    let space = SearchSpace::symmetric(1, -1.0, 1.0).unwrap().with_seed(4);
    let mut optimizer = Optimizer::new(RandomSearch::new(Arc::clone(&objective), space))
        .with_termination(MaxStepsTerminationCriterion::new(0));
    let best = optimizer.optimize().unwrap();
    assert_eq!(optimizer.state().num_optimization_steps, 0);
    // The seed candidate is still evaluated and returned.
    assert!(optimizer.state().best_quality.is_some());
    assert_eq!(objective.best_candidate().unwrap().id(), best.id());
}

#[test]
fn options_termination_override_is_used() {
    struct CountingStop(Arc<AtomicU64>);

    impl TerminationCriterion for CountingStop {
        fn terminate(&self, state: &OptimizerState) -> bool {
            self.0.fetch_add(1, Ordering::Relaxed);
            state.num_optimization_steps >= 25
        }
    }

    let calls = Arc::new(AtomicU64::new(0));

    let options = Options::new()
        .max_num_steps(1)
        .termination(CountingStop(Arc::clone(&calls)))
        .seed(1);
    minimize(1, -1.0, 1.0, &options, |x: &[f64]| x[0].abs()).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 26);
}
