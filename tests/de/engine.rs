use std::sync::Arc;

use diffevo::de::{Clamp, MutationStrategy};
use diffevo::events::{EventValue, tags};
use diffevo::prelude::*;

use crate::test_functions::sphere;

fn sphere_objective() -> Arc<Objective> {
    Arc::new(Objective::builder().minimize("sphere", sphere).build().unwrap())
}

#[test]
fn trial_better_events_match_replacements() {
    let objective = sphere_objective();
    let sink = Arc::new(MemorySink::new());
    let space = SearchSpace::symmetric(2, -5.0, 5.0).unwrap().with_seed(1);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .population_size(10)
        .event_sink(sink.clone())
        .seed(2)
        .build()
        .unwrap();
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(200))
        .with_event_sink(sink.clone());
    optimizer.optimize().unwrap();

    let replaced = sink.count(tags::TRIAL_BETTER);
    assert!(replaced > 0 && replaced <= 200);
    assert_eq!(sink.count(tags::STEP), 200);
    assert_eq!(sink.count(tags::OPTIMIZATION_START), 1);
    assert_eq!(sink.count(tags::OPTIMIZATION_END), 1);

    // Every replacement installed a trial into the population.
    let last = sink.last(tags::TRIAL_BETTER).unwrap();
    let Some(EventValue::Vector(x)) = last.get("candidate") else {
        panic!("trial_better without candidate payload");
    };
    assert!(
        optimizer
            .strategy()
            .population()
            .iter()
            .any(|c| c.as_slice() == x.as_slice())
    );
}

#[test]
fn population_stays_in_bounds_with_clamping() {
    let objective = sphere_objective();
    let space = SearchSpace::new(vec![1.0, -2.0], vec![3.0, -1.0])
        .unwrap()
        .with_seed(5);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .population_size(8)
        .scale_factor(1.8)
        .bounding(Clamp)
        .seed(6)
        .build()
        .unwrap();
    let mut optimizer =
        Optimizer::new(de).with_termination(MaxStepsTerminationCriterion::new(500));
    let best = optimizer.optimize().unwrap();

    let de = optimizer.strategy();
    for c in de.population() {
        assert!(de.search_space().is_candidate(c.as_slice()), "{c:?} escaped");
    }
    // The optimum of the sphere inside the box sits on its corner.
    assert!((best[0] - 1.0).abs() < 1e-3 && (best[1] + 1.0).abs() < 1e-3, "{best:?}");
}

/// `v = p₁ + F * (p₁ - p₂)`, a deliberately odd scheme.
struct Reflect;

impl MutationStrategy for Reflect {
    fn num_parents(&self) -> usize {
        2
    }

    fn mutate(&self, parents: &[Candidate], _best: &Candidate, params: &DeParameters) -> Candidate {
        parents[0].add_scaled_difference(params.scale_factor, &parents[0], &parents[1])
    }
}

#[test]
fn custom_mutation_plugs_in() {
    let objective = sphere_objective();
    let space = SearchSpace::symmetric(2, -5.0, 5.0).unwrap().with_seed(8);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .population_size(3)
        .mutation(Reflect)
        .seed(9)
        .build()
        .unwrap();
    assert_eq!(de.num_sampled(), 3);
    assert_eq!(de.name(), "DE/custom");

    let mut optimizer = Optimizer::new(de).with_termination(MaxStepsTerminationCriterion::new(50));
    optimizer.optimize().unwrap();
    assert_eq!(optimizer.state().num_optimization_steps, 50);
}

#[test]
fn random_search_is_a_weaker_baseline() {
    let objective = sphere_objective();
    let steps = MaxStepsTerminationCriterion::new(4000);

    let space = SearchSpace::symmetric(4, -5.0, 5.0).unwrap().with_seed(21);
    let mut random = Optimizer::new(RandomSearch::new(Arc::clone(&objective), space))
        .with_termination(steps);
    let random_best = random.optimize().unwrap();

    let space = SearchSpace::symmetric(4, -5.0, 5.0).unwrap().with_seed(21);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .seed(22)
        .build()
        .unwrap();
    let mut de = Optimizer::new(de).with_termination(steps);
    let de_best = de.optimize().unwrap();

    assert!(objective.is_better(&de_best, &random_best).unwrap());
}
