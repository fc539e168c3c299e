use core::time::Duration;
use std::sync::Arc;

use diffevo::events::{EventValue, tags};
use diffevo::prelude::*;

fn sphere_de(sink: Arc<dyn EventSink>, seed: u64) -> (Arc<Objective>, DifferentialEvolution) {
    let objective = Arc::new(
        Objective::builder()
            .minimize("sphere", |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>())
            .event_sink(Arc::clone(&sink))
            .build()
            .unwrap(),
    );
    let space = SearchSpace::symmetric(2, -4.0, 4.0).unwrap().with_seed(seed);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .population_size(12)
        .event_sink(sink)
        .seed(seed + 1)
        .build()
        .unwrap();
    (objective, de)
}

#[test]
fn events_arrive_in_run_order() {
    let sink = Arc::new(MemorySink::new());
    let (_, de) = sphere_de(sink.clone(), 1);
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(100))
        .with_event_sink(sink.clone());
    optimizer.optimize().unwrap();

    let events = sink.events();
    let driver: Vec<&str> = events
        .iter()
        .map(|e| e.tag)
        .filter(|t| t.starts_with("optimizer."))
        .collect();
    assert_eq!(driver.first(), Some(&tags::OPTIMIZATION_START));
    assert_eq!(driver.last(), Some(&tags::OPTIMIZATION_END));
    assert!(!driver.contains(&tags::OPTIMIZATION_ABORTED));

    let end = sink.last(tags::OPTIMIZATION_END).unwrap();
    assert!(end.important);
    assert_eq!(end.get("steps"), Some(&EventValue::Count(100)));
    assert_eq!(
        end.get("new_bests"),
        Some(&EventValue::Count(optimizer.state().num_new_bests))
    );
    assert_eq!(
        sink.count(tags::NEW_BEST),
        usize::try_from(optimizer.state().num_new_bests).unwrap()
    );
    assert!(sink.count(tags::NEW_EXTREME) >= 4);
}

#[test]
fn new_best_values_never_get_worse() {
    let sink = Arc::new(MemorySink::new());
    let (objective, de) = sphere_de(sink.clone(), 7);
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(400))
        .with_event_sink(sink.clone());
    let best = optimizer.optimize().unwrap();

    let values: Vec<f64> = sink
        .events()
        .iter()
        .filter(|e| e.tag == tags::NEW_BEST)
        .filter_map(|e| match e.get("value") {
            Some(EventValue::Float(v)) => Some(*v),
            _ => None,
        })
        .collect();
    assert!(!values.is_empty());
    assert!(values.windows(2).all(|w| w[1] < w[0]), "{values:?}");

    let final_value = objective.quality_of(&best).unwrap().value();
    assert!((values[values.len() - 1] - final_value).abs() < 1e-12);
}

#[test]
fn throttled_sink_keeps_important_events() {
    let memory = MemorySink::new();
    let sink = Arc::new(ThrottledSink::new(memory, Duration::from_secs(3600)));
    let (_, de) = sphere_de(sink.clone(), 3);
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(200))
        .with_event_sink(sink.clone());
    optimizer.optimize().unwrap();

    let inner = sink.inner();
    assert_eq!(inner.count(tags::OPTIMIZATION_START), 1);
    assert_eq!(inner.count(tags::OPTIMIZATION_END), 1);
    assert_eq!(
        inner.count(tags::NEW_BEST),
        usize::try_from(optimizer.state().num_new_bests).unwrap()
    );
    // Routine events share one slot per hour.
    let routine = inner.events().iter().filter(|e| !e.important).count();
    assert_eq!(routine, 1);
}
