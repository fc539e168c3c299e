use core::cmp::Ordering;
use std::sync::Arc;

use diffevo::pareto::{non_dominated_sort, pareto_front_indices};
use diffevo::prelude::*;

use crate::test_functions::{schaffer_f1, schaffer_f2, zdt1};

fn schaffer(comparator: DominanceComparator) -> Objective {
    Objective::builder()
        .minimize("f1", schaffer_f1)
        .minimize("f2", schaffer_f2)
        .comparator(comparator)
        .build()
        .unwrap()
}

#[test]
fn epsilon_dominance_coarsens_ties() {
    let strict = DominanceComparator::epsilon(0.0).unwrap();
    assert_eq!(
        strict.compare_sub_qualities(&[1.0, 2.0], &[1.0, 3.0]),
        Ordering::Less
    );
    let coarse = DominanceComparator::epsilon(1.0).unwrap();
    assert_eq!(
        coarse.compare_sub_qualities(&[1.0, 2.0], &[1.0, 3.0]),
        Ordering::Equal
    );
    assert!(DominanceComparator::epsilon(-0.5).is_err());
}

#[test]
fn pareto_set_ranks_first() {
    let objective = schaffer(DominanceComparator::pareto());
    let on_set: Vec<Candidate> = [0.0, 0.5, 1.5, 2.0]
        .iter()
        .map(|&x| Candidate::new(vec![x]))
        .collect();
    let off_set: Vec<Candidate> = [-1.0, 3.0]
        .iter()
        .map(|&x| Candidate::new(vec![x]))
        .collect();
    let mut pool = off_set.clone();
    pool.extend(on_set.iter().cloned());

    let fronts = DominanceComparator::pareto()
        .group_rank_candidates(&objective, &pool)
        .unwrap();
    let first: Vec<_> = fronts[0].iter().map(Candidate::id).collect();
    for c in &on_set {
        assert!(first.contains(&c.id()));
    }
    for c in &off_set {
        assert!(!first.contains(&c.id()));
    }

    let ranked = objective.rank_candidates(&pool).unwrap();
    assert_eq!(ranked.len(), pool.len());
    assert!(on_set.iter().any(|c| c.id() == ranked[0].id()));
    assert_eq!(
        objective.compare(&on_set[1], &off_set[0]).unwrap(),
        Ordering::Less
    );
}

#[test]
fn maximize_goals_are_negated_before_dominance() {
    let objective = Objective::builder()
        .minimize("cost", |x: &[f64]| x[0])
        .maximize("value", |x: &[f64]| x[1])
        .comparator(DominanceComparator::pareto())
        .build()
        .unwrap();
    let cheap_and_valuable = Candidate::new(vec![1.0, 9.0]);
    let pricey_and_poor = Candidate::new(vec![5.0, 2.0]);
    assert!(
        objective
            .is_better(&cheap_and_valuable, &pricey_and_poor)
            .unwrap()
    );
    assert!(
        !objective
            .is_better(&pricey_and_poor, &cheap_and_valuable)
            .unwrap()
    );
}

#[test]
fn crowding_tiebreak_puts_extremes_first() {
    let comparator = DominanceComparator::pareto().with_tiebreak(FrontTiebreak::CrowdingDistance);
    let objective = schaffer(DominanceComparator::pareto());
    let front: Vec<Candidate> = [1.0, 0.0, 1.1, 2.0, 0.9]
        .iter()
        .map(|&x| Candidate::new(vec![x]))
        .collect();
    let fronts = comparator.group_rank_candidates(&objective, &front).unwrap();
    assert_eq!(fronts.len(), 1);
    let leaders: Vec<f64> = fronts[0][..2].iter().map(|c| c[0]).collect();
    assert!(leaders.contains(&0.0) && leaders.contains(&2.0), "{leaders:?}");
}

#[test]
fn de_approaches_the_zdt1_front() {
    let objective = Arc::new(
        Objective::builder()
            .minimize("f1", |x: &[f64]| zdt1(x).0)
            .minimize("f2", |x: &[f64]| zdt1(x).1)
            .comparator(DominanceComparator::pareto())
            .build()
            .unwrap(),
    );
    let space = SearchSpace::symmetric(3, 0.0, 1.0).unwrap().with_seed(4);
    let de = DifferentialEvolution::builder(Arc::clone(&objective), space)
        .seed(5)
        .build()
        .unwrap();
    let archive = Archive::new(Arc::clone(&objective), ArchiveConfig::default()).unwrap();
    let mut optimizer = Optimizer::new(de)
        .with_termination(MaxStepsTerminationCriterion::new(4000))
        .with_archive(archive);
    optimizer.optimize().unwrap();

    let points: Vec<Vec<f64>> = optimizer
        .strategy()
        .population()
        .iter()
        .map(|c| {
            let (f1, f2) = zdt1(c.as_slice());
            vec![f1, f2]
        })
        .collect();
    let directions = objective.directions();
    let front = pareto_front_indices(&points, directions);
    assert!(front.len() >= 3, "front collapsed to {} points", front.len());
    for &i in &front {
        let [f1, f2] = [points[i][0], points[i][1]];
        assert!(f2 - (1.0 - f1.sqrt()) < 0.5, "({f1}, {f2}) far from the front");
    }
    assert_eq!(
        non_dominated_sort(&points, directions)
            .iter()
            .map(Vec::len)
            .sum::<usize>(),
        points.len()
    );

    let archive = optimizer.archive().unwrap();
    assert_eq!(archive.specialists(0).unwrap().len(), 5);
    assert_eq!(archive.specialists(1).unwrap().len(), 5);
}
