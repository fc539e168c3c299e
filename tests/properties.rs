#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

use std::sync::Arc;

use diffevo::archive::TopList;
use diffevo::pareto::non_dominated_sort;
use diffevo::prelude::*;
use proptest::prelude::*;

fn bounds_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((-100.0..100.0_f64, 0.0..50.0_f64), 1..6)
        .prop_map(|dims| dims.into_iter().map(|(lo, w)| (lo, lo + w)).unzip())
}

proptest! {
    #[test]
    fn generated_and_bounded_candidates_stay_inside(
        (min, max) in bounds_strategy(),
        seed in any::<u64>(),
        offsets in prop::collection::vec(-500.0..500.0_f64, 6),
    ) {
        let mut space = SearchSpace::new(min.clone(), max.clone()).unwrap().with_seed(seed);
        let c = space.gen_candidate();
        prop_assert!(space.is_candidate(c.as_slice()));

        let wild = Candidate::new(offsets[..min.len()].to_vec());
        let repaired = space.bound(&wild);
        prop_assert!(space.is_candidate(repaired.as_slice()));
        for (i, (&w, &r)) in wild.as_slice().iter().zip(repaired.as_slice()).enumerate() {
            if (min[i]..=max[i]).contains(&w) {
                prop_assert_eq!(w.to_bits(), r.to_bits());
            }
        }
    }

    #[test]
    fn latin_hypercube_fills_every_stratum(chunk in 2_usize..20, seed in any::<u64>()) {
        let mut sampler = LatinHypercubeSampler::with_seed(chunk, seed).unwrap();
        let space = SearchSpace::symmetric(3, 0.0, 1.0).unwrap();
        let points = sampler.sample_chunk(space.bounds());
        prop_assert_eq!(points.len(), chunk);
        for dim in 0..3 {
            let mut strata: Vec<usize> = points
                .iter()
                .map(|p| ((p[dim] * chunk as f64) as usize).min(chunk - 1))
                .collect();
            strata.sort_unstable();
            prop_assert_eq!(strata, (0..chunk).collect::<Vec<_>>());
        }
    }

    #[test]
    fn extremes_bracket_and_version_only_grows(
        values in prop::collection::vec((-1e6..1e6_f64, -1e6..1e6_f64), 1..40),
    ) {
        let objective = Objective::builder()
            .minimize("a", |x: &[f64]| x[0])
            .maximize("b", |x: &[f64]| x[1])
            .build()
            .unwrap();
        let mut last_version = objective.current_version();
        for &(a, b) in &values {
            objective.quality_of(&Candidate::new(vec![a, b])).unwrap();
            let version = objective.current_version();
            prop_assert!(version >= last_version);
            last_version = version;
        }
        for &(a, b) in &values {
            prop_assert!(objective.global_min(0) <= a && a <= objective.global_max(0));
            prop_assert!(objective.global_min(1) <= b && b <= objective.global_max(1));
        }
    }

    #[test]
    fn fronts_partition_and_respect_dominance(
        points in prop::collection::vec(prop::collection::vec(0.0..10.0_f64, 2), 1..30),
    ) {
        let directions = [Direction::Minimize, Direction::Minimize];
        let fronts = non_dominated_sort(&points, &directions);

        let mut seen: Vec<usize> = fronts.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..points.len()).collect::<Vec<_>>());

        let dominates = |a: &[f64], b: &[f64]| {
            a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
        };
        for front in &fronts {
            for &i in front {
                for &j in front {
                    prop_assert!(!dominates(&points[i], &points[j]));
                }
            }
        }
        for pair in fronts.windows(2) {
            for &j in &pair[1] {
                prop_assert!(pair[0].iter().any(|&i| dominates(&points[i], &points[j])));
            }
        }
    }

    #[test]
    fn comparator_fronts_are_never_dominated_by_later_fronts(
        maximized in prop::collection::vec(any::<bool>(), 1..4),
        rows in prop::collection::vec(prop::collection::vec((0_u8..6, any::<bool>()), 3), 1..25),
        epsilon in 0.0..2.0_f64,
    ) {
        let num_goals = maximized.len();
        let mut builder = Objective::builder();
        let mut directions = Vec::with_capacity(num_goals);
        for (i, &maximize) in maximized.iter().enumerate() {
            let direction = if maximize { Direction::Maximize } else { Direction::Minimize };
            directions.push(direction);
            // x = [values..., presence flags...]
            builder = builder.goal(format!("g{i}"), direction, move |x: &[f64]| {
                (x[num_goals + i] > 0.5).then_some(x[i])
            });
        }
        let objective = builder.build().unwrap();

        let candidates: Vec<Candidate> = rows
            .iter()
            .map(|row| {
                let values = row[..num_goals].iter().map(|&(v, _)| f64::from(v));
                let flags = row[..num_goals].iter().map(|&(_, present)| f64::from(u8::from(present)));
                Candidate::new(values.chain(flags).collect::<Vec<f64>>())
            })
            .collect();
        let normalized: Vec<Vec<f64>> = candidates
            .iter()
            .map(|c| {
                (0..num_goals)
                    .map(|i| {
                        if c[num_goals + i] > 0.5 { directions[i].sign() * c[i] } else { f64::INFINITY }
                    })
                    .collect()
            })
            .collect();
        #[allow(clippy::float_cmp)]
        let dominates = |a: &[f64], b: &[f64]| {
            let mut better = false;
            for (&x, &y) in a.iter().zip(b) {
                if x == y || (x - y).abs() <= epsilon {
                    continue;
                }
                if y < x {
                    return false;
                }
                better = true;
            }
            better
        };

        let comparator = DominanceComparator::epsilon(epsilon).unwrap();
        let fronts = comparator.group_rank_candidates(&objective, &candidates).unwrap();
        let index_of = |c: &Candidate| candidates.iter().position(|o| o.id() == c.id()).unwrap();
        let fronts: Vec<Vec<usize>> = fronts
            .iter()
            .map(|front| front.iter().map(index_of).collect())
            .collect();

        let mut seen: Vec<usize> = fronts.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..candidates.len()).collect::<Vec<_>>());

        for (k, earlier) in fronts.iter().enumerate() {
            for later in &fronts[k + 1..] {
                for &i in earlier {
                    for &j in later {
                        prop_assert!(
                            !dominates(&normalized[j], &normalized[i]),
                            "{:?} dominates earlier {:?}", normalized[j], normalized[i]
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn top_list_keeps_the_smallest_keys(
        keys in prop::collection::vec(-1e3..1e3_f64, 0..60),
        capacity in 1_usize..10,
    ) {
        let mut list = TopList::new(capacity);
        for &k in &keys {
            list.insert(k, Candidate::new(vec![k]));
        }
        let mut expected = keys.clone();
        expected.sort_by(f64::total_cmp);
        expected.truncate(capacity);
        prop_assert_eq!(list.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn ranking_is_a_permutation(xs in prop::collection::vec(-5.0..5.0_f64, 1..25)) {
        let objective = Arc::new(
            Objective::builder()
                .minimize("abs", |x: &[f64]| x[0].abs())
                .build()
                .unwrap(),
        );
        let candidates: Vec<Candidate> = xs.iter().map(|&x| Candidate::new(vec![x])).collect();
        let ranked = objective.rank_candidates(&candidates).unwrap();
        prop_assert_eq!(ranked.len(), candidates.len());
        for w in ranked.windows(2) {
            prop_assert!(w[0][0].abs() <= w[1][0].abs());
        }
        for c in &candidates {
            prop_assert!(ranked.iter().any(|r| r.id() == c.id()));
        }
    }
}
