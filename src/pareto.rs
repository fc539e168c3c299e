//! Pareto front utilities.
//!
//! With several goals there is usually no single best candidate. The
//! **Pareto front** is the set of candidates that cannot be improved on one
//! goal without getting worse on another. These helpers work on plain
//! objective vectors; [`DominanceComparator`](crate::objective::DominanceComparator)
//! uses the same front peeling for ranking candidates.
//!
//! | Function | Purpose |
//! |---|---|
//! | [`non_dominated_sort`] | Partition vectors into successive fronts (front 0, 1, …) |
//! | [`pareto_front_indices`] | Only the non-dominated vectors |
//! | [`crowding_distance`] | Spread of the members of one front |
//!
//! # Example
//!
//! ```
//! use diffevo::Direction;
//! use diffevo::pareto::{crowding_distance, non_dominated_sort, pareto_front_indices};
//!
//! let solutions = vec![
//!     vec![1.0, 5.0], // Pareto-optimal
//!     vec![5.0, 1.0], // Pareto-optimal
//!     vec![3.0, 3.0], // Pareto-optimal
//!     vec![4.0, 4.0], // Dominated by (3, 3)
//! ];
//! let dirs = [Direction::Minimize, Direction::Minimize];
//!
//! let fronts = non_dominated_sort(&solutions, &dirs);
//! assert_eq!(fronts, vec![vec![0, 1, 2], vec![3]]);
//! assert_eq!(pareto_front_indices(&solutions, &dirs), vec![0, 1, 2]);
//!
//! let front: Vec<_> = fronts[0].iter().map(|&i| solutions[i].clone()).collect();
//! let cd = crowding_distance(&front);
//! assert!(cd[0].is_infinite()); // boundary solution
//! ```

use crate::types::Direction;

/// Returns `true` if `a` Pareto-dominates `b`: at least as good on every
/// goal and strictly better on one, respecting the given directions.
pub(crate) fn dominates(a: &[f64], b: &[f64], directions: &[Direction]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), directions.len());

    let mut strictly_better = false;
    for ((&av, &bv), &dir) in a.iter().zip(b).zip(directions) {
        if dir.is_better(bv, av) {
            return false;
        }
        if dir.is_better(av, bv) {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Peel `n` items into non-dominated fronts.
///
/// `dominates(i, j)` says whether item `i` dominates item `j`; it is called
/// once per ordered pair. Each front lists indices in ascending order. If a
/// pass finds no undominated item (possible when the relation has cycles),
/// everything left becomes the last front.
pub(crate) fn peel_fronts(n: usize, dominates: impl Fn(usize, usize) -> bool) -> Vec<Vec<usize>> {
    // dominated_by[i]: items that i dominates. domination_count[j]: how many dominate j.
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0_usize; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && dominates(i, j) {
                dominated_by[i].push(j);
                domination_count[j] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut assigned = vec![false; n];
    let mut remaining = n;
    while remaining > 0 {
        let front: Vec<usize> = (0..n)
            .filter(|&i| !assigned[i] && domination_count[i] == 0)
            .collect();
        if front.is_empty() {
            fronts.push((0..n).filter(|&i| !assigned[i]).collect());
            break;
        }
        for &i in &front {
            assigned[i] = true;
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
            }
        }
        remaining -= front.len();
        fronts.push(front);
    }
    fronts
}

/// Partition `solutions` into non-dominated fronts.
///
/// `fronts[0]` is the Pareto front, `fronts[1]` is what remains non-dominated
/// once front 0 is removed, and so on. Indices point into `solutions` and
/// are ascending within a front.
#[must_use]
pub fn non_dominated_sort(solutions: &[Vec<f64>], directions: &[Direction]) -> Vec<Vec<usize>> {
    peel_fronts(solutions.len(), |i, j| {
        dominates(&solutions[i], &solutions[j], directions)
    })
}

/// Indices of the non-dominated solutions.
#[must_use]
pub fn pareto_front_indices(solutions: &[Vec<f64>], directions: &[Direction]) -> Vec<usize> {
    non_dominated_sort(solutions, directions)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Crowding distance of each member of one front, in input order.
///
/// Boundary members (extreme in some goal) get [`f64::INFINITY`]. Goals
/// whose spread is zero or not finite do not contribute.
#[must_use]
pub fn crowding_distance(front: &[Vec<f64>]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = front[0].len();
    let mut distances = vec![0.0_f64; n];
    let mut sorted: Vec<usize> = (0..n).collect();

    for goal in 0..m {
        sorted.sort_by(|&a, &b| front[a][goal].total_cmp(&front[b][goal]));

        distances[sorted[0]] = f64::INFINITY;
        distances[sorted[n - 1]] = f64::INFINITY;

        let range = front[sorted[n - 1]][goal] - front[sorted[0]][goal];
        if range.is_finite() && range > 0.0 {
            for w in sorted.windows(3) {
                distances[w[1]] += (front[w[2]][goal] - front[w[0]][goal]) / range;
            }
        }
    }

    distances
}
