/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Build an RNG from an optional seed.
pub(crate) fn seeded(seed: Option<u64>) -> fastrand::Rng {
    seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
}

/// Move `count` distinct random entries of `permutation` to its front.
///
/// Partial Fisher–Yates: only the first `count` slots are touched, so the
/// cost is O(count) regardless of the slice length. The slice stays a
/// permutation of its original contents.
pub(crate) fn partial_shuffle(rng: &mut fastrand::Rng, permutation: &mut [usize], count: usize) {
    let n = permutation.len();
    for i in 0..count.min(n) {
        let j = rng.usize(i..n);
        permutation.swap(i, j);
    }
}
