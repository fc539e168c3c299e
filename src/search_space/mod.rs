//! Bounded continuous search spaces and the samplers that populate them.
//!
//! A [`SearchSpace`] is a box `min[i] <= x[i] <= max[i]`. New candidates
//! come from a replaceable [`Sampler`]; [`UniformSampler`] is the default
//! and [`LatinHypercubeSampler`] gives stratified coverage when candidates
//! are drawn in batches.
//!
//! Out-of-range coordinates are repaired by re-sampling only the offending
//! dimensions ([`SearchSpace::bound`]). Clamping would pile candidates up on
//! the box faces; re-sampling keeps the marginal distribution unbiased.
//!
//! # Example
//!
//! ```
//! use diffevo::{Candidate, SearchSpace};
//!
//! let mut space = SearchSpace::new(vec![-5.0, -3.0], vec![5.0, 7.0])?
//!     .with_seed(42);
//! let repaired = space.bound(&Candidate::new(vec![-10.0, 3.4]));
//! assert!((-5.0..=5.0).contains(&repaired[0]));
//! assert_eq!(repaired[1], 3.4);
//! # Ok::<(), diffevo::Error>(())
//! ```

mod latin_hypercube;

pub use latin_hypercube::LatinHypercubeSampler;

use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::rng_util;

/// Per-dimension bounds of a search space.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
    delta: Vec<f64>,
}

impl Bounds {
    /// Validate and build bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when `min` and `max` differ in
    /// length, [`Error::EmptySearchSpace`] for zero dimensions, and
    /// [`Error::InvalidBounds`] when some `min[i] > max[i]`.
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self> {
        if min.len() != max.len() {
            return Err(Error::DimensionMismatch {
                expected: min.len(),
                got: max.len(),
            });
        }
        if min.is_empty() {
            return Err(Error::EmptySearchSpace);
        }
        for (dimension, (&lo, &hi)) in min.iter().zip(&max).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(Error::InvalidBounds {
                    dimension,
                    min: lo,
                    max: hi,
                });
            }
        }
        let delta = min.iter().zip(&max).map(|(lo, hi)| hi - lo).collect();
        Ok(Self { min, max, delta })
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.min.len()
    }

    /// Always `false`; bounds are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }

    /// Lower bounds.
    #[must_use]
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Upper bounds.
    #[must_use]
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Widths `max[i] - min[i]`.
    #[must_use]
    pub fn delta(&self) -> &[f64] {
        &self.delta
    }

    /// Returns `true` if `value` lies inside dimension `dim`.
    #[must_use]
    pub fn contains(&self, dim: usize, value: f64) -> bool {
        self.min[dim] <= value && value <= self.max[dim]
    }
}

/// Strategy for drawing points inside [`Bounds`].
///
/// Samplers own their random source so runs are reproducible from a
/// seed. They must be `Send` so a search space can move between threads.
pub trait Sampler: Send {
    /// Draw one full point.
    fn sample(&mut self, bounds: &Bounds) -> Vec<f64>;

    /// Draw a single in-range value for dimension `dim`.
    fn sample_dimension(&mut self, bounds: &Bounds, dim: usize) -> f64;
}

/// Independent uniform draw per dimension.
///
/// # Examples
///
/// ```
/// use diffevo::search_space::{Bounds, Sampler, UniformSampler};
///
/// let bounds = Bounds::new(vec![0.0, 10.0], vec![1.0, 20.0])?;
/// let mut sampler = UniformSampler::with_seed(42);
/// let x = sampler.sample(&bounds);
/// assert!((0.0..=1.0).contains(&x[0]));
/// assert!((10.0..=20.0).contains(&x[1]));
/// # Ok::<(), diffevo::Error>(())
/// ```
pub struct UniformSampler {
    rng: fastrand::Rng,
}

impl UniformSampler {
    /// Creates a uniform sampler with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a uniform sampler with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for UniformSampler {
    fn sample(&mut self, bounds: &Bounds) -> Vec<f64> {
        (0..bounds.len())
            .map(|dim| self.sample_dimension(bounds, dim))
            .collect()
    }

    fn sample_dimension(&mut self, bounds: &Bounds, dim: usize) -> f64 {
        rng_util::f64_range(&mut self.rng, bounds.min[dim], bounds.max[dim])
    }
}

/// A bounded continuous domain with a pluggable sampler.
pub struct SearchSpace {
    bounds: Bounds,
    sampler: Box<dyn Sampler>,
}

impl SearchSpace {
    /// Create a search space from per-dimension bounds, sampling uniformly.
    ///
    /// # Errors
    ///
    /// See [`Bounds::new`].
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self> {
        Ok(Self {
            bounds: Bounds::new(min, max)?,
            sampler: Box::new(UniformSampler::new()),
        })
    }

    /// Create a space where every one of `num_variables` dimensions spans `[min, max]`.
    ///
    /// # Errors
    ///
    /// See [`Bounds::new`].
    pub fn symmetric(num_variables: usize, min: f64, max: f64) -> Result<Self> {
        Self::new(vec![min; num_variables], vec![max; num_variables])
    }

    /// Replace the sampler.
    #[must_use]
    pub fn with_sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Replace the sampler with a seeded [`UniformSampler`].
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_sampler(UniformSampler::with_seed(seed))
    }

    /// The bounds of this space.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Number of variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.bounds.len()
    }

    /// Lower bounds.
    #[must_use]
    pub fn min(&self) -> &[f64] {
        self.bounds.min()
    }

    /// Upper bounds.
    #[must_use]
    pub fn max(&self) -> &[f64] {
        self.bounds.max()
    }

    /// Widths of each dimension.
    #[must_use]
    pub fn delta(&self) -> &[f64] {
        self.bounds.delta()
    }

    /// Draw a new candidate from the sampler.
    pub fn gen_candidate(&mut self) -> Candidate {
        let mut values = self.sampler.sample(&self.bounds);
        // Samplers draw from [min, max); guard against custom ones that do not.
        for (dim, v) in values.iter_mut().enumerate() {
            if !self.bounds.contains(dim, *v) {
                *v = self.bounds.min[dim];
            }
        }
        Candidate::new(values)
    }

    /// Repair a candidate so it lies inside the space.
    ///
    /// Every out-of-range (or NaN) coordinate is replaced by a freshly
    /// sampled value for that dimension; in-range coordinates are kept as
    /// they are. A candidate that is already inside is returned unchanged,
    /// identity included.
    ///
    /// # Panics
    ///
    /// Panics if the candidate's length differs from the number of variables.
    pub fn bound(&mut self, candidate: &Candidate) -> Candidate {
        assert_eq!(
            candidate.len(),
            self.bounds.len(),
            "candidate dimensionality does not match the search space"
        );
        if self.is_candidate(candidate.as_slice()) {
            return candidate.clone();
        }
        let values: Vec<f64> = candidate
            .as_slice()
            .iter()
            .enumerate()
            .map(|(dim, &v)| {
                if self.bounds.contains(dim, v) {
                    v
                } else {
                    self.sampler.sample_dimension(&self.bounds, dim)
                }
            })
            .collect();
        Candidate::new(values)
    }

    /// Clamp every coordinate to its bounds.
    ///
    /// # Panics
    ///
    /// Panics if the candidate's length differs from the number of variables.
    #[must_use]
    pub fn clamp(&self, candidate: &Candidate) -> Candidate {
        assert_eq!(candidate.len(), self.bounds.len());
        if self.is_candidate(candidate.as_slice()) {
            return candidate.clone();
        }
        let values: Vec<f64> = candidate
            .as_slice()
            .iter()
            .enumerate()
            .map(|(dim, &v)| {
                if v.is_nan() {
                    self.bounds.min[dim]
                } else {
                    v.clamp(self.bounds.min[dim], self.bounds.max[dim])
                }
            })
            .collect();
        Candidate::new(values)
    }

    /// Returns `true` if `values` has the right length and every coordinate is in range.
    #[must_use]
    pub fn is_candidate(&self, values: &[f64]) -> bool {
        values.len() == self.bounds.len()
            && values
                .iter()
                .enumerate()
                .all(|(dim, &v)| self.bounds.contains(dim, v))
    }
}

impl core::fmt::Debug for SearchSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SearchSpace")
            .field("min", &self.bounds.min)
            .field("max", &self.bounds.max)
            .finish_non_exhaustive()
    }
}
