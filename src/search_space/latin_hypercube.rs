//! Latin hypercube sampling.
//!
//! Each chunk of `n` points splits every dimension into `n` equal-width
//! strata and uses each stratum exactly once per dimension. The stratum
//! order is permuted independently per dimension, so marginals are
//! stratified while joint combinations stay random. Points are served from
//! the chunk one at a time; an exhausted chunk is regenerated.

use super::{Bounds, Sampler};
use crate::error::{Error, Result};
use crate::rng_util;

/// Stratified batch sampler.
///
/// # Examples
///
/// ```
/// use diffevo::SearchSpace;
/// use diffevo::search_space::LatinHypercubeSampler;
///
/// let sampler = LatinHypercubeSampler::with_seed(10, 7)?;
/// let mut space = SearchSpace::symmetric(3, -1.0, 1.0)?.with_sampler(sampler);
/// let c = space.gen_candidate();
/// assert!(space.is_candidate(c.as_slice()));
/// # Ok::<(), diffevo::Error>(())
/// ```
pub struct LatinHypercubeSampler {
    rng: fastrand::Rng,
    chunk_size: usize,
    chunk: Vec<Vec<f64>>,
}

impl LatinHypercubeSampler {
    /// Creates a sampler producing chunks of `chunk_size` points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        Self::build(chunk_size, None)
    }

    /// Like [`new`](Self::new) with a fixed seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `chunk_size` is zero.
    pub fn with_seed(chunk_size: usize, seed: u64) -> Result<Self> {
        Self::build(chunk_size, Some(seed))
    }

    fn build(chunk_size: usize, seed: Option<u64>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_parameter(
                "chunk_size",
                "latin hypercube chunks need at least one point",
            ));
        }
        Ok(Self {
            rng: rng_util::seeded(seed),
            chunk_size,
            chunk: Vec::with_capacity(chunk_size),
        })
    }

    /// Number of points generated per chunk.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Generate a full chunk of `chunk_size` stratified points.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_chunk(&mut self, bounds: &Bounds) -> Vec<Vec<f64>> {
        let n = self.chunk_size;
        let mut points = vec![Vec::with_capacity(bounds.len()); n];
        let mut strata: Vec<usize> = (0..n).collect();

        for dim in 0..bounds.len() {
            let width = bounds.delta()[dim] / n as f64;
            let low = bounds.min()[dim];
            self.rng.shuffle(&mut strata);
            for (point, &stratum) in points.iter_mut().zip(&strata) {
                let stratum_low = low + stratum as f64 * width;
                let v = rng_util::f64_range(&mut self.rng, stratum_low, stratum_low + width);
                // Rounding at the top stratum must not leave the box.
                point.push(v.min(bounds.max()[dim]));
            }
        }
        trace_debug!(chunk_size = n, dims = bounds.len(), "latin hypercube chunk generated");
        points
    }
}

impl Sampler for LatinHypercubeSampler {
    fn sample(&mut self, bounds: &Bounds) -> Vec<f64> {
        if self
            .chunk
            .last()
            .is_some_and(|p| p.len() != bounds.len())
        {
            self.chunk.clear();
        }
        if self.chunk.is_empty() {
            self.chunk = self.sample_chunk(bounds);
        }
        self.chunk.pop().unwrap_or_else(|| bounds.min().to_vec())
    }

    fn sample_dimension(&mut self, bounds: &Bounds, dim: usize) -> f64 {
        rng_util::f64_range(&mut self.rng, bounds.min()[dim], bounds.max()[dim])
    }
}
