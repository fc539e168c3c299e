//! Candidate solutions: fixed-length real vectors with a stable identity.
//!
//! A [`Candidate`] is immutable. Cloning it is cheap (the coordinates are
//! shared) and keeps its [`CandidateId`], which is what objectives use to
//! key their quality caches. Arithmetic always produces a new candidate
//! with a fresh identity.
//!
//! ```
//! use diffevo::Candidate;
//!
//! let a = Candidate::new(vec![1.0, 2.0]);
//! let b = Candidate::new(vec![0.5, 0.5]);
//! let donor = &a + &(&b * 0.5);
//! assert_eq!(donor.as_slice(), &[1.25, 2.25]);
//! assert_ne!(donor.id(), a.id());
//! ```

use core::fmt;
use core::ops::{Add, Index, Mul, Sub};
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_CANDIDATE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`Candidate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(u64);

impl CandidateId {
    fn next() -> Self {
        Self(NEXT_CANDIDATE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A point in a search space.
#[derive(Clone)]
pub struct Candidate {
    id: CandidateId,
    values: Arc<[f64]>,
}

impl Candidate {
    /// Create a candidate with a fresh identity.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            id: CandidateId::next(),
            values: Arc::from(values.into()),
        }
    }

    /// The identity used for caching and duplicate detection.
    #[must_use]
    pub fn id(&self) -> CandidateId {
        self.id
    }

    /// Number of coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-dimensional candidate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The coordinates.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Copy the coordinates into a plain vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics (in debug) if the candidates differ in length.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        euclidean_distance(&self.values, &other.values)
    }

    /// `self + factor * (a - b)`, the DE difference-vector step.
    #[must_use]
    pub fn add_scaled_difference(&self, factor: f64, a: &Self, b: &Self) -> Self {
        debug_assert_eq!(self.len(), a.len());
        debug_assert_eq!(self.len(), b.len());
        let values: Vec<f64> = self
            .values
            .iter()
            .zip(a.values.iter().zip(b.values.iter()))
            .map(|(&base, (&av, &bv))| base + factor * (av - bv))
            .collect();
        Self::new(values)
    }

    /// Weak handle on the shared coordinates; dead once every clone is dropped.
    pub(crate) fn downgrade(&self) -> Weak<[f64]> {
        Arc::downgrade(&self.values)
    }
}

/// Euclidean distance between two equally long slices.
pub(crate) fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("id", &self.id.0)
            .field("values", &&*self.values)
            .finish()
    }
}

/// Candidates compare equal when their coordinates are equal, regardless of identity.
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Index<usize> for Candidate {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl From<Vec<f64>> for Candidate {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for Candidate {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl Add for &Candidate {
    type Output = Candidate;

    fn add(self, rhs: &Candidate) -> Candidate {
        debug_assert_eq!(self.len(), rhs.len());
        Candidate::new(
            self.values
                .iter()
                .zip(rhs.values.iter())
                .map(|(a, b)| a + b)
                .collect::<Vec<_>>(),
        )
    }
}

impl Sub for &Candidate {
    type Output = Candidate;

    fn sub(self, rhs: &Candidate) -> Candidate {
        debug_assert_eq!(self.len(), rhs.len());
        Candidate::new(
            self.values
                .iter()
                .zip(rhs.values.iter())
                .map(|(a, b)| a - b)
                .collect::<Vec<_>>(),
        )
    }
}

impl Mul<f64> for &Candidate {
    type Output = Candidate;

    fn mul(self, factor: f64) -> Candidate {
        Candidate::new(self.values.iter().map(|v| v * factor).collect::<Vec<_>>())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Candidate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Candidate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Ok(Self::new(values))
    }
}
