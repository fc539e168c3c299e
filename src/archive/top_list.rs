//! Bounded, sorted candidate lists.

use crate::candidate::{Candidate, CandidateId};
use crate::error::Result;

/// A fixed-capacity list of candidates ordered by a key, lowest first.
///
/// Inserting into a full list evicts the entry with the highest key, but
/// only if the newcomer's key is strictly lower. Equal keys keep insertion
/// order. The same candidate identity is never stored twice.
///
/// # Examples
///
/// ```
/// use diffevo::Candidate;
/// use diffevo::archive::TopList;
///
/// let mut list = TopList::new(3);
/// for v in [10.0, 12.0, 5.0, 35.0, 7.0] {
///     list.insert(v, Candidate::new(vec![v]));
/// }
/// assert_eq!(list.keys().collect::<Vec<_>>(), vec![5.0, 7.0, 10.0]);
/// ```
#[derive(Clone, Debug)]
pub struct TopList {
    capacity: usize,
    entries: Vec<(f64, Candidate)>,
}

impl TopList {
    /// An empty list holding at most `capacity` candidates.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the list is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// The lowest-keyed candidate.
    #[must_use]
    pub fn best(&self) -> Option<&Candidate> {
        self.entries.first().map(|(_, c)| c)
    }

    /// The highest key currently stored.
    #[must_use]
    pub fn worst_key(&self) -> Option<f64> {
        self.entries.last().map(|(k, _)| *k)
    }

    /// Candidates, best first.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().map(|(_, c)| c)
    }

    /// Keys, best first.
    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Returns `true` if a candidate with `id` is stored.
    #[must_use]
    pub fn contains(&self, id: CandidateId) -> bool {
        self.entries.iter().any(|(_, c)| c.id() == id)
    }

    /// Insert `candidate` under `key`. Returns whether it was stored.
    pub fn insert(&mut self, key: f64, candidate: Candidate) -> bool {
        if self.capacity == 0 || key.is_nan() || self.contains(candidate.id()) {
            return false;
        }
        if self.is_full() && self.worst_key().is_some_and(|worst| key >= worst) {
            return false;
        }
        let at = self.entries.partition_point(|(k, _)| *k <= key);
        self.entries.insert(at, (key, candidate));
        self.entries.truncate(self.capacity);
        true
    }

    /// Keep only the candidates for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Candidate) -> bool) {
        self.entries.retain(|(_, c)| keep(c));
    }

    /// Recompute every key and restore the order. Ties keep their relative order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `key_of`; the list is left unchanged.
    pub fn rekey(&mut self, mut key_of: impl FnMut(&Candidate) -> Result<f64>) -> Result<()> {
        let mut rekeyed = self
            .entries
            .iter()
            .map(|(_, c)| key_of(c).map(|k| (k, c.clone())))
            .collect::<Result<Vec<_>>>()?;
        rekeyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.entries = rekeyed;
        Ok(())
    }
}
