//! Quality values: the comparable result of evaluating a candidate.

use core::cmp::Ordering;
use std::sync::Arc;

use super::ObjectiveId;
use crate::candidate::Candidate;
use crate::error::{Error, Result};

/// Raw goal outputs for one candidate, in goal declaration order.
///
/// `None` marks a goal whose value was unavailable for this candidate.
pub type SubQualities = Arc<[Option<f64>]>;

/// Aggregated quality of one candidate under one objective.
///
/// A snapshot taken at [`version`](Self::version) of the objective. When the
/// objective's version moves on (a global extreme or the weights changed),
/// asking the objective again yields a re-aggregated value.
#[derive(Clone, Debug)]
pub struct QualityValue {
    pub(crate) objective: ObjectiveId,
    pub(crate) candidate: Candidate,
    pub(crate) sub_qualities: SubQualities,
    pub(crate) version: u64,
    pub(crate) value: f64,
}

impl QualityValue {
    /// The aggregate value. Lower is better.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The per-goal raw values.
    #[must_use]
    pub fn sub_qualities(&self) -> &[Option<f64>] {
        &self.sub_qualities
    }

    /// The evaluated candidate.
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Objective version this value was aggregated at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The objective that produced this value.
    #[must_use]
    pub fn objective_id(&self) -> ObjectiveId {
        self.objective
    }

    /// The value shown to humans.
    ///
    /// For a single-goal objective this is the raw goal value, in the
    /// goal's own sign; otherwise it is the aggregate.
    #[must_use]
    pub fn display_value(&self) -> f64 {
        match &*self.sub_qualities {
            [Some(v)] => *v,
            _ => self.value,
        }
    }

    /// Order two values of the same objective, better first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectiveMismatch`] if the values come from
    /// different objectives.
    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        if self.objective != other.objective {
            return Err(Error::ObjectiveMismatch);
        }
        Ok(self.value.total_cmp(&other.value))
    }
}
