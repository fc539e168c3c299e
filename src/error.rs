/// Errors returned by search spaces, objectives, optimizers and archives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a lower bound is greater than the matching upper bound.
    #[error("invalid bounds in dimension {dimension}: min ({min}) must be less than or equal to max ({max})")]
    InvalidBounds {
        /// The offending dimension.
        dimension: usize,
        /// The lower bound value.
        min: f64,
        /// The upper bound value.
        max: f64,
    },

    /// Returned when two vectors that must agree in length do not.
    #[error("dimension mismatch: expected {expected} values but got {got}")]
    DimensionMismatch {
        /// The expected number of values.
        expected: usize,
        /// The actual number of values.
        got: usize,
    },

    /// Returned when a search space is created with zero dimensions.
    #[error("search space must have at least one dimension")]
    EmptySearchSpace,

    /// Returned when an objective is built without any goals.
    #[error("objective must declare at least one goal")]
    NoGoals,

    /// Returned when the weight vector does not have one weight per goal.
    #[error("weight count mismatch: objective has {expected} goals but got {got} weights")]
    WeightCountMismatch {
        /// The number of goals.
        expected: usize,
        /// The number of weights supplied.
        got: usize,
    },

    /// Returned when a configuration value is out of its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when quality values of two different objectives are compared.
    #[error("quality values belong to different objectives")]
    ObjectiveMismatch,

    /// Returned when a goal function reports a failure.
    #[error("goal '{goal}' failed: {message}")]
    GoalEvaluation {
        /// The goal that failed.
        goal: String,
        /// The failure reported by the goal function.
        message: String,
    },

    /// Returned when ranking is requested for an empty set of candidates.
    #[error("cannot rank an empty set of candidates")]
    EmptyPopulation,

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Returned when a serialized configuration cannot be decoded.
    #[cfg(feature = "serde")]
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
