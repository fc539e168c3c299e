//! Goal declarations.

use core::fmt;

use crate::error::{Error, Result};
use crate::types::Direction;

type GoalFn = Box<dyn Fn(&[f64]) -> core::result::Result<Option<f64>, String> + Send + Sync>;

/// Conversion from a goal function's return type into a goal value.
///
/// Goal functions may return a plain `f64`, an `Option<f64>` (where `None`
/// means "unavailable"), or a `Result` of either with any displayable error.
/// A NaN is treated as unavailable.
pub trait IntoGoalValue {
    /// Convert into `Ok(Some(v))`, `Ok(None)` for unavailable, or an error message.
    ///
    /// # Errors
    ///
    /// Returns the displayed error of a failed goal function.
    fn into_goal_value(self) -> core::result::Result<Option<f64>, String>;
}

fn available(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

impl IntoGoalValue for f64 {
    fn into_goal_value(self) -> core::result::Result<Option<f64>, String> {
        Ok(available(self))
    }
}

impl IntoGoalValue for Option<f64> {
    fn into_goal_value(self) -> core::result::Result<Option<f64>, String> {
        Ok(self.and_then(available))
    }
}

impl<E: fmt::Display> IntoGoalValue for core::result::Result<f64, E> {
    fn into_goal_value(self) -> core::result::Result<Option<f64>, String> {
        self.map(available).map_err(|e| e.to_string())
    }
}

impl<E: fmt::Display> IntoGoalValue for core::result::Result<Option<f64>, E> {
    fn into_goal_value(self) -> core::result::Result<Option<f64>, String> {
        self.map(|v| v.and_then(available))
            .map_err(|e| e.to_string())
    }
}

/// A named goal with its direction.
pub struct Goal {
    name: String,
    direction: Direction,
    function: GoalFn,
}

impl Goal {
    pub(crate) fn new<F, R>(name: impl Into<String>, direction: Direction, function: F) -> Self
    where
        F: Fn(&[f64]) -> R + Send + Sync + 'static,
        R: IntoGoalValue,
    {
        Self {
            name: name.into(),
            direction,
            function: Box::new(move |x| function(x).into_goal_value()),
        }
    }

    /// The goal's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the goal is minimized or maximized.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn evaluate(&self, x: &[f64]) -> Result<Option<f64>> {
        (self.function)(x).map_err(|message| Error::GoalEvaluation {
            goal: self.name.clone(),
            message,
        })
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
