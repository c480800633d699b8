//! Configuration errors.
//!
//! Infeasible solutions are never errors: they score `+∞` fitness and stay
//! comparable inside the search. Everything in this module is raised at
//! setup time, before or while an engine is constructed.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised for malformed problems, parameters, or operator inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The problem failed input validation.
    #[error("invalid problem: {}", join_messages(.0))]
    InvalidProblem(Vec<ValidationError>),

    /// Construction requires at least one worker.
    #[error("problem has no workers")]
    NoWorkers,

    /// Construction requires at least one task.
    #[error("problem has no tasks")]
    NoTasks,

    /// An initialization strategy name did not parse.
    #[error("unknown initialization strategy '{0}'")]
    UnknownInitStrategy(String),

    /// A crossover strategy name did not parse.
    #[error("unknown crossover strategy '{0}'")]
    UnknownCrossoverStrategy(String),

    /// A selection strategy name did not parse.
    #[error("unknown selection strategy '{0}'")]
    UnknownSelectionStrategy(String),

    /// An operator was handed an empty solution.
    #[error("{0} requires a non-empty solution")]
    EmptySolution(&'static str),

    /// Crossover parents have different lengths.
    #[error("crossover parents differ in length ({left} vs {right})")]
    LengthMismatch {
        /// Length of the first parent.
        left: usize,
        /// Length of the second parent.
        right: usize,
    },

    /// Selection was asked to pick from an empty population.
    #[error("population is empty")]
    EmptyPopulation,

    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("{value} is not in [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_problem_message_joins_errors() {
        let err = ConfigError::InvalidProblem(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate task ID: T1"),
            ValidationError::new(ValidationErrorKind::CyclicDependency, "cycle at T2"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid problem: Duplicate task ID: T1; cycle at T2"
        );
    }

    #[test]
    fn test_check_probability() {
        assert!(check_probability("rate", 0.0).is_ok());
        assert!(check_probability("rate", 1.0).is_ok());
        assert!(check_probability("rate", 1.5).is_err());
        assert!(check_probability("rate", f64::NAN).is_err());
    }
}
