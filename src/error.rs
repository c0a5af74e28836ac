//! Error types for the rule engine core

use thiserror::Error;

/// Main error type for the rule engine core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEngineError {
    /// The tree cannot be evaluated: an operator is missing a child, or an
    /// operand is not a `field comparator literal` triple.
    #[error("Malformed rule: {0}")]
    MalformedRule(String),

    /// The record value and the literal cannot be ordered against each other.
    #[error(
        "Type mismatch on field '{field}': cannot compare {record_type} {comparator} {literal_type}"
    )]
    EvaluationType {
        field: String,
        comparator: String,
        record_type: &'static str,
        literal_type: &'static str,
    },

    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Evaluation task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for RuleEngineError {
    fn from(err: serde_json::Error) -> Self {
        RuleEngineError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
mod python {
    use super::RuleEngineError;
    use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
    use pyo3::PyErr;

    pyo3::create_exception!(
        rule_engine_core,
        MalformedRuleError,
        PyValueError,
        "Raised when a rule tree cannot be evaluated."
    );
    pyo3::create_exception!(
        rule_engine_core,
        EvaluationTypeError,
        PyTypeError,
        "Raised when a record value cannot be compared with a rule literal."
    );

    impl From<RuleEngineError> for PyErr {
        fn from(err: RuleEngineError) -> PyErr {
            match err {
                RuleEngineError::MalformedRule(_) => MalformedRuleError::new_err(err.to_string()),
                RuleEngineError::EvaluationType { .. } => {
                    EvaluationTypeError::new_err(err.to_string())
                }
                RuleEngineError::InvalidTree(_)
                | RuleEngineError::InvalidRecord(_)
                | RuleEngineError::Deserialization(_) => PyValueError::new_err(err.to_string()),
                RuleEngineError::Task(_) => PyRuntimeError::new_err(err.to_string()),
            }
        }
    }
}

#[cfg(feature = "python")]
pub use python::{EvaluationTypeError, MalformedRuleError};

/// Result type alias for the rule engine core
pub type Result<T> = std::result::Result<T, RuleEngineError>;
