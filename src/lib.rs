//! Rule Engine Core - boolean rule expression engine
//!
//! Parses rule strings such as `(age > 30) AND (department = 'Sales')` into
//! trees, combines several rules into one tree, and evaluates trees against
//! records of named field values. Python bindings via PyO3 are available
//! behind the `python` feature.
//!
//! ```
//! use rule_engine_core::{rule, CollectingSink, FieldValue, Record};
//!
//! let sink = CollectingSink::new();
//! let ast = rule::combine(&["age > 30", "department = 'Sales'"], &sink).unwrap();
//!
//! let record = Record::from([
//!     ("age".to_string(), FieldValue::Integer(35)),
//!     ("department".to_string(), FieldValue::from("Sales")),
//! ]);
//! assert!(rule::evaluate(&ast, &record, &sink).unwrap());
//! ```

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod logging;
pub mod record;
pub mod rule;

#[cfg(feature = "python")]
mod bindings;

pub use config::{EngineConfig, LogFormat};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use engine::{evaluate_batch, RuleEngine};
pub use error::{Result, RuleEngineError};
pub use record::{FieldValue, Record};
pub use rule::{Connective, RuleNode};
