//! Diagnostic events raised while building and evaluating rules
//!
//! Nothing here is an error: these are the recoverable conditions the engine
//! degrades through (dropped operands, missing fields, ...). Callers decide
//! where they go by handing a [`DiagnosticSink`] to each operation.

use parking_lot::Mutex;
use std::fmt;

/// A recoverable event observed by the builder, combiner or evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The rule string produced no tree
    EmptyRule { rule: String },
    /// An operand was flushed with no node to attach it to and was discarded
    DroppedOperand { operand: String },
    /// A `)` appeared with no matching `(`
    UnbalancedClose,
    /// Input ended with `(` groups still open; their enclosing nodes are lost
    UnclosedGroup { depth: usize },
    /// `combine` was called with no rules
    EmptyRuleList,
    /// The record has no value for a field referenced by an operand
    MissingField { field: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyRule { rule } => write!(f, "No valid AST created for rule '{}'", rule),
            Diagnostic::DroppedOperand { operand } => {
                write!(f, "Operand '{}' has no node to attach to", operand)
            }
            Diagnostic::UnbalancedClose => write!(f, "Unbalanced ')' in rule"),
            Diagnostic::UnclosedGroup { depth } => {
                write!(f, "{} unclosed '(' group(s) in rule", depth)
            }
            Diagnostic::EmptyRuleList => write!(f, "No rules provided for combination"),
            Diagnostic::MissingField { field } => {
                write!(f, "Field '{}' not found in user data", field)
            }
        }
    }
}

/// Destination for diagnostic events
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MissingField { field } => {
                tracing::error!(field = %field, "{}", diagnostic);
            }
            _ => tracing::warn!("{}", diagnostic),
        }
    }
}

/// Keeps every reported diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events reported so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drain and return all events
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}
