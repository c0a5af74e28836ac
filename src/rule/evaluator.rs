//! Rule evaluator

use std::cmp::Ordering;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Result, RuleEngineError};
use crate::record::{FieldValue, Record};
use crate::rule::ast::{Comparator, Connective, Literal, Operand, OperatorNode, RuleNode};

/// Evaluate a tree against a record.
///
/// Both sides of every operator are evaluated; there is no short-circuit.
/// A field missing from the record makes its operand `false` and is reported
/// to `sink` rather than returned as an error.
pub fn evaluate(node: &RuleNode, record: &Record, sink: &dyn DiagnosticSink) -> Result<bool> {
    match node {
        RuleNode::Operator(op) => evaluate_operator(op, record, sink),
        RuleNode::Operand(operand) => evaluate_operand(operand, record, sink),
    }
}

fn evaluate_operator(op: &OperatorNode, record: &Record, sink: &dyn DiagnosticSink) -> Result<bool> {
    let left = child(op, op.left.as_deref(), "left")?;
    let right = child(op, op.right.as_deref(), "right")?;

    let left = evaluate(left, record, sink)?;
    let right = evaluate(right, record, sink)?;

    Ok(match op.connective {
        Connective::And => left && right,
        Connective::Or => left || right,
    })
}

fn child<'n>(op: &OperatorNode, node: Option<&'n RuleNode>, side: &str) -> Result<&'n RuleNode> {
    node.ok_or_else(|| {
        RuleEngineError::MalformedRule(format!(
            "{} operator is missing its {} operand",
            op.connective, side
        ))
    })
}

fn evaluate_operand(operand: &Operand, record: &Record, sink: &dyn DiagnosticSink) -> Result<bool> {
    let (field, comparator, literal) = operand.parts()?;
    let literal = Literal::parse(literal)?;

    let Some(value) = record.get(field) else {
        sink.report(Diagnostic::MissingField {
            field: field.to_string(),
        });
        return Ok(false);
    };

    let comparator = Comparator::parse(comparator)?;
    compare(field, value, comparator, &literal)
}

fn compare(field: &str, value: &FieldValue, comparator: Comparator, literal: &Literal) -> Result<bool> {
    let ordering = match (value, literal) {
        (FieldValue::Integer(v), Literal::Integer(l)) => v.cmp(l),
        (FieldValue::Text(v), Literal::Text(l)) => v.as_str().cmp(l.as_str()),
        // Different types are never equal, but they have no ordering
        _ if comparator == Comparator::Equal => return Ok(false),
        _ => {
            return Err(RuleEngineError::EvaluationType {
                field: field.to_string(),
                comparator: comparator.as_str().to_string(),
                record_type: value.type_name(),
                literal_type: literal.type_name(),
            })
        }
    };

    Ok(match comparator {
        Comparator::Greater => ordering == Ordering::Greater,
        Comparator::Less => ordering == Ordering::Less,
        Comparator::Equal => ordering == Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::rule::parser::build;

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_simple_comparison() {
        let sink = CollectingSink::new();
        let ast = build("age > 30", &sink).unwrap();

        assert!(evaluate(&ast, &record(&[("age", 35.into())]), &sink).unwrap());
        assert!(!evaluate(&ast, &record(&[("age", 20.into())]), &sink).unwrap());
        assert!(!evaluate(&ast, &record(&[("age", 30.into())]), &sink).unwrap());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_less_and_equal() {
        let sink = CollectingSink::new();
        let data = record(&[("age", 25.into()), ("department", "Sales".into())]);

        let ast = build("age < 30", &sink).unwrap();
        assert!(evaluate(&ast, &data, &sink).unwrap());

        let ast = build("department = 'Sales'", &sink).unwrap();
        assert!(evaluate(&ast, &data, &sink).unwrap());

        let ast = build("department = 'Marketing'", &sink).unwrap();
        assert!(!evaluate(&ast, &data, &sink).unwrap());
    }

    #[test]
    fn test_string_ordering() {
        let sink = CollectingSink::new();
        let data = record(&[("name", "bob".into())]);

        let ast = build("name > 'alice'", &sink).unwrap();
        assert!(evaluate(&ast, &data, &sink).unwrap());

        let ast = build("name < alice", &sink).unwrap();
        assert!(!evaluate(&ast, &data, &sink).unwrap());
    }

    #[test]
    fn test_multi_word_literal() {
        let sink = CollectingSink::new();
        let ast = build("city = 'New York'", &sink).unwrap();
        let data = record(&[("city", "New York".into())]);
        assert!(evaluate(&ast, &data, &sink).unwrap());
    }

    #[test]
    fn test_missing_field_is_false_and_reported() {
        let sink = CollectingSink::new();
        let ast = build("age > 30", &sink).unwrap();

        assert!(!evaluate(&ast, &Record::new(), &sink).unwrap());
        assert_eq!(
            sink.events(),
            vec![Diagnostic::MissingField {
                field: "age".to_string()
            }]
        );
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let sink = CollectingSink::new();
        let ast = build("age > 30", &sink).unwrap();
        let data = record(&[("age", "thirty-five".into())]);

        let err = evaluate(&ast, &data, &sink).unwrap_err();
        assert_eq!(
            err,
            RuleEngineError::EvaluationType {
                field: "age".to_string(),
                comparator: ">".to_string(),
                record_type: "string",
                literal_type: "integer",
            }
        );
    }

    #[test]
    fn test_cross_type_equality_is_false() {
        let sink = CollectingSink::new();
        let ast = build("age = 'thirty'", &sink).unwrap();
        let data = record(&[("age", 30.into())]);
        assert!(!evaluate(&ast, &data, &sink).unwrap());
    }

    #[test]
    fn test_or_and_connectives() {
        let sink = CollectingSink::new();
        let data = record(&[("age", 20.into()), ("salary", 60000.into())]);

        let ast = build("(age > 30) OR (salary > 50000)", &sink).unwrap();
        assert!(evaluate(&ast, &data, &sink).unwrap());

        let ast = build("(age > 30) AND (salary > 50000)", &sink).unwrap();
        assert!(!evaluate(&ast, &data, &sink).unwrap());
    }

    #[test]
    fn test_no_short_circuit() {
        // The right side is still evaluated (and fails) even though the left
        // side already decides an OR.
        let sink = CollectingSink::new();
        let ast = build("(age > 30) OR (name > 5)", &sink).unwrap();
        let data = record(&[("age", 40.into()), ("name", "bob".into())]);

        let err = evaluate(&ast, &data, &sink).unwrap_err();
        assert!(matches!(err, RuleEngineError::EvaluationType { .. }));

        // Missing fields on the right are still reported
        let data = record(&[("age", 40.into())]);
        assert!(evaluate(&ast, &data, &sink).unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_missing_child_is_malformed() {
        let sink = CollectingSink::new();
        let data = record(&[("age", 40.into()), ("salary", 60000.into())]);

        let ast = build("age > 30 AND salary > 50000", &sink).unwrap();
        let err = evaluate(&ast, &data, &sink).unwrap_err();
        assert!(matches!(err, RuleEngineError::MalformedRule(_)));

        let ast = build("((age > 30) OR)", &sink).unwrap();
        let err = evaluate(&ast, &data, &sink).unwrap_err();
        assert_eq!(
            err,
            RuleEngineError::MalformedRule("OR operator is missing its right operand".to_string())
        );
    }

    #[test]
    fn test_malformed_operand() {
        let sink = CollectingSink::new();
        let data = record(&[("age", 40.into())]);

        let ast = RuleNode::operand("age>30");
        assert!(matches!(
            evaluate(&ast, &data, &sink),
            Err(RuleEngineError::MalformedRule(_))
        ));

        let ast = RuleNode::operand("age >= 30");
        assert!(matches!(
            evaluate(&ast, &data, &sink),
            Err(RuleEngineError::MalformedRule(_))
        ));
    }

    #[test]
    fn test_missing_field_checked_before_comparator() {
        let sink = CollectingSink::new();
        let ast = RuleNode::operand("age >= 30");
        assert!(!evaluate(&ast, &Record::new(), &sink).unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let sink = CollectingSink::new();
        let ast = build("((age > 30) AND (salary > 50000)) OR (department = 'Sales')", &sink)
            .unwrap();
        let data = record(&[
            ("age", 25.into()),
            ("salary", 40000.into()),
            ("department", "Sales".into()),
        ]);

        let first = evaluate(&ast, &data, &sink).unwrap();
        let second = evaluate(&ast, &data, &sink).unwrap();
        assert!(first);
        assert_eq!(first, second);
    }
}
