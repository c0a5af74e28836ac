//! Folding several rule strings into one tree

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::rule::ast::{Connective, OperatorNode, RuleNode};
use crate::rule::parser::build;

/// Combine rules left-associatively with AND: `((r1 AND r2) AND r3) ...`
///
/// A single rule is returned exactly as built. A rule that builds to nothing
/// leaves the corresponding child slot empty.
pub fn combine<S: AsRef<str>>(rules: &[S], sink: &dyn DiagnosticSink) -> Option<RuleNode> {
    combine_with(rules, sink, |rule| build(rule, sink))
}

/// [`combine`] with a caller-supplied way of building each rule
pub fn combine_with<S, F>(rules: &[S], sink: &dyn DiagnosticSink, mut build_one: F) -> Option<RuleNode>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Option<RuleNode>,
{
    let Some((first, rest)) = rules.split_first() else {
        sink.report(Diagnostic::EmptyRuleList);
        return None;
    };

    let first = build_one(first.as_ref());
    rest.iter().fold(first, |combined, rule| {
        Some(and_node(combined, build_one(rule.as_ref())))
    })
}

fn and_node(left: Option<RuleNode>, right: Option<RuleNode>) -> RuleNode {
    RuleNode::Operator(OperatorNode {
        connective: Connective::And,
        left: left.map(Box::new),
        right: right.map(Box::new),
    })
}
