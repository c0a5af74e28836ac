//! RuleEngine - configured entry point for the three rule operations
//!
//! Bundles a parse cache and a diagnostic sink so that callers (such as the
//! Python bindings) do not have to thread them through every call. The free
//! functions in [`crate::rule`] remain usable directly.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{Result, RuleEngineError};
use crate::record::{record_from_json, Record};
use crate::rule::{self, wire, RuleCache, RuleNode};

/// Rule engine holding configuration, parse cache and diagnostics sink
pub struct RuleEngine {
    config: EngineConfig,
    cache: RuleCache,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RuleEngine {
    /// Create an engine reporting diagnostics through `tracing`
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: EngineConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let cache = RuleCache::with_capacity(config.cache_capacity);
        Self {
            config,
            cache,
            sink,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Build one rule string into a tree
    pub fn create_rule(&self, rule: &str) -> Option<RuleNode> {
        let ast = self.cache.get_or_build(rule, self.sink.as_ref());
        if ast.is_some() {
            tracing::debug!(rule, "Rule created successfully");
        }
        ast
    }

    /// AND-fold several rule strings into one tree
    pub fn combine_rules<S: AsRef<str>>(&self, rules: &[S]) -> Option<RuleNode> {
        let combined = rule::combine_with(rules, self.sink.as_ref(), |r| self.create_rule(r));
        if combined.is_some() {
            tracing::debug!(count = rules.len(), "Rules combined successfully");
        }
        combined
    }

    /// Evaluate a tree against a record
    pub fn evaluate_rule(&self, ast: &RuleNode, record: &Record) -> Result<bool> {
        let result = rule::evaluate(ast, record, self.sink.as_ref());
        match &result {
            Ok(verdict) => tracing::debug!(verdict, "Rule evaluated successfully"),
            Err(e) => tracing::error!(error = %e, "Error evaluating rule"),
        }
        result
    }

    /// Evaluate many records against one tree on a blocking worker thread.
    ///
    /// Returns the verdicts in record order, or the first error encountered.
    pub async fn evaluate_batch(&self, ast: Arc<RuleNode>, records: Vec<Record>) -> Result<Vec<bool>> {
        evaluate_batch(ast, records, Arc::clone(&self.sink)).await
    }

    /// `{"rule": ...}` boundary: rule string in, serialized tree (or `null`) out
    pub fn create_rule_json(&self, rule: &str) -> Result<String> {
        wire::to_json(self.create_rule(rule).as_ref())
    }

    /// `{"rules": [...]}` boundary: JSON array of rule strings in, serialized tree out
    pub fn combine_rules_json(&self, rules_json: &str) -> Result<String> {
        let rules: Vec<String> = serde_json::from_str(rules_json)?;
        wire::to_json(self.combine_rules(&rules).as_ref())
    }

    /// `{"ast": ..., "user_data": ...}` boundary: serialized tree and record in
    pub fn evaluate_rule_json(&self, ast_json: &str, record_json: &str) -> Result<bool> {
        let ast = wire::from_json(ast_json)?
            .ok_or_else(|| RuleEngineError::InvalidTree("no tree to evaluate".to_string()))?;
        let record = record_from_json(record_json)?;
        self.evaluate_rule(&ast, &record)
    }
}

/// Evaluate `records` against `ast` on tokio's blocking pool
pub async fn evaluate_batch(
    ast: Arc<RuleNode>,
    records: Vec<Record>,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<Vec<bool>> {
    tokio::task::spawn_blocking(move || {
        records
            .iter()
            .map(|record| rule::evaluate(&ast, record, sink.as_ref()))
            .collect::<Result<Vec<bool>>>()
    })
    .await
    .map_err(|e| RuleEngineError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Diagnostic};
    use crate::record::FieldValue;

    fn engine() -> (RuleEngine, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let engine = RuleEngine::with_sink(EngineConfig::default(), sink.clone());
        (engine, sink)
    }

    fn employee(age: i64, salary: i64, department: &str) -> Record {
        Record::from([
            ("age".to_string(), FieldValue::Integer(age)),
            ("salary".to_string(), FieldValue::Integer(salary)),
            ("department".to_string(), FieldValue::from(department)),
        ])
    }

    #[test]
    fn test_create_rule_uses_cache() {
        let (engine, _) = engine();
        let first = engine.create_rule("age > 30");
        let second = engine.create_rule("age > 30");
        assert_eq!(first, Some(RuleNode::operand("age > 30")));
        assert_eq!(first, second);
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_create_rule_reports_dropped_operand_on_every_call() {
        let (engine, sink) = engine();
        let first = engine.create_rule("age > 30 AND salary > 50000");
        let second = engine.create_rule("age > 30 AND salary > 50000");
        assert_eq!(first, second);
        assert_eq!(engine.cache().len(), 1);

        let dropped = Diagnostic::DroppedOperand {
            operand: "age > 30".to_string(),
        };
        assert_eq!(sink.events(), vec![dropped.clone(), dropped]);
    }

    #[test]
    fn test_combine_rules_reports_cached_empty_rule() {
        let (engine, sink) = engine();
        engine.combine_rules(&["age > 30", ""]);
        engine.combine_rules(&["age > 30", ""]);
        let empty = Diagnostic::EmptyRule {
            rule: String::new(),
        };
        assert_eq!(sink.events(), vec![empty.clone(), empty]);
    }

    #[test]
    fn test_combine_matches_free_function() {
        let (engine, sink) = engine();
        let rules = ["age > 30", "salary > 50000", "department = 'Sales'"];
        assert_eq!(
            engine.combine_rules(&rules),
            rule::combine(&rules, sink.as_ref())
        );
        assert!(engine.combine_rules::<&str>(&[]).is_none());
        assert!(sink.events().contains(&Diagnostic::EmptyRuleList));
    }

    #[test]
    fn test_combined_evaluation() {
        let (engine, _) = engine();
        let ast = engine
            .combine_rules(&["age > 30", "salary > 50000", "department = 'Sales'"])
            .unwrap();

        assert!(engine.evaluate_rule(&ast, &employee(35, 60000, "Sales")).unwrap());
        assert!(!engine.evaluate_rule(&ast, &employee(35, 40000, "Sales")).unwrap());
    }

    #[test]
    fn test_json_boundaries() {
        let (engine, sink) = engine();

        let ast_json = engine.create_rule_json("age > 30").unwrap();
        assert_eq!(
            ast_json,
            r#"{"type":"operand","value":"age > 30","left":null,"right":null}"#
        );
        assert!(engine.evaluate_rule_json(&ast_json, r#"{"age": 35}"#).unwrap());
        assert!(!engine.evaluate_rule_json(&ast_json, r#"{"age": 20}"#).unwrap());
        assert!(!engine.evaluate_rule_json(&ast_json, "{}").unwrap());
        assert_eq!(sink.len(), 1);

        assert_eq!(engine.create_rule_json("").unwrap(), "null");
        assert_eq!(engine.combine_rules_json("[]").unwrap(), "null");

        let combined = engine
            .combine_rules_json(r#"["age > 30", "salary > 50000"]"#)
            .unwrap();
        assert!(engine
            .evaluate_rule_json(&combined, r#"{"age": 35, "salary": 60000}"#)
            .unwrap());
    }

    #[test]
    fn test_json_boundary_errors() {
        let (engine, _) = engine();

        let err = engine.evaluate_rule_json("null", "{}").unwrap_err();
        assert!(matches!(err, RuleEngineError::InvalidTree(_)));

        let ast_json = engine.create_rule_json("age > 30").unwrap();
        let err = engine
            .evaluate_rule_json(&ast_json, r#"{"age": "old"}"#)
            .unwrap_err();
        assert!(matches!(err, RuleEngineError::EvaluationType { .. }));

        let err = engine.combine_rules_json(r#"{"rules": 1}"#).unwrap_err();
        assert!(matches!(err, RuleEngineError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_evaluate_batch() {
        let (engine, sink) = engine();
        let ast = Arc::new(engine.create_rule("age > 30").unwrap());
        let records = vec![
            Record::from([("age".to_string(), FieldValue::Integer(35))]),
            Record::from([("age".to_string(), FieldValue::Integer(20))]),
            Record::new(),
        ];

        let verdicts = engine.evaluate_batch(ast, records).await.unwrap();
        assert_eq!(verdicts, vec![true, false, false]);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_batch_surfaces_first_error() {
        let (engine, _) = engine();
        let ast = Arc::new(engine.create_rule("age > 30").unwrap());
        let records = vec![
            Record::from([("age".to_string(), FieldValue::Integer(35))]),
            Record::from([("age".to_string(), FieldValue::from("old"))]),
        ];

        let err = engine.evaluate_batch(ast, records).await.unwrap_err();
        assert!(matches!(err, RuleEngineError::EvaluationType { .. }));
    }
}
