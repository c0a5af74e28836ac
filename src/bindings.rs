//! Python bindings via PyO3
//!
//! Mirrors the three HTTP boundaries of the rule service: `create_rule`,
//! `combine_rules` and `evaluate_rule`, each taking and returning plain
//! Python dicts in the serialized tree shape.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyList};
use std::sync::Arc;

use crate::config::{EngineConfig, LogFormat};
use crate::error::{EvaluationTypeError, MalformedRuleError, RuleEngineError};
use crate::record::{FieldValue, Record};
use crate::rule::{NodeKind, RuleNode, WireNode};
use crate::{logging, RuleEngine};

// ============================================================================
// Shared Engine
// ============================================================================

/// Engine used by the module-level functions
static ENGINE: OnceCell<RwLock<Arc<RuleEngine>>> = OnceCell::new();

fn engine() -> Arc<RuleEngine> {
    ENGINE
        .get_or_init(|| RwLock::new(Arc::new(RuleEngine::default())))
        .read()
        .clone()
}

// ============================================================================
// Conversion Helpers
// ============================================================================

/// Helper to get optional item from a dict, treating `None` as absent
fn get_item_opt<'py>(dict: &Bound<'py, PyDict>, name: &str) -> PyResult<Option<Bound<'py, PyAny>>> {
    Ok(dict.get_item(name)?.filter(|v| !v.is_none()))
}

/// Read an `EngineConfig` from a Python dict; missing keys keep their defaults
fn extract_config(dict: &Bound<'_, PyDict>) -> PyResult<EngineConfig> {
    let mut config = EngineConfig::default();
    if let Some(v) = get_item_opt(dict, "cache_capacity")? {
        config.cache_capacity = v.extract()?;
    }
    if let Some(v) = get_item_opt(dict, "log_filter")? {
        config.log_filter = v.extract()?;
    }
    if let Some(v) = get_item_opt(dict, "log_format")? {
        let format: String = v.extract()?;
        config.log_format = match format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(PyValueError::new_err(format!("Invalid log_format: {}", other)))
            }
        };
    }
    Ok(config)
}

fn wire_to_py<'py>(py: Python<'py>, node: &WireNode) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    let kind = match node.kind {
        NodeKind::Operator => "operator",
        NodeKind::Operand => "operand",
    };
    dict.set_item("type", kind)?;
    dict.set_item("value", &node.value)?;
    dict.set_item(
        "left",
        node.left.as_deref().map(|n| wire_to_py(py, n)).transpose()?,
    )?;
    dict.set_item(
        "right",
        node.right.as_deref().map(|n| wire_to_py(py, n)).transpose()?,
    )?;
    Ok(dict)
}

fn tree_to_py<'py>(py: Python<'py>, ast: Option<&RuleNode>) -> PyResult<Option<Bound<'py, PyDict>>> {
    ast.map(|node| wire_to_py(py, &WireNode::from(node))).transpose()
}

fn wire_from_py(obj: &Bound<'_, PyAny>) -> PyResult<WireNode> {
    let dict = obj
        .downcast::<PyDict>()
        .map_err(|_| PyValueError::new_err("AST node must be a dict"))?;

    let kind: String = get_item_opt(dict, "type")?
        .ok_or_else(|| PyValueError::new_err("AST node is missing 'type'"))?
        .extract()?;
    let kind = match kind.as_str() {
        "operator" => NodeKind::Operator,
        "operand" => NodeKind::Operand,
        other => {
            return Err(RuleEngineError::InvalidTree(format!("unknown node type '{}'", other)).into())
        }
    };
    let value: String = get_item_opt(dict, "value")?
        .ok_or_else(|| PyValueError::new_err("AST node is missing 'value'"))?
        .extract()?;

    let left = get_item_opt(dict, "left")?
        .map(|n| wire_from_py(&n).map(Box::new))
        .transpose()?;
    let right = get_item_opt(dict, "right")?
        .map(|n| wire_from_py(&n).map(Box::new))
        .transpose()?;

    Ok(WireNode {
        kind,
        value,
        left,
        right,
    })
}

fn tree_from_py(obj: &Bound<'_, PyAny>) -> PyResult<RuleNode> {
    Ok(RuleNode::try_from(wire_from_py(obj)?)?)
}

fn record_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Record> {
    let dict = obj
        .downcast::<PyDict>()
        .map_err(|_| PyValueError::new_err("user_data must be a dict"))?;

    let mut record = Record::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let field: String = key.extract()?;
        // bool is an int subclass in Python; reject it explicitly
        let field_value = if value.is_instance_of::<PyBool>() {
            None
        } else if let Ok(i) = value.extract::<i64>() {
            Some(FieldValue::Integer(i))
        } else if let Ok(s) = value.extract::<String>() {
            Some(FieldValue::Text(s))
        } else {
            None
        };
        let field_value = field_value.ok_or_else(|| {
            RuleEngineError::InvalidRecord(format!(
                "field '{}' must be an integer or string",
                field
            ))
        })?;
        record.insert(field, field_value);
    }
    Ok(record)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Replace the shared engine (call once at startup to change cache size)
///
/// # Arguments
/// * `config` - Optional dict with `cache_capacity`, `log_filter`, `log_format`
#[pyfunction]
#[pyo3(signature = (config=None))]
fn init_engine(config: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
    let config = match config {
        Some(dict) => extract_config(dict)?,
        None => EngineConfig::default(),
    };
    let fresh = Arc::new(RuleEngine::new(config));

    // If already initialized, swap the engine
    if let Some(existing) = ENGINE.get() {
        *existing.write() = fresh;
    } else {
        let _ = ENGINE.set(RwLock::new(fresh));
    }
    Ok(())
}

/// Install a stderr log subscriber. Returns False if one was already set.
#[pyfunction]
#[pyo3(signature = (config=None))]
fn init_logging(config: Option<&Bound<'_, PyDict>>) -> PyResult<bool> {
    let config = match config {
        Some(dict) => extract_config(dict)?,
        None => EngineConfig::default(),
    };
    Ok(logging::init(&config))
}

/// Parse a rule string into a serialized AST
///
/// # Returns
/// A dict `{"type", "value", "left", "right"}`, or None if nothing was built
///
/// # Raises
/// ValueError if `rule` is empty
#[pyfunction]
fn create_rule<'py>(py: Python<'py>, rule: &str) -> PyResult<Option<Bound<'py, PyDict>>> {
    if rule.is_empty() {
        tracing::error!("Missing 'rule' in request body.");
        return Err(PyValueError::new_err("Missing 'rule' in request body."));
    }
    let ast = engine().create_rule(rule);
    tree_to_py(py, ast.as_ref())
}

/// Combine several rule strings into one AST joined by AND
///
/// # Raises
/// ValueError if `rules` is empty
#[pyfunction]
fn combine_rules<'py>(py: Python<'py>, rules: Vec<String>) -> PyResult<Option<Bound<'py, PyDict>>> {
    if rules.is_empty() {
        tracing::error!("Missing 'rules' in request body.");
        return Err(PyValueError::new_err("Missing 'rules' in request body."));
    }
    let ast = engine().combine_rules(&rules);
    tree_to_py(py, ast.as_ref())
}

/// Evaluate a serialized AST against user data
///
/// # Raises
/// MalformedRuleError if the AST has missing children or bad operands,
/// EvaluationTypeError if a value cannot be compared with its literal
#[pyfunction]
fn evaluate_rule(ast: &Bound<'_, PyAny>, user_data: &Bound<'_, PyAny>) -> PyResult<bool> {
    let tree = tree_from_py(ast)?;
    let record = record_from_py(user_data)?;
    Ok(engine().evaluate_rule(&tree, &record)?)
}

/// Evaluate a serialized AST against many records without blocking asyncio
///
/// # Example (Python)
/// ```python
/// verdicts = await evaluate_batch_async(ast, [{"age": 35}, {"age": 20}])
/// ```
#[pyfunction]
fn evaluate_batch_async<'py>(
    py: Python<'py>,
    ast: &Bound<'py, PyAny>,
    records: &Bound<'py, PyList>,
) -> PyResult<Bound<'py, PyAny>> {
    let tree = Arc::new(tree_from_py(ast)?);
    let records = records
        .iter()
        .map(|r| record_from_py(&r))
        .collect::<PyResult<Vec<Record>>>()?;
    let engine = engine();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        engine
            .evaluate_batch(tree, records)
            .await
            .map_err(|e| match e {
                RuleEngineError::Task(msg) => {
                    PyRuntimeError::new_err(format!("Evaluation task panicked: {}", msg))
                }
                other => other.into(),
            })
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn rule_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_engine, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_batch_async, m)?)?;
    m.add("MalformedRuleError", m.py().get_type::<MalformedRuleError>())?;
    m.add("EvaluationTypeError", m.py().get_type::<EvaluationTypeError>())?;
    Ok(())
}
