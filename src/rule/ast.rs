//! Abstract Syntax Tree for rule expressions

use std::fmt;

use crate::error::{Result, RuleEngineError};

/// AST node for rule expressions
///
/// Serializes through [`WireNode`](crate::rule::WireNode) as
/// `{"type", "value", "left", "right"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    /// Single comparison like `age > 30`
    Operand(Operand),
    /// AND / OR joining two subtrees
    Operator(OperatorNode),
}

impl RuleNode {
    pub fn operand(text: impl Into<String>) -> Self {
        RuleNode::Operand(Operand::new(text))
    }

    /// Operator node with both children present
    pub fn operator(connective: Connective, left: RuleNode, right: RuleNode) -> Self {
        RuleNode::Operator(OperatorNode {
            connective,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        })
    }

    /// Wire value: the connective or the raw comparison text
    pub fn value(&self) -> &str {
        match self {
            RuleNode::Operand(operand) => operand.text(),
            RuleNode::Operator(op) => op.connective.as_str(),
        }
    }

    /// True when every operator in the tree has both children
    pub fn is_well_formed(&self) -> bool {
        match self {
            RuleNode::Operand(_) => true,
            RuleNode::Operator(op) => {
                op.is_complete()
                    && op.left.iter().chain(op.right.iter()).all(|n| n.is_well_formed())
            }
        }
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Operand(operand) => write!(f, "{}", operand.text()),
            RuleNode::Operator(op) => {
                let side = |child: &Option<Box<RuleNode>>| match child {
                    Some(node) => node.to_string(),
                    None => "?".to_string(),
                };
                write!(f, "({} {} {})", side(&op.left), op.connective, side(&op.right))
            }
        }
    }
}

/// Binary connective joining two subtrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    /// Connective keywords are case-sensitive
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "AND" => Some(Connective::And),
            "OR" => Some(Connective::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator node; a child slot is `None` only when built from malformed input
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorNode {
    pub connective: Connective,
    pub left: Option<Box<RuleNode>>,
    pub right: Option<Box<RuleNode>>,
}

impl OperatorNode {
    pub fn new(connective: Connective) -> Self {
        Self {
            connective,
            left: None,
            right: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// Raw `field comparator literal` text, split on demand by the evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    text: String,
}

impl Operand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Split the text into field, comparator token and literal.
    ///
    /// The literal is everything after the second space, so it may contain
    /// spaces itself.
    pub fn parts(&self) -> Result<(&str, &str, &str)> {
        let mut parts = self.text.splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(comparator), Some(literal)) => Ok((field, comparator, literal)),
            _ => Err(RuleEngineError::MalformedRule(format!(
                "operand '{}' is not a 'field comparator literal' triple",
                self.text
            ))),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
    /// Equal (=)
    Equal,
}

impl Comparator {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            ">" => Ok(Comparator::Greater),
            "<" => Ok(Comparator::Less),
            "=" => Ok(Comparator::Equal),
            other => Err(RuleEngineError::MalformedRule(format!(
                "unknown comparator '{}'",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::Equal => "=",
        }
    }
}

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(i64),
    Text(String),
}

impl Literal {
    /// All decimal digits parse as an integer; anything else is a string
    /// with at most one leading and one trailing `'` removed.
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse::<i64>().map(Literal::Integer).map_err(|_| {
                RuleEngineError::MalformedRule(format!("integer literal '{}' out of range", raw))
            });
        }

        let text = raw.strip_prefix('\'').unwrap_or(raw);
        let text = text.strip_suffix('\'').unwrap_or(text);
        Ok(Literal::Text(text.to_string()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Text(_) => "string",
        }
    }
}
