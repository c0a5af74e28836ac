//! Serialized tree shape exchanged with callers
//!
//! ```json
//! {"type": "operator", "value": "AND",
//!  "left": {"type": "operand", "value": "age > 30", "left": null, "right": null},
//!  "right": null}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{Connective, Operand, OperatorNode, RuleNode};

/// Node kind tag on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Operator,
    Operand,
}

/// One node of the serialized tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub value: String,
    #[serde(default)]
    pub left: Option<Box<WireNode>>,
    #[serde(default)]
    pub right: Option<Box<WireNode>>,
}

impl From<&RuleNode> for WireNode {
    fn from(node: &RuleNode) -> Self {
        match node {
            RuleNode::Operand(operand) => WireNode {
                kind: NodeKind::Operand,
                value: operand.text().to_string(),
                left: None,
                right: None,
            },
            RuleNode::Operator(op) => WireNode {
                kind: NodeKind::Operator,
                value: op.connective.as_str().to_string(),
                left: op.left.as_deref().map(|n| Box::new(WireNode::from(n))),
                right: op.right.as_deref().map(|n| Box::new(WireNode::from(n))),
            },
        }
    }
}

impl From<RuleNode> for WireNode {
    fn from(node: RuleNode) -> Self {
        WireNode::from(&node)
    }
}

impl TryFrom<WireNode> for RuleNode {
    type Error = RuleEngineError;

    fn try_from(wire: WireNode) -> Result<Self> {
        match wire.kind {
            NodeKind::Operand => {
                if wire.left.is_some() || wire.right.is_some() {
                    return Err(RuleEngineError::InvalidTree(format!(
                        "operand '{}' cannot have children",
                        wire.value
                    )));
                }
                Ok(RuleNode::Operand(Operand::new(wire.value)))
            }
            NodeKind::Operator => {
                let connective = Connective::from_keyword(&wire.value).ok_or_else(|| {
                    RuleEngineError::InvalidTree(format!("unknown operator '{}'", wire.value))
                })?;
                Ok(RuleNode::Operator(OperatorNode {
                    connective,
                    left: wire.left.map(|n| child(*n)).transpose()?,
                    right: wire.right.map(|n| child(*n)).transpose()?,
                }))
            }
        }
    }
}

fn child(wire: WireNode) -> Result<Box<RuleNode>> {
    RuleNode::try_from(wire).map(Box::new)
}

impl Serialize for RuleNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireNode::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = WireNode::deserialize(deserializer)?;
        RuleNode::try_from(wire).map_err(serde::de::Error::custom)
    }
}

/// Serialize a tree (or its absence) to JSON; absence is `null`
pub fn to_json(node: Option<&RuleNode>) -> Result<String> {
    Ok(serde_json::to_string(&node)?)
}

/// Parse a serialized tree; `null` yields `None`
pub fn from_json(json: &str) -> Result<Option<RuleNode>> {
    let wire: Option<WireNode> = serde_json::from_str(json)?;
    wire.map(RuleNode::try_from).transpose()
}
