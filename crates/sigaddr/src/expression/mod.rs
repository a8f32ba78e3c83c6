//! Address expressions: the persisted tree that computes a named offset.
//!
//! Nodes exchange intermediate addresses as uppercase hex text, the same
//! form the document stores, so a constant can stand in for any subtree.

mod evaluator;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use evaluator::{Evaluator, PatternResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum AddressExpression {
    /// Literal hex text, returned unchanged
    Constant { value: String },

    /// Address of the named pattern definition
    Pattern { name: String },

    /// Operator applied to one operand, configured by a literal value
    Operator {
        operator: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        operand: Box<AddressExpression>,
    },

    /// Operator whose configuration value is itself an expression
    BinaryOperator {
        operator: String,
        target: Box<AddressExpression>,
        value: Box<AddressExpression>,
    },
}

impl AddressExpression {
    pub fn constant(value: impl Into<String>) -> Self {
        Self::Constant {
            value: value.into(),
        }
    }

    pub fn pattern(name: impl Into<String>) -> Self {
        Self::Pattern { name: name.into() }
    }

    pub fn unary(
        operator: impl Into<String>,
        value: Option<String>,
        operand: AddressExpression,
    ) -> Self {
        Self::Operator {
            operator: operator.into(),
            value,
            operand: Box::new(operand),
        }
    }

    pub fn binary(
        operator: impl Into<String>,
        target: AddressExpression,
        value: AddressExpression,
    ) -> Self {
        Self::BinaryOperator {
            operator: operator.into(),
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Operator identifier of an operator node.
    pub fn operator_id(&self) -> Option<&str> {
        match self {
            Self::Operator { operator, .. } | Self::BinaryOperator { operator, .. } => {
                Some(operator.as_str())
            }
            _ => None,
        }
    }

    /// Rewrite a unary operator node as the equivalent binary node.
    ///
    /// The literal configuration value becomes a constant value child.
    /// Other nodes are returned unchanged.
    pub fn into_binary(self) -> Self {
        match self {
            Self::Operator {
                operator,
                value,
                operand,
            } => Self::BinaryOperator {
                operator,
                target: operand,
                value: Box::new(Self::constant(value.unwrap_or_default())),
            },
            other => other,
        }
    }

    /// Check that every operator node names an operator, recursively.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Constant { .. } => Ok(()),
            Self::Pattern { name } => {
                if name.trim().is_empty() {
                    return Err(Error::InvalidDocument(
                        "pattern reference with empty name".to_string(),
                    ));
                }
                Ok(())
            }
            Self::Operator {
                operator, operand, ..
            } => {
                require_operator(operator)?;
                operand.validate()
            }
            Self::BinaryOperator {
                operator,
                target,
                value,
            } => {
                require_operator(operator)?;
                target.validate()?;
                value.validate()
            }
        }
    }
}

fn require_operator(operator: &str) -> Result<()> {
    if operator.trim().is_empty() {
        return Err(Error::InvalidDocument(
            "operator node with empty operator identifier".to_string(),
        ));
    }
    Ok(())
}
