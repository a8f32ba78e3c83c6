use tracing::debug;

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::operator::{OperatorRegistry, TextFactory, format_address, literal, parse_target};

use super::AddressExpression;

/// Source of addresses for `pattern` leaves.
pub trait PatternResolver {
    fn resolve_pattern(&self, name: &str) -> Result<u64>;
}

/// Evaluates address expressions to hex text.
pub struct Evaluator<'a> {
    registry: &'a OperatorRegistry,
    patterns: &'a dyn PatternResolver,
    memory: Option<&'a dyn ReadMemory>,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a OperatorRegistry, patterns: &'a dyn PatternResolver) -> Self {
        Self {
            registry,
            patterns,
            memory: None,
        }
    }

    /// Reader handed to operators that load from memory.
    pub fn with_memory(mut self, memory: &'a dyn ReadMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn evaluate(&self, expression: &AddressExpression) -> Result<String> {
        match expression {
            AddressExpression::Constant { value } => Ok(value.clone()),
            AddressExpression::Pattern { name } => {
                let address = self.patterns.resolve_pattern(name.trim())?;
                Ok(format_address(address))
            }
            AddressExpression::Operator {
                operator,
                value,
                operand,
            } => {
                let target: TextFactory<'_> = Box::new(move || self.evaluate(operand));
                let value = literal(value.clone().unwrap_or_default());
                self.execute(operator, value, target)
            }
            AddressExpression::BinaryOperator {
                operator,
                target,
                value,
            } => {
                let target: TextFactory<'_> = Box::new(move || self.evaluate(target));
                let value: TextFactory<'_> = Box::new(move || self.evaluate(value));
                self.execute(operator, value, target)
            }
        }
    }

    /// Evaluate and parse the resulting hex text.
    pub fn evaluate_address(&self, expression: &AddressExpression) -> Result<u64> {
        parse_target(&self.evaluate(expression)?)
    }

    fn execute(&self, identifier: &str, value: TextFactory<'_>, target: TextFactory<'_>) -> Result<String> {
        let operator = self.registry.create(identifier, value, target)?;
        let address = operator.execute(self.memory)?;
        debug!("Operator '{}' produced 0x{:X}", identifier, address);
        Ok(format_address(address))
    }
}
