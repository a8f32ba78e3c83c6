use crate::error::Result;
use crate::memory::ReadMemory;

use super::{LazyValue, Operator, TextFactory, parse_offset, parse_target};

/// Adds a signed offset to the target. Pure arithmetic, so cacheable.
#[derive(Debug)]
pub struct AddOperator<'a> {
    target: LazyValue<'a, u64>,
    offset: LazyValue<'a, i64>,
}

impl AddOperator<'_> {
    pub fn new(target: u64, offset: i64) -> Self {
        Self {
            target: LazyValue::ready(target),
            offset: LazyValue::ready(offset),
        }
    }
}

impl<'a> AddOperator<'a> {
    /// Both operands are parsed from hex text on first access.
    pub fn from_factories(value: TextFactory<'a>, target: TextFactory<'a>) -> Self {
        Self {
            target: LazyValue::from_text(target, parse_target),
            offset: LazyValue::from_text(value, parse_offset),
        }
    }

    pub fn offset(&self) -> Result<i64> {
        self.offset.get().copied()
    }
}

impl Default for AddOperator<'_> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Operator for AddOperator<'_> {
    fn target(&self) -> Result<u64> {
        self.target.get().copied()
    }

    fn execute(&self, _memory: Option<&dyn ReadMemory>) -> Result<u64> {
        Ok(self.target()?.wrapping_add_signed(self.offset()?))
    }

    fn is_cacheable(&self) -> bool {
        true
    }
}
