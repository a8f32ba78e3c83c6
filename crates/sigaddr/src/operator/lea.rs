use strum::{Display, EnumString};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

use super::{LazyValue, Operator, TextFactory, parse_target};

/// Width of the value a [`LeaOperator`] loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum LeaWidth {
    Byte,
    Word,
    #[default]
    Dword,
    /// The target's native pointer width
    Pointer,
}

impl LeaWidth {
    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        text.parse()
            .map_err(|_| Error::MalformedOperand(format!("unknown load width '{}'", text)))
    }
}

/// Loads a value from the target and uses it as the new address.
///
/// Depends on live memory, so results are never cached across builds.
#[derive(Debug)]
pub struct LeaOperator<'a> {
    target: LazyValue<'a, u64>,
    width: LazyValue<'a, LeaWidth>,
}

impl LeaOperator<'_> {
    pub fn new(target: u64, width: LeaWidth) -> Self {
        Self {
            target: LazyValue::ready(target),
            width: LazyValue::ready(width),
        }
    }
}

impl<'a> LeaOperator<'a> {
    pub fn from_factories(value: TextFactory<'a>, target: TextFactory<'a>) -> Self {
        Self {
            target: LazyValue::from_text(target, parse_target),
            width: LazyValue::from_text(value, LeaWidth::parse),
        }
    }

    pub fn width(&self) -> Result<LeaWidth> {
        self.width.get().copied()
    }
}

impl Default for LeaOperator<'_> {
    fn default() -> Self {
        Self::new(0, LeaWidth::default())
    }
}

impl Operator for LeaOperator<'_> {
    fn target(&self) -> Result<u64> {
        self.target.get().copied()
    }

    fn execute(&self, memory: Option<&dyn ReadMemory>) -> Result<u64> {
        let memory = memory.ok_or(Error::MissingMemory)?;
        let target = self.target()?;

        match self.width()? {
            LeaWidth::Byte => memory.read_u8(target).map(u64::from),
            LeaWidth::Word => memory.read_u16(target).map(u64::from),
            LeaWidth::Dword => memory.read_u32(target).map(u64::from),
            LeaWidth::Pointer => memory.read_pointer(target),
        }
    }

    fn is_cacheable(&self) -> bool {
        false
    }
}
