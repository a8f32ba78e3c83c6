//! Named address transforms used by offset expressions.
//!
//! An operator takes a target address and an optional configuration value,
//! both of which may come from nested expressions. Operand text is only
//! evaluated when the operator first reads it.

mod add;
mod lazy;
mod lea;
mod registry;

pub use add::AddOperator;
pub use lazy::{LazyValue, TextFactory, literal};
pub use lea::{LeaOperator, LeaWidth};
pub use registry::{OperatorConstructor, OperatorRegistry};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

pub trait Operator {
    /// The address this operator works on, evaluated on first access.
    fn target(&self) -> Result<u64>;

    /// Apply the operator to its target.
    ///
    /// Operators that only do arithmetic accept `None` for `memory`.
    fn execute(&self, memory: Option<&dyn ReadMemory>) -> Result<u64>;

    /// Whether the result stays valid across target builds.
    fn is_cacheable(&self) -> bool;
}

/// Parse an address from hex text; empty text is address zero.
pub fn parse_target(text: &str) -> Result<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::MalformedOperand(format!("invalid target address '{}': {}", text, e)))
}

/// Parse a signed hex offset; empty text is zero.
///
/// Eight-digit values are read as 32-bit two's complement, so `FFFFFFF0` is `-0x10`.
pub fn parse_offset(text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    if digits.starts_with(['+', '-']) {
        return Err(Error::MalformedOperand(format!(
            "invalid offset '{}': unexpected sign",
            text
        )));
    }

    let malformed = |e: std::num::ParseIntError| {
        Error::MalformedOperand(format!("invalid offset '{}': {}", text, e))
    };

    let value = if !negative && digits.len() == 8 {
        i64::from(u32::from_str_radix(digits, 16).map_err(malformed)? as i32)
    } else {
        i64::from_str_radix(digits, 16).map_err(malformed)?
    };

    if !negative {
        return Ok(value);
    }
    value
        .checked_neg()
        .ok_or_else(|| Error::MalformedOperand(format!("offset '{}' is out of range", text)))
}

/// Format an address the way expressions exchange them.
pub fn format_address(address: u64) -> String {
    format!("{:X}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("").unwrap(), 0);
        assert_eq!(parse_target("BEEF").unwrap(), 0xBEEF);
        assert_eq!(parse_target("0x140001000").unwrap(), 0x140001000);
        assert_eq!(parse_target(" ff ").unwrap(), 0xFF);
        assert!(matches!(parse_target("zz"), Err(Error::MalformedOperand(_))));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("").unwrap(), 0);
        assert_eq!(parse_offset("C0").unwrap(), 0xC0);
        assert_eq!(parse_offset("-10").unwrap(), -0x10);
        assert_eq!(parse_offset("FFFFFFF0").unwrap(), -0x10);
        assert_eq!(parse_offset("7FFFFFFF").unwrap(), i64::from(i32::MAX));
        assert_eq!(parse_offset("100000000").unwrap(), 0x1_0000_0000);
        assert!(matches!(parse_offset("invalid value"), Err(Error::MalformedOperand(_))));
    }

    #[test]
    fn test_parse_offset_rejects_extra_signs() {
        assert!(matches!(parse_offset("--5"), Err(Error::MalformedOperand(_))));
        assert!(matches!(parse_offset("+-1"), Err(Error::MalformedOperand(_))));
        assert!(matches!(parse_offset("-+1"), Err(Error::MalformedOperand(_))));
        assert!(matches!(parse_offset("-0x-1"), Err(Error::MalformedOperand(_))));
        assert!(matches!(
            parse_offset("--8000000000000000"),
            Err(Error::MalformedOperand(_))
        ));
    }

    #[test]
    fn test_parse_offset_negation_bounds() {
        assert_eq!(parse_offset("-7FFFFFFFFFFFFFFF").unwrap(), -i64::MAX);
        assert!(matches!(
            parse_offset("-8000000000000000"),
            Err(Error::MalformedOperand(_))
        ));
    }

    #[test]
    fn test_format_address_is_uppercase_hex() {
        assert_eq!(format_address(0xbeef), "BEEF");
        assert_eq!(format_address(0), "0");
        assert_eq!(parse_target(&format_address(0x7FF6_1234_ABCD)).unwrap(), 0x7FF6_1234_ABCD);
    }
}
