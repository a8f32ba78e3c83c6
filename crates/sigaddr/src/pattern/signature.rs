use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Textual layout of a combined pattern string such as `"48 8D 0D ? ? ? ?"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternFormat {
    /// Token separator
    pub separator: String,
    /// Any token containing this text is a wildcard
    pub wildcard: String,
    /// Numeric base of byte tokens
    pub radix: u32,
}

impl Default for PatternFormat {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            wildcard: "?".to_string(),
            radix: 16,
        }
    }
}

impl PatternFormat {
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::InvalidPattern("separator must not be empty".to_string()));
        }
        if !self.wildcard.chars().any(|c| !c.is_ascii_digit()) {
            return Err(Error::InvalidPattern(format!(
                "wildcard '{}' must contain at least one non-digit character",
                self.wildcard
            )));
        }
        if !(2..=36).contains(&self.radix) {
            return Err(Error::InvalidPattern(format!(
                "radix {} is outside 2..=36",
                self.radix
            )));
        }
        Ok(())
    }

    fn format_byte(&self, value: u8) -> String {
        if self.radix == 16 {
            return format!("{:02X}", value);
        }

        let mut digits = Vec::new();
        let mut rest = u32::from(value);
        loop {
            let digit = char::from_digit(rest % self.radix, self.radix).unwrap_or('?');
            digits.push(digit.to_ascii_uppercase());
            rest /= self.radix;
            if rest == 0 {
                break;
            }
        }
        digits.iter().rev().collect()
    }
}

/// A byte signature with a per-byte significance mask.
///
/// `mask[i] == false` marks a wildcard: the byte at that position matches
/// anything and its stored value is only a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl Pattern {
    /// Build a pattern, trimming leading and trailing wildcards.
    ///
    /// Without a mask every byte is significant.
    pub fn new(bytes: Vec<u8>, mask: Option<Vec<bool>>) -> Result<Self> {
        Self::with_trim(bytes, mask, true)
    }

    /// Build a pattern, optionally keeping leading and trailing wildcards.
    pub fn with_trim(bytes: Vec<u8>, mask: Option<Vec<bool>>, trim_wildcards: bool) -> Result<Self> {
        let Some(mask) = mask else {
            let mask = vec![true; bytes.len()];
            return Ok(Self { bytes, mask });
        };

        if mask.len() != bytes.len() {
            return Err(Error::InvalidPattern(format!(
                "mask length {} differs from pattern length {}",
                mask.len(),
                bytes.len()
            )));
        }

        if !trim_wildcards || mask.is_empty() {
            return Ok(Self { bytes, mask });
        }

        let first = mask.iter().position(|&significant| significant);
        let last = mask.iter().rposition(|&significant| significant);
        match (first, last) {
            (Some(first), Some(last)) => Ok(Self {
                bytes: bytes[first..=last].to_vec(),
                mask: mask[first..=last].to_vec(),
            }),
            _ => Err(Error::InvalidPattern(
                "mask has no significant byte to trim around".to_string(),
            )),
        }
    }

    /// Pattern where every byte must match.
    pub fn exact(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            mask: vec![true; bytes.len()],
        }
    }

    /// Parse a combined pattern string using the default format.
    pub fn from_combined_str(text: &str) -> Result<Self> {
        Self::parse_with(text, &PatternFormat::default())
    }

    /// Parse a combined pattern string.
    pub fn parse_with(text: &str, format: &PatternFormat) -> Result<Self> {
        format.validate()?;

        let mut bytes = Vec::new();
        let mut mask = Vec::new();
        for token in text.split(format.separator.as_str()).filter(|t| !t.is_empty()) {
            if token.contains(format.wildcard.as_str()) {
                bytes.push(0);
                mask.push(false);
                continue;
            }

            let value = u8::from_str_radix(token.trim(), format.radix).map_err(|e| {
                Error::InvalidPattern(format!("Invalid pattern token '{}': {}", token, e))
            })?;
            bytes.push(value);
            mask.push(true);
        }

        Self::new(bytes, Some(mask))
    }

    /// Format the pattern as a combined string using the default format.
    pub fn to_combined_string(&self) -> String {
        self.format_with(&PatternFormat::default())
    }

    pub fn format_with(&self, format: &PatternFormat) -> String {
        self.bytes
            .iter()
            .zip(&self.mask)
            .map(|(&b, &significant)| {
                if significant {
                    format.format_byte(b)
                } else {
                    format.wildcard.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(&format.separator)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn wildcard_count(&self) -> usize {
        self.mask.iter().filter(|&&significant| !significant).count()
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_combined_str(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_combined_string())
    }
}
