use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::memory::ModuleInfo;

/// A pattern's last search result, stored relative to the module base.
///
/// Only valid while the target module reports the same build version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedElement {
    /// Module file version the value was captured from
    pub build: String,
    /// Offset from the module base, stored as signed hex text
    #[serde(with = "signed_hex")]
    pub value: i64,
}

impl CachedElement {
    pub fn new(build: impl Into<String>, value: i64) -> Self {
        Self {
            build: build.into(),
            value,
        }
    }

    /// Record `address` as found in `module`.
    pub fn capture(address: u64, module: &ModuleInfo) -> Self {
        Self {
            build: module.version.clone(),
            value: module.offset_of(address),
        }
    }

    pub fn is_same_version(&self, module: &ModuleInfo) -> bool {
        self.build.trim() == module.version
    }

    /// The absolute address, if the entry matches the module's build.
    pub fn address(&self, module: &ModuleInfo) -> Option<u64> {
        if !self.is_same_version(module) {
            debug!(
                "Cached build mismatch: cached={}, current={}",
                self.build, module.version
            );
            return None;
        }
        Some(module.address_at(self.value))
    }
}

mod signed_hex {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        let text = if *value < 0 {
            format!("-{:X}", value.unsigned_abs())
        } else {
            format!("{:X}", value)
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(text.trim()).ok_or_else(|| de::Error::custom(format!("invalid hex offset '{}'", text)))
    }

    fn parse(text: &str) -> Option<i64> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.starts_with('+') {
            return None;
        }
        let magnitude = u64::from_str_radix(digits, 16).ok()?;
        if negative {
            0i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        }
    }
}
