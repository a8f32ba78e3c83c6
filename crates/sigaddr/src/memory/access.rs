use tracing::debug;

use crate::error::{Error, Result};

use super::{MemoryRange, ProcessContext, ReadMemory};

/// How a search reaches the bytes of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    /// Scan the caller's own memory in place.
    Local,
    /// Copy the whole range out of the target with a single read, then scan the copy.
    Remote,
}

impl MemoryAccess {
    pub fn for_target(target: &dyn ProcessContext) -> Self {
        if target.is_in_process() {
            Self::Local
        } else {
            Self::Remote
        }
    }

    /// Run `scan` over the bytes of `range`.
    ///
    /// Offsets into the slice handed to `scan` correspond to `range.begin + offset`.
    pub fn with_bytes<T>(
        self,
        memory: &dyn ReadMemory,
        range: MemoryRange,
        scan: impl FnOnce(&[u8]) -> T,
    ) -> Result<T> {
        if range.is_empty() {
            return Ok(scan(&[]));
        }

        match self {
            Self::Local => {
                let view = memory.local_view(range.begin, range.len()).ok_or_else(|| {
                    Error::read_failed(range.begin, format!("{} is not addressable in-process", range))
                })?;
                Ok(scan(view))
            }
            Self::Remote => {
                debug!("Reading {} bytes from {} for scanning", range.len(), range);
                let buffer = memory.read_bytes(range.begin, range.len())?;
                if buffer.len() != range.len() {
                    return Err(Error::read_failed(
                        range.begin,
                        format!("short read: wanted {} bytes, got {}", range.len(), buffer.len()),
                    ));
                }
                Ok(scan(&buffer))
            }
        }
    }
}
