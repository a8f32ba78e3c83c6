use crate::error::{Error, Result};

use super::{MemoryRange, ReadMemory};

/// Memory of the calling process, exposed through a borrowed byte slice.
///
/// Addresses are the slice's real addresses, so a match found here can be
/// handed to any code that expects an in-process pointer value.
#[derive(Debug, Clone, Copy)]
pub struct LocalMemory<'a> {
    bytes: &'a [u8],
}

impl<'a> LocalMemory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn base_address(&self) -> u64 {
        self.bytes.as_ptr() as u64
    }

    pub fn range(&self) -> MemoryRange {
        MemoryRange::with_len(self.base_address(), self.bytes.len())
    }

    fn slice(&self, address: u64, size: usize) -> Option<&'a [u8]> {
        let start = address.checked_sub(self.base_address())? as usize;
        let end = start.checked_add(size)?;
        self.bytes.get(start..end)
    }
}

impl ReadMemory for LocalMemory<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.slice(address, size)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::read_failed(address, format!("{} bytes outside {}", size, self.range())))
    }

    fn local_view(&self, address: u64, size: usize) -> Option<&[u8]> {
        self.slice(address, size)
    }

    fn pointer_width(&self) -> usize {
        std::mem::size_of::<usize>()
    }
}
