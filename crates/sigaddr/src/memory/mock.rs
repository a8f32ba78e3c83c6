//! In-memory reader for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

use super::{ModuleInfo, ReadMemory, Target};

/// A reader over a contiguous byte buffer placed at `base`.
#[derive(Debug)]
pub struct MockMemoryReader {
    data: Vec<u8>,
    base: u64,
    pointer_width: usize,
    addressable: bool,
    reads: AtomicUsize,
}

impl MockMemoryReader {
    /// Number of `read_bytes` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn offset(&self, address: u64, size: usize) -> Option<usize> {
        let start = address.checked_sub(self.base)? as usize;
        (start.checked_add(size)? <= self.data.len()).then_some(start)
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let start = self.offset(address, size).ok_or_else(|| {
            Error::read_failed(address, format!("read of {} bytes outside mock data", size))
        })?;
        Ok(self.data[start..start + size].to_vec())
    }

    fn local_view(&self, address: u64, size: usize) -> Option<&[u8]> {
        if !self.addressable {
            return None;
        }
        let start = self.offset(address, size)?;
        Some(&self.data[start..start + size])
    }

    fn pointer_width(&self) -> usize {
        self.pointer_width
    }
}

/// Builder for [`MockMemoryReader`]
#[derive(Debug, Clone)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
    pointer_width: usize,
    addressable: bool,
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
            pointer_width: 8,
            addressable: false,
        }
    }
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data = bytes.to_vec();
        self
    }

    /// Grow the buffer with zeros up to `size` bytes
    pub fn size(mut self, size: usize) -> Self {
        if self.data.len() < size {
            self.data.resize(size, 0);
        }
        self
    }

    /// Write `bytes` at an absolute address inside the buffer, growing it as needed
    pub fn write_at(mut self, address: u64, bytes: &[u8]) -> Self {
        let start = (address - self.base) as usize;
        if self.data.len() < start + bytes.len() {
            self.data.resize(start + bytes.len(), 0);
        }
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn pointer_width(mut self, width: usize) -> Self {
        self.pointer_width = width;
        self
    }

    /// Let the reader hand out borrowed views, like in-process memory
    pub fn addressable(mut self) -> Self {
        self.addressable = true;
        self
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            data: self.data,
            base: self.base,
            pointer_width: self.pointer_width,
            addressable: self.addressable,
            reads: AtomicUsize::new(0),
        }
    }

    /// Wrap the reader in a remote target whose main module spans the whole buffer
    pub fn remote_target(self, version: &str) -> Target<MockMemoryReader> {
        let reader = self.build();
        let module = ModuleInfo::new(reader.base(), reader.len(), version);
        Target::remote(module, reader)
    }

    /// Same as [`Self::remote_target`] but scanned in place
    pub fn local_target(self, version: &str) -> Target<MockMemoryReader> {
        let reader = self.addressable().build();
        let module = ModuleInfo::new(reader.base(), reader.len(), version);
        Target::local(module, reader)
    }
}
