use serde::{Deserialize, Serialize};

use super::{MemoryRange, ReadMemory};

/// Load information about the target's main module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Load address of the module image
    pub base_address: u64,
    /// Size of the mapped image in bytes
    pub size: usize,
    /// Reported file version, used to gate cached offsets
    pub version: String,
}

impl ModuleInfo {
    pub fn new(base_address: u64, size: usize, version: impl Into<String>) -> Self {
        Self {
            base_address,
            size,
            version: version.into(),
        }
    }

    pub fn range(&self) -> MemoryRange {
        MemoryRange::with_len(self.base_address, self.size)
    }

    /// Signed distance of `address` from the module base.
    pub fn offset_of(&self, address: u64) -> i64 {
        address.wrapping_sub(self.base_address) as i64
    }

    /// Absolute address of a module-relative offset.
    pub fn address_at(&self, offset: i64) -> u64 {
        self.base_address.wrapping_add_signed(offset)
    }
}

/// Everything the search engine and resolver need to know about a target.
pub trait ProcessContext: Send + Sync {
    /// Whether the caller runs inside the target's address space.
    fn is_in_process(&self) -> bool;

    fn main_module(&self) -> &ModuleInfo;

    fn memory(&self) -> &dyn ReadMemory;
}

/// A process context assembled from a module description and a reader.
#[derive(Debug, Clone)]
pub struct Target<R> {
    module: ModuleInfo,
    memory: R,
    in_process: bool,
}

impl<R: ReadMemory> Target<R> {
    /// A target in another process; searches copy the range out first.
    pub fn remote(module: ModuleInfo, memory: R) -> Self {
        Self {
            module,
            memory,
            in_process: false,
        }
    }

    /// A target in the caller's own address space.
    pub fn local(module: ModuleInfo, memory: R) -> Self {
        Self {
            module,
            memory,
            in_process: true,
        }
    }

    pub fn reader(&self) -> &R {
        &self.memory
    }

    pub fn set_module(&mut self, module: ModuleInfo) {
        self.module = module;
    }
}

impl<R: ReadMemory> ProcessContext for Target<R> {
    fn is_in_process(&self) -> bool {
        self.in_process
    }

    fn main_module(&self) -> &ModuleInfo {
        &self.module
    }

    fn memory(&self) -> &dyn ReadMemory {
        &self.memory
    }
}
