mod access;
mod context;
mod local;
mod range;
mod reader;

#[cfg(test)]
pub mod mock;

pub use access::MemoryAccess;
pub use context::{ModuleInfo, ProcessContext, Target};
pub use local::LocalMemory;
pub use range::MemoryRange;
pub use reader::{MemoryValue, ReadMemory, read_value};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
