//! Persisted pattern and offset definitions.

mod model;
mod store;

pub use model::{OffsetDefinition, OffsetDocument, PatternDefinition};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
