//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from sigaddr.
//!
//! # Usage
//!
//! ```ignore
//! use sigaddr::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Resolution: `OffsetResolver`, `ResolverConfig`
//! - Documents: `OffsetDocument`, `DocumentStore` and its stores
//! - Search: `Pattern`, `PatternSearchEngine`, `Algorithm`
//! - Target access: `ProcessContext`, `ReadMemory`, `ModuleInfo`
//! - Error handling: `Error`, `Result`

// Resolution service
pub use crate::resolver::{OffsetResolver, ResolverConfig, ResolverConfigBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Documents and persistence
pub use crate::document::{
    DocumentStore, FileDocumentStore, MemoryDocumentStore, OffsetDefinition, OffsetDocument,
    PatternDefinition,
};

// Caches
pub use crate::cache::{CachedElement, ProcessAddressCache};

// Pattern search
pub use crate::pattern::{Algorithm, MatchAlgorithm, Pattern, PatternFormat, PatternSearchEngine};

// Target process access
pub use crate::memory::{LocalMemory, MemoryRange, ModuleInfo, ProcessContext, ReadMemory, Target};

// Expressions and operators
pub use crate::expression::AddressExpression;
pub use crate::operator::{Operator, OperatorRegistry};
