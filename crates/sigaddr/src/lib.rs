//! # sigaddr
//!
//! Locates addresses in a running process by byte-pattern search and keeps
//! the results cached across runs.
//!
//! This crate provides:
//! - Masked byte patterns and interchangeable search algorithms
//! - Address expressions built from constants, pattern leaves and operators
//! - A JSON offset document with build-gated cached addresses
//! - A resolver service that ties search, evaluation and persistence together
//!
//! Offsets are resolved through two caches. The document caches each pattern
//! address per module build, and the resolver caches final offset addresses
//! for the life of the process.

pub mod cache;
pub mod document;
pub mod error;
pub mod expression;
pub mod memory;
pub mod operator;
pub mod pattern;
pub mod prelude;
pub mod resolver;

pub use cache::{CachedElement, ProcessAddressCache};
pub use document::{
    DocumentStore, FileDocumentStore, MemoryDocumentStore, OffsetDefinition, OffsetDocument,
    PatternDefinition,
};
pub use error::{Error, Result};
pub use expression::{AddressExpression, Evaluator, PatternResolver};
pub use memory::{
    LocalMemory, MemoryAccess, MemoryRange, ModuleInfo, ProcessContext, ReadMemory, Target,
};
pub use operator::{Operator, OperatorConstructor, OperatorRegistry};
pub use pattern::{Algorithm, MatchAlgorithm, Pattern, PatternFormat, PatternSearchEngine};
pub use resolver::{OffsetResolver, ResolverConfig, ResolverConfigBuilder};
