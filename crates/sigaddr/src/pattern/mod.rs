//! Masked byte signatures and the engine that searches target memory for them.

pub mod algorithm;
mod engine;
mod signature;

pub use algorithm::{Algorithm, MatchAlgorithm};
pub use engine::PatternSearchEngine;
pub use signature::{Pattern, PatternFormat};
