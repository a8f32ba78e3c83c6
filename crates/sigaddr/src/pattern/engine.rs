use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::{MemoryAccess, MemoryRange, ProcessContext};

use super::Pattern;
use super::algorithm::{Algorithm, MatchAlgorithm};

/// Searches a target's memory for one masked pattern.
#[derive(Clone)]
pub struct PatternSearchEngine {
    pattern: Pattern,
    algorithm: Arc<dyn MatchAlgorithm>,
}

impl std::fmt::Debug for PatternSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternSearchEngine")
            .field("pattern", &self.pattern.to_string())
            .finish_non_exhaustive()
    }
}

impl PatternSearchEngine {
    /// Engine using the default Boyer-Moore-Horspool strategy
    pub fn new(pattern: Pattern) -> Self {
        Self::with_strategy(pattern, Algorithm::default())
    }

    pub fn with_strategy(pattern: Pattern, algorithm: Algorithm) -> Self {
        Self {
            pattern,
            algorithm: Arc::new(StaticAlgorithm(algorithm.instance())),
        }
    }

    pub fn with_algorithm(pattern: Pattern, algorithm: Arc<dyn MatchAlgorithm>) -> Self {
        Self { pattern, algorithm }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Find exactly one match, failing with [`Error::NoMatch`] if there is none.
    pub fn find_first(&self, range: MemoryRange, target: &dyn ProcessContext) -> Result<u64> {
        self.find_many(range, target, 1)?
            .first()
            .copied()
            .ok_or(Error::NoMatch)
    }

    /// Find up to `max_count` matches in ascending address order.
    ///
    /// Each search resumes one byte past the previous match start, so
    /// overlapping occurrences are reported. Zero matches is not an error.
    pub fn find_many(
        &self,
        range: MemoryRange,
        target: &dyn ProcessContext,
        max_count: usize,
    ) -> Result<Vec<u64>> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let access = MemoryAccess::for_target(target);
        debug!(
            "Searching {} for '{}' ({:?}, cap {})",
            range, self.pattern, access, max_count
        );

        let offsets = access.with_bytes(target.memory(), range, |bytes| {
            self.scan(bytes, max_count)
        })?;

        let addresses: Vec<u64> = offsets
            .into_iter()
            .map(|offset| range.begin + offset as u64)
            .collect();
        debug!("Found {} match(es) for '{}'", addresses.len(), self.pattern);
        Ok(addresses)
    }

    /// [`Self::find_first`] over the target's main module
    pub fn find_first_in_module(&self, target: &dyn ProcessContext) -> Result<u64> {
        self.find_first(target.main_module().range(), target)
    }

    /// [`Self::find_many`] over the target's main module
    pub fn find_many_in_module(
        &self,
        target: &dyn ProcessContext,
        max_count: usize,
    ) -> Result<Vec<u64>> {
        self.find_many(target.main_module().range(), target, max_count)
    }

    fn scan(&self, bytes: &[u8], max_count: usize) -> Vec<usize> {
        let pattern = self.pattern.bytes();
        let mask = self.pattern.mask();

        let mut found = Vec::new();
        let mut start = 0;
        while found.len() < max_count && start < bytes.len() {
            let Some(offset) = self.algorithm.apply(pattern, mask, &bytes[start..]) else {
                break;
            };
            found.push(start + offset);
            start += offset + 1;
        }
        found
    }
}

/// Adapter so built-in strategies can sit behind the same `Arc` as custom ones.
struct StaticAlgorithm(&'static dyn MatchAlgorithm);

impl MatchAlgorithm for StaticAlgorithm {
    fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize> {
        self.0.apply(pattern, mask, haystack)
    }
}
