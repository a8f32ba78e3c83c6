use super::{MatchAlgorithm, window_matches};

/// Check every window start, comparing significant bytes left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl MatchAlgorithm for Naive {
    fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize> {
        if pattern.is_empty() || haystack.len() < pattern.len() {
            return None;
        }

        haystack
            .windows(pattern.len())
            .position(|window| window_matches(pattern, mask, window))
    }
}
