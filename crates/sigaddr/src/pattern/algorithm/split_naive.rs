use super::MatchAlgorithm;

/// A maximal run of consecutive significant pattern positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralRun {
    pub start: usize,
    pub len: usize,
}

impl LiteralRun {
    /// Split a mask into its literal runs, in pattern order.
    pub fn split(mask: &[bool]) -> Vec<LiteralRun> {
        let mut runs = Vec::new();
        let mut i = 0;

        while i < mask.len() {
            if !mask[i] {
                i += 1;
                continue;
            }

            let len = mask[i..].iter().take_while(|&&significant| significant).count();
            runs.push(LiteralRun { start: i, len });
            // the byte after a run is a wildcard (or the end)
            i += len + 1;
        }

        runs
    }
}

/// Naive scan that compares whole literal runs and never touches wildcard gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitNaive;

impl MatchAlgorithm for SplitNaive {
    fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize> {
        if pattern.is_empty() || haystack.len() < pattern.len() {
            return None;
        }

        let runs = LiteralRun::split(mask);
        let last_start = haystack.len() - pattern.len();

        (0..=last_start).find(|&begin| {
            runs.iter().all(|run| {
                let at = begin + run.start;
                haystack[at..at + run.len] == pattern[run.start..run.start + run.len]
            })
        })
    }
}
