//! Masked byte-pattern matching strategies.
//!
//! Every strategy answers the same question: where does the first window of
//! `haystack` start whose significant bytes equal the pattern? They differ
//! only in how much work they spend per window.

mod horspool;
mod naive;
mod split_naive;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

pub use horspool::{BoyerMooreHorspool, SkipTable};
pub use naive::Naive;
pub use split_naive::{LiteralRun, SplitNaive};

/// A stateless first-match search over a byte slice.
pub trait MatchAlgorithm: Send + Sync {
    /// Offset of the first window in `haystack` matching `pattern` under `mask`.
    ///
    /// `pattern` and `mask` have equal length. Returns `None` for an empty
    /// pattern or a haystack shorter than the pattern.
    fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize>;
}

/// Built-in strategies, selectable from configuration text.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    #[strum(serialize = "naive")]
    Naive,
    #[strum(serialize = "split-naive")]
    SplitNaive,
    #[default]
    #[strum(to_string = "bmh", serialize = "boyer-moore-horspool")]
    BoyerMooreHorspool,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Self::Naive, Self::SplitNaive, Self::BoyerMooreHorspool];

    pub fn instance(self) -> &'static dyn MatchAlgorithm {
        match self {
            Self::Naive => &Naive,
            Self::SplitNaive => &SplitNaive,
            Self::BoyerMooreHorspool => &BoyerMooreHorspool,
        }
    }
}

/// Compare one window against the pattern, skipping wildcard positions.
#[inline]
pub(crate) fn window_matches(pattern: &[u8], mask: &[bool], window: &[u8]) -> bool {
    pattern
        .iter()
        .zip(mask)
        .zip(window)
        .all(|((&p, &significant), &b)| !significant || p == b)
}
