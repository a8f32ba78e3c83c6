use super::MatchAlgorithm;

/// Bad-character shift table for [`BoyerMooreHorspool`].
#[derive(Clone)]
pub struct SkipTable([usize; 256]);

impl SkipTable {
    /// Build the shift table for a masked pattern.
    ///
    /// The default shift is the distance from the last byte back to the
    /// nearest wildcard before it (a wildcard matches any byte, so no shift
    /// may jump past it), or the full length when there is none. Every
    /// position before the last then tightens the shift of its byte value.
    /// Wildcard placeholders take part in the tightening too, which only
    /// ever makes shifts smaller.
    pub fn build(pattern: &[u8], mask: &[bool]) -> Self {
        let len = pattern.len();
        let Some(last) = len.checked_sub(1) else {
            return Self([1; 256]);
        };

        let default = mask[..last]
            .iter()
            .rposition(|&significant| !significant)
            .map_or(len, |wildcard| last - wildcard);

        let mut table = [default; 256];
        for (i, &byte) in pattern[..last].iter().enumerate() {
            let shift = last - i;
            let slot = &mut table[byte as usize];
            if shift < *slot {
                *slot = shift;
            }
        }

        Self(table)
    }

    #[inline]
    pub fn shift(&self, byte: u8) -> usize {
        self.0[byte as usize]
    }
}

impl std::fmt::Debug for SkipTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // only list the entries that differ from the most common shift
        let default = self.0[..].iter().copied().max().unwrap_or(1);
        let mut map = f.debug_map();
        for (byte, &shift) in self.0.iter().enumerate() {
            if shift != default {
                map.entry(&format_args!("{:#04x}", byte), &shift);
            }
        }
        map.finish()
    }
}

/// Boyer-Moore-Horspool search adapted to wildcard masks.
///
/// Windows are compared right to left. On a mismatch the window advances
/// by the skip of the haystack byte under the pattern's last position.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoyerMooreHorspool;

impl MatchAlgorithm for BoyerMooreHorspool {
    fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize> {
        let len = pattern.len();
        if len == 0 || haystack.len() < len {
            return None;
        }

        let last = len - 1;
        let table = SkipTable::build(pattern, mask);

        let mut begin = 0;
        while begin + len <= haystack.len() {
            let window = &haystack[begin..begin + len];
            let matched = (0..=last)
                .rev()
                .all(|i| !mask[i] || window[i] == pattern[i]);
            if matched {
                return Some(begin);
            }
            begin += table.shift(window[last]);
        }

        None
    }
}
