use std::fmt;

/// Half-open address range `[begin, end)` in the target's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    pub begin: u64,
    pub end: u64,
}

impl MemoryRange {
    pub fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    pub fn with_len(begin: u64, len: usize) -> Self {
        Self {
            begin,
            end: begin.saturating_add(len as u64),
        }
    }

    /// Number of bytes covered; an inverted range is empty.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.begin && address < self.end
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:X}, 0x{:X})", self.begin, self.end)
    }
}
