//! Content packing for generated parameter files.
//!
//! Rendered text blocks (one per replicated table) are grouped greedily, in
//! order, under a per-file line budget and assigned to a fixed list of
//! destination slots. Packing itself is pure; [`write_outcome`] persists a
//! packing result to disk.

mod builder;
mod model;
mod render;

/// Line budget of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBudget {
    /// Lines already placed in the slot.
    pub lines_used: usize,
    /// Maximum lines allowed in the slot.
    pub max_lines: usize,
}

impl LineBudget {
    /// Create a new budget tracker.
    #[must_use]
    pub const fn new(max_lines: usize) -> Self {
        Self {
            lines_used: 0,
            max_lines,
        }
    }

    /// Check if adding content would exceed budget.
    #[must_use]
    pub const fn would_exceed(&self, lines: usize) -> bool {
        self.lines_used + lines > self.max_lines
    }

    /// Add content to budget tracking.
    pub const fn add_lines(&mut self, lines: usize) {
        self.lines_used += lines;
    }

    /// Check if budget is exceeded.
    #[must_use]
    pub const fn is_exceeded(&self) -> bool {
        self.lines_used > self.max_lines
    }
}

pub use builder::{PackError, PackOutcome, estimate_groups, pack};
pub use model::{Block, PackedSlot};
pub use render::{WriteSummary, write_outcome};

#[cfg(test)]
mod tests {
    use super::LineBudget;

    #[test]
    fn test_budget_tracking() {
        let mut budget = LineBudget::new(50);

        assert!(!budget.is_exceeded());
        assert!(!budget.would_exceed(50));

        budget.add_lines(25);
        assert!(!budget.is_exceeded());
        assert!(budget.would_exceed(26));
        assert!(!budget.would_exceed(25));

        budget.add_lines(30);
        assert!(budget.is_exceeded());
    }
}
