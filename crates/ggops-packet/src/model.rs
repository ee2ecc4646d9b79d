use crate::LineBudget;

/// An immutable rendered text value with its line count.
///
/// Line counting follows [`str::lines`]: `"a\nb\n"` and `"a\nb"` both count
/// two lines and `""` counts zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    text: String,
    line_count: usize,
}

impl Block {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_count = text.lines().count();
        Self { text, line_count }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_count
    }
}

impl From<String> for Block {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Block {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// The text assigned to one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSlot<S> {
    /// Destination identifier, as supplied by the caller
    pub slot: S,
    /// Blocks of the group joined in order
    pub text: String,
    /// Sum of the line counts of the group's blocks
    pub line_count: usize,
    /// Number of blocks in the group
    pub block_count: usize,
}

impl<S> PackedSlot<S> {
    /// BLAKE3 hash of the slot text, hex encoded.
    #[must_use]
    pub fn blake3_hash(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }
}

/// Accumulator for the blocks of the slot being filled.
#[derive(Debug)]
pub(crate) struct Group {
    text: String,
    block_count: usize,
    budget: LineBudget,
}

impl Group {
    pub(crate) const fn new(max_lines: usize) -> Self {
        Self {
            text: String::new(),
            block_count: 0,
            budget: LineBudget::new(max_lines),
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    pub(crate) const fn block_count(&self) -> usize {
        self.block_count
    }

    pub(crate) const fn would_overflow(&self, block: &Block) -> bool {
        self.budget.would_exceed(block.line_count())
    }

    /// Append a block, separating it from the previous text with a newline
    /// unless that text already ends with one.
    pub(crate) fn push(&mut self, block: &Block) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(block.text());
        self.block_count += 1;
        self.budget.add_lines(block.line_count());
    }

    /// Finalise the group into `slot` and reset the accumulator.
    pub(crate) fn close_into<S>(&mut self, slot: S) -> PackedSlot<S> {
        debug_assert!(
            self.block_count <= 1 || !self.budget.is_exceeded(),
            "multi-block group over its line budget"
        );
        let closed = PackedSlot {
            slot,
            text: std::mem::take(&mut self.text),
            line_count: self.budget.lines_used,
            block_count: self.block_count,
        };
        self.block_count = 0;
        self.budget = LineBudget::new(self.budget.max_lines);
        closed
    }
}
