use super::model::{Block, Group, PackedSlot};
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, warn};

/// Successful packing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome<S> {
    /// Every slot received a group.
    Complete {
        packed: Vec<PackedSlot<S>>,
        estimated_groups: usize,
    },
    /// All blocks were placed but some slots were left over. Advisory only.
    ExcessiveSlots {
        packed: Vec<PackedSlot<S>>,
        unused: Vec<S>,
        estimated_groups: usize,
    },
}

impl<S> PackOutcome<S> {
    /// Slots that received text, in slot order.
    #[must_use]
    pub fn packed(&self) -> &[PackedSlot<S>] {
        match self {
            Self::Complete { packed, .. } | Self::ExcessiveSlots { packed, .. } => packed,
        }
    }

    /// Slots that received nothing, in slot order.
    #[must_use]
    pub fn unused_slots(&self) -> &[S] {
        match self {
            Self::Complete { .. } => &[],
            Self::ExcessiveSlots { unused, .. } => unused,
        }
    }

    /// `ceil(total_lines / max_lines)` computed before grouping.
    #[must_use]
    pub const fn estimated_groups(&self) -> usize {
        match self {
            Self::Complete {
                estimated_groups, ..
            }
            | Self::ExcessiveSlots {
                estimated_groups, ..
            } => *estimated_groups,
        }
    }
}

/// Packing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError<S: Debug> {
    #[error("max_lines must be greater than zero")]
    InvalidMaxLines,

    /// The slot list ran out while blocks were still unplaced. Callers must
    /// not persist `partial`.
    #[error(
        "all {available} slot(s) used with {unplaced_blocks} block(s) still unplaced"
    )]
    InsufficientSlots {
        partial: Vec<PackedSlot<S>>,
        available: usize,
        unplaced_blocks: usize,
    },
}

/// Number of groups implied by the total line count alone.
///
/// Greedy grouping can need more groups than this when block boundaries
/// leave slack, and fewer when a single block exceeds `max_lines`.
#[must_use]
pub fn estimate_groups(blocks: &[Block], max_lines: usize) -> usize {
    if max_lines == 0 {
        return 0;
    }
    let total_lines: usize = blocks.iter().map(Block::line_count).sum();
    total_lines.div_ceil(max_lines)
}

/// Pack `blocks`, in order, into `slots` with at most `max_lines` lines per
/// slot.
///
/// A block is never split: a block larger than `max_lines` gets a slot of
/// its own. The earliest group goes to the earliest slot.
pub fn pack<S>(
    blocks: &[Block],
    slots: &[S],
    max_lines: usize,
) -> Result<PackOutcome<S>, PackError<S>>
where
    S: Clone + Debug,
{
    if max_lines == 0 {
        return Err(PackError::InvalidMaxLines);
    }
    if blocks.is_empty() {
        return Ok(PackOutcome::Complete {
            packed: Vec::new(),
            estimated_groups: 0,
        });
    }

    let estimated_groups = estimate_groups(blocks, max_lines);
    if estimated_groups > slots.len() {
        warn!(
            estimated_groups,
            slots = slots.len(),
            max_lines,
            "Estimated group count exceeds available slots"
        );
    } else {
        debug!(estimated_groups, slots = slots.len(), max_lines, "Packing blocks");
    }

    let mut packed: Vec<PackedSlot<S>> = Vec::with_capacity(slots.len());
    let mut placed_blocks = 0usize;
    let mut free_slots = slots.iter();
    let mut group = Group::new(max_lines);

    for block in blocks {
        if !group.is_empty() && group.would_overflow(block) {
            let Some(slot) = free_slots.next() else {
                return Err(insufficient(packed, slots.len(), blocks.len() - placed_blocks));
            };
            placed_blocks += group.block_count();
            packed.push(group.close_into(slot.clone()));
        }
        group.push(block);
    }

    if !group.is_empty() {
        let Some(slot) = free_slots.next() else {
            return Err(insufficient(packed, slots.len(), blocks.len() - placed_blocks));
        };
        packed.push(group.close_into(slot.clone()));
    }

    let unused: Vec<S> = free_slots.cloned().collect();
    if unused.is_empty() {
        Ok(PackOutcome::Complete {
            packed,
            estimated_groups,
        })
    } else {
        warn!(
            used = packed.len(),
            unused = unused.len(),
            "More slots than needed; unused slots will be left empty"
        );
        Ok(PackOutcome::ExcessiveSlots {
            packed,
            unused,
            estimated_groups,
        })
    }
}

fn insufficient<S: Debug>(
    partial: Vec<PackedSlot<S>>,
    available: usize,
    unplaced_blocks: usize,
) -> PackError<S> {
    warn!(available, unplaced_blocks, "Ran out of slots while packing");
    PackError::InsufficientSlots {
        partial,
        available,
        unplaced_blocks,
    }
}
