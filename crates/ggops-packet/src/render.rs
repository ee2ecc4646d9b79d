use super::builder::PackOutcome;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use ggops_utils::atomic_write::write_file_atomic;
use tracing::info;

/// Files touched by [`write_outcome`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Slots written with packed text, in slot order
    pub written: Vec<Utf8PathBuf>,
    /// Unused slots truncated to empty content
    pub truncated: Vec<Utf8PathBuf>,
}

/// Persist a packing result whose slots are file paths.
///
/// `slots` is the full slot list given to [`pack`](crate::pack). Each packed
/// slot is written atomically. Every other slot is truncated, including when
/// there were no blocks at all, so a chunk left over from an earlier run
/// cannot be deployed again.
pub fn write_outcome(
    outcome: &PackOutcome<Utf8PathBuf>,
    slots: &[Utf8PathBuf],
) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for slot in outcome.packed() {
        let hash = slot.blake3_hash();
        let short_hash = &hash[..16];
        write_file_atomic(&slot.slot, &slot.text)
            .with_context(|| format!("Failed to write packed file: {}", slot.slot))?;
        info!(
            slot = %slot.slot,
            lines = slot.line_count,
            blocks = slot.block_count,
            blake3 = %short_hash,
            "Wrote packed file"
        );
        summary.written.push(slot.slot.clone());
    }

    let unfilled: Vec<&Utf8PathBuf> = slots
        .iter()
        .filter(|slot| !summary.written.contains(*slot))
        .collect();
    for unused in unfilled {
        write_file_atomic(unused, "")
            .with_context(|| format!("Failed to truncate unused file: {unused}"))?;
        info!(slot = %unused, "Truncated unused file");
        summary.truncated.push(unused.clone());
    }

    Ok(summary)
}
