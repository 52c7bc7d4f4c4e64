//! Aggregate counters for a remap run.

use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Per-line tallies. Accumulated per file, then summed across the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemapCounts {
    /// Lines retained in the rewritten body (remapped or kept as 0).
    pub lines_kept: usize,
    /// Lines dropped for having != 5 tokens or a non-integer class id.
    pub malformed: usize,
    /// Lines dropped because their class id is neither mapped nor 0.
    pub unexpected: usize,
    /// Lines that already had class id 0.
    pub zero_warnings: usize,
    /// Lines whose class id was rewritten.
    pub remapped: usize,
}

impl AddAssign for RemapCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.lines_kept += rhs.lines_kept;
        self.malformed += rhs.malformed;
        self.unexpected += rhs.unexpected;
        self.zero_warnings += rhs.zero_warnings;
        self.remapped += rhs.remapped;
    }
}

/// The result of [`remap_labels`](super::remap_labels).
#[derive(Clone, Debug, Default, Serialize)]
pub struct RemapReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub files_scanned: usize,
    /// Files rewritten on disk. Always 0 in dry-run mode.
    pub files_changed: usize,
    /// Files containing at least one remapped id, written or not.
    pub files_would_change: usize,
    #[serde(flatten)]
    pub counts: RemapCounts,
}

impl fmt::Display for RemapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed labels in {}", self.root.display())?;
        writeln!(f, "Total valid lines kept: {}", self.counts.lines_kept)?;
        writeln!(f, "Files changed: {}", self.files_changed)?;
        if self.dry_run {
            writeln!(
                f,
                "Files that would change (dry run, pass --apply to write): {}",
                self.files_would_change
            )?;
        }
        writeln!(f, "Malformed lines skipped: {}", self.counts.malformed)?;
        writeln!(
            f,
            "Unexpected class id lines skipped: {}",
            self.counts.unexpected
        )?;
        if self.counts.zero_warnings > 0 {
            writeln!(
                f,
                "Warnings: {} lines already had class id 0",
                self.counts.zero_warnings
            )?;
        }
        Ok(())
    }
}
