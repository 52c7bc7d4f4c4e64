//! Class id remapping for existing label files.
//!
//! Every non-blank line of every `*.txt` file directly inside the root is run
//! through the same steps:
//!
//! 1. lines without exactly five tokens are malformed and dropped;
//! 2. lines whose first token is not an integer are malformed and dropped;
//! 3. mapped ids are rewritten, id `0` is kept with a warning, any other id
//!    is dropped and counted as unexpected.
//!
//! A file is rewritten only when at least one id changed and the run is not
//! a dry run. Malformed lines never abort the run.

mod report;

pub use report::{RemapCounts, RemapReport};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::num::IntErrorKind;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};

use crate::error::LabelprepError;
use crate::label::files::list_files_with_extensions;
use crate::label::LABEL_EXTENSION;

/// A class id translation table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMapping {
    table: BTreeMap<i64, i64>,
}

impl ClassMapping {
    pub fn new(table: BTreeMap<i64, i64>) -> Self {
        Self { table }
    }

    #[inline]
    pub fn get(&self, class_id: i64) -> Option<i64> {
        self.table.get(&class_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.table.iter().map(|(k, v)| (*k, *v))
    }
}

/// `{1→0, 2→1, 3→2, 4→3}`: shifts one-based ids down to zero-based.
impl Default for ClassMapping {
    fn default() -> Self {
        Self::new(BTreeMap::from([(1, 0), (2, 1), (3, 2), (4, 3)]))
    }
}

impl fmt::Display for ClassMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{k}:{v}")).collect();
        write!(f, "{}", pairs.join(","))
    }
}

/// Parses `"1:0,2:1"` style mappings.
impl FromStr for ClassMapping {
    type Err = LabelprepError;

    fn from_str(pairs: &str) -> Result<Self, Self::Err> {
        let mut table = BTreeMap::new();

        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (from, to) = pair
                .split_once(':')
                .ok_or_else(|| LabelprepError::InvalidMapping {
                    message: format!("'{pair}' is not of the form FROM:TO"),
                })?;

            let parse = |raw: &str| {
                raw.trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| LabelprepError::InvalidMapping {
                        message: format!("'{raw}' in '{pair}' is not a non-negative integer"),
                    })
            };
            let (from, to) = (parse(from)?, parse(to)?);

            if table.insert(from, to).is_some() {
                return Err(LabelprepError::InvalidMapping {
                    message: format!("class id {from} is mapped more than once"),
                });
            }
        }

        if table.is_empty() {
            return Err(LabelprepError::InvalidMapping {
                message: "mapping is empty".to_string(),
            });
        }

        Ok(Self { table })
    }
}

/// Remapper options.
#[derive(Clone, Debug)]
pub struct RemapOptions {
    /// Scan and count without writing. On by default.
    pub dry_run: bool,
    pub mapping: ClassMapping,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            mapping: ClassMapping::default(),
        }
    }
}

/// What happened to a single label line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Malformed,
    /// Dropped. Ids outside the i64 range are reported saturated.
    Unexpected(i64),
    /// Kept unchanged with class id 0.
    AlreadyZero,
    Remapped { from: i64, to: i64 },
    /// Mapped onto itself; kept unchanged.
    Unchanged(i64),
}

/// Runs one line through the remap steps. Returns the outcome and, when the
/// line is retained, its rewritten text.
pub fn remap_line(line: &str, mapping: &ClassMapping) -> (LineOutcome, Option<String>) {
    if line.trim().is_empty() {
        return (LineOutcome::Blank, None);
    }

    let mut parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return (LineOutcome::Malformed, None);
    }

    let class_id = match parts[0].parse::<i64>() {
        Ok(class_id) => class_id,
        // Integer ids too large for i64 can never be in the table.
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => return (LineOutcome::Unexpected(i64::MAX), None),
            IntErrorKind::NegOverflow => return (LineOutcome::Unexpected(i64::MIN), None),
            _ => return (LineOutcome::Malformed, None),
        },
    };

    let (outcome, new_id) = match mapping.get(class_id) {
        Some(to) if to != class_id => (
            LineOutcome::Remapped {
                from: class_id,
                to,
            },
            to,
        ),
        Some(_) => (LineOutcome::Unchanged(class_id), class_id),
        None if class_id == 0 => (LineOutcome::AlreadyZero, 0),
        None => return (LineOutcome::Unexpected(class_id), None),
    };

    let new_token = new_id.to_string();
    if new_id != class_id {
        parts[0] = &new_token;
    }
    (outcome, Some(parts.join(" ")))
}

/// The rewritten content of one label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemappedFile {
    pub body: String,
    /// True when at least one class id was rewritten.
    pub changed: bool,
    pub counts: RemapCounts,
}

/// Remaps the content of one label file.
pub fn remap_content(content: &str, mapping: &ClassMapping) -> RemappedFile {
    let mut counts = RemapCounts::default();
    let mut kept: Vec<String> = Vec::new();
    let mut changed = false;

    for line in content.lines() {
        let (outcome, rewritten) = remap_line(line, mapping);
        match outcome {
            LineOutcome::Blank => {}
            LineOutcome::Malformed => counts.malformed += 1,
            LineOutcome::Unexpected(_) => counts.unexpected += 1,
            LineOutcome::AlreadyZero => counts.zero_warnings += 1,
            LineOutcome::Remapped { .. } => {
                counts.remapped += 1;
                changed = true;
            }
            LineOutcome::Unchanged(_) => {}
        }

        if let Some(rewritten) = rewritten {
            kept.push(rewritten);
            counts.lines_kept += 1;
        }
    }

    let mut body = kept.join("\n");
    body.push('\n');

    RemappedFile {
        body,
        changed,
        counts,
    }
}

/// Remaps every label file directly inside `root`.
///
/// Fails with [`LabelprepError::RootNotFound`] when `root` does not exist.
pub fn remap_labels(root: &Path, opts: &RemapOptions) -> Result<RemapReport, LabelprepError> {
    if !root.exists() {
        return Err(LabelprepError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut report = RemapReport {
        root: root.to_path_buf(),
        dry_run: opts.dry_run,
        ..Default::default()
    };

    let label_files = if root.is_dir() {
        list_files_with_extensions(root, &[LABEL_EXTENSION])?
    } else {
        Vec::new()
    };

    for path in label_files {
        let content = fs::read_to_string(&path).map_err(LabelprepError::Io)?;
        let remapped = remap_content(&content, &opts.mapping);

        report.files_scanned += 1;
        report.counts += remapped.counts;

        if remapped.changed {
            report.files_would_change += 1;
            if opts.dry_run {
                debug!("{} would change (dry run)", path.display());
            } else {
                fs::write(&path, &remapped.body).map_err(LabelprepError::Io)?;
                report.files_changed += 1;
                debug!("rewrote {}", path.display());
            }
        }
    }

    info!(
        "Scanned {} label file(s) in {} with mapping {}",
        report.files_scanned,
        root.display(),
        opts.mapping
    );
    Ok(report)
}

/// Fuzz-only entrypoint for label content remapping.
#[cfg(feature = "fuzzing")]
pub fn fuzz_remap_content(input: &str) {
    let mapping = ClassMapping::default();
    let first = remap_content(input, &mapping);
    let _ = remap_content(&first.body, &mapping);
}
