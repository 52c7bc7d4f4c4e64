//! Summary of a normalization run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What happened while writing label files.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NormalizeReport {
    /// Label files written, in input order.
    pub files: Vec<PathBuf>,
    /// Total label lines written across all files.
    pub lines_written: usize,
    /// Records whose box was degenerate or outside the image.
    pub out_of_bounds: Vec<OutOfBounds>,
}

impl NormalizeReport {
    pub fn files_written(&self) -> usize {
        self.files.len()
    }

    pub fn warning_count(&self) -> usize {
        self.out_of_bounds.len()
    }
}

/// A record whose pixel box broke the box invariants.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutOfBounds {
    pub image: String,
    /// Position of the record within its image's label list.
    pub index: usize,
    pub bbox: [f64; 4],
    /// True when the box was clamped to the image before conversion.
    pub clamped: bool,
}

impl fmt::Display for NormalizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in &self.files {
            writeln!(f, "Successfully created label file: {}", path.display())?;
        }
        writeln!(
            f,
            "Wrote {} line(s) to {} label file(s)",
            self.lines_written,
            self.files_written()
        )?;

        if !self.out_of_bounds.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.warning_count())?;
            for issue in &self.out_of_bounds {
                let [xmin, ymin, xmax, ymax] = issue.bbox;
                writeln!(
                    f,
                    "  - {} record {}: box [{}, {}, {}, {}] is degenerate or outside the image{}",
                    issue.image,
                    issue.index,
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                    if issue.clamped { " (clamped)" } else { "" }
                )?;
            }
        }

        Ok(())
    }
}
