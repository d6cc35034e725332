use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to one media entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success,
    /// Processed, but something needs attention. Carries the error detail.
    WarningError(String),
    SidecarNotFound,
    /// Audit record: the sidecar came from another directory. Recorded in
    /// addition to the entry's apply outcome.
    SidecarFoundElsewhere {
        sidecar: PathBuf,
        other_matches: usize,
    },
}

/// Statistics accumulated over one run. Owned by the caller and passed to
/// each processing step.
#[derive(Debug, Default)]
pub struct RunStats {
    pub success: usize,
    pub warnings: Vec<(PathBuf, String)>,
    pub not_found: Vec<PathBuf>,
    pub found_elsewhere: Vec<(PathBuf, PathBuf)>,
    pub ambiguous: Vec<(PathBuf, usize)>,
}

impl RunStats {
    pub fn record(&mut self, path: &Path, outcome: ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Success => self.success += 1,
            ProcessingOutcome::WarningError(detail) => {
                self.warnings.push((path.to_path_buf(), detail))
            }
            ProcessingOutcome::SidecarNotFound => self.not_found.push(path.to_path_buf()),
            ProcessingOutcome::SidecarFoundElsewhere {
                sidecar,
                other_matches,
            } => {
                if other_matches > 0 {
                    self.ambiguous.push((path.to_path_buf(), other_matches));
                }
                self.found_elsewhere.push((path.to_path_buf(), sidecar));
            }
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn not_found_count(&self) -> usize {
        self.not_found.len()
    }

    pub fn found_elsewhere_count(&self) -> usize {
        self.found_elsewhere.len()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Final results =====")?;
        writeln!(f, "Files processed successfully: {}", self.success)?;
        writeln!(f, "Files processed with warnings: {}", self.warning_count())?;
        writeln!(f, "Sidecars found in another directory: {}", self.found_elsewhere_count())?;
        writeln!(f, "Sidecars not found: {}", self.not_found_count())?;

        if !self.warnings.is_empty() {
            writeln!(f, "\nWarning files:")?;
            for (path, detail) in &self.warnings {
                writeln!(f, "- {}", path.display())?;
                writeln!(f, "  Error details: {}", detail)?;
            }
        }

        if !self.found_elsewhere.is_empty() {
            writeln!(f, "\nSidecars found in another directory:")?;
            for (path, sidecar) in &self.found_elsewhere {
                writeln!(f, "- {}", path.display())?;
                writeln!(f, "  Sidecar: {}", sidecar.display())?;
            }
        }

        if !self.ambiguous.is_empty() {
            writeln!(f, "\nAmbiguous sidecar matches (check these by hand):")?;
            for (path, other_matches) in &self.ambiguous {
                writeln!(f, "- {} ({} other candidates)", path.display(), other_matches)?;
            }
        }

        if !self.not_found.is_empty() {
            writeln!(f, "\nSidecars not found:")?;
            for path in &self.not_found {
                writeln!(f, "- {}", path.display())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut stats = RunStats::default();
        stats.record(Path::new("a.jpg"), ProcessingOutcome::Success);
        stats.record(
            Path::new("b.jpg"),
            ProcessingOutcome::WarningError("bad sidecar".to_string()),
        );
        stats.record(Path::new("c.jpg"), ProcessingOutcome::SidecarNotFound);
        stats.record(
            Path::new("d.jpg"),
            ProcessingOutcome::SidecarFoundElsewhere {
                sidecar: PathBuf::from("x/d.jpg.json"),
                other_matches: 0,
            },
        );
        stats.record(Path::new("d.jpg"), ProcessingOutcome::Success);

        assert_eq!(stats.success, 2);
        assert_eq!(stats.warning_count(), 1);
        assert_eq!(stats.not_found_count(), 1);
        assert_eq!(stats.found_elsewhere_count(), 1);
        assert!(stats.ambiguous.is_empty());
    }

    #[test]
    fn test_ambiguous_elsewhere_is_listed() {
        let mut stats = RunStats::default();
        stats.record(
            Path::new("d.jpg"),
            ProcessingOutcome::SidecarFoundElsewhere {
                sidecar: PathBuf::from("x/d.jpg.json"),
                other_matches: 2,
            },
        );
        assert_eq!(stats.ambiguous, vec![(PathBuf::from("d.jpg"), 2)]);
    }

    #[test]
    fn test_display_summary() {
        let mut stats = RunStats::default();
        stats.record(Path::new("a.jpg"), ProcessingOutcome::Success);
        stats.record(
            Path::new("b.jpg"),
            ProcessingOutcome::WarningError("bad sidecar".to_string()),
        );
        stats.record(Path::new("c.jpg"), ProcessingOutcome::SidecarNotFound);

        let summary = stats.to_string();
        assert!(summary.contains("Files processed successfully: 1"));
        assert!(summary.contains("Files processed with warnings: 1"));
        assert!(summary.contains("Sidecars not found: 1"));
        assert!(summary.contains("Error details: bad sidecar"));
        assert!(summary.contains("- c.jpg"));
    }
}
