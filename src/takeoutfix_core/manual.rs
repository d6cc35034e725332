use crate::takeoutfix_core::apply::{RunOptions, set_file_dates};
use crate::takeoutfix_core::dates::{display_date_string, parse_manual_date};
use crate::takeoutfix_core::error::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Outcome of the manual repair pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ManualRepairStats {
    pub applied: usize,
    pub failed: usize,
}

/// Ask the operator for a capture date for each file without a sidecar.
///
/// Blank or invalid answers skip the file. End of input stops the pass.
pub fn prompt_manual_dates<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    unresolved: &[PathBuf],
) -> Result<Vec<(PathBuf, i64)>> {
    let mut resolutions = Vec::new();
    if unresolved.is_empty() {
        return Ok(resolutions);
    }

    write!(
        output,
        "\nDo you want to manually set date and time for files without a sidecar? (y/n) "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim().to_lowercase() != "y" {
        return Ok(resolutions);
    }

    for path in unresolved {
        write!(
            output,
            "\nEnter date and time for {}\nFormat YYYY-MM-DD HH:MM (or press Enter to skip): ",
            path.display()
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        if line.trim().is_empty() {
            log::debug!("Skipped {}", path.display());
            continue;
        }

        match parse_manual_date(&line) {
            Ok(epoch) => resolutions.push((path.clone(), epoch)),
            Err(e) => log::error!("Invalid date time format, ignored: {}", e),
        }
    }

    Ok(resolutions)
}

/// Apply operator-supplied dates. Only filesystem dates are touched, since
/// there is no sidecar to build an EXIF block from.
pub fn apply_manual_dates(
    resolutions: &[(PathBuf, i64)],
    options: RunOptions,
) -> ManualRepairStats {
    let mut stats = ManualRepairStats::default();

    for (path, epoch) in resolutions {
        match set_file_dates(path, *epoch, options.dry_run) {
            Ok(()) => {
                log::info!(
                    "Successfully set date and time {} for {}",
                    display_date_string(*epoch),
                    path.display()
                );
                stats.applied += 1;
            }
            Err(e) => {
                log::error!("{}", e);
                stats.failed += 1;
            }
        }
    }

    stats
}
