use crate::takeoutfix_core::apply::{RunOptions, apply_sidecar};
use crate::takeoutfix_core::error::{Result, TakeoutError};
use crate::takeoutfix_core::locate::{Located, Locator};
use crate::takeoutfix_core::media::MediaEntry;
use crate::takeoutfix_core::stats::{ProcessingOutcome, RunStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use walkdir::WalkDir;

/// Check that the working directory can be processed at all.
pub fn check_work_dir(work_dir: &Path) -> Result<()> {
    if !work_dir.exists() {
        return Err(TakeoutError::PathNotFound(work_dir.to_path_buf()));
    }
    if !work_dir.is_dir() {
        return Err(TakeoutError::NotADirectory(work_dir.to_path_buf()));
    }
    std::fs::read_dir(work_dir)?;
    Ok(())
}

/// Every recognized media file under `work_dir`, in sorted walk order.
pub fn discover_media(work_dir: &Path) -> Vec<MediaEntry> {
    WalkDir::new(work_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| MediaEntry::from_path(e.path()))
        .collect()
}

/// Locate and apply the sidecar for one entry, recording the outcome.
pub fn process_entry(
    locator: &Locator,
    entry: &MediaEntry,
    options: RunOptions,
    stats: &mut RunStats,
) {
    log::info!("File processing {} {}", entry.kind, entry.path.display());

    let Some(located) = locator.locate(&entry.path) else {
        log::warn!("Sidecar not found for {}", entry.path.display());
        stats.record(&entry.path, ProcessingOutcome::SidecarNotFound);
        return;
    };

    if let Located::Elsewhere {
        path,
        other_matches,
    } = &located
    {
        stats.record(
            &entry.path,
            ProcessingOutcome::SidecarFoundElsewhere {
                sidecar: path.clone(),
                other_matches: *other_matches,
            },
        );
    }

    let outcome = apply_sidecar(entry, located.path(), options);
    stats.record(&entry.path, outcome);
}

/// Process every media file under `work_dir` and return the run statistics.
pub fn process_directory(work_dir: &Path, options: RunOptions) -> Result<RunStats> {
    check_work_dir(work_dir)?;

    if options.dry_run {
        log::info!("[DRY RUN] No files will be modified");
    }

    log::info!("Scanning {}", work_dir.display());
    let entries = discover_media(work_dir);
    log::info!("Found {} media files to process", entries.len());

    let bar_style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(entries.len() as u64).with_style(bar_style);
    bar.set_message("Processing media");

    let locator = Locator::new(work_dir);
    let mut stats = RunStats::default();

    for entry in &entries {
        process_entry(&locator, entry, options, &mut stats);
        bar.inc(1);
    }

    bar.finish_with_message("Processing complete");
    Ok(stats)
}
