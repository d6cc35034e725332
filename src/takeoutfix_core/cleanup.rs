use crate::takeoutfix_core::apply::RunOptions;
use crate::takeoutfix_core::batch::check_work_dir;
use crate::takeoutfix_core::error::Result;
use crate::takeoutfix_core::sidecar::is_sidecar;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Delete every sidecar under `work_dir`. Returns how many were (or would
/// have been, in dry-run mode) deleted.
pub fn purge_sidecars(work_dir: &Path, options: RunOptions) -> Result<usize> {
    check_work_dir(work_dir)?;
    log::info!("Deleting sidecar files...");

    let mut deleted = 0;
    for entry in WalkDir::new(work_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_sidecar(path) {
            continue;
        }

        if options.dry_run {
            log::debug!("[DRY RUN] Simulated deletion of sidecar: {}", path.display());
            deleted += 1;
            continue;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Sidecar deleted: {}", path.display());
                deleted += 1;
            }
            Err(e) => log::error!("An error occurred during deleting {}: {}", path.display(), e),
        }
    }

    Ok(deleted)
}

/// Remove empty directories below `work_dir`, deepest first. The working
/// directory itself is kept.
pub fn prune_empty_dirs(work_dir: &Path, options: RunOptions) -> Result<usize> {
    check_work_dir(work_dir)?;
    log::info!("Deleting empty directories...");

    let mut removed = 0;
    let dirs = WalkDir::new(work_dir)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir());

    for entry in dirs {
        let path = entry.path();
        let is_empty = match fs::read_dir(path) {
            Ok(mut children) => children.next().is_none(),
            Err(e) => {
                log::error!("Could not read {}: {}", path.display(), e);
                false
            }
        };
        if !is_empty {
            continue;
        }

        if options.dry_run {
            log::debug!("[DRY RUN] Simulated deletion of empty directory: {}", path.display());
            removed += 1;
            continue;
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                log::debug!("Empty directory deleted: {}", path.display());
                removed += 1;
            }
            Err(e) => log::error!(
                "An error occurred during deleting empty directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}
