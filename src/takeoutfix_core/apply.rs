use crate::takeoutfix_core::dates::display_date_string;
use crate::takeoutfix_core::error::{Result, TakeoutError};
use crate::takeoutfix_core::exif::{ExifBlock, embed_exif};
use crate::takeoutfix_core::media::{MediaEntry, MediaKind};
use crate::takeoutfix_core::sidecar::SidecarRecord;
use crate::takeoutfix_core::stats::ProcessingOutcome;
use filetime::FileTime;
use std::fs;
use std::path::Path;

/// Options threaded from the command line into every mutating step.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Validate and log, but never write.
    pub dry_run: bool,
}

/// Load the sidecar at `sidecar_path` and apply it to `entry`.
pub fn apply_sidecar(
    entry: &MediaEntry,
    sidecar_path: &Path,
    options: RunOptions,
) -> ProcessingOutcome {
    log::info!("Sidecar used {}", sidecar_path.display());

    match SidecarRecord::load(sidecar_path) {
        Ok(record) => apply(entry, &record, options),
        Err(e) => {
            log::error!("An error occurred when processing {}: {}", entry.path.display(), e);
            ProcessingOutcome::WarningError(e.to_string())
        }
    }
}

/// Apply a parsed sidecar record to a media entry.
///
/// The EXIF embed and the filesystem date update are independent: a failed
/// embed is reported, but the dates are still set.
pub fn apply(
    entry: &MediaEntry,
    record: &SidecarRecord,
    options: RunOptions,
) -> ProcessingOutcome {
    let path = &entry.path;

    let exif_error = if entry.supports_exif() {
        ExifBlock::new(record)
            .and_then(|block| embed_exif(path, &block, options.dry_run))
            .err()
    } else {
        if entry.kind == MediaKind::Image {
            log::debug!("No EXIF container for {}, setting system dates only", path.display());
        }
        None
    };

    if let Some(e) = &exif_error {
        log::warn!("An error occurred during EXIF update of {}: {}", path.display(), e);
    }

    if let Err(e) = set_file_dates(path, record.captured_at, options.dry_run) {
        log::error!("An error occurred when processing {}: {}", path.display(), e);
        return ProcessingOutcome::WarningError(e.to_string());
    }

    log::info!(
        "New date time {} for {}",
        display_date_string(record.captured_at),
        path.display()
    );

    match exif_error {
        Some(e) => ProcessingOutcome::WarningError(e.to_string()),
        None => {
            log::info!("Successful processing for {}", path.display());
            ProcessingOutcome::Success
        }
    }
}

/// Set a file's access and modification times to `epoch` seconds.
pub fn set_file_dates(path: &Path, epoch: i64, dry_run: bool) -> Result<()> {
    if dry_run {
        // The file must still be there for the real run to succeed
        fs::metadata(path).map_err(|source| TakeoutError::FilesystemTimestamp {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "[DRY RUN] Simulated updating system dates for {}: {}",
            path.display(),
            display_date_string(epoch)
        );
        return Ok(());
    }

    let time = FileTime::from_unix_time(epoch, 0);
    filetime::set_file_times(path, time, time).map_err(|source| {
        TakeoutError::FilesystemTimestamp {
            path: path.to_path_buf(),
            source,
        }
    })?;

    log::debug!("Updated system dates for {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const EARLIER: i64 = 1_000_000_000;

    fn file_times(path: &Path) -> (i64, i64) {
        let meta = fs::metadata(path).unwrap();
        (
            FileTime::from_last_access_time(&meta).unix_seconds(),
            FileTime::from_last_modification_time(&meta).unix_seconds(),
        )
    }

    fn media(temp: &assert_fs::TempDir, name: &str, content: &[u8]) -> MediaEntry {
        let child = temp.child(name);
        child.write_binary(content).unwrap();
        let earlier = FileTime::from_unix_time(EARLIER, 0);
        filetime::set_file_times(child.path(), earlier, earlier).unwrap();
        MediaEntry::from_path(child.path()).unwrap()
    }

    fn record(captured_at: i64) -> SidecarRecord {
        SidecarRecord {
            captured_at,
            gps: None,
        }
    }

    #[test]
    fn test_apply_sets_access_and_modification_time() {
        let temp = assert_fs::TempDir::new().unwrap();
        let entry = media(&temp, "clip.mp4", b"video bytes");

        let outcome = apply(&entry, &record(1_700_000_000), RunOptions::default());

        assert_eq!(outcome, ProcessingOutcome::Success);
        assert_eq!(file_times(&entry.path), (1_700_000_000, 1_700_000_000));
    }

    #[test]
    fn test_apply_heic_skips_exif() {
        let temp = assert_fs::TempDir::new().unwrap();
        let entry = media(&temp, "IMG_01.HEIC", b"not really heic");

        let outcome = apply(&entry, &record(1_609_459_200), RunOptions::default());

        assert_eq!(outcome, ProcessingOutcome::Success);
        assert_eq!(file_times(&entry.path).1, 1_609_459_200);
        assert_eq!(fs::read(&entry.path).unwrap(), b"not really heic");
    }

    #[test]
    fn test_apply_gif_and_bmp_get_system_dates_only() {
        let temp = assert_fs::TempDir::new().unwrap();
        for name in ["anim.gif", "scan.BMP"] {
            let entry = media(&temp, name, b"pixels");

            let outcome = apply(&entry, &record(1_609_459_200), RunOptions::default());

            assert_eq!(outcome, ProcessingOutcome::Success);
            assert_eq!(file_times(&entry.path), (1_609_459_200, 1_609_459_200));
            assert_eq!(fs::read(&entry.path).unwrap(), b"pixels");
        }
    }

    #[test]
    fn test_apply_exif_failure_still_sets_dates() {
        let temp = assert_fs::TempDir::new().unwrap();
        let entry = media(&temp, "IMG_01.JPG", b"corrupt jpeg");

        let outcome = apply(&entry, &record(1_609_459_200), RunOptions::default());

        assert!(matches!(outcome, ProcessingOutcome::WarningError(_)));
        assert_eq!(file_times(&entry.path), (1_609_459_200, 1_609_459_200));
    }

    #[test]
    fn test_apply_dry_run_matches_real_run_without_writing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dry = media(&temp, "dry/IMG_01.JPG", b"corrupt jpeg");
        let real = media(&temp, "real/IMG_01.JPG", b"corrupt jpeg");
        let dry_video = media(&temp, "dry/clip.mp4", b"video bytes");
        let real_video = media(&temp, "real/clip.mp4", b"video bytes");

        let dry_run = RunOptions { dry_run: true };
        let dry_outcome = apply(&dry, &record(1_609_459_200), dry_run);
        let real_outcome = apply(&real, &record(1_609_459_200), RunOptions::default());
        assert_eq!(dry_outcome, real_outcome);

        let dry_video_outcome = apply(&dry_video, &record(1_609_459_200), dry_run);
        let real_video_outcome =
            apply(&real_video, &record(1_609_459_200), RunOptions::default());
        assert_eq!(dry_video_outcome, ProcessingOutcome::Success);
        assert_eq!(dry_video_outcome, real_video_outcome);

        assert_eq!(file_times(&dry.path), (EARLIER, EARLIER));
        assert_eq!(file_times(&dry_video.path), (EARLIER, EARLIER));
        assert_eq!(fs::read(&dry.path).unwrap(), b"corrupt jpeg");
        assert_eq!(fs::read(&dry_video.path).unwrap(), b"video bytes");
    }

    #[test]
    fn test_apply_sidecar_malformed_leaves_file_untouched() {
        let temp = assert_fs::TempDir::new().unwrap();
        let entry = media(&temp, "clip.mp4", b"video bytes");
        let sidecar = temp.child("clip.mp4.json");
        sidecar.write_str(r#"{"title": "clip.mp4"}"#).unwrap();

        let outcome = apply_sidecar(&entry, sidecar.path(), RunOptions::default());

        match outcome {
            ProcessingOutcome::WarningError(detail) => {
                assert!(detail.contains("photoTakenTime.timestamp"))
            }
            other => panic!("expected WarningError, got {:?}", other),
        }
        assert_eq!(file_times(&entry.path), (EARLIER, EARLIER));
    }

    #[test]
    fn test_apply_sidecar_reads_timestamp() {
        let temp = assert_fs::TempDir::new().unwrap();
        let entry = media(&temp, "clip.mov", b"video bytes");
        let sidecar = temp.child("clip.mov.json");
        sidecar
            .write_str(r#"{"photoTakenTime": {"timestamp": "1700000000"}}"#)
            .unwrap();

        let outcome = apply_sidecar(&entry, sidecar.path(), RunOptions::default());

        assert_eq!(outcome, ProcessingOutcome::Success);
        assert_eq!(file_times(&entry.path), (1_700_000_000, 1_700_000_000));
    }

    #[test]
    fn test_set_file_dates_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("gone.mp4");

        for dry_run in [false, true] {
            let err = set_file_dates(missing.path(), 1, dry_run).unwrap_err();
            assert!(matches!(err, TakeoutError::FilesystemTimestamp { .. }));
        }
    }
}
