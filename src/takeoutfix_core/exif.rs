use crate::takeoutfix_core::dates::exif_date_string;
use crate::takeoutfix_core::error::{Result, TakeoutError};
use crate::takeoutfix_core::sidecar::{GpsPosition, SidecarRecord};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use std::fmt::Debug;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Sub-second value written alongside every date-time tag.
const SUBSEC: &str = "00";

/// UTC offset written alongside every date-time tag.
const OFFSET: &str = "+00:00";

/// FF E1, a two-byte length and `Exif\0\0` in front of the TIFF data.
const APP1_HEADER_SIZE: usize = 10;

/// Degrees, minutes, seconds, each as a `(numerator, denominator)` pair.
pub type Dms = [(u32, u32); 3];

/// Converts decimal degrees to DMS by truncation.
///
/// Downstream consumers expect the truncated values, so `48.8584` becomes
/// `48° 51' 30"` and not `48° 51' 31"`.
pub fn decimal_to_dms(value: f64) -> Dms {
    let value = value.abs();
    let degrees = value.trunc();
    let minutes_decimal = (value - degrees) * 60.0;
    let minutes = minutes_decimal.trunc();
    let seconds = ((minutes_decimal - minutes) * 60.0).trunc();

    [
        (degrees as u32, 1),
        (minutes as u32, 1),
        (seconds as u32, 1),
    ]
}

/// GPS part of an EXIF block.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsBlock {
    pub latitude_ref: &'static str,
    pub latitude: Dms,
    pub longitude_ref: &'static str,
    pub longitude: Dms,
}

impl GpsBlock {
    pub fn new(position: &GpsPosition) -> Self {
        GpsBlock {
            latitude_ref: if position.latitude >= 0.0 { "N" } else { "S" },
            latitude: decimal_to_dms(position.latitude),
            longitude_ref: if position.longitude >= 0.0 { "E" } else { "W" },
            longitude: decimal_to_dms(position.longitude),
        }
    }
}

/// The EXIF tags derived from a sidecar record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifBlock {
    /// Capture time as `YYYY:MM:DD HH:MM:SS`, local time.
    pub date_time: String,
    pub gps: Option<GpsBlock>,
}

impl ExifBlock {
    pub fn new(record: &SidecarRecord) -> Result<Self> {
        Ok(ExifBlock {
            date_time: exif_date_string(record.captured_at)?,
            gps: record.gps.as_ref().map(GpsBlock::new),
        })
    }

    /// The tags to set, in write order.
    pub fn tags(&self) -> Vec<ExifTag> {
        let mut tags = vec![
            ExifTag::DateTimeOriginal(self.date_time.clone()),
            ExifTag::CreateDate(self.date_time.clone()),
            ExifTag::SubSecTime(SUBSEC.to_string()),
            ExifTag::SubSecTimeOriginal(SUBSEC.to_string()),
            ExifTag::SubSecTimeDigitized(SUBSEC.to_string()),
            ExifTag::OffsetTime(OFFSET.to_string()),
            ExifTag::OffsetTimeOriginal(OFFSET.to_string()),
            ExifTag::OffsetTimeDigitized(OFFSET.to_string()),
        ];

        if let Some(gps) = &self.gps {
            tags.push(ExifTag::GPSLatitudeRef(gps.latitude_ref.to_string()));
            tags.push(ExifTag::GPSLatitude(to_rationals(&gps.latitude)));
            tags.push(ExifTag::GPSLongitudeRef(gps.longitude_ref.to_string()));
            tags.push(ExifTag::GPSLongitude(to_rationals(&gps.longitude)));
        }

        tags
    }

    pub fn apply_to(&self, metadata: &mut Metadata) {
        for tag in self.tags() {
            metadata.set_tag(tag);
        }
    }
}

fn to_rationals(dms: &Dms) -> Vec<uR64> {
    dms.iter()
        .map(|(nominator, denominator)| uR64 {
            nominator: *nominator,
            denominator: *denominator,
        })
        .collect()
}

/// Image containers the EXIF writer knows how to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Jpeg,
    Png,
    WebP,
    Tiff,
}

impl Container {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Container::Jpeg),
            "png" => Some(Container::Png),
            "webp" => Some(Container::WebP),
            "tif" | "tiff" => Some(Container::Tiff),
            _ => None,
        }
    }
}

/// Run a little_exif call, turning both its errors and its panics into a
/// reason string.
fn guarded<T, E: Debug>(
    call: impl FnOnce() -> std::result::Result<T, E>,
) -> std::result::Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{:?}", e)),
        Err(_) => Err("little_exif panicked".to_string()),
    }
}

fn embed_error(path: &Path, reason: impl Into<String>) -> TakeoutError {
    TakeoutError::EmbeddedMetadata {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Embed an EXIF block into an image file in place.
///
/// Existing tags and image data are kept; only the block's tags are replaced.
/// Files without any EXIF get a fresh segment. In dry-run mode the file is
/// still read and parsed, so broken files fail the same way they would for
/// real, but nothing is written.
pub fn embed_exif(path: &Path, block: &ExifBlock, dry_run: bool) -> Result<()> {
    let container = Container::from_path(path)
        .ok_or_else(|| TakeoutError::UnsupportedFormat(path.to_path_buf()))?;

    match guarded(|| Metadata::new_from_path(path)) {
        Ok(mut metadata) => {
            block.apply_to(&mut metadata);
            if dry_run {
                log_dry_run(path, block);
                return Ok(());
            }
            guarded(|| metadata.write_to_file(path))
                .map_err(|reason| embed_error(path, reason))?;
        }
        Err(reason) => {
            log::debug!("No readable EXIF in {}: {}", path.display(), reason);
            let mut metadata = Metadata::new();
            block.apply_to(&mut metadata);
            embed_fresh(path, container, &metadata, &reason, dry_run)?;
            if dry_run {
                log_dry_run(path, block);
                return Ok(());
            }
        }
    }

    log::debug!("Updated EXIF metadata for {}: {}", path.display(), block.date_time);
    Ok(())
}

fn log_dry_run(path: &Path, block: &ExifBlock) {
    log::debug!(
        "[DRY RUN] Simulated updating EXIF metadata for {}: {}{}",
        path.display(),
        block.date_time,
        if block.gps.is_some() { " with GPS" } else { "" }
    );
}

/// Write `metadata` into a file little_exif could not read anything from.
///
/// JPEG and PNG get a new segment through img-parts. A file that already
/// carries an EXIF segment is left alone: that segment is unreadable, and
/// replacing it would drop whatever else it holds.
fn embed_fresh(
    path: &Path,
    container: Container,
    metadata: &Metadata,
    read_error: &str,
    dry_run: bool,
) -> Result<()> {
    match container {
        Container::Jpeg | Container::Png => {
            let bytes = Bytes::from(fs::read(path)?);
            let exif = tiff_bytes(path, metadata)?;
            let output = insert_exif_segment(path, container, bytes, exif, read_error)?;
            if !dry_run {
                fs::write(path, output)?;
            }
            Ok(())
        }
        Container::WebP => {
            // Simple (VP8/VP8L) WebP files have nowhere to put EXIF
            if !has_vp8x_header(&fs::read(path)?) {
                return Err(TakeoutError::UnsupportedFormat(path.to_path_buf()));
            }
            if !dry_run {
                guarded(|| metadata.write_to_file(path))
                    .map_err(|reason| embed_error(path, reason))?;
            }
            Ok(())
        }
        Container::Tiff => Err(embed_error(
            path,
            format!("could not read existing metadata: {}", read_error),
        )),
    }
}

/// Encode `metadata` and strip the JPEG APP1 header, leaving the TIFF data.
fn tiff_bytes(path: &Path, metadata: &Metadata) -> Result<Bytes> {
    let app1 = guarded(|| metadata.as_u8_vec(FileExtension::JPEG))
        .map_err(|reason| embed_error(path, format!("could not encode EXIF: {}", reason)))?;
    if app1.len() <= APP1_HEADER_SIZE {
        return Err(embed_error(path, "encoded EXIF is empty"));
    }
    Ok(Bytes::copy_from_slice(&app1[APP1_HEADER_SIZE..]))
}

fn insert_exif_segment(
    path: &Path,
    container: Container,
    bytes: Bytes,
    exif: Bytes,
    read_error: &str,
) -> Result<Vec<u8>> {
    let unreadable = || embed_error(path, format!("existing EXIF is unreadable: {}", read_error));
    let mut output = Vec::new();

    match container {
        Container::Jpeg => {
            let mut jpeg = Jpeg::from_bytes(bytes)
                .map_err(|e| embed_error(path, format!("could not parse JPEG: {}", e)))?;
            if jpeg.exif().is_some() {
                return Err(unreadable());
            }
            jpeg.set_exif(Some(exif));
            jpeg.encoder().write_to(&mut output)?;
        }
        Container::Png => {
            let mut png = Png::from_bytes(bytes)
                .map_err(|e| embed_error(path, format!("could not parse PNG: {}", e)))?;
            if png.exif().is_some() {
                return Err(unreadable());
            }
            png.set_exif(Some(exif));
            png.encoder().write_to(&mut output)?;
        }
        Container::WebP | Container::Tiff => {
            return Err(TakeoutError::UnsupportedFormat(path.to_path_buf()));
        }
    }

    Ok(output)
}

fn has_vp8x_header(bytes: &[u8]) -> bool {
    bytes.len() >= 16
        && &bytes[0..4] == b"RIFF"
        && &bytes[8..12] == b"WEBP"
        && &bytes[12..16] == b"VP8X"
}
