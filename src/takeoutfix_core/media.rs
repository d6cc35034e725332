use std::path::{Path, PathBuf};

/// Image file extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "gif", "bmp", "tiff", "tif", "webp",
];

/// Video file extensions (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m4v"];

/// Image formats that only get filesystem dates; EXIF embedding is skipped.
/// GIF and BMP have no EXIF container.
const FS_DATE_ONLY_EXTENSIONS: &[&str] = &["heic", "gif", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media file discovered in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaEntry {
    /// Classify a path; returns `None` for anything that is not a known media format.
    pub fn from_path(path: &Path) -> Option<Self> {
        detect_media_kind(path).map(|kind| MediaEntry {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Whether this entry should receive an embedded EXIF block.
    pub fn supports_exif(&self) -> bool {
        self.kind == MediaKind::Image
            && !lowercase_extension(&self.path)
                .map(|ext| FS_DATE_ONLY_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Detect media kind from a file path's extension (case-insensitive).
pub fn detect_media_kind(path: &Path) -> Option<MediaKind> {
    let ext_lower = lowercase_extension(path)?;

    if IMAGE_EXTENSIONS.contains(&ext_lower.as_str()) {
        return Some(MediaKind::Image);
    }

    if VIDEO_EXTENSIONS.contains(&ext_lower.as_str()) {
        return Some(MediaKind::Video);
    }

    None
}
