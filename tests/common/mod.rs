#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use filetime::FileTime;
use std::path::Path;

/// Modification time given to fixture files before a run.
pub const EARLIER: i64 = 1_000_000_000;

pub fn takeoutfix() -> Command {
    Command::cargo_bin("takeoutfix").unwrap()
}

/// A tiny JPEG with an EXIF segment holding only an Orientation tag. There is
/// no image data; the EXIF writer only walks the segment markers.
pub fn minimal_jpeg() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8]; // SOI

    // APP1 "Exif\0\0" + little-endian TIFF with one IFD0 entry
    jpeg.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x22]);
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
    jpeg.extend_from_slice(&[0x01, 0x00]);
    jpeg.extend_from_slice(&[
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    ]);
    jpeg.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    // SOS, one byte of scan data, EOI
    jpeg.extend_from_slice(&[
        0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00,
    ]);
    jpeg.push(0x00);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A JPEG carrying only a JFIF header, no EXIF segment at all.
pub fn jfif_jpeg() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8]; // SOI
    jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    jpeg.extend_from_slice(b"JFIF\0");
    jpeg.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    jpeg.extend_from_slice(&[
        0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00,
    ]);
    jpeg.push(0x00);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A JPEG whose EXIF segment length runs past the end of the file.
pub fn truncated_exif_jpeg() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xF0];
    jpeg.extend_from_slice(b"Exif\0\0II*\0");
    jpeg
}

/// Write a media fixture and backdate it to `EARLIER`.
pub fn write_media(temp: &TempDir, name: &str, content: &[u8]) -> ChildPath {
    let media = temp.child(name);
    media.write_binary(content).unwrap();
    let earlier = FileTime::from_unix_time(EARLIER, 0);
    filetime::set_file_times(media.path(), earlier, earlier).unwrap();
    media
}

pub fn write_sidecar(temp: &TempDir, name: &str, timestamp: i64) -> ChildPath {
    let sidecar = temp.child(name);
    sidecar
        .write_str(&format!(
            r#"{{"title": "{}", "photoTakenTime": {{"timestamp": "{}"}}}}"#,
            name, timestamp
        ))
        .unwrap();
    sidecar
}

pub fn mtime(path: &Path) -> i64 {
    let meta = std::fs::metadata(path).unwrap();
    FileTime::from_last_modification_time(&meta).unix_seconds()
}
