//! Sidecar lookup for media files whose names were mangled on export.
//!
//! Candidates come from an ordered list of pure generators. The first
//! candidate that exists next to the media file wins. When none does, the
//! whole working tree is searched by file name, using an index built once
//! per run.

use crate::takeoutfix_core::sidecar::{SIDECAR_EXTENSION, is_sidecar};
use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Video extensions exported as the motion half of a live photo (uppercase).
pub const LIVE_PHOTO_VIDEO_EXTENSIONS: &[&str] = &["MP4"];

/// Extensions of the still half of a live photo, in lookup order.
pub const LIVE_PHOTO_STILL_EXTENSIONS: &[&str] = &["HEIC", "JPG"];

/// Suffixes added by photo editors that the sidecar name does not carry.
pub const EDITED_MARKERS: &[&str] = &["-modifié", "-modified", "-edited"];

/// How many trailing characters the truncation heuristic removes at most.
pub const MAX_TRUNCATION: usize = 8;

/// A named candidate generator.
pub struct Heuristic {
    pub name: &'static str,
    pub generate: fn(&Path) -> Vec<PathBuf>,
}

/// Candidate generators in precedence order.
pub const HEURISTICS: &[Heuristic] = &[
    Heuristic { name: "full-name", generate: full_name },
    Heuristic { name: "without-extension", generate: without_extension },
    Heuristic { name: "live-photo-still", generate: live_photo_still },
    Heuristic { name: "duplicate-marker", generate: duplicate_marker },
    Heuristic {
        name: "duplicate-marker-after-extension",
        generate: duplicate_marker_after_extension,
    },
    Heuristic { name: "edited-marker", generate: edited_marker },
    Heuristic { name: "truncated", generate: truncated },
];

/// All candidate sidecar paths for a media file, lazily, in precedence order.
pub fn candidates(media_path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    HEURISTICS
        .iter()
        .flat_map(move |heuristic| (heuristic.generate)(media_path))
}

/// Where a sidecar was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Next to the media file.
    SameDirectory(PathBuf),
    /// Somewhere else in the tree, matched by name only. `other_matches`
    /// counts further files with a matching name that were not picked.
    Elsewhere { path: PathBuf, other_matches: usize },
}

impl Located {
    pub fn path(&self) -> &Path {
        match self {
            Located::SameDirectory(path) => path,
            Located::Elsewhere { path, .. } => path,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Located::Elsewhere { other_matches, .. } if *other_matches > 0)
    }
}

/// Finds the sidecar for media files under one working root.
pub struct Locator {
    root: PathBuf,
    index: OnceCell<SidecarIndex>,
}

impl Locator {
    pub fn new(root: &Path) -> Self {
        Locator {
            root: root.to_path_buf(),
            index: OnceCell::new(),
        }
    }

    /// Locate the sidecar for `media_path`, or `None` if there is none.
    pub fn locate(&self, media_path: &Path) -> Option<Located> {
        // Phase 1: same directory, first existing candidate wins
        for candidate in candidates(media_path) {
            log::debug!("Check if sidecar exists {}", candidate.display());
            if candidate.is_file() {
                log::debug!("Sidecar found {}", candidate.display());
                return Some(Located::SameDirectory(candidate));
            }
        }

        // Phase 2: anywhere in the tree, by file name
        let names: Vec<OsString> = candidates(media_path)
            .filter_map(|candidate| candidate.file_name().map(OsStr::to_os_string))
            .collect();

        let index = self.index.get_or_init(|| SidecarIndex::build(&self.root));
        let (path, total) = index.lookup(&names)?;
        let other_matches = total - 1;

        log::warn!(
            "Sidecar for {} found in another directory {}",
            media_path.display(),
            path.display()
        );
        if other_matches > 0 {
            log::warn!(
                "Ambiguous sidecar match for {}: {} other files share a candidate name",
                media_path.display(),
                other_matches
            );
        }

        Some(Located::Elsewhere {
            path,
            other_matches,
        })
    }

    /// Whether the tree-wide index has been built during this run.
    pub fn index_built(&self) -> bool {
        self.index.get().is_some()
    }
}

/// Every sidecar under a root, in sorted walk order, keyed by file name.
#[derive(Debug, Default)]
pub struct SidecarIndex {
    files: Vec<PathBuf>,
    by_name: HashMap<OsString, Vec<usize>>,
}

impl SidecarIndex {
    pub fn build(root: &Path) -> Self {
        log::info!("Indexing sidecars under {}", root.display());

        let mut index = SidecarIndex::default();

        let entries = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable entry while indexing: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_sidecar(e.path()));

        for entry in entries {
            let position = index.files.len();
            index
                .by_name
                .entry(entry.file_name().to_os_string())
                .or_default()
                .push(position);
            index.files.push(entry.into_path());
        }

        log::debug!("Indexed {} sidecars", index.files.len());
        index
    }

    /// First file in walk order whose name is one of `names`, and the total
    /// number of distinct files matching any of them.
    pub fn lookup(&self, names: &[OsString]) -> Option<(PathBuf, usize)> {
        let positions: HashSet<usize> = names
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .flatten()
            .copied()
            .collect();

        let first = positions.iter().min()?;
        Some((self.files[*first].clone(), positions.len()))
    }
}

/// Pieces of a media path the generators work from.
struct NameParts<'a> {
    parent: &'a Path,
    name: &'a str,
    stem: &'a str,
    extension: Option<&'a str>,
}

fn name_parts(path: &Path) -> Option<NameParts<'_>> {
    Some(NameParts {
        parent: path.parent().unwrap_or_else(|| Path::new("")),
        name: path.file_name()?.to_str()?,
        stem: path.file_stem()?.to_str()?,
        extension: path.extension().and_then(|e| e.to_str()),
    })
}

fn sidecar_path(parent: &Path, base: &str) -> PathBuf {
    parent.join(format!("{}.{}", base, SIDECAR_EXTENSION))
}

/// Split a trailing `(…)` duplicate marker off a stem: `IMG(1)` -> (`IMG`, `(1)`).
fn split_duplicate_marker(stem: &str) -> Option<(&str, &str)> {
    if !stem.ends_with(')') {
        return None;
    }
    let open = stem.rfind('(')?;
    (open > 0).then(|| stem.split_at(open))
}

/// `IMG_01.JPG` -> `IMG_01.JPG.json`
fn full_name(path: &Path) -> Vec<PathBuf> {
    let Some(name) = path.file_name() else {
        return Vec::new();
    };
    let mut sidecar = name.to_os_string();
    sidecar.push(".");
    sidecar.push(SIDECAR_EXTENSION);
    vec![path.with_file_name(sidecar)]
}

/// `IMG_01.JPG` -> `IMG_01.json`
fn without_extension(path: &Path) -> Vec<PathBuf> {
    match name_parts(path) {
        Some(parts) if parts.extension.is_some() => vec![sidecar_path(parts.parent, parts.stem)],
        _ => Vec::new(),
    }
}

/// `IMG_01(1).MP4` -> `IMG_01(1).HEIC.json`, `IMG_01(1).JPG.json`,
/// `IMG_01.HEIC.json`, `IMG_01.JPG.json`
fn live_photo_still(path: &Path) -> Vec<PathBuf> {
    let Some(parts) = name_parts(path) else {
        return Vec::new();
    };
    let is_live_video = parts
        .extension
        .map(|ext| LIVE_PHOTO_VIDEO_EXTENSIONS.contains(&ext.to_uppercase().as_str()))
        .unwrap_or(false);
    if !is_live_video {
        return Vec::new();
    }

    let parent = parts.parent;
    let base = split_duplicate_marker(parts.stem)
        .map(|(base, _)| base)
        .unwrap_or(parts.stem);

    [parts.stem, base]
        .into_iter()
        .flat_map(|stem| {
            LIVE_PHOTO_STILL_EXTENSIONS
                .iter()
                .map(move |still| sidecar_path(parent, &format!("{}.{}", stem, still)))
        })
        .collect()
}

/// `IMG_01(1).JPG` -> `IMG_01.JPG.json`
fn duplicate_marker(path: &Path) -> Vec<PathBuf> {
    let Some(parts) = name_parts(path) else {
        return Vec::new();
    };
    let Some((base, _)) = split_duplicate_marker(parts.stem) else {
        return Vec::new();
    };
    let name = match parts.extension {
        Some(ext) => format!("{}.{}", base, ext),
        None => base.to_string(),
    };
    vec![sidecar_path(parts.parent, &name)]
}

/// `IMG_01(1).JPG` -> `IMG_01.JPG(1).json`
fn duplicate_marker_after_extension(path: &Path) -> Vec<PathBuf> {
    let Some(parts) = name_parts(path) else {
        return Vec::new();
    };
    let (Some((base, marker)), Some(ext)) = (split_duplicate_marker(parts.stem), parts.extension)
    else {
        return Vec::new();
    };
    vec![sidecar_path(parts.parent, &format!("{}.{}{}", base, ext, marker))]
}

/// `IMG_01-modified.JPG` -> `IMG_01.JPG.json`
fn edited_marker(path: &Path) -> Vec<PathBuf> {
    let Some(parts) = name_parts(path) else {
        return Vec::new();
    };
    EDITED_MARKERS
        .iter()
        .filter(|marker| parts.name.contains(*marker))
        .map(|marker| sidecar_path(parts.parent, &parts.name.replace(marker, "")))
        .collect()
}

/// `IMG_20210101_123456.JPG` -> `IMG_20210101_123456.JP.json`, … ,
/// `IMG_20210101_1234.json`; longest remaining name first.
fn truncated(path: &Path) -> Vec<PathBuf> {
    let Some(parts) = name_parts(path) else {
        return Vec::new();
    };
    let chars: Vec<char> = parts.name.chars().collect();
    (1..=MAX_TRUNCATION)
        .take_while(|removed| *removed < chars.len())
        .map(|removed| {
            let kept: String = chars[..chars.len() - removed].iter().collect();
            sidecar_path(parts.parent, &kept)
        })
        .collect()
}
