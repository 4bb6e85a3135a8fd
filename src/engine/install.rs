//! Installs uploaded dictionary archives into the dictionary root.
//!
//! An archive is rejected before anything is written if any entry name is
//! absolute or contains a `..` segment. Accepted archives are extracted into a
//! fresh `<sanitized-name>_<UTC timestamp>` folder, which must then contain
//! exactly one `.mdx` file. Any failure after the folder is created removes
//! the folder again.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use log::{debug, info, warn};
use regex::Regex;
use walkdir::WalkDir;
use zip::ZipArchive;

use super::config::EngineConfig;
use super::types::error::{EngineError, Result};
use super::types::filetypes::{FileType, Mdx};
use super::types::models::InstalledDictionary;

const STYLESHEET_EXTENSION: &str = "css";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];
const COVER_PREFIXES: &[&str] = &["cover", "icon", "logo"];

static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars_regex() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r"[^a-zA-Z0-9._-]+").expect("Invalid folder name regex pattern")
    })
}

/// Turns a display name into a filesystem-safe folder token.
pub fn sanitize_name(name: &str, max_len: usize) -> String {
    let token = unsafe_chars_regex().replace_all(name.trim(), "_");
    let token: String = token.chars().take(max_len).collect();
    if token.is_empty() {
        "dictionary".to_string()
    } else {
        token
    }
}

/// Whether an archive entry name could land outside the extraction folder.
pub fn is_unsafe_entry_name(name: &str) -> bool {
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return true;
    }
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }
    normalized.split('/').any(|segment| segment == "..")
}

/// Files found in an installed dictionary folder, relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    pub headword_file: String,
    pub stylesheet_file: Option<String>,
    pub cover_file: Option<String>,
}

fn relative_name(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// All regular files under `dir`, in a stable (name-sorted) walk order.
pub(crate) fn walk_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Finds the headword file, the first stylesheet and a cover image in `dir`.
pub fn discover(dir: &Path) -> Result<FolderLayout> {
    let files: Vec<PathBuf> = walk_files(dir).collect();

    let headwords: Vec<&PathBuf> = files.iter().filter(|p| Mdx::matches(p)).collect();
    if headwords.len() != 1 {
        return Err(EngineError::ArchiveShapeInvalid {
            found: headwords.len(),
        });
    }
    let headword_file = relative_name(dir, headwords[0])
        .ok_or_else(|| EngineError::ArchiveShapeInvalid { found: 0 })?;

    let stylesheet_file = files
        .iter()
        .find(|p| has_extension(p, STYLESHEET_EXTENSION))
        .and_then(|p| relative_name(dir, p));

    // Grouped by extension, in IMAGE_EXTENSIONS order.
    let images: Vec<&PathBuf> = IMAGE_EXTENSIONS
        .iter()
        .flat_map(|ext| files.iter().filter(move |p| has_extension(p, ext)))
        .collect();
    let cover = images
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .is_some_and(|n| COVER_PREFIXES.iter().any(|prefix| n.starts_with(prefix)))
        })
        .or_else(|| images.first());
    let cover_file = cover.and_then(|p| relative_name(dir, p));

    Ok(FolderLayout {
        headword_file,
        stylesheet_file,
        cover_file,
    })
}

/// Extracts archives into the configured dictionary root.
#[derive(Debug, Clone)]
pub struct Installer<'c> {
    config: &'c EngineConfig,
}

impl<'c> Installer<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Validates and extracts `archive` as a new dictionary named `name`.
    pub fn install(&self, name: &str, archive: &[u8]) -> Result<InstalledDictionary> {
        let name = name.trim();
        if name.chars().count() < self.config.min_name_len {
            return Err(EngineError::NameTooShort {
                min: self.config.min_name_len,
            });
        }

        let mut zip = ZipArchive::new(Cursor::new(archive))?;
        for entry_name in zip.file_names() {
            if is_unsafe_entry_name(entry_name) {
                warn!("Rejecting archive for '{}': unsafe entry '{}'", name, entry_name);
                return Err(EngineError::ArchiveUnsafe(entry_name.to_string()));
            }
        }

        let created_at = Utc::now();
        let token = sanitize_name(name, self.config.max_folder_name_len);
        let stamp = created_at.format("%Y%m%d%H%M%S");
        fs::create_dir_all(&self.config.dict_root)?;
        let (folder, target) = self.create_unique_folder(&format!("{}_{}", token, stamp))?;

        match extract(&mut zip, &target).and_then(|_| discover(&target)) {
            Ok(layout) => {
                info!(
                    "Installed dictionary '{}' into {} (headword file {})",
                    name, folder, layout.headword_file
                );
                Ok(InstalledDictionary {
                    name: name.to_string(),
                    folder,
                    headword_file: layout.headword_file,
                    stylesheet_file: layout.stylesheet_file,
                    cover_file: layout.cover_file,
                    created_at,
                })
            }
            Err(e) => {
                warn!("Install of '{}' failed, removing {}: {}", name, target.display(), e);
                if let Err(cleanup) = fs::remove_dir_all(&target) {
                    warn!("Failed to remove {}: {}", target.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    /// Creates `<base>` under the root, or `<base>-<n>` if an install in the
    /// same second already took it.
    fn create_unique_folder(&self, base: &str) -> Result<(String, PathBuf)> {
        let mut attempt = 0u32;
        loop {
            let folder = if attempt == 0 {
                base.to_string()
            } else {
                format!("{}-{}", base, attempt)
            };
            let target = self.config.dict_root.join(&folder);
            match fs::create_dir(&target) {
                Ok(()) => return Ok((folder, target)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < 100 => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Deletes an installed folder. Missing folders are ignored; folder
    /// names that are not a single plain path segment are refused.
    pub fn remove_folder(&self, folder: &str) -> Result<()> {
        let mut components = Path::new(folder).components();
        let single_segment = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_segment {
            return Err(EngineError::PathTraversalRejected(folder.to_string()));
        }
        let target = self.config.dict_root.join(folder);
        match fs::remove_dir_all(&target) {
            Ok(()) => {
                info!("Removed dictionary folder {}", target.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn extract(zip: &mut ZipArchive<Cursor<&[u8]>>, target: &Path) -> Result<()> {
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| EngineError::ArchiveUnsafe(entry.name().to_string()))?;
        let out_path = target.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        let written = io::copy(&mut entry, &mut out)?;
        debug!("Extracted {} ({} bytes)", out_path.display(), written);
    }
    Ok(())
}
