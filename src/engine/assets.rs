//! Asset resolution for the asset route.
//!
//! A requested path is served from the extracted files first and then from
//! every `.mdd` container in the dictionary folder, in walk order. Paths that
//! would leave the dictionary folder are rejected before any lookup.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};

use super::catalog::DictionaryCatalog;
use super::index::{normalize_asset_key, AssetIndex, CacheKey};
use super::install::walk_files;
use super::source::{build_index, EntrySource};
use super::types::error::{EngineError, Result};
use super::types::filetypes::{FileType, Mdd};
use super::types::models::{AssetOrigin, AssetPayload, DictId};
use super::DictEngine;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Guesses a MIME type from a file name's extension.
pub fn mime_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("html") | Some("htm") => "text/html",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") | Some("spx") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => DEFAULT_MIME,
    }
}

/// Normalizes a requested asset path: percent-decoding, forward slashes,
/// no query or fragment, no leading slash.
pub fn normalize_request_path(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let decoded = decoded.replace('\\', "/");
    let path = decoded.split(&['?', '#'][..]).next().unwrap_or_default();
    path.trim_start_matches('/').to_string()
}

/// Joins `relative` onto `base` lexically, refusing to step outside `base`.
pub fn confine(base: &Path, relative: &str) -> Result<PathBuf> {
    let mut out = base.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                out.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(EngineError::PathTraversalRejected(relative.to_string()));
            }
        }
    }
    Ok(out)
}

/// Index keys to probe for a requested path, in order, without duplicates.
pub fn key_variants(relative: &str) -> Vec<String> {
    let stripped = relative.trim_start_matches('/');
    let mut keys: Vec<String> = Vec::with_capacity(3);
    for variant in [relative.to_string(), stripped.to_string(), format!("/{}", stripped)] {
        let key = normalize_asset_key(&variant);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Packed-asset containers under `base`, in walk order.
pub fn packed_containers(base: &Path) -> Vec<PathBuf> {
    walk_files(base).filter(|p| Mdd::matches(p)).collect()
}

impl<S: EntrySource, C: DictionaryCatalog> DictEngine<S, C> {
    /// Returns the bytes and MIME type of `asset_path` inside dictionary `dict_id`.
    pub fn resolve_asset(&self, dict_id: DictId, asset_path: &str) -> Result<AssetPayload> {
        let dictionary = self.require_dictionary(dict_id)?;
        let relative = normalize_request_path(asset_path);
        let base = self.dictionary_dir(&dictionary.folder);
        let candidate = confine(&base, &relative)?;

        if candidate.is_file() {
            let real = fs::canonicalize(&candidate)?;
            let real_base = fs::canonicalize(&base)?;
            if !real.starts_with(&real_base) {
                return Err(EngineError::PathTraversalRejected(relative));
            }
            let bytes = fs::read(&real)?;
            trace!("Serving {} from disk ({} bytes)", real.display(), bytes.len());
            return Ok(AssetPayload {
                bytes,
                mime: mime_for(&relative),
                origin: AssetOrigin::Disk(real),
            });
        }

        let keys = key_variants(&relative);
        for container in packed_containers(&base) {
            let index = self.asset_index(dict_id, &container)?;
            for key in &keys {
                if let Some(bytes) = index.get(key) {
                    debug!("Serving '{}' from {}", key, container.display());
                    return Ok(AssetPayload {
                        bytes: bytes.to_vec(),
                        mime: mime_for(key),
                        origin: AssetOrigin::Packed {
                            container,
                            key: key.clone(),
                        },
                    });
                }
            }
        }

        Err(EngineError::AssetNotFound(relative))
    }

    /// Relative path of the stylesheet entries of `dict_id` should be
    /// rendered with, suitable for [`Routes::asset_url`](super::config::Routes::asset_url).
    ///
    /// Priority: the stylesheet recorded at install time, then the first
    /// extracted `.css` file, then a `.css` key inside a packed-asset
    /// container (preferring names containing `style`, then `main`, then the
    /// shortest).
    pub fn stylesheet_for(&self, dict_id: DictId) -> Result<Option<String>> {
        let dictionary = self.require_dictionary(dict_id)?;
        if let Some(recorded) = dictionary.stylesheet_file.as_deref() {
            return Ok(Some(normalize_asset_key(recorded)));
        }

        let base = self.dictionary_dir(&dictionary.folder);
        let on_disk = walk_files(&base).find(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
        });
        if let Some(path) = on_disk {
            if let Ok(relative) = path.strip_prefix(&base) {
                return Ok(Some(relative.to_string_lossy().replace('\\', "/")));
            }
        }

        for container in packed_containers(&base) {
            let index = self.asset_index(dict_id, &container)?;
            let mut css: Vec<&str> = index
                .keys()
                .filter(|k| k.to_ascii_lowercase().ends_with(".css"))
                .collect();
            css.sort_by_key(|k| {
                let lower = k.to_ascii_lowercase();
                (!lower.contains("style"), !lower.contains("main"), k.len(), k.to_string())
            });
            if let Some(first) = css.first() {
                return Ok(Some(first.to_string()));
            }
        }
        Ok(None)
    }

    fn asset_index(&self, dict_id: DictId, container: &Path) -> Result<Arc<AssetIndex>> {
        self.cache
            .assets
            .get_or_build(CacheKey::new(dict_id, container), || {
                build_index::<Mdd, _>(&self.source, container, &self.decoder)
            })
    }
}
