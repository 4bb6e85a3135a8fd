//! Engine configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! dict_root = "/srv/dictionaries"
//! asset_route = "/dict_asset"
//! headword_cache_capacity = 16
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::types::error::{EngineError, Result};
use super::types::models::{DictId, EntryQuery};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Folder holding one sub-folder per installed dictionary.
    pub dict_root: PathBuf,
    /// Route prefix under which assets are served.
    pub asset_route: String,
    /// Route of the entry lookup page.
    pub entry_route: String,
    /// Maximum number of resident headword indexes.
    pub headword_cache_capacity: u64,
    /// Maximum number of resident packed-asset indexes.
    pub asset_cache_capacity: u64,
    /// Maximum number of redirect hops followed per record.
    pub max_redirect_depth: usize,
    /// Minimum length of a dictionary display name.
    pub min_name_len: usize,
    /// Maximum length of the sanitized name part of a folder.
    pub max_folder_name_len: usize,
    /// Encoding label tried before the built-in decoding chain.
    pub preferred_encoding: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dict_root: PathBuf::from("dictionaries"),
            asset_route: "/dict_asset".to_string(),
            entry_route: "/dictionary/entry".to_string(),
            headword_cache_capacity: 8,
            asset_cache_capacity: 32,
            max_redirect_depth: 10,
            min_name_len: 2,
            max_folder_name_len: 80,
            preferred_encoding: None,
        }
    }
}

impl EngineConfig {
    /// Default configuration rooted at `dict_root`.
    pub fn with_root(dict_root: impl Into<PathBuf>) -> Self {
        Self {
            dict_root: dict_root.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validated()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    fn validated(mut self) -> Result<Self> {
        if self.headword_cache_capacity == 0 || self.asset_cache_capacity == 0 {
            return Err(EngineError::Config("cache capacities must be at least 1".to_string()));
        }
        self.asset_route = normalize_route(&self.asset_route);
        self.entry_route = normalize_route(&self.entry_route);
        Ok(self)
    }

    /// Route helpers bound to this configuration.
    pub fn routes(&self) -> Routes<'_> {
        Routes { config: self }
    }
}

/// Single leading slash, no trailing slash.
fn normalize_route(route: &str) -> String {
    format!("/{}", route.trim().trim_matches('/'))
}

/// Builds the URLs the engine hands to the HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct Routes<'a> {
    config: &'a EngineConfig,
}

impl Routes<'_> {
    /// `/<asset-route>/<dict_id>/<relative_path>`; `relative_path` must
    /// already be normalized.
    pub fn asset_url(&self, dict_id: DictId, relative_path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.asset_route.trim_end_matches('/'),
            dict_id,
            relative_path
        )
    }

    /// `/<entry-route>?dict_id=<id>&q=<url-encoded headword>`.
    pub fn entry_url(&self, dict_id: DictId, headword: &str) -> String {
        format!(
            "{}?dict_id={}&q={}",
            self.config.entry_route,
            dict_id,
            urlencoding::encode(headword)
        )
    }
}

impl EntryQuery {
    /// Parses the query string of an entry URL (with or without the leading `?`).
    ///
    /// Returns `None` if `dict_id` or `q` is missing or `dict_id` is not a number.
    /// Other parameters are ignored.
    pub fn parse(query: &str) -> Option<Self> {
        serde_urlencoded::from_str(query.trim_start_matches('?')).ok()
    }
}
