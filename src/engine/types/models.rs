//! Core data structures shared across the engine.
//!
//! - Dictionary metadata as stored by the catalog
//! - Lookup results handed to the rendering layer
//! - Record classification (content vs. redirect)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier assigned to a dictionary by the catalog.
pub type DictId = i64;

/// Metadata of an installed dictionary.
///
/// All file names are relative to `folder`, which itself is relative to the
/// configured dictionary root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub id: DictId,
    pub name: String,
    pub folder: String,
    pub headword_file: String,
    pub stylesheet_file: Option<String>,
    pub cover_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the installer produced, before the catalog assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDictionary {
    pub name: String,
    pub folder: String,
    pub headword_file: String,
    pub stylesheet_file: Option<String>,
    pub cover_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InstalledDictionary {
    /// Attaches a catalog id.
    pub fn into_dictionary(self, id: DictId) -> Dictionary {
        Dictionary {
            id,
            name: self.name,
            folder: self.folder,
            headword_file: self.headword_file,
            stylesheet_file: self.stylesheet_file,
            cover_file: self.cover_file,
            created_at: self.created_at,
        }
    }
}

/// One rendered record of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryResult {
    /// The headword the record was finally found under, after redirects.
    pub headword: String,
    /// Record HTML with resource references rewritten to engine routes.
    pub html: String,
}

/// Outcome of a headword lookup.
///
/// A miss is `found == false` with no entries; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub found: bool,
    /// The headword actually matched, which may differ in case from the query.
    pub lookup_key: String,
    pub entries: Vec<EntryResult>,
}

impl LookupResult {
    pub(crate) fn miss(query: &str) -> Self {
        Self {
            found: false,
            lookup_key: query.to_string(),
            entries: Vec::new(),
        }
    }

    /// The entry callers render as the primary match.
    pub fn primary(&self) -> Option<&EntryResult> {
        self.entries.first()
    }
}

/// Classification of a decoded headword record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData<'a> {
    /// Regular definition content.
    Content(&'a str),
    /// An `@@@LINK=` marker pointing at another headword.
    Redirect(String),
}

/// Bytes of a resolved asset together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPayload {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    /// Where the bytes came from, for diagnostics.
    pub origin: AssetOrigin,
}

/// Where an asset was served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
    /// An extracted file inside the dictionary folder.
    Disk(PathBuf),
    /// A key inside a packed-asset container.
    Packed { container: PathBuf, key: String },
}

/// Query parameters of the entry route (`?dict_id=..&q=..`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryQuery {
    pub dict_id: DictId,
    pub q: String,
}
