//! In-memory indexes built from a single pass over a container.
//!
//! Both builders consume the adapter's `(key, value)` pairs exactly once and
//! fail as a whole on the first adapter error, so a partial index is never
//! produced.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use crate::engine::codec::ByteDecoder;
use crate::engine::types::error::SourceResult;

/// Locale-naive case folding used for case-insensitive headword matching.
pub fn casefold(text: &str) -> String {
    text.to_lowercase()
}

/// Headword → records index of one `.mdx` container.
///
/// `exact` keeps keys in source order and every record under a key in source
/// order, so homographs are never dropped. `casefold` maps each folded key to
/// the first original-case headword seen with that folding.
#[derive(Debug, Default, Clone)]
pub struct HeadwordIndex {
    exact: IndexMap<String, Vec<Vec<u8>>>,
    casefold: HashMap<String, String>,
    records: usize,
}

impl HeadwordIndex {
    pub fn build<I>(entries: I, decoder: &ByteDecoder) -> SourceResult<Self>
    where
        I: Iterator<Item = SourceResult<(Vec<u8>, Vec<u8>)>>,
    {
        let mut index = Self::default();
        for entry in entries {
            let (key_bytes, value) = entry?;
            let key = decoder.decode(&key_bytes).into_owned();
            index.insert(key, value);
        }
        Ok(index)
    }

    fn insert(&mut self, key: String, value: Vec<u8>) {
        let folded = casefold(&key);
        if !self.casefold.contains_key(&folded) {
            self.casefold.insert(folded, key.clone());
        }
        let records = self.exact.entry(key).or_default();
        records.push(value);
        self.records += 1;
        if records.len() > 1 {
            trace!("Duplicate headword record #{}", records.len());
        }
    }

    /// All records stored under exactly `headword`.
    pub fn get(&self, headword: &str) -> Option<&[Vec<u8>]> {
        self.exact.get(headword).map(Vec::as_slice)
    }

    /// The stored headword and its records, for exactly `headword`.
    pub fn get_entry(&self, headword: &str) -> Option<(&str, &[Vec<u8>])> {
        self.exact
            .get_key_value(headword)
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    /// The representative stored headword for the case-folded `headword`.
    pub fn canonical(&self, headword: &str) -> Option<&str> {
        self.casefold.get(&casefold(headword)).map(String::as_str)
    }

    /// Headwords in source order.
    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.exact.keys().map(String::as_str)
    }

    /// Number of distinct headwords.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Total number of records, duplicates included.
    pub fn record_count(&self) -> usize {
        self.records
    }
}

/// Normalizes a packed-asset key or requested asset path:
/// forward slashes, no leading `./`, no leading `/`.
pub fn normalize_asset_key(key: &str) -> String {
    let key = key.replace('\\', "/");
    let key = key.strip_prefix("./").unwrap_or(&key);
    key.trim_start_matches('/').to_string()
}

/// Asset path → bytes index of one `.mdd` container.
#[derive(Debug, Default, Clone)]
pub struct AssetIndex {
    assets: HashMap<String, Vec<u8>>,
}

impl AssetIndex {
    /// Builds the index; on a duplicate key the last value wins.
    pub fn build<I>(entries: I, decoder: &ByteDecoder) -> SourceResult<Self>
    where
        I: Iterator<Item = SourceResult<(Vec<u8>, Vec<u8>)>>,
    {
        let mut assets = HashMap::new();
        for entry in entries {
            let (key_bytes, value) = entry?;
            let key = normalize_asset_key(&decoder.decode(&key_bytes));
            trace!("Packed asset '{}' ({} bytes)", key, value.len());
            assets.insert(key, value);
        }
        Ok(Self { assets })
    }

    /// Looks up an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.assets.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
