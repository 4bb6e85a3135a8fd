//! Headword lookup.
//!
//! A query is matched exactly first and then through the case-folded index.
//! Every record under the matched headword is resolved through redirects,
//! decoded, rewritten and returned in index order. Records reached twice
//! (two redirect chains converging on the same record) are only returned once.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use twox_hash::XxHash64;

use super::catalog::DictionaryCatalog;
use super::index::{CacheKey, HeadwordIndex};
use super::redirect::RedirectResolver;
use super::rewrite::ContentRewriter;
use super::source::{build_index, EntrySource};
use super::types::error::{EngineError, Result};
use super::types::filetypes::Mdx;
use super::types::models::{DictId, EntryResult, LookupResult};
use super::DictEngine;

impl<S: EntrySource, C: DictionaryCatalog> DictEngine<S, C> {
    /// Looks `word` up in dictionary `dict_id`.
    ///
    /// # Errors
    /// - [`EngineError::EmptyQuery`] if `word` is blank
    /// - [`EngineError::DictionaryNotFound`] if the id is unknown
    /// - [`EngineError::SourceFileMissing`] if the headword file is gone
    /// - [`EngineError::DecodeFailure`] if the headword index cannot be built
    ///
    /// A word that is not in the dictionary is not an error; the result has
    /// `found == false`.
    pub fn lookup(&self, dict_id: DictId, word: &str) -> Result<LookupResult> {
        let word = word.trim();
        if word.is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let dictionary = self.require_dictionary(dict_id)?;
        let path = self.headword_path(&dictionary);
        if !path.is_file() {
            return Err(EngineError::SourceFileMissing(path));
        }

        let index = self.headword_index(dict_id, &path)?;
        let Some((lookup_key, records)) = match_headword(&index, word) else {
            debug!("No entry for '{}' in dictionary {}", word, dict_id);
            return Ok(LookupResult::miss(word));
        };

        let resolver = RedirectResolver::new(&self.decoder, self.config.max_redirect_depth);
        let rewriter = ContentRewriter::new(&self.config);
        let mut seen: HashSet<(&str, u64)> = HashSet::new();
        let mut entries = Vec::new();

        for record in records {
            let resolution = resolver.resolve(&index, lookup_key, record);
            for raw in resolution.records {
                if !seen.insert((resolution.headword, XxHash64::oneshot(0, raw))) {
                    continue;
                }
                let text = self.decoder.decode_record(raw);
                entries.push(EntryResult {
                    headword: resolution.headword.to_string(),
                    html: rewriter.rewrite(dict_id, &text).into_owned(),
                });
            }
        }

        Ok(LookupResult {
            found: true,
            lookup_key: lookup_key.to_string(),
            entries,
        })
    }

    /// The headword index of dictionary `dict_id`, built on first use.
    pub(crate) fn headword_index(
        &self,
        dict_id: DictId,
        path: &Path,
    ) -> Result<Arc<HeadwordIndex>> {
        self.cache
            .headwords
            .get_or_build(CacheKey::new(dict_id, path), || {
                build_index::<Mdx, _>(&self.source, path, &self.decoder)
            })
    }
}

/// Exact match, then the case-insensitive fallback.
fn match_headword<'a>(index: &'a HeadwordIndex, word: &str) -> Option<(&'a str, Vec<&'a [u8]>)> {
    let (key, records) = match index.get_entry(word) {
        Some(found) => found,
        None => {
            let canonical = index.canonical(word)?;
            debug!("Case-insensitive match '{}' -> '{}'", word, canonical);
            index.get_entry(canonical)?
        }
    };
    if records.is_empty() {
        return None;
    }
    Some((key, records.iter().map(Vec::as_slice).collect()))
}
