//! Dictionary lookup and resolution engine.
//!
//! [`DictEngine`] ties the stages together:
//!
//! ```text
//! install -> dictionary folder -> EntrySource -> index builder -> IndexCache
//!                                                                    |
//!        HTTP layer <- ContentRewriter <- RedirectResolver <- lookup
//!        HTTP layer <- resolve_asset (disk, then packed containers)
//! ```
//!
//! The container decoder ([`EntrySource`]) and the metadata store
//! ([`DictionaryCatalog`]) are supplied by the caller.

pub mod assets;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod index;
pub mod install;
pub mod redirect;
pub mod rewrite;
pub mod source;
pub mod types;
mod lookup;

use std::path::{Path, PathBuf};

use log::{info, warn};

pub use catalog::{DictionaryCatalog, MemoryCatalog};
pub use codec::ByteDecoder;
pub use config::EngineConfig;
pub use index::{CacheStats, IndexCache};
pub use source::EntrySource;
pub use types::error::{EngineError, Result, SourceError, SourceResult};
pub use types::filetypes::{ContainerKind, FileType, Mdd, Mdx};
pub use types::models::*;

use install::Installer;

/// The lookup engine for one dictionary root.
///
/// Safe to share between threads; all shared state lives in the index cache.
pub struct DictEngine<S, C> {
    config: EngineConfig,
    source: S,
    catalog: C,
    decoder: ByteDecoder,
    cache: IndexCache,
}

impl<S: EntrySource, C: DictionaryCatalog> DictEngine<S, C> {
    pub fn new(config: EngineConfig, source: S, catalog: C) -> Self {
        let decoder = ByteDecoder::with_preferred(config.preferred_encoding.as_deref());
        let cache = IndexCache::new(config.headword_cache_capacity, config.asset_cache_capacity);
        Self {
            config,
            source,
            catalog,
            decoder,
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Build/hit/eviction counters of the headword index cache.
    pub fn headword_cache_stats(&self) -> CacheStats {
        self.cache.headwords.stats()
    }

    /// Build/hit/eviction counters of the packed-asset index cache.
    pub fn asset_cache_stats(&self) -> CacheStats {
        self.cache.assets.stats()
    }

    pub fn index_cache(&self) -> &IndexCache {
        &self.cache
    }

    /// All installed dictionaries, ordered by name.
    pub fn dictionaries(&self) -> Result<Vec<Dictionary>> {
        self.catalog.list()
    }

    /// Metadata of `dict_id`.
    pub fn dictionary(&self, dict_id: DictId) -> Result<Dictionary> {
        self.require_dictionary(dict_id)
    }

    /// Installs an uploaded archive and registers it in the catalog.
    pub fn install(&self, name: &str, archive: &[u8]) -> Result<Dictionary> {
        let installer = Installer::new(&self.config);
        let installed = installer.install(name, archive)?;
        let folder = installed.folder.clone();
        match self.catalog.register(installed) {
            Ok(dictionary) => {
                info!("Registered dictionary {} '{}'", dictionary.id, dictionary.name);
                Ok(dictionary)
            }
            Err(e) => {
                warn!("Registering '{}' failed, removing folder: {}", folder, e);
                if let Err(cleanup) = installer.remove_folder(&folder) {
                    warn!("Failed to remove {}: {}", folder, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Removes `dict_id` from the catalog, its folder from disk and its
    /// indexes from the cache. Unknown ids are ignored.
    pub fn uninstall(&self, dict_id: DictId) -> Result<()> {
        let Some(dictionary) = self.catalog.remove(dict_id)? else {
            return Ok(());
        };
        self.cache.invalidate_dictionary(dict_id);
        Installer::new(&self.config).remove_folder(&dictionary.folder)
    }

    fn require_dictionary(&self, dict_id: DictId) -> Result<Dictionary> {
        self.catalog
            .get(dict_id)?
            .ok_or(EngineError::DictionaryNotFound(dict_id))
    }

    /// Absolute folder of an installed dictionary.
    fn dictionary_dir(&self, folder: &str) -> PathBuf {
        let dir = self.config.dict_root.join(folder);
        std::path::absolute(&dir).unwrap_or(dir)
    }

    /// Absolute path of the headword file of `dictionary`.
    pub fn headword_path(&self, dictionary: &Dictionary) -> PathBuf {
        self.dictionary_dir(&dictionary.folder)
            .join(Path::new(&dictionary.headword_file))
    }
}

impl<S, C> std::fmt::Debug for DictEngine<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictEngine")
            .field("dict_root", &self.config.dict_root)
            .field("cache", &self.cache)
            .finish()
    }
}
