//! Dictionary metadata storage seam.
//!
//! The engine only reads metadata during lookups; it writes through
//! [`DictionaryCatalog::register`] and [`DictionaryCatalog::remove`] when
//! installing or uninstalling.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::types::error::{EngineError, Result};
use super::types::models::{DictId, Dictionary, InstalledDictionary};

pub trait DictionaryCatalog: Send + Sync {
    fn get(&self, id: DictId) -> Result<Option<Dictionary>>;

    /// All dictionaries, ordered by name.
    fn list(&self) -> Result<Vec<Dictionary>>;

    /// Stores a freshly installed dictionary and assigns its id.
    fn register(&self, installed: InstalledDictionary) -> Result<Dictionary>;

    /// Forgets `id`, returning the removed record if there was one.
    fn remove(&self, id: DictId) -> Result<Option<Dictionary>>;
}

/// Thread-safe in-memory catalog with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogState>,
}

#[derive(Debug, Default)]
struct CatalogState {
    next_id: DictId,
    dictionaries: BTreeMap<DictId, Dictionary>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record with a caller-chosen id, replacing any existing one.
    pub fn insert(&self, dictionary: Dictionary) -> Result<()> {
        let mut state = self.inner.write().map_err(|_| EngineError::LockPoisoned)?;
        state.next_id = state.next_id.max(dictionary.id);
        state.dictionaries.insert(dictionary.id, dictionary);
        Ok(())
    }
}

impl DictionaryCatalog for MemoryCatalog {
    fn get(&self, id: DictId) -> Result<Option<Dictionary>> {
        let state = self.inner.read().map_err(|_| EngineError::LockPoisoned)?;
        Ok(state.dictionaries.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Dictionary>> {
        let state = self.inner.read().map_err(|_| EngineError::LockPoisoned)?;
        let mut all: Vec<Dictionary> = state.dictionaries.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    fn register(&self, installed: InstalledDictionary) -> Result<Dictionary> {
        let mut state = self.inner.write().map_err(|_| EngineError::LockPoisoned)?;
        state.next_id += 1;
        let dictionary = installed.into_dictionary(state.next_id);
        state.dictionaries.insert(dictionary.id, dictionary.clone());
        Ok(dictionary)
    }

    fn remove(&self, id: DictId) -> Result<Option<Dictionary>> {
        let mut state = self.inner.write().map_err(|_| EngineError::LockPoisoned)?;
        Ok(state.dictionaries.remove(&id))
    }
}
