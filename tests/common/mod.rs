//! Shared fixtures: an in-memory decoding adapter, temporary dictionary
//! roots and zip archive builders.

#![allow(dead_code)] // Not every test file uses every helper

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use mdict_engine::engine::source::{Entries, RawEntry};
use mdict_engine::{
    ContainerKind, DictEngine, DictId, Dictionary, EngineConfig, EntrySource, MemoryCatalog,
    SourceError,
};
use mdict_engine::engine::types::error::SourceResult;
use tempfile::TempDir;

/// Decoding adapter double serving synthetic `(key, value)` pairs.
#[derive(Debug, Default)]
pub struct MemorySource {
    containers: Mutex<HashMap<(PathBuf, ContainerKind), Vec<RawEntry>>>,
    failing: Mutex<HashSet<PathBuf>>,
    builds: AtomicUsize,
    delay: Duration,
}

impl MemorySource {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn add(&self, path: &Path, kind: ContainerKind, entries: Vec<RawEntry>) {
        self.containers
            .lock()
            .unwrap()
            .insert((path.to_path_buf(), kind), entries);
    }

    pub fn set_failing(&self, path: &Path, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(path.to_path_buf());
        } else {
            set.remove(path);
        }
    }

    /// Number of enumerations started so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl EntrySource for MemorySource {
    fn entries(&self, path: &Path, kind: ContainerKind) -> SourceResult<Entries<'_>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.failing.lock().unwrap().contains(path) {
            return Err(SourceError::InvalidFormat(format!(
                "corrupt container {}",
                path.display()
            )));
        }
        let entries = self
            .containers
            .lock()
            .unwrap()
            .get(&(path.to_path_buf(), kind))
            .cloned()
            .ok_or_else(|| {
                SourceError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no {} container at {}", kind, path.display()),
                ))
            })?;
        Ok(Box::new(entries.into_iter().map(Ok)))
    }
}

pub type TestEngine = DictEngine<Arc<MemorySource>, MemoryCatalog>;

/// A temporary dictionary root with an engine over a [`MemorySource`].
pub struct Fixture {
    pub root: TempDir,
    pub source: Arc<MemorySource>,
    pub engine: TestEngine,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(MemorySource::default(), |_| {})
    }

    pub fn with(source: MemorySource, tweak: impl FnOnce(&mut EngineConfig)) -> Self {
        let root = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {}", e));
        let mut config = EngineConfig::with_root(root.path());
        tweak(&mut config);
        let source = Arc::new(source);
        let engine = DictEngine::new(config, Arc::clone(&source), MemoryCatalog::new());
        Self {
            root,
            source,
            engine,
        }
    }

    pub fn folder_path(&self, folder: &str) -> PathBuf {
        self.root.path().join(folder)
    }

    /// Registers dictionary `id` stored in `folder`, with an on-disk
    /// placeholder headword file and the given text records.
    pub fn add_dictionary(&self, id: DictId, folder: &str, records: &[(&str, &str)]) -> PathBuf {
        let raw = records
            .iter()
            .map(|(k, v)| (k.as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect();
        self.add_raw_dictionary(id, folder, raw)
    }

    pub fn add_raw_dictionary(&self, id: DictId, folder: &str, records: Vec<RawEntry>) -> PathBuf {
        let dir = self.folder_path(folder);
        fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("create {}: {}", dir.display(), e));
        let headword_file = format!("{}.mdx", folder);
        let path = dir.join(&headword_file);
        fs::write(&path, b"").unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
        self.source.add(&path, ContainerKind::Headwords, records);
        self.engine
            .catalog()
            .insert(Dictionary {
                id,
                name: folder.to_string(),
                folder: folder.to_string(),
                headword_file,
                stylesheet_file: None,
                cover_file: None,
                created_at: Utc::now(),
            })
            .unwrap_or_else(|e| panic!("catalog insert: {}", e));
        path
    }

    /// Adds a packed-asset container `file_name` inside `folder`.
    pub fn add_packed(&self, folder: &str, file_name: &str, assets: &[(&str, &[u8])]) -> PathBuf {
        let path = self.folder_path(folder).join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("create {}: {}", parent.display(), e));
        }
        fs::write(&path, b"").unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
        let raw = assets
            .iter()
            .map(|(k, v)| (k.as_bytes().to_vec(), v.to_vec()))
            .collect();
        self.source.add(&path, ContainerKind::Assets, raw);
        path
    }

    pub fn write_file(&self, folder: &str, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.folder_path(folder).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("create {}: {}", parent.display(), e));
        }
        fs::write(&path, bytes).unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
        path
    }

    /// Names of the folders currently under the root.
    pub fn folders(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root.path())
            .unwrap_or_else(|e| panic!("read root: {}", e))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Builds an in-memory zip archive (stored, uncompressed).
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in files {
        writer
            .start_file(*name, options)
            .unwrap_or_else(|e| panic!("start {}: {}", name, e));
        writer
            .write_all(data)
            .unwrap_or_else(|e| panic!("write {}: {}", name, e));
    }
    writer
        .finish()
        .unwrap_or_else(|e| panic!("finish zip: {}", e))
        .into_inner()
}
