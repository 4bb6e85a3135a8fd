//! The decoding adapter seam.
//!
//! The engine never parses container bytes itself. An [`EntrySource`] turns a
//! container path into the unordered `(key, value)` pairs of its headword or
//! packed-asset table; everything above this trait works on those pairs only.

use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::engine::codec::ByteDecoder;
use crate::engine::types::error::SourceResult;
use crate::engine::types::filetypes::{ContainerKind, FileType};

/// One raw `(key, value)` pair as stored in a container.
pub type RawEntry = (Vec<u8>, Vec<u8>);

/// Single-pass enumeration of a container's pairs, in container order.
pub type Entries<'a> = Box<dyn Iterator<Item = SourceResult<RawEntry>> + 'a>;

/// A container decoder.
///
/// Implementations must be safe to call again for the same path; every index
/// build opens a fresh enumeration.
pub trait EntrySource: Send + Sync {
    fn entries(&self, path: &Path, kind: ContainerKind) -> SourceResult<Entries<'_>>;
}

impl<S: EntrySource + ?Sized> EntrySource for Arc<S> {
    fn entries(&self, path: &Path, kind: ContainerKind) -> SourceResult<Entries<'_>> {
        (**self).entries(path, kind)
    }
}

impl<S: EntrySource + ?Sized> EntrySource for Box<S> {
    fn entries(&self, path: &Path, kind: ContainerKind) -> SourceResult<Entries<'_>> {
        (**self).entries(path, kind)
    }
}

/// Enumerates `path` through `source` and builds its `T` index.
pub fn build_index<T, S>(source: &S, path: &Path, decoder: &ByteDecoder) -> SourceResult<T::Index>
where
    T: FileType,
    S: EntrySource + ?Sized,
{
    debug!("Enumerating {} container {}", T::DEBUG_NAME, path.display());
    let entries = source.entries(path, T::KIND)?;
    T::build_index(entries, decoder)
}
