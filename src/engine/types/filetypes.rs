//! Specialization logic for MDict container types (.mdx vs .mdd).

use std::path::Path;

use super::error::SourceResult;
use crate::engine::codec::ByteDecoder;
use crate::engine::index::{AssetIndex, HeadwordIndex};

/// Runtime tag passed to an [`EntrySource`](crate::engine::source::EntrySource)
/// so it knows which table to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Headword → definition records (`.mdx`).
    Headwords,
    /// Asset path → resource bytes (`.mdd`).
    Assets,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ContainerKind::Headwords => write!(f, "headword"),
            ContainerKind::Assets => write!(f, "asset"),
        }
    }
}

/// A trait that defines how one container type is indexed.
pub trait FileType: 'static {
    /// A short name used for debugging and logging.
    const DEBUG_NAME: &'static str;

    /// File extension (lowercase, without the dot).
    const EXTENSION: &'static str;

    /// Tag handed to the decoding adapter.
    const KIND: ContainerKind;

    /// The index built from one container of this type.
    type Index: Send + Sync + 'static;

    /// Builds the index from the adapter's `(key, value)` pairs.
    fn build_index<I>(entries: I, decoder: &ByteDecoder) -> SourceResult<Self::Index>
    where
        I: Iterator<Item = SourceResult<(Vec<u8>, Vec<u8>)>>;

    /// Whether `path` names a container of this type (case-insensitive extension).
    fn matches(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(Self::EXTENSION))
    }
}

/// Zero-cost marker struct for MDX files.
#[derive(Debug)]
pub struct Mdx;

impl FileType for Mdx {
    const DEBUG_NAME: &'static str = "MDX";
    const EXTENSION: &'static str = "mdx";
    const KIND: ContainerKind = ContainerKind::Headwords;
    type Index = HeadwordIndex;

    fn build_index<I>(entries: I, decoder: &ByteDecoder) -> SourceResult<Self::Index>
    where
        I: Iterator<Item = SourceResult<(Vec<u8>, Vec<u8>)>>,
    {
        HeadwordIndex::build(entries, decoder)
    }
}

/// Zero-cost marker struct for MDD files.
#[derive(Debug)]
pub struct Mdd;

impl FileType for Mdd {
    const DEBUG_NAME: &'static str = "MDD";
    const EXTENSION: &'static str = "mdd";
    const KIND: ContainerKind = ContainerKind::Assets;
    type Index = AssetIndex;

    fn build_index<I>(entries: I, decoder: &ByteDecoder) -> SourceResult<Self::Index>
    where
        I: Iterator<Item = SourceResult<(Vec<u8>, Vec<u8>)>>,
    {
        AssetIndex::build(entries, decoder)
    }
}
