//! # mdict-engine
//!
//! Lookup and resolution engine for installed MDict dictionaries.
//!
//! Turns the raw `(key, value)` pairs of `.mdx`/`.mdd` containers into
//! queryable indexes, follows `@@@LINK=` redirects, rewrites resource
//! references in entry HTML to servable routes, resolves assets from disk or
//! packed containers, and installs zip-packaged dictionaries safely.
//!
//! Container decoding itself is delegated to an [`EntrySource`].
pub mod engine;

// Re-export the main types for convenience
pub use engine::{
    ByteDecoder,
    CacheStats,
    ContainerKind,
    DictEngine,
    DictionaryCatalog,
    EngineConfig,
    EngineError,
    EntrySource,
    MemoryCatalog,
    Result,
    SourceError,
    types::models::{
        AssetOrigin,
        AssetPayload,
        DictId,
        Dictionary,
        EntryQuery,
        EntryResult,
        InstalledDictionary,
        LookupResult,
        RecordData,
    },
};
