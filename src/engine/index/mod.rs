//! Headword and packed-asset indexes, and their shared cache.

pub mod builder;
pub mod cache;

pub use builder::{casefold, normalize_asset_key, AssetIndex, HeadwordIndex};
pub use cache::{CacheKey, CacheStats, IndexCache, TypedCache};
