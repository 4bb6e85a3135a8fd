//! Codec layer for text decoding.
//!
//! # Submodules
//!
//! - [`decoder`][]: Multi-encoding byte decoding with a lossy fallback

pub mod decoder;

pub use decoder::{parse_encoding, ByteDecoder};
