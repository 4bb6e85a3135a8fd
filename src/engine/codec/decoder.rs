//! Best-effort byte → text decoding for headwords and records.
//!
//! Dictionaries are frequently authored in legacy encodings and do not always
//! declare them correctly, so decoding walks a fixed list of candidates and
//! keeps the first strict success:
//!
//! 1. UTF-8
//! 2. UTF-16 (BOM-detected, little-endian without a BOM)
//! 3. GB18030
//! 4. Big5
//! 5. Windows-1252 (single-byte, accepts any input)
//!
//! If every candidate rejects the input, the bytes are decoded as UTF-8 with
//! replacement characters so callers never see a decoding failure.

use std::borrow::Cow;

use encoding_rs::{Encoding, BIG5, GB18030, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Utf8,
    Utf16,
    Legacy(&'static Encoding),
}

impl Candidate {
    fn name(&self) -> &'static str {
        match self {
            Candidate::Utf8 => "UTF-8",
            Candidate::Utf16 => "UTF-16",
            Candidate::Legacy(encoding) => encoding.name(),
        }
    }

    fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Candidate::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Candidate::Utf16 => decode_utf16(bytes),
            Candidate::Legacy(encoding) => {
                encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

fn decode_utf16(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let (encoding, payload) = match Encoding::for_bom(bytes) {
        Some((enc, bom_len)) if enc == UTF_16LE || enc == UTF_16BE => (enc, &bytes[bom_len..]),
        _ => (UTF_16LE, bytes),
    };
    encoding.decode_without_bom_handling_and_without_replacement(payload)
}

/// Multi-encoding decoder shared by index building and rendering.
#[derive(Debug, Clone)]
pub struct ByteDecoder {
    chain: Vec<Candidate>,
}

impl Default for ByteDecoder {
    fn default() -> Self {
        Self {
            chain: vec![
                Candidate::Utf8,
                Candidate::Utf16,
                Candidate::Legacy(GB18030),
                Candidate::Legacy(BIG5),
                Candidate::Legacy(WINDOWS_1252),
            ],
        }
    }
}

impl ByteDecoder {
    /// Builds a decoder that tries `preferred` before the default chain.
    ///
    /// Unknown labels are ignored and the default chain is used unchanged.
    pub fn with_preferred(preferred: Option<&str>) -> Self {
        let mut decoder = Self::default();
        let Some(label) = preferred else {
            return decoder;
        };
        match parse_encoding(label) {
            Some(encoding) => {
                let candidate = if encoding == UTF_8 {
                    Candidate::Utf8
                } else if encoding == UTF_16LE || encoding == UTF_16BE {
                    Candidate::Utf16
                } else {
                    Candidate::Legacy(encoding)
                };
                decoder.chain.retain(|c| *c != candidate);
                decoder.chain.insert(0, candidate);
                debug!("Preferred text encoding: {}", candidate.name());
            }
            None => debug!("Ignoring unknown encoding label '{}'", label),
        }
        decoder
    }

    /// Decodes `bytes` with the first candidate that accepts them.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        for candidate in &self.chain {
            if let Some(text) = candidate.decode(bytes) {
                trace!("Decoded {} bytes as {}", bytes.len(), candidate.name());
                return text;
            }
        }
        trace!("No strict decoding for {} bytes, falling back to lossy UTF-8", bytes.len());
        String::from_utf8_lossy(bytes)
    }

    /// Decodes a definition record, dropping the NUL terminators MDict
    /// writers append to records.
    pub fn decode_record(&self, bytes: &[u8]) -> String {
        self.decode(bytes).trim_end_matches('\0').to_owned()
    }
}

/// Resolves an encoding label, accepting the aliases found in MDict headers
/// (`GBK`, `GB2312`, `UTF-16`, ...).
pub fn parse_encoding(label: &str) -> Option<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" => None,
        "utf-16" | "utf16" => Some(UTF_16LE),
        "gbk" | "gb2312" | "gb18030" => Some(GB18030),
        "big5" | "cp950" => Some(BIG5),
        "latin-1" | "latin1" => Some(WINDOWS_1252),
        other => Encoding::for_label(other.as_bytes()),
    }
}
