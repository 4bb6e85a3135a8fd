//! Rewrites resource references in record HTML to engine routes.
//!
//! Dictionary HTML points at resources with schemes only the desktop reader
//! understands (`sound://`, `entry://`, `bword://`, `file://`) or with paths
//! relative to the dictionary folder. Every `src`/`href` value is classified
//! and, where needed, redirected to the asset or entry route.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::config::EngineConfig;
use super::types::models::DictId;

static ATTR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn attr_regex() -> &'static Regex {
    ATTR_PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\b(src|href)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid attribute regex pattern")
    })
}

/// Where a referenced value should point after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Leave the attribute exactly as written.
    Keep,
    /// Serve through the asset route; holds the normalized relative path.
    Asset(String),
    /// Link to another headword of the same dictionary.
    Entry(String),
}

const PASSTHROUGH_PREFIXES: &[&str] = &["http://", "https://", "data:", "javascript:", "mailto:"];
const ENTRY_SCHEMES: &[&str] = &["entry://", "bword://"];
const SOUND_SCHEME: &str = "sound://";
const FILE_SCHEME: &str = "file://";

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

/// Classifies one attribute value.
pub fn classify_reference(raw: &str) -> Reference {
    let url = raw.trim();
    if url.is_empty() || url.starts_with('#') {
        return Reference::Keep;
    }
    if PASSTHROUGH_PREFIXES
        .iter()
        .any(|prefix| strip_prefix_ignore_case(url, prefix).is_some())
    {
        return Reference::Keep;
    }

    if let Some(rest) = strip_prefix_ignore_case(url, SOUND_SCHEME) {
        let path = rest.replace('\\', "/");
        return Reference::Asset(path.trim_start_matches('/').to_string());
    }

    for scheme in ENTRY_SCHEMES {
        if let Some(target) = strip_prefix_ignore_case(url, scheme) {
            return Reference::Entry(target.trim().to_string());
        }
    }

    let local = strip_prefix_ignore_case(url, FILE_SCHEME).unwrap_or(url);
    let local = local.replace('\\', "/");
    let local = local.split(&['?', '#'][..]).next().unwrap_or_default();
    let local = local.strip_prefix("./").unwrap_or(local);
    let local = local.trim_start_matches('/');
    if local.is_empty() {
        return Reference::Keep;
    }
    Reference::Asset(local.to_string())
}

/// Rewrites record HTML for one engine configuration.
#[derive(Debug, Clone)]
pub struct ContentRewriter<'c> {
    config: &'c EngineConfig,
}

impl<'c> ContentRewriter<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Rewrites every `src`/`href` value in `html` for `dict_id`.
    pub fn rewrite<'h>(&self, dict_id: DictId, html: &'h str) -> Cow<'h, str> {
        let routes = self.config.routes();
        attr_regex().replace_all(html, |cap: &Captures| {
            let (value, quote) = match (cap.get(2), cap.get(3)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return cap[0].to_string(),
            };
            let target = match classify_reference(value) {
                Reference::Keep => return cap[0].to_string(),
                Reference::Asset(path) => routes.asset_url(dict_id, &path),
                Reference::Entry(headword) => routes.entry_url(dict_id, &headword),
            };
            format!("{}={quote}{target}{quote}", &cap[1])
        })
    }
}
