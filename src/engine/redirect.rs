//! `@@@LINK=` redirect resolution.
//!
//! A record whose text contains `@@@LINK=target` stands for the records of
//! `target`. Resolution follows the first record of each target until it
//! reaches a regular record, then returns every record stored under the
//! headword it ended on, so homographs behind a redirect are kept.
//!
//! Resolution never fails: a missing target, an empty target, or a cycle
//! stops the walk and yields the record reached so far.

use std::collections::HashSet;
use std::sync::OnceLock;

use log::{trace, warn};
use regex::Regex;

use crate::engine::codec::ByteDecoder;
use crate::engine::index::HeadwordIndex;
use crate::engine::types::models::RecordData;

static LINK_PATTERN: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    LINK_PATTERN
        .get_or_init(|| Regex::new(r"@@@LINK=(.+)").expect("Invalid redirect regex pattern"))
}

/// Classifies decoded record text as content or redirect.
///
/// The target is trimmed of whitespace and NUL terminators; it may be empty.
pub fn classify(text: &str) -> RecordData<'_> {
    match link_regex().captures(text) {
        Some(cap) => {
            let target = cap[1].trim_matches(|c: char| c.is_whitespace() || c == '\0');
            RecordData::Redirect(target.to_string())
        }
        None => RecordData::Content(text),
    }
}

/// Final headword and records of one resolved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub headword: &'a str,
    pub records: Vec<&'a [u8]>,
}

/// Follows redirect chains inside one headword index.
#[derive(Debug, Clone)]
pub struct RedirectResolver<'d> {
    decoder: &'d ByteDecoder,
    max_depth: usize,
}

impl<'d> RedirectResolver<'d> {
    pub fn new(decoder: &'d ByteDecoder, max_depth: usize) -> Self {
        Self { decoder, max_depth }
    }

    /// Resolves `record`, found under `headword`, to its final records.
    pub fn resolve<'a>(
        &self,
        index: &'a HeadwordIndex,
        headword: &'a str,
        record: &'a [u8],
    ) -> Resolution<'a> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut head = headword;
        let mut current = record;
        let mut hops = 0;

        loop {
            if hops >= self.max_depth {
                warn!(
                    "Redirect chain from '{}' exceeded {} hops, stopping at '{}'",
                    headword, self.max_depth, head
                );
                return self.finish(index, head, current, hops);
            }

            let text = self.decoder.decode(current);
            let target = match classify(&text) {
                RecordData::Content(_) => return self.finish(index, head, current, hops),
                RecordData::Redirect(target) => target,
            };

            if target.is_empty() {
                warn!("Empty redirect target under '{}'", head);
                return single(head, current);
            }
            if !visited.insert(target.clone()) {
                warn!("Redirect cycle at '{}' -> '{}'", head, target);
                return single(head, current);
            }
            let Some((next_head, next_records)) = index.get_entry(&target) else {
                warn!("Broken redirect '{}' -> '{}'", head, target);
                return single(head, current);
            };
            let Some(first) = next_records.first() else {
                return single(head, current);
            };

            trace!("Redirect '{}' -> '{}'", head, next_head);
            head = next_head;
            current = first.as_slice();
            hops += 1;
        }
    }

    /// End of a chain: a record reached without following anything stands
    /// alone, otherwise every record under the final headword is returned.
    fn finish<'a>(
        &self,
        index: &'a HeadwordIndex,
        head: &'a str,
        current: &'a [u8],
        hops: usize,
    ) -> Resolution<'a> {
        if hops == 0 {
            return single(head, current);
        }
        match index.get(head) {
            Some(records) => Resolution {
                headword: head,
                records: records.iter().map(Vec::as_slice).collect(),
            },
            None => single(head, current),
        }
    }
}

fn single<'a>(headword: &'a str, record: &'a [u8]) -> Resolution<'a> {
    Resolution {
        headword,
        records: vec![record],
    }
}
