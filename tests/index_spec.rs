use mdict_engine::engine::index::{casefold, normalize_asset_key, AssetIndex, HeadwordIndex};
use mdict_engine::engine::types::error::SourceResult;
use mdict_engine::{ByteDecoder, SourceError};

fn pairs(records: &[(&str, &str)]) -> Vec<SourceResult<(Vec<u8>, Vec<u8>)>> {
    records
        .iter()
        .map(|(k, v)| Ok((k.as_bytes().to_vec(), v.as_bytes().to_vec())))
        .collect()
}

fn build(records: &[(&str, &str)]) -> HeadwordIndex {
    HeadwordIndex::build(pairs(records).into_iter(), &ByteDecoder::default())
        .unwrap_or_else(|e| panic!("build failed: {}", e))
}

#[test]
fn duplicate_headwords_keep_every_record_in_order() {
    let index = build(&[
        ("bank", "river side"),
        ("alpha", "first letter"),
        ("bank", "money house"),
        ("bank", "to tilt"),
    ]);

    let records: Vec<&[u8]> = index
        .get("bank")
        .expect("bank present")
        .iter()
        .map(Vec::as_slice)
        .collect();
    assert_eq!(
        records,
        vec![&b"river side"[..], &b"money house"[..], &b"to tilt"[..]]
    );
    assert_eq!(index.len(), 2);
    assert_eq!(index.record_count(), 4);
    assert_eq!(index.headwords().collect::<Vec<_>>(), vec!["bank", "alpha"]);
}

#[test]
fn casefold_keeps_first_seen_representative() {
    let index = build(&[("Apple", "titlecase"), ("APPLE", "uppercase"), ("apple", "lowercase")]);

    assert_eq!(index.canonical("aPpLe"), Some("Apple"));
    // Exact keys are never folded.
    assert_eq!(index.get("APPLE").map(|r| r.len()), Some(1));
    assert_eq!(index.get("apple").map(|r| r.len()), Some(1));
    assert!(index.get("ApPlE").is_none());
}

#[test]
fn every_headword_folds_to_a_stored_headword() {
    let index = build(&[
        ("I", "pronoun"),
        ("i", "letter"),
        ("Ärger", "anger"),
        ("ärger", "lowercase"),
        ("中文", "chinese"),
        ("me", "@@@LINK=I"),
    ]);

    for headword in index.headwords() {
        let canonical = index
            .canonical(&casefold(headword))
            .unwrap_or_else(|| panic!("no casefold entry for {}", headword));
        assert!(
            index.get(canonical).is_some(),
            "casefold target {} of {} missing from exact index",
            canonical,
            headword
        );
    }
}

#[test]
fn adapter_error_fails_the_whole_build() {
    let entries: Vec<SourceResult<(Vec<u8>, Vec<u8>)>> = vec![
        Ok((b"a".to_vec(), b"1".to_vec())),
        Err(SourceError::InvalidFormat("bad block".to_string())),
        Ok((b"b".to_vec(), b"2".to_vec())),
    ];
    let result = HeadwordIndex::build(entries.into_iter(), &ByteDecoder::default());
    assert!(matches!(result, Err(SourceError::InvalidFormat(_))));
}

#[test]
fn asset_keys_are_normalized_and_last_write_wins() {
    let entries: Vec<SourceResult<(Vec<u8>, Vec<u8>)>> = vec![
        Ok((b"\\images\\cat.png".to_vec(), b"old".to_vec())),
        Ok((b"./sounds/a.mp3".to_vec(), b"mp3".to_vec())),
        Ok((b"/images/cat.png".to_vec(), b"new".to_vec())),
    ];
    let index = AssetIndex::build(entries.into_iter(), &ByteDecoder::default())
        .unwrap_or_else(|e| panic!("build failed: {}", e));

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("images/cat.png"), Some(&b"new"[..]));
    assert_eq!(index.get("sounds/a.mp3"), Some(&b"mp3"[..]));
}

#[test]
fn normalize_asset_key_variants() {
    assert_eq!(normalize_asset_key("images/cat.png"), "images/cat.png");
    assert_eq!(normalize_asset_key("/images/cat.png"), "images/cat.png");
    assert_eq!(normalize_asset_key("./images/cat.png"), "images/cat.png");
    assert_eq!(normalize_asset_key("\\images\\cat.png"), "images/cat.png");
    assert_eq!(normalize_asset_key("//double.css"), "double.css");
}
