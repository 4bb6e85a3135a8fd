use mdict_engine::engine::codec::{parse_encoding, ByteDecoder};

#[test]
fn utf8_is_tried_first() {
    let decoder = ByteDecoder::default();
    assert_eq!(decoder.decode("café".as_bytes()), "café");
    assert_eq!(decoder.decode("中文-key".as_bytes()), "中文-key");
}

#[test]
fn utf16_with_bom_is_detected() {
    let decoder = ByteDecoder::default();
    // BOM + "hi" in UTF-16LE; the 0xFF lead byte makes it invalid UTF-8.
    let le = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
    assert_eq!(decoder.decode(&le), "hi");
    let be = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
    assert_eq!(decoder.decode(&be), "hi");
}

#[test]
fn gb18030_handles_odd_length_legacy_bytes() {
    let decoder = ByteDecoder::default();
    // "中a" in GBK: not UTF-8, and odd length rules out UTF-16.
    let bytes = [0xD6, 0xD0, b'a'];
    assert_eq!(decoder.decode(&bytes), "中a");
}

#[test]
fn preferred_encoding_is_tried_before_the_default_chain() {
    // "中文" in GBK has even length and would otherwise decode as UTF-16.
    let bytes = [0xD6, 0xD0, 0xCE, 0xC4];
    let default = ByteDecoder::default();
    assert_ne!(default.decode(&bytes), "中文");

    let gbk = ByteDecoder::with_preferred(Some("GBK"));
    assert_eq!(gbk.decode(&bytes), "中文");
}

#[test]
fn unknown_preferred_label_keeps_default_chain() {
    let decoder = ByteDecoder::with_preferred(Some("klingon-8"));
    assert_eq!(decoder.decode(b"plain"), "plain");
}

#[test]
fn single_byte_fallback_never_fails() {
    let decoder = ByteDecoder::default();
    // BOM followed by a dangling byte: not UTF-8, not valid UTF-16,
    // not GB18030, not Big5.
    let bytes = [0xFF, 0xFE, 0x00];
    assert_eq!(decoder.decode(&bytes), "ÿþ\u{0}");
}

#[test]
fn decode_record_strips_nul_terminators() {
    let decoder = ByteDecoder::default();
    assert_eq!(decoder.decode_record(b"<p>body</p>\0\0"), "<p>body</p>");
}

#[test]
fn encoding_labels_from_dictionary_headers() {
    assert_eq!(parse_encoding("GBK"), Some(encoding_rs::GB18030));
    assert_eq!(parse_encoding("gb2312"), Some(encoding_rs::GB18030));
    assert_eq!(parse_encoding("UTF-16"), Some(encoding_rs::UTF_16LE));
    assert_eq!(parse_encoding(" utf-8 "), Some(encoding_rs::UTF_8));
    assert_eq!(parse_encoding("cp950"), Some(encoding_rs::BIG5));
    assert_eq!(parse_encoding(""), None);
}
