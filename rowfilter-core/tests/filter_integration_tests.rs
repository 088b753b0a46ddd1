// rowfilter-core/tests/filter_integration_tests.rs
//! End-to-end decisions: configuration in, forward/drop out.

use anyhow::Result;
use test_log::test;

use rowfilter_core::{
    convert_to_utf8, parse_key, EventFilter, Filter, FilterConfig, KeyFormat, OpType, RowEvent,
    SourceEncoding,
};

fn config(key_prefix: &str, key_pattern: &str, value_pattern: &str) -> FilterConfig {
    FilterConfig {
        key_prefix: key_prefix.to_string(),
        key_pattern: key_pattern.to_string(),
        value_pattern: value_pattern.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_prefix_and_value_pattern_scenario() -> Result<()> {
    let filter = config(r"\x00", "", "^foo").compile()?;
    let key = [0x00, 0x01];

    assert!(filter.event_match(&RowEvent::put(&key, b"foobar")));
    assert!(!filter.event_match(&RowEvent::put(&key, b"barfoo")));
    assert!(filter.event_match(&RowEvent::new(OpType::Delete, &key, b"")));
    Ok(())
}

#[test]
fn test_escaped_key_and_latin1_text_round_trip() -> Result<()> {
    let bytes = parse_key(KeyFormat::Escaped, r"\x41\x42")?;
    assert_eq!(bytes, vec![0x41, 0x42]);
    assert_eq!(convert_to_utf8(&bytes, SourceEncoding::latin1()), "AB");
    Ok(())
}

#[test]
fn test_validation_rejects_unbalanced_group() {
    let err = config("", "(", "").validate().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("invalid key-pattern: "), "{}", message);
    assert!(message.len() > "invalid key-pattern: ".len());
}

#[test]
fn test_all_rules_combined() -> Result<()> {
    let filter = config(r"t\x80_", r"^t€_\d+_r$", "status=(active|pending)").compile()?;

    let key = b"t\x80_42_r";
    assert!(filter.event_match(&RowEvent::put(key, b"id=1;status=active")));
    assert!(!filter.event_match(&RowEvent::put(key, b"id=1;status=closed")));
    assert!(filter.event_match(&RowEvent::delete(key)));
    // Prefix matches, pattern does not.
    assert!(!filter.event_match(&RowEvent::delete(b"t\x80_x_r")));
    // Pattern would match after decoding, prefix does not.
    assert!(!filter.event_match(&RowEvent::delete(b"t\xe2\x82\xac_42_r")));
    Ok(())
}

#[test]
fn test_non_utf8_values_are_matchable() -> Result<()> {
    let filter = config("", "", r"^\x{ff}\x{fe}").compile()?;
    assert!(filter.event_match(&RowEvent::put(b"k", &[0xff, 0xfe, 0x00, 0x9d])));
    assert!(!filter.event_match(&RowEvent::put(b"k", &[0xfe, 0xff])));
    Ok(())
}

#[test]
fn test_utf8_source_encoding_degrades_to_no_match() -> Result<()> {
    let config = FilterConfig {
        key_pattern: "^k".to_string(),
        value_pattern: "^$|x".to_string(),
        source_encoding: "utf-8".to_string(),
        ..Default::default()
    };
    let filter = config.compile()?;

    // Invalid UTF-8 keys decode to empty text and fail `^k`.
    assert!(!filter.event_match(&RowEvent::put(&[b'k', 0xff], b"x")));
    // An empty-matching value pattern accepts undecodable values.
    assert!(filter.event_match(&RowEvent::put(b"key", &[0xc3])));
    Ok(())
}

#[test]
fn test_validate_then_trusted_construction() -> Result<()> {
    let config = config(r"\x01", "^\x01a", "");
    config.validate()?;
    let filter = Filter::new(&config);
    assert!(filter.event_match(&RowEvent::delete(b"\x01abc")));
    assert!(!filter.event_match(&RowEvent::delete(b"\x02abc")));
    Ok(())
}

#[test]
fn test_forwarded_keeps_order_and_other_events() -> Result<()> {
    let filter = config("a", "", "").compile()?;
    let events = [
        RowEvent::put(b"a1", b""),
        RowEvent::put(b"b1", b""),
        RowEvent::new(OpType::Other, b"b2", b""),
        RowEvent::delete(b"a2"),
    ];
    let kept = filter.forwarded(&events);
    let keys: Vec<&[u8]> = kept.iter().map(|e| e.key).collect();
    assert_eq!(keys, vec![&b"a1"[..], &b"b2"[..], &b"a2"[..]]);
    Ok(())
}

#[test]
fn test_filter_behind_trait_object() -> Result<()> {
    let filter: Box<dyn EventFilter> = Box::new(config("", "^x", "").compile()?);
    assert!(filter.event_match(&RowEvent::put(b"xy", b"")));
    assert!(!filter.event_match(&RowEvent::put(b"yx", b"")));
    Ok(())
}
