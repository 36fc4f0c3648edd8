use serde_json::{json, Map, Value};

use super::canonical::{attach_signature, canonical_string, sign};
use super::verify::{check_callback, CallbackRejection};

const SECRET: &[u8] = b"s3cret";
const NOW: i64 = 1_700_000_000;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn signed_callback(timestamp: i64) -> Map<String, Value> {
    let mut callback = object(json!({
        "app_id": "10001",
        "biz_sn": "ORDER-1",
        "status": "paid",
        "money": "12.50",
    }));
    attach_signature(&mut callback, SECRET, timestamp);
    callback
}

#[test]
fn test_canonical_string_encoding() {
    let params = object(json!({
        "f": "x-y_z.w*~",
        "e": "你好",
        "d": {"k": "v"},
        "c": [1, 2],
        "b": null,
        "a": 1,
    }));

    assert_eq!(
        canonical_string(&params),
        "a=1&b=&c=%5B1%2C2%5D&d=%7B%22k%22%3A%22v%22%7D&e=%E4%BD%A0%E5%A5%BD&f=x-y_z.w%2A%7E"
    );
}

#[test]
fn test_canonical_string_booleans_and_spaces() {
    let params = object(json!({"yes": true, "no": false, "text": "a b+c"}));
    assert_eq!(canonical_string(&params), "no=&text=a+b%2Bc&yes=1");
}

#[test]
fn test_sign_known_vector() {
    let params = object(json!({
        "app_id": "10001",
        "biz_sn": "A 1/b",
        "money": 9.9,
        "timestamp": NOW,
    }));

    assert_eq!(sign(&params, SECRET), "193783c3f8834c9ad6b3c3315d2245ba");
}

#[test]
fn test_attach_signature_matches_known_vector() {
    let mut params = object(json!({
        "phone": "13800000000",
        "template_id": "T1",
        "app_id": "10001",
    }));
    attach_signature(&mut params, SECRET, NOW);

    assert_eq!(params["timestamp"], json!(NOW));
    assert_eq!(params["sign"], json!("dd3c59a1b84144d67a34abec97eab2a5"));
}

#[test]
fn test_sign_is_deterministic() {
    let params = object(json!({"app_id": "10001", "text": "hello"}));
    assert_eq!(sign(&params, SECRET), sign(&params, SECRET));
}

#[test]
fn test_sign_is_order_independent() {
    let mut forward = Map::new();
    forward.insert("app_id".to_string(), json!("10001"));
    forward.insert("phone".to_string(), json!("13800000000"));
    forward.insert("template_id".to_string(), json!("T1"));

    let mut reverse = Map::new();
    reverse.insert("template_id".to_string(), json!("T1"));
    reverse.insert("phone".to_string(), json!("13800000000"));
    reverse.insert("app_id".to_string(), json!("10001"));

    assert_eq!(sign(&forward, SECRET), sign(&reverse, SECRET));
}

#[test]
fn test_sign_depends_on_secret() {
    let params = object(json!({"app_id": "10001"}));
    assert_ne!(sign(&params, b"one"), sign(&params, b"two"));
}

#[test]
fn test_valid_callback_accepted() {
    let callback = signed_callback(NOW);
    assert_eq!(check_callback(&callback, "10001", Some(SECRET), NOW), Ok(()));
}

#[test]
fn test_callback_not_mutated() {
    let callback = signed_callback(NOW);
    let before = callback.clone();
    let _ = check_callback(&callback, "10001", Some(SECRET), NOW);
    assert_eq!(callback, before);
}

#[test]
fn test_tampered_field_rejected() {
    let mut callback = signed_callback(NOW);
    callback.insert("money".to_string(), json!("0.01"));

    assert_eq!(
        check_callback(&callback, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::SignatureMismatch)
    );
}

#[test]
fn test_added_field_rejected() {
    let mut callback = signed_callback(NOW);
    callback.insert("extra".to_string(), json!("1"));

    assert_eq!(
        check_callback(&callback, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::SignatureMismatch)
    );
}

#[test]
fn test_wrong_secret_rejected() {
    let callback = signed_callback(NOW);
    assert_eq!(
        check_callback(&callback, "10001", Some(b"other"), NOW),
        Err(CallbackRejection::SignatureMismatch)
    );
}

#[test]
fn test_replay_window() {
    let stale = signed_callback(NOW - 1801);
    assert_eq!(
        check_callback(&stale, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::TimestampOutOfWindow { skew_secs: -1801 })
    );

    let fresh = signed_callback(NOW - 1799);
    assert_eq!(check_callback(&fresh, "10001", Some(SECRET), NOW), Ok(()));

    let edge = signed_callback(NOW - 1800);
    assert_eq!(check_callback(&edge, "10001", Some(SECRET), NOW), Ok(()));

    let future = signed_callback(NOW + 1801);
    assert!(check_callback(&future, "10001", Some(SECRET), NOW).is_err());

    let near_future = signed_callback(NOW + 1799);
    assert_eq!(check_callback(&near_future, "10001", Some(SECRET), NOW), Ok(()));
}

#[test]
fn test_app_id_mismatch_rejected() {
    let callback = signed_callback(NOW);
    assert_eq!(
        check_callback(&callback, "20002", Some(SECRET), NOW),
        Err(CallbackRejection::AppIdMismatch)
    );
}

#[test]
fn test_missing_fields_rejected() {
    for name in ["sign", "timestamp", "app_id"] {
        let mut callback = signed_callback(NOW);
        callback.remove(name);
        assert!(matches!(
            check_callback(&callback, "10001", Some(SECRET), NOW),
            Err(CallbackRejection::MissingField(_))
        ));
    }

    let mut empty_sign = signed_callback(NOW);
    empty_sign.insert("sign".to_string(), json!(""));
    assert_eq!(
        check_callback(&empty_sign, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::MissingField("sign"))
    );

    let mut zero_timestamp = signed_callback(NOW);
    zero_timestamp.insert("timestamp".to_string(), json!("0"));
    assert_eq!(
        check_callback(&zero_timestamp, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::MissingField("timestamp"))
    );
}

#[test]
fn test_string_timestamp_and_numeric_app_id() {
    let mut callback = object(json!({"app_id": 10001, "timestamp": NOW.to_string()}));
    let signature = sign(&callback, SECRET);
    callback.insert("sign".to_string(), json!(signature));

    assert_eq!(check_callback(&callback, "10001", Some(SECRET), NOW), Ok(()));
}

#[test]
fn test_non_numeric_timestamp_rejected() {
    let mut callback = signed_callback(NOW);
    callback.insert("timestamp".to_string(), json!("yesterday"));
    assert_eq!(
        check_callback(&callback, "10001", Some(SECRET), NOW),
        Err(CallbackRejection::InvalidTimestamp)
    );
}

#[test]
fn test_no_secret_rejects() {
    let callback = signed_callback(NOW);
    assert_eq!(
        check_callback(&callback, "10001", None, NOW),
        Err(CallbackRejection::NoSecret)
    );
}

#[test]
fn test_floats_render_like_php() {
    let params = object(json!({"money": 10.0, "big": 1e25}));
    assert_eq!(canonical_string(&params), "big=1.0E%2B25&money=10");

    let params = object(json!({
        "a": 0.1 + 0.2,
        "b": -2.5,
        "c": 0.0001,
        "d": 0.00001,
        "e": 99999999999999.0,
        "f": 1e14,
        "g": 12.5,
    }));
    assert_eq!(
        canonical_string(&params),
        "a=0.3&b=-2.5&c=0.0001&d=1.0E-5&e=99999999999999&f=1.0E%2B14&g=12.5"
    );
}

#[test]
fn test_integers_are_not_treated_as_floats() {
    let params = object(json!({"n": 12345678901234567u64, "m": -7}));
    assert_eq!(canonical_string(&params), "m=-7&n=12345678901234567");
}

#[test]
fn test_integral_float_amount_verifies() {
    // The vendor signs `money=10` for a float amount of 10.0
    let mut as_signed = object(json!({
        "app_id": "10001",
        "biz_sn": "ORDER-2",
        "money": "10",
    }));
    attach_signature(&mut as_signed, SECRET, NOW);

    let mut received = as_signed.clone();
    received.insert("money".to_string(), json!(10.0));

    assert_eq!(check_callback(&received, "10001", Some(SECRET), NOW), Ok(()));
}
