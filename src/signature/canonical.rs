use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use crate::constants::fields;

/// Bytes left untouched by the vendor's form encoding: alphanumerics and `-_.`.
/// Space is handled separately and becomes `+`.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Render a field value the way the vendor backend stringifies it before signing
fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => php_float_to_string(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        // Nested structures are signed as compact JSON
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Significant digits PHP keeps when casting a float to string
const PHP_FLOAT_PRECISION: usize = 14;

/// Render a float as PHP's `(string)` cast does: 14 significant digits,
/// trailing zeros dropped, `1.0E+25` style outside `1e-5 ..< 1e14`.
fn php_float_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // "d.ddddddddddddde<exp>", already rounded to the kept precision
    let scientific = format!("{:.*e}", PHP_FLOAT_PRECISION - 1, value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digits = digits.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }

    if exponent < -4 || exponent >= PHP_FLOAT_PRECISION as i32 {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        out.push('.');
        out.push_str(if rest.is_empty() { "0" } else { rest });
        out.push('E');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&exponent.abs().to_string());
    } else if exponent < 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-exponent - 1) as usize));
        out.push_str(digits);
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            out.push_str(digits);
            out.push_str(&"0".repeat(int_len - digits.len()));
        } else {
            let (int_part, frac_part) = digits.split_at(int_len);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        }
    }
    out
}

/// Form-encode a string: unreserved bytes pass through, space becomes `+`,
/// everything else becomes `%XX`
fn form_encode(input: &str) -> String {
    input
        .split(' ')
        .map(|part| utf8_percent_encode(part, FORM_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Build the string that gets hashed, without the trailing secret.
///
/// Keys are sorted byte-wise and joined as `key=value` pairs with `&`.
pub fn canonical_string(params: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    keys.into_iter()
        .map(|key| format!("{}={}", key, form_encode(&value_to_string(&params[key.as_str()]))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the request signature: lowercase hex MD5 of the canonical string
/// followed by the secret
pub fn sign(params: &Map<String, Value>, secret: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical_string(params).as_bytes());
    hasher.update(secret);
    hex::encode(hasher.finalize())
}

/// Add `timestamp` and `sign` to an outbound envelope
pub fn attach_signature(params: &mut Map<String, Value>, secret: &[u8], timestamp: i64) {
    params.insert(fields::TIMESTAMP.to_string(), Value::from(timestamp));
    // A stale signature must never be part of its own input
    params.remove(fields::SIGN);
    let signature = sign(params, secret);
    params.insert(fields::SIGN.to_string(), Value::String(signature));
}
