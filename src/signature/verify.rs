use serde_json::{Map, Value};
use std::fmt;
use subtle::ConstantTimeEq;

use super::canonical::sign;
use crate::constants::{fields, SIGN_WINDOW_SECS};

/// Why an inbound callback was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRejection {
    MissingField(&'static str),
    AppIdMismatch,
    InvalidTimestamp,
    TimestampOutOfWindow { skew_secs: i64 },
    NoSecret,
    SignatureMismatch,
}

impl fmt::Display for CallbackRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackRejection::MissingField(name) => write!(f, "missing field: {name}"),
            CallbackRejection::AppIdMismatch => write!(f, "app_id mismatch"),
            CallbackRejection::InvalidTimestamp => write!(f, "invalid timestamp"),
            CallbackRejection::TimestampOutOfWindow { skew_secs } => {
                write!(f, "timestamp outside window (skew {skew_secs}s)")
            }
            CallbackRejection::NoSecret => write!(f, "no secret configured"),
            CallbackRejection::SignatureMismatch => write!(f, "sign error"),
        }
    }
}

/// PHP-style emptiness: absent, null, false, 0, "", "0", [] and {}
fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validate a signed callback against the given identity at time `now`.
///
/// The callback map itself is never modified; `sign` is dropped from a copy
/// before the signature is recomputed.
pub fn check_callback(
    callback: &Map<String, Value>,
    app_id: &str,
    secret: Option<&[u8]>,
    now: i64,
) -> Result<(), CallbackRejection> {
    for name in [fields::SIGN, fields::TIMESTAMP, fields::APP_ID] {
        if is_empty_value(callback.get(name)) {
            return Err(CallbackRejection::MissingField(name));
        }
    }

    let callback_app_id = callback
        .get(fields::APP_ID)
        .and_then(value_as_text)
        .ok_or(CallbackRejection::AppIdMismatch)?;
    if callback_app_id != app_id {
        return Err(CallbackRejection::AppIdMismatch);
    }

    let timestamp = callback
        .get(fields::TIMESTAMP)
        .and_then(value_as_timestamp)
        .ok_or(CallbackRejection::InvalidTimestamp)?;
    let skew_secs = timestamp.saturating_sub(now);
    if skew_secs.saturating_abs() > SIGN_WINDOW_SECS {
        return Err(CallbackRejection::TimestampOutOfWindow { skew_secs });
    }

    let secret = secret.ok_or(CallbackRejection::NoSecret)?;

    let provided = callback
        .get(fields::SIGN)
        .and_then(value_as_text)
        .ok_or(CallbackRejection::SignatureMismatch)?;

    let mut unsigned = callback.clone();
    unsigned.remove(fields::SIGN);
    let expected = sign(&unsigned, secret);

    if provided.len() != expected.len() {
        return Err(CallbackRejection::SignatureMismatch);
    }
    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(CallbackRejection::SignatureMismatch)
    }
}
