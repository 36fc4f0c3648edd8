use serde_json::{Map, Value};

use crate::constants::fields;
use crate::signature::sign;

/// Sign `key=value` pairs as the vendor would. Values are signed as strings;
/// a given `timestamp` is added first and any `sign` pair is dropped.
pub fn sign_pairs(pairs: &[(String, String)], secret: &str, timestamp: Option<i64>) -> String {
    let mut params: Map<String, Value> = pairs
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    params.remove(fields::SIGN);
    if let Some(ts) = timestamp {
        params.insert(fields::TIMESTAMP.to_string(), Value::from(ts));
    }
    sign(&params, secret.as_bytes())
}
