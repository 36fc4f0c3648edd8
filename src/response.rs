//! The `{code, msg, data}` envelope returned by every operation, plus the
//! typed `data` payloads of the endpoints whose shape is known.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{messages, FAILURE_CODE};
use crate::errors::TecmzError;

/// Uniform result envelope. `code == 0` is success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    #[serde(deserialize_with = "deserialize_code")]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// The vendor sends `code` as a number, but some gateways stringify it
fn deserialize_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("code is not an integer: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("code is not numeric: {s}"))),
        other => Err(de::Error::custom(format!("unexpected code value: {other}"))),
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>) -> Self {
        Self {
            code: 0,
            msg: messages::OK.to_string(),
            data,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: FAILURE_CODE,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Re-type a failure envelope, keeping its code and message.
    ///
    /// `data` is dropped: a failure that carries a payload comes back with
    /// `data: None`, since the payload does not fit the new type.
    pub fn cast_failure<U>(self) -> ApiResponse<U> {
        ApiResponse {
            code: self.code,
            msg: self.msg,
            data: None,
        }
    }
}

impl ApiResponse<Value> {
    /// Decode `data` into the endpoint's typed payload.
    ///
    /// Failures pass through untouched. A success whose `data` does not fit
    /// `T` becomes a failure envelope naming the endpoint.
    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> ApiResponse<T> {
        if self.is_error() {
            return self.cast_failure();
        }
        match self.data {
            None | Some(Value::Null) => ApiResponse {
                code: self.code,
                msg: self.msg,
                data: None,
            },
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => ApiResponse {
                    code: self.code,
                    msg: self.msg,
                    data: Some(data),
                },
                Err(e) => ApiResponse::failure(format!("Malformed data from {endpoint}: {e}")),
            },
        }
    }

    /// Fetch a field of `data`, as required by the delegated flows
    pub fn data_field(&self, name: &str) -> Result<&Value, TecmzError> {
        self.data
            .as_ref()
            .and_then(|data| data.get(name))
            .ok_or_else(|| TecmzError::InvalidResponse(format!("missing data.{name}")))
    }

    pub fn data_str(&self, name: &str) -> Result<&str, TecmzError> {
        self.data_field(name)?
            .as_str()
            .ok_or_else(|| TecmzError::InvalidResponse(format!("data.{name} is not a string")))
    }
}

impl<T> From<TecmzError> for ApiResponse<T> {
    fn from(err: TecmzError) -> Self {
        ApiResponse::failure(err.to_string())
    }
}

/// `/pay_offline/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayOfflineOrder {
    pub biz_sn: String,
    pub sn: String,
    pub pay_url: String,
}

/// `/ip_to_location`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpLocation {
    pub country: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub isp: String,
}

/// `/censor_image` and `/censor_text`.
///
/// `result` is one of the vendor's verdict labels (pass, reject, suspect, failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensorResult {
    pub result: String,
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// Normalized result of the two-phase image compression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCompressResult {
    pub image_original_size: u64,
    pub image_compress_size: u64,
    pub image_url: String,
}

/// PNG bytes of a random avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomAvatar {
    pub size: usize,
    #[serde(with = "base64_bytes")]
    pub image_data: Vec<u8>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
