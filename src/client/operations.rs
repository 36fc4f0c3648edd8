use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{into_params, TecmzClient};
use crate::constants::{endpoints, fields, messages};
use crate::errors::TecmzError;
use crate::response::{ApiResponse, CensorResult, IpLocation, PayOfflineOrder};

/// Output quality for queued document conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageQuality {
    /// Let the vendor decide
    #[default]
    Default,
    Normal,
    High,
    Super,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Default => "",
            ImageQuality::Normal => "normal",
            ImageQuality::High => "high",
            ImageQuality::Super => "super",
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageQuality {
    type Err = TecmzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" => Ok(ImageQuality::Default),
            "normal" => Ok(ImageQuality::Normal),
            "high" => Ok(ImageQuality::High),
            "super" => Ok(ImageQuality::Super),
            other => Err(TecmzError::InvalidRequest(format!(
                "Unknown image quality: {other}. Expected normal, high or super"
            ))),
        }
    }
}

impl TecmzClient {
    /// Connectivity check. Any upstream failure collapses to a fixed message.
    pub async fn ping(&self) -> ApiResponse {
        let response = self.request(endpoints::PING, Map::new()).await;
        if response.is_error() {
            return ApiResponse::failure(messages::PING_FAILED);
        }
        ApiResponse::success(None)
    }

    /// Create an offline payment order; the vendor calls `notify_url` with a
    /// signed callback once it is paid
    pub async fn pay_offline_create(
        &self,
        biz_sn: &str,
        money: &str,
        notify_url: &str,
        return_url: &str,
    ) -> ApiResponse<PayOfflineOrder> {
        self.request(
            endpoints::PAY_OFFLINE_CREATE,
            into_params(json!({
                "biz_sn": biz_sn,
                "money": money,
                "notify_url": notify_url,
                "return_url": return_url,
            })),
        )
        .await
        .decode(endpoints::PAY_OFFLINE_CREATE)
    }

    /// Fetch challenge data for the hosted captcha
    pub async fn captcha_verify(
        &self,
        action: &str,
        key: &str,
        data: Value,
        runtime: Value,
        types: Value,
    ) -> ApiResponse {
        self.request(
            endpoints::CAPTCHA_VERIFY,
            into_params(json!({
                "action": action,
                "key": key,
                "data": data,
                "runtime": runtime,
                "types": types,
            })),
        )
        .await
    }

    /// `code == 0` means the captcha identified by `key` was solved
    pub async fn captcha_validate(&self, key: &str) -> ApiResponse {
        self.request(endpoints::CAPTCHA_VALIDATE, into_params(json!({ "key": key })))
            .await
    }

    /// Send a templated SMS. Each template variable `k` goes out as `param_k`.
    pub async fn sms_send(
        &self,
        phone: &str,
        template_id: &str,
        params: &BTreeMap<String, String>,
    ) -> ApiResponse {
        let mut post = into_params(json!({
            "phone": phone,
            "template_id": template_id,
        }));
        for (key, value) in params {
            post.insert(
                format!("{}{}", fields::SMS_PARAM_PREFIX, key),
                Value::String(value.clone()),
            );
        }
        self.request(endpoints::SMS_SEND, post).await
    }

    pub async fn audio_convert(&self, from: &str, to: &str, content_base64: &str) -> ApiResponse {
        self.request(
            endpoints::AUDIO_CONVERT,
            into_params(json!({
                "from": from,
                "to": to,
                "content": content_base64,
            })),
        )
        .await
    }

    /// Speech to text
    pub async fn asr(&self, audio_type: &str, content_base64: &str) -> ApiResponse {
        self.request(
            endpoints::ASR,
            into_params(json!({
                "type": audio_type,
                "content": content_base64,
            })),
        )
        .await
    }

    /// Parcel tracking by carrier code and waybill number
    pub async fn express(&self, carrier: &str, no: &str) -> ApiResponse {
        self.request(
            endpoints::EXPRESS,
            into_params(json!({
                "type": carrier,
                "no": no,
            })),
        )
        .await
    }

    /// Moderate an image given either inline base64 or a URL
    pub async fn censor_image(
        &self,
        image_base64: &str,
        image_url: &str,
    ) -> ApiResponse<CensorResult> {
        self.request(
            endpoints::CENSOR_IMAGE,
            into_params(json!({
                "imageBase64": image_base64,
                "imageUrl": image_url,
            })),
        )
        .await
        .decode(endpoints::CENSOR_IMAGE)
    }

    pub async fn censor_text(&self, text: &str) -> ApiResponse<CensorResult> {
        self.request(endpoints::CENSOR_TEXT, into_params(json!({ "text": text })))
            .await
            .decode(endpoints::CENSOR_TEXT)
    }

    pub async fn ip_to_location(&self, ip: &str) -> ApiResponse<IpLocation> {
        self.request(endpoints::IP_TO_LOCATION, into_params(json!({ "ip": ip })))
            .await
            .decode(endpoints::IP_TO_LOCATION)
    }

    /// Synchronous document to image conversion. `page_limit == 0` converts every page.
    pub async fn doc_to_image(&self, doc_path: &str, page_limit: u32) -> ApiResponse {
        self.request(
            endpoints::DOC_TO_IMAGE,
            into_params(json!({
                "docPath": doc_path,
                "pageLimit": page_limit,
            })),
        )
        .await
    }

    /// Queue a conversion job; poll it with [`TecmzClient::doc_to_image_query`]
    pub async fn doc_to_image_queue(
        &self,
        doc_path: &str,
        page_limit: u32,
        image_quality: ImageQuality,
    ) -> ApiResponse {
        self.request(
            endpoints::DOC_TO_IMAGE_QUEUE,
            into_params(json!({
                "docPath": doc_path,
                "pageLimit": page_limit,
                "imageQuality": image_quality.as_str(),
            })),
        )
        .await
    }

    pub async fn doc_to_image_query(&self, job_id: i64) -> ApiResponse {
        self.request(
            endpoints::DOC_TO_IMAGE_QUERY,
            into_params(json!({ "jobId": job_id })),
        )
        .await
    }

    pub async fn ocr(&self, format: &str, image_data: &[u8]) -> ApiResponse {
        self.request(
            endpoints::OCR,
            into_params(json!({
                "format": format,
                "imageData": BASE64.encode(image_data),
            })),
        )
        .await
    }

    /// Real-name check of a name against an ID card number
    pub async fn person_verify_id_card(&self, name: &str, id_card_number: &str) -> ApiResponse {
        self.request(
            endpoints::PERSON_VERIFY_ID_CARD,
            into_params(json!({
                "name": name,
                "idCardNumber": id_card_number,
            })),
        )
        .await
    }
}
