/// Production base URL of the open API; endpoint paths are appended verbatim
pub const API_BASE: &str = "https://api.tecmz.com/open_api";

/// Upstream operations such as document conversion can be slow
pub const REQUEST_TIMEOUT_SECS: u64 = 600;

/// Accepted clock skew for signed callbacks, in seconds (inclusive on both sides)
pub const SIGN_WINDOW_SECS: i64 = 1800;

/// Code used for every locally produced failure envelope
pub const FAILURE_CODE: i64 = -1;

/// Endpoint paths, relative to the API base
pub mod endpoints {
    pub const PING: &str = "/ping";
    pub const PAY_OFFLINE_CREATE: &str = "/pay_offline/create";
    pub const CAPTCHA_VERIFY: &str = "/captcha/verify";
    pub const CAPTCHA_VALIDATE: &str = "/captcha/validate";
    pub const SMS_SEND: &str = "/sms/send";
    pub const AUDIO_CONVERT: &str = "/audio_convert";
    pub const ASR: &str = "/asr";
    pub const EXPRESS: &str = "/express";
    pub const CENSOR_IMAGE: &str = "/censor_image";
    pub const CENSOR_TEXT: &str = "/censor_text";
    pub const IP_TO_LOCATION: &str = "/ip_to_location";
    pub const DOC_TO_IMAGE: &str = "/doc_to_image";
    pub const DOC_TO_IMAGE_QUEUE: &str = "/doc_to_image/queue";
    pub const DOC_TO_IMAGE_QUERY: &str = "/doc_to_image/query";
    pub const IMAGE_COMPRESS_PREPARE: &str = "/image_compress/prepare";
    pub const RANDOM_AVATAR_PREPARE: &str = "/random_avatar/prepare";
    pub const OCR: &str = "/ocr";
    pub const PERSON_VERIFY_ID_CARD: &str = "/person_verify_id_card";
}

/// Field names with protocol meaning in every envelope
pub mod fields {
    pub const APP_ID: &str = "app_id";
    pub const TIMESTAMP: &str = "timestamp";
    pub const SIGN: &str = "sign";
    /// Prefix for SMS template variables
    pub const SMS_PARAM_PREFIX: &str = "param_";
}

/// Fixed messages surfaced in failure envelopes
pub mod messages {
    pub const OK: &str = "ok";
    pub const PING_FAILED: &str = "PING失败";
    pub const EMPTY_IMAGE: &str = "图片数据为空";
}
