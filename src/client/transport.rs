use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::errors::TecmzError;

/// The HTTP exchanges the client needs. Implemented over reqwest in
/// production and by recording fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON and return the parsed JSON response
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TecmzError>;

    /// GET the raw bytes at `url`
    async fn get_raw(&self, url: &str) -> Result<Vec<u8>, TecmzError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TecmzError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tecmz-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TecmzError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TecmzError> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TecmzError::Transport(format!("HTTP {status} from {url}")));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| TecmzError::InvalidResponse(format!("Invalid JSON from {url}: {e}")))
    }

    async fn get_raw(&self, url: &str) -> Result<Vec<u8>, TecmzError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TecmzError::Transport(format!("HTTP {status} from {url}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_post_json_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open_api/ping"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"app_id": "10001"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/open_api/ping", mock_server.uri());
        let response = transport()
            .post_json(&url, &json!({"app_id": "10001"}))
            .await
            .unwrap();

        assert_eq!(response, json!({"code": 0, "msg": "ok"}));
    }

    #[tokio::test]
    async fn test_post_json_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let result = transport()
            .post_json(&mock_server.uri(), &json!({}))
            .await;

        assert!(matches!(result, Err(TecmzError::Transport(_))));
    }

    #[tokio::test]
    async fn test_post_json_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let result = transport()
            .post_json(&mock_server.uri(), &json!({}))
            .await;

        assert!(matches!(result, Err(TecmzError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_get_raw_returns_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/avatar.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&mock_server)
            .await;

        let url = format!("{}/avatar.png", mock_server.uri());
        let bytes = transport().get_raw(&url).await.unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let mock_server = MockServer::start().await;
        let url = format!("{}/ping", mock_server.uri());
        drop(mock_server);

        let result = transport().post_json(&url, &json!({})).await;
        assert!(matches!(result, Err(TecmzError::Transport(_))));
    }
}
