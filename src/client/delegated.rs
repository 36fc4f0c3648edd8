//! Operations that run in two phases: a signed `prepare` call returns the
//! address of a processing server, and the payload goes straight there.
//! Neither phase is retried; the first failure is returned as is.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::TecmzClient;
use crate::constants::{endpoints, messages};
use crate::errors::TecmzError;
use crate::response::{ApiResponse, ImageCompressResult, RandomAvatar};

/// Sizes may arrive as numbers or numeric strings
fn size_field(response: &ApiResponse, name: &str) -> Result<u64, TecmzError> {
    let value = response.data_field(name)?;
    let size = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    size.ok_or_else(|| TecmzError::InvalidResponse(format!("data.{name} is not a size: {value}")))
}

fn compress_result(uploaded: &ApiResponse) -> Result<ImageCompressResult, TecmzError> {
    Ok(ImageCompressResult {
        image_original_size: size_field(uploaded, "originalSize")?,
        image_compress_size: size_field(uploaded, "compressSize")?,
        image_url: uploaded.data_str("url")?.to_string(),
    })
}

impl TecmzClient {
    /// Compress an image through the server handed out by `/image_compress/prepare`
    pub async fn image_compress(
        &self,
        format: &str,
        image_data: &[u8],
    ) -> ApiResponse<ImageCompressResult> {
        let prepared = self
            .request(endpoints::IMAGE_COMPRESS_PREPARE, Map::new())
            .await;
        if prepared.is_error() {
            return prepared.cast_failure();
        }

        let server = match prepared.data_str("server") {
            Ok(server) => server.to_string(),
            Err(e) => return e.into(),
        };
        debug!("Uploading {} bytes to compression server {}", image_data.len(), server);

        let uploaded = self
            .post(
                &server,
                &json!({
                    "format": format,
                    "imageData": BASE64.encode(image_data),
                }),
            )
            .await;
        if uploaded.is_error() {
            return uploaded.cast_failure();
        }

        match compress_result(&uploaded) {
            Ok(result) => {
                info!(
                    "Image compressed {} -> {} bytes",
                    result.image_original_size, result.image_compress_size
                );
                ApiResponse::success(Some(result))
            }
            Err(e) => e.into(),
        }
    }

    /// Fetch a random avatar as PNG bytes.
    ///
    /// PNG avatars come inline with the prepare response; other formats are
    /// converted by the returned server and then downloaded.
    pub async fn random_avatar(&self) -> ApiResponse<RandomAvatar> {
        let prepared = self
            .request(endpoints::RANDOM_AVATAR_PREPARE, Map::new())
            .await;
        if prepared.is_error() {
            return prepared.cast_failure();
        }

        let image_data = match self.avatar_png(&prepared).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(failure)) => return failure,
            Err(e) => return e.into(),
        };

        if image_data.is_empty() {
            return ApiResponse::failure(messages::EMPTY_IMAGE);
        }

        ApiResponse::success(Some(RandomAvatar {
            size: image_data.len(),
            image_data,
        }))
    }

    /// Outer error: malformed prepare data. Inner error: the conversion
    /// server's own failure envelope, passed through untouched.
    async fn avatar_png(
        &self,
        prepared: &ApiResponse,
    ) -> Result<Result<Vec<u8>, ApiResponse<RandomAvatar>>, TecmzError> {
        let format = prepared.data_str("format")?;
        let inline = prepared.data_str("imageData")?;

        if format == "png" {
            // Undecodable inline data is reported as an empty image
            return Ok(Ok(BASE64.decode(inline).unwrap_or_default()));
        }

        let server = prepared.data_str("server")?;
        debug!("Converting {} avatar to png via {}", format, server);

        let converted = self
            .post(
                server,
                &json!({
                    "format": format,
                    "imageData": inline,
                    "toFormat": "png",
                }),
            )
            .await;
        if converted.is_error() {
            return Ok(Err(converted.cast_failure()));
        }

        let url = converted.data_str("url")?;
        Ok(Ok(self.fetch(url).await?))
    }
}
