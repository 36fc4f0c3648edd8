use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::CallCommands;
use crate::client::TecmzClient;
use crate::response::ApiResponse;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn envelope<T: Serialize>(response: ApiResponse<T>) -> Result<Value> {
    serde_json::to_value(response).context("Failed to serialize response")
}

/// Run one operation and return its envelope as JSON
pub async fn execute_call(client: &TecmzClient, command: CallCommands) -> Result<Value> {
    info!("Calling {} as app {}", command_name(&command), client.app_id());

    match command {
        CallCommands::Ping => envelope(client.ping().await),
        CallCommands::PayOfflineCreate {
            biz_sn,
            money,
            notify_url,
            return_url,
        } => envelope(
            client
                .pay_offline_create(&biz_sn, &money, &notify_url, &return_url)
                .await,
        ),
        CallCommands::CaptchaVerify {
            action,
            key,
            data,
            runtime,
            types,
        } => envelope(client.captcha_verify(&action, &key, data, runtime, types).await),
        CallCommands::CaptchaValidate { key } => envelope(client.captcha_validate(&key).await),
        CallCommands::SmsSend {
            phone,
            template_id,
            params,
        } => {
            let params: BTreeMap<String, String> = params.into_iter().collect();
            envelope(client.sms_send(&phone, &template_id, &params).await)
        }
        CallCommands::AudioConvert { from, to, file } => {
            let content = BASE64.encode(read_file(&file)?);
            envelope(client.audio_convert(&from, &to, &content).await)
        }
        CallCommands::Asr { audio_type, file } => {
            let content = BASE64.encode(read_file(&file)?);
            envelope(client.asr(&audio_type, &content).await)
        }
        CallCommands::Express { carrier, no } => envelope(client.express(&carrier, &no).await),
        CallCommands::CensorImage { file, url } => {
            if file.is_none() && url.is_none() {
                anyhow::bail!("censor-image needs --file or --url");
            }
            let image_base64 = match &file {
                Some(path) => BASE64.encode(read_file(path)?),
                None => String::new(),
            };
            let image_url = url.unwrap_or_default();
            envelope(client.censor_image(&image_base64, &image_url).await)
        }
        CallCommands::CensorText { text } => envelope(client.censor_text(&text).await),
        CallCommands::IpToLocation { ip } => envelope(client.ip_to_location(&ip).await),
        CallCommands::DocToImage {
            doc_path,
            page_limit,
        } => envelope(client.doc_to_image(&doc_path, page_limit).await),
        CallCommands::DocToImageQueue {
            doc_path,
            page_limit,
            quality,
        } => envelope(
            client
                .doc_to_image_queue(&doc_path, page_limit, quality)
                .await,
        ),
        CallCommands::DocToImageQuery { job_id } => {
            envelope(client.doc_to_image_query(job_id).await)
        }
        CallCommands::ImageCompress { format, file } => {
            let image = read_file(&file)?;
            envelope(client.image_compress(&format, &image).await)
        }
        CallCommands::RandomAvatar { output } => {
            let response = client.random_avatar().await;
            if let (Some(path), Some(avatar)) = (&output, response.data.as_ref()) {
                std::fs::write(path, &avatar.image_data)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Avatar written to {}", path.display());
                return Ok(json!({
                    "code": response.code,
                    "msg": response.msg,
                    "data": {"size": avatar.size, "path": path.display().to_string()},
                }));
            }
            envelope(response)
        }
        CallCommands::Ocr { format, file } => {
            let image = read_file(&file)?;
            envelope(client.ocr(&format, &image).await)
        }
        CallCommands::PersonVerifyIdCard {
            name,
            id_card_number,
        } => envelope(client.person_verify_id_card(&name, &id_card_number).await),
    }
}

fn command_name(command: &CallCommands) -> &'static str {
    match command {
        CallCommands::Ping => "ping",
        CallCommands::PayOfflineCreate { .. } => "pay_offline_create",
        CallCommands::CaptchaVerify { .. } => "captcha_verify",
        CallCommands::CaptchaValidate { .. } => "captcha_validate",
        CallCommands::SmsSend { .. } => "sms_send",
        CallCommands::AudioConvert { .. } => "audio_convert",
        CallCommands::Asr { .. } => "asr",
        CallCommands::Express { .. } => "express",
        CallCommands::CensorImage { .. } => "censor_image",
        CallCommands::CensorText { .. } => "censor_text",
        CallCommands::IpToLocation { .. } => "ip_to_location",
        CallCommands::DocToImage { .. } => "doc_to_image",
        CallCommands::DocToImageQueue { .. } => "doc_to_image_queue",
        CallCommands::DocToImageQuery { .. } => "doc_to_image_query",
        CallCommands::ImageCompress { .. } => "image_compress",
        CallCommands::RandomAvatar { .. } => "random_avatar",
        CallCommands::Ocr { .. } => "ocr",
        CallCommands::PersonVerifyIdCard { .. } => "person_verify_id_card",
    }
}
