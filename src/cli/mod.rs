use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::client::ImageQuality;

pub mod call;
pub mod sign;

pub use call::execute_call;
pub use sign::sign_pairs;

#[derive(Parser)]
#[command(name = "tecmz-client")]
#[command(about = "Signed client and callback receiver for the Tecmz open API")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, env = "TECMZ_CONFIG", global = true)]
    pub config: Option<String>,

    /// Vendor app id
    #[arg(long, env = "TECMZ_APP_ID", global = true)]
    pub app_id: Option<String>,

    /// Vendor app secret. Setting this via CLI argument is NOT recommended
    #[arg(long, env = "TECMZ_APP_SECRET", global = true, hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Read the app secret from the terminal
    #[arg(long, global = true)]
    pub prompt_secret: bool,

    /// Override the API base URL
    #[arg(long, env = "TECMZ_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Log every outgoing envelope
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log level
    #[arg(long, env = "RUST_LOG", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Receive and verify vendor callbacks over HTTP
    Serve(ServeArgs),
    /// Call one vendor operation and print the response envelope
    Call {
        #[command(subcommand)]
        command: CallCommands,
    },
    /// Compute the signature of a parameter set
    Sign(SignArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Server bind address
    #[arg(long, env = "TECMZ_ADDRESS")]
    pub address: Option<String>,

    /// Server port
    #[arg(short, long, env = "TECMZ_PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Secret to sign with (defaults to the configured app secret)
    #[arg(long)]
    pub secret: Option<String>,

    /// Unix timestamp to add before signing
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Parameters as key=value
    #[arg(value_parser = parse_key_val, required = true)]
    pub params: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
pub enum CallCommands {
    /// Connectivity check
    Ping,
    /// Create an offline payment order
    PayOfflineCreate {
        #[arg(long)]
        biz_sn: String,
        /// Amount as a decimal string
        #[arg(long)]
        money: String,
        #[arg(long)]
        notify_url: String,
        #[arg(long)]
        return_url: String,
    },
    /// Verify a captcha interaction
    CaptchaVerify {
        #[arg(long)]
        action: String,
        #[arg(long)]
        key: String,
        /// JSON value
        #[arg(long, value_parser = parse_json, default_value = "null")]
        data: serde_json::Value,
        /// JSON value
        #[arg(long, value_parser = parse_json, default_value = "null")]
        runtime: serde_json::Value,
        /// JSON value
        #[arg(long, value_parser = parse_json, default_value = "null")]
        types: serde_json::Value,
    },
    /// Check a captcha key
    CaptchaValidate {
        #[arg(long)]
        key: String,
    },
    /// Send a templated SMS
    SmsSend {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        template_id: String,
        /// Template variable as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Convert audio between formats
    AudioConvert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Audio file to upload
        #[arg(long)]
        file: PathBuf,
    },
    /// Speech recognition
    Asr {
        /// Audio format
        #[arg(long = "type")]
        audio_type: String,
        /// Audio file to upload
        #[arg(long)]
        file: PathBuf,
    },
    /// Parcel tracking
    Express {
        /// Carrier code
        #[arg(long = "type")]
        carrier: String,
        #[arg(long)]
        no: String,
    },
    /// Moderate an image, given as a file or a URL
    CensorImage {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Moderate a text
    CensorText {
        #[arg(long)]
        text: String,
    },
    /// Geolocate an IP address
    IpToLocation {
        #[arg(long)]
        ip: String,
    },
    /// Render document pages to images
    DocToImage {
        #[arg(long)]
        doc_path: String,
        #[arg(long, default_value_t = 0)]
        page_limit: u32,
    },
    /// Queue a document rendering job
    DocToImageQueue {
        #[arg(long)]
        doc_path: String,
        #[arg(long, default_value_t = 0)]
        page_limit: u32,
        /// normal, high or super
        #[arg(long, default_value = "default")]
        quality: ImageQuality,
    },
    /// Poll a queued document rendering job
    DocToImageQuery {
        #[arg(long)]
        job_id: i64,
    },
    /// Compress an image
    ImageCompress {
        #[arg(long)]
        format: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch a random PNG avatar
    RandomAvatar {
        /// Write the PNG here instead of printing it as base64
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recognise text in an image
    Ocr {
        #[arg(long)]
        format: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Verify a name against an ID card number
    PersonVerifyIdCard {
        #[arg(long)]
        name: String,
        #[arg(long)]
        id_card_number: String,
    },
}

/// Parse `key=value`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid key=value pair: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("biz_sn=A=1").unwrap(),
            ("biz_sn".to_string(), "A=1".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tecmz-client",
            "call",
            "sms-send",
            "--phone",
            "13800000000",
            "--template-id",
            "T1",
            "--param",
            "code=1234",
            "--app-id",
            "10001",
        ])
        .unwrap();

        assert_eq!(cli.global.app_id.as_deref(), Some("10001"));
        match cli.command {
            Commands::Call {
                command: CallCommands::SmsSend { params, .. },
            } => assert_eq!(params, vec![("code".to_string(), "1234".to_string())]),
            _ => panic!("expected sms-send"),
        }
    }

    #[test]
    fn test_quality_parses() {
        let cli = Cli::try_parse_from([
            "tecmz-client",
            "call",
            "doc-to-image-queue",
            "--doc-path",
            "https://example.com/a.pdf",
            "--quality",
            "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Call {
                command: CallCommands::DocToImageQueue { quality, page_limit, .. },
            } => {
                assert_eq!(quality, ImageQuality::High);
                assert_eq!(page_limit, 0);
            }
            _ => panic!("expected doc-to-image-queue"),
        }
    }
}
