use anyhow::Result;
use rpassword::prompt_password;
use tracing::warn;

use super::SecureString;

/// Read an app secret from the terminal without echoing it
pub fn prompt_for_secret(prompt_message: &str) -> Result<SecureString> {
    let secret = SecureString::new(prompt_password(prompt_message)?);

    if secret.is_empty() {
        return Err(anyhow::anyhow!("App secret cannot be empty"));
    }

    Ok(secret)
}

/// Use the secret given on the command line, or prompt for one
pub fn get_secret_securely(provided: Option<String>, prompt_message: &str) -> Result<String> {
    match provided {
        Some(secret) => {
            warn!("⚠️  App secret supplied via argument or environment; it may show up in process lists");
            if secret.is_empty() {
                return Err(anyhow::anyhow!("Provided app secret cannot be empty"));
            }
            Ok(secret)
        }
        None => {
            let secret = prompt_for_secret(prompt_message)?;
            String::from_utf8(secret.as_bytes().to_vec())
                .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in app secret: {}", e))
        }
    }
}
