use thiserror::Error;

#[derive(Error, Debug)]
pub enum TecmzError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown app: {0}")]
    UnknownApp(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TecmzError {
    /// Full message for logs
    pub fn operator_message(&self) -> String {
        self.to_string()
    }

    /// Message that is safe to hand back to a remote caller
    pub fn client_message(&self) -> String {
        match self {
            TecmzError::Config(_) | TecmzError::Internal(_) => "Internal error".to_string(),
            TecmzError::Transport(_) => "Upstream unavailable".to_string(),
            TecmzError::InvalidResponse(_) => "Upstream returned an invalid response".to_string(),
            TecmzError::InvalidRequest(msg) => format!("Invalid request: {msg}"),
            TecmzError::UnknownApp(_) => "Unknown app".to_string(),
            TecmzError::Unauthorized(_) => "Access denied".to_string(),
        }
    }
}

impl From<anyhow::Error> for TecmzError {
    fn from(err: anyhow::Error) -> Self {
        TecmzError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for TecmzError {
    fn from(err: serde_json::Error) -> Self {
        TecmzError::InvalidResponse(err.to_string())
    }
}

impl From<reqwest::Error> for TecmzError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TecmzError::InvalidResponse(err.to_string())
        } else {
            TecmzError::Transport(err.to_string())
        }
    }
}

impl From<base64::DecodeError> for TecmzError {
    fn from(err: base64::DecodeError) -> Self {
        TecmzError::InvalidResponse(format!("Base64 decode error: {err}"))
    }
}
