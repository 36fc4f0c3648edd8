use crate::utils::SecureString;

/// Identity of the caller. Without a secret, requests go out unsigned and
/// every inbound callback is rejected.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    app_id: String,
    app_secret: Option<SecureString>,
}

impl ClientCredentials {
    /// An empty or `"0"` secret counts as no secret at all
    pub fn new(app_id: impl Into<String>, app_secret: Option<&str>) -> Self {
        let app_secret = app_secret
            .filter(|s| !s.is_empty() && *s != "0")
            .map(SecureString::from);
        Self {
            app_id: app_id.into(),
            app_secret,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn secret(&self) -> Option<&SecureString> {
        self.app_secret.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.app_secret.is_some()
    }

    /// Whether `other` names the same secret these credentials were built with
    pub fn secret_matches(&self, other: Option<&str>) -> bool {
        let other = other.filter(|s| !s.is_empty() && *s != "0");
        match (&self.app_secret, other) {
            (None, None) => true,
            (Some(secret), Some(other)) => secret.secure_eq_str(other),
            _ => false,
        }
    }
}
