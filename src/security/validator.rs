use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::SecurityConfig;
use crate::errors::TecmzError;

/// Network-level gate in front of callback verification
#[derive(Clone, Debug)]
pub struct SecurityValidator {
    allowed_ips: HashSet<IpAddr>,
    trust_proxy_headers: bool,
}

impl SecurityValidator {
    pub fn new(allowed_ips: &[String], trust_proxy_headers: bool) -> Result<Self, TecmzError> {
        let mut ips = HashSet::new();
        for ip_str in allowed_ips {
            let ip: IpAddr = ip_str
                .parse()
                .map_err(|_| TecmzError::Config(format!("Invalid IP address: {ip_str}")))?;
            ips.insert(ip);
        }

        Ok(Self {
            allowed_ips: ips,
            trust_proxy_headers,
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TecmzError> {
        Self::new(&config.allowed_ips, config.trust_proxy_headers)
    }

    pub fn trust_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    pub fn validate_ip(&self, ip: &IpAddr) -> Result<(), TecmzError> {
        // If no IPs configured, allow all
        if self.allowed_ips.is_empty() {
            return Ok(());
        }

        if !self.allowed_ips.contains(ip) {
            return Err(TecmzError::Unauthorized(format!(
                "IP address {ip} is not allowed"
            )));
        }

        Ok(())
    }
}
