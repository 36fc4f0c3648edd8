pub mod ip;
pub mod password;
pub mod secure_string;

pub use ip::{extract_real_ip, validate_ip_access};
pub use password::{get_secret_securely, prompt_for_secret};
pub use secure_string::SecureString;
