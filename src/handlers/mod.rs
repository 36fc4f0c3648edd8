pub mod callback;
pub mod health;
pub mod metrics;
pub mod types;

pub use callback::receive_callback;
pub use health::health_check;
pub use metrics::get_metrics;
pub use types::*;
