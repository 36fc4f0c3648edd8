pub mod audit;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod response;
pub mod security;
pub mod server;
pub mod services;
pub mod signature;
pub mod utils;

pub use client::TecmzClient;
pub use config::Config;
pub use errors::TecmzError;
pub use registry::ClientRegistry;
pub use response::ApiResponse;
pub use server::Server;

// Re-export CLI types for main.rs
pub use cli::*;
