//! Runtime configuration and database bootstrap.

pub mod database;
mod settings;

pub use settings::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ImageStoreConfig, MailConfig,
    RateLimitConfig, ServerConfig,
};
