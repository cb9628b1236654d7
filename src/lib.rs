pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod openapi;
pub mod otp;
pub mod routes;
pub mod sweep; // optional background reaper

// Re-export commonly used items for tests / external users
pub use config::OtpConfig;
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use otp::OtpManager;
pub use routes::{config, metrics_config, AppState};
