//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` next to the binary, overridden by
//! environment variables (`TELEGRAM_BOT_TOKEN`, `TABLE_NAME`,
//! `LOG_LEVEL`, `WEBHOOK__URL`, `WEBHOOK__PORT`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
    pub url: String,
    #[serde(default = "default_webhook_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub telegram_bot_token: String,
    pub table_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Present only in the webhook deployment; absent means long polling.
    pub webhook: Option<Webhook>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_webhook_port() -> u16 {
    8443
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::default().separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
