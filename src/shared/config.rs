//! Application configuration. Server address, dispatch endpoint, processing delay, SMTP settings.

use crate::domain::{DomainError, MailSettings};
use crate::ports::MailSettingsPort;
use serde::Deserialize;

/// Default fixed latency of the placeholder processing step.
pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 2000;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DISPATCH_URL: &str = "http://127.0.0.1:3000/api/send-email";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Address the dispatch server binds to. Read from DOC_SCANNER_LISTEN_ADDR.
    #[serde(default)]
    pub listen_addr: Option<String>,

    /// Endpoint the scanner posts captures to. Read from DOC_SCANNER_DISPATCH_URL.
    #[serde(default)]
    pub dispatch_url: Option<String>,

    /// Placeholder processing latency in ms. Read from DOC_SCANNER_PROCESSING_DELAY_MS.
    #[serde(default)]
    pub processing_delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("DOC_SCANNER").try_parsing(true));
        if let Ok(path) = std::env::var("DOC_SCANNER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn listen_addr_or_default(&self) -> String {
        self.listen_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
    }

    pub fn dispatch_url_or_default(&self) -> String {
        self.dispatch_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DISPATCH_URL.to_string())
    }

    pub fn processing_delay_ms_or_default(&self) -> u64 {
        self.processing_delay_ms
            .unwrap_or(DEFAULT_PROCESSING_DELAY_MS)
    }
}

/// Raw SMTP variables as they appear in the environment (SMTP_HOST, EMAIL_TO, ...).
#[derive(Debug, Deserialize, Default)]
struct RawMailEnv {
    smtp_host: Option<String>,
    smtp_port: Option<String>,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    email_from: Option<String>,
    email_to: Option<String>,
}

impl RawMailEnv {
    fn into_settings(self) -> Result<MailSettings, DomainError> {
        let port = match self.smtp_port.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SMTP_PORT,
            Some(p) => p
                .parse()
                .map_err(|_| DomainError::Config(format!("SMTP_PORT is not a port: {}", p)))?,
        };
        Ok(MailSettings {
            host: non_empty(self.smtp_host).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
            user: non_empty(self.smtp_user),
            password: non_empty(self.smtp_pass),
            from: non_empty(self.email_from)
                .ok_or_else(|| DomainError::Config("EMAIL_FROM is not set".into()))?,
            to: non_empty(self.email_to)
                .ok_or_else(|| DomainError::Config("EMAIL_TO is not set".into()))?,
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Reads SMTP settings from the process environment on every call.
#[derive(Debug, Default)]
pub struct EnvMailSettings;

impl EnvMailSettings {
    pub fn new() -> Self {
        Self
    }
}

impl MailSettingsPort for EnvMailSettings {
    fn mail_settings(&self) -> Result<MailSettings, DomainError> {
        let raw: RawMailEnv = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DomainError::Config(e.to_string()))?;
        raw.into_settings()
    }
}
