//! Runtime configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! `PRICEWATCH_*` environment variables. Mail credentials have no defaults:
//! alerts are emailed only when host, sender, password and recipient are
//! all supplied.
//!
//! ```toml
//! cache_file = "/var/lib/pricewatch/last_prices.json"
//! http_timeout_secs = 10
//!
//! [mail]
//! smtp_host = "smtp.gmail.com"
//! smtp_port = 465
//! sender = "alerts@example.com"
//! recipient = "me@example.com"
//! # password is best left to PRICEWATCH_MAIL_PASSWORD
//! ```

use lettre::message::Mailbox;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::notifier::MailSettings;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SMTP_PORT: u16 = 465;
const APP_DIR: &str = "pricewatch";
const CACHE_FILENAME: &str = "last_prices.json";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Price cache location; defaults to the user cache directory
    pub cache_file: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub mail: MailConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_file: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            mail: MailConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl Settings {
    /// Load settings from `config_path` (or the default config file when it
    /// exists) and apply environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| TrackerError::Config(format!("failed to parse config: {}", e)))
    }

    /// Override fields from environment variables, looked up through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = var("PRICEWATCH_CACHE_FILE") {
            self.cache_file = Some(PathBuf::from(path));
        }
        if let Some(timeout) = var("PRICEWATCH_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = timeout.trim().parse().map_err(|_| {
                TrackerError::Config(
                    "PRICEWATCH_HTTP_TIMEOUT_SECS must be an integer > 0".to_string(),
                )
            })?;
        }
        if let Some(host) = var("PRICEWATCH_SMTP_HOST") {
            self.mail.smtp_host = Some(host);
        }
        if let Some(port) = var("PRICEWATCH_SMTP_PORT") {
            self.mail.smtp_port = Some(port.trim().parse().map_err(|_| {
                TrackerError::Config("PRICEWATCH_SMTP_PORT must be a port number".to_string())
            })?);
        }
        if let Some(sender) = var("PRICEWATCH_MAIL_SENDER") {
            self.mail.sender = Some(sender);
        }
        if let Some(password) = var("PRICEWATCH_MAIL_PASSWORD") {
            self.mail.password = Some(password);
        }
        if let Some(recipient) = var("PRICEWATCH_MAIL_RECIPIENT") {
            self.mail.recipient = Some(recipient);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(TrackerError::Config(
                "http_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(mail) = self.mail_settings()? {
            for (key, address) in [("sender", &mail.sender), ("recipient", &mail.recipient)] {
                address.parse::<Mailbox>().map_err(|e| {
                    TrackerError::Config(format!("invalid mail {} {:?}: {}", key, address, e))
                })?;
            }
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Configured cache file, or the per-user default
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache_file {
            Some(path) => Ok(path.clone()),
            None => default_cache_path(),
        }
    }

    /// Complete mail settings, `None` when mail is not configured at all.
    /// A partial configuration is an error.
    pub fn mail_settings(&self) -> Result<Option<MailSettings>> {
        let mail = &self.mail;
        let required = [
            ("smtp_host", &mail.smtp_host),
            ("sender", &mail.sender),
            ("password", &mail.password),
            ("recipient", &mail.recipient),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(key, _)| *key)
            .collect();

        if missing.len() == required.len() {
            return Ok(None);
        }
        if !missing.is_empty() {
            return Err(TrackerError::Config(format!(
                "incomplete mail settings, missing: {}",
                missing.join(", ")
            )));
        }

        Ok(Some(MailSettings {
            smtp_host: mail.smtp_host.clone().unwrap_or_default(),
            smtp_port: mail.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            sender: mail.sender.clone().unwrap_or_default(),
            password: mail.password.clone().unwrap_or_default(),
            recipient: mail.recipient.clone().unwrap_or_default(),
        }))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

pub fn default_cache_path() -> Result<PathBuf> {
    let cache_dir = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::cache_home)
        .ok_or_else(|| TrackerError::Config("could not determine cache directory".to_string()))?;
    Ok(cache_dir.join(APP_DIR).join(CACHE_FILENAME))
}
