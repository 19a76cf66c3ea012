//! Price change notifications
//!
//! `EmailNotifier` sends a plain-text alert over implicit-TLS SMTP
//! submission. `LogNotifier` is used when no mail settings are configured.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Result, TrackerError};

/// A detected change between the cached and the fetched price
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub name: String,
    pub old_price: Decimal,
    pub new_price: Option<Decimal>,
}

impl PriceChange {
    pub fn subject(&self) -> String {
        format!("Price Alert: {}", self.name)
    }

    pub fn body(&self) -> String {
        let new_price = self
            .new_price
            .map(|p| format!("${}", p))
            .unwrap_or_else(|| "unavailable".to_string());
        format!(
            "The price for {} has changed!\nOld Price: ${}\nNew Price: {}\n",
            self.name, self.old_price, new_price
        )
    }
}

/// Delivers price change alerts.
///
/// Callers treat an `Err` as a warning; a failed alert never blocks the
/// cache update.
pub trait Notifier {
    fn notify(&self, change: &PriceChange) -> Result<()>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, change: &PriceChange) -> Result<()> {
        (**self).notify(change)
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, change: &PriceChange) -> Result<()> {
        (**self).notify(change)
    }
}

/// SMTP submission settings. No field has a default secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender address, also the SMTP username
    pub sender: String,
    /// App-specific password for the sender account
    pub password: String,
    pub recipient: String,
}

/// Email alerts over authenticated, TLS-wrapped SMTP
#[derive(Debug)]
pub struct EmailNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(settings: &MailSettings, timeout: Duration) -> Result<Self> {
        let from: Mailbox = settings.sender.parse().map_err(|e| {
            TrackerError::Config(format!("invalid sender address {}: {}", settings.sender, e))
        })?;
        let to: Mailbox = settings.recipient.parse().map_err(|e| {
            TrackerError::Config(format!(
                "invalid recipient address {}: {}",
                settings.recipient, e
            ))
        })?;

        let credentials = Credentials::new(settings.sender.clone(), settings.password.clone());
        let transport = SmtpTransport::relay(&settings.smtp_host)
            .map_err(|e| {
                TrackerError::Config(format!(
                    "SMTP relay configuration error for {}: {}",
                    settings.smtp_host, e
                ))
            })?
            .port(settings.smtp_port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, change: &PriceChange) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(change.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(change.body())
            .map_err(|e| TrackerError::Notification(format!("failed to build message: {}", e)))
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, change: &PriceChange) -> Result<()> {
        let message = self.build_message(change)?;
        self.transport
            .send(&message)
            .map_err(|e| TrackerError::Notification(format!("SMTP delivery failed: {}", e)))?;
        info!("Email alert sent for {}", change.name);
        Ok(())
    }
}

/// Reports changes through the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, change: &PriceChange) -> Result<()> {
        warn!(
            product = %change.name,
            old_price = %change.old_price,
            new_price = ?change.new_price,
            "Price changed (email alerts not configured)"
        );
        Ok(())
    }
}

/// Pick the notifier for the given mail settings.
///
/// Mail settings that cannot be turned into an `EmailNotifier` are logged and
/// replaced by `LogNotifier`, so a bad address never stops a price check.
pub fn notifier_for(mail: Option<&MailSettings>, timeout: Duration) -> Box<dyn Notifier> {
    match mail.map(|settings| EmailNotifier::new(settings, timeout)) {
        Some(Ok(email)) => Box::new(email),
        Some(Err(e)) => {
            warn!("Email alerts disabled, falling back to log output: {}", e);
            Box::new(LogNotifier)
        }
        None => Box::new(LogNotifier),
    }
}
